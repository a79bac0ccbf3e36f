//! Principals: authenticated identities and their profile documents.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque identifier issued by the identity provider.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for PrincipalId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for PrincipalId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for PrincipalId {
  fn from(s: String) -> Self { Self(s) }
}

/// What the identity provider knows about a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
  pub id:    PrincipalId,
  pub email: Option<String>,
}

/// Base role of a principal. Ownership is resource-relative and decided by
/// the gate, not stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Member,
}

// ─── Profile document ────────────────────────────────────────────────────────

/// A principal together with its hydrated profile document (`users/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  pub id:             PrincipalId,
  pub email:          Option<String>,
  pub first_name:     Option<String>,
  pub last_name:      Option<String>,
  pub phone:          String,
  /// Derived on every save: a non-empty phone counts as verified.
  pub phone_verified: bool,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

impl Principal {
  /// An unhydrated principal: everything empty, not verified.
  pub fn from_auth(user: &AuthUser, now: DateTime<Utc>) -> Self {
    Self {
      id:             user.id.clone(),
      email:          user.email.clone(),
      first_name:     None,
      last_name:      None,
      phone:          String::new(),
      phone_verified: false,
      created_at:     now,
      updated_at:     now,
    }
  }

  /// `"first last"`, trimmed; empty when neither is set.
  pub fn full_name(&self) -> String {
    format!(
      "{} {}",
      self.first_name.as_deref().unwrap_or_default(),
      self.last_name.as_deref().unwrap_or_default()
    )
    .trim()
    .to_owned()
  }

  /// Best human label: full name, then email, then the raw id.
  pub fn display_name(&self) -> String {
    let full = self.full_name();
    if !full.is_empty() {
      return full;
    }
    match self.email.as_deref() {
      Some(email) if !email.is_empty() => email.to_owned(),
      _ => self.id.to_string(),
    }
  }
}

/// Merge-upsert written by a profile save.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
  pub id:             PrincipalId,
  pub email:          Option<String>,
  pub first_name:     String,
  pub last_name:      String,
  pub phone:          String,
  pub phone_verified: bool,
}

/// Raw profile-editor input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
  pub first_name: String,
  pub last_name:  String,
  #[serde(default)]
  pub phone:      String,
}

impl ProfileForm {
  /// Prefill the editor from a hydrated principal.
  pub fn from_principal(p: &Principal) -> Self {
    Self {
      first_name: p.first_name.clone().unwrap_or_default(),
      last_name:  p.last_name.clone().unwrap_or_default(),
      phone:      p.phone.clone(),
    }
  }
}
