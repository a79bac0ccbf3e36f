//! Player records: the scouting entries the community submits and ranks.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Invalid,
  principal::{Principal, PrincipalId},
};

// ─── Likes ───────────────────────────────────────────────────────────────────

/// Addresses a likes set inside the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LikeTarget {
  Player { player_id: Uuid },
  Comment { player_id: Uuid, comment_id: Uuid },
}

/// Anything carrying a membership-semantics likes set.
pub trait Likeable {
  fn liked_by(&self) -> &BTreeSet<PrincipalId>;

  fn like_target(&self) -> LikeTarget;

  fn like_count(&self) -> usize { self.liked_by().len() }

  fn is_liked_by(&self, id: &PrincipalId) -> bool {
    self.liked_by().contains(id)
  }
}

// ─── Player ──────────────────────────────────────────────────────────────────

/// A stored scouting record (`players/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
  pub id:                 Uuid,
  pub name:               String,
  /// `trim + lowercase` of `name`; the uniqueness key.
  pub name_normalized:    String,
  pub position:           String,
  pub birth_year:         Option<i32>,
  pub club:               String,
  pub country:            String,
  pub note:               String,
  pub youtube_link:       String,
  pub transfermarkt_link: String,
  pub image_url:          String,
  pub owner_id:           PrincipalId,
  pub owner_name:         String,
  pub owner_email:        Option<String>,
  pub liked_by:           BTreeSet<PrincipalId>,
  /// Store-assigned; mirrors order by this, newest first.
  pub created_at:         DateTime<Utc>,
}

impl Player {
  /// Who added the player, as shown next to the entry.
  pub fn owner_label(&self) -> &str {
    if !self.owner_name.is_empty() {
      return &self.owner_name;
    }
    match self.owner_email.as_deref() {
      Some(email) if !email.is_empty() => email,
      _ => "unknown",
    }
  }

  /// Position, birth year, club and country joined for a one-line summary.
  pub fn summary(&self) -> String {
    let mut parts = Vec::new();
    if !self.position.is_empty() {
      parts.push(self.position.clone());
    }
    if let Some(year) = self.birth_year {
      parts.push(format!("born {year}"));
    }
    if !self.club.is_empty() {
      parts.push(self.club.clone());
    }
    if !self.country.is_empty() {
      parts.push(self.country.clone());
    }
    parts.join(" · ")
  }
}

impl Likeable for Player {
  fn liked_by(&self) -> &BTreeSet<PrincipalId> { &self.liked_by }

  fn like_target(&self) -> LikeTarget {
    LikeTarget::Player { player_id: self.id }
  }
}

/// The uniqueness key for a player name.
pub fn normalize_name(name: &str) -> String { name.trim().to_lowercase() }

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::DocumentStore::insert_player`]. `id`,
/// `created_at` and the empty likes set are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPlayer {
  pub name:            String,
  pub name_normalized: String,
  pub position:        String,
  pub birth_year:      Option<i32>,
  pub club:            String,
  pub country:         String,
  pub note:            String,
  pub owner_id:        PrincipalId,
  pub owner_name:      String,
  pub owner_email:     Option<String>,
}

/// Raw add-player form input, untrimmed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerForm {
  pub name:       String,
  pub position:   String,
  #[serde(default)]
  pub birth_year: String,
  #[serde(default)]
  pub club:       String,
  #[serde(default)]
  pub country:    String,
  #[serde(default)]
  pub note:       String,
}

impl PlayerForm {
  /// Trim and check the form, producing the document to insert.
  pub fn validate(&self, owner: &Principal) -> Result<NewPlayer, Invalid> {
    let name = self.name.trim();
    let position = self.position.trim();
    if name.is_empty() || position.is_empty() {
      return Err(Invalid::MissingNameOrPosition);
    }

    let year = self.birth_year.trim();
    let birth_year = if year.is_empty() {
      None
    } else {
      Some(
        year
          .parse::<i32>()
          .map_err(|_| Invalid::BirthYear(year.to_owned()))?,
      )
    };

    Ok(NewPlayer {
      name: name.to_owned(),
      name_normalized: normalize_name(name),
      position: position.to_owned(),
      birth_year,
      club: self.club.trim().to_owned(),
      country: self.country.trim().to_owned(),
      note: self.note.trim().to_owned(),
      owner_id: owner.id.clone(),
      owner_name: owner.full_name(),
      owner_email: owner.email.clone(),
    })
  }
}

/// A field-level update of a stored player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerPatch {
  Note(String),
  ExternalLink(String),
  Links { video: String, external: String },
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::principal::AuthUser;

  fn owner() -> Principal {
    let mut p = Principal::from_auth(
      &AuthUser { id: "owner".into(), email: Some("o@example.com".into()) },
      Utc::now(),
    );
    p.first_name = Some("Can".into());
    p.last_name = Some("Demir".into());
    p
  }

  fn form(name: &str, position: &str) -> PlayerForm {
    PlayerForm {
      name: name.into(),
      position: position.into(),
      ..PlayerForm::default()
    }
  }

  #[test]
  fn normalization_trims_and_lowercases() {
    assert_eq!(normalize_name("Ali Yılmaz"), "ali yılmaz");
    assert_eq!(normalize_name("  ali yılmaz "), "ali yılmaz");
    assert_eq!(normalize_name("Ali Yılmaz"), normalize_name("ali yılmaz "));
  }

  #[test]
  fn validate_requires_name_and_position() {
    assert_eq!(
      form("  ", "CM").validate(&owner()).unwrap_err(),
      Invalid::MissingNameOrPosition
    );
    assert_eq!(
      form("Ali", " ").validate(&owner()).unwrap_err(),
      Invalid::MissingNameOrPosition
    );
  }

  #[test]
  fn validate_trims_and_denormalizes_owner() {
    let mut f = form("  Ali Yılmaz ", " CM ");
    f.club = " Galatasaray U19 ".into();
    let new = f.validate(&owner()).unwrap();

    assert_eq!(new.name, "Ali Yılmaz");
    assert_eq!(new.name_normalized, "ali yılmaz");
    assert_eq!(new.position, "CM");
    assert_eq!(new.club, "Galatasaray U19");
    assert_eq!(new.owner_name, "Can Demir");
    assert_eq!(new.owner_email.as_deref(), Some("o@example.com"));
    assert_eq!(new.birth_year, None);
  }

  #[test]
  fn validate_parses_birth_year() {
    let mut f = form("Ali", "CM");
    f.birth_year = " 2007 ".into();
    assert_eq!(f.validate(&owner()).unwrap().birth_year, Some(2007));

    f.birth_year = "two thousand".into();
    assert!(matches!(
      f.validate(&owner()).unwrap_err(),
      Invalid::BirthYear(ref y) if y == "two thousand"
    ));
  }
}
