//! Identity: the provider boundary and the resolver that hydrates it.
//!
//! An [`IdentityProvider`] says *who* is signed in. The [`IdentityResolver`]
//! turns that into a [`Principal`] by loading the profile document once per
//! sign-in, and derives the role from it through the [`Gate`].

use std::{convert::Infallible, future::Future, sync::Arc};

use chrono::Utc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
  gate::Gate,
  principal::{AuthUser, Principal, Role},
  store::DocumentStore,
};

// ─── Provider ────────────────────────────────────────────────────────────────

/// Sign-in, sign-out and a change stream of the signed-in user.
pub trait IdentityProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn sign_in(&self) -> impl Future<Output = Result<AuthUser, Self::Error>> + Send + '_;

  fn sign_out(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// A receiver that observes every auth-state transition.
  fn watch(&self) -> watch::Receiver<Option<AuthUser>>;
}

/// A provider for a single, locally configured identity. Signing in adopts
/// that identity; there is no interactive flow.
#[derive(Debug)]
pub struct LocalIdentity {
  user:  AuthUser,
  state: watch::Sender<Option<AuthUser>>,
}

impl LocalIdentity {
  /// Start signed out.
  pub fn new(user: AuthUser) -> Self {
    let (state, _) = watch::channel(None);
    Self { user, state }
  }

  /// Start already signed in.
  pub fn signed_in(user: AuthUser) -> Self {
    let (state, _) = watch::channel(Some(user.clone()));
    Self { user, state }
  }

  pub fn is_signed_in(&self) -> bool { self.state.borrow().is_some() }
}

impl IdentityProvider for LocalIdentity {
  type Error = Infallible;

  async fn sign_in(&self) -> Result<AuthUser, Infallible> {
    self.state.send_replace(Some(self.user.clone()));
    Ok(self.user.clone())
  }

  async fn sign_out(&self) -> Result<(), Infallible> {
    self.state.send_replace(None);
    Ok(())
  }

  fn watch(&self) -> watch::Receiver<Option<AuthUser>> { self.state.subscribe() }
}

// ─── Hydration ───────────────────────────────────────────────────────────────

/// Load (creating on first sign-in) the profile for `user`.
///
/// Failure is swallowed: the principal comes back with empty profile fields
/// and unverified, and no retry is attempted.
pub async fn hydrate<S: DocumentStore>(store: &S, user: &AuthUser) -> Principal {
  match store.ensure_profile(user.clone()).await {
    Ok(profile) => profile,
    Err(e) => {
      warn!(principal = %user.id, error = %e, "profile load failed; using defaults");
      Principal::from_auth(user, Utc::now())
    }
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Tracks the current principal for one client session.
pub struct IdentityResolver<S> {
  store:     Arc<S>,
  gate:      Gate,
  auth:      watch::Receiver<Option<AuthUser>>,
  principal: Option<Principal>,
}

impl<S: DocumentStore> IdentityResolver<S> {
  /// Attach to `provider` and resolve whatever state it is in right now.
  pub async fn new<I: IdentityProvider>(store: Arc<S>, gate: Gate, provider: &I) -> Self {
    let mut resolver = Self {
      store,
      gate,
      auth: provider.watch(),
      principal: None,
    };
    let current = resolver.auth.borrow_and_update().clone();
    resolver.transition(current).await;
    resolver
  }

  pub fn principal(&self) -> Option<&Principal> { self.principal.as_ref() }

  /// `None` while anonymous.
  pub fn role(&self) -> Option<Role> {
    self.principal.as_ref().map(|p| self.gate.role(&p.id))
  }

  pub fn is_verified(&self) -> bool {
    self.principal.as_ref().is_some_and(|p| p.phone_verified)
  }

  pub fn gate(&self) -> &Gate { &self.gate }

  /// Apply an auth transition if one is pending. Never waits for one.
  pub async fn refresh(&mut self) -> bool {
    if !matches!(self.auth.has_changed(), Ok(true)) {
      return false;
    }
    let user = self.auth.borrow_and_update().clone();
    self.transition(user).await;
    true
  }

  /// Wait for the next auth transition and apply it. Returns `false` once
  /// the provider is gone.
  pub async fn changed(&mut self) -> bool {
    if self.auth.changed().await.is_err() {
      return false;
    }
    let user = self.auth.borrow_and_update().clone();
    self.transition(user).await;
    true
  }

  /// Take over a freshly saved profile document, if it belongs to the
  /// current principal.
  pub fn adopt_profile(&mut self, profile: Principal) {
    if self.principal.as_ref().is_some_and(|p| p.id == profile.id) {
      self.principal = Some(profile);
    }
  }

  async fn transition(&mut self, user: Option<AuthUser>) {
    match user {
      None => {
        if let Some(previous) = self.principal.take() {
          info!(principal = %previous.id, "signed out");
        }
      }
      Some(user) => {
        if self.principal.as_ref().is_some_and(|p| p.id == user.id) {
          return;
        }
        let principal = hydrate(self.store.as_ref(), &user).await;
        info!(
          principal = %principal.id,
          verified = principal.phone_verified,
          "signed in"
        );
        self.principal = Some(principal);
      }
    }
  }
}
