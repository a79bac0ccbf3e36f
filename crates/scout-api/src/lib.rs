//! JSON REST API for the scout catalogue.
//!
//! Exposes an axum [`Router`] backed by any [`DocumentStore`]. Identity is
//! not established here: a trusted reverse proxy authenticates the user and
//! forwards the principal id (and email) in request headers, see
//! [`caller::Caller`]. TLS and transport concerns are the caller's
//! responsibility.

pub mod admin;
pub mod caller;
pub mod comments;
pub mod error;
pub mod players;
pub mod profile;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use scout_core::{gate::Gate, mutations::Mutations, store::DocumentStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SCOUT_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  pub store_path:   PathBuf,
  /// The one principal with the admin role.
  pub admin_id:     String,
  /// Header carrying the authenticated principal id.
  #[serde(default = "default_user_header")]
  pub user_header:  String,
  /// Header carrying the authenticated principal's email, if any.
  #[serde(default = "default_email_header")]
  pub email_header: String,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_user_header() -> String { "x-scout-user".to_owned() }

fn default_email_header() -> String { "x-scout-email".to_owned() }

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:     Arc<S>,
  pub mutations: Mutations<S>,
  pub config:    Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      mutations: self.mutations.clone(),
      config:    Arc::clone(&self.config),
    }
  }
}

impl<S: DocumentStore + 'static> AppState<S> {
  /// Wire the façade to `store` with the configured admin identity.
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    let gate = Gate::new(config.admin_id.as_str().into());
    Self {
      mutations: Mutations::new(Arc::clone(&store), gate),
      store,
      config: Arc::new(config),
    }
  }

  pub fn gate(&self) -> &Gate { self.mutations.gate() }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// | Method   | Path                                   |
/// |----------|----------------------------------------|
/// | `GET`    | `/players[?q=]`                        |
/// | `POST`   | `/players`                             |
/// | `GET`    | `/players/{id}`                        |
/// | `PUT`    | `/players/{id}/note`                   |
/// | `PUT`    | `/players/{id}/external-link`          |
/// | `PUT`    | `/players/{id}/links`                  |
/// | `POST`   | `/players/{id}/like`                   |
/// | `POST`   | `/players/{id}/comments`               |
/// | `POST`   | `/players/{id}/comments/{cid}/like`    |
/// | `DELETE` | `/players/{id}/comments/{cid}`         |
/// | `GET`    | `/ranking`                             |
/// | `GET`    | `/profile`                             |
/// | `PUT`    | `/profile`                             |
/// | `GET`    | `/admin/users`                         |
/// | `DELETE` | `/admin/users/{id}`                    |
/// | `DELETE` | `/admin/players/{id}`                  |
pub fn router<S>(state: AppState<S>) -> Router
where
  S: DocumentStore + 'static,
{
  Router::new()
    // Players
    .route("/players", get(players::list::<S>).post(players::create::<S>))
    .route("/players/{id}", get(players::detail::<S>))
    .route("/players/{id}/note", put(players::save_note::<S>))
    .route("/players/{id}/external-link", put(players::save_external_link::<S>))
    .route("/players/{id}/links", put(players::save_links::<S>))
    .route("/players/{id}/like", post(players::toggle_like::<S>))
    .route("/ranking", get(players::ranking::<S>))
    // Comments
    .route("/players/{id}/comments", post(comments::create::<S>))
    .route("/players/{id}/comments/{cid}", delete(comments::remove::<S>))
    .route("/players/{id}/comments/{cid}/like", post(comments::toggle_like::<S>))
    // Profile
    .route("/profile", get(profile::get_own::<S>).put(profile::save::<S>))
    // Admin
    .route("/admin/users", get(admin::list_users::<S>))
    .route("/admin/users/{id}", delete(admin::delete_user::<S>))
    .route("/admin/players/{id}", delete(admin::delete_player::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
