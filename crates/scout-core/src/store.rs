//! The `DocumentStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `scout-store-sqlite`).
//! Higher layers (`scout-api`, `scout-cli`) depend on this abstraction, not
//! on any concrete backend, and receive it as an explicitly constructed
//! handle.
//!
//! Three collections are modelled: `users` keyed by principal id, `players`,
//! and `players/{id}/comments`. The store enforces no cross-document
//! invariants: uniqueness of player names and the owner cascade are the
//! caller's business, and both are knowingly racy.

use std::future::Future;

use uuid::Uuid;

use crate::{
  comment::{Comment, NewComment},
  mirror::Subscription,
  player::{LikeTarget, NewPlayer, Player, PlayerPatch},
  principal::{AuthUser, Principal, PrincipalId, ProfileUpdate},
};

/// Abstraction over a document store backend.
///
/// Every list and subscription is ordered by creation timestamp, newest
/// first. All methods return `Send` futures so the trait can be used from
/// multi-threaded runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Point read of `users/{id}`.
  fn get_profile(
    &self,
    id: PrincipalId,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + '_;

  /// First-sign-in upsert: create a minimal profile for `user` if none
  /// exists, then return the stored profile.
  fn ensure_profile(
    &self,
    user: AuthUser,
  ) -> impl Future<Output = Result<Principal, Self::Error>> + Send + '_;

  /// Merge-upsert the editable profile fields. `created_at` survives.
  fn save_profile(
    &self,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Principal, Self::Error>> + Send + '_;

  /// Delete `users/{id}`. Returns `false` if there was nothing to delete.
  fn delete_profile(
    &self,
    id: PrincipalId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<Principal>, Self::Error>> + Send + '_;

  fn subscribe_profiles(
    &self,
  ) -> impl Future<Output = Result<Subscription<Principal>, Self::Error>> + Send + '_;

  // ── Players ───────────────────────────────────────────────────────────

  /// Write a new player with an empty likes set and a store timestamp.
  fn insert_player(
    &self,
    input: NewPlayer,
  ) -> impl Future<Output = Result<Player, Self::Error>> + Send + '_;

  fn get_player(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Player>, Self::Error>> + Send + '_;

  fn list_players(
    &self,
  ) -> impl Future<Output = Result<Vec<Player>, Self::Error>> + Send + '_;

  /// Equality query on `name_normalized`.
  fn player_name_exists(
    &self,
    name_normalized: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Equality query on `owner_id`.
  fn players_owned_by(
    &self,
    owner: PrincipalId,
  ) -> impl Future<Output = Result<Vec<Player>, Self::Error>> + Send + '_;

  /// Apply a field update. Returns `false` if the player does not exist.
  fn update_player(
    &self,
    id: Uuid,
    patch: PlayerPatch,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete `players/{id}`. The comment sub-collection is left in place.
  fn delete_player(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn subscribe_players(
    &self,
  ) -> impl Future<Output = Result<Subscription<Player>, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  fn insert_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    player_id: Uuid,
    comment_id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  fn list_comments(
    &self,
    player_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Delete a single comment. Returns `false` if it did not exist.
  fn delete_comment(
    &self,
    player_id: Uuid,
    comment_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn subscribe_comments(
    &self,
    player_id: Uuid,
  ) -> impl Future<Output = Result<Subscription<Comment>, Self::Error>> + Send + '_;

  // ── Likes ─────────────────────────────────────────────────────────────

  /// Set-add (`liked == true`) or set-remove `principal` in the likes set of
  /// `target`. Both directions are idempotent. Returns `false` if the target
  /// does not exist.
  fn set_like(
    &self,
    target: LikeTarget,
    principal: PrincipalId,
    liked: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
