//! The mutation façade: every write the app performs.
//!
//! Each operation asks the [`Gate`] first, validates its input second, and
//! only then calls the store. Denials and validation failures therefore never
//! reach the store. Store failures are logged here and surfaced as
//! [`Error::Store`]; nothing is retried.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
  Error, Invalid, Result,
  comment::{ANONYMOUS_AUTHOR, Comment, NewComment, validate_text},
  gate::{Action, Gate},
  player::{LikeTarget, Likeable, Player, PlayerForm, PlayerPatch},
  principal::{Principal, PrincipalId, ProfileForm, ProfileUpdate},
  store::DocumentStore,
};

/// Outcome of removing a principal together with everything they own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
  /// `false` if there was no profile document to remove.
  pub profile_deleted: bool,
  pub players_deleted: usize,
}

pub struct Mutations<S> {
  store: Arc<S>,
  gate:  Gate,
}

impl<S> Clone for Mutations<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), gate: self.gate.clone() }
  }
}

fn store_failure<E>(op: &'static str, e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  error!(op, error = %e, "store call failed");
  Error::Store(Box::new(e))
}

impl<S: DocumentStore + 'static> Mutations<S> {
  pub fn new(store: Arc<S>, gate: Gate) -> Self { Self { store, gate } }

  pub fn gate(&self) -> &Gate { &self.gate }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Players ───────────────────────────────────────────────────────────

  /// Add a player after an existence check on the normalized name.
  ///
  /// The check and the insert are separate calls; two concurrent creates of
  /// the same name can both succeed.
  pub async fn create_player(
    &self,
    principal: Option<&Principal>,
    form: &PlayerForm,
  ) -> Result<Player> {
    let owner = self.gate.check(principal, Action::AddPlayer)?;
    let input = form.validate(owner)?;

    let exists = self
      .store
      .player_name_exists(input.name_normalized.clone())
      .await
      .map_err(|e| store_failure("player_name_exists", e))?;
    if exists {
      warn!(name = %input.name, "duplicate player name rejected");
      return Err(Invalid::DuplicateName(input.name).into());
    }

    let player = self
      .store
      .insert_player(input)
      .await
      .map_err(|e| store_failure("insert_player", e))?;
    info!(player = %player.id, owner = %player.owner_id, "player created");
    Ok(player)
  }

  /// Admin-only. Comments under the player stay where they are.
  pub async fn delete_player(
    &self,
    principal: Option<&Principal>,
    player_id: Uuid,
  ) -> Result<()> {
    let admin = self.gate.check(principal, Action::DeletePlayer)?;
    let deleted = self
      .store
      .delete_player(player_id)
      .await
      .map_err(|e| store_failure("delete_player", e))?;
    if !deleted {
      return Err(Error::PlayerNotFound(player_id));
    }
    info!(player = %player_id, by = %admin.id, "player deleted");
    Ok(())
  }

  pub async fn save_note(
    &self,
    principal: Option<&Principal>,
    player: &Player,
    note: &str,
  ) -> Result<()> {
    self.gate.check(principal, Action::EditNote(player))?;
    self
      .patch(player.id, PlayerPatch::Note(note.trim().to_owned()))
      .await
  }

  pub async fn save_external_link(
    &self,
    principal: Option<&Principal>,
    player: &Player,
    link: &str,
  ) -> Result<()> {
    self.gate.check(principal, Action::EditExternalLink(player))?;
    self
      .patch(player.id, PlayerPatch::ExternalLink(link.trim().to_owned()))
      .await
  }

  /// Admin-only: set both the video and the external-profile link.
  pub async fn save_links(
    &self,
    principal: Option<&Principal>,
    player_id: Uuid,
    video: &str,
    external: &str,
  ) -> Result<()> {
    self.gate.check(principal, Action::EditVideoLink)?;
    self
      .patch(player_id, PlayerPatch::Links {
        video:    video.trim().to_owned(),
        external: external.trim().to_owned(),
      })
      .await
  }

  async fn patch(&self, player_id: Uuid, patch: PlayerPatch) -> Result<()> {
    let updated = self
      .store
      .update_player(player_id, patch)
      .await
      .map_err(|e| store_failure("update_player", e))?;
    if !updated {
      return Err(Error::PlayerNotFound(player_id));
    }
    info!(player = %player_id, "player updated");
    Ok(())
  }

  // ── Likes ─────────────────────────────────────────────────────────────

  /// Flip the principal's like on `target` as currently mirrored. Returns
  /// the new state: `true` if the principal now likes it.
  pub async fn toggle_like<T: Likeable>(
    &self,
    principal: Option<&Principal>,
    target: &T,
  ) -> Result<bool> {
    let p = self.gate.check(principal, Action::Like)?;
    let liked = !target.is_liked_by(&p.id);
    let addr = target.like_target();

    let found = self
      .store
      .set_like(addr, p.id.clone(), liked)
      .await
      .map_err(|e| store_failure("set_like", e))?;
    if !found {
      return Err(match addr {
        LikeTarget::Player { player_id } => Error::PlayerNotFound(player_id),
        LikeTarget::Comment { comment_id, .. } => Error::CommentNotFound(comment_id),
      });
    }
    info!(principal = %p.id, ?addr, liked, "like toggled");
    Ok(liked)
  }

  // ── Comments ──────────────────────────────────────────────────────────

  pub async fn add_comment(
    &self,
    principal: Option<&Principal>,
    player: &Player,
    text: &str,
  ) -> Result<Comment> {
    let author = self.gate.check(principal, Action::Comment)?;
    let text = validate_text(text)?;

    let author_name = author
      .email
      .as_deref()
      .filter(|e| !e.is_empty())
      .unwrap_or(ANONYMOUS_AUTHOR)
      .to_owned();
    let comment = self
      .store
      .insert_comment(NewComment {
        player_id: player.id,
        text,
        author_id: author.id.clone(),
        author_name,
      })
      .await
      .map_err(|e| store_failure("insert_comment", e))?;
    info!(player = %player.id, comment = %comment.id, "comment added");
    Ok(comment)
  }

  pub async fn delete_comment(
    &self,
    principal: Option<&Principal>,
    comment: &Comment,
  ) -> Result<()> {
    self.gate.check(principal, Action::DeleteComment(comment))?;
    let deleted = self
      .store
      .delete_comment(comment.player_id, comment.id)
      .await
      .map_err(|e| store_failure("delete_comment", e))?;
    if !deleted {
      return Err(Error::CommentNotFound(comment.id));
    }
    info!(player = %comment.player_id, comment = %comment.id, "comment deleted");
    Ok(())
  }

  // ── Principals ────────────────────────────────────────────────────────

  /// Admin-only. Removes the profile, then every player it owns, each with an
  /// independent delete. Nothing is rolled back when some of them fail.
  pub async fn delete_principal(
    &self,
    principal: Option<&Principal>,
    target: &PrincipalId,
  ) -> Result<CascadeReport> {
    let admin = self.gate.check(principal, Action::DeletePrincipal)?;

    let profile_deleted = self
      .store
      .delete_profile(target.clone())
      .await
      .map_err(|e| store_failure("delete_profile", e))?;
    let owned = self
      .store
      .players_owned_by(target.clone())
      .await
      .map_err(|e| store_failure("players_owned_by", e))?;

    let attempted = owned.len();
    let mut deletes = JoinSet::new();
    for player in owned {
      let store = Arc::clone(&self.store);
      deletes.spawn(async move { store.delete_player(player.id).await });
    }

    let mut failed = 0;
    while let Some(outcome) = deletes.join_next().await {
      match outcome {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => {
          error!(principal = %target, error = %e, "cascade player delete failed");
          failed += 1;
        }
        Err(e) => {
          error!(principal = %target, error = %e, "cascade delete task aborted");
          failed += 1;
        }
      }
    }

    if failed > 0 {
      error!(principal = %target, attempted, failed, "cascade delete incomplete");
      return Err(Error::PartialCascade { attempted, failed });
    }
    info!(
      principal = %target,
      by = %admin.id,
      profile_deleted,
      players = attempted,
      "principal deleted"
    );
    Ok(CascadeReport { profile_deleted, players_deleted: attempted })
  }

  /// Save the editor's fields and return the stored profile for the
  /// resolver to adopt.
  pub async fn save_profile(
    &self,
    principal: Option<&Principal>,
    form: &ProfileForm,
  ) -> Result<Principal> {
    let p = self.gate.check(principal, Action::EditOwnProfile)?;
    let first_name = form.first_name.trim();
    let last_name = form.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
      return Err(Invalid::MissingProfileName.into());
    }
    let phone = form.phone.trim();

    let saved = self
      .store
      .save_profile(ProfileUpdate {
        id:             p.id.clone(),
        email:          p.email.clone(),
        first_name:     first_name.to_owned(),
        last_name:      last_name.to_owned(),
        phone:          phone.to_owned(),
        phone_verified: !phone.is_empty(),
      })
      .await
      .map_err(|e| store_failure("save_profile", e))?;
    info!(principal = %saved.id, verified = saved.phone_verified, "profile saved");
    Ok(saved)
  }
}
