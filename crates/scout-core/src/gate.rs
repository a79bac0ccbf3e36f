//! The authorization gate.
//!
//! Every permission decision in the workspace goes through [`Gate::check`].
//! The gate is a pure function of (principal, action); it caches nothing, so
//! callers re-evaluate on every attempt.

use serde::Serialize;

use crate::{
  Denial,
  comment::Comment,
  player::Player,
  principal::{Principal, PrincipalId, Role},
};

/// A mutating (or admin-only) action a principal may attempt.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
  AddPlayer,
  Like,
  Comment,
  EditOwnProfile,
  EditNote(&'a Player),
  EditExternalLink(&'a Player),
  EditVideoLink,
  DeletePlayer,
  DeletePrincipal,
  DeleteComment(&'a Comment),
  ViewAdminPanel,
}

/// Decides permit/deny. Holds only the configured admin identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
  admin_id: PrincipalId,
}

impl Gate {
  pub fn new(admin_id: PrincipalId) -> Self { Self { admin_id } }

  pub fn admin_id(&self) -> &PrincipalId { &self.admin_id }

  pub fn role(&self, id: &PrincipalId) -> Role {
    if *id == self.admin_id { Role::Admin } else { Role::Member }
  }

  pub fn is_admin(&self, principal: Option<&Principal>) -> bool {
    principal.is_some_and(|p| self.role(&p.id) == Role::Admin)
  }

  /// Permit or deny `action`. On permit, hands back the acting principal so
  /// callers never need to re-check for its presence.
  pub fn check<'p>(
    &self,
    principal: Option<&'p Principal>,
    action: Action<'_>,
  ) -> Result<&'p Principal, Denial> {
    let p = principal.ok_or(Denial::SignInRequired)?;
    let admin = self.role(&p.id) == Role::Admin;

    let permitted = match action {
      Action::AddPlayer | Action::Like | Action::Comment => {
        if !p.phone_verified {
          return Err(Denial::PhoneNotVerified);
        }
        true
      }
      Action::EditOwnProfile => true,
      Action::EditNote(player) | Action::EditExternalLink(player) => {
        admin || player.owner_id == p.id
      }
      Action::DeleteComment(comment) => admin || comment.author_id == p.id,
      Action::EditVideoLink
      | Action::DeletePlayer
      | Action::DeletePrincipal
      | Action::ViewAdminPanel => admin,
    };

    if permitted { Ok(p) } else { Err(Denial::NotPermitted) }
  }

  pub fn permits(&self, principal: Option<&Principal>, action: Action<'_>) -> bool {
    self.check(principal, action).is_ok()
  }

  /// Every per-player verdict a detail view needs, evaluated at once.
  pub fn player_permissions(
    &self,
    principal: Option<&Principal>,
    player: &Player,
  ) -> PlayerPermissions {
    PlayerPermissions {
      like:               self.permits(principal, Action::Like),
      comment:            self.permits(principal, Action::Comment),
      edit_note:          self.permits(principal, Action::EditNote(player)),
      edit_external_link: self.permits(principal, Action::EditExternalLink(player)),
      edit_video_link:    self.permits(principal, Action::EditVideoLink),
      delete:             self.permits(principal, Action::DeletePlayer),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlayerPermissions {
  pub like:               bool,
  pub comment:            bool,
  pub edit_note:          bool,
  pub edit_external_link: bool,
  pub edit_video_link:    bool,
  pub delete:             bool,
}
