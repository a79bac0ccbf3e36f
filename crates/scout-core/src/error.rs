//! Error types for `scout-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::principal::PrincipalId;

/// Why the [`Gate`](crate::gate::Gate) refused an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
  #[error("you need to sign in first")]
  SignInRequired,

  #[error("save a phone number in your profile first")]
  PhoneNotVerified,

  #[error("you are not allowed to do that")]
  NotPermitted,
}

/// Input rejected before any store call was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Invalid {
  #[error("player name and position are required")]
  MissingNameOrPosition,

  #[error("birth year {0:?} is not a number")]
  BirthYear(String),

  #[error("{0:?} is already listed; search for the player instead")]
  DuplicateName(String),

  #[error("comment cannot be empty")]
  EmptyComment,

  #[error("comment must be at least {min} characters")]
  CommentTooShort { min: usize },

  #[error("first and last name are required")]
  MissingProfileName,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("permission denied: {0}")]
  Denied(#[from] Denial),

  #[error("invalid input: {0}")]
  Invalid(#[from] Invalid),

  #[error("player not found: {0}")]
  PlayerNotFound(Uuid),

  #[error("comment not found: {0}")]
  CommentNotFound(Uuid),

  #[error("principal not found: {0}")]
  PrincipalNotFound(PrincipalId),

  /// Some of the independent deletes of a cascade failed; the others stuck.
  #[error("delete incomplete: {failed} of {attempted} players could not be removed")]
  PartialCascade { attempted: usize, failed: usize },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// `true` for failures the user caused (denials and validation), as
  /// opposed to store failures.
  pub fn is_user_facing(&self) -> bool {
    matches!(self, Self::Denied(_) | Self::Invalid(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
