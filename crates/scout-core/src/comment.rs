//! Comments: children of a player (`players/{id}/comments/{id}`).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Invalid,
  player::{LikeTarget, Likeable},
  principal::PrincipalId,
};

/// Shortest accepted comment, counted in characters after trimming.
pub const MIN_COMMENT_LEN: usize = 3;

/// Author label used when the identity carries no email.
pub const ANONYMOUS_AUTHOR: &str = "scout member";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub id:          Uuid,
  pub player_id:   Uuid,
  pub text:        String,
  pub author_id:   PrincipalId,
  pub author_name: String,
  pub liked_by:    BTreeSet<PrincipalId>,
  pub created_at:  DateTime<Utc>,
}

impl Likeable for Comment {
  fn liked_by(&self) -> &BTreeSet<PrincipalId> { &self.liked_by }

  fn like_target(&self) -> LikeTarget {
    LikeTarget::Comment {
      player_id:  self.player_id,
      comment_id: self.id,
    }
  }
}

/// Input to [`crate::store::DocumentStore::insert_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
  pub player_id:   Uuid,
  pub text:        String,
  pub author_id:   PrincipalId,
  pub author_name: String,
}

/// Trim `raw` and enforce the length floor.
pub fn validate_text(raw: &str) -> Result<String, Invalid> {
  let text = raw.trim();
  if text.is_empty() {
    return Err(Invalid::EmptyComment);
  }
  if text.chars().count() < MIN_COMMENT_LEN {
    return Err(Invalid::CommentTooShort { min: MIN_COMMENT_LEN });
  }
  Ok(text.to_owned())
}
