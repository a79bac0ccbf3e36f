//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with fixed microsecond precision and a `Z`
//! suffix, so that lexicographic order equals chronological order. UUIDs are
//! hyphenated lowercase strings. Likes sets are read back as the JSON array
//! produced by `json_group_array`.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use scout_core::{
  comment::Comment,
  player::{LikeTarget, Player},
  principal::{Principal, PrincipalId},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The store's clock, truncated to what survives a round trip.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Likes ───────────────────────────────────────────────────────────────────

pub const PLAYER_KIND: &str = "player";
pub const COMMENT_KIND: &str = "comment";

/// `(target_kind, target_id)` of a likes row.
pub fn encode_target(target: LikeTarget) -> (&'static str, String) {
  match target {
    LikeTarget::Player { player_id } => (PLAYER_KIND, encode_uuid(player_id)),
    LikeTarget::Comment { comment_id, .. } => (COMMENT_KIND, encode_uuid(comment_id)),
  }
}

pub fn decode_likes(json: &str) -> Result<BTreeSet<PrincipalId>> {
  Ok(serde_json::from_str(json)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `players` query, in [`RawPlayer`] order.
pub const PLAYER_SELECT: &str = "
  SELECT p.player_id, p.name, p.name_normalized, p.position, p.birth_year,
         p.club, p.country, p.note, p.youtube_link, p.transfermarkt_link,
         p.image_url, p.owner_id, p.owner_name, p.owner_email, p.created_at,
         (SELECT json_group_array(l.principal_id) FROM likes l
           WHERE l.target_kind = 'player' AND l.target_id = p.player_id)
  FROM players p";

pub const COMMENT_SELECT: &str = "
  SELECT c.comment_id, c.player_id, c.text, c.author_id, c.author_name,
         c.created_at,
         (SELECT json_group_array(l.principal_id) FROM likes l
           WHERE l.target_kind = 'comment' AND l.target_id = c.comment_id)
  FROM comments c";

pub const USER_SELECT: &str = "
  SELECT principal_id, email, first_name, last_name, phone, phone_verified,
         created_at, updated_at
  FROM users";

/// Raw values read directly from a `players` row.
pub struct RawPlayer {
  pub player_id:          String,
  pub name:               String,
  pub name_normalized:    String,
  pub position:           String,
  pub birth_year:         Option<i32>,
  pub club:               String,
  pub country:            String,
  pub note:               String,
  pub youtube_link:       String,
  pub transfermarkt_link: String,
  pub image_url:          String,
  pub owner_id:           String,
  pub owner_name:         String,
  pub owner_email:        Option<String>,
  pub created_at:         String,
  pub liked_by:           String,
}

impl RawPlayer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      player_id:          row.get(0)?,
      name:               row.get(1)?,
      name_normalized:    row.get(2)?,
      position:           row.get(3)?,
      birth_year:         row.get(4)?,
      club:               row.get(5)?,
      country:            row.get(6)?,
      note:               row.get(7)?,
      youtube_link:       row.get(8)?,
      transfermarkt_link: row.get(9)?,
      image_url:          row.get(10)?,
      owner_id:           row.get(11)?,
      owner_name:         row.get(12)?,
      owner_email:        row.get(13)?,
      created_at:         row.get(14)?,
      liked_by:           row.get(15)?,
    })
  }

  pub fn into_player(self) -> Result<Player> {
    Ok(Player {
      id:                 decode_uuid(&self.player_id)?,
      name:               self.name,
      name_normalized:    self.name_normalized,
      position:           self.position,
      birth_year:         self.birth_year,
      club:               self.club,
      country:            self.country,
      note:               self.note,
      youtube_link:       self.youtube_link,
      transfermarkt_link: self.transfermarkt_link,
      image_url:          self.image_url,
      owner_id:           self.owner_id.into(),
      owner_name:         self.owner_name,
      owner_email:        self.owner_email,
      liked_by:           decode_likes(&self.liked_by)?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `comments` row.
pub struct RawComment {
  pub comment_id:  String,
  pub player_id:   String,
  pub text:        String,
  pub author_id:   String,
  pub author_name: String,
  pub created_at:  String,
  pub liked_by:    String,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id:  row.get(0)?,
      player_id:   row.get(1)?,
      text:        row.get(2)?,
      author_id:   row.get(3)?,
      author_name: row.get(4)?,
      created_at:  row.get(5)?,
      liked_by:    row.get(6)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id:          decode_uuid(&self.comment_id)?,
      player_id:   decode_uuid(&self.player_id)?,
      text:        self.text,
      author_id:   self.author_id.into(),
      author_name: self.author_name,
      liked_by:    decode_likes(&self.liked_by)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub principal_id:   String,
  pub email:          Option<String>,
  pub first_name:     Option<String>,
  pub last_name:      Option<String>,
  pub phone:          String,
  pub phone_verified: bool,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      principal_id:   row.get(0)?,
      email:          row.get(1)?,
      first_name:     row.get(2)?,
      last_name:      row.get(3)?,
      phone:          row.get(4)?,
      phone_verified: row.get(5)?,
      created_at:     row.get(6)?,
      updated_at:     row.get(7)?,
    })
  }

  pub fn into_principal(self) -> Result<Principal> {
    Ok(Principal {
      id:             self.principal_id.into(),
      email:          self.email,
      first_name:     self.first_name,
      last_name:      self.last_name,
      phone:          self.phone,
      phone_verified: self.phone_verified,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_sort_lexicographically() {
    let early = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let late = early + chrono::Duration::microseconds(1);
    assert!(encode_dt(early) < encode_dt(late));
    assert_eq!(encode_dt(early), "2024-01-01T09:00:00.000000Z");
  }

  #[test]
  fn now_survives_round_trip() {
    let t = now();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
  }

  #[test]
  fn empty_likes_array_decodes() {
    assert!(decode_likes("[]").unwrap().is_empty());
    let set = decode_likes(r#"["b","a","a"]"#).unwrap();
    assert_eq!(set.len(), 2);
  }
}
