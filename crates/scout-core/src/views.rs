//! Derived, read-only views over mirrored collections.
//!
//! None of these touch the store; they are recomputed from whatever snapshot
//! a [`Mirror`](crate::mirror::Mirror) currently holds.

use std::cmp::Reverse;

use serde::Serialize;

use crate::{
  player::{Likeable, Player},
  principal::PrincipalId,
};

// ─── Ranking ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked {
  /// 1-based.
  pub rank:   usize,
  pub player: Player,
}

/// Players by descending like count. The sort is stable, so ties keep the
/// mirror's newest-first order.
pub fn ranking(players: &[Player]) -> Vec<Ranked> {
  let mut sorted = players.to_vec();
  sorted.sort_by_key(|p| Reverse(p.like_count()));
  sorted
    .into_iter()
    .enumerate()
    .map(|(i, player)| Ranked { rank: i + 1, player })
    .collect()
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Case-insensitive substring match on the display name. A blank term
/// matches everything.
pub fn search<'a>(players: &'a [Player], term: &str) -> Vec<&'a Player> {
  if term.trim().is_empty() {
    return players.iter().collect();
  }
  let needle = term.to_lowercase();
  players
    .iter()
    .filter(|p| p.name.to_lowercase().contains(&needle))
    .collect()
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DashboardStats {
  /// Players the principal added.
  pub players: usize,
  /// Likes received across those players.
  pub likes:   usize,
}

pub fn dashboard_stats(players: &[Player], owner: &PrincipalId) -> DashboardStats {
  players
    .iter()
    .filter(|p| p.owner_id == *owner)
    .fold(DashboardStats::default(), |acc, p| DashboardStats {
      players: acc.players + 1,
      likes:   acc.likes + p.like_count(),
    })
}

// ─── Formatting ──────────────────────────────────────────────────────────────

pub fn like_label(count: usize) -> String {
  if count == 1 { "1 like".to_owned() } else { format!("{count} likes") }
}

/// Turn a YouTube watch or short link into an embeddable URL.
pub fn youtube_embed_url(link: &str) -> Option<String> {
  let link = link.trim();
  let rest = link
    .strip_prefix("https://")
    .or_else(|| link.strip_prefix("http://"))
    .unwrap_or(link);
  let rest = rest.strip_prefix("www.").unwrap_or(rest);
  let rest = rest.strip_prefix("m.").unwrap_or(rest);

  let id = if let Some(query) = rest.strip_prefix("youtube.com/watch?") {
    query
      .split('&')
      .find_map(|pair| pair.strip_prefix("v="))?
  } else if let Some(path) = rest.strip_prefix("youtu.be/") {
    path.split(['?', '&', '#', '/']).next()?
  } else {
    return None;
  };

  let id = id.split('#').next().unwrap_or_default();
  let valid = !id.is_empty()
    && id
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
  valid.then(|| format!("https://www.youtube.com/embed/{id}"))
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use chrono::{Duration, Utc};
  use uuid::Uuid;

  use super::*;

  fn player(name: &str, owner: &str, likes: usize, age_secs: i64) -> Player {
    Player {
      id:                 Uuid::new_v4(),
      name:               name.into(),
      name_normalized:    name.to_lowercase(),
      position:           "ST".into(),
      birth_year:         None,
      club:               String::new(),
      country:            String::new(),
      note:               String::new(),
      youtube_link:       String::new(),
      transfermarkt_link: String::new(),
      image_url:          String::new(),
      owner_id:           owner.into(),
      owner_name:         String::new(),
      owner_email:        None,
      liked_by:           (0..likes).map(|i| PrincipalId::new(format!("fan-{i}"))).collect::<BTreeSet<_>>(),
      created_at:         Utc::now() - Duration::seconds(age_secs),
    }
  }

  fn names<'a>(players: impl IntoIterator<Item = &'a Player>) -> Vec<&'a str> {
    players.into_iter().map(|p| p.name.as_str()).collect()
  }

  #[test]
  fn ranking_is_stable_by_descending_likes() {
    let players = vec![
      player("A", "o", 3, 0),
      player("B", "o", 1, 1),
      player("C", "o", 3, 2),
      player("D", "o", 0, 3),
    ];
    let ranked = ranking(&players);
    assert_eq!(names(ranked.iter().map(|r| &r.player)), ["A", "C", "B", "D"]);
    assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), [1, 2, 3, 4]);
  }

  #[test]
  fn ranking_leaves_input_untouched() {
    let players = vec![player("A", "o", 0, 0), player("B", "o", 5, 1)];
    let _ = ranking(&players);
    assert_eq!(names(&players), ["A", "B"]);
  }

  #[test]
  fn blank_search_returns_everything() {
    let players = vec![player("Ali", "o", 0, 0), player("Mert", "o", 0, 1)];
    assert_eq!(search(&players, "").len(), 2);
    assert_eq!(search(&players, "   ").len(), 2);
  }

  #[test]
  fn search_is_case_insensitive_substring() {
    let players = vec![
      player("Ali Yılmaz", "o", 0, 0),
      player("Mert Kaya", "o", 0, 1),
      player("Kaan Ali", "o", 0, 2),
    ];
    assert_eq!(names(search(&players, "ALI")), ["Ali Yılmaz", "Kaan Ali"]);
    assert_eq!(names(search(&players, "kaya")), ["Mert Kaya"]);
    assert!(search(&players, "zzz").is_empty());
  }

  #[test]
  fn dashboard_counts_only_own_players() {
    let players = vec![
      player("A", "me", 2, 0),
      player("B", "other", 9, 1),
      player("C", "me", 1, 2),
    ];
    assert_eq!(
      dashboard_stats(&players, &PrincipalId::new("me")),
      DashboardStats { players: 2, likes: 3 }
    );
    assert_eq!(
      dashboard_stats(&players, &PrincipalId::new("nobody")),
      DashboardStats::default()
    );
  }

  #[test]
  fn like_labels() {
    assert_eq!(like_label(0), "0 likes");
    assert_eq!(like_label(1), "1 like");
    assert_eq!(like_label(12), "12 likes");
  }

  #[test]
  fn youtube_links_become_embeds() {
    let embed = Some("https://www.youtube.com/embed/dQw4w9WgXcQ".to_owned());
    assert_eq!(youtube_embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), embed);
    assert_eq!(youtube_embed_url("youtube.com/watch?t=10&v=dQw4w9WgXcQ"), embed);
    assert_eq!(youtube_embed_url("https://youtu.be/dQw4w9WgXcQ?t=3"), embed);
    assert_eq!(youtube_embed_url(" http://m.youtube.com/watch?v=dQw4w9WgXcQ "), embed);
  }

  #[test]
  fn other_links_have_no_embed() {
    assert_eq!(youtube_embed_url(""), None);
    assert_eq!(youtube_embed_url("https://vimeo.com/123"), None);
    assert_eq!(youtube_embed_url("https://www.youtube.com/watch?list=abc"), None);
    assert_eq!(youtube_embed_url("https://youtu.be/"), None);
  }
}
