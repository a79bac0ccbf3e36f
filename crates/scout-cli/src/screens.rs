//! Per-screen state. Every screen owns the mirrors it renders, so leaving a
//! screen drops them and cancels their subscriptions.

use scout_core::{
  comment::Comment,
  mirror::Mirror,
  player::Player,
  principal::Principal,
  store::DocumentStore,
  views::{self, Ranked},
};
use scout_store_sqlite::{Result, SqliteStore};
use uuid::Uuid;

/// The top-level tabs, reachable with `1`–`4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Dashboard,
  Ranking,
  Profile,
  Admin,
}

impl Tab {
  pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Ranking, Tab::Profile, Tab::Admin];

  pub fn label(self) -> &'static str {
    match self {
      Tab::Dashboard => "Players",
      Tab::Ranking => "Ranking",
      Tab::Profile => "Profile",
      Tab::Admin => "Admin",
    }
  }
}

pub enum Screen {
  Dashboard(Dashboard),
  Ranking(Ranking),
  Detail(Detail),
  Profile,
  Admin(Admin),
}

impl Screen {
  /// The tab highlighted in the header. A detail view belongs to the list it
  /// was opened from.
  pub fn tab(&self) -> Tab {
    match self {
      Screen::Dashboard(_) => Tab::Dashboard,
      Screen::Ranking(_) => Tab::Ranking,
      Screen::Detail(d) => d.back,
      Screen::Profile => Tab::Profile,
      Screen::Admin(_) => Tab::Admin,
    }
  }

  /// Pull the latest snapshots into every mirror the screen holds.
  pub fn sync(&mut self) {
    match self {
      Screen::Dashboard(d) => {
        d.players.sync();
        let len = d.visible().len();
        clamp(&mut d.cursor, len);
      }
      Screen::Ranking(r) => {
        r.players.sync();
        clamp(&mut r.cursor, r.players.len());
      }
      Screen::Detail(d) => {
        d.players.sync();
        d.comments.sync();
        clamp(&mut d.cursor, d.comments.len());
      }
      Screen::Profile => {}
      Screen::Admin(a) => {
        a.users.sync();
        a.players.sync();
        clamp(&mut a.user_cursor, a.users.len());
        clamp(&mut a.player_cursor, a.players.len());
      }
    }
  }
}

// ─── Cursor helpers ───────────────────────────────────────────────────────────

/// Move `cursor` by `delta`, staying inside `0..len`.
pub fn step(cursor: &mut usize, len: usize, delta: isize) {
  if len == 0 {
    *cursor = 0;
    return;
  }
  *cursor = cursor.saturating_add_signed(delta).min(len - 1);
}

pub fn clamp(cursor: &mut usize, len: usize) {
  *cursor = (*cursor).min(len.saturating_sub(1));
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

pub struct Dashboard {
  pub players:       Mirror<Player>,
  pub cursor:        usize,
  pub filter:        String,
  pub filter_active: bool,
}

impl Dashboard {
  pub async fn open(store: &SqliteStore) -> Result<Self> {
    Ok(Self {
      players:       Mirror::new(store.subscribe_players().await?),
      cursor:        0,
      filter:        String::new(),
      filter_active: false,
    })
  }

  pub fn visible(&self) -> Vec<&Player> { views::search(self.players.items(), &self.filter) }

  pub fn selected(&self) -> Option<&Player> { self.visible().get(self.cursor).copied() }
}

// ─── Ranking ──────────────────────────────────────────────────────────────────

pub struct Ranking {
  pub players: Mirror<Player>,
  pub cursor:  usize,
}

impl Ranking {
  pub async fn open(store: &SqliteStore) -> Result<Self> {
    Ok(Self { players: Mirror::new(store.subscribe_players().await?), cursor: 0 })
  }

  pub fn ranked(&self) -> Vec<Ranked> { views::ranking(self.players.items()) }

  pub fn selected(&self) -> Option<Player> {
    self.ranked().into_iter().nth(self.cursor).map(|r| r.player)
  }
}

// ─── Detail ───────────────────────────────────────────────────────────────────

/// One player and its comment thread. The player is re-read from the
/// collection mirror so likes and edits by others show up live.
pub struct Detail {
  pub player_id: Uuid,
  pub players:   Mirror<Player>,
  pub comments:  Mirror<Comment>,
  pub cursor:    usize,
  pub back:      Tab,
}

impl Detail {
  pub async fn open(store: &SqliteStore, player_id: Uuid, back: Tab) -> Result<Self> {
    Ok(Self {
      player_id,
      players: Mirror::new(store.subscribe_players().await?),
      comments: Mirror::new(store.subscribe_comments(player_id).await?),
      cursor: 0,
      back,
    })
  }

  pub fn player(&self) -> Option<&Player> { self.players.find(|p| p.id == self.player_id) }

  pub fn selected_comment(&self) -> Option<&Comment> { self.comments.items().get(self.cursor) }
}

// ─── Admin ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminPane {
  Users,
  Players,
}

pub struct Admin {
  pub users:         Mirror<Principal>,
  pub players:       Mirror<Player>,
  pub pane:          AdminPane,
  pub user_cursor:   usize,
  pub player_cursor: usize,
}

impl Admin {
  pub async fn open(store: &SqliteStore) -> Result<Self> {
    Ok(Self {
      users:         Mirror::new(store.subscribe_profiles().await?),
      players:       Mirror::new(store.subscribe_players().await?),
      pane:          AdminPane::Users,
      user_cursor:   0,
      player_cursor: 0,
    })
  }

  pub fn toggle_pane(&mut self) {
    self.pane = match self.pane {
      AdminPane::Users => AdminPane::Players,
      AdminPane::Players => AdminPane::Users,
    };
  }

  pub fn move_cursor(&mut self, delta: isize) {
    match self.pane {
      AdminPane::Users => step(&mut self.user_cursor, self.users.len(), delta),
      AdminPane::Players => step(&mut self.player_cursor, self.players.len(), delta),
    }
  }

  pub fn selected_user(&self) -> Option<&Principal> { self.users.items().get(self.user_cursor) }

  pub fn selected_player(&self) -> Option<&Player> {
    self.players.items().get(self.player_cursor)
  }

  /// Players owned by `user`, as shown next to the account.
  pub fn owned_count(&self, user: &Principal) -> usize {
    self.players.items().iter().filter(|p| p.owner_id == user.id).count()
  }
}
