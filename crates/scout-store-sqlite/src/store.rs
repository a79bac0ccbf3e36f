//! [`SqliteStore`]: the SQLite implementation of [`DocumentStore`].

use std::{future::Future, path::Path};

use rusqlite::OptionalExtension as _;
use scout_core::{
  comment::{Comment, NewComment},
  mirror::Subscription,
  player::{LikeTarget, NewPlayer, Player, PlayerPatch},
  principal::{AuthUser, Principal, PrincipalId, ProfileUpdate},
  store::DocumentStore,
};
use tokio::sync::{
  broadcast::{self, error::RecvError},
  oneshot, watch,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    COMMENT_KIND, COMMENT_SELECT, PLAYER_KIND, PLAYER_SELECT, RawComment, RawPlayer,
    RawUser, USER_SELECT, encode_dt, encode_target, encode_uuid, now,
  },
  schema::SCHEMA,
};

/// How many unread change notices a feed may fall behind by before it is
/// told it lagged. A lagging feed simply reloads.
const CHANGE_BUFFER: usize = 64;

/// Which collection a write touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
  Profiles,
  Players,
  /// `players/{id}/comments`
  Comments(Uuid),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A scout document store backed by a single SQLite file.
///
/// Cloning is cheap: the connection and the change channel are both shared.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  changes: broadcast::Sender<Change>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    let (changes, _) = broadcast::channel(CHANGE_BUFFER);
    Ok(Self { conn, changes })
  }

  fn notify(&self, change: Change) {
    // No open feeds means nobody to tell.
    let _ = self.changes.send(change);
  }

  // ── Loaders ─────────────────────────────────────────────────────────────

  async fn load_profiles(&self) -> Result<Vec<Principal>> {
    let sql = format!("{USER_SELECT} ORDER BY created_at DESC, rowid DESC");
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawUser::into_principal).collect()
  }

  async fn load_profile(&self, id: PrincipalId) -> Result<Option<Principal>> {
    let sql = format!("{USER_SELECT} WHERE principal_id = ?1");
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id.as_str()], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;
    raw.map(RawUser::into_principal).transpose()
  }

  /// Players matching `filter` (a SQL predicate over `p` binding at most
  /// `?1`, or empty), newest first.
  async fn load_players(
    &self,
    filter: &'static str,
    arg: Option<String>,
  ) -> Result<Vec<Player>> {
    let sql =
      format!("{PLAYER_SELECT} {filter} ORDER BY p.created_at DESC, p.rowid DESC");
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(arg.iter()), RawPlayer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawPlayer::into_player).collect()
  }

  async fn load_comments(&self, player_id: Uuid) -> Result<Vec<Comment>> {
    let sql = format!(
      "{COMMENT_SELECT} WHERE c.player_id = ?1 ORDER BY c.created_at DESC, c.rowid DESC"
    );
    let id_str = encode_uuid(player_id);
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawComment::into_comment).collect()
  }

  // ── Feeds ───────────────────────────────────────────────────────────────

  /// Open a live feed: take a snapshot with `load`, then reload it every
  /// time a change `wants` accepts is announced, until the subscription is
  /// cancelled or dropped.
  async fn feed<T, W, L, Fut>(
    &self,
    label: &'static str,
    wants: W,
    load: L,
  ) -> Result<Subscription<T>>
  where
    T: Send + Sync + 'static,
    W: Fn(&Change) -> bool + Send + 'static,
    L: Fn(SqliteStore) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
  {
    // Subscribe before the first load so no write can fall in between.
    let mut changes = self.changes.subscribe();
    let initial = load(self.clone()).await?;

    let (tx, rx) = watch::channel(initial);
    let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
    let store = self.clone();

    tokio::spawn(async move {
      loop {
        tokio::select! {
          _ = &mut cancel_rx => break,
          _ = tx.closed() => break,
          change = changes.recv() => match change {
            Ok(change) if !wants(&change) => continue,
            Ok(_) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => break,
          },
        }
        match load(store.clone()).await {
          Ok(snapshot) => {
            tx.send_replace(snapshot);
          }
          Err(e) => warn!(feed = label, error = %e, "snapshot reload failed"),
        }
      }
      debug!(feed = label, "feed closed");
    });

    Ok(Subscription::new(rx, cancel_tx))
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ───────────────────────────────────────────────────────────────

  async fn get_profile(&self, id: PrincipalId) -> Result<Option<Principal>> {
    self.load_profile(id).await
  }

  async fn ensure_profile(&self, user: AuthUser) -> Result<Principal> {
    let id = user.id.clone();
    let at_str = encode_dt(now());
    let select = format!("{USER_SELECT} WHERE principal_id = ?1");
    let (created, raw) = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO users (principal_id, email, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)
           ON CONFLICT(principal_id) DO NOTHING",
          rusqlite::params![user.id.as_str(), user.email, at_str],
        )?;
        let raw = conn.query_row(
          &select,
          rusqlite::params![user.id.as_str()],
          RawUser::from_row,
        )?;
        Ok((n > 0, raw))
      })
      .await?;
    if created {
      debug!(principal = %id, "profile created on first sign-in");
      self.notify(Change::Profiles);
    }
    raw.into_principal()
  }

  async fn save_profile(&self, update: ProfileUpdate) -> Result<Principal> {
    let at_str = encode_dt(now());
    let select = format!("{USER_SELECT} WHERE principal_id = ?1");
    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             principal_id, email, first_name, last_name, phone, phone_verified,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
           ON CONFLICT(principal_id) DO UPDATE SET
             email          = excluded.email,
             first_name     = excluded.first_name,
             last_name      = excluded.last_name,
             phone          = excluded.phone,
             phone_verified = excluded.phone_verified,
             updated_at     = excluded.updated_at",
          rusqlite::params![
            update.id.as_str(),
            update.email,
            update.first_name,
            update.last_name,
            update.phone,
            update.phone_verified,
            at_str,
          ],
        )?;
        Ok(conn.query_row(
          &select,
          rusqlite::params![update.id.as_str()],
          RawUser::from_row,
        )?)
      })
      .await?;
    self.notify(Change::Profiles);
    raw.into_principal()
  }

  async fn delete_profile(&self, id: PrincipalId) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM users WHERE principal_id = ?1",
          rusqlite::params![id.as_str()],
        )?;
        Ok(n > 0)
      })
      .await?;
    if deleted {
      self.notify(Change::Profiles);
    }
    Ok(deleted)
  }

  async fn list_profiles(&self) -> Result<Vec<Principal>> { self.load_profiles().await }

  async fn subscribe_profiles(&self) -> Result<Subscription<Principal>> {
    self
      .feed(
        "profiles",
        |c| *c == Change::Profiles,
        |s| async move { s.load_profiles().await },
      )
      .await
  }

  // ── Players ─────────────────────────────────────────────────────────────

  async fn insert_player(&self, input: NewPlayer) -> Result<Player> {
    let player = Player {
      id:                 Uuid::new_v4(),
      name:               input.name,
      name_normalized:    input.name_normalized,
      position:           input.position,
      birth_year:         input.birth_year,
      club:               input.club,
      country:            input.country,
      note:               input.note,
      youtube_link:       String::new(),
      transfermarkt_link: String::new(),
      image_url:          String::new(),
      owner_id:           input.owner_id,
      owner_name:         input.owner_name,
      owner_email:        input.owner_email,
      liked_by:           Default::default(),
      created_at:         now(),
    };

    let row = player.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO players (
             player_id, name, name_normalized, position, birth_year, club,
             country, note, youtube_link, transfermarkt_link, image_url,
             owner_id, owner_name, owner_email, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
          rusqlite::params![
            encode_uuid(row.id),
            row.name,
            row.name_normalized,
            row.position,
            row.birth_year,
            row.club,
            row.country,
            row.note,
            row.youtube_link,
            row.transfermarkt_link,
            row.image_url,
            row.owner_id.as_str(),
            row.owner_name,
            row.owner_email,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;
    self.notify(Change::Players);
    Ok(player)
  }

  async fn get_player(&self, id: Uuid) -> Result<Option<Player>> {
    let mut found = self
      .load_players("WHERE p.player_id = ?1", Some(encode_uuid(id)))
      .await?;
    Ok(found.pop())
  }

  async fn list_players(&self) -> Result<Vec<Player>> { self.load_players("", None).await }

  async fn player_name_exists(&self, name_normalized: String) -> Result<bool> {
    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (SELECT 1 FROM players WHERE name_normalized = ?1)",
          rusqlite::params![name_normalized],
          |r| r.get::<_, bool>(0),
        )?)
      })
      .await?;
    Ok(exists)
  }

  async fn players_owned_by(&self, owner: PrincipalId) -> Result<Vec<Player>> {
    self
      .load_players("WHERE p.owner_id = ?1", Some(owner.as_str().to_owned()))
      .await
  }

  async fn update_player(&self, id: Uuid, patch: PlayerPatch) -> Result<bool> {
    let id_str = encode_uuid(id);
    let updated = self
      .conn
      .call(move |conn| {
        let n = match patch {
          PlayerPatch::Note(note) => conn.execute(
            "UPDATE players SET note = ?2 WHERE player_id = ?1",
            rusqlite::params![id_str, note],
          )?,
          PlayerPatch::ExternalLink(link) => conn.execute(
            "UPDATE players SET transfermarkt_link = ?2 WHERE player_id = ?1",
            rusqlite::params![id_str, link],
          )?,
          PlayerPatch::Links { video, external } => conn.execute(
            "UPDATE players SET youtube_link = ?2, transfermarkt_link = ?3
             WHERE player_id = ?1",
            rusqlite::params![id_str, video, external],
          )?,
        };
        Ok(n > 0)
      })
      .await?;
    if updated {
      self.notify(Change::Players);
    }
    Ok(updated)
  }

  async fn delete_player(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM likes WHERE target_kind = ?1 AND target_id = ?2",
          rusqlite::params![PLAYER_KIND, id_str],
        )?;
        let n = tx.execute(
          "DELETE FROM players WHERE player_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;
    if deleted {
      self.notify(Change::Players);
    }
    Ok(deleted)
  }

  async fn subscribe_players(&self) -> Result<Subscription<Player>> {
    self
      .feed(
        "players",
        |c| *c == Change::Players,
        |s| async move { s.load_players("", None).await },
      )
      .await
  }

  // ── Comments ────────────────────────────────────────────────────────────

  async fn insert_comment(&self, input: NewComment) -> Result<Comment> {
    let comment = Comment {
      id:          Uuid::new_v4(),
      player_id:   input.player_id,
      text:        input.text,
      author_id:   input.author_id,
      author_name: input.author_name,
      liked_by:    Default::default(),
      created_at:  now(),
    };

    let row = comment.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (
             comment_id, player_id, text, author_id, author_name, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            encode_uuid(row.id),
            encode_uuid(row.player_id),
            row.text,
            row.author_id.as_str(),
            row.author_name,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;
    self.notify(Change::Comments(comment.player_id));
    Ok(comment)
  }

  async fn get_comment(&self, player_id: Uuid, comment_id: Uuid) -> Result<Option<Comment>> {
    let sql = format!("{COMMENT_SELECT} WHERE c.player_id = ?1 AND c.comment_id = ?2");
    let (player_str, comment_str) = (encode_uuid(player_id), encode_uuid(comment_id));
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params![player_str, comment_str],
              RawComment::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawComment::into_comment).transpose()
  }

  async fn list_comments(&self, player_id: Uuid) -> Result<Vec<Comment>> {
    self.load_comments(player_id).await
  }

  async fn delete_comment(&self, player_id: Uuid, comment_id: Uuid) -> Result<bool> {
    let (player_str, comment_str) = (encode_uuid(player_id), encode_uuid(comment_id));
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "DELETE FROM comments WHERE player_id = ?1 AND comment_id = ?2",
          rusqlite::params![player_str, comment_str],
        )?;
        if n > 0 {
          tx.execute(
            "DELETE FROM likes WHERE target_kind = ?1 AND target_id = ?2",
            rusqlite::params![COMMENT_KIND, comment_str],
          )?;
        }
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;
    if deleted {
      self.notify(Change::Comments(player_id));
    }
    Ok(deleted)
  }

  async fn subscribe_comments(&self, player_id: Uuid) -> Result<Subscription<Comment>> {
    self
      .feed(
        "comments",
        move |c| *c == Change::Comments(player_id),
        move |s| async move { s.load_comments(player_id).await },
      )
      .await
  }

  // ── Likes ───────────────────────────────────────────────────────────────

  async fn set_like(
    &self,
    target: LikeTarget,
    principal: PrincipalId,
    liked: bool,
  ) -> Result<bool> {
    let (kind, target_str) = encode_target(target);
    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists: bool = match target {
          LikeTarget::Player { player_id } => tx.query_row(
            "SELECT EXISTS (SELECT 1 FROM players WHERE player_id = ?1)",
            rusqlite::params![encode_uuid(player_id)],
            |r| r.get(0),
          )?,
          LikeTarget::Comment { player_id, comment_id } => tx.query_row(
            "SELECT EXISTS (
               SELECT 1 FROM comments WHERE player_id = ?1 AND comment_id = ?2
             )",
            rusqlite::params![encode_uuid(player_id), encode_uuid(comment_id)],
            |r| r.get(0),
          )?,
        };
        if !exists {
          return Ok(false);
        }
        if liked {
          tx.execute(
            "INSERT OR IGNORE INTO likes (target_kind, target_id, principal_id)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![kind, target_str, principal.as_str()],
          )?;
        } else {
          tx.execute(
            "DELETE FROM likes
             WHERE target_kind = ?1 AND target_id = ?2 AND principal_id = ?3",
            rusqlite::params![kind, target_str, principal.as_str()],
          )?;
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if found {
      self.notify(match target {
        LikeTarget::Player { .. } => Change::Players,
        LikeTarget::Comment { player_id, .. } => Change::Comments(player_id),
      });
    }
    Ok(found)
  }
}
