//! SQL schema for the scout SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// There are no foreign keys between the tables: comments
/// outlive their player, and likes are addressed by `(kind, id)`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One profile document per principal, keyed by the provider-issued id.
CREATE TABLE IF NOT EXISTS users (
    principal_id   TEXT PRIMARY KEY,
    email          TEXT,
    first_name     TEXT,
    last_name      TEXT,
    phone          TEXT NOT NULL DEFAULT '',
    phone_verified INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL,   -- RFC 3339 UTC, microsecond precision
    updated_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS players (
    player_id          TEXT PRIMARY KEY,
    name               TEXT NOT NULL,
    name_normalized    TEXT NOT NULL,   -- not UNIQUE: checked by the caller
    position           TEXT NOT NULL,
    birth_year         INTEGER,
    club               TEXT NOT NULL DEFAULT '',
    country            TEXT NOT NULL DEFAULT '',
    note               TEXT NOT NULL DEFAULT '',
    youtube_link       TEXT NOT NULL DEFAULT '',
    transfermarkt_link TEXT NOT NULL DEFAULT '',
    image_url          TEXT NOT NULL DEFAULT '',
    owner_id           TEXT NOT NULL,
    owner_name         TEXT NOT NULL DEFAULT '',
    owner_email        TEXT,
    created_at         TEXT NOT NULL
);

-- players/{player_id}/comments
CREATE TABLE IF NOT EXISTS comments (
    comment_id  TEXT PRIMARY KEY,
    player_id   TEXT NOT NULL,
    text        TEXT NOT NULL,
    author_id   TEXT NOT NULL,
    author_name TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- Membership rows of every likes set.
CREATE TABLE IF NOT EXISTS likes (
    target_kind  TEXT NOT NULL,   -- 'player' | 'comment'
    target_id    TEXT NOT NULL,
    principal_id TEXT NOT NULL,
    PRIMARY KEY (target_kind, target_id, principal_id)
);

CREATE INDEX IF NOT EXISTS players_name_idx    ON players(name_normalized);
CREATE INDEX IF NOT EXISTS players_owner_idx   ON players(owner_id);
CREATE INDEX IF NOT EXISTS players_created_idx ON players(created_at);
CREATE INDEX IF NOT EXISTS comments_player_idx ON comments(player_id, created_at);

PRAGMA user_version = 1;
";
