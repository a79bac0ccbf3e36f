//! `scout`: terminal client for the scouting community store.
//!
//! # Usage
//!
//! ```text
//! scout --store ~/.local/share/scout/scout.db --uid alice --email alice@example.com
//! scout --config ~/.config/scout/config.toml --log-file /tmp/scout.log
//! ```

mod app;
mod form;
mod screens;
mod ui;

use std::{
  io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
  time::Duration,
};

use anyhow::{Context, Result, bail};
use app::App;
use clap::Parser;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use scout_core::{
  gate::Gate,
  identity::LocalIdentity,
  principal::{AuthUser, PrincipalId},
};
use scout_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "scout", about = "Terminal client for the scouting community store")]
struct Args {
  /// Path to a TOML config file (store, uid, email, admin).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// SQLite store shared with the server (default: ~/.local/share/scout/scout.db).
  #[arg(long, env = "SCOUT_STORE")]
  store: Option<PathBuf>,

  /// Identity to sign in as.
  #[arg(long, env = "SCOUT_UID")]
  uid: Option<String>,

  /// Email reported by the identity provider.
  #[arg(long, env = "SCOUT_EMAIL")]
  email: Option<String>,

  /// Principal id of the administrator.
  #[arg(long, env = "SCOUT_ADMIN")]
  admin: Option<String>,

  /// Write logs here; the terminal belongs to the UI.
  #[arg(long, value_name = "FILE", env = "SCOUT_LOG_FILE")]
  log_file: Option<PathBuf>,

  /// Start signed out.
  #[arg(long)]
  signed_out: bool,
}

// ─── Config file ──────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  store: String,
  #[serde(default)]
  uid:   String,
  #[serde(default)]
  email: String,
  #[serde(default)]
  admin: String,
}

fn pick(flag: Option<String>, file: &str) -> Option<String> {
  flag.or_else(|| (!file.is_empty()).then(|| file.to_owned()))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  if let Some(path) = &args.log_file {
    let file = std::fs::File::create(path)
      .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
      .with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
      )
      .with_writer(Mutex::new(file))
      .with_ansi(false)
      .init();
  }

  // CLI flags override config file, which overrides defaults.
  let store_path = args
    .store
    .or_else(|| (!file_cfg.store.is_empty()).then(|| PathBuf::from(&file_cfg.store)))
    .unwrap_or_else(|| PathBuf::from("~/.local/share/scout/scout.db"));
  let Some(uid) = pick(args.uid, &file_cfg.uid) else {
    bail!("no identity configured; pass --uid or set uid in the config file");
  };
  let email = pick(args.email, &file_cfg.email);
  let admin = pick(args.admin, &file_cfg.admin).unwrap_or_default();

  let store_path = expand_tilde(&store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating {}", parent.display()))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let user = AuthUser { id: PrincipalId::new(uid), email };
  let identity = if args.signed_out {
    LocalIdentity::new(user)
  } else {
    LocalIdentity::signed_in(user)
  };
  let gate = Gate::new(PrincipalId::new(admin));

  let mut app = App::new(Arc::new(store), gate, identity)
    .await
    .context("opening the dashboard")?;

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.tick().await?;
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
