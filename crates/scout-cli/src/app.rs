//! Application state and key handling.
//!
//! Writes never run on the UI task. Each one is spawned under the [`Busy`]
//! flag of its [`Lane`], so a slow save never blocks a like, and reports back
//! through an unbounded channel that [`App::tick`] drains between frames.

use std::{future::Future, sync::Arc};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use scout_core::{
  Error,
  busy::Busy,
  comment::Comment,
  gate::{Action, Gate},
  identity::{IdentityProvider, IdentityResolver, LocalIdentity},
  mutations::Mutations,
  player::{Likeable, Player},
  principal::{Principal, PrincipalId},
};
use scout_store_sqlite::SqliteStore;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
  form::{Form, FormEvent, FormKind},
  screens::{Admin, AdminPane, Dashboard, Detail, Ranking, Screen, Tab, step},
};

// ─── Outcomes ─────────────────────────────────────────────────────────────────

/// What a finished write hands back to the UI.
#[derive(Debug)]
pub enum Outcome {
  Message(String),
  PlayerCreated(Player),
  ProfileSaved(Principal),
}

type Completion = Result<Outcome, Error>;

/// Kinds of write that may be in flight at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
  /// Like toggles.
  Like,
  /// Submissions from the open form.
  Form,
  /// Confirmed deletions.
  Delete,
}

/// One [`Busy`] flag per [`Lane`].
#[derive(Debug, Clone, Default)]
pub struct Writes {
  pub like:   Busy,
  pub form:   Busy,
  pub delete: Busy,
}

impl Writes {
  pub fn lane(&self, lane: Lane) -> &Busy {
    match lane {
      Lane::Like => &self.like,
      Lane::Form => &self.form,
      Lane::Delete => &self.delete,
    }
  }

  pub fn is_busy(&self) -> bool {
    self.like.is_busy() || self.form.is_busy() || self.delete.is_busy()
  }
}

/// A destructive action waiting for `y`.
#[derive(Debug, Clone)]
pub enum Confirm {
  DeleteComment(Comment),
  DeletePlayer { id: Uuid, name: String },
  DeletePrincipal { id: PrincipalId, label: String },
}

impl Confirm {
  pub fn prompt(&self) -> String {
    match self {
      Confirm::DeleteComment(_) => "Delete this comment?".into(),
      Confirm::DeletePlayer { name, .. } => format!("Delete {name}?"),
      Confirm::DeletePrincipal { label, .. } => {
        format!("Delete {label} and every player they added?")
      }
    }
  }
}

/// How a failed write reads in the status bar.
pub fn describe(e: &Error) -> String {
  match e {
    Error::Denied(d) => capitalize(&d.to_string()),
    Error::Invalid(i) => capitalize(&i.to_string()),
    Error::PlayerNotFound(_) => "That player no longer exists.".into(),
    Error::CommentNotFound(_) => "That comment no longer exists.".into(),
    Error::PrincipalNotFound(_) => "That account no longer exists.".into(),
    Error::PartialCascade { .. } => capitalize(&e.to_string()),
    Error::Store(_) => "Something went wrong, please try again.".into(),
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

pub struct App {
  pub screen:     Screen,
  pub form:       Option<Form>,
  pub confirm:    Option<Confirm>,
  pub status_msg: String,
  pub writes:     Writes,
  pub resolver:   IdentityResolver<SqliteStore>,
  identity:       LocalIdentity,
  store:          Arc<SqliteStore>,
  mutations:      Mutations<SqliteStore>,
  outcomes_tx:    mpsc::UnboundedSender<Completion>,
  outcomes_rx:    mpsc::UnboundedReceiver<Completion>,
}

impl App {
  pub async fn new(
    store: Arc<SqliteStore>,
    gate: Gate,
    identity: LocalIdentity,
  ) -> scout_store_sqlite::Result<Self> {
    let resolver = IdentityResolver::new(Arc::clone(&store), gate.clone(), &identity).await;
    let mutations = Mutations::new(Arc::clone(&store), gate);
    let screen = Screen::Dashboard(Dashboard::open(&store).await?);
    let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
    Ok(Self {
      screen,
      form: None,
      confirm: None,
      status_msg: String::new(),
      writes: Writes::default(),
      resolver,
      identity,
      store,
      mutations,
      outcomes_tx,
      outcomes_rx,
    })
  }

  pub fn principal(&self) -> Option<&Principal> { self.resolver.principal() }

  pub fn gate(&self) -> &Gate { self.resolver.gate() }

  /// Whether any write is still in flight.
  pub fn is_busy(&self) -> bool { self.writes.is_busy() }

  // ── Per-frame work ────────────────────────────────────────────────────

  /// Apply auth transitions, sync mirrors and collect finished writes.
  pub async fn tick(&mut self) -> Result<()> {
    if self.resolver.refresh().await
      && matches!(self.screen, Screen::Admin(_))
      && !self.gate().is_admin(self.principal())
    {
      self.switch(Tab::Dashboard).await?;
    }

    self.screen.sync();

    while let Ok(done) = self.outcomes_rx.try_recv() {
      self.complete(done);
    }

    if let Screen::Detail(detail) = &self.screen
      && detail.player().is_none()
    {
      let back = detail.back;
      self.switch(back).await?;
      self.status_msg = "That player was removed.".into();
    }
    Ok(())
  }

  fn complete(&mut self, done: Completion) {
    match done {
      Ok(outcome) => {
        debug!(?outcome, "write finished");
        if self.form.as_ref().is_some_and(|f| f.submitting) {
          self.form = None;
        }
        self.status_msg = match outcome {
          Outcome::Message(msg) => msg,
          Outcome::PlayerCreated(player) => format!("Added {}.", player.name),
          Outcome::ProfileSaved(profile) => {
            let verified = profile.phone_verified;
            self.resolver.adopt_profile(profile);
            if verified {
              "Profile saved.".into()
            } else {
              "Profile saved. Add a phone number to take part.".into()
            }
          }
        };
      }
      Err(e) => {
        match &e {
          Error::Store(source) => error!(error = %source, "write failed in the store"),
          Error::PartialCascade { attempted, failed } => {
            warn!(attempted, failed, "account deletion left players behind")
          }
          _ => info!(reason = %e, "write refused"),
        }
        if let Some(form) = &mut self.form {
          form.submitting = false;
        }
        self.status_msg = describe(&e);
      }
    }
  }

  /// Run `work` in the background unless a write in the same lane is still
  /// in flight.
  fn spawn<F>(&mut self, lane: Lane, work: F) -> bool
  where
    F: Future<Output = Completion> + Send + 'static,
  {
    let Some(guard) = self.writes.lane(lane).try_enter() else {
      debug!(?lane, "write skipped, lane busy");
      self.status_msg = "Still working on the previous action…".into();
      return false;
    };
    let tx = self.outcomes_tx.clone();
    tokio::spawn(async move {
      let _guard = guard;
      let _ = tx.send(work.await);
    });
    true
  }

  /// Gate `action` up front so a denied user never sees the form.
  fn permit(&mut self, action: Action<'_>) -> bool {
    let verdict = self.gate().check(self.principal(), action).map(|_| ());
    match verdict {
      Ok(()) => true,
      Err(denial) => {
        self.status_msg = capitalize(&denial.to_string());
        false
      }
    }
  }

  // ── Navigation ────────────────────────────────────────────────────────

  async fn switch(&mut self, tab: Tab) -> Result<()> {
    if tab == Tab::Admin && !self.permit(Action::ViewAdminPanel) {
      return Ok(());
    }
    self.screen = match tab {
      Tab::Dashboard => Screen::Dashboard(Dashboard::open(&self.store).await?),
      Tab::Ranking => Screen::Ranking(Ranking::open(&self.store).await?),
      Tab::Profile => Screen::Profile,
      Tab::Admin => Screen::Admin(Admin::open(&self.store).await?),
    };
    Ok(())
  }

  async fn open_detail(&mut self, player_id: Uuid, back: Tab) -> Result<()> {
    self.screen = Screen::Detail(Detail::open(&self.store, player_id, back).await?);
    Ok(())
  }

  async fn toggle_session(&mut self) -> Result<()> {
    if self.principal().is_some() {
      let Ok(()) = self.identity.sign_out().await;
      self.status_msg = "Signed out.".into();
    } else {
      let Ok(_) = self.identity.sign_in().await;
      self.status_msg = "Signed in.".into();
    }
    if self.resolver.refresh().await
      && matches!(self.screen, Screen::Admin(_))
      && !self.gate().is_admin(self.principal())
    {
      self.switch(Tab::Dashboard).await?;
    }
    Ok(())
  }

  // ── Key handling ──────────────────────────────────────────────────────

  /// Returns `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      return Ok(false);
    }

    if let Some(form) = &mut self.form {
      match form.handle_key(key) {
        FormEvent::Continue => {}
        FormEvent::Cancel => self.form = None,
        FormEvent::Submit => self.submit(),
      }
      return Ok(true);
    }

    if let Some(confirm) = self.confirm.take() {
      if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        self.run_confirmed(confirm);
      } else {
        self.status_msg = "Cancelled.".into();
      }
      return Ok(true);
    }

    if let Screen::Dashboard(d) = &mut self.screen
      && d.filter_active
    {
      match key.code {
        KeyCode::Esc => {
          d.filter.clear();
          d.filter_active = false;
        }
        KeyCode::Enter => d.filter_active = false,
        KeyCode::Backspace => {
          d.filter.pop();
        }
        KeyCode::Char(c) => d.filter.push(c),
        _ => {}
      }
      d.cursor = 0;
      return Ok(true);
    }

    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Char('1') => self.switch(Tab::Dashboard).await?,
      KeyCode::Char('2') => self.switch(Tab::Ranking).await?,
      KeyCode::Char('3') => self.switch(Tab::Profile).await?,
      KeyCode::Char('4') => self.switch(Tab::Admin).await?,
      KeyCode::Char('s') => self.toggle_session().await?,
      _ => match self.screen {
        Screen::Dashboard(_) => self.handle_dashboard_key(key).await?,
        Screen::Ranking(_) => self.handle_ranking_key(key).await?,
        Screen::Detail(_) => self.handle_detail_key(key).await?,
        Screen::Profile => self.handle_profile_key(key),
        Screen::Admin(_) => self.handle_admin_key(key).await?,
      },
    }
    Ok(true)
  }

  async fn handle_dashboard_key(&mut self, key: KeyEvent) -> Result<()> {
    let Screen::Dashboard(d) = &mut self.screen else { return Ok(()) };
    let len = d.visible().len();
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => step(&mut d.cursor, len, 1),
      KeyCode::Up | KeyCode::Char('k') => step(&mut d.cursor, len, -1),
      KeyCode::Char('/') => d.filter_active = true,
      KeyCode::Esc => d.filter.clear(),
      KeyCode::Enter => {
        if let Some(id) = d.selected().map(|p| p.id) {
          self.open_detail(id, Tab::Dashboard).await?;
        }
      }
      KeyCode::Char('l') => {
        if let Some(player) = d.selected().cloned() {
          self.toggle_like(player);
        }
      }
      KeyCode::Char('a') => {
        if self.permit(Action::AddPlayer) {
          self.form = Some(Form::add_player());
        }
      }
      _ => {}
    }
    Ok(())
  }

  async fn handle_ranking_key(&mut self, key: KeyEvent) -> Result<()> {
    let Screen::Ranking(r) = &mut self.screen else { return Ok(()) };
    let len = r.players.len();
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => step(&mut r.cursor, len, 1),
      KeyCode::Up | KeyCode::Char('k') => step(&mut r.cursor, len, -1),
      KeyCode::Enter => {
        if let Some(player) = r.selected() {
          self.open_detail(player.id, Tab::Ranking).await?;
        }
      }
      KeyCode::Char('l') => {
        if let Some(player) = r.selected() {
          self.toggle_like(player);
        }
      }
      _ => {}
    }
    Ok(())
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> Result<()> {
    let Screen::Detail(d) = &mut self.screen else { return Ok(()) };
    let len = d.comments.len();
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => step(&mut d.cursor, len, 1),
      KeyCode::Up | KeyCode::Char('k') => step(&mut d.cursor, len, -1),
      KeyCode::Esc | KeyCode::Backspace => {
        let back = d.back;
        self.switch(back).await?;
      }
      _ => {
        let Some(player) = d.player().cloned() else { return Ok(()) };
        let comment = d.selected_comment().cloned();
        self.handle_player_action(key, player, comment);
      }
    }
    Ok(())
  }

  fn handle_player_action(&mut self, key: KeyEvent, player: Player, comment: Option<Comment>) {
    match key.code {
      KeyCode::Char('l') => self.toggle_like(player),
      KeyCode::Char('L') => {
        if let Some(comment) = comment {
          self.toggle_like(comment);
        }
      }
      KeyCode::Char('c') => {
        if self.permit(Action::Comment) {
          self.form = Some(Form::comment(player));
        }
      }
      KeyCode::Char('n') => {
        if self.permit(Action::EditNote(&player)) {
          self.form = Some(Form::note(player));
        }
      }
      KeyCode::Char('t') => {
        if self.permit(Action::EditExternalLink(&player)) {
          self.form = Some(Form::external_link(player));
        }
      }
      KeyCode::Char('v') => {
        if self.permit(Action::EditVideoLink) {
          self.form = Some(Form::links(&player));
        }
      }
      KeyCode::Char('d') => {
        if let Some(comment) = comment
          && self.permit(Action::DeleteComment(&comment))
        {
          self.confirm = Some(Confirm::DeleteComment(comment));
        }
      }
      KeyCode::Char('x') => {
        if self.permit(Action::DeletePlayer) {
          self.confirm = Some(Confirm::DeletePlayer { id: player.id, name: player.name });
        }
      }
      _ => {}
    }
  }

  fn handle_profile_key(&mut self, key: KeyEvent) {
    if !matches!(key.code, KeyCode::Char('e') | KeyCode::Enter) {
      return;
    }
    let form = self
      .principal()
      .filter(|p| self.gate().permits(Some(*p), Action::EditOwnProfile))
      .map(Form::profile);
    match form {
      Some(form) => self.form = Some(form),
      None => self.status_msg = "Sign in to edit your profile.".into(),
    }
  }

  async fn handle_admin_key(&mut self, key: KeyEvent) -> Result<()> {
    let Screen::Admin(a) = &mut self.screen else { return Ok(()) };
    match key.code {
      KeyCode::Tab | KeyCode::BackTab => a.toggle_pane(),
      KeyCode::Down | KeyCode::Char('j') => a.move_cursor(1),
      KeyCode::Up | KeyCode::Char('k') => a.move_cursor(-1),
      KeyCode::Enter if a.pane == AdminPane::Players => {
        if let Some(id) = a.selected_player().map(|p| p.id) {
          self.open_detail(id, Tab::Admin).await?;
        }
      }
      KeyCode::Char('d') => {
        self.confirm = match a.pane {
          AdminPane::Users => a.selected_user().map(|u| Confirm::DeletePrincipal {
            id:    u.id.clone(),
            label: u.display_name(),
          }),
          AdminPane::Players => a.selected_player().map(|p| Confirm::DeletePlayer {
            id:   p.id,
            name: p.name.clone(),
          }),
        };
      }
      _ => {}
    }
    Ok(())
  }

  // ── Writes ────────────────────────────────────────────────────────────

  fn toggle_like<T>(&mut self, target: T)
  where
    T: Likeable + Send + Sync + 'static,
  {
    let principal = self.principal().cloned();
    let m = self.mutations.clone();
    self.spawn(Lane::Like, async move {
      let liked = m.toggle_like(principal.as_ref(), &target).await?;
      let msg = if liked { "Liked." } else { "Like removed." };
      Ok(Outcome::Message(msg.into()))
    });
  }

  fn submit(&mut self) {
    let Some(form) = &self.form else { return };
    let principal = self.principal().cloned();
    let m = self.mutations.clone();

    let spawned = match form.kind.clone() {
      FormKind::AddPlayer => {
        let input = form.player_form();
        self.spawn(Lane::Form, async move {
          m.create_player(principal.as_ref(), &input)
            .await
            .map(Outcome::PlayerCreated)
        })
      }
      FormKind::Comment(player) => {
        let text = form.value(0).to_owned();
        self.spawn(Lane::Form, async move {
          m.add_comment(principal.as_ref(), &player, &text).await?;
          Ok(Outcome::Message("Comment posted.".into()))
        })
      }
      FormKind::Note(player) => {
        let note = form.value(0).to_owned();
        self.spawn(Lane::Form, async move {
          m.save_note(principal.as_ref(), &player, &note).await?;
          Ok(Outcome::Message("Note saved.".into()))
        })
      }
      FormKind::ExternalLink(player) => {
        let link = form.value(0).to_owned();
        self.spawn(Lane::Form, async move {
          m.save_external_link(principal.as_ref(), &player, &link).await?;
          Ok(Outcome::Message("Link saved.".into()))
        })
      }
      FormKind::Links(player_id) => {
        let video = form.value(0).to_owned();
        let external = form.value(1).to_owned();
        self.spawn(Lane::Form, async move {
          m.save_links(principal.as_ref(), player_id, &video, &external).await?;
          Ok(Outcome::Message("Links saved.".into()))
        })
      }
      FormKind::Profile => {
        let input = form.profile_form();
        self.spawn(Lane::Form, async move {
          m.save_profile(principal.as_ref(), &input)
            .await
            .map(Outcome::ProfileSaved)
        })
      }
    };

    if spawned && let Some(form) = &mut self.form {
      form.submitting = true;
    }
  }

  fn run_confirmed(&mut self, confirm: Confirm) {
    let principal = self.principal().cloned();
    let m = self.mutations.clone();
    match confirm {
      Confirm::DeleteComment(comment) => {
        self.spawn(Lane::Delete, async move {
          m.delete_comment(principal.as_ref(), &comment).await?;
          Ok(Outcome::Message("Comment deleted.".into()))
        });
      }
      Confirm::DeletePlayer { id, name } => {
        self.spawn(Lane::Delete, async move {
          m.delete_player(principal.as_ref(), id).await?;
          Ok(Outcome::Message(format!("Deleted {name}.")))
        });
      }
      Confirm::DeletePrincipal { id, label } => {
        self.spawn(Lane::Delete, async move {
          let report = m.delete_principal(principal.as_ref(), &id).await?;
          Ok(Outcome::Message(format!(
            "Deleted {label} and {} player(s).",
            report.players_deleted
          )))
        });
      }
    }
  }
}
