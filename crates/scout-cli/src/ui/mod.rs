//! TUI rendering. One module per screen plus the modal popups.

mod admin;
mod player_detail;
mod player_list;
mod popup;
mod profile;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};
use scout_core::principal::Role;

use crate::{
  app::App,
  screens::{AdminPane, Screen, Tab},
};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);

  match &app.screen {
    Screen::Dashboard(d) => player_list::draw_dashboard(f, rows[1], app, d),
    Screen::Ranking(r) => player_list::draw_ranking(f, rows[1], app, r),
    Screen::Detail(d) => player_detail::draw(f, rows[1], app, d),
    Screen::Profile => profile::draw(f, rows[1], app),
    Screen::Admin(a) => admin::draw(f, rows[1], a),
  }

  draw_status(f, rows[2], app);

  if let Some(form) = &app.form {
    popup::draw_form(f, form);
  } else if let Some(confirm) = &app.confirm {
    popup::draw_confirm(f, confirm);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let current = app.screen.tab();
  let mut spans = vec![Span::styled(
    " scout ",
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
  )];
  for (i, tab) in Tab::ALL.into_iter().enumerate() {
    let style = if tab == current {
      Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::raw(" "));
    spans.push(Span::styled(format!("{} {}", i + 1, tab.label()), style));
  }

  let who = match app.principal() {
    None => "signed out".to_owned(),
    Some(p) => {
      let role = match app.resolver.role() {
        Some(Role::Admin) => " (admin)",
        _ => "",
      };
      let badge = if p.phone_verified { "" } else { " unverified" };
      format!("{}{role}{badge}", p.display_name())
    }
  };
  let right = Span::styled(
    format!("{who}  {} ", Local::now().format("%Y-%m-%d")),
    Style::default().fg(Color::Gray),
  );

  let left_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize)
    .saturating_sub(left_width)
    .saturating_sub(right.content.chars().count());
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = if app.form.is_some() {
    ("EDIT", "Tab next field  Enter save  Esc cancel")
  } else if app.confirm.is_some() {
    ("CONFIRM", "y confirm  any other key cancels")
  } else {
    match &app.screen {
      Screen::Dashboard(d) if d.filter_active => {
        ("SEARCH", "Type to filter  Esc clear  Enter keep")
      }
      Screen::Dashboard(_) => (
        "PLAYERS",
        "↑↓/jk move  Enter open  / search  a add  l like  s sign in/out  q quit",
      ),
      Screen::Ranking(_) => ("RANKING", "↑↓/jk move  Enter open  l like  q quit"),
      Screen::Detail(_) => (
        "PLAYER",
        "l like  c comment  n note  t link  v links  L like comment  d delete comment  x delete  Esc back",
      ),
      Screen::Profile => ("PROFILE", "e edit  s sign in/out  q quit"),
      Screen::Admin(a) => match a.pane {
        AdminPane::Users => ("ADMIN", "Tab players  ↑↓/jk move  d delete account  q quit"),
        AdminPane::Players => {
          ("ADMIN", "Tab users  ↑↓/jk move  Enter open  d delete player  q quit")
        }
      },
    }
  };

  let status = if app.is_busy() {
    "Working…".to_owned()
  } else if app.status_msg.is_empty() {
    hints.to_owned()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::Gray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Shared helpers ───────────────────────────────────────────────────────────

fn cursor_style(selected: bool) -> Style {
  if selected {
    Style::default()
      .bg(Color::Blue)
      .fg(Color::White)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default()
  }
}

fn label(text: &str) -> Span<'static> {
  Span::styled(
    format!("{text:<14}"),
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
  )
}

fn dim(text: impl Into<String>) -> Span<'static> {
  Span::styled(text.into(), Style::default().fg(Color::DarkGray))
}
