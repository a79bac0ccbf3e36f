//! Admin panel: accounts on the left, every player on the right.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use scout_core::{player::Likeable, views::like_label};

use super::{cursor_style, dim};
use crate::screens::{Admin, AdminPane};

pub fn draw(f: &mut Frame, area: Rect, a: &Admin) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
    .split(area);

  let pane_block = |title: String, focused: bool| {
    Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
  };

  // ── Accounts ──

  let users_focused = a.pane == AdminPane::Users;
  let block = pane_block(format!(" Accounts ({}) ", a.users.len()), users_focused);
  let inner = block.inner(cols[0]);
  f.render_widget(block, cols[0]);

  if a.users.is_empty() {
    f.render_widget(Paragraph::new(dim("No accounts.")), inner);
  } else {
    let items: Vec<ListItem> = a
      .users
      .items()
      .iter()
      .enumerate()
      .map(|(i, u)| {
        let style = cursor_style(users_focused && i == a.user_cursor);
        ListItem::new(Line::from(vec![
          Span::styled(u.display_name(), style),
          Span::styled(
            format!("  {}", u.email.as_deref().unwrap_or_default()),
            style.fg(Color::DarkGray),
          ),
          Span::styled(
            if u.phone_verified { "  ✓" } else { "" },
            style.fg(Color::Green),
          ),
          Span::styled(format!("  {} player(s)", a.owned_count(u)), style),
        ]))
      })
      .collect();
    let mut state = ListState::default().with_selected(Some(a.user_cursor));
    f.render_stateful_widget(List::new(items), inner, &mut state);
  }

  // ── Players ──

  let players_focused = a.pane == AdminPane::Players;
  let block = pane_block(format!(" Players ({}) ", a.players.len()), players_focused);
  let inner = block.inner(cols[1]);
  f.render_widget(block, cols[1]);

  if a.players.is_empty() {
    f.render_widget(Paragraph::new(dim("No players.")), inner);
    return;
  }
  let items: Vec<ListItem> = a
    .players
    .items()
    .iter()
    .enumerate()
    .map(|(i, p)| {
      let style = cursor_style(players_focused && i == a.player_cursor);
      ListItem::new(Line::from(vec![
        Span::styled(p.name.clone(), style),
        Span::styled(format!("  {}", like_label(p.like_count())), style.fg(Color::Magenta)),
        Span::styled(format!("  by {}", p.owner_label()), style.fg(Color::DarkGray)),
      ]))
    })
    .collect();
  let mut state = ListState::default().with_selected(Some(a.player_cursor));
  f.render_stateful_widget(List::new(items), inner, &mut state);
}
