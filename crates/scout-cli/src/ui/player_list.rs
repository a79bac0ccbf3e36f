//! Player lists: the dashboard (newest first, searchable) and the ranking.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use scout_core::{
  gate::Action,
  player::{Likeable, Player},
  views::{self, like_label},
};

use super::{cursor_style, dim};
use crate::{
  app::App,
  screens::{Dashboard, Ranking},
};

pub fn draw_dashboard(f: &mut Frame, area: Rect, app: &App, d: &Dashboard) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(1), Constraint::Min(0)])
    .split(area);

  // Personal stats line.
  let stats = match app.principal() {
    Some(p) => {
      let stats = views::dashboard_stats(d.players.items(), &p.id);
      let mut spans = vec![Span::raw(format!(
        " You added {} player(s), {} in total.",
        stats.players,
        like_label(stats.likes)
      ))];
      if !app.gate().permits(Some(p), Action::AddPlayer) {
        spans.push(Span::styled(
          "  Save a phone number in your profile to add, like and comment.",
          Style::default().fg(Color::Yellow),
        ));
      }
      Line::from(spans)
    }
    None => Line::from(dim(" Browsing signed out. Press s to sign in.")),
  };
  f.render_widget(Paragraph::new(stats), rows[0]);

  let visible = d.visible();
  let total = d.players.len();
  let title = if d.filter_active || !d.filter.is_empty() {
    format!(" Players ({}/{}) ", visible.len(), total)
  } else {
    format!(" Players ({total}) ")
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut inner = block.inner(rows[1]);
  f.render_widget(block, rows[1]);

  if (d.filter_active || !d.filter.is_empty()) && inner.height > 2 {
    let filter_area = Rect { y: inner.y + inner.height - 1, height: 1, ..inner };
    inner.height -= 1;
    let text = if d.filter_active { format!("/{}_", d.filter) } else { format!("/{}", d.filter) };
    f.render_widget(
      Paragraph::new(Span::styled(text, Style::default().fg(Color::Yellow))),
      filter_area,
    );
  }

  if visible.is_empty() {
    let msg = if total == 0 { "No players yet." } else { "No player matches the search." };
    f.render_widget(Paragraph::new(dim(msg)), inner);
    return;
  }

  let items: Vec<ListItem> = visible
    .iter()
    .enumerate()
    .map(|(i, p)| player_item(app, p, None, i == d.cursor))
    .collect();
  let mut state = ListState::default().with_selected(Some(d.cursor));
  f.render_stateful_widget(List::new(items), inner, &mut state);
}

pub fn draw_ranking(f: &mut Frame, area: Rect, app: &App, r: &Ranking) {
  let block = Block::default()
    .title(" Most liked ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let ranked = r.ranked();
  if ranked.is_empty() {
    f.render_widget(Paragraph::new(dim("No players yet.")), inner);
    return;
  }

  let items: Vec<ListItem> = ranked
    .iter()
    .enumerate()
    .map(|(i, entry)| player_item(app, &entry.player, Some(entry.rank), i == r.cursor))
    .collect();
  let mut state = ListState::default().with_selected(Some(r.cursor));
  f.render_stateful_widget(List::new(items), inner, &mut state);
}

fn player_item(app: &App, p: &Player, rank: Option<usize>, selected: bool) -> ListItem<'static> {
  let style = cursor_style(selected);
  let liked = app.principal().is_some_and(|me| p.is_liked_by(&me.id));

  let mut spans = Vec::new();
  if let Some(rank) = rank {
    spans.push(Span::styled(format!("{rank:>3}. "), style.add_modifier(Modifier::BOLD)));
  }
  spans.push(Span::styled(p.name.clone(), style.add_modifier(Modifier::BOLD)));
  spans.push(Span::styled(format!("  {}", p.summary()), style));
  spans.push(Span::styled(
    format!("  {}{}", if liked { "♥ " } else { "" }, like_label(p.like_count())),
    style.fg(Color::Magenta),
  ));
  spans.push(Span::styled(format!("  by {}", p.owner_label()), style.fg(Color::DarkGray)));
  ListItem::new(Line::from(spans))
}
