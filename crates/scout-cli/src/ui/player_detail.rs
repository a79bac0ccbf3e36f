//! One player: record, links and the comment thread.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use scout_core::{
  gate::Action,
  player::Likeable,
  views::{like_label, youtube_embed_url},
};

use super::{cursor_style, dim, label};
use crate::{app::App, screens::Detail};

pub fn draw(f: &mut Frame, area: Rect, app: &App, d: &Detail) {
  let Some(player) = d.player() else {
    f.render_widget(Paragraph::new(dim(" Loading…")), area);
    return;
  };
  let principal = app.principal();
  let perms = app.gate().player_permissions(principal, player);
  let liked = principal.is_some_and(|p| player.is_liked_by(&p.id));

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
    .split(area);

  // ── Record ──

  let block = Block::default()
    .title(format!(" {} ", player.name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(cols[0]);
  f.render_widget(block, cols[0]);

  let or_dash = |s: &str| if s.is_empty() { "-".to_owned() } else { s.to_owned() };
  let mut lines = vec![
    Line::from(vec![label("Position"), Span::raw(or_dash(&player.position))]),
    Line::from(vec![
      label("Born"),
      Span::raw(player.birth_year.map(|y| y.to_string()).unwrap_or_else(|| "-".into())),
    ]),
    Line::from(vec![label("Club"), Span::raw(or_dash(&player.club))]),
    Line::from(vec![label("Country"), Span::raw(or_dash(&player.country))]),
    Line::from(vec![label("Added by"), Span::raw(player.owner_label().to_owned())]),
    Line::from(vec![
      label("Added"),
      Span::raw(player.created_at.format("%Y-%m-%d").to_string()),
    ]),
    Line::from(vec![
      label("Likes"),
      Span::styled(
        format!("{}{}", if liked { "♥ " } else { "" }, like_label(player.like_count())),
        Style::default().fg(Color::Magenta),
      ),
    ]),
    Line::from(""),
  ];

  lines.push(Line::from(label("Note")));
  if player.note.is_empty() {
    lines.push(Line::from(dim("No note yet.")));
  } else {
    lines.extend(player.note.lines().map(|l| Line::from(l.to_owned())));
  }
  lines.push(Line::from(""));

  lines.push(Line::from(vec![label("Transfermarkt"), Span::raw(or_dash(&player.transfermarkt_link))]));
  let video = match youtube_embed_url(&player.youtube_link) {
    Some(embed) => Span::raw(embed),
    None if player.youtube_link.is_empty() => dim("-"),
    None => Span::raw(player.youtube_link.clone()),
  };
  lines.push(Line::from(vec![label("Video"), video]));
  lines.push(Line::from(""));

  let mut actions = Vec::new();
  if perms.like {
    actions.push(if liked { "l unlike" } else { "l like" });
  }
  if perms.comment {
    actions.push("c comment");
  }
  if perms.edit_note {
    actions.push("n note");
  }
  if perms.edit_external_link {
    actions.push("t link");
  }
  if perms.edit_video_link {
    actions.push("v links");
  }
  if perms.delete {
    actions.push("x delete");
  }
  lines.push(Line::from(if actions.is_empty() {
    dim(match principal {
      None => "Sign in to take part.",
      Some(_) => "Save a phone number in your profile to take part.",
    })
  } else {
    dim(actions.join("  "))
  }));

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

  // ── Comments ──

  let block = Block::default()
    .title(format!(" Comments ({}) ", d.comments.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(cols[1]);
  f.render_widget(block, cols[1]);

  if d.comments.is_empty() {
    f.render_widget(Paragraph::new(dim("No comments yet.")), inner);
    return;
  }

  let items: Vec<ListItem> = d
    .comments
    .items()
    .iter()
    .enumerate()
    .map(|(i, c)| {
      let style = cursor_style(i == d.cursor);
      let mine = principal.is_some_and(|p| c.is_liked_by(&p.id));
      let deletable = app.gate().permits(principal, Action::DeleteComment(c));
      let header = Line::from(vec![
        Span::styled(c.author_name.clone(), style.add_modifier(Modifier::BOLD)),
        Span::styled(
          format!("  {}", c.created_at.format("%Y-%m-%d %H:%M")),
          style.fg(Color::DarkGray),
        ),
        Span::styled(
          format!("  {}{}", if mine { "♥ " } else { "" }, like_label(c.like_count())),
          style.fg(Color::Magenta),
        ),
        Span::styled(if deletable { "  [d]" } else { "" }, style.fg(Color::DarkGray)),
      ]);
      ListItem::new(vec![header, Line::styled(c.text.clone(), style), Line::from("")])
    })
    .collect();
  let mut state = ListState::default().with_selected(Some(d.cursor));
  f.render_stateful_widget(List::new(items), inner, &mut state);
}
