use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};
use scout_core::principal::Role;

use super::{dim, label};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Profile ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(p) = app.principal() else {
    f.render_widget(Paragraph::new(dim("Signed out. Press s to sign in.")), inner);
    return;
  };

  let or_dash = |s: Option<&str>| s.filter(|s| !s.is_empty()).unwrap_or("-").to_owned();
  let role = match app.resolver.role() {
    Some(Role::Admin) => "admin",
    _ => "member",
  };
  let verified = if p.phone_verified {
    Span::styled("verified", Style::default().fg(Color::Green))
  } else {
    Span::styled(
      "not verified: save a phone number to add, like and comment",
      Style::default().fg(Color::Yellow),
    )
  };

  let lines = vec![
    Line::from(vec![label("Account"), Span::raw(p.id.to_string())]),
    Line::from(vec![label("Role"), Span::raw(role)]),
    Line::from(vec![label("Email"), Span::raw(or_dash(p.email.as_deref()))]),
    Line::from(vec![label("First name"), Span::raw(or_dash(p.first_name.as_deref()))]),
    Line::from(vec![label("Last name"), Span::raw(or_dash(p.last_name.as_deref()))]),
    Line::from(vec![label("Phone"), Span::raw(or_dash(Some(p.phone.as_str())))]),
    Line::from(vec![label("Status"), verified]),
    Line::from(vec![
      label("Member since"),
      Span::raw(p.created_at.format("%Y-%m-%d").to_string()),
    ]),
    Line::from(""),
    Line::from(dim("Press e to edit.")),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}
