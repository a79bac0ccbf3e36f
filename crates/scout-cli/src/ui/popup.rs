//! Centered modal popups for forms and confirmations.

use ratatui::{
  Frame,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::dim;
use crate::{app::Confirm, form::Form};

fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center).areas(area);
  let [cell] = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center).areas(row);
  cell
}

pub fn draw_form(f: &mut Frame, form: &Form) {
  // Two lines per field, a blank line and the hint.
  let height = form.fields.len() as u16 * 2 + 4;
  let area = centered(f.area(), 64.min(f.area().width), height.min(f.area().height));

  let block = Block::default()
    .title(format!(" {} ", form.title()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(area);
  f.render_widget(Clear, area);
  f.render_widget(block, area);

  let mut lines = Vec::new();
  for (i, field) in form.fields.iter().enumerate() {
    let focused = i == form.focus;
    let label_style = if focused {
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    lines.push(Line::from(Span::styled(field.label, label_style)));
    let cursor = if focused && !form.submitting { "_" } else { "" };
    lines.push(Line::from(Span::raw(format!("  {}{cursor}", field.value))));
  }
  lines.push(Line::from(""));
  lines.push(Line::from(if form.submitting {
    dim("Saving…")
  } else {
    dim("Enter save  Tab next  Esc cancel")
  }));

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

pub fn draw_confirm(f: &mut Frame, confirm: &Confirm) {
  let area = centered(f.area(), 56.min(f.area().width), 5.min(f.area().height));
  let block = Block::default()
    .title(" Confirm ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));
  let inner = block.inner(area);
  f.render_widget(Clear, area);
  f.render_widget(block, area);

  let lines = vec![
    Line::from(Span::styled(confirm.prompt(), Style::default().add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(dim("y delete  any other key cancels")),
  ];
  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
