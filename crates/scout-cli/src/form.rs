//! Modal text forms: one per write that takes free-form input.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use scout_core::{
  player::{Player, PlayerForm},
  principal::{Principal, ProfileForm},
};
use uuid::Uuid;

/// What submitting the form does.
#[derive(Debug, Clone)]
pub enum FormKind {
  AddPlayer,
  Comment(Player),
  Note(Player),
  ExternalLink(Player),
  Links(Uuid),
  Profile,
}

#[derive(Debug, Clone)]
pub struct Field {
  pub label: &'static str,
  pub value: String,
}

/// Result of feeding one key to a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
  Continue,
  Submit,
  Cancel,
}

#[derive(Debug, Clone)]
pub struct Form {
  pub kind:       FormKind,
  pub fields:     Vec<Field>,
  pub focus:      usize,
  /// Set while the write is in flight. Cleared again when it fails so the
  /// input can be corrected.
  pub submitting: bool,
}

impl Form {
  fn new(kind: FormKind, fields: &[(&'static str, &str)]) -> Self {
    Self {
      kind,
      fields: fields
        .iter()
        .map(|&(label, value)| Field { label, value: value.to_owned() })
        .collect(),
      focus: 0,
      submitting: false,
    }
  }

  pub fn add_player() -> Self {
    Self::new(FormKind::AddPlayer, &[
      ("Name", ""),
      ("Position", ""),
      ("Birth year", ""),
      ("Club", ""),
      ("Country", ""),
      ("Note", ""),
    ])
  }

  pub fn comment(player: Player) -> Self {
    Self::new(FormKind::Comment(player), &[("Comment", "")])
  }

  pub fn note(player: Player) -> Self {
    let note = player.note.clone();
    Self::new(FormKind::Note(player), &[("Note", note.as_str())])
  }

  pub fn external_link(player: Player) -> Self {
    let link = player.transfermarkt_link.clone();
    Self::new(FormKind::ExternalLink(player), &[("Transfermarkt link", link.as_str())])
  }

  pub fn links(player: &Player) -> Self {
    Self::new(FormKind::Links(player.id), &[
      ("YouTube link", player.youtube_link.as_str()),
      ("Transfermarkt link", player.transfermarkt_link.as_str()),
    ])
  }

  pub fn profile(principal: &Principal) -> Self {
    let current = ProfileForm::from_principal(principal);
    Self::new(FormKind::Profile, &[
      ("First name", current.first_name.as_str()),
      ("Last name", current.last_name.as_str()),
      ("Phone", current.phone.as_str()),
    ])
  }

  pub fn title(&self) -> String {
    match &self.kind {
      FormKind::AddPlayer => "Add player".into(),
      FormKind::Comment(p) => format!("Comment on {}", p.name),
      FormKind::Note(p) => format!("Note for {}", p.name),
      FormKind::ExternalLink(p) => format!("Link for {}", p.name),
      FormKind::Links(_) => "Player links".into(),
      FormKind::Profile => "Edit profile".into(),
    }
  }

  /// Value of the `i`th field, empty when out of range.
  pub fn value(&self, i: usize) -> &str {
    self.fields.get(i).map(|f| f.value.as_str()).unwrap_or_default()
  }

  pub fn player_form(&self) -> PlayerForm {
    PlayerForm {
      name:       self.value(0).to_owned(),
      position:   self.value(1).to_owned(),
      birth_year: self.value(2).to_owned(),
      club:       self.value(3).to_owned(),
      country:    self.value(4).to_owned(),
      note:       self.value(5).to_owned(),
    }
  }

  pub fn profile_form(&self) -> ProfileForm {
    ProfileForm {
      first_name: self.value(0).to_owned(),
      last_name:  self.value(1).to_owned(),
      phone:      self.value(2).to_owned(),
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> FormEvent {
    if self.submitting {
      return FormEvent::Continue;
    }
    let last = self.fields.len().saturating_sub(1);
    match key.code {
      KeyCode::Esc => return FormEvent::Cancel,
      KeyCode::Enter => return FormEvent::Submit,
      KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1).min(last),
      KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.saturating_sub(1),
      KeyCode::Backspace => {
        if let Some(field) = self.fields.get_mut(self.focus) {
          field.value.pop();
        }
      }
      KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        if let Some(field) = self.fields.get_mut(self.focus) {
          field.value.clear();
        }
      }
      KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
        if let Some(field) = self.fields.get_mut(self.focus) {
          field.value.push(c);
        }
      }
      _ => {}
    }
    FormEvent::Continue
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use scout_core::principal::{AuthUser, PrincipalId};

  use super::*;

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  fn type_str(form: &mut Form, s: &str) {
    for c in s.chars() {
      assert_eq!(form.handle_key(key(KeyCode::Char(c))), FormEvent::Continue);
    }
  }

  #[test]
  fn typing_fills_the_focused_field() {
    let mut form = Form::add_player();
    type_str(&mut form, "Arda");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "AMX");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "2005");
    form.handle_key(key(KeyCode::Backspace));

    let input = form.player_form();
    assert_eq!(input.name, "Arda");
    assert_eq!(input.position, "AMX");
    assert_eq!(input.birth_year, "200");
    assert!(input.club.is_empty());
  }

  #[test]
  fn focus_stays_within_the_fields() {
    let mut form = Form::comment(sample_player());
    form.handle_key(key(KeyCode::Up));
    assert_eq!(form.focus, 0);
    form.handle_key(key(KeyCode::Tab));
    assert_eq!(form.focus, 0);

    let mut form = Form::add_player();
    for _ in 0..10 {
      form.handle_key(key(KeyCode::Down));
    }
    assert_eq!(form.focus, 5);
  }

  #[test]
  fn enter_submits_and_esc_cancels() {
    let mut form = Form::add_player();
    assert_eq!(form.handle_key(key(KeyCode::Enter)), FormEvent::Submit);
    assert_eq!(form.handle_key(key(KeyCode::Esc)), FormEvent::Cancel);
  }

  #[test]
  fn input_is_ignored_while_submitting() {
    let mut form = Form::comment(sample_player());
    form.submitting = true;
    type_str(&mut form, "abc");
    assert_eq!(form.handle_key(key(KeyCode::Enter)), FormEvent::Continue);
    assert_eq!(form.value(0), "");
  }

  #[test]
  fn ctrl_u_clears_the_field() {
    let mut form = Form::note(sample_player());
    assert_eq!(form.value(0), "quick feet");
    form.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
    assert_eq!(form.value(0), "");
  }

  #[test]
  fn profile_form_is_prefilled() {
    let mut principal = Principal::from_auth(
      &AuthUser { id: PrincipalId::new("u1"), email: None },
      Utc::now(),
    );
    principal.first_name = Some("Ada".into());
    principal.phone = "555".into();

    let form = Form::profile(&principal);
    let values = form.profile_form();
    assert_eq!(values.first_name, "Ada");
    assert_eq!(values.last_name, "");
    assert_eq!(values.phone, "555");
  }

  fn sample_player() -> Player {
    Player {
      id:                 Uuid::new_v4(),
      name:               "Arda".into(),
      name_normalized:    "arda".into(),
      position:           "AMX".into(),
      birth_year:         Some(2005),
      club:               String::new(),
      country:            String::new(),
      note:               "quick feet".into(),
      youtube_link:       String::new(),
      transfermarkt_link: String::new(),
      image_url:          String::new(),
      owner_id:           PrincipalId::new("o"),
      owner_name:         String::new(),
      owner_email:        None,
      liked_by:           Default::default(),
      created_at:         Utc::now(),
    }
  }
}
