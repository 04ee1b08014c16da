use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::TestBackend};
use serde_json::json;

use crate::app::{FormSession, SessionOutcome};
use crate::form::Form;
use crate::model::{Model, ModelStore};
use crate::overlay::{PanelContent, PopoutStack, TriggerKind};

fn session(values: serde_json::Value) -> (FormSession, Rc<ModelStore>) {
    let model = Rc::new(ModelStore::from_value(&values));
    let popouts = Rc::new(PopoutStack::new());
    let shared: Rc<dyn Model> = model.clone();
    let document = json!([
        {"key": "name", "type": "text", "required": true, "helpText": "Your full name"},
        {"key": "email", "type": "text", "validators": ["email"]},
        {"key": "agree", "type": "checkbox"}
    ]);
    let form = Form::from_document("profile", shared, popouts.clone(), &document).unwrap();
    (FormSession::new(form, popouts), model)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(ch: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
}

fn type_text(session: &mut FormSession, text: &str) {
    for ch in text.chars() {
        session.handle_key(key(KeyCode::Char(ch)));
    }
}

#[test]
fn focus_moves_and_wraps() {
    let (mut session, _model) = session(json!({}));
    assert_eq!(session.focused_key(), Some("name"));
    session.handle_key(key(KeyCode::Tab));
    assert_eq!(session.focused_key(), Some("email"));
    assert_eq!(session.status(), "Editing email");
    session.handle_key(key(KeyCode::Down));
    session.handle_key(key(KeyCode::Tab));
    assert_eq!(session.focused_key(), Some("name"));
    session.handle_key(key(KeyCode::BackTab));
    assert_eq!(session.focused_key(), Some("agree"));
}

#[test]
fn hidden_fields_are_skipped() {
    let model = Rc::new(ModelStore::from_value(&json!({"mode": "basic"})));
    let popouts = Rc::new(PopoutStack::new());
    let shared: Rc<dyn Model> = model.clone();
    let document = json!([
        {"key": "advanced", "type": "text", "hiddenWhen": {"key": "mode", "equals": "basic"}},
        {"key": "title", "type": "text"},
        {"key": "extra", "type": "text", "hiddenWhen": {"key": "mode", "equals": "basic"}}
    ]);
    let form = Form::from_document("f", shared, popouts.clone(), &document).unwrap();
    let mut session = FormSession::new(form, popouts);
    assert_eq!(session.focused_key(), Some("title"));
    session.handle_key(key(KeyCode::Tab));
    assert_eq!(session.focused_key(), Some("title"));

    model.set("mode", json!("full"));
    session.handle_key(key(KeyCode::Tab));
    assert_eq!(session.focused_key(), Some("extra"));
}

#[test]
fn typing_edits_the_focused_field() {
    let (mut session, model) = session(json!({}));
    type_text(&mut session, "Ada");
    assert_eq!(model.get("name"), Some(json!("Ada")));
    assert_eq!(session.status(), "Value updated");
    let name = session.form().controller("name").unwrap();
    assert!(!name.flags().required);

    session.handle_key(key(KeyCode::Tab));
    session.handle_key(key(KeyCode::Tab));
    session.handle_key(key(KeyCode::Char(' ')));
    assert_eq!(model.get("agree"), Some(json!(true)));
}

#[test]
fn failed_submit_focuses_the_first_issue() {
    let (mut session, model) = session(json!({"email": "nope"}));
    session.handle_key(key(KeyCode::Tab));
    session.handle_key(key(KeyCode::Tab));
    assert!(!session.handle_key(ctrl('s')));

    assert_eq!(session.outcome(), None);
    assert_eq!(session.status(), "2 field(s) need attention");
    assert_eq!(session.focused_key(), Some("name"));
    assert_eq!(session.open_popout_kind(), Some(TriggerKind::Error));
    let popout = session.open_popout().expect("error popout");
    let PanelContent::Errors(errors) = popout.panel else {
        panic!("expected the error list");
    };
    assert_eq!(errors.messages(), ["Required"]);

    // Editing a field with a shown error revalidates it.
    type_text(&mut session, "A");
    assert!(!session.form().controller("name").unwrap().is_error_shown());

    model.set("email", json!("a@b.co"));
    assert!(session.handle_key(ctrl('s')));
    assert_eq!(
        session.outcome(),
        Some(&SessionOutcome::Submitted(json!({"email": "a@b.co", "name": "A"})))
    );
}

#[test]
fn popouts_toggle_per_field() {
    let (mut session, _model) = session(json!({}));
    session.handle_key(key(KeyCode::F(1)));
    assert_eq!(session.open_popout_kind(), Some(TriggerKind::Help));
    let popout = session.open_popout().unwrap();
    assert!(matches!(popout.panel, PanelContent::Tooltip(ref tooltip) if tooltip.text() == "Your full name"));

    session.handle_key(key(KeyCode::F(1)));
    assert_eq!(session.open_popout_kind(), None);

    session.handle_key(key(KeyCode::F(2)));
    assert_eq!(session.open_popout_kind(), None);
    assert_eq!(session.status(), "No errors for this field");

    session.handle_key(key(KeyCode::Tab));
    session.handle_key(key(KeyCode::F(1)));
    assert_eq!(session.status(), "No help for this field");

    session.handle_key(key(KeyCode::BackTab));
    session.handle_key(key(KeyCode::F(1)));
    session.handle_key(key(KeyCode::Esc));
    assert!(session.open_popout().is_none());
}

#[test]
fn quit_cancels_and_releases_ignored() {
    let (mut session, model) = session(json!({}));
    let mut release = key(KeyCode::Char('x'));
    release.kind = KeyEventKind::Release;
    assert!(!session.handle_key(release));
    assert_eq!(model.get("name"), None);

    assert!(session.handle_key(ctrl('q')));
    assert_eq!(session.outcome(), Some(&SessionOutcome::Cancelled));
}

#[test]
fn draw_shows_fields_footer_and_popout() {
    let (mut session, _model) = session(json!({}));
    session.handle_key(key(KeyCode::F(1)));
    let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
    terminal.draw(|frame| session.draw(frame)).unwrap();

    let buffer = terminal.backend().buffer();
    let screen: String = buffer.content.iter().map(|cell| cell.symbol()).collect();
    assert!(screen.contains("profile"));
    assert!(screen.contains("name *"));
    assert!(screen.contains("type: checkbox"));
    assert!(screen.contains("Ready. Press Ctrl+S"));
    assert!(screen.contains("Your full name"));
}
