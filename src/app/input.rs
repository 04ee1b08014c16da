use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Submit,
    Quit,
    NextField,
    PrevField,
    ToggleHelp,
    ToggleErrors,
    Dismiss,
    Edit(KeyEvent),
}

pub fn classify(key: &KeyEvent) -> KeyCommand {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') => KeyCommand::Submit,
            KeyCode::Char('q') | KeyCode::Char('Q') => KeyCommand::Quit,
            KeyCode::Char('c') | KeyCode::Char('C') => KeyCommand::Quit,
            _ => KeyCommand::Edit(*key),
        };
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => KeyCommand::NextField,
        KeyCode::BackTab | KeyCode::Up => KeyCommand::PrevField,
        KeyCode::F(1) => KeyCommand::ToggleHelp,
        KeyCode::F(2) => KeyCommand::ToggleErrors,
        KeyCode::Esc => KeyCommand::Dismiss,
        _ => KeyCommand::Edit(*key),
    }
}
