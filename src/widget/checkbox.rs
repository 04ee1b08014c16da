use crossterm::event::{KeyCode, KeyEvent};
use serde_json::Value;

use crate::validation::ErrorDescriptor;

use super::{Widget, WidgetBase, WidgetContext, WidgetEvent};

/// Boolean toggle. An unchecked box counts as empty, so `required` means
/// "must be checked".
#[derive(Debug)]
pub struct CheckboxWidget {
    base: WidgetBase,
}

impl CheckboxWidget {
    pub fn new(context: &WidgetContext) -> Self {
        Self {
            base: WidgetBase::new(context),
        }
    }

    fn checked(&self) -> bool {
        self.base.value().as_bool().unwrap_or(false)
    }
}

impl Widget for CheckboxWidget {
    fn kind(&self) -> &'static str {
        "checkbox"
    }

    fn validate(&self) -> Option<ErrorDescriptor> {
        self.base.run_validators()
    }

    fn is_empty_value(&self) -> bool {
        !self.checked()
    }

    fn value(&self) -> Value {
        Value::Bool(self.checked())
    }

    fn display_value(&self) -> String {
        if self.checked() { "[x]" } else { "[ ]" }.to_string()
    }

    fn set_readonly(&mut self, readonly: bool) {
        self.base.set_readonly(readonly);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.base.set_enabled(enabled);
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.base.set_hidden(hidden);
    }

    fn readonly(&self) -> bool {
        self.base.readonly()
    }

    fn enabled(&self) -> bool {
        self.base.enabled()
    }

    fn hidden(&self) -> bool {
        self.base.hidden()
    }

    fn render(&mut self) {
        self.base.render();
    }

    fn destroy(&mut self) {
        self.base.destroy();
    }

    fn is_rendered(&self) -> bool {
        self.base.is_rendered()
    }

    fn is_destroyed(&self) -> bool {
        self.base.is_destroyed()
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if !self.base.editable() {
            return false;
        }
        match key.code {
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                let checked = !self.checked();
                self.base.commit(Value::Bool(checked), !checked);
                true
            }
            _ => false,
        }
    }

    fn drain_events(&mut self) -> Vec<WidgetEvent> {
        self.base.drain_events()
    }
}
