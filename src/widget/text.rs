use crossterm::event::KeyEvent;
use serde_json::Value;

use crate::validation::ErrorDescriptor;

use super::helpers::{handle_text_edit, value_to_string};
use super::{Widget, WidgetBase, WidgetContext, WidgetEvent};

const MASK: char = '•';

/// Single-line text input. With `masked` set it backs the `password` type.
#[derive(Debug)]
pub struct TextWidget {
    base: WidgetBase,
    masked: bool,
}

impl TextWidget {
    pub fn new(context: &WidgetContext) -> Self {
        Self {
            base: WidgetBase::new(context),
            masked: false,
        }
    }

    pub fn masked(context: &WidgetContext) -> Self {
        Self {
            base: WidgetBase::new(context),
            masked: true,
        }
    }

    fn text(&self) -> String {
        value_to_string(&self.base.value())
    }
}

impl Widget for TextWidget {
    fn kind(&self) -> &'static str {
        if self.masked { "password" } else { "text" }
    }

    fn validate(&self) -> Option<ErrorDescriptor> {
        self.base.run_validators()
    }

    fn is_empty_value(&self) -> bool {
        self.text().is_empty()
    }

    fn value(&self) -> Value {
        self.base.value()
    }

    fn display_value(&self) -> String {
        let text = self.text();
        if self.masked {
            std::iter::repeat_n(MASK, text.chars().count()).collect()
        } else {
            text
        }
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
        let mut buffer = self.text();
        if !handle_text_edit(&mut buffer, key) {
            return false;
        }
        let is_empty = buffer.is_empty();
        self.base.commit(Value::String(buffer), is_empty);
        true
    }

    fn drain_events(&mut self) -> Vec<WidgetEvent> {
        self.base.drain_events()
    }
}
