use crossterm::event::{KeyCode, KeyEvent};
use serde_json::Value;

use crate::validation::ErrorDescriptor;

use super::helpers::{cycle_index, value_to_string};
use super::{Widget, WidgetBase, WidgetContext, WidgetEvent};

/// Single choice from `options.choices` (strings, or objects with `value`
/// and optional `label`). Nothing selected is empty.
#[derive(Debug)]
pub struct SelectWidget {
    base: WidgetBase,
    choices: Vec<Choice>,
}

#[derive(Debug, Clone)]
struct Choice {
    value: Value,
    label: String,
}

impl SelectWidget {
    pub fn new(context: &WidgetContext) -> Self {
        let choices = context
            .schema
            .options
            .get("choices")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(parse_choice).collect())
            .unwrap_or_default();
        Self {
            base: WidgetBase::new(context),
            choices,
        }
    }

    pub fn choices(&self) -> Vec<String> {
        self.choices.iter().map(|choice| choice.label.clone()).collect()
    }

    fn selected_index(&self) -> Option<usize> {
        let current = self.base.value();
        self.choices.iter().position(|choice| choice.value == current)
    }
}

fn parse_choice(item: &Value) -> Option<Choice> {
    match item {
        Value::Object(map) => {
            let value = map.get("value")?.clone();
            let label = map
                .get("label")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| value_to_string(&value));
            Some(Choice { value, label })
        }
        Value::Null => None,
        other => Some(Choice {
            value: other.clone(),
            label: value_to_string(other),
        }),
    }
}

impl Widget for SelectWidget {
    fn kind(&self) -> &'static str {
        "select"
    }

    fn validate(&self) -> Option<ErrorDescriptor> {
        self.base.run_validators()
    }

    fn is_empty_value(&self) -> bool {
        self.selected_index().is_none()
    }

    fn value(&self) -> Value {
        self.base.value()
    }

    fn display_value(&self) -> String {
        self.selected_index()
            .and_then(|index| self.choices.get(index))
            .map(|choice| choice.label.clone())
            .unwrap_or_default()
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
        if !self.base.editable() || self.choices.is_empty() {
            return false;
        }
        let delta = match key.code {
            KeyCode::Up | KeyCode::Left => -1,
            KeyCode::Down | KeyCode::Right => 1,
            _ => return false,
        };
        let next = match self.selected_index() {
            Some(index) => cycle_index(index, self.choices.len(), delta),
            None if delta > 0 => 0,
            None => self.choices.len() - 1,
        };
        let value = self.choices[next].value.clone();
        self.base.commit(value, false);
        true
    }

    fn drain_events(&mut self) -> Vec<WidgetEvent> {
        self.base.drain_events()
    }
}
