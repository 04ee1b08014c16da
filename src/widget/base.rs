use std::rc::Rc;

use serde_json::Value;

use crate::model::Model;
use crate::validation::{ErrorDescriptor, ValidatorFn};

use super::{WidgetContext, WidgetEvent};

/// State every built-in widget shares: model binding, validators, display
/// toggles, lifecycle and the event outbox.
pub struct WidgetBase {
    model: Rc<dyn Model>,
    key: String,
    fallback: Option<Value>,
    validators: Vec<ValidatorFn>,
    readonly: bool,
    enabled: bool,
    hidden: bool,
    rendered: bool,
    destroyed: bool,
    events: Vec<WidgetEvent>,
}

impl WidgetBase {
    pub fn new(context: &WidgetContext) -> Self {
        Self {
            model: Rc::clone(&context.model),
            key: context.key.clone(),
            fallback: context.value.clone(),
            validators: context.validators.clone(),
            readonly: context.schema.readonly,
            enabled: context.schema.enabled,
            hidden: false,
            rendered: false,
            destroyed: false,
            events: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value: the model attribute, else the construction value.
    pub fn value(&self) -> Value {
        self.model
            .get(&self.key)
            .or_else(|| self.fallback.clone())
            .unwrap_or(Value::Null)
    }

    /// Write `value` to the model and announce the new emptiness.
    pub fn commit(&mut self, value: Value, is_empty: bool) {
        self.model.set(&self.key, value);
        self.events.push(WidgetEvent::EmptinessChanged(Some(is_empty)));
    }

    /// First failing validator wins.
    pub fn run_validators(&self) -> Option<ErrorDescriptor> {
        let value = self.value();
        let all = self.model.values();
        self.validators
            .iter()
            .find_map(|validate| validate(&value, &all, &self.key))
    }

    pub fn editable(&self) -> bool {
        self.enabled && !self.readonly && !self.destroyed
    }

    pub fn set_readonly(&mut self, readonly: bool) {
        if self.readonly != readonly {
            self.readonly = readonly;
            self.events.push(WidgetEvent::ReadonlyChanged(readonly));
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.events.push(WidgetEvent::EnabledChanged(enabled));
        }
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn readonly(&self) -> bool {
        self.readonly
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn render(&mut self) {
        if !self.destroyed {
            self.rendered = true;
        }
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.rendered = false;
        self.events.clear();
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn push_event(&mut self, event: WidgetEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<WidgetEvent> {
        std::mem::take(&mut self.events)
    }
}

impl std::fmt::Debug for WidgetBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetBase")
            .field("key", &self.key)
            .field("readonly", &self.readonly)
            .field("enabled", &self.enabled)
            .field("hidden", &self.hidden)
            .field("rendered", &self.rendered)
            .field("destroyed", &self.destroyed)
            .field("pending_events", &self.events.len())
            .finish()
    }
}
