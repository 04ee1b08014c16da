use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::model::Model;
use crate::validation::ValidatorSpec;
use crate::widget::WidgetFactory;

/// Computed flag derived from the bound model (`getReadonly`, `getHidden`).
pub type ModelPredicate = Rc<dyn Fn(&dyn Model) -> bool>;

/// Late-bound partial override merged into the base schema before every
/// widget construction.
pub type SchemaExtension = Rc<dyn Fn(&dyn Model) -> SchemaPatch>;

/// Which widget a field uses: a registry key or a factory used directly.
#[derive(Clone)]
pub enum WidgetType {
    Named(String),
    Factory(WidgetFactory),
}

impl WidgetType {
    pub fn name(&self) -> Option<&str> {
        match self {
            WidgetType::Named(name) => Some(name),
            WidgetType::Factory(_) => None,
        }
    }
}

impl fmt::Debug for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetType::Named(name) => f.debug_tuple("Named").field(name).finish(),
            WidgetType::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

impl From<&str> for WidgetType {
    fn from(name: &str) -> Self {
        WidgetType::Named(name.to_string())
    }
}

impl From<String> for WidgetType {
    fn from(name: String) -> Self {
        WidgetType::Named(name)
    }
}

impl From<WidgetFactory> for WidgetType {
    fn from(factory: WidgetFactory) -> Self {
        WidgetType::Factory(factory)
    }
}

/// Declarative description of one field.
#[derive(Clone)]
pub struct FieldSchema {
    pub widget: WidgetType,
    pub title: Option<String>,
    pub required: bool,
    pub readonly: bool,
    pub enabled: bool,
    pub help_text: Option<String>,
    pub validators: Vec<ValidatorSpec>,
    /// Model events that force a full widget rebuild.
    pub update_editor_events: Vec<String>,
    pub get_readonly: Option<ModelPredicate>,
    pub get_hidden: Option<ModelPredicate>,
    pub schema_extension: Option<SchemaExtension>,
    /// Widget-specific settings, e.g. `choices` for a select.
    pub options: Map<String, Value>,
}

impl FieldSchema {
    pub fn new(widget: impl Into<WidgetType>) -> Self {
        Self {
            widget: widget.into(),
            title: None,
            required: false,
            readonly: false,
            enabled: true,
            help_text: None,
            validators: Vec::new(),
            update_editor_events: Vec::new(),
            get_readonly: None,
            get_hidden: None,
            schema_extension: None,
            options: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    pub fn with_validator(mut self, spec: impl Into<ValidatorSpec>) -> Self {
        self.validators.push(spec.into());
        self
    }

    pub fn with_update_editor_event(mut self, event: impl Into<String>) -> Self {
        self.update_editor_events.push(event.into());
        self
    }

    pub fn with_readonly_when(mut self, predicate: impl Fn(&dyn Model) -> bool + 'static) -> Self {
        self.get_readonly = Some(Rc::new(predicate));
        self
    }

    pub fn with_hidden_when(mut self, predicate: impl Fn(&dyn Model) -> bool + 'static) -> Self {
        self.get_hidden = Some(Rc::new(predicate));
        self
    }

    pub fn with_extension(mut self, extension: impl Fn(&dyn Model) -> SchemaPatch + 'static) -> Self {
        self.schema_extension = Some(Rc::new(extension));
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Pure merge: `self` overridden by every field `patch` sets.
    pub fn merged(&self, patch: &SchemaPatch) -> FieldSchema {
        let mut merged = self.clone();
        if let Some(widget) = &patch.widget {
            merged.widget = widget.clone();
        }
        if let Some(title) = &patch.title {
            merged.title = Some(title.clone());
        }
        if let Some(required) = patch.required {
            merged.required = required;
        }
        if let Some(readonly) = patch.readonly {
            merged.readonly = readonly;
        }
        if let Some(enabled) = patch.enabled {
            merged.enabled = enabled;
        }
        if let Some(help_text) = &patch.help_text {
            merged.help_text = Some(help_text.clone());
        }
        if let Some(validators) = &patch.validators {
            merged.validators = validators.clone();
        }
        for (key, value) in &patch.options {
            merged.options.insert(key.clone(), value.clone());
        }
        merged
    }

    /// The schema a widget is actually built from: this schema merged with
    /// whatever the extension returns for the current model.
    pub fn effective(&self, model: &dyn Model) -> FieldSchema {
        match &self.schema_extension {
            Some(extension) => self.merged(&extension(model)),
            None => self.clone(),
        }
    }

    pub fn display_label(&self, key: &str) -> String {
        self.title.clone().unwrap_or_else(|| key.to_string())
    }
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("widget", &self.widget)
            .field("title", &self.title)
            .field("required", &self.required)
            .field("readonly", &self.readonly)
            .field("enabled", &self.enabled)
            .field("help_text", &self.help_text)
            .field("validators", &self.validators)
            .field("update_editor_events", &self.update_editor_events)
            .field("get_readonly", &self.get_readonly.is_some())
            .field("get_hidden", &self.get_hidden.is_some())
            .field("schema_extension", &self.schema_extension.is_some())
            .field("options", &self.options)
            .finish()
    }
}

/// Partial schema returned by a [`SchemaExtension`]. Unset fields keep the
/// base value; `options` are merged key by key.
#[derive(Clone, Default, Debug)]
pub struct SchemaPatch {
    pub widget: Option<WidgetType>,
    pub title: Option<String>,
    pub required: Option<bool>,
    pub readonly: Option<bool>,
    pub enabled: Option<bool>,
    pub help_text: Option<String>,
    pub validators: Option<Vec<ValidatorSpec>>,
    pub options: Map<String, Value>,
}

impl SchemaPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn widget(mut self, widget: impl Into<WidgetType>) -> Self {
        self.widget = Some(widget.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = Some(readonly);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    pub fn validators(mut self, validators: Vec<ValidatorSpec>) -> Self {
        self.validators = Some(validators);
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Layer `other` on top of `self`.
    pub fn merge(&mut self, other: SchemaPatch) {
        if other.widget.is_some() {
            self.widget = other.widget;
        }
        if other.title.is_some() {
            self.title = other.title;
        }
        if other.required.is_some() {
            self.required = other.required;
        }
        if other.readonly.is_some() {
            self.readonly = other.readonly;
        }
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.help_text.is_some() {
            self.help_text = other.help_text;
        }
        if other.validators.is_some() {
            self.validators = other.validators;
        }
        self.options.extend(other.options);
    }

    pub fn is_empty(&self) -> bool {
        self.widget.is_none()
            && self.title.is_none()
            && self.required.is_none()
            && self.readonly.is_none()
            && self.enabled.is_none()
            && self.help_text.is_none()
            && self.validators.is_none()
            && self.options.is_empty()
    }
}
