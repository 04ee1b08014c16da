//! The capability set a pluggable input widget provides to its field
//! controller, plus the built-in widgets and the registry that maps a schema
//! `type` to a constructor.

mod base;
mod checkbox;
pub(crate) mod helpers;
mod registry;
mod select;
mod text;

use std::fmt;
use std::rc::Rc;

use crossterm::event::KeyEvent;
use serde_json::Value;

use crate::domain::FieldSchema;
use crate::model::Model;
use crate::validation::{ErrorDescriptor, ValidatorFn};

pub use base::WidgetBase;
pub use checkbox::CheckboxWidget;
pub use registry::{WidgetFactory, WidgetRegistry, global, register};
pub use select::SelectWidget;
pub use text::TextWidget;

/// Notifications a widget queues for its controller.
///
/// `RequiredRequested` and `EmptinessChanged` stand in for the `setRequired`
/// and `fieldUpdateEmpty` callbacks a widget receives at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetEvent {
    ReadonlyChanged(bool),
    EnabledChanged(bool),
    RequiredRequested(Option<bool>),
    EmptinessChanged(Option<bool>),
}

pub trait Widget: fmt::Debug {
    fn kind(&self) -> &'static str;

    fn validate(&self) -> Option<ErrorDescriptor>;
    fn is_empty_value(&self) -> bool;
    fn value(&self) -> Value;
    fn display_value(&self) -> String;

    fn set_readonly(&mut self, readonly: bool);
    fn set_enabled(&mut self, enabled: bool);
    fn set_hidden(&mut self, hidden: bool);
    fn readonly(&self) -> bool;
    fn enabled(&self) -> bool;
    fn hidden(&self) -> bool;

    fn render(&mut self);
    fn destroy(&mut self);
    fn is_rendered(&self) -> bool;
    fn is_destroyed(&self) -> bool;

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let _ = key;
        false
    }

    /// Take every notification queued since the last call.
    ///
    /// `ReadonlyChanged`/`EnabledChanged` must be queued whenever the state
    /// toggles, whoever caused it.
    fn drain_events(&mut self) -> Vec<WidgetEvent>;
}

/// Everything a widget constructor receives.
#[derive(Clone)]
pub struct WidgetContext {
    /// Effective schema (base merged with the extension).
    pub schema: FieldSchema,
    pub model: Rc<dyn Model>,
    pub key: String,
    /// Editor id, `<model cid>_<key>`.
    pub id: String,
    pub field_id: String,
    pub form: Option<String>,
    pub class: Option<String>,
    pub tag_name: Option<String>,
    /// Used when the model has no value for `key`.
    pub value: Option<Value>,
    pub validators: Vec<ValidatorFn>,
}

impl fmt::Debug for WidgetContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetContext")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("field_id", &self.field_id)
            .field("schema", &self.schema)
            .field("validators", &self.validators.len())
            .finish()
    }
}
