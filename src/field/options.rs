use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::FieldSchema;
use crate::model::Model;
use crate::overlay::OverlayFactory;
use crate::validation::ValidatorRegistry;
use crate::widget::WidgetRegistry;

/// Construction options for a [`FieldController`](super::FieldController).
///
/// Kept as given: every rebuild starts again from `schema` here, so
/// `set_required` overrides do not survive a rebuild.
#[derive(Clone)]
pub struct FieldOptions {
    pub key: String,
    pub schema: FieldSchema,
    pub model: Rc<dyn Model>,
    pub overlays: Rc<dyn OverlayFactory>,
    pub form: Option<String>,
    pub class: Option<String>,
    pub tag_name: Option<String>,
    /// Initial value used while the model has none.
    pub value: Option<Value>,
    /// Defaults to [`widget::global`](crate::widget::global).
    pub widgets: Option<Arc<WidgetRegistry>>,
    /// Defaults to [`validation::global`](crate::validation::global).
    pub validators: Option<Arc<ValidatorRegistry>>,
}

impl FieldOptions {
    pub fn new(
        key: impl Into<String>,
        schema: FieldSchema,
        model: Rc<dyn Model>,
        overlays: Rc<dyn OverlayFactory>,
    ) -> Self {
        Self {
            key: key.into(),
            schema,
            model,
            overlays,
            form: None,
            class: None,
            tag_name: None,
            value: None,
            widgets: None,
            validators: None,
        }
    }

    pub fn with_form(mut self, form: impl Into<String>) -> Self {
        self.form = Some(form.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = Some(tag_name.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_widget_registry(mut self, registry: Arc<WidgetRegistry>) -> Self {
        self.widgets = Some(registry);
        self
    }

    pub fn with_validator_registry(mut self, registry: Arc<ValidatorRegistry>) -> Self {
        self.validators = Some(registry);
        self
    }
}

impl std::fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldOptions")
            .field("key", &self.key)
            .field("schema", &self.schema)
            .field("model", &self.model.cid())
            .field("form", &self.form)
            .field("class", &self.class)
            .field("tag_name", &self.tag_name)
            .field("value", &self.value)
            .finish()
    }
}
