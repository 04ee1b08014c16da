//! An ordered set of field controllers sharing one model and one overlay
//! factory.

mod outcome;

use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::domain::{FieldEntry, FieldSchema, parse_form_document};
use crate::field::{FieldController, FieldError, FieldOptions, FieldView};
use crate::model::Model;
use crate::overlay::OverlayFactory;
use crate::validation::ValidatorRegistry;
use crate::widget::WidgetRegistry;

pub use outcome::{FieldIssue, FormOutcome};

pub struct Form {
    id: String,
    model: Rc<dyn Model>,
    overlays: Rc<dyn OverlayFactory>,
    widgets: Option<Arc<WidgetRegistry>>,
    validators: Option<Arc<ValidatorRegistry>>,
    fields: IndexMap<String, FieldController>,
}

impl Form {
    pub fn new(id: impl Into<String>, model: Rc<dyn Model>, overlays: Rc<dyn OverlayFactory>) -> Self {
        Self {
            id: id.into(),
            model,
            overlays,
            widgets: None,
            validators: None,
            fields: IndexMap::new(),
        }
    }

    /// Registries used by fields added from now on.
    pub fn with_widget_registry(mut self, registry: Arc<WidgetRegistry>) -> Self {
        self.widgets = Some(registry);
        self
    }

    pub fn with_validator_registry(mut self, registry: Arc<ValidatorRegistry>) -> Self {
        self.validators = Some(registry);
        self
    }

    /// Build one controller per entry, in order.
    pub fn with_entries(mut self, entries: Vec<FieldEntry>) -> Result<Self, FieldError> {
        for entry in entries {
            self.add(entry.key, entry.schema)?;
        }
        Ok(self)
    }

    /// Parse a form document and build its fields.
    pub fn from_document(
        id: impl Into<String>,
        model: Rc<dyn Model>,
        overlays: Rc<dyn OverlayFactory>,
        document: &Value,
    ) -> Result<Self> {
        let entries = parse_form_document(document)?;
        let form = Form::new(id, model, overlays);
        let id = form.id.clone();
        form.with_entries(entries)
            .with_context(|| format!("failed to build form `{id}`"))
    }

    pub fn add(&mut self, key: impl Into<String>, schema: FieldSchema) -> Result<&FieldController, FieldError> {
        let mut options = FieldOptions::new(key, schema, Rc::clone(&self.model), Rc::clone(&self.overlays))
            .with_form(self.id.clone());
        options.widgets = self.widgets.clone();
        options.validators = self.validators.clone();
        self.add_options(options)
    }

    pub fn add_options(&mut self, options: FieldOptions) -> Result<&FieldController, FieldError> {
        let key = options.key.clone();
        if self.fields.contains_key(&key) {
            return Err(FieldError::Schema {
                key,
                reason: "duplicate field key".to_string(),
            });
        }
        let controller = FieldController::new(options)?;
        debug!(form = %self.id, field = %key, "field added");
        let entry = self.fields.entry(key).or_insert(controller);
        Ok(&*entry)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &Rc<dyn Model> {
        &self.model
    }

    pub fn controller(&self, key: &str) -> Option<&FieldController> {
        self.fields.get(key)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &FieldController> {
        self.fields.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn render_all(&self) {
        for controller in self.fields.values() {
            controller.render();
        }
    }

    /// Validate every visible field. Hidden fields are skipped.
    pub fn validate(&self) -> FormOutcome {
        let mut issues = Vec::new();
        for (key, controller) in &self.fields {
            if controller.with_widget(|widget| widget.hidden()).unwrap_or(false) {
                continue;
            }
            if let Some(error) = controller.validate() {
                issues.push(FieldIssue {
                    key: key.clone(),
                    error,
                });
            }
        }
        if issues.is_empty() {
            FormOutcome::Valid {
                values: self.model.values(),
            }
        } else {
            FormOutcome::Invalid { issues }
        }
    }

    pub fn views(&self) -> Vec<FieldView> {
        self.fields.values().filter_map(FieldController::view).collect()
    }

    pub fn destroy(&self) {
        for controller in self.fields.values() {
            controller.destroy();
        }
    }
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("id", &self.id)
            .field("model", &self.model.cid())
            .field("fields", &self.fields)
            .finish()
    }
}
