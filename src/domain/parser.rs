use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::validation::ValidatorSpec;

use super::condition::ModelCondition;
use super::schema::{FieldSchema, SchemaPatch, WidgetType};

/// One field of a form document: the model key plus its schema.
#[derive(Debug, Clone)]
pub struct FieldEntry {
    pub key: String,
    pub schema: FieldSchema,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FieldDocument {
    key: String,
    #[serde(rename = "type")]
    widget: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    readonly: bool,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    help_text: Option<String>,
    #[serde(default)]
    validators: Vec<ValidatorSpec>,
    #[serde(default)]
    update_editor_events: Vec<String>,
    #[serde(default)]
    readonly_when: Option<ModelCondition>,
    #[serde(default)]
    hidden_when: Option<ModelCondition>,
    #[serde(default)]
    extensions: Vec<ExtensionDocument>,
    #[serde(default)]
    options: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ExtensionDocument {
    when: ModelCondition,
    patch: PatchDocument,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PatchDocument {
    #[serde(default, rename = "type")]
    widget: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    required: Option<bool>,
    #[serde(default)]
    readonly: Option<bool>,
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    help_text: Option<String>,
    #[serde(default)]
    validators: Option<Vec<ValidatorSpec>>,
    #[serde(default)]
    options: Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

impl From<PatchDocument> for SchemaPatch {
    fn from(doc: PatchDocument) -> Self {
        SchemaPatch {
            widget: doc.widget.map(WidgetType::Named),
            title: doc.title,
            required: doc.required,
            readonly: doc.readonly,
            enabled: doc.enabled,
            help_text: doc.help_text,
            validators: doc.validators,
            options: doc.options,
        }
    }
}

/// Parse one declarative field description.
///
/// `readonlyWhen`/`hiddenWhen` become the schema's computed flags and
/// `extensions` become its schema extension: every extension whose `when`
/// matches contributes its `patch`, later ones winning.
pub fn parse_field_document(value: &Value) -> Result<FieldEntry> {
    let doc: FieldDocument =
        serde_json::from_value(value.clone()).context("invalid field document")?;
    if doc.key.trim().is_empty() {
        bail!("field document has an empty \"key\"");
    }

    let mut schema = FieldSchema::new(doc.widget.as_str())
        .with_required(doc.required)
        .with_readonly(doc.readonly)
        .with_enabled(doc.enabled);
    schema.title = doc.title;
    schema.help_text = doc.help_text;
    schema.validators = with_required_rule(doc.required, doc.validators);
    schema.update_editor_events = doc.update_editor_events;
    schema.options = doc.options;
    schema.get_readonly = doc.readonly_when.map(ModelCondition::into_predicate);
    schema.get_hidden = doc.hidden_when.map(ModelCondition::into_predicate);

    if !doc.extensions.is_empty() {
        let rules: Vec<(ModelCondition, SchemaPatch)> = doc
            .extensions
            .into_iter()
            .map(|extension| (extension.when, SchemaPatch::from(extension.patch)))
            .collect();
        schema = schema.with_extension(move |model| {
            let mut patch = SchemaPatch::new();
            for (when, rule) in &rules {
                if when.matches(model) {
                    patch.merge(rule.clone());
                }
            }
            patch
        });
    }

    Ok(FieldEntry {
        key: doc.key,
        schema,
    })
}

/// `required: true` in a document implies the `required` validator, first.
fn with_required_rule(required: bool, mut validators: Vec<ValidatorSpec>) -> Vec<ValidatorSpec> {
    let present = validators
        .iter()
        .any(|spec| matches!(spec, ValidatorSpec::Name(name) if name == "required"));
    if required && !present {
        validators.insert(0, ValidatorSpec::Name("required".to_string()));
    }
    validators
}

/// Parse a form document: `{"fields": [...]}` or a bare array of fields.
pub fn parse_form_document(value: &Value) -> Result<Vec<FieldEntry>> {
    let fields = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("fields") {
            Some(Value::Array(items)) => items,
            Some(_) => bail!("\"fields\" must be an array"),
            None => bail!("form document has no \"fields\" array"),
        },
        _ => bail!("form document must be an object or an array"),
    };
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            parse_field_document(field).with_context(|| format!("field #{index}"))
        })
        .collect()
}
