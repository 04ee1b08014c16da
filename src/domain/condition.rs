use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value;

use crate::model::Model;

use super::schema::ModelPredicate;

/// Declarative test against one model attribute, used where documents need
/// a computed flag (`readonlyWhen`, `hiddenWhen`, extension `when`).
///
/// The first present comparison wins; with none, the attribute must be
/// truthy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCondition {
    pub key: String,
    #[serde(default)]
    pub equals: Option<Value>,
    #[serde(default)]
    pub not_equals: Option<Value>,
    #[serde(default)]
    pub one_of: Option<Vec<Value>>,
}

impl ModelCondition {
    pub fn truthy(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            equals: None,
            not_equals: None,
            one_of: None,
        }
    }

    pub fn equals(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            equals: Some(value.into()),
            ..Self::truthy(key)
        }
    }

    pub fn matches(&self, model: &dyn Model) -> bool {
        let current = model.get(&self.key).unwrap_or(Value::Null);
        if let Some(expected) = &self.equals {
            return current == *expected;
        }
        if let Some(unexpected) = &self.not_equals {
            return current != *unexpected;
        }
        if let Some(options) = &self.one_of {
            return options.contains(&current);
        }
        is_truthy(&current)
    }

    pub fn into_predicate(self) -> ModelPredicate {
        Rc::new(move |model: &dyn Model| self.matches(model))
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
