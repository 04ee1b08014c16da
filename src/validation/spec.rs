use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::ErrorDescriptor;

/// `(value, all values, field key) -> error`. `None` means the value passed.
pub type ValidatorFn = Arc<dyn Fn(&Value, &Value, &str) -> Option<ErrorDescriptor> + Send + Sync>;

/// Configuration object handed to a validator factory. Carries `type` when it
/// came from a configuration-shaped spec.
pub type ValidatorConfig = Map<String, Value>;

/// The recognised shapes of a validator description.
#[derive(Clone)]
pub enum ValidatorSpec {
    Pattern(Regex),
    Name(String),
    Function(ValidatorFn),
    Config(ValidatorConfig),
    /// Anything else a document may contain; resolving it always fails.
    Unrecognized(Value),
}

impl ValidatorSpec {
    pub fn function<F>(validate: F) -> Self
    where
        F: Fn(&Value, &Value, &str) -> Option<ErrorDescriptor> + Send + Sync + 'static,
    {
        ValidatorSpec::Function(Arc::new(validate))
    }

    /// Configuration spec for a registered validator, e.g.
    /// `ValidatorSpec::typed("length", json!({"min": 3}))`.
    pub fn typed(kind: &str, options: Value) -> Self {
        let mut config = match options {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        config.insert("type".to_string(), Value::String(kind.to_string()));
        ValidatorSpec::Config(config)
    }

    /// Interpret a document value. Strings name validators and objects are
    /// configurations; every other value is kept as `Unrecognized`.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(name) => ValidatorSpec::Name(name.clone()),
            Value::Object(config) => ValidatorSpec::Config(config.clone()),
            other => ValidatorSpec::Unrecognized(other.clone()),
        }
    }

    /// Short label for logs.
    pub fn describe(&self) -> String {
        match self {
            ValidatorSpec::Pattern(regex) => format!("/{}/", regex.as_str()),
            ValidatorSpec::Name(name) => name.clone(),
            ValidatorSpec::Function(_) => "<fn>".to_string(),
            ValidatorSpec::Config(config) => match config.get("type") {
                Some(Value::String(kind)) => format!("{kind} {{..}}"),
                _ => "{..}".to_string(),
            },
            ValidatorSpec::Unrecognized(value) => value.to_string(),
        }
    }
}

impl fmt::Debug for ValidatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidatorSpec::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            ValidatorSpec::Name(name) => f.debug_tuple("Name").field(name).finish(),
            ValidatorSpec::Function(_) => f.write_str("Function(..)"),
            ValidatorSpec::Config(config) => f.debug_tuple("Config").field(config).finish(),
            ValidatorSpec::Unrecognized(value) => {
                f.debug_tuple("Unrecognized").field(value).finish()
            }
        }
    }
}

impl From<Regex> for ValidatorSpec {
    fn from(regex: Regex) -> Self {
        ValidatorSpec::Pattern(regex)
    }
}

impl From<&str> for ValidatorSpec {
    fn from(name: &str) -> Self {
        ValidatorSpec::Name(name.to_string())
    }
}

impl From<String> for ValidatorSpec {
    fn from(name: String) -> Self {
        ValidatorSpec::Name(name)
    }
}

impl From<ValidatorConfig> for ValidatorSpec {
    fn from(config: ValidatorConfig) -> Self {
        ValidatorSpec::Config(config)
    }
}

impl<'de> Deserialize<'de> for ValidatorSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(ValidatorSpec::from_value(&value))
    }
}
