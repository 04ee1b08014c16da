use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A single validation failure. Validation failures are data, never `Err`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl ErrorDescriptor {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Misconfiguration detected while resolving or registering validators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("validator \"{name}\" not found")]
    UnknownValidator { name: String },

    #[error("invalid validator: {reason}")]
    InvalidValidatorSpec { reason: String },

    #[error("validator \"{name}\" rejected its configuration: {reason}")]
    InvalidConfig { name: String, reason: String },

    #[error("validator registry is frozen; \"{name}\" was not registered")]
    Frozen { name: String },
}

impl RegistryError {
    pub(crate) fn invalid_config(name: &str, reason: impl Into<String>) -> Self {
        RegistryError::InvalidConfig {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
