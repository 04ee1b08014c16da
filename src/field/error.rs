use thiserror::Error;

use crate::validation::RegistryError;

/// Misconfiguration detected while building or rebuilding a field.
///
/// Validation failures never surface here; they are
/// [`ErrorDescriptor`](crate::validation::ErrorDescriptor) values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown widget type `{name}`")]
    UnknownWidget { name: String },
    #[error(transparent)]
    Validator(#[from] RegistryError),
    #[error("field options have an empty key")]
    MissingKey,
    #[error("field `{key}`: {reason}")]
    Schema { key: String, reason: String },
    #[error("field `{key}` is busy handling another operation")]
    Busy { key: String },
}
