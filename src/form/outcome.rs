use serde::Serialize;
use serde_json::Value;

use crate::validation::ErrorDescriptor;

/// A field that failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub key: String,
    pub error: ErrorDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FormOutcome {
    /// Every visible field passed; carries the model's values.
    Valid { values: Value },
    Invalid { issues: Vec<FieldIssue> },
}

impl FormOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, FormOutcome::Valid { .. })
    }

    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            FormOutcome::Valid { .. } => &[],
            FormOutcome::Invalid { issues } => issues,
        }
    }
}
