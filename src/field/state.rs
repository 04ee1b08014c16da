use serde::Serialize;
use serde_json::Value;

/// Visual affordances of a rendered field. Each toggles independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DisplayFlags {
    pub required: bool,
    pub readonly: bool,
    /// `readonly || !enabled`.
    pub disabled: bool,
    pub error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerPhase {
    Unbuilt,
    Built,
    Rebuilding,
    Destroyed,
}

/// Snapshot of everything needed to draw one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub key: String,
    pub label: String,
    pub widget_kind: String,
    pub value: Value,
    pub display_value: String,
    pub flags: DisplayFlags,
    pub hidden: bool,
    pub help_text: Option<String>,
    pub errors: Vec<String>,
}
