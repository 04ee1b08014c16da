use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::domain::{FieldEntry, parse_form_document};

use super::DocumentFormat;

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Read a document from disk; the format follows the extension, JSON
/// otherwise.
pub fn load_document(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let format = DocumentFormat::from_path(path).unwrap_or_default();
    parse_document_str(&contents, format).with_context(|| format!("in {}", path.display()))
}

/// Read and parse a form document (`{"fields": [...]}` or a bare array).
pub fn load_form_document(path: &Path) -> Result<Vec<FieldEntry>> {
    let document = load_document(path)?;
    parse_form_document(&document).with_context(|| format!("invalid form document {}", path.display()))
}
