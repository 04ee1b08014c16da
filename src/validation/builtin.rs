use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use super::{ErrorDescriptor, RegistryError, ValidatorConfig, ValidatorFn, ValidatorRegistry};

/// Validators that only check the textual shape of a value.
const PATTERNS: &[(&str, &str, &str)] = &[
    (
        "email",
        r"^[\w\-]+([\w\-+.][\w\-]+)*@[\w\-]+(\.[\w\-]+){1,3}$",
        "Invalid email address",
    ),
    ("phone", r"^\+?[0-9()\-\s]{5,20}$", "Invalid phone number"),
    (
        "systemName",
        r"^[A-Za-z_][A-Za-z0-9_]*$",
        "Use latin letters, digits and underscores; do not start with a digit",
    ),
    ("code", r"^[A-Za-z0-9_.\-]+$", "Invalid code"),
    ("login", r"^[A-Za-z0-9_.@\-]+$", "Invalid login"),
    ("http", r"^http://\S+$", "Address must start with http://"),
    ("https", r"^https://\S+$", "Address must start with https://"),
    (
        "telegram",
        r"^(https://t\.me/|tg://)\S+$",
        "Address must start with https://t.me/ or tg://",
    ),
    ("mailto", r"^mailto:\S+@\S+$", "Address must start with mailto:"),
    ("ftp", r"^ftp://\S+$", "Address must start with ftp://"),
    ("ftps", r"^ftps://\S+$", "Address must start with ftps://"),
    (
        "git",
        r"^(git://\S+|git@[\w.\-]+:\S+)$",
        "Address must start with git:// or git@",
    ),
    ("ssh", r"^ssh://\S+$", "Address must start with ssh://"),
];

const DEFAULT_PASSWORD_LENGTH: u64 = 8;

pub(super) fn install(registry: &mut ValidatorRegistry) {
    registry.insert("required", Arc::new(required));
    registry.insert("length", Arc::new(length));
    registry.insert("password", Arc::new(password));
    registry.insert("regexp", Arc::new(regexp));
    registry.insert("jsonSchema", Arc::new(json_schema));
    for (name, pattern, message) in PATTERNS {
        let (name, pattern, message) = (*name, *pattern, *message);
        registry.insert(
            name,
            Arc::new(move |config: Option<&ValidatorConfig>| {
                let regex = Regex::new(pattern)
                    .map_err(|err| RegistryError::invalid_config(name, err.to_string()))?;
                Ok(matching(name, regex, true, message_or(config, message)))
            }),
        );
    }
}

/// Values that count as "nothing entered".
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) | Value::Bool(true) => false,
    }
}

/// Everything except `required` lets blank values through.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn message_or(config: Option<&ValidatorConfig>, fallback: impl Into<String>) -> String {
    config
        .and_then(|config| config.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| fallback.into())
}

fn number_option(config: Option<&ValidatorConfig>, key: &str) -> Option<u64> {
    config.and_then(|config| config.get(key)).and_then(Value::as_u64)
}

fn matching(kind: &'static str, regex: Regex, expect_match: bool, message: String) -> ValidatorFn {
    Arc::new(move |value, _all, _key| {
        if is_blank(value) {
            return None;
        }
        if regex.is_match(&text_of(value)) == expect_match {
            None
        } else {
            Some(ErrorDescriptor::new(kind, message.clone()))
        }
    })
}

fn required(config: Option<&ValidatorConfig>) -> Result<ValidatorFn, RegistryError> {
    let message = message_or(config, "Required");
    Ok(Arc::new(move |value, _all, _key| {
        is_empty_value(value).then(|| ErrorDescriptor::new("required", message.clone()))
    }))
}

fn length(config: Option<&ValidatorConfig>) -> Result<ValidatorFn, RegistryError> {
    let min = number_option(config, "min");
    let max = number_option(config, "max");
    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(RegistryError::invalid_config(
            "length",
            format!("min ({min}) is greater than max ({max})"),
        ));
    }
    let custom = config
        .and_then(|config| config.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(Arc::new(move |value, _all, _key| {
        if is_blank(value) {
            return None;
        }
        let len = match value {
            Value::Array(items) => items.len(),
            other => text_of(other).chars().count(),
        } as u64;
        let (bound, message) = match (min, max) {
            (Some(min), _) if len < min => ("min", format!("Must be at least {min} characters")),
            (_, Some(max)) if len > max => ("max", format!("Must be at most {max} characters")),
            _ => return None,
        };
        let mut descriptor =
            ErrorDescriptor::new("length", custom.clone().unwrap_or(message)).with_meta("length", len);
        if let Some(min) = min {
            descriptor = descriptor.with_meta("min", min);
        }
        if let Some(max) = max {
            descriptor = descriptor.with_meta("max", max);
        }
        Some(descriptor.with_meta("bound", bound))
    }))
}

fn password(config: Option<&ValidatorConfig>) -> Result<ValidatorFn, RegistryError> {
    let min_length = number_option(config, "minLength").unwrap_or(DEFAULT_PASSWORD_LENGTH);
    let message = message_or(
        config,
        format!("Password must be at least {min_length} characters and contain letters and digits"),
    );
    Ok(Arc::new(move |value, _all, _key| {
        if is_blank(value) {
            return None;
        }
        let text = text_of(value);
        let long_enough = text.chars().count() as u64 >= min_length;
        let has_letter = text.chars().any(char::is_alphabetic);
        let has_digit = text.chars().any(|ch| ch.is_ascii_digit());
        if long_enough && has_letter && has_digit {
            None
        } else {
            Some(ErrorDescriptor::new("password", message.clone()).with_meta("minLength", min_length))
        }
    }))
}

fn regexp(config: Option<&ValidatorConfig>) -> Result<ValidatorFn, RegistryError> {
    let pattern = config
        .and_then(|config| config.get("regexp"))
        .and_then(Value::as_str)
        .ok_or_else(|| RegistryError::invalid_config("regexp", "missing \"regexp\" pattern"))?;
    let regex =
        Regex::new(pattern).map_err(|err| RegistryError::invalid_config("regexp", err.to_string()))?;
    let expect_match = config
        .and_then(|config| config.get("match"))
        .and_then(Value::as_bool)
        .unwrap_or(true);
    Ok(matching(
        "regexp",
        regex,
        expect_match,
        message_or(config, "Invalid value"),
    ))
}

fn json_schema(config: Option<&ValidatorConfig>) -> Result<ValidatorFn, RegistryError> {
    let schema = config
        .and_then(|config| config.get("schema"))
        .ok_or_else(|| RegistryError::invalid_config("jsonSchema", "missing \"schema\""))?;
    let validator = jsonschema::validator_for(schema)
        .map_err(|err| RegistryError::invalid_config("jsonSchema", err.to_string()))?;
    let custom = config
        .and_then(|config| config.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(Arc::new(move |value, _all, _key| {
        if is_blank(value) {
            return None;
        }
        let issues: Vec<String> = validator
            .iter_errors(value)
            .map(|error| error.to_string())
            .collect();
        let first = issues.first()?.clone();
        Some(
            ErrorDescriptor::new("jsonSchema", custom.clone().unwrap_or(first))
                .with_meta("issues", issues),
        )
    }))
}
