use std::sync::Arc;

use regex::Regex;
use serde_json::{Value, json};

use crate::validation::{
    self, ErrorDescriptor, RegistryError, ValidatorConfig, ValidatorRegistry, ValidatorSpec,
};

fn config(value: Value) -> ValidatorSpec {
    ValidatorSpec::from_value(&value)
}

#[test]
fn every_shape_resolves_to_the_same_contract() {
    let registry = ValidatorRegistry::with_builtins();
    let specs = [
        ValidatorSpec::from("required"),
        ValidatorSpec::from(Regex::new("^[a-z]+$").unwrap()),
        ValidatorSpec::function(|value, _all, key| {
            (value == &json!("bad")).then(|| ErrorDescriptor::new("custom", format!("{key} is bad")))
        }),
        config(json!({"type": "length", "max": 3})),
    ];
    for spec in &specs {
        let check = registry.resolve(spec).unwrap();
        assert!(check(&json!("abc"), &json!({"name": "abc"}), "name").is_none());
    }
}

#[test]
fn length_config_from_the_scenario() {
    let check = ValidatorRegistry::with_builtins()
        .resolve(&config(json!({"type": "length", "min": 3})))
        .unwrap();
    assert!(check(&json!("ab"), &json!({}), "name").is_some());
    assert!(check(&json!("abc"), &json!({}), "name").is_none());
}

#[test]
fn pattern_resolves_through_regexp_builtin() {
    let check = ValidatorRegistry::with_builtins()
        .resolve(&Regex::new(r"^\d{3}$").unwrap().into())
        .unwrap();
    let err = check(&json!("12a"), &json!({}), "code").expect("no match");
    assert_eq!(err.kind, "regexp");
    assert!(check(&json!("123"), &json!({}), "code").is_none());
}

#[test]
fn pattern_wins_even_without_a_registered_name() {
    let mut registry = ValidatorRegistry::new();
    registry
        .register("regexp", |_config: Option<&ValidatorConfig>| {
            Ok(Arc::new(|_value: &Value, _all: &Value, _key: &str| {
                Some(ErrorDescriptor::new("regexp", "always"))
            }) as crate::validation::ValidatorFn)
        })
        .unwrap();
    let check = registry
        .resolve(&Regex::new("x").unwrap().into())
        .unwrap();
    assert!(check(&json!("x"), &json!({}), "k").is_some());
}

#[test]
fn function_bypasses_the_registry() {
    let empty = ValidatorRegistry::new();
    let spec = ValidatorSpec::function(|_value, all, key| {
        (all[key] != json!("ok")).then(|| ErrorDescriptor::new("custom", "not ok"))
    });
    let check = empty.resolve(&spec).unwrap();
    assert!(check(&json!(null), &json!({"f": "ok"}), "f").is_none());
    assert!(check(&json!(null), &json!({"f": "no"}), "f").is_some());
}

#[test]
fn unknown_names_fail_for_strings_and_configs() {
    let registry = ValidatorRegistry::with_builtins();
    assert_eq!(
        registry.resolve(&"nope".into()).err(),
        Some(RegistryError::UnknownValidator {
            name: "nope".to_string()
        })
    );
    assert_eq!(
        registry.resolve(&config(json!({"type": "nope"}))).err(),
        Some(RegistryError::UnknownValidator {
            name: "nope".to_string()
        })
    );
}

#[test]
fn typeless_or_unsupported_specs_are_invalid() {
    let registry = ValidatorRegistry::with_builtins();
    for value in [json!({"min": 3}), json!({"type": 7}), json!(42), json!(null), json!([1])] {
        assert!(
            matches!(
                registry.resolve(&config(value.clone())),
                Err(RegistryError::InvalidValidatorSpec { .. })
            ),
            "{value} should be rejected"
        );
    }
}

#[test]
fn resolve_all_stops_at_first_misconfiguration() {
    let registry = ValidatorRegistry::with_builtins();
    let specs = vec![
        ValidatorSpec::from("required"),
        config(json!({"type": "length", "min": 4, "max": 2})),
        ValidatorSpec::from("missing"),
    ];
    assert!(matches!(
        registry.resolve_all(&specs),
        Err(RegistryError::InvalidConfig { .. })
    ));
}

#[test]
fn custom_factories_receive_their_configuration() {
    let mut registry = ValidatorRegistry::with_builtins();
    registry
        .register("oneOf", |config: Option<&ValidatorConfig>| {
            let allowed: Vec<Value> = config
                .and_then(|config| config.get("values"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            Ok(Arc::new(move |value: &Value, _all: &Value, _key: &str| {
                (!allowed.contains(value)).then(|| ErrorDescriptor::new("oneOf", "not allowed"))
            }) as crate::validation::ValidatorFn)
        })
        .unwrap();
    assert!(registry.contains("oneOf"));
    let check = registry
        .resolve(&config(json!({"type": "oneOf", "values": ["a", "b"]})))
        .unwrap();
    assert!(check(&json!("a"), &json!({}), "k").is_none());
    assert!(check(&json!("c"), &json!({}), "k").is_some());
}

#[test]
fn frozen_registry_rejects_registration() {
    let mut registry = ValidatorRegistry::with_builtins();
    registry.freeze();
    assert!(registry.is_frozen());
    let err = registry
        .register("late", |_config: Option<&ValidatorConfig>| {
            Err(RegistryError::invalid_config("late", "unused"))
        })
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::Frozen {
            name: "late".to_string()
        }
    );
    assert!(!registry.contains("late"));
}

#[test]
fn builtin_names_are_all_registered() {
    let registry = ValidatorRegistry::with_builtins();
    for name in [
        "required", "length", "password", "phone", "systemName", "email", "code", "regexp",
        "login", "http", "https", "telegram", "mailto", "git", "ssh", "ftp", "ftps", "jsonSchema",
    ] {
        assert!(registry.contains(name), "missing builtin {name}");
    }
}

#[test]
fn global_registry_registration_is_visible_to_later_snapshots() {
    let before = validation::global();
    validation::register("globalProbe", |_config: Option<&ValidatorConfig>| {
        Ok(Arc::new(|_value: &Value, _all: &Value, _key: &str| None) as crate::validation::ValidatorFn)
    })
    .unwrap();
    assert!(!before.contains("globalProbe"));
    assert!(validation::global().contains("globalProbe"));
    assert!(validation::resolve(&"globalProbe".into()).is_ok());
}
