use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use super::builtin;
use super::{RegistryError, ValidatorConfig, ValidatorFn, ValidatorSpec};

/// Builds a validator function from an optional configuration object.
pub type ValidatorFactory =
    Arc<dyn Fn(Option<&ValidatorConfig>) -> Result<ValidatorFn, RegistryError> + Send + Sync>;

/// Lookup table from validator name to factory.
///
/// The table holds no per-field state. Resolution is pure lookup plus
/// normalisation, so one registry can be shared by every controller.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    factories: IndexMap<String, ValidatorFactory>,
    frozen: bool,
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .field("frozen", &self.frozen)
            .finish()
    }
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in validators.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::install(&mut registry);
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(Option<&ValidatorConfig>) -> Result<ValidatorFn, RegistryError>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        if self.frozen {
            warn!(validator = %name, "registration rejected: registry is frozen");
            return Err(RegistryError::Frozen { name });
        }
        debug!(validator = %name, "validator registered");
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    pub(super) fn insert(&mut self, name: &str, factory: ValidatorFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Reject every later registration.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Normalise `spec` into a callable validator.
    ///
    /// Shapes are tried in a fixed order: pattern, name, function,
    /// configuration object. Anything else is an invalid spec.
    pub fn resolve(&self, spec: &ValidatorSpec) -> Result<ValidatorFn, RegistryError> {
        match spec {
            ValidatorSpec::Pattern(regex) => {
                let mut config = ValidatorConfig::new();
                config.insert("type".to_string(), Value::String("regexp".to_string()));
                config.insert(
                    "regexp".to_string(),
                    Value::String(regex.as_str().to_string()),
                );
                self.instantiate("regexp", Some(&config))
            }
            ValidatorSpec::Name(name) => self.instantiate(name, None),
            ValidatorSpec::Function(validate) => Ok(Arc::clone(validate)),
            ValidatorSpec::Config(config) => match config.get("type") {
                Some(Value::String(kind)) => self.instantiate(kind, Some(config)),
                Some(other) => Err(RegistryError::InvalidValidatorSpec {
                    reason: format!("configuration \"type\" must be a string, got {other}"),
                }),
                None => Err(RegistryError::InvalidValidatorSpec {
                    reason: "configuration object has no \"type\"".to_string(),
                }),
            },
            ValidatorSpec::Unrecognized(value) => Err(RegistryError::InvalidValidatorSpec {
                reason: format!("unsupported validator value {value}"),
            }),
        }
    }

    /// Resolve a list of specs, failing on the first misconfiguration.
    pub fn resolve_all(&self, specs: &[ValidatorSpec]) -> Result<Vec<ValidatorFn>, RegistryError> {
        specs.iter().map(|spec| self.resolve(spec)).collect()
    }

    fn instantiate(
        &self,
        name: &str,
        config: Option<&ValidatorConfig>,
    ) -> Result<ValidatorFn, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::UnknownValidator {
                name: name.to_string(),
            })?;
        factory(config)
    }
}

static GLOBAL: OnceLock<RwLock<Arc<ValidatorRegistry>>> = OnceLock::new();

fn global_cell() -> &'static RwLock<Arc<ValidatorRegistry>> {
    GLOBAL.get_or_init(|| RwLock::new(Arc::new(ValidatorRegistry::with_builtins())))
}

/// Snapshot of the process-wide registry.
///
/// Registrations made after the snapshot is taken are not visible through it;
/// register custom validators at startup, before fields are constructed.
pub fn global() -> Arc<ValidatorRegistry> {
    let guard = global_cell().read().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(&*guard)
}

/// Register a validator in the process-wide registry.
pub fn register<F>(name: impl Into<String>, factory: F) -> Result<(), RegistryError>
where
    F: Fn(Option<&ValidatorConfig>) -> Result<ValidatorFn, RegistryError> + Send + Sync + 'static,
{
    let mut guard = global_cell().write().unwrap_or_else(PoisonError::into_inner);
    Arc::make_mut(&mut *guard).register(name, factory)
}

/// Resolve against the process-wide registry.
pub fn resolve(spec: &ValidatorSpec) -> Result<ValidatorFn, RegistryError> {
    global().resolve(spec)
}

/// Freeze the process-wide registry.
pub fn freeze() {
    let mut guard = global_cell().write().unwrap_or_else(PoisonError::into_inner);
    Arc::make_mut(&mut *guard).freeze();
}
