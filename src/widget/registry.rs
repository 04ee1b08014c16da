use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use indexmap::IndexMap;
use tracing::debug;

use super::{CheckboxWidget, SelectWidget, TextWidget, Widget, WidgetContext};

/// Widget constructor, looked up by schema `type` or referenced directly.
pub type WidgetFactory = Arc<dyn Fn(WidgetContext) -> Box<dyn Widget> + Send + Sync>;

/// Mapping from widget type name to constructor.
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    factories: IndexMap<String, WidgetFactory>,
}

impl std::fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `text`, `password`, `checkbox` (alias `bool`) and `select`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("text", |context| Box::new(TextWidget::new(&context)));
        registry.register("password", |context| Box::new(TextWidget::masked(&context)));
        registry.register("checkbox", |context| Box::new(CheckboxWidget::new(&context)));
        registry.register("bool", |context| Box::new(CheckboxWidget::new(&context)));
        registry.register("select", |context| Box::new(SelectWidget::new(&context)));
        registry
    }

    /// Add or replace the constructor for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(WidgetContext) -> Box<dyn Widget> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(widget = %name, "widget registered");
        self.factories.insert(name, Arc::new(factory));
    }

    pub fn get(&self, name: &str) -> Option<WidgetFactory> {
        self.factories.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

static GLOBAL: OnceLock<RwLock<Arc<WidgetRegistry>>> = OnceLock::new();

fn global_cell() -> &'static RwLock<Arc<WidgetRegistry>> {
    GLOBAL.get_or_init(|| RwLock::new(Arc::new(WidgetRegistry::with_builtins())))
}

/// Snapshot of the process-wide widget registry.
pub fn global() -> Arc<WidgetRegistry> {
    let guard = global_cell().read().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(&*guard)
}

/// Register a widget constructor in the process-wide registry.
pub fn register<F>(name: impl Into<String>, factory: F)
where
    F: Fn(WidgetContext) -> Box<dyn Widget> + Send + Sync + 'static,
{
    let mut guard = global_cell().write().unwrap_or_else(PoisonError::into_inner);
    Arc::make_mut(&mut *guard).register(name, factory);
}
