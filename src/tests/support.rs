use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::Value;

use crate::domain::FieldSchema;
use crate::field::{FieldController, FieldOptions};
use crate::model::{Model, ModelStore};
use crate::overlay::PopoutStack;
use crate::validation::ErrorDescriptor;
use crate::widget::{Widget, WidgetBase, WidgetContext, WidgetEvent, WidgetFactory};

/// Widget whose `validate` result is scripted by the test.
#[derive(Debug)]
pub struct ScriptedWidget {
    base: WidgetBase,
    verdict: Arc<Mutex<Option<ErrorDescriptor>>>,
}

/// Keys a [`ScriptedWidget`] turns into controller notifications.
pub const REQUIRE_KEY: char = 'r';
pub const OPTIONAL_KEY: char = 'o';
pub const DEFAULT_REQUIRED_KEY: char = 'd';
pub const FILLED_KEY: char = 'f';

impl Widget for ScriptedWidget {
    fn kind(&self) -> &'static str {
        "scripted"
    }

    fn validate(&self) -> Option<ErrorDescriptor> {
        self.verdict.lock().unwrap().clone()
    }

    fn is_empty_value(&self) -> bool {
        matches!(self.base.value(), Value::Null) || self.base.value() == Value::from("")
    }

    fn value(&self) -> Value {
        self.base.value()
    }

    fn display_value(&self) -> String {
        self.base.value().to_string()
    }

    fn set_readonly(&mut self, readonly: bool) {
        self.base.set_readonly(readonly);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.base.set_enabled(enabled);
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.base.set_hidden(hidden);
    }

    fn readonly(&self) -> bool {
        self.base.readonly()
    }

    fn enabled(&self) -> bool {
        self.base.enabled()
    }

    fn hidden(&self) -> bool {
        self.base.hidden()
    }

    fn render(&mut self) {
        self.base.render();
    }

    fn destroy(&mut self) {
        self.base.destroy();
    }

    fn is_rendered(&self) -> bool {
        self.base.is_rendered()
    }

    fn is_destroyed(&self) -> bool {
        self.base.is_destroyed()
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let event = match key.code {
            KeyCode::Char(REQUIRE_KEY) => WidgetEvent::RequiredRequested(Some(true)),
            KeyCode::Char(OPTIONAL_KEY) => WidgetEvent::RequiredRequested(Some(false)),
            KeyCode::Char(DEFAULT_REQUIRED_KEY) => WidgetEvent::RequiredRequested(None),
            KeyCode::Char(FILLED_KEY) => WidgetEvent::EmptinessChanged(Some(false)),
            _ => return false,
        };
        self.base.push_event(event);
        true
    }

    fn drain_events(&mut self) -> Vec<WidgetEvent> {
        self.base.drain_events()
    }
}

pub fn press(ch: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE)
}

/// Factory for [`ScriptedWidget`]s that counts constructions and shares one
/// verdict across every widget it builds.
#[derive(Clone, Default)]
pub struct Script {
    pub built: Arc<AtomicUsize>,
    pub verdict: Arc<Mutex<Option<ErrorDescriptor>>>,
}

impl Script {
    pub fn fail_with(&self, error: ErrorDescriptor) {
        *self.verdict.lock().unwrap() = Some(error);
    }

    pub fn pass(&self) {
        *self.verdict.lock().unwrap() = None;
    }

    pub fn built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }

    pub fn factory(&self) -> WidgetFactory {
        let built = Arc::clone(&self.built);
        let verdict = Arc::clone(&self.verdict);
        Arc::new(move |context: WidgetContext| {
            built.fetch_add(1, Ordering::SeqCst);
            Box::new(ScriptedWidget {
                base: WidgetBase::new(&context),
                verdict: Arc::clone(&verdict),
            }) as Box<dyn Widget>
        })
    }
}

pub struct Fixture {
    pub model: Rc<ModelStore>,
    pub popouts: Rc<PopoutStack>,
}

impl Fixture {
    pub fn new(values: Value) -> Self {
        Self {
            model: Rc::new(ModelStore::from_value(&values)),
            popouts: Rc::new(PopoutStack::new()),
        }
    }

    pub fn options(&self, key: &str, schema: FieldSchema) -> FieldOptions {
        let model: Rc<dyn Model> = self.model.clone();
        FieldOptions::new(key, schema, model, self.popouts.clone())
    }

    pub fn controller(&self, key: &str, schema: FieldSchema) -> FieldController {
        FieldController::new(self.options(key, schema)).unwrap()
    }
}

/// Records every value handed to it, for observer tests.
#[derive(Clone)]
pub struct Recorder<T> {
    pub seen: Rc<RefCell<Vec<T>>>,
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            seen: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T: Clone> Recorder<T> {
    pub fn push(&self, item: T) {
        self.seen.borrow_mut().push(item);
    }

    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.seen.borrow_mut())
    }
}
