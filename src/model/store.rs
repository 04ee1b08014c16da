use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

use super::{CHANGE_EVENT, EventHandler, Model, ModelEvent, Subscription};

static NEXT_CID: AtomicU64 = AtomicU64::new(1);

struct Listener {
    id: u64,
    event: String,
    handler: EventHandler,
}

/// In-memory [`Model`] over ordered attributes.
///
/// `set` announces `change:<key>` followed by `change`, synchronously and in
/// subscription order, and only when the stored value actually changed.
pub struct ModelStore {
    cid: String,
    attributes: RefCell<IndexMap<String, Value>>,
    listeners: Rc<RefCell<Vec<Listener>>>,
    next_listener: Cell<u64>,
}

impl ModelStore {
    pub fn new() -> Self {
        Self {
            cid: format!("c{}", NEXT_CID.fetch_add(1, Ordering::Relaxed)),
            attributes: RefCell::new(IndexMap::new()),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener: Cell::new(1),
        }
    }

    /// Seed attributes from a JSON object. Other values give an empty model.
    pub fn from_value(value: &Value) -> Self {
        let store = Self::new();
        if let Value::Object(map) = value {
            let mut attributes = store.attributes.borrow_mut();
            for (key, value) in map {
                attributes.insert(key.clone(), value.clone());
            }
        }
        store
    }

    /// Apply several attributes, then announce one `change`.
    pub fn set_many(&self, values: Map<String, Value>) {
        let changed: Vec<String> = {
            let mut attributes = self.attributes.borrow_mut();
            values
                .into_iter()
                .filter_map(|(key, value)| {
                    if attributes.get(&key) == Some(&value) {
                        None
                    } else {
                        attributes.insert(key.clone(), value);
                        Some(key)
                    }
                })
                .collect()
        };
        if changed.is_empty() {
            return;
        }
        for key in &changed {
            self.emit(&ModelEvent::attribute_changed(key));
        }
        self.emit(&ModelEvent::named(CHANGE_EVENT));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn emit(&self, event: &ModelEvent) {
        // Snapshot first: handlers may subscribe or unsubscribe while running.
        let handlers: Vec<EventHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.event == event.name)
            .map(|listener| Rc::clone(&listener.handler))
            .collect();
        trace!(model = %self.cid, event = %event.name, listeners = handlers.len(), "emit");
        for handler in handlers {
            handler(event);
        }
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelStore")
            .field("cid", &self.cid)
            .field("attributes", &self.attributes.borrow())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Model for ModelStore {
    fn cid(&self) -> &str {
        &self.cid
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.attributes.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let changed = {
            let mut attributes = self.attributes.borrow_mut();
            if attributes.get(key) == Some(&value) {
                false
            } else {
                attributes.insert(key.to_string(), value);
                true
            }
        };
        if changed {
            self.emit(&ModelEvent::attribute_changed(key));
            let mut event = ModelEvent::named(CHANGE_EVENT);
            event.key = Some(key.to_string());
            self.emit(&event);
        }
    }

    fn values(&self) -> Value {
        Value::Object(
            self.attributes
                .borrow()
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    fn trigger(&self, event: &str) {
        self.emit(&ModelEvent::named(event));
    }

    fn subscribe(&self, event: &str, handler: EventHandler) -> Subscription {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push(Listener {
            id,
            event: event.to_string(),
            handler,
        });
        let listeners = Rc::downgrade(&self.listeners);
        Subscription::new(event, move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().retain(|listener| listener.id != id);
            }
        })
    }
}
