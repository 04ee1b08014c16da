//! Observer protocol between a data model and the field controllers bound
//! to it.

mod store;

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

pub use store::ModelStore;

/// Generic notification fired after any attribute changes.
pub const CHANGE_EVENT: &str = "change";

/// Handler invoked synchronously for every matching notification.
pub type EventHandler = Rc<dyn Fn(&ModelEvent)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEvent {
    pub name: String,
    /// Attribute that changed, for `change` and `change:<key>` events.
    pub key: Option<String>,
}

impl ModelEvent {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
        }
    }

    pub fn attribute_changed(key: &str) -> Self {
        Self {
            name: format!("{CHANGE_EVENT}:{key}"),
            key: Some(key.to_string()),
        }
    }
}

/// A bag of attributes that announces its changes.
pub trait Model {
    /// Client-side id, stable for the lifetime of the model.
    fn cid(&self) -> &str;
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    /// All attributes as one JSON object.
    fn values(&self) -> Value;
    fn trigger(&self, event: &str);
    fn subscribe(&self, event: &str, handler: EventHandler) -> Subscription;
}

/// Registration handle returned by [`Model::subscribe`].
///
/// The listener is removed exactly once: by [`Subscription::unsubscribe`] or
/// when the handle is dropped.
pub struct Subscription {
    event: String,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(event: impl Into<String>, release: impl FnOnce() + 'static) -> Self {
        Self {
            event: event.into(),
            release: Some(Box::new(release)),
        }
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("active", &self.is_active())
            .finish()
    }
}
