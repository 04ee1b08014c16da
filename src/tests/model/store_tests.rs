use std::rc::Rc;

use serde_json::json;

use crate::model::{CHANGE_EVENT, Model, ModelEvent, ModelStore};
use crate::tests::support::Recorder;

fn record(store: &ModelStore, event: &str, recorder: &Recorder<ModelEvent>) -> crate::model::Subscription {
    let recorder = recorder.clone();
    store.subscribe(event, Rc::new(move |event: &ModelEvent| recorder.push(event.clone())))
}

#[test]
fn set_announces_key_event_before_generic_change() {
    let store = ModelStore::new();
    let seen = Recorder::default();
    let _key = record(&store, "change:name", &seen);
    let _all = record(&store, CHANGE_EVENT, &seen);

    store.set("name", json!("ada"));

    let names: Vec<String> = seen.take().into_iter().map(|event| event.name).collect();
    assert_eq!(names, ["change:name", "change"]);
}

#[test]
fn unchanged_values_are_silent() {
    let store = ModelStore::from_value(&json!({"name": "ada"}));
    let seen = Recorder::default();
    let _sub = record(&store, CHANGE_EVENT, &seen);

    store.set("name", json!("ada"));
    assert!(seen.take().is_empty());

    store.set("name", json!("grace"));
    let events = seen.take();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].key.as_deref(), Some("name"));
}

#[test]
fn dropping_or_unsubscribing_removes_the_listener_once() {
    let store = ModelStore::new();
    let seen = Recorder::default();
    let first = record(&store, CHANGE_EVENT, &seen);
    let second = record(&store, CHANGE_EVENT, &seen);
    assert_eq!(store.listener_count(), 2);

    assert!(first.is_active());
    first.unsubscribe();
    assert_eq!(store.listener_count(), 1);
    drop(second);
    assert_eq!(store.listener_count(), 0);

    store.set("x", json!(1));
    assert!(seen.take().is_empty());
}

#[test]
fn subscription_outliving_the_store_is_harmless() {
    let seen = Recorder::default();
    let subscription = {
        let store = ModelStore::new();
        record(&store, CHANGE_EVENT, &seen)
    };
    assert_eq!(subscription.event(), CHANGE_EVENT);
    drop(subscription);
}

#[test]
fn handlers_added_during_dispatch_wait_for_the_next_event() {
    let store = Rc::new(ModelStore::new());
    let seen: Recorder<String> = Recorder::default();
    let late = Rc::new(std::cell::RefCell::new(Vec::new()));

    let inner_store = Rc::downgrade(&store);
    let inner_seen = seen.clone();
    let inner_late = Rc::clone(&late);
    let _sub = store.subscribe(
        CHANGE_EVENT,
        Rc::new(move |_event: &ModelEvent| {
            inner_seen.push("outer".to_string());
            let first_time = inner_late.borrow().is_empty();
            if let Some(store) = inner_store.upgrade()
                && first_time
            {
                let again = inner_seen.clone();
                let subscription = store.subscribe(
                    CHANGE_EVENT,
                    Rc::new(move |_event: &ModelEvent| again.push("inner".to_string())),
                );
                inner_late.borrow_mut().push(subscription);
            }
        }),
    );

    store.set("a", json!(1));
    assert_eq!(seen.take(), ["outer"]);
    store.set("a", json!(2));
    assert_eq!(seen.take(), ["outer", "inner"]);
}

#[test]
fn set_many_emits_one_generic_change() {
    let store = ModelStore::from_value(&json!({"a": 1}));
    let seen = Recorder::default();
    let _all = record(&store, CHANGE_EVENT, &seen);
    let _a = record(&store, "change:a", &seen);
    let _b = record(&store, "change:b", &seen);

    let mut values = serde_json::Map::new();
    values.insert("a".to_string(), json!(1));
    values.insert("b".to_string(), json!(2));
    store.set_many(values);

    let names: Vec<String> = seen.take().into_iter().map(|event| event.name).collect();
    assert_eq!(names, ["change:b", "change"]);
    assert_eq!(store.values(), json!({"a": 1, "b": 2}));
}

#[test]
fn trigger_delivers_custom_events() {
    let store = ModelStore::new();
    let seen = Recorder::default();
    let _sub = record(&store, "reload", &seen);
    store.trigger("reload");
    store.trigger("other");
    assert_eq!(seen.take(), [ModelEvent::named("reload")]);
}

#[test]
fn cids_are_unique() {
    assert_ne!(ModelStore::new().cid(), ModelStore::new().cid());
}
