use std::cell::{Cell, RefCell};

use tracing::debug;

use super::{OverlayFactory, OverlayHandle, OverlayRequest, TriggerKind};

#[derive(Debug, Clone)]
pub struct Popout {
    pub handle: OverlayHandle,
    pub request: OverlayRequest,
}

/// In-memory overlay factory that keeps every popout it created, in creation
/// order. Hosts draw from it; tests inspect it.
#[derive(Debug, Default)]
pub struct PopoutStack {
    popouts: RefCell<Vec<Popout>>,
    next_id: Cell<u64>,
}

impl PopoutStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.popouts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.popouts.borrow().is_empty()
    }

    pub fn popouts(&self) -> Vec<Popout> {
        self.popouts.borrow().clone()
    }

    pub fn get(&self, handle: OverlayHandle) -> Option<Popout> {
        self.popouts
            .borrow()
            .iter()
            .find(|popout| popout.handle == handle)
            .cloned()
    }

    pub fn count(&self, trigger: TriggerKind) -> usize {
        self.popouts
            .borrow()
            .iter()
            .filter(|popout| popout.request.trigger == trigger)
            .count()
    }
}

impl OverlayFactory for PopoutStack {
    fn create_overlay(&self, request: OverlayRequest) -> OverlayHandle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let handle = OverlayHandle::new(id);
        debug!(overlay = id, trigger = ?request.trigger, "popout created");
        self.popouts.borrow_mut().push(Popout { handle, request });
        handle
    }
}
