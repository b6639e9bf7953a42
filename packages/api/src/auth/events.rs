//! Session-change listener registry.
//!
//! Listeners are called synchronously, in registration order, for every
//! emitted [`SessionChange`]. A [`Subscription`] removes its listener when
//! dropped or when [`Subscription::unsubscribe`] is called; calling it more
//! than once is harmless. The handler list is snapshotted before each
//! emission, so a listener may subscribe or unsubscribe while being called.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::session::SessionChange;

type Handler = Rc<dyn Fn(&SessionChange)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

#[derive(Clone, Default)]
pub struct SessionEvents {
    registry: Rc<RefCell<Registry>>,
}

impl fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: impl Fn(&SessionChange) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.push((id, Rc::new(handler)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
            active: Cell::new(true),
        }
    }

    pub fn emit(&self, change: &SessionChange) {
        let handlers: Vec<Handler> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        tracing::debug!(event = ?change.event, listeners = handlers.len(), "Session change");
        for handler in handlers {
            handler(change);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }
}

/// Handle to one registered listener.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
    active: Cell<bool>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().handlers.retain(|(id, _)| *id != self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish()
    }
}
