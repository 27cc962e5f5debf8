//! Observer registration and fan-out
//!
//! A [`SubscriptionHub`] delivers events to every registered callback in
//! registration order. Cancelling through the returned [`Subscription`] is
//! synchronous and idempotent, and a callback cancelled while an event is being
//! delivered is not invoked for that event.
//!
//! # Dropping a `Subscription`
//!
//! A [`Subscription`] is a cancellation handle, not a guard: dropping it leaves
//! the callback registered. Observers live until [`Subscription::cancel`] is
//! called or the owner clears the hub (for a router, on `destroy`). Keep the
//! handle only if you intend to cancel early.

use crate::trace_log;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<E> = Rc<dyn Fn(&E)>;

struct Registry<E> {
    next_id: u64,
    observers: Vec<(u64, Callback<E>)>,
}

impl<E> Registry<E> {
    fn contains(&self, id: u64) -> bool {
        self.observers.iter().any(|(observer, _)| *observer == id)
    }
}

/// Fan-out of events of type `E` to zero or more observers
pub struct SubscriptionHub<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E: 'static> SubscriptionHub<E> {
    /// Create an empty hub
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                observers: Vec::new(),
            })),
        }
    }

    /// Register `callback`; it stays registered until cancelled or cleared
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&E) + 'static,
    {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.observers.push((id, Rc::new(callback)));
            id
        };
        trace_log!("Registered observer #{}", id);

        let registry: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .borrow_mut()
                    .observers
                    .retain(|(observer, _)| *observer != id);
                trace_log!("Cancelled observer #{}", id);
            }
        })
    }

    /// Deliver `event` to every observer, returning how many were invoked.
    ///
    /// Observers may subscribe, cancel or trigger further events from inside
    /// the callback.
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<(u64, Callback<E>)> = self.registry.borrow().observers.clone();
        let mut delivered = 0;

        for (id, callback) in snapshot {
            if self.registry.borrow().contains(id) {
                callback(event);
                delivered += 1;
            }
        }

        delivered
    }

    /// Remove every observer
    pub fn clear(&self) {
        let mut registry = self.registry.borrow_mut();
        trace_log!("Clearing {} observers", registry.observers.len());
        registry.observers.clear();
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.registry.borrow().observers.len()
    }

    /// Check if nobody is listening
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for SubscriptionHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for SubscriptionHub<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHub")
            .field("observers", &self.registry.borrow().observers.len())
            .finish()
    }
}

/// Cancellation handle returned by `subscribe`.
///
/// **Dropping the handle does not cancel.** The callback stays registered until
/// [`Subscription::cancel`] runs or the hub is cleared, so
/// `router.create(config, on_change)?;` without keeping the handle is fine.
pub struct Subscription {
    cancel: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: RefCell::new(Some(Box::new(cancel))),
        }
    }

    /// Remove the observer. Calling it again does nothing.
    pub fn cancel(&self) {
        let cancel = self.cancel.borrow_mut().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// Whether `cancel` has not been called yet
    pub fn is_active(&self) -> bool {
        self.cancel.borrow().is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
