//! Observable state cells
//!
//! An [`Observable`] holds one value, recomputed explicitly by its owner, and
//! notifies subscribers only when the new value differs from the old one.
//!
//! Changes made from inside a subscriber are queued and delivered after the
//! change being delivered has reached every subscriber, so all subscribers see
//! the same ordered stream and end on the current value.

use crate::subscription::{Subscription, SubscriptionHub};
use crate::trace_log;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

/// A transition of an observable value
#[derive(Debug, Clone, PartialEq)]
pub struct Change<T> {
    /// Value after the change
    pub current: T,
    /// Value before the last distinct change, if there was one
    pub previous: Option<T>,
}

/// Mutable cell with change notification
pub struct Observable<T> {
    value: RefCell<T>,
    previous: RefCell<Option<T>>,
    hub: SubscriptionHub<Change<T>>,
    delivering: Cell<bool>,
    pending: RefCell<VecDeque<Change<T>>>,
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a cell holding `value`
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            previous: RefCell::new(None),
            hub: SubscriptionHub::new(),
            delivering: Cell::new(false),
            pending: RefCell::new(VecDeque::new()),
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Value before the last distinct change
    pub fn previous(&self) -> Option<T> {
        self.previous.borrow().clone()
    }

    /// Store `value` and notify subscribers if it differs from the current one
    pub fn set(&self, value: T) -> bool {
        if *self.value.borrow() == value {
            return false;
        }

        let old = self.value.replace(value.clone());
        *self.previous.borrow_mut() = Some(old.clone());

        self.pending.borrow_mut().push_back(Change {
            current: value,
            previous: Some(old),
        });
        if self.delivering.get() {
            trace_log!("Queued change raised during delivery");
        } else {
            self.deliver();
        }
        true
    }

    fn deliver(&self) {
        self.delivering.set(true);
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(change) = next else { break };
            self.hub.emit(&change);
        }
        self.delivering.set(false);
    }

    /// Store `value` without notifying and forget the previous value
    pub fn reset(&self, value: T) {
        *self.value.borrow_mut() = value;
        *self.previous.borrow_mut() = None;
        self.pending.borrow_mut().clear();
    }

    /// Register `callback` and invoke it once right away with the present value
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Change<T>) + 'static,
    {
        let initial = Change {
            current: self.get(),
            previous: self.previous(),
        };
        callback(&initial);
        self.hub.subscribe(callback)
    }

    /// Drop every subscriber
    pub fn clear_subscribers(&self) {
        self.hub.clear();
        self.pending.borrow_mut().clear();
    }

    /// Number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.hub.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value.borrow())
            .field("subscribers", &self.hub)
            .finish()
    }
}
