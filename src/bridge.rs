//! Host change reconciliation
//!
//! Listens for the host's fragment-change notification and brings the session
//! history back in line with the native stack. The host's location is read at
//! delivery time rather than trusted from the notification, so a notification
//! that was queued before a later model change resolves against where the host
//! actually is now.

use crate::controller::Shared;
use crate::entry::{EntryUpdate, HistoryEntry};
use crate::{debug_log, trace_log, warn_log};
use std::rc::Rc;

/// What a change notification did to the session history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The controller is detached or destroyed; nothing was touched
    Suppressed,
    /// The host already points at the current entry
    AlreadyCurrent,
    /// Moved to an existing entry
    Known { index: usize },
    /// Appended an entry the model had never seen
    Unknown { index: usize },
}

/// Register the change listener. Returns `false` if one is already registered.
pub(crate) fn attach(shared: &Rc<Shared>) -> bool {
    if shared.listener.get().is_some() {
        return false;
    }

    let weak = Rc::downgrade(shared);
    let id = shared.host.listen(Rc::new(move |url: &str| {
        if let Some(shared) = weak.upgrade() {
            reconcile(&shared, url);
        }
    }));
    shared.listener.set(Some(id));
    true
}

/// Remove the change listener, if any
pub(crate) fn detach(shared: &Shared) -> bool {
    match shared.listener.take() {
        Some(id) => {
            shared.host.unlisten(id);
            true
        }
        None => false,
    }
}

/// Align the store with the host after a change notification for `reported_url`
pub(crate) fn reconcile(shared: &Shared, reported_url: &str) -> Reconciliation {
    if !shared.active.get() {
        debug_log!("Suppressing change to '{}' on inactive navigation", reported_url);
        return Reconciliation::Suppressed;
    }

    let location = shared.host.location();
    if location != reported_url {
        trace_log!(
            "Change reported '{}' but host is at '{}'",
            reported_url,
            location
        );
    }

    let outcome = {
        let Ok(mut store) = shared.store.try_borrow_mut() else {
            warn_log!("Change to '{}' arrived during a store mutation", location);
            return Reconciliation::AlreadyCurrent;
        };

        if store.current_entry().url == location {
            trace_log!("Host already at current entry");
            return Reconciliation::AlreadyCurrent;
        }

        let host_state = shared.host.current_state();
        let near = store.current_index();
        match store.find_by_url(&location, near) {
            Some(index) => {
                if store.entries()[index].state != host_state {
                    store.update_at(index, EntryUpdate::state(host_state));
                }
                store.move_to(index);
                debug_log!("Host moved to known entry {}", index);
                Reconciliation::Known { index }
            }
            None => {
                let entry = HistoryEntry::new(location, near + 1, host_state);
                debug_log!("Host moved to unknown location '{}'", entry.hash);
                store.append(entry);
                Reconciliation::Unknown {
                    index: store.current_index(),
                }
            }
        }
    };

    shared.publish();
    outcome
}
