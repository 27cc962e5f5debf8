//! Host history capability
//!
//! The navigation core talks to the environment only through [`HistoryHost`]:
//! push/replace/go primitives, a read-back of the native state slot, and a
//! "fragment changed" notification. [`MemoryHost`] emulates a browser-style
//! native history in memory, with notifications queued until [`MemoryHost::flush`]
//! runs, the way an event loop would deliver them.

use crate::entry::{resolve_hash, EntryState};
use crate::trace_log;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Callback invoked with the new full URL when the visible fragment changes
pub type HashChangeListener = Rc<dyn Fn(&str)>;

/// Handle identifying a registered change listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Native history primitives the navigation core depends on
pub trait HistoryHost {
    /// Full URL of the present location
    fn location(&self) -> String;

    /// Append a native record after the present one
    fn push_entry(&self, state: &EntryState, url: &str);

    /// Overwrite the present native record
    fn replace_entry(&self, state: &EntryState, url: &str);

    /// Move `delta` records through the native stack
    fn go_relative(&self, delta: isize);

    /// Move one record back
    fn go_back(&self) {
        self.go_relative(-1);
    }

    /// Move one record forward
    fn go_forward(&self) {
        self.go_relative(1);
    }

    /// State stored in the present native record
    fn current_state(&self) -> EntryState;

    /// Assign the visible fragment
    fn assign_hash(&self, hash: &str);

    /// Register a fragment change listener
    fn listen(&self, listener: HashChangeListener) -> ListenerId;

    /// Remove a listener registered with [`HistoryHost::listen`]
    fn unlisten(&self, id: ListenerId);
}

/// Recorded call into a [`MemoryHost`]
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    Push { url: String, state: EntryState },
    Replace { url: String, state: EntryState },
    Go { delta: isize },
    AssignHash { hash: String },
}

#[derive(Debug, Clone)]
struct NativeRecord {
    url: String,
    state: EntryState,
}

#[derive(Debug)]
struct NativeStack {
    records: Vec<NativeRecord>,
    index: usize,
}

impl NativeStack {
    fn present(&self) -> &NativeRecord {
        &self.records[self.index]
    }
}

/// In-memory native history.
///
/// `push_entry`/`replace_entry` behave like `pushState`/`replaceState` and stay
/// silent unless [`MemoryHost::notify_on_push`] is enabled. Traversals and
/// fragment assignments queue a notification when the visible URL changes.
pub struct MemoryHost {
    stack: RefCell<NativeStack>,
    listeners: RefCell<Vec<(ListenerId, HashChangeListener)>>,
    pending: RefCell<VecDeque<String>>,
    next_listener: Cell<u64>,
    notify_on_push: bool,
    operations: RefCell<Vec<HostOp>>,
}

impl MemoryHost {
    /// Create a host whose only native record is `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            stack: RefCell::new(NativeStack {
                records: vec![NativeRecord {
                    url: url.into(),
                    state: EntryState::new(),
                }],
                index: 0,
            }),
            listeners: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
            next_listener: Cell::new(0),
            notify_on_push: false,
            operations: RefCell::new(Vec::new()),
        }
    }

    /// Also report URL changes caused by push/replace
    pub fn notify_on_push(mut self, enabled: bool) -> Self {
        self.notify_on_push = enabled;
        self
    }

    /// Deliver queued notifications, returning how many were delivered
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(url) = next else { break };

            let listeners: Vec<HashChangeListener> = self
                .listeners
                .borrow()
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            trace_log!("Delivering change to '{}' ({} listeners)", url, listeners.len());
            for listener in listeners {
                listener(&url);
            }
            delivered += 1;
        }
        delivered
    }

    /// Number of notifications waiting for [`MemoryHost::flush`]
    pub fn pending_notifications(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Simulate the user agent's back button
    pub fn user_back(&self) {
        self.traverse(-1);
    }

    /// Simulate the user agent's forward button
    pub fn user_forward(&self) {
        self.traverse(1);
    }

    /// Simulate a multi-step traversal from the user agent
    pub fn user_go(&self, delta: isize) {
        self.traverse(delta);
    }

    /// Simulate the user typing a new fragment into the address bar
    pub fn user_edit_hash(&self, hash: &str) {
        self.assign(hash);
    }

    /// Simulate a script writing state into the present record behind the
    /// navigation core's back
    pub fn set_native_state(&self, state: EntryState) {
        let mut stack = self.stack.borrow_mut();
        let index = stack.index;
        stack.records[index].state = state;
    }

    /// URLs of every native record
    pub fn native_urls(&self) -> Vec<String> {
        self.stack
            .borrow()
            .records
            .iter()
            .map(|record| record.url.clone())
            .collect()
    }

    /// Position within the native stack
    pub fn native_index(&self) -> usize {
        self.stack.borrow().index
    }

    /// Number of native records
    pub fn native_len(&self) -> usize {
        self.stack.borrow().records.len()
    }

    /// Registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Every primitive called so far, oldest first
    pub fn operations(&self) -> Vec<HostOp> {
        self.operations.borrow().clone()
    }

    /// Forget recorded operations
    pub fn clear_operations(&self) {
        self.operations.borrow_mut().clear();
    }

    fn record(&self, op: HostOp) {
        self.operations.borrow_mut().push(op);
    }

    fn queue(&self, url: String) {
        trace_log!("Queueing change notification for '{}'", url);
        self.pending.borrow_mut().push_back(url);
    }

    fn traverse(&self, delta: isize) {
        let changed = {
            let mut stack = self.stack.borrow_mut();
            let target = stack.index.checked_add_signed(delta);
            match target {
                Some(target) if delta != 0 && target < stack.records.len() => {
                    let before = stack.present().url.clone();
                    stack.index = target;
                    let after = stack.present().url.clone();
                    (before != after).then_some(after)
                }
                _ => {
                    trace_log!("Ignoring native traversal by {}", delta);
                    None
                }
            }
        };
        if let Some(url) = changed {
            self.queue(url);
        }
    }

    fn assign(&self, hash: &str) {
        let url = {
            let mut stack = self.stack.borrow_mut();
            let url = resolve_hash(&stack.present().url, hash);
            if url == stack.present().url {
                return;
            }
            let keep = stack.index + 1;
            stack.records.truncate(keep);
            stack.records.push(NativeRecord {
                url: url.clone(),
                state: EntryState::new(),
            });
            stack.index = keep;
            url
        };
        self.queue(url);
    }

    fn write(&self, state: &EntryState, url: &str, push: bool) {
        let changed = {
            let mut stack = self.stack.borrow_mut();
            let before = stack.present().url.clone();
            let record = NativeRecord {
                url: url.to_string(),
                state: state.clone(),
            };
            if push {
                let keep = stack.index + 1;
                stack.records.truncate(keep);
                stack.records.push(record);
                stack.index = keep;
            } else {
                let index = stack.index;
                stack.records[index] = record;
            }
            before != url
        };
        if changed && self.notify_on_push {
            self.queue(url.to_string());
        }
    }
}

impl HistoryHost for MemoryHost {
    fn location(&self) -> String {
        self.stack.borrow().present().url.clone()
    }

    fn push_entry(&self, state: &EntryState, url: &str) {
        self.record(HostOp::Push {
            url: url.to_string(),
            state: state.clone(),
        });
        self.write(state, url, true);
    }

    fn replace_entry(&self, state: &EntryState, url: &str) {
        self.record(HostOp::Replace {
            url: url.to_string(),
            state: state.clone(),
        });
        self.write(state, url, false);
    }

    fn go_relative(&self, delta: isize) {
        self.record(HostOp::Go { delta });
        self.traverse(delta);
    }

    fn current_state(&self) -> EntryState {
        self.stack.borrow().present().state.clone()
    }

    fn assign_hash(&self, hash: &str) {
        self.record(HostOp::AssignHash {
            hash: hash.to_string(),
        });
        self.assign(hash);
    }

    fn listen(&self, listener: HashChangeListener) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn unlisten(&self, id: ListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(listener, _)| *listener != id);
    }
}

impl fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHost")
            .field("stack", &self.stack.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .field("pending", &self.pending.borrow())
            .field("notify_on_push", &self.notify_on_push)
            .finish()
    }
}
