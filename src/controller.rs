//! Navigation controller
//!
//! The public navigation surface. Each operation mutates the [`SessionHistory`],
//! then issues the matching host primitive, then publishes the new current entry.
//! Because the store is updated before the host is called, a host that reports
//! its own change synchronously finds the model already aligned and the
//! notification collapses into a no-op.

use crate::bridge::{self, Reconciliation};
use crate::entry::{hash_from_url, resolve_hash, EntryState, EntryUpdate, HistoryEntry};
use crate::error::NavigationError;
use crate::history::SessionHistory;
use crate::host::{HistoryHost, ListenerId};
use crate::observable::Observable;
use crate::result::{NavigationResult, NavigationType};
use crate::subscription::Subscription;
use crate::{debug_log, trace_log, TraverseDirection};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Options for [`NavigationController::navigate`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigateOptions {
    /// State for the target entry; `None` means "leave as is" on a same-hash
    /// navigation and "empty" on a new entry
    pub state: Option<EntryState>,
}

impl NavigateOptions {
    /// Navigate carrying `state`
    pub fn with_state(state: EntryState) -> Self {
        Self { state: Some(state) }
    }
}

/// Options for [`NavigationController::traverse_to`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraverseOptions {
    /// Replacement state for the target entry
    pub state: Option<EntryState>,
}

/// Options for [`NavigationController::reload`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReloadOptions {
    /// Replacement state; `None` keeps the current one
    pub state: Option<EntryState>,
}

/// Host primitive to issue once the store has been updated
#[derive(Debug)]
enum HostCall {
    Push { state: EntryState, url: String },
    Replace { state: EntryState, url: String },
    Go(isize),
    AssignHash(String),
}

/// State shared between the controller and the event bridge
pub(crate) struct Shared {
    pub(crate) host: Rc<dyn HistoryHost>,
    pub(crate) store: RefCell<SessionHistory>,
    pub(crate) active: Cell<bool>,
    pub(crate) listener: Cell<Option<ListenerId>>,
    current: Observable<HistoryEntry>,
    can_go_back: Observable<bool>,
    can_go_forward: Observable<bool>,
}

impl Shared {
    /// Recompute every observable cell from the store
    pub(crate) fn publish(&self) {
        let (entry, back, forward) = {
            let store = self.store.borrow();
            (
                store.current_entry().clone(),
                store.can_go_back(),
                store.can_go_forward(),
            )
        };

        // Flags first so observers of the entry read fresh values
        self.can_go_back.set(back);
        self.can_go_forward.set(forward);
        if self.current.set(entry) {
            trace_log!("Published new current entry");
        }
    }

    fn entry_from_host(&self) -> HistoryEntry {
        HistoryEntry::new(self.host.location(), 0, self.host.current_state())
    }
}

/// Session-history navigation on top of a [`HistoryHost`]
#[derive(Clone)]
pub struct NavigationController {
    shared: Rc<Shared>,
}

impl NavigationController {
    /// Create a controller seeded from the host's present location.
    ///
    /// The controller does not listen to the host until [`attach`](Self::attach).
    pub fn new(host: Rc<dyn HistoryHost>) -> Self {
        let initial = HistoryEntry::new(host.location(), 0, host.current_state());
        let shared = Shared {
            host,
            store: RefCell::new(SessionHistory::new(initial.clone())),
            active: Cell::new(false),
            listener: Cell::new(None),
            current: Observable::new(initial),
            can_go_back: Observable::new(false),
            can_go_forward: Observable::new(false),
        };
        Self {
            shared: Rc::new(shared),
        }
    }

    /// Start reconciling host-originated changes
    pub fn attach(&self) {
        self.shared.active.set(true);
        if bridge::attach(&self.shared) {
            debug_log!("Navigation attached to host");
        }
    }

    /// Whether the change listener is registered
    pub fn is_attached(&self) -> bool {
        self.shared.listener.get().is_some()
    }

    /// Tear down: detach from the host, cancel every subscription and reset
    /// the history to a single entry for the host's present location
    pub fn destroy(&self) {
        self.shared.active.set(false);
        bridge::detach(&self.shared);

        self.shared.current.clear_subscribers();
        self.shared.can_go_back.clear_subscribers();
        self.shared.can_go_forward.clear_subscribers();

        self.reset();
        debug_log!("Navigation destroyed");
    }

    /// Silently reset the history to a single entry for the host's present
    /// location. Subscribers stay registered but are not notified.
    pub fn reset(&self) {
        let fresh = self.shared.entry_from_host();
        trace_log!("Resetting history to '{}'", fresh.hash);
        self.shared.store.borrow_mut().reset(fresh.clone());
        self.shared.current.reset(fresh);
        self.shared.can_go_back.reset(false);
        self.shared.can_go_forward.reset(false);
    }

    /// Point the host's present record at `hash` and [`reset`](Self::reset)
    /// to it. Nothing is published.
    pub fn relocate(&self, hash: &str) {
        let (state, url) = {
            let store = self.shared.store.borrow();
            let current = store.current_entry();
            (current.state.clone(), resolve_hash(&current.url, hash))
        };
        debug_log!("Relocating to '{}'", url);
        self.shared.host.replace_entry(&state, &url);
        self.reset();
    }

    /// Navigate to `hash`.
    ///
    /// A different hash appends a new entry (dropping any forward branch); the
    /// same hash with different state rewrites the current entry; anything else
    /// is a no-op.
    pub fn navigate(&self, hash: &str, options: NavigateOptions) -> NavigationResult {
        let (kind, calls) = {
            let mut store = self.shared.store.borrow_mut();
            let current = store.current_entry();
            let url = resolve_hash(&current.url, hash);

            if hash_from_url(&url) != current.hash {
                let state = options.state.unwrap_or_default();
                let entry = HistoryEntry::new(url.clone(), store.current_index() + 1, state.clone());
                debug_log!("Pushing '{}'", entry.hash);
                store.append(entry);
                (NavigationType::Push, vec![HostCall::Push { state, url }])
            } else {
                match options.state {
                    Some(state) if state != current.state => {
                        debug_log!("Replacing state of '{}'", current.hash);
                        store.replace_current(EntryUpdate::state(state.clone()));
                        (NavigationType::Replace, vec![HostCall::Replace { state, url }])
                    }
                    _ => {
                        trace_log!("Navigation to '{}' changes nothing", hash);
                        (NavigationType::NoOp, Vec::new())
                    }
                }
            }
        };
        self.commit(kind, calls)
    }

    /// Move to the entry with `key` without adding or removing entries
    pub fn traverse_to(
        &self,
        key: &str,
        options: TraverseOptions,
    ) -> Result<NavigationResult, NavigationError> {
        let calls = {
            let mut store = self.shared.store.borrow_mut();
            let Some(target) = store.find_by_key(key) else {
                debug_log!("Traversal to unknown key '{}'", key);
                return Err(NavigationError::UnknownKey {
                    key: key.to_string(),
                });
            };

            let delta = target as isize - store.current_index() as isize;
            let mut calls = Vec::new();
            if delta != 0 {
                calls.push(HostCall::Go(delta));
            }
            if let Some(state) = options.state {
                let url = store.entries()[target].url.clone();
                store.update_at(target, EntryUpdate::state(state.clone()));
                calls.push(HostCall::Replace { state, url });
            }
            store.move_to(target);
            debug_log!("Traversing by {} to index {}", delta, target);
            calls
        };
        Ok(self.commit(NavigationType::Traverse, calls))
    }

    /// Go one entry back
    pub fn back(&self) -> Result<NavigationResult, NavigationError> {
        self.step(TraverseDirection::Back)
    }

    /// Go one entry forward
    pub fn forward(&self) -> Result<NavigationResult, NavigationError> {
        self.step(TraverseDirection::Forward)
    }

    /// Re-materialize the current entry with a new id, optionally with new state
    pub fn reload(&self, options: ReloadOptions) -> NavigationResult {
        let calls = {
            let mut store = self.shared.store.borrow_mut();
            store.replace_current(EntryUpdate::default().with_state(options.state).renewing_id());
            let current = store.current_entry();
            debug_log!("Reloading '{}'", current.hash);
            vec![
                HostCall::Replace {
                    state: current.state.clone(),
                    url: current.url.clone(),
                },
                HostCall::AssignHash(current.hash.clone()),
            ]
        };
        self.commit(NavigationType::Reload, calls)
    }

    /// Replace the state of the current entry
    pub fn update_current_entry(&self, state: EntryState) -> NavigationResult {
        let (kind, calls) = {
            let mut store = self.shared.store.borrow_mut();
            let changed = store.replace_current(EntryUpdate::state(state));
            let current = store.current_entry();
            (
                if changed {
                    NavigationType::Replace
                } else {
                    NavigationType::NoOp
                },
                vec![HostCall::Replace {
                    state: current.state.clone(),
                    url: current.url.clone(),
                }],
            )
        };
        self.commit(kind, calls)
    }

    /// Rewrite the current entry's location in place, without a history-visible
    /// navigation
    pub fn update_current_entry_hash(
        &self,
        hash: &str,
        state: Option<EntryState>,
    ) -> NavigationResult {
        let (kind, calls) = {
            let mut store = self.shared.store.borrow_mut();
            let url = resolve_hash(&store.current_entry().url, hash);
            let changed = store.replace_current(EntryUpdate::url(url).with_state(state));
            let current = store.current_entry();
            debug_log!("Rewriting current location to '{}'", current.hash);
            (
                if changed {
                    NavigationType::Replace
                } else {
                    NavigationType::NoOp
                },
                vec![HostCall::Replace {
                    state: current.state.clone(),
                    url: current.url.clone(),
                }],
            )
        };
        self.commit(kind, calls)
    }

    /// Reconcile a change notification by hand.
    ///
    /// Attached controllers receive these from the host automatically.
    pub fn handle_hash_change(&self, url: &str) -> Reconciliation {
        bridge::reconcile(&self.shared, url)
    }

    /// Current entry
    pub fn current_entry(&self) -> HistoryEntry {
        self.shared.store.borrow().current_entry().clone()
    }

    /// Current position
    pub fn current_index(&self) -> usize {
        self.shared.store.borrow().current_index()
    }

    /// Every entry, oldest first
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.shared.store.borrow().entries().to_vec()
    }

    /// Check if can go back
    pub fn can_go_back(&self) -> bool {
        self.shared.can_go_back.get()
    }

    /// Check if can go forward
    pub fn can_go_forward(&self) -> bool {
        self.shared.can_go_forward.get()
    }

    /// Observe the current entry.
    ///
    /// `callback` runs once immediately, then once per distinct change.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&HistoryEntry, Option<&HistoryEntry>) + 'static,
    {
        self.shared
            .current
            .subscribe(move |change| callback(&change.current, change.previous.as_ref()))
    }

    /// Observe [`can_go_back`](Self::can_go_back)
    pub fn subscribe_can_go_back<F>(&self, callback: F) -> Subscription
    where
        F: Fn(bool) + 'static,
    {
        self.shared
            .can_go_back
            .subscribe(move |change| callback(change.current))
    }

    /// Observe [`can_go_forward`](Self::can_go_forward)
    pub fn subscribe_can_go_forward<F>(&self, callback: F) -> Subscription
    where
        F: Fn(bool) + 'static,
    {
        self.shared
            .can_go_forward
            .subscribe(move |change| callback(change.current))
    }

    /// The host this controller drives
    pub fn host(&self) -> &Rc<dyn HistoryHost> {
        &self.shared.host
    }

    fn step(&self, direction: TraverseDirection) -> Result<NavigationResult, NavigationError> {
        let key = {
            let store = self.shared.store.borrow();
            let index = match direction {
                TraverseDirection::Back => store.current_index().checked_sub(1),
                TraverseDirection::Forward => Some(store.current_index() + 1),
            };
            index
                .and_then(|index| store.entry(index))
                .map(|entry| entry.key.clone())
        };

        match key {
            Some(key) => self.traverse_to(&key, TraverseOptions::default()),
            None => {
                // The native stack may be ahead of the model, e.g. right after create
                debug_log!("No entry {} the current one, asking host anyway", direction);
                match direction {
                    TraverseDirection::Back => self.shared.host.go_back(),
                    TraverseDirection::Forward => self.shared.host.go_forward(),
                }
                Err(NavigationError::NoAdjacentEntry { direction })
            }
        }
    }

    fn commit(&self, kind: NavigationType, calls: Vec<HostCall>) -> NavigationResult {
        let host = &self.shared.host;
        for call in calls {
            trace_log!("Host call: {:?}", call);
            match call {
                HostCall::Push { state, url } => host.push_entry(&state, &url),
                HostCall::Replace { state, url } => host.replace_entry(&state, &url),
                HostCall::Go(delta) => host.go_relative(delta),
                HostCall::AssignHash(hash) => host.assign_hash(&hash),
            }
        }

        if kind != NavigationType::NoOp {
            self.shared.publish();
        }
        NavigationResult::new(kind, self.current_entry())
    }
}

impl fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationController")
            .field("history", &self.shared.store.borrow())
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostOp, MemoryHost};
    use serde_json::json;

    const BASE: &str = "app://local/index.html";

    fn setup() -> (Rc<MemoryHost>, NavigationController) {
        let host = Rc::new(MemoryHost::new(format!("{BASE}#home")));
        let controller = NavigationController::new(host.clone());
        controller.attach();
        (host, controller)
    }

    fn state(value: serde_json::Value) -> EntryState {
        value.as_object().cloned().unwrap()
    }

    fn hashes(controller: &NavigationController) -> Vec<String> {
        controller.entries().into_iter().map(|e| e.hash).collect()
    }

    #[test]
    fn test_seeded_from_host() {
        let (_host, controller) = setup();
        assert_eq!(controller.current_entry().hash, "home");
        assert_eq!(controller.entries().len(), 1);
        assert!(controller.is_attached());
    }

    #[test]
    fn test_navigate_pushes_and_aligns_host() {
        let (host, controller) = setup();

        let result = controller.navigate("about", NavigateOptions::default());
        assert_eq!(result.kind(), NavigationType::Push);
        assert_eq!(result.entry().hash, "about");
        assert_eq!(result.entry().index, 1);
        assert_eq!(host.location(), format!("{BASE}#about"));
        assert_eq!(host.native_len(), 2);
        assert!(controller.can_go_back());
    }

    #[test]
    fn test_navigate_same_hash_with_new_state_replaces() {
        let (host, controller) = setup();
        host.clear_operations();

        let result = controller.navigate("home", NavigateOptions::with_state(state(json!({"a": 1}))));
        assert_eq!(result.kind(), NavigationType::Replace);
        assert_eq!(controller.entries().len(), 1);
        assert_eq!(controller.current_entry().state["a"], 1);
        assert!(matches!(host.operations()[..], [HostOp::Replace { .. }]));
    }

    #[test]
    fn test_repeated_navigation_is_noop() {
        let (host, controller) = setup();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let _sub = controller.subscribe(move |_, _| c.set(c.get() + 1));

        controller.navigate("a", NavigateOptions::with_state(state(json!({"x": true}))));
        host.clear_operations();
        let result = controller.navigate("#a", NavigateOptions::with_state(state(json!({"x": true}))));
        let again = controller.navigate("a", NavigateOptions::default());

        assert!(result.is_noop());
        assert!(again.is_noop());
        assert!(host.operations().is_empty());
        assert_eq!(controller.entries().len(), 2);
        // initial call plus one push
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_push_from_middle_discards_forward_branch() {
        let (host, controller) = setup();
        controller.navigate("a", NavigateOptions::default());
        controller.navigate("b", NavigateOptions::default());
        controller.navigate("c", NavigateOptions::default());
        controller.back().unwrap();
        controller.back().unwrap();

        let result = controller.navigate("d", NavigateOptions::default());
        assert_eq!(hashes(&controller), ["home", "a", "d"]);
        assert_eq!(result.entry().index, 2);
        assert_eq!(controller.entries().len(), controller.current_index() + 1);
        assert!(!controller.can_go_forward());
        assert_eq!(host.native_len(), 3);
    }

    #[test]
    fn test_traverse_preserves_both_sides() {
        let (host, controller) = setup();
        controller.navigate("a", NavigateOptions::default());
        controller.navigate("b", NavigateOptions::default());
        controller.navigate("c", NavigateOptions::default());
        let key = controller.entries()[1].key.clone();

        let result = controller.traverse_to(&key, TraverseOptions::default()).unwrap();
        assert_eq!(result.kind(), NavigationType::Traverse);
        assert_eq!(controller.current_index(), 1);
        assert_eq!(hashes(&controller), ["home", "a", "b", "c"]);
        assert_eq!(host.native_index(), 1);
    }

    #[test]
    fn test_traverse_with_state_updates_target() {
        let (host, controller) = setup();
        controller.navigate("a", NavigateOptions::default());
        let key = controller.entries()[0].key.clone();

        controller
            .traverse_to(
                &key,
                TraverseOptions {
                    state: Some(state(json!({"scroll": 10}))),
                },
            )
            .unwrap();

        assert_eq!(controller.current_entry().state["scroll"], 10);
        assert_eq!(host.current_state()["scroll"], 10);
        assert_eq!(host.location(), format!("{BASE}#home"));
        assert_eq!(host.native_len(), 2);
    }

    #[test]
    fn test_traverse_unknown_key() {
        let (host, controller) = setup();
        host.clear_operations();

        let error = controller
            .traverse_to("nope", TraverseOptions::default())
            .unwrap_err();
        assert!(error.is_unknown_key());
        assert!(host.operations().is_empty());
        assert_eq!(controller.entries().len(), 1);
    }

    #[test]
    fn test_back_then_forward_restores_entry() {
        let (_host, controller) = setup();
        controller.navigate("a", NavigateOptions::with_state(state(json!({"n": 1}))));
        let before = controller.current_entry();

        controller.back().unwrap();
        assert_eq!(controller.current_entry().hash, "home");
        controller.forward().unwrap();

        let after = controller.current_entry();
        assert_eq!(after.key, before.key);
        assert_eq!(after.state, before.state);
    }

    #[test]
    fn test_back_at_boundary_still_calls_host() {
        let (host, controller) = setup();
        host.clear_operations();

        let error = controller.back().unwrap_err();
        assert_eq!(
            error,
            NavigationError::NoAdjacentEntry {
                direction: TraverseDirection::Back
            }
        );
        assert_eq!(host.operations(), vec![HostOp::Go { delta: -1 }]);

        let error = controller.forward().unwrap_err();
        assert!(error.is_boundary());
    }

    #[test]
    fn test_reload_renews_identity() {
        let (host, controller) = setup();
        controller.navigate("a", NavigateOptions::default());
        let before = controller.current_entry();
        host.clear_operations();

        let result = controller.reload(ReloadOptions {
            state: Some(state(json!({"fresh": true}))),
        });
        assert_eq!(result.kind(), NavigationType::Reload);

        let after = controller.current_entry();
        assert_eq!(after.key, before.key);
        assert_ne!(after.id, before.id);
        assert_eq!(after.state["fresh"], true);
        assert_eq!(controller.entries().len(), 2);
        assert!(matches!(
            host.operations()[..],
            [HostOp::Replace { .. }, HostOp::AssignHash { .. }]
        ));
    }

    #[test]
    fn test_update_current_entry_always_replaces() {
        let (host, controller) = setup();
        host.clear_operations();

        controller.update_current_entry(state(json!({"k": "v"})));
        controller.update_current_entry(state(json!({"k": "v"})));

        let ops = host.operations();
        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| matches!(op, HostOp::Replace { .. })));
        assert_eq!(controller.entries().len(), 1);
    }

    #[test]
    fn test_update_current_entry_hash_is_in_place() {
        let (host, controller) = setup();
        let key = controller.current_entry().key;

        let result = controller.update_current_entry_hash("start", None);
        assert_eq!(result.kind(), NavigationType::Replace);
        assert_eq!(controller.current_entry().hash, "start");
        assert_eq!(controller.current_entry().key, key);
        assert_eq!(controller.entries().len(), 1);
        assert_eq!(host.native_len(), 1);
        assert_eq!(host.location(), format!("{BASE}#start"));
    }

    #[test]
    fn test_subscribe_receives_previous() {
        let (_host, controller) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _sub = controller.subscribe(move |entry, previous| {
            s.borrow_mut()
                .push((entry.hash.clone(), previous.map(|p| p.hash.clone())));
        });

        controller.navigate("a", NavigateOptions::default());
        assert_eq!(
            *seen.borrow(),
            vec![
                ("home".to_string(), None),
                ("a".to_string(), Some("home".to_string()))
            ]
        );
    }

    #[test]
    fn test_flag_cells() {
        let (_host, controller) = setup();
        let back = Rc::new(RefCell::new(Vec::new()));
        let b = back.clone();
        let _sub = controller.subscribe_can_go_back(move |value| b.borrow_mut().push(value));
        let forward = Rc::new(RefCell::new(Vec::new()));
        let f = forward.clone();
        let _sub2 = controller.subscribe_can_go_forward(move |value| f.borrow_mut().push(value));

        controller.navigate("a", NavigateOptions::default());
        controller.navigate("b", NavigateOptions::default());
        controller.back().unwrap();

        assert_eq!(*back.borrow(), vec![false, true]);
        assert_eq!(*forward.borrow(), vec![false, true]);
    }

    #[test]
    fn test_destroy_resets_and_cancels() {
        let (host, controller) = setup();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let _sub = controller.subscribe(move |_, _| c.set(c.get() + 1));
        controller.navigate("a", NavigateOptions::default());

        controller.destroy();
        assert!(!controller.is_attached());
        assert_eq!(host.listener_count(), 0);
        assert_eq!(controller.entries().len(), 1);
        assert_eq!(controller.current_entry().hash, "a");
        assert!(!controller.can_go_back());

        controller.navigate("b", NavigateOptions::default());
        assert_eq!(calls.get(), 2);

        controller.attach();
        assert!(controller.is_attached());
    }

    #[test]
    fn test_reset_follows_host_silently() {
        let (host, controller) = setup();
        controller.navigate("a", NavigateOptions::default());
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let _sub = controller.subscribe(move |_, _| c.set(c.get() + 1));

        host.user_back();
        controller.reset();

        assert_eq!(controller.entries().len(), 1);
        assert_eq!(controller.current_entry().hash, "home");
        assert_eq!(calls.get(), 1);
        // The queued notification finds the model aligned
        host.flush();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_relocate_is_silent() {
        let (host, controller) = setup();
        controller.navigate("a", NavigateOptions::default());
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let _sub = controller.subscribe(move |_, _| c.set(c.get() + 1));

        controller.relocate("#b");

        assert_eq!(calls.get(), 1);
        assert_eq!(controller.current_entry().hash, "b");
        assert_eq!(controller.entries().len(), 1);
        assert_eq!(host.location(), format!("{BASE}#b"));
        assert_eq!(host.native_len(), 2);
    }
}
