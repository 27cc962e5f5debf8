//! Router facade
//!
//! [`Router`] composes a [`NavigationController`] with a [`RouteMatcher`] and
//! decorates every entry it hands out with the pattern it matched. This is the
//! surface UI bindings consume.

use crate::config::RouterConfig;
use crate::controller::{NavigateOptions, NavigationController, ReloadOptions, TraverseOptions};
use crate::entry::{normalize_hash, EntryState, HistoryEntry};
use crate::error::{ConfigError, NavigationError};
use crate::host::HistoryHost;
use crate::matcher::{extract_params, extract_query, strip_query, RouteMatcher};
use crate::params::{build_hash, QueryParams, RouteParams};
use crate::result::NavigationResult;
use crate::subscription::Subscription;
use crate::{debug_log, info_log};
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, RouteCache};

/// Whether the current hash resolves to a configured route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteStatus {
    /// The hash matched a configured pattern
    Success,
    /// The hash matched nothing
    NotFound,
}

impl RouteStatus {
    /// `"success"` or `"notfound"`
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Success => "success",
            RouteStatus::NotFound => "notfound",
        }
    }

    /// Check if a route matched
    pub fn is_success(&self) -> bool {
        *self == RouteStatus::Success
    }
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A history entry decorated with the pattern its hash matched
///
/// Dereferences to [`HistoryEntry`].
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEntry {
    entry: HistoryEntry,
    pattern: Option<String>,
}

impl RouteEntry {
    /// Matched pattern, `None` when the hash matches no route
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Parameters bound by the matched pattern
    pub fn params(&self) -> RouteParams {
        self.pattern
            .as_deref()
            .map(|pattern| extract_params(pattern, &self.entry.hash))
            .unwrap_or_default()
    }

    /// Query parameters of the hash
    pub fn query(&self) -> QueryParams {
        extract_query(&self.entry.hash)
    }

    /// [`RouteStatus::Success`] when a pattern matched
    pub fn status(&self) -> RouteStatus {
        if self.pattern.is_some() {
            RouteStatus::Success
        } else {
            RouteStatus::NotFound
        }
    }

    /// The undecorated entry
    pub fn entry(&self) -> &HistoryEntry {
        &self.entry
    }

    /// Drop the decoration
    pub fn into_entry(self) -> HistoryEntry {
        self.entry
    }
}

impl Deref for RouteEntry {
    type Target = HistoryEntry;

    fn deref(&self) -> &Self::Target {
        &self.entry
    }
}

/// Arguments for [`Router::replace_state`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaceState {
    /// Replacement state; `None` keeps the current one when a hash is given
    pub state: Option<EntryState>,
    /// New location for the current entry
    pub hash: Option<String>,
}

impl ReplaceState {
    /// Replace only the state
    pub fn state(state: EntryState) -> Self {
        Self {
            state: Some(state),
            hash: None,
        }
    }

    /// Rewrite only the location
    pub fn hash(hash: impl Into<String>) -> Self {
        Self {
            state: None,
            hash: Some(hash.into()),
        }
    }

    /// Also replace the state
    pub fn with_state(mut self, state: EntryState) -> Self {
        self.state = Some(state);
        self
    }
}

/// Compiled configuration of a created router
struct RouteTable {
    config: RouterConfig,
    matcher: RouteMatcher,
    #[cfg(feature = "cache")]
    cache: RefCell<RouteCache>,
}

impl RouteTable {
    fn new(config: RouterConfig) -> Self {
        Self {
            matcher: RouteMatcher::new(&config.route_names),
            config,
            #[cfg(feature = "cache")]
            cache: RefCell::new(RouteCache::new()),
        }
    }

    /// Pattern matched by `hash`
    fn resolve(&self, hash: &str) -> Option<String> {
        self.position(strip_query(hash))
            .and_then(|index| self.matcher.get(index))
            .map(|pattern| pattern.as_str().to_string())
    }

    #[cfg(feature = "cache")]
    fn position(&self, path: &str) -> Option<usize> {
        let mut cache = self.cache.borrow_mut();
        if let Some(cached) = cache.get(path) {
            return cached;
        }
        let position = self.matcher.position(path);
        cache.insert(path.to_string(), position);
        position
    }

    #[cfg(not(feature = "cache"))]
    fn position(&self, path: &str) -> Option<usize> {
        self.matcher.position(path)
    }
}

type SharedTable = Rc<RefCell<Option<RouteTable>>>;

fn decorate(table: &SharedTable, entry: &HistoryEntry) -> RouteEntry {
    let pattern = table
        .borrow()
        .as_ref()
        .and_then(|table| table.resolve(&entry.hash));
    RouteEntry {
        entry: entry.clone(),
        pattern,
    }
}

/// Hash router over a [`HistoryHost`]
///
/// # Example
///
/// ```
/// use hash_navigator::{MemoryHost, Router, RouterConfig, RouteStatus};
/// use std::rc::Rc;
///
/// let host = Rc::new(MemoryHost::new("app://local/index.html"));
/// let router = Router::new(host);
///
/// let config = RouterConfig::new("home").routes(["home", "profile/:id"]);
/// let _subscription = router
///     .create(config, |entry, _previous, status| {
///         println!("{} -> {}", entry.hash, status);
///     })
///     .unwrap();
/// assert_eq!(router.current().hash, "home");
///
/// router.navigate("profile/42?tab=settings", None);
/// let current = router.current();
/// assert_eq!(current.params().get_as::<u32>("id"), Some(42));
/// assert_eq!(current.query().get("tab"), Some(&"settings".to_string()));
///
/// router.navigate("secret", None);
/// assert_eq!(router.status(), RouteStatus::NotFound);
/// assert!(!router.has_page(None));
/// ```
#[derive(Clone)]
pub struct Router {
    navigation: NavigationController,
    table: SharedTable,
}

impl Router {
    /// Create a router seeded from the host's present location.
    ///
    /// Nothing is routed until [`create`](Self::create).
    pub fn new(host: Rc<dyn HistoryHost>) -> Self {
        Self {
            navigation: NavigationController::new(host),
            table: Rc::new(RefCell::new(None)),
        }
    }

    /// Install `config`, start listening to the host and subscribe `on_change`.
    ///
    /// History restarts from a single entry for the host's present location.
    /// An empty or unroutable initial hash is rewritten in place to the home
    /// hash before `on_change` is registered, so it fires exactly once for
    /// the initial state. The correction is not published to anyone.
    ///
    /// The returned handle cancels `on_change`; dropping it does not.
    pub fn create<F>(&self, config: RouterConfig, on_change: F) -> Result<Subscription, ConfigError>
    where
        F: Fn(&RouteEntry, Option<&RouteEntry>, RouteStatus) + 'static,
    {
        config.validate()?;
        let home = config.home().to_string();
        info_log!(
            "Creating router with {} routes, home '{}'",
            config.route_names.len(),
            home
        );
        *self.table.borrow_mut() = Some(RouteTable::new(config));

        self.navigation.reset();
        let current = self.navigation.current_entry();
        if current.hash.is_empty() || !self.has_page(Some(current.hash.as_str())) {
            debug_log!("Correcting initial hash '{}' to '{}'", current.hash, home);
            self.navigation.relocate(&home);
        }
        self.navigation.attach();

        Ok(self.subscribe(on_change))
    }

    /// Observe the decorated current entry.
    ///
    /// `callback` runs once immediately, then once per distinct change.
    /// It stays registered until the handle is cancelled or the router is
    /// destroyed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&RouteEntry, Option<&RouteEntry>, RouteStatus) + 'static,
    {
        let table = self.table.clone();
        self.navigation.subscribe(move |entry, previous| {
            let current = decorate(&table, entry);
            let previous = previous.map(|entry| decorate(&table, entry));
            callback(&current, previous.as_ref(), current.status());
        })
    }

    /// Navigate to `hash`, optionally carrying `state`
    pub fn navigate(&self, hash: &str, state: Option<EntryState>) -> NavigationResult {
        self.navigation.navigate(hash, NavigateOptions { state })
    }

    /// Go one entry back.
    ///
    /// At the start of the history the host is still asked to go back and
    /// [`NavigationError::NoAdjacentEntry`] is returned.
    pub fn back(&self) -> Result<NavigationResult, NavigationError> {
        self.navigation.back()
    }

    /// Go one entry forward
    pub fn forward(&self) -> Result<NavigationResult, NavigationError> {
        self.navigation.forward()
    }

    /// Move to the entry with `key`
    pub fn traverse_to(
        &self,
        key: &str,
        state: Option<EntryState>,
    ) -> Result<NavigationResult, NavigationError> {
        self.navigation.traverse_to(key, TraverseOptions { state })
    }

    /// Re-materialize the current entry, optionally with new state
    pub fn reload(&self, state: Option<EntryState>) -> NavigationResult {
        self.navigation.reload(ReloadOptions { state })
    }

    /// Rewrite the current entry in place.
    ///
    /// With a hash the location changes without a new entry; with only state
    /// the state is replaced.
    pub fn replace_state(&self, replace: ReplaceState) -> NavigationResult {
        match (replace.hash, replace.state) {
            (Some(hash), state) => self.navigation.update_current_entry_hash(&hash, state),
            (None, Some(state)) => self.navigation.update_current_entry(state),
            (None, None) => {
                let state = self.navigation.current_entry().state;
                self.navigation.update_current_entry(state)
            }
        }
    }

    /// Decorated current entry
    pub fn current(&self) -> RouteEntry {
        decorate(&self.table, &self.navigation.current_entry())
    }

    /// Status of the current entry
    pub fn status(&self) -> RouteStatus {
        self.current().status()
    }

    /// Whether `hash` (or the current hash) matches a configured route.
    ///
    /// A leading `#` is ignored.
    pub fn has_page(&self, hash: Option<&str>) -> bool {
        let hash = match hash {
            Some(hash) => normalize_hash(hash).to_string(),
            None => self.navigation.current_entry().hash,
        };
        self.table
            .borrow()
            .as_ref()
            .is_some_and(|table| table.resolve(&hash).is_some())
    }

    /// Build a hash for `pattern`
    pub fn url_for(&self, pattern: &str, params: &RouteParams, query: &QueryParams) -> String {
        build_hash(pattern, params, query)
    }

    /// Every entry, oldest first
    pub fn entries(&self) -> Vec<RouteEntry> {
        self.navigation
            .entries()
            .iter()
            .map(|entry| decorate(&self.table, entry))
            .collect()
    }

    /// Check if can go back
    pub fn can_go_back(&self) -> bool {
        self.navigation.can_go_back()
    }

    /// Check if can go forward
    pub fn can_go_forward(&self) -> bool {
        self.navigation.can_go_forward()
    }

    /// Installed configuration
    pub fn config(&self) -> Option<RouterConfig> {
        self.table.borrow().as_ref().map(|table| table.config.clone())
    }

    /// Whether [`create`](Self::create) ran and [`destroy`](Self::destroy) has not
    pub fn is_created(&self) -> bool {
        self.table.borrow().is_some()
    }

    /// The underlying navigation
    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    /// Tear down: detach from the host, cancel every subscription, drop the
    /// route table and reset history to the host's present location
    pub fn destroy(&self) {
        #[cfg(feature = "cache")]
        if let Some(table) = self.table.borrow().as_ref() {
            table.cache.borrow_mut().clear();
        }
        self.table.borrow_mut().take();
        self.navigation.destroy();
        info_log!("Router destroyed");
    }

    /// Resolution cache statistics
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.table
            .borrow()
            .as_ref()
            .map(|table| table.cache.borrow().stats().clone())
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("navigation", &self.navigation)
            .field("created", &self.is_created())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use serde_json::json;
    use std::cell::Cell;

    const BASE: &str = "app://local/index.html";

    fn config() -> RouterConfig {
        RouterConfig::new("home").routes(["home", "about", "profile/:id", "item/:name/info/:id"])
    }

    fn setup(url: &str) -> (Rc<MemoryHost>, Router) {
        let host = Rc::new(MemoryHost::new(url));
        let router = Router::new(host.clone());
        (host, router)
    }

    #[test]
    fn test_create_seeds_home_without_fragment() {
        let (host, router) = setup(BASE);
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();

        let _sub = router
            .create(config(), move |entry, previous, status| {
                assert_eq!(entry.hash, "home");
                assert!(previous.is_none());
                assert_eq!(status, RouteStatus::Success);
                c.set(c.get() + 1);
            })
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(router.entries().len(), 1);
        assert_eq!(host.location(), format!("{BASE}#home"));
        assert_eq!(host.native_len(), 1);
    }

    #[test]
    fn test_create_corrects_unroutable_hash() {
        let (host, router) = setup(&format!("{BASE}#nowhere"));
        let _sub = router.create(config(), |_, _, _| {}).unwrap();

        assert_eq!(router.current().hash, "home");
        assert_eq!(host.native_len(), 1);
    }

    #[test]
    fn test_create_keeps_routable_hash() {
        let (_host, router) = setup(&format!("{BASE}#profile/7"));
        let _sub = router.create(config(), |_, _, _| {}).unwrap();

        let current = router.current();
        assert_eq!(current.pattern(), Some("profile/:id"));
        assert_eq!(current.params().get("id"), Some(&"7".to_string()));
    }

    #[test]
    fn test_create_rejects_invalid_config() {
        let (host, router) = setup(BASE);
        let result = router.create(RouterConfig::new("start").route("home"), |_, _, _| {});

        assert!(matches!(result, Err(ConfigError::HomeNotRoutable { .. })));
        assert!(!router.is_created());
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn test_navigate_unknown_route_reports_notfound() {
        let (_host, router) = setup(BASE);
        let statuses = Rc::new(RefCell::new(Vec::new()));
        let s = statuses.clone();
        let _sub = router
            .create(config(), move |_, _, status| s.borrow_mut().push(status))
            .unwrap();

        router.navigate("secret", None);
        assert_eq!(
            *statuses.borrow(),
            vec![RouteStatus::Success, RouteStatus::NotFound]
        );
        assert!(!router.has_page(None));
        assert!(router.has_page(Some("#about")));
        assert_eq!(router.current().pattern(), None);
        assert!(router.current().params().is_empty());
    }

    #[test]
    fn test_previous_entry_is_decorated() {
        let (_host, router) = setup(BASE);
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        let _sub = router
            .create(config(), move |_, previous, _| {
                *s.borrow_mut() = previous.and_then(|p| p.pattern().map(str::to_string));
            })
            .unwrap();

        router.navigate("profile/1", None);
        assert_eq!(seen.borrow().as_deref(), Some("home"));
    }

    #[test]
    fn test_replace_state() {
        let (host, router) = setup(BASE);
        let _sub = router.create(config(), |_, _, _| {}).unwrap();
        let key = router.current().key.clone();

        let state = json!({"draft": true}).as_object().cloned().unwrap();
        router.replace_state(ReplaceState::state(state));
        assert_eq!(router.current().state["draft"], true);

        router.replace_state(ReplaceState::hash("#about"));
        assert_eq!(router.current().hash, "about");
        assert_eq!(router.current().key, key);
        assert_eq!(router.entries().len(), 1);
        assert_eq!(host.native_len(), 1);
    }

    #[test]
    fn test_url_for() {
        let (_host, router) = setup(BASE);
        let mut params = RouteParams::new();
        params.insert("name".to_string(), "metric".to_string());
        params.insert("id".to_string(), "222".to_string());

        let hash = router.url_for("item/:name/info/:id", &params, &QueryParams::new());
        assert_eq!(hash, "item/metric/info/222");
    }

    #[test]
    fn test_destroy_then_create_again() {
        let (host, router) = setup(BASE);
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let _sub = router
            .create(config(), move |_, _, _| c.set(c.get() + 1))
            .unwrap();
        router.navigate("about", None);

        router.destroy();
        assert!(!router.is_created());
        assert_eq!(host.listener_count(), 0);
        assert_eq!(router.entries().len(), 1);
        assert_eq!(router.current().hash, "about");

        router.navigate("profile/3", None);
        assert_eq!(calls.get(), 2);

        let _sub = router.create(config(), |_, _, _| {}).unwrap();
        assert_eq!(host.listener_count(), 1);
        assert_eq!(router.current().pattern(), Some("profile/:id"));
    }

    #[cfg(feature = "cache")]
    #[test]
    fn test_resolution_is_cached() {
        let (_host, router) = setup(BASE);
        let _sub = router.create(config(), |_, _, _| {}).unwrap();

        router.has_page(Some("profile/1?tab=a"));
        router.has_page(Some("profile/1?tab=b"));

        let stats = router.cache_stats().unwrap();
        assert!(stats.hits >= 1);
    }
}
