//! # Hash Navigator
//!
//! Session-history navigation and hash routing for single-page applications:
//!
//! - **Session History** - Ordered entries with keys, ids and per-entry state
//! - **Navigation** - Navigate, back, forward, traverse, reload, in-place updates
//! - **Reconciliation** - Host-originated changes (native back, manual edits) folded back into the model
//! - **Subscriptions** - Deterministic initial call, then one call per distinct change
//! - **Route Matching** - Static and `:name` segments, first match wins, query parsing
//!
//! # Quick Start
//!
//! ```
//! use hash_navigator::{MemoryHost, Router, RouterConfig};
//! use std::rc::Rc;
//!
//! let host = Rc::new(MemoryHost::new("app://local/index.html"));
//! let router = Router::new(host);
//!
//! let config = RouterConfig::new("home").routes(["home", "about", "profile/:id"]);
//! let _subscription = router
//!     .create(config, |entry, previous, status| {
//!         let from = previous.map(|p| p.hash.as_str()).unwrap_or("-");
//!         println!("{} -> {} ({})", from, entry.hash, status);
//!     })
//!     .unwrap();
//!
//! router.navigate("profile/7", None);
//! assert_eq!(router.current().params().get("id"), Some(&"7".to_string()));
//!
//! router.back().unwrap();
//! assert_eq!(router.current().hash, "home");
//! ```
//!
//! # Navigation
//!
//! [`NavigationController`] is usable on its own when no route table is needed:
//!
//! ```
//! use hash_navigator::{MemoryHost, NavigateOptions, NavigationController, NavigationType};
//! use std::rc::Rc;
//!
//! let host = Rc::new(MemoryHost::new("app://local/index.html#a"));
//! let navigation = NavigationController::new(host.clone());
//! navigation.attach();
//!
//! let result = navigation.navigate("b", NavigateOptions::default());
//! assert_eq!(result.kind(), NavigationType::Push);
//!
//! // The user presses the native back button
//! host.user_back();
//! host.flush();
//! assert_eq!(navigation.current_entry().hash, "a");
//! assert!(navigation.can_go_forward());
//! ```
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - LRU cache of resolved route patterns

#![doc(html_root_url = "https://docs.rs/hash-navigator/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Session history
pub mod entry;
pub mod history;

// Navigation
pub mod bridge;
pub mod controller;
pub mod host;
pub mod result;

// Change notification
pub mod observable;
pub mod subscription;

// Routing
pub mod config;
pub mod matcher;
pub mod params;
pub mod router;

// Error handling
pub mod error;

// Re-export main types for convenient access
pub use bridge::Reconciliation;
#[cfg(feature = "cache")]
pub use cache::{CacheStats, RouteCache};
pub use config::{validate_route_pattern, RouterConfig};
pub use controller::{NavigateOptions, NavigationController, ReloadOptions, TraverseOptions};
pub use entry::{
    base_url, hash_from_url, normalize_hash, resolve_hash, EntryState, EntryUpdate, HistoryEntry,
};
pub use error::{ConfigError, NavigationError};
pub use history::SessionHistory;
pub use host::{HashChangeListener, HistoryHost, HostOp, ListenerId, MemoryHost};
pub use matcher::{
    extract_params, extract_query, match_route, strip_query, RouteMatcher, RoutePattern, Segment,
};
pub use observable::{Change, Observable};
pub use params::{build_hash, QueryParams, RouteParams};
pub use result::{NavigationResult, NavigationType};
pub use router::{ReplaceState, RouteEntry, RouteStatus, Router};
pub use subscription::{Subscription, SubscriptionHub};

use std::fmt;

/// Route path matching result.
///
/// Contains the matched path along with the pattern it matched and any
/// extracted parameters and query strings.
///
/// # Example
///
/// ```
/// use hash_navigator::RouteMatch;
///
/// let route_match = RouteMatch::new("users/123".to_string(), "users/:id".to_string())
///     .with_param("id".to_string(), "123".to_string());
///
/// assert_eq!(route_match.params.get("id"), Some(&"123".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// The matched path, query included
    pub path: String,
    /// The pattern that matched
    pub pattern: String,
    /// Extracted route parameters (e.g., `:id` -> "123")
    pub params: RouteParams,
    /// Parsed query string parameters
    pub query: QueryParams,
}

impl RouteMatch {
    /// Create a new route match with the given path and pattern.
    #[must_use]
    pub fn new(path: String, pattern: String) -> Self {
        Self {
            path,
            pattern,
            params: RouteParams::new(),
            query: QueryParams::new(),
        }
    }

    /// Add a route parameter to the match.
    #[must_use]
    pub fn with_param(mut self, key: String, value: String) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Add a query parameter to the match.
    #[must_use]
    pub fn with_query(mut self, key: String, value: String) -> Self {
        self.query.insert(key, value);
        self
    }
}

/// Direction of a single-step traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraverseDirection {
    /// Towards older entries
    Back,
    /// Towards newer entries
    Forward,
}

impl fmt::Display for TraverseDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TraverseDirection::Back => "before",
            TraverseDirection::Forward => "after",
        })
    }
}
