//! History entries and URL/fragment helpers
//!
//! A [`HistoryEntry`] is one visited location. Its `hash` is always derived from
//! its `url` through [`hash_from_url`], and every mutation that touches the URL
//! goes through [`EntryUpdate`] so the two can never disagree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Application data attached to a history entry.
///
/// Round-trips unchanged through the host's native state slot. Compared
/// structurally when deciding whether a navigation changes anything.
pub type EntryState = Map<String, Value>;

/// One recorded visited location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Fully resolved location (base + `#` + fragment)
    pub url: String,
    /// Routable path taken from the fragment, without the leading `#`
    pub hash: String,
    /// Stable handle used for traversal
    pub key: String,
    /// Identity of this particular materialization of the entry
    pub id: String,
    /// Position the entry occupied when it was created
    pub index: usize,
    /// Application state
    #[serde(default)]
    pub state: EntryState,
    /// Always `true`, full-document navigations are not modeled
    pub same_document: bool,
}

impl HistoryEntry {
    /// Create an entry with a fresh key and id
    pub fn new(url: impl Into<String>, index: usize, state: EntryState) -> Self {
        let url = url.into();
        let hash = hash_from_url(&url).to_string();
        Self {
            url,
            hash,
            key: new_identifier(),
            id: new_identifier(),
            index,
            state,
            same_document: true,
        }
    }

    /// Look up a single state value
    pub fn state_value(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }
}

/// Partial update merged into an existing entry.
///
/// `url` and `hash` are always replaced together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryUpdate {
    /// New location; the hash is re-derived from it
    pub url: Option<String>,
    /// Replacement state
    pub state: Option<EntryState>,
    /// Issue a new `id` while keeping the `key`
    pub renew_id: bool,
}

impl EntryUpdate {
    /// Update carrying only state
    pub fn state(state: EntryState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// Update carrying only a new location
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Also replace the state
    pub fn with_state(mut self, state: Option<EntryState>) -> Self {
        self.state = state;
        self
    }

    /// Also renew the entry id
    pub fn renewing_id(mut self) -> Self {
        self.renew_id = true;
        self
    }

    /// Merge into `entry`, returning whether anything changed
    pub fn apply_to(self, entry: &mut HistoryEntry) -> bool {
        let mut changed = false;

        if let Some(url) = self.url {
            if url != entry.url {
                entry.hash = hash_from_url(&url).to_string();
                entry.url = url;
                changed = true;
            }
        }

        if let Some(state) = self.state {
            if state != entry.state {
                entry.state = state;
                changed = true;
            }
        }

        if self.renew_id {
            entry.id = new_identifier();
            changed = true;
        }

        changed
    }
}

/// Fragment of `url` without its `#`, or `""` when there is none.
///
/// ```
/// use hash_navigator::hash_from_url;
///
/// assert_eq!(hash_from_url("app://local/#profile/1?tab=a"), "profile/1?tab=a");
/// assert_eq!(hash_from_url("app://local/"), "");
/// ```
pub fn hash_from_url(url: &str) -> &str {
    url.split_once('#').map_or("", |(_, hash)| hash)
}

/// Location without its fragment
pub fn base_url(url: &str) -> &str {
    url.split_once('#').map_or(url, |(base, _)| base)
}

/// Strip a leading `#` from a user supplied hash
pub fn normalize_hash(hash: &str) -> &str {
    hash.strip_prefix('#').unwrap_or(hash)
}

/// Resolve `hash` against `current_url`, producing a full location.
///
/// ```
/// use hash_navigator::resolve_hash;
///
/// assert_eq!(resolve_hash("app://local/#home", "#about"), "app://local/#about");
/// assert_eq!(resolve_hash("app://local/", "users/1"), "app://local/#users/1");
/// ```
pub fn resolve_hash(current_url: &str, hash: &str) -> String {
    let base = base_url(current_url);
    let hash = normalize_hash(hash);
    if hash.is_empty() {
        base.to_string()
    } else {
        format!("{base}#{hash}")
    }
}

fn new_identifier() -> String {
    Uuid::new_v4().to_string()
}
