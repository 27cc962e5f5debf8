//! Error types
//!
//! Nothing here is fatal. Navigation errors are the "no-op" signals of a
//! traversal that could not happen locally; configuration errors are raised
//! before a router touches any state.

use crate::TraverseDirection;
use thiserror::Error;

/// A traversal that left the session history untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// No entry carries this key
    #[error("no history entry with key '{key}'")]
    UnknownKey { key: String },

    /// Already at the start or end of the history
    #[error("no history entry {direction} the current one")]
    NoAdjacentEntry { direction: TraverseDirection },
}

impl NavigationError {
    /// Check if the key was unknown
    pub fn is_unknown_key(&self) -> bool {
        matches!(self, NavigationError::UnknownKey { .. })
    }

    /// Check if a history boundary was hit
    pub fn is_boundary(&self) -> bool {
        matches!(self, NavigationError::NoAdjacentEntry { .. })
    }
}

/// Invalid router configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The home hash is empty
    #[error("home hash must not be empty")]
    EmptyHome,

    /// The home hash matches none of the configured patterns
    #[error("home hash '{home}' does not match any configured route")]
    HomeNotRoutable { home: String },

    /// A route pattern failed validation
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Configuration could not be decoded
    #[error("failed to parse router configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
