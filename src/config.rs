//! Router configuration
//!
//! An ordered list of route patterns plus the home hash used as the fallback
//! destination. Can be built in code or decoded from JSON.

use crate::entry::normalize_hash;
use crate::error::ConfigError;
use crate::matcher::match_route;
use serde::Deserialize;
use std::collections::HashSet;

/// Routes known to a [`Router`](crate::Router)
///
/// # Example
///
/// ```
/// use hash_navigator::RouterConfig;
///
/// let config = RouterConfig::new("home")
///     .route("home")
///     .route("profile/:id");
/// assert!(config.validate().is_ok());
///
/// let config = RouterConfig::from_json(r#"{"homeHash": "home", "routeNames": ["home", "about"]}"#).unwrap();
/// assert_eq!(config.route_names, ["home", "about"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouterConfig {
    /// Destination for an empty or unroutable initial fragment
    #[serde(alias = "homeHash")]
    pub home_hash: String,
    /// Patterns in priority order
    #[serde(alias = "routeNames", default)]
    pub route_names: Vec<String>,
}

impl RouterConfig {
    /// Configuration with `home` as fallback and no routes yet
    pub fn new(home: impl Into<String>) -> Self {
        Self {
            home_hash: home.into(),
            route_names: Vec::new(),
        }
    }

    /// Append a route pattern
    pub fn route(mut self, pattern: impl Into<String>) -> Self {
        self.route_names.push(pattern.into());
        self
    }

    /// Append several route patterns
    pub fn routes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.route_names.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Decode from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Home hash without a leading `#`
    pub fn home(&self) -> &str {
        normalize_hash(&self.home_hash)
    }

    /// Check patterns and make sure the home hash is routable
    pub fn validate(&self) -> Result<(), ConfigError> {
        for pattern in &self.route_names {
            validate_route_pattern(pattern).map_err(|reason| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                reason,
            })?;
        }

        let home = self.home();
        if home.is_empty() {
            return Err(ConfigError::EmptyHome);
        }
        if match_route(&self.route_names, home).is_none() {
            return Err(ConfigError::HomeNotRoutable {
                home: home.to_string(),
            });
        }

        Ok(())
    }
}

/// Validate a route pattern
///
/// # Validation Rules
///
/// - Must not be empty
/// - No consecutive slashes (`//`)
/// - No leading or trailing slash, so every segment is non-empty
/// - Parameter names must be non-empty, alphanumeric or `_`
/// - No duplicate parameter names
/// - No query string
pub fn validate_route_pattern(pattern: &str) -> Result<(), String> {
    let pattern = normalize_hash(pattern);
    if pattern.is_empty() {
        return Err("Route pattern cannot be empty".to_string());
    }

    if pattern.contains("//") {
        return Err("Route pattern cannot contain consecutive slashes".to_string());
    }

    if pattern.starts_with('/') || pattern.ends_with('/') {
        return Err("Route pattern cannot start or end with a slash".to_string());
    }

    if pattern.contains('?') {
        return Err("Route pattern cannot contain a query string".to_string());
    }

    let mut param_names = HashSet::new();
    for segment in pattern.split('/') {
        if let Some(param) = segment.strip_prefix(':') {
            if param.is_empty() {
                return Err("Route parameter name cannot be empty".to_string());
            }

            if !param.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(format!(
                    "Route parameter '{}' must contain only alphanumeric characters and underscores",
                    param
                ));
            }

            if !param_names.insert(param) {
                return Err(format!("Duplicate route parameter: '{}'", param));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = RouterConfig::new("#home").routes(["home", "about"]).route("users/:id");
        assert_eq!(config.home(), "home");
        assert_eq!(config.route_names.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_home_must_be_routable() {
        let config = RouterConfig::new("start").routes(["home", "about"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::HomeNotRoutable { home }) if home == "start"
        ));
    }

    #[test]
    fn test_empty_home() {
        let config = RouterConfig::new("#").route("home");
        assert!(matches!(config.validate(), Err(ConfigError::EmptyHome)));
    }

    #[test]
    fn test_invalid_pattern_reported() {
        let config = RouterConfig::new("home").routes(["home", "users/:id/:id"]);
        match config.validate() {
            Err(ConfigError::InvalidPattern { pattern, reason }) => {
                assert_eq!(pattern, "users/:id/:id");
                assert!(reason.contains("Duplicate"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_route_pattern() {
        assert!(validate_route_pattern("users/:id").is_ok());
        assert!(validate_route_pattern("products/:category/:id").is_ok());
        assert!(validate_route_pattern("").is_err());
        assert!(validate_route_pattern("a//b").is_err());
        assert!(validate_route_pattern("a/:").is_err());
        assert!(validate_route_pattern("a/:na-me").is_err());
        assert!(validate_route_pattern("a?x=1").is_err());
    }

    #[test]
    fn test_empty_segments_rejected() {
        assert!(validate_route_pattern("/").is_err());
        assert!(validate_route_pattern("users/").is_err());
        assert!(validate_route_pattern("/users").is_err());
        assert!(validate_route_pattern("#users/:id").is_ok());

        let config = RouterConfig::new("home").routes(["home", "users/"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPattern { pattern, .. }) if pattern == "users/"
        ));
    }

    #[test]
    fn test_from_json() {
        let config =
            RouterConfig::from_json(r#"{"home_hash": "home", "route_names": ["home"]}"#).unwrap();
        assert_eq!(config, RouterConfig::new("home").route("home"));

        assert!(matches!(
            RouterConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
