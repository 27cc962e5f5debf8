//! Route parameter extraction and query string parsing
//!
//! This module provides types for working with values bound by route patterns
//! (like `:id`) and flat query strings (like `?tab=settings&compact`).

use std::collections::HashMap;

/// Route parameters extracted from path segments
///
/// # Example
///
/// ```
/// use hash_navigator::RouteParams;
///
/// // Route pattern: users/:id
/// // Matched path: users/123
/// let mut params = RouteParams::new();
/// params.insert("id".to_string(), "123".to_string());
///
/// assert_eq!(params.get("id"), Some(&"123".to_string()));
/// assert_eq!(params.get_as::<i32>("id"), Some(123));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: HashMap<String, String>,
}

impl RouteParams {
    /// Create new empty route params
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from hashmap
    pub fn from_map(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    /// Get a parameter value as a string
    pub fn get(&self, key: &str) -> Option<&String> {
        self.params.get(key)
    }

    /// Get a parameter and parse it as a specific type
    ///
    /// Returns `None` if the parameter doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.parse().ok()
    }

    /// Insert a parameter
    pub fn insert(&mut self, key: String, value: String) {
        self.params.insert(key, value);
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Get all parameters as a reference to the HashMap
    pub fn all(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Iterate over all parameters
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.params.iter()
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Flat query parameters parsed from the part of a hash after `?`
///
/// A key without `=` maps to an empty string; a repeated key keeps its last
/// value. Keys and values are percent-decoded.
///
/// # Example
///
/// ```
/// use hash_navigator::QueryParams;
///
/// let query = QueryParams::from_query_string("page=1&sort=name&compact");
///
/// assert_eq!(query.get("page"), Some(&"1".to_string()));
/// assert_eq!(query.get_as::<i32>("page"), Some(1));
/// assert_eq!(query.get("compact"), Some(&String::new()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: HashMap<String, String>,
}

impl QueryParams {
    /// Create new empty query params
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from query string (without the leading `?`)
    pub fn from_query_string(query: &str) -> Self {
        let mut params = HashMap::new();

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.insert(decode_uri_component(key), decode_uri_component(value));
        }

        Self { params }
    }

    /// Get a parameter value
    pub fn get(&self, key: &str) -> Option<&String> {
        self.params.get(key)
    }

    /// Get parameter as a specific type
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Insert a parameter, replacing any previous value
    pub fn insert(&mut self, key: String, value: String) {
        self.params.insert(key, value);
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Get all parameters as a reference to the HashMap
    pub fn all(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Convert to query string, keys sorted for a stable result
    ///
    /// # Example
    ///
    /// ```
    /// use hash_navigator::QueryParams;
    ///
    /// let mut query = QueryParams::new();
    /// query.insert("q".to_string(), "a b".to_string());
    /// query.insert("page".to_string(), "1".to_string());
    /// assert_eq!(query.to_query_string(), "page=1&q=a%20b");
    /// ```
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&String, &String)> = self.params.iter().collect();
        pairs.sort();

        pairs
            .into_iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    encode_uri_component(key),
                    encode_uri_component(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

/// Build a hash from `pattern`, substituting `:name` segments from `params`
/// and appending `query` when it is not empty.
///
/// Segments whose parameter is missing are left as written.
///
/// ```
/// use hash_navigator::{build_hash, QueryParams, RouteParams};
///
/// let mut params = RouteParams::new();
/// params.insert("id".to_string(), "42".to_string());
/// let mut query = QueryParams::new();
/// query.insert("tab".to_string(), "settings".to_string());
///
/// assert_eq!(build_hash("profile/:id", &params, &query), "profile/42?tab=settings");
/// ```
pub fn build_hash(pattern: &str, params: &RouteParams, query: &QueryParams) -> String {
    let path = pattern
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => params
                .get(name)
                .map_or_else(|| segment.to_string(), |value| encode_uri_component(value)),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/");

    if query.is_empty() {
        path
    } else {
        format!("{}?{}", path, query.to_query_string())
    }
}

/// URI component encoding, unreserved characters pass through
fn encode_uri_component(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(char::from(byte));
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// URI component decoding.
///
/// Malformed escapes are kept verbatim; invalid UTF-8 is replaced lossily.
fn decode_uri_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(high), Some(low)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                decoded.push(high << 4 | low);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    char::from(byte)
        .to_digit(16)
        .and_then(|digit| u8::try_from(digit).ok())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_params_basic() {
        let mut params = RouteParams::new();
        params.insert("id".to_string(), "123".to_string());

        assert_eq!(params.get("id"), Some(&"123".to_string()));
        assert!(params.contains("id"));
        assert!(!params.contains("missing"));
    }

    #[test]
    fn test_route_params_get_as() {
        let mut params = RouteParams::new();
        params.insert("id".to_string(), "123".to_string());
        params.insert("active".to_string(), "true".to_string());

        assert_eq!(params.get_as::<i32>("id"), Some(123));
        assert_eq!(params.get_as::<bool>("active"), Some(true));
        assert_eq!(params.get_as::<i32>("missing"), None);
    }

    #[test]
    fn test_query_params_basic() {
        let query = QueryParams::from_query_string("page=1&sort=name&filter=active");

        assert_eq!(query.get("page"), Some(&"1".to_string()));
        assert_eq!(query.get("sort"), Some(&"name".to_string()));
        assert_eq!(query.get("missing"), None);
        assert_eq!(query.len(), 3);
    }

    #[test]
    fn test_query_key_without_value() {
        let query = QueryParams::from_query_string("compact&x=");
        assert_eq!(query.get("compact"), Some(&String::new()));
        assert_eq!(query.get("x"), Some(&String::new()));
    }

    #[test]
    fn test_query_last_value_wins() {
        let query = QueryParams::from_query_string("tag=rust&tag=web");
        assert_eq!(query.get("tag"), Some(&"web".to_string()));
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn test_empty_query_string() {
        assert!(QueryParams::from_query_string("").is_empty());
        assert!(QueryParams::from_query_string("&&").is_empty());
    }

    #[test]
    fn test_uri_decoding() {
        assert_eq!(decode_uri_component("hello%20world"), "hello world");
        assert_eq!(decode_uri_component("caf%C3%A9"), "café");
        assert_eq!(decode_uri_component("a+b"), "a+b");
        assert_eq!(decode_uri_component("100%"), "100%");
        assert_eq!(decode_uri_component("%zz1"), "%zz1");
    }

    #[test]
    fn test_uri_encoding() {
        assert_eq!(encode_uri_component("hello world"), "hello%20world");
        assert_eq!(encode_uri_component("café"), "caf%C3%A9");
        assert!(encode_uri_component("test@example.com").contains("%40"));
    }

    #[test]
    fn test_build_hash_without_query() {
        let mut params = RouteParams::new();
        params.insert("category".to_string(), "tools".to_string());

        let hash = build_hash("products/:category/:id", &params, &QueryParams::new());
        assert_eq!(hash, "products/tools/:id");
    }
}
