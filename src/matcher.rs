//! Route pattern matching
//!
//! Patterns are `/`-separated segments; a segment starting with `:` binds a
//! named parameter, every other segment must match literally. A pattern only
//! matches a path with exactly the same number of segments. When several
//! patterns match, the first one in the supplied order wins, so callers list
//! patterns in priority order.
//!
//! A leading `#` is ignored and anything after the first `?` is the query
//! string. Every `/` counts, so `users//5` and `profile/` carry an empty
//! segment that no parameter and no non-empty static segment accepts.

use crate::entry::normalize_hash;
use crate::params::{QueryParams, RouteParams};

/// A single segment in a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Static text that must match exactly
    Static(String),
    /// Parameter that captures any non-empty segment
    Param(String),
}

impl Segment {
    /// Parse a segment from string
    ///
    /// Examples:
    /// - "users" -> Static("users")
    /// - ":id" -> Param("id")
    pub fn parse(s: &str) -> Self {
        match s.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Static(s.to_string()),
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Segment::Static(expected) => expected == value,
            Segment::Param(_) => !value.is_empty(),
        }
    }
}

/// A compiled route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile a pattern such as `products/:category/:id`
    pub fn from_path(pattern: &str) -> Self {
        Self {
            source: pattern.to_string(),
            segments: path_segments(pattern).map(Segment::parse).collect(),
        }
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Pattern segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of the parameters, in order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Check whether `path` matches, ignoring its query string
    pub fn is_match(&self, path: &str) -> bool {
        let values: Vec<&str> = path_segments(path).collect();
        values.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(&values)
                .all(|(segment, value)| segment.matches(value))
    }

    /// Match `path` and extract its parameters
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        self.is_match(path).then(|| self.extract(path))
    }

    /// Bind every parameter to the aligned segment of `path`.
    ///
    /// Static segments are not compared. A segment count mismatch yields no
    /// parameters at all.
    pub fn extract(&self, path: &str) -> RouteParams {
        let values: Vec<&str> = path_segments(path).collect();
        let mut params = RouteParams::new();
        if values.len() != self.segments.len() {
            return params;
        }

        for (segment, value) in self.segments.iter().zip(values) {
            if let Segment::Param(name) = segment {
                params.insert(name.clone(), value.to_string());
            }
        }
        params
    }
}

/// Ordered set of compiled patterns
#[derive(Debug, Clone, Default)]
pub struct RouteMatcher {
    patterns: Vec<RoutePattern>,
}

impl RouteMatcher {
    /// Compile `patterns`, keeping their order
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| RoutePattern::from_path(p.as_ref()))
                .collect(),
        }
    }

    /// Position of the first pattern matching `path`
    pub fn position(&self, path: &str) -> Option<usize> {
        self.patterns.iter().position(|p| p.is_match(path))
    }

    /// First pattern matching `path`
    pub fn find(&self, path: &str) -> Option<&RoutePattern> {
        self.position(path).map(|index| &self.patterns[index])
    }

    /// Pattern at `index`
    pub fn get(&self, index: usize) -> Option<&RoutePattern> {
        self.patterns.get(index)
    }

    /// Match `path` and collect pattern, parameters and query
    pub fn resolve(&self, path: &str) -> Option<crate::RouteMatch> {
        let pattern = self.find(path)?;
        Some(crate::RouteMatch {
            path: normalize_hash(path).to_string(),
            pattern: pattern.as_str().to_string(),
            params: pattern.extract(path),
            query: extract_query(path),
        })
    }

    /// Compiled patterns
    pub fn patterns(&self) -> &[RoutePattern] {
        &self.patterns
    }

    /// Number of patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if there are no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// First of `patterns` matching `path`
///
/// ```
/// use hash_navigator::match_route;
///
/// let patterns = ["home", "profile/:id", "item/:name/info/:id"];
/// assert_eq!(match_route(&patterns, "item/metric/info/222"), Some("item/:name/info/:id"));
/// assert_eq!(match_route(&patterns, "item/metric"), None);
/// ```
pub fn match_route<'a, S: AsRef<str>>(patterns: &'a [S], path: &str) -> Option<&'a str> {
    patterns
        .iter()
        .map(|pattern| pattern.as_ref())
        .find(|pattern| RoutePattern::from_path(pattern).is_match(path))
}

/// Parameters of `path` aligned against `pattern`
///
/// ```
/// use hash_navigator::extract_params;
///
/// let params = extract_params("profile/:id", "profile/222?tab=settings");
/// assert_eq!(params.get("id"), Some(&"222".to_string()));
/// ```
pub fn extract_params(pattern: &str, path: &str) -> RouteParams {
    RoutePattern::from_path(pattern).extract(path)
}

/// Query parameters of `path`
pub fn extract_query(path: &str) -> QueryParams {
    path.split_once('?')
        .map(|(_, query)| QueryParams::from_query_string(query))
        .unwrap_or_default()
}

/// Part of `path` before the query string, without a leading `#`
pub fn strip_query(path: &str) -> &str {
    let path = normalize_hash(path);
    path.split_once('?').map_or(path, |(before, _)| before)
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    strip_query(path).split('/')
}
