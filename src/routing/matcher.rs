//! Path prefix matching.
//!
//! # Design Decisions
//! - A path matches when it starts with `<prefix>/`; the bare prefix does not
//! - Matching is case-sensitive and looks at the path only, never the query
//! - No regex, no normalisation: the raw request-target is compared as sent

/// Matches and strips a fixed path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a matcher. A trailing `/` on `prefix` is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        while prefix.ends_with('/') {
            prefix.pop();
        }
        Self { prefix }
    }

    /// Returns true if `path` lies under the prefix.
    pub fn matches(&self, path: &str) -> bool {
        path.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Strip the prefix from a path-and-query, once.
    ///
    /// Returns `None` when the path does not match. The remainder keeps its
    /// leading `/` and any query string byte for byte.
    pub fn strip<'a>(&self, path_and_query: &'a str) -> Option<&'a str> {
        let path = path_and_query
            .split_once('?')
            .map_or(path_and_query, |(path, _)| path);
        if !self.matches(path) {
            return None;
        }
        path_and_query.get(self.prefix.len()..)
    }
}
