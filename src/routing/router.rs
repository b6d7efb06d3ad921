//! Target URL construction.
//!
//! # Responsibilities
//! - Decide whether a request belongs to the proxied API
//! - Build the absolute upstream URL for it
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - The origin comes from configuration only; callers control the suffix
//! - Explicit `None` rather than a silent default route

use axum::http::Uri;

use crate::config::UpstreamConfig;
use crate::routing::matcher::PathPrefixMatcher;

/// The single route this proxy serves: `<prefix>/...` → `<origin>/...`.
#[derive(Debug, Clone)]
pub struct UpstreamRoute {
    matcher: PathPrefixMatcher,
    origin: String,
}

impl UpstreamRoute {
    pub fn new(origin: impl Into<String>, prefix: impl Into<String>) -> Self {
        let mut origin = origin.into();
        while origin.ends_with('/') {
            origin.pop();
        }
        Self {
            matcher: PathPrefixMatcher::new(prefix),
            origin,
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self::new(config.origin.clone(), config.path_prefix.clone())
    }

    /// Absolute upstream URL for `uri`, or `None` if the path is not ours.
    pub fn target_url(&self, uri: &Uri) -> Option<String> {
        let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());
        self.matcher
            .strip(path_and_query)
            .map(|rest| format!("{}{}", self.origin, rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> UpstreamRoute {
        UpstreamRoute::from_config(&UpstreamConfig::default())
    }

    #[test]
    fn rewrites_onto_origin() {
        let uri: Uri = "/api/dashscope/v1/foo?x=1".parse().unwrap();
        assert_eq!(
            route().target_url(&uri).as_deref(),
            Some("https://dashscope.aliyuncs.com/v1/foo?x=1")
        );
    }

    #[test]
    fn absolute_form_uses_path_only() {
        let uri: Uri = "http://localhost:3001/api/dashscope/api/v1/services/aigc/text-generation/generation"
            .parse()
            .unwrap();
        assert_eq!(
            route().target_url(&uri).as_deref(),
            Some("https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation")
        );
    }

    #[test]
    fn foreign_paths_have_no_target() {
        for path in ["/", "/api", "/api/dashscope", "/api/openai/v1"] {
            let uri: Uri = path.parse().unwrap();
            assert_eq!(route().target_url(&uri), None, "{path}");
        }
    }

    #[test]
    fn trailing_slash_on_origin_is_trimmed() {
        let route = UpstreamRoute::new("http://127.0.0.1:9000/", "/api/test");
        let uri: Uri = "/api/test/echo".parse().unwrap();
        assert_eq!(
            route.target_url(&uri).as_deref(),
            Some("http://127.0.0.1:9000/echo")
        );
    }
}
