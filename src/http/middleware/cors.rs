//! CORS response headers.
//!
//! Applied to every response leaving the router: preflights, 404s, relayed
//! upstream responses and error bodies alike. Values are fixed at startup and
//! override anything the upstream sent under the same names.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
        },
        header::InvalidHeaderValue,
        HeaderMap, HeaderValue,
    },
    response::Response,
};

use crate::config::CorsConfig;

/// Pre-built CORS header values.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    max_age: HeaderValue,
}

impl CorsHeaders {
    pub fn from_config(config: &CorsConfig) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(&config.allow_origin)?,
            allow_methods: HeaderValue::from_str(&config.allow_methods)?,
            allow_headers: HeaderValue::from_str(&config.allow_headers)?,
            max_age: HeaderValue::from(config.max_age_secs),
        })
    }

    /// Insert (replacing) the four CORS headers.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        headers.insert(ACCESS_CONTROL_MAX_AGE, self.max_age.clone());
    }
}

/// `axum::middleware::map_response_with_state` hook.
pub async fn apply_cors(State(cors): State<Arc<CorsHeaders>>, mut response: Response) -> Response {
    cors.apply(response.headers_mut());
    response
}
