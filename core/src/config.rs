//! Client configuration.
//!
//! The backend is addressed by a fixed base URL and authenticated with a
//! static API key sent as a header on every request. There is no timeout,
//! retry or backoff setting: each operation makes exactly one attempt.

use ureq::http::{HeaderName, HeaderValue, Uri};

use crate::error::ApiError;

/// Base URL of the deployed backend.
pub const DEFAULT_BASE_URL: &str = "http://143.47.45.118:6969/daa-api/v1";

pub const DEFAULT_API_KEY_HEADER: &str = "X-API-KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_key_header: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
        }
    }

    /// Config for the deployed backend.
    pub fn with_default_url(api_key: impl Into<String>) -> Self {
        Self::new(DEFAULT_BASE_URL, api_key)
    }

    pub fn with_api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    /// Check that every request built from this config would be well-formed.
    ///
    /// Returns the base URL with any trailing slash removed.
    pub(crate) fn validate(&self) -> Result<String, ApiError> {
        let base = self.base_url.trim_end_matches('/');
        let uri: Uri = base
            .parse()
            .map_err(|e| ApiError::Configuration(format!("base URL {base:?}: {e}")))?;
        match uri.scheme_str() {
            Some("http") | Some("https") => {}
            other => {
                return Err(ApiError::Configuration(format!(
                    "base URL {base:?} has unsupported scheme {other:?}"
                )))
            }
        }
        if uri.host().map_or(true, str::is_empty) {
            return Err(ApiError::Configuration(format!("base URL {base:?} has no host")));
        }
        if uri.query().is_some() {
            return Err(ApiError::Configuration(format!(
                "base URL {base:?} must not carry a query string"
            )));
        }

        if self.api_key.is_empty() {
            return Err(ApiError::Configuration("API key is empty".to_string()));
        }
        HeaderName::from_bytes(self.api_key_header.as_bytes()).map_err(|e| {
            ApiError::Configuration(format!("header name {:?}: {e}", self.api_key_header))
        })?;
        HeaderValue::from_str(&self.api_key)
            .map_err(|e| ApiError::Configuration(format!("API key is not a valid header value: {e}")))?;

        Ok(base.to_string())
    }
}
