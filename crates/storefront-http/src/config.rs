//! Connection settings for the REST backend.

use std::time::Duration;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Where and how to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// API root, e.g. `http://localhost:8080/api/v1/`.
    pub base_url: String,
    /// Bearer token sent with every request, if set.
    pub auth_token: Option<String>,
    /// Per-request timeout, connection included.
    pub timeout: Duration,
}

impl HttpConfig {
    /// Settings for `base_url` with no token and the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the bearer token. A blank token is treated as none.
    #[must_use]
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|token| !token.trim().is_empty());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080/api/v1/")
    }
}
