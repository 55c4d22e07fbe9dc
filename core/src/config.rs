//! Client configuration.
//!
//! A single environment variable selects the API origin, defaulting to
//! the local development backend. The base URL is normalized without a
//! trailing slash so path concatenation stays predictable.

use std::env;
use std::time::Duration;

/// Environment variable overriding the API origin.
pub const BASE_URL_ENV: &str = "IMOBILIARIA_API_URL";

/// Local development backend, used when the variable is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads the API origin from `IMOBILIARIA_API_URL`, falling back to
    /// the local development address.
    pub fn from_env() -> Self {
        let base_url = env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
