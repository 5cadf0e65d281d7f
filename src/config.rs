//! Client configuration loaded from environment variables.

use crate::error::ConfigError;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Settings shared by the HTTP client and the search lists
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, always ending in `/` (e.g. "http://localhost:8000/api/")
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    pub user_agent: String,

    /// Records per page requested from list endpoints
    pub page_size: u32,

    /// Quiet period before a free-text search change is sent
    pub debounce: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            timeout: Duration::from_secs(30),
            user_agent: concat!("homes-search/", env!("CARGO_PKG_VERSION")).to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Load configuration from the environment.
    ///
    /// Reads `HOMES_API_URL`, `HOMES_API_TIMEOUT_SECS` and
    /// `HOMES_SEARCH_DEBOUNCE_MS`; unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var("HOMES_API_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        };
        if let Some(secs) = parse_var("HOMES_API_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var("HOMES_SEARCH_DEBOUNCE_MS")? {
            config.debounce = Duration::from_millis(ms);
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

fn normalize_base_url(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

fn parse_var(key: &str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}
