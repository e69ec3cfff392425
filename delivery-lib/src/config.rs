//! Client configuration.

use std::time::Duration;

use crate::error::Error;
use crate::table::DEFAULT_PAGE_SIZE;

/// Default backend API URL.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default interval between new-order polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Settings shared by the client, the table views and the order feed.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use delivery_lib::config::DeliveryConfig;
///
/// let config = DeliveryConfig::default()
///     .api_url("https://delivery.example.com/api")
///     .page_size(25)
///     .poll_interval(Duration::from_secs(10));
/// assert_eq!(config.page_size, 25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryConfig {
    /// Backend REST API base URL.
    pub api_url: String,
    /// Dashboard statistics server, if any.
    pub stats_url: Option<String>,
    /// Identity provider API key for email/password sign-in.
    pub identity_api_key: Option<String>,
    /// Rows per table page.
    pub page_size: usize,
    /// Interval between new-order polls.
    pub poll_interval: Duration,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
    /// Text-generation endpoint for the assistant.
    pub assistant_url: Option<String>,
    /// Bearer key for the assistant endpoint.
    pub assistant_api_key: Option<String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            stats_url: None,
            identity_api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            assistant_url: None,
            assistant_api_key: None,
        }
    }
}

impl DeliveryConfig {
    /// Reads `DELIVERY_*` environment variables over the defaults.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `DELIVERY_API_URL` | `api_url` |
    /// | `DELIVERY_STATS_URL` | `stats_url` |
    /// | `DELIVERY_IDENTITY_API_KEY` | `identity_api_key` |
    /// | `DELIVERY_PAGE_SIZE` | `page_size` |
    /// | `DELIVERY_POLL_SECS` | `poll_interval` |
    /// | `DELIVERY_TIMEOUT_SECS` | `timeout` |
    /// | `DELIVERY_ASSISTANT_URL` | `assistant_url` |
    /// | `DELIVERY_ASSISTANT_API_KEY` | `assistant_api_key` |
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = var("DELIVERY_API_URL") {
            config.api_url = url;
        }
        config.stats_url = var("DELIVERY_STATS_URL");
        config.identity_api_key = var("DELIVERY_IDENTITY_API_KEY");
        config.assistant_url = var("DELIVERY_ASSISTANT_URL");
        config.assistant_api_key = var("DELIVERY_ASSISTANT_API_KEY");
        if let Some(size) = var("DELIVERY_PAGE_SIZE") {
            config.page_size = parse_number("DELIVERY_PAGE_SIZE", &size)? as usize;
        }
        if let Some(secs) = var("DELIVERY_POLL_SECS") {
            config.poll_interval = Duration::from_secs(parse_number("DELIVERY_POLL_SECS", &secs)?);
        }
        if let Some(secs) = var("DELIVERY_TIMEOUT_SECS") {
            config.timeout = Some(Duration::from_secs(parse_number("DELIVERY_TIMEOUT_SECS", &secs)?));
        }

        Ok(config)
    }

    /// Sets the backend API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Sets the statistics server URL.
    pub fn stats_url(mut self, url: impl Into<String>) -> Self {
        self.stats_url = Some(url.into());
        self
    }

    /// Sets the identity provider API key.
    pub fn identity_api_key(mut self, key: impl Into<String>) -> Self {
        self.identity_api_key = Some(key.into());
        self
    }

    /// Sets the table page size.
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Sets the new-order poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the assistant endpoint.
    pub fn assistant_url(mut self, url: impl Into<String>) -> Self {
        self.assistant_url = Some(url.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, Error> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{} must be a non-negative integer, got {:?}", key, value)))
}
