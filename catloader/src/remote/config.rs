//! Remote client configuration.

use crate::config::{DEFAULT_BASE_URL, DEFAULT_REMOTE_TIMEOUT_SECS};

/// Where the catalog server lives and how long to wait for it.
///
/// # Example
///
/// ```
/// use catloader::remote::RemoteConfig;
///
/// let config = RemoteConfig::new("https://catalogs.example.org").with_timeout(10);
/// assert_eq!(config.timeout_secs(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    base_url: String,
    timeout_secs: u64,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
