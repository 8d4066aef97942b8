//! Reload scheduler configuration.

use crate::config::{DEFAULT_DEBOUNCE_MS, DEFAULT_NOTIFICATION_MS};
use std::time::Duration;

/// Timing configuration for a [`ReloadScheduler`](super::ReloadScheduler).
///
/// # Example
///
/// ```
/// use catloader::reload::ReloadConfig;
/// use std::time::Duration;
///
/// let config = ReloadConfig::new().with_debounce(Duration::from_millis(100));
/// assert_eq!(config.debounce(), Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadConfig {
    /// Quiet period before a scheduled reload fires
    debounce: Duration,
    /// How long error notifications stay visible
    notification_duration: Duration,
}

impl ReloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn notification_duration(&self) -> Duration {
        self.notification_duration
    }
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            notification_duration: Duration::from_millis(DEFAULT_NOTIFICATION_MS),
        }
    }
}
