//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use crate::reload::ReloadConfig;
use crate::remote::RemoteConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Remote catalog server settings
    pub remote: RemoteSettings,
    /// Reload scheduler settings
    pub reload: ReloadSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Remote catalog server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSettings {
    /// Base URL the `/api/catalogs/...` endpoints live under
    pub base_url: String,
    /// Timeout in seconds for HTTP requests
    pub timeout: u64,
}

/// Reload scheduler configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadSettings {
    /// Debounce delay in milliseconds
    pub debounce_ms: u64,
    /// How long error notifications are shown, in milliseconds
    pub notification_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl ConfigFile {
    /// Runtime configuration for the remote catalog client.
    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig::new(&self.remote.base_url).with_timeout(self.remote.timeout)
    }

    /// Runtime configuration for the reload scheduler.
    pub fn reload_config(&self) -> ReloadConfig {
        ReloadConfig::new()
            .with_debounce(Duration::from_millis(self.reload.debounce_ms))
            .with_notification_duration(Duration::from_millis(self.reload.notification_ms))
    }
}
