//! Dotted `section.key` names for `catloader config get/set`.
//!
//! Values set through a key go through the same validation as values read
//! from the file.

use std::str::FromStr;
use thiserror::Error;

use super::parser::{expand_tilde, parse_positive, validate_base_url};
use super::settings::ConfigFile;
use super::writer::path_to_string;

/// Error from `config get/set`.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// A settable field of [`ConfigFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    RemoteBaseUrl,
    RemoteTimeout,
    ReloadDebounceMs,
    ReloadNotificationMs,
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "remote.base_url").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::RemoteBaseUrl => "remote.base_url",
            ConfigKey::RemoteTimeout => "remote.timeout",
            ConfigKey::ReloadDebounceMs => "reload.debounce_ms",
            ConfigKey::ReloadNotificationMs => "reload.notification_ms",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "remote").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "base_url").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::RemoteBaseUrl => config.remote.base_url.clone(),
            ConfigKey::RemoteTimeout => config.remote.timeout.to_string(),
            ConfigKey::ReloadDebounceMs => config.reload.debounce_ms.to_string(),
            ConfigKey::ReloadNotificationMs => config.reload.notification_ms.to_string(),
            ConfigKey::LoggingFile => path_to_string(&config.logging.file),
        }
    }

    /// Set the value in a config file.
    ///
    /// The config is left unchanged if the value is invalid.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: reason.to_string(),
        };

        match self {
            ConfigKey::RemoteBaseUrl => {
                validate_base_url(value).map_err(|reason| invalid(&reason))?;
                config.remote.base_url = value.to_string();
            }
            ConfigKey::RemoteTimeout => {
                config.remote.timeout =
                    parse_positive(value).ok_or_else(|| invalid("must be a positive integer"))?;
            }
            ConfigKey::ReloadDebounceMs => {
                config.reload.debounce_ms = value
                    .parse()
                    .map_err(|_| invalid("must be a non-negative integer"))?;
            }
            ConfigKey::ReloadNotificationMs => {
                config.reload.notification_ms =
                    parse_positive(value).ok_or_else(|| invalid("must be a positive integer"))?;
            }
            ConfigKey::LoggingFile => {
                if value.is_empty() {
                    return Err(invalid("must be a valid path"));
                }
                config.logging.file = expand_tilde(value);
            }
        }
        Ok(())
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::RemoteBaseUrl,
            ConfigKey::RemoteTimeout,
            ConfigKey::ReloadDebounceMs,
            ConfigKey::ReloadNotificationMs,
            ConfigKey::LoggingFile,
        ]
    }
}
