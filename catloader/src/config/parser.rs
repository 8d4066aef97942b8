//! Reads `[remote]`, `[reload]` and `[logging]` out of a parsed INI file.
//!
//! Validation helpers are shared with [`super::keys`].

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Overlays the values present in `ini` on top of the defaults.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [remote] section
    if let Some(section) = ini.section(Some("remote")) {
        if let Some(v) = section.get("base_url") {
            let v = v.trim();
            validate_base_url(v).map_err(|reason| ConfigFileError::InvalidValue {
                section: "remote".to_string(),
                key: "base_url".to_string(),
                value: v.to_string(),
                reason,
            })?;
            config.remote.base_url = v.to_string();
        }
        if let Some(v) = section.get("timeout") {
            config.remote.timeout =
                parse_positive(v).ok_or_else(|| ConfigFileError::InvalidValue {
                    section: "remote".to_string(),
                    key: "timeout".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (seconds)".to_string(),
                })?;
        }
    }

    // [reload] section
    if let Some(section) = ini.section(Some("reload")) {
        if let Some(v) = section.get("debounce_ms") {
            config.reload.debounce_ms =
                v.trim().parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "reload".to_string(),
                    key: "debounce_ms".to_string(),
                    value: v.to_string(),
                    reason: "must be a non-negative integer (milliseconds)".to_string(),
                })?;
        }
        if let Some(v) = section.get("notification_ms") {
            config.reload.notification_ms =
                parse_positive(v).ok_or_else(|| ConfigFileError::InvalidValue {
                    section: "reload".to_string(),
                    key: "notification_ms".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (milliseconds)".to_string(),
                })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Checks that `value` is an absolute http(s) URL usable as an endpoint base.
pub(super) fn validate_base_url(value: &str) -> Result<(), String> {
    let url = reqwest::Url::parse(value).map_err(|e| format!("not a valid URL ({})", e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}', use http or https", other)),
    }
}

/// Parses an integer greater than zero.
pub(super) fn parse_positive(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
