//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use super::settings::*;

/// Name of the per-user configuration directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".catloader";

/// Configuration file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default log file name inside [`CONFIG_DIR_NAME`].
pub const DEFAULT_LOG_FILE_NAME: &str = "catloader.log";

/// Default remote catalog server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = crate::remote::DEFAULT_TIMEOUT_SECS;

/// Default quiet period before a scheduled reload fires (250ms).
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Default display time for error notifications (5 seconds).
pub const DEFAULT_NOTIFICATION_MS: u64 = 5000;

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = super::file::config_directory();

        Self {
            remote: RemoteSettings {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout: DEFAULT_REMOTE_TIMEOUT_SECS,
            },
            reload: ReloadSettings {
                debounce_ms: DEFAULT_DEBOUNCE_MS,
                notification_ms: DEFAULT_NOTIFICATION_MS,
            },
            logging: LoggingSettings {
                file: config_dir.join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}
