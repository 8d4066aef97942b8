//! User configuration.
//!
//! Settings are read from an INI file at `~/.catloader/config.ini`:
//!
//! ```ini
//! [remote]
//! base_url = http://localhost:8000
//! timeout = 30
//!
//! [reload]
//! debounce_ms = 250
//! notification_ms = 5000
//!
//! [logging]
//! file = ~/.catloader/catloader.log
//! ```
//!
//! [`ConfigFile`] converts into the runtime configs the components take,
//! [`RemoteConfig`](crate::remote::RemoteConfig) and
//! [`ReloadConfig`](crate::reload::ReloadConfig).

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{ConfigFile, LoggingSettings, ReloadSettings, RemoteSettings};
