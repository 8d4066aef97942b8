//! Config file location, loading and saving.
//!
//! A missing file is not an error: every setting has a default, so a fresh
//! install runs without ever writing `~/.catloader/config.ini`.

use super::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use super::settings::ConfigFile;
use ini::Ini;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading, validating or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file exists but is not valid INI
    #[error("Failed to read {}: {source}", path.display())]
    ReadError { path: PathBuf, source: ini::Error },

    /// The file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    WriteError { path: PathBuf, source: io::Error },

    /// A setting is present but unusable
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// The directory holding the file could not be created
    #[error("Failed to create {}: {source}", path.display())]
    DirectoryError { path: PathBuf, source: io::Error },
}

impl ConfigFile {
    /// Reads `~/.catloader/config.ini`, or returns defaults if it is absent.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Reads a config file, or returns defaults if `path` does not exist.
    ///
    /// Keys missing from the file keep their defaults; unknown keys are
    /// ignored.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigFileError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        super::parser::parse_ini(&ini)
    }

    /// Writes `~/.catloader/config.ini`.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Writes the commented INI form to `path`, creating its directory.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| ConfigFileError::DirectoryError {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, super::writer::to_config_string(self)).map_err(|source| {
            ConfigFileError::WriteError {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Writes a default config file unless one is already there.
    ///
    /// Returns the file's path either way.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }
}

/// The config directory, `~/.catloader` (or `./.catloader` without a home).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Full path of the config file.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}
