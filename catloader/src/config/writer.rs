//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[remote]
; Base URL of the catalog server. Catalogs are read from
;   <base_url>/api/catalogs/<id>/metadata
;   <base_url>/api/catalogs/<id>/rows
base_url = {}
; HTTP request timeout in seconds (default: 30)
timeout = {}

[reload]
; Quiet period in milliseconds before a paging/sort/filter change is loaded
; (default: 250). Changes arriving within this window replace each other.
debounce_ms = {}
; How long load errors stay on screen, in milliseconds (default: 5000)
notification_ms = {}

[logging]
; Log file path (default: ~/.catloader/catloader.log)
file = {}
"#,
        config.remote.base_url,
        config.remote.timeout,
        config.reload.debounce_ms,
        config.reload.notification_ms,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to a string, collapsing the home directory to ~.
pub(super) fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::settings::ConfigFile;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.remote.base_url = "https://catalogs.example.org".to_string();
        config.remote.timeout = 45;
        config.reload.debounce_ms = 400;
        config.logging.file = temp_dir.path().join("custom.log");
        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_written_file_is_commented() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        ConfigFile::default().save_to(&config_path).unwrap();

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[remote]"));
        assert!(content.contains("[reload]"));
        assert!(content.contains("[logging]"));
        assert!(content.contains("debounce_ms = 250"));
        assert!(content.contains("; HTTP request timeout"));
    }
}
