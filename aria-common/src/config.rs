//! Configuration loading
//!
//! Server configuration resolves each value in priority order:
//!
//! 1. Command-line argument (handled by the binary, highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The config file location itself resolves as: explicit path argument,
//! then `ARIA_CONFIG`, then `~/.config/aria/config.toml`.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "ARIA_CONFIG";

/// Media server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Folder containing the music library (scanned recursively).
    pub root_folder: PathBuf,
    /// Folder containing static assets (`index.html` and friends).
    pub static_folder: PathBuf,
    /// HTTP listen port.
    pub port: u16,
    /// Display name served by `/api/name`.
    pub display_name: String,
    /// Latitude served by `/api/location`.
    pub latitude: String,
    /// Longitude served by `/api/location`.
    pub longitude: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root_folder: PathBuf::from("music"),
            static_folder: PathBuf::from("public"),
            port: 3000,
            display_name: "Admin".to_string(),
            latitude: "0".to_string(),
            longitude: "0".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration, merging file contents over compiled defaults and
    /// environment variables over both.
    ///
    /// A missing config file is not an error; a present but malformed one is.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match resolve_config_file(explicit_path) {
            Some(path) => {
                let contents = std::fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("failed to read {}: {}", path.display(), e))
                })?;
                toml::from_str(&contents).map_err(|e| {
                    Error::Config(format!("failed to parse {}: {}", path.display(), e))
                })?
            }
            None => Self::default(),
        };

        // Environment overrides for the simple scalar endpoints
        if let Ok(name) = std::env::var("ARIA_DISPLAY_NAME") {
            config.display_name = name;
        }
        if let Ok(lat) = std::env::var("ARIA_LAT") {
            config.latitude = lat;
        }
        if let Ok(long) = std::env::var("ARIA_LONG") {
            config.longitude = long;
        }

        Ok(config)
    }
}

/// Find the config file to use, if any exists.
fn resolve_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    let default = dirs::config_dir()?.join("aria").join("config.toml");
    default.exists().then_some(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.root_folder, PathBuf::from("music"));
        assert_eq!(config.display_name, "Admin");
    }

    #[test]
    fn loads_partial_toml_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080\ndisplay_name = \"Casey\"").unwrap();

        let config = ServerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.display_name, "Casey");
        // Unspecified fields keep their defaults
        assert_eq!(config.root_folder, PathBuf::from("music"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number").unwrap();

        assert!(ServerConfig::load(Some(file.path())).is_err());
    }
}
