//! Migrator configuration loading.
//!
//! Settings come from an optional TOML file and are overridden by
//! command-line flags:
//!
//! ```toml
//! organization = "acme"
//! team = "platform"
//! source-remote = "bitbucket"
//! destination-transport = "ssh"
//! work-dir = "mirrors"
//! ```

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::MirrorSettings;

use std::path::Path;
use tracing::{debug, info};

/// Default settings file name.
pub const DEFAULT_SETTINGS_FILE: &str = "mirror.toml";

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file can't be read or parsed.
pub fn load_settings(path: &Path) -> Result<MirrorSettings, ConfigError> {
    info!(path = %path.display(), "Loading settings");

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::TomlError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Loads settings from `path` if it exists, or returns empty settings.
pub fn load_optional_settings(path: &Path) -> Result<MirrorSettings, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "No settings file, using defaults");
        return Ok(MirrorSettings::default());
    }
    load_settings(path)
}
