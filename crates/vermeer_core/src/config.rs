//! Configuration loading.
//!
//! Vermeer reads its defaults from a bundled `vermeer.toml` and lets users
//! override them from `~/.config/vermeer/vermeer.toml` or `./vermeer.toml`,
//! with the current directory taking precedence.

use crate::{CaptureOptions, RestoreOptions};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use vermeer_error::{ConfigError, VermeerError, VermeerResult};

/// Snapshot storage settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct StorageSettings {
    /// Root directory for stored snapshots; the store's own default applies
    /// when unset
    #[serde(default)]
    root: Option<String>,
}

/// Top-level Vermeer configuration.
///
/// # Example
///
/// ```no_run
/// use vermeer_core::VermeerConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = VermeerConfig::load()?;
/// println!("dispatch floor: {}ms", config.capture().speed_ms());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct VermeerConfig {
    /// Capture options
    #[serde(default)]
    capture: CaptureOptions,
    /// Restore options
    #[serde(default)]
    restore: RestoreOptions,
    /// Snapshot storage settings
    #[serde(default)]
    storage: StorageSettings,
}

impl VermeerConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> VermeerResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                VermeerError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                VermeerError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (vermeer.toml shipped with the library)
    /// 2. User config in home directory (~/.config/vermeer/vermeer.toml)
    /// 3. User config in current directory (./vermeer.toml)
    ///
    /// User config files are optional and will be silently skipped if not found.
    #[instrument]
    pub fn load() -> VermeerResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../../../vermeer.toml");

        let mut builder = Config::builder()
            // Start with bundled defaults
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        // Add user config from home directory (optional)
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/vermeer/vermeer.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        // Add user config from current directory (optional, highest precedence)
        builder = builder.add_source(File::with_name("vermeer").required(false));

        builder
            .build()
            .map_err(|e| {
                VermeerError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                VermeerError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}
