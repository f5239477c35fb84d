//! Configuration file support for drawstack.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/drawstack/config.toml`. Settings cover the output surface,
//! font defaults and preloading, and the document backend's content-stream options.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

// Re-export commonly used types at module level
pub use enums::{AntialiasMode, BackendChoice, ColorSpec};
pub use types::{DocumentConfig, FontConfig, SurfaceConfig};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_DIMENSION: u32 = 16384;
const MAX_PRECISION: usize = 6;

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [surface]
/// width = 800
/// height = 600
/// backend = "document"
/// antialias = "gray"
/// background = "white"
///
/// [fonts]
/// default_family = "Serif"
/// default_size = 16.0
/// preload = ["Sans", "Monospace"]
///
/// [document]
/// compress = false
/// precision = 2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Output surface size, backend and antialiasing
    #[serde(default)]
    pub surface: SurfaceConfig,

    /// Font defaults and families to preload
    #[serde(default)]
    pub fonts: FontConfig,

    /// Content-stream options for the document backend
    #[serde(default)]
    pub document: DocumentConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `surface.width`, `surface.height`: 1 - 16384
    /// - `fonts.default_size`: 4.0 - 288.0
    /// - `document.precision`: 0 - 6
    pub fn validate_and_clamp(&mut self) {
        if !(1..=MAX_DIMENSION).contains(&self.surface.width) {
            warn!(
                "Invalid surface width {}, clamping to 1-{} range",
                self.surface.width, MAX_DIMENSION
            );
            self.surface.width = self.surface.width.clamp(1, MAX_DIMENSION);
        }

        if !(1..=MAX_DIMENSION).contains(&self.surface.height) {
            warn!(
                "Invalid surface height {}, clamping to 1-{} range",
                self.surface.height, MAX_DIMENSION
            );
            self.surface.height = self.surface.height.clamp(1, MAX_DIMENSION);
        }

        if !(4.0..=288.0).contains(&self.fonts.default_size) {
            warn!(
                "Invalid default_size {:.1}, clamping to 4.0-288.0 range",
                self.fonts.default_size
            );
            // clamp passes NaN through unchanged.
            self.fonts.default_size = if self.fonts.default_size.is_nan() {
                FontConfig::default().default_size
            } else {
                self.fonts.default_size.clamp(4.0, 288.0)
            };
        }

        if self.fonts.default_family.trim().is_empty() {
            warn!("Empty default_family, falling back to 'Sans'");
            self.fonts.default_family = FontConfig::default().default_family;
        }

        let before = self.fonts.preload.len();
        self.fonts.preload.retain(|name| !name.trim().is_empty());
        if self.fonts.preload.len() != before {
            warn!(
                "Dropped {} empty name(s) from fonts.preload",
                before - self.fonts.preload.len()
            );
        }

        if self.document.precision > MAX_PRECISION {
            warn!(
                "Invalid precision {}, clamping to 0-{} range",
                self.document.precision, MAX_PRECISION
            );
            self.document.precision = MAX_PRECISION;
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/drawstack/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("drawstack");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from an explicit path.
    ///
    /// Unlike [`Config::load`], a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to the default location.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, the config cannot be
    /// serialized, or the file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, config_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// JSON schema describing the config file, for editors and tooling.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}
