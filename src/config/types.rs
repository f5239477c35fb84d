//! Configuration type definitions.

use super::enums::{AntialiasMode, BackendChoice, ColorSpec};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output surface settings.
///
/// Controls the size and kind of surface the renderer paints into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SurfaceConfig {
    /// Surface width in pixels or points (valid range: 1 - 16384)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Surface height in pixels or points (valid range: 1 - 16384)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Output backend: image, svg, pdf or document
    #[serde(default)]
    pub backend: BackendChoice,

    /// Antialiasing for raster output (default, none, gray, subpixel)
    #[serde(default)]
    pub antialias: AntialiasMode,

    /// Page background - a named color or an RGB array like `[255, 255, 255]`
    #[serde(default = "default_background")]
    pub background: ColorSpec,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            backend: BackendChoice::default(),
            antialias: AntialiasMode::default(),
            background: default_background(),
        }
    }
}

/// Font settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FontConfig {
    /// Family used for text when none is given (e.g., "Sans", "Serif", "JetBrains Mono")
    #[serde(default = "default_font_family")]
    pub default_family: String,

    /// Font size in points (valid range: 4.0 - 288.0)
    #[serde(default = "default_font_size")]
    pub default_size: f64,

    /// Families resolved into the shared cache at startup
    #[serde(default)]
    pub preload: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            default_family: default_font_family(),
            default_size: default_font_size(),
            preload: Vec::new(),
        }
    }
}

/// Settings for the page-content document backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentConfig {
    /// Flate-compress the page content stream
    #[serde(default = "default_compress")]
    pub compress: bool,

    /// Fractional digits written for content-stream numbers (valid range: 0 - 6)
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            compress: default_compress(),
            precision: default_precision(),
        }
    }
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

fn default_background() -> ColorSpec {
    ColorSpec::Name("white".to_string())
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_font_size() -> f64 {
    18.0
}

fn default_compress() -> bool {
    true
}

fn default_precision() -> usize {
    crate::pdf::DEFAULT_PRECISION
}
