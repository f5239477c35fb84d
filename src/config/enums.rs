//! Configuration enum types.

use crate::draw::{Antialias, Color, color::*};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output backend selected for rendering.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum BackendChoice {
    /// ARGB32 raster written as PNG
    #[default]
    Image,
    /// Cairo SVG surface
    Svg,
    /// Cairo PDF surface
    Pdf,
    /// PDF written directly from page-content operators
    Document,
}

/// Antialiasing mode for raster output.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AntialiasMode {
    #[default]
    Default,
    None,
    Gray,
    Subpixel,
}

impl From<AntialiasMode> for Antialias {
    fn from(mode: AntialiasMode) -> Self {
        match mode {
            AntialiasMode::Default => Antialias::Default,
            AntialiasMode::None => Antialias::None,
            AntialiasMode::Gray => Antialias::Gray,
            AntialiasMode::Subpixel => Antialias::Subpixel,
        }
    }
}

/// Color specification - either a named color or RGB values.
///
/// # Examples
/// ```toml
/// # Named color
/// background = "white"
///
/// # Custom RGB color (0-255 per component)
/// background = [255, 128, 0]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color: red, green, blue, yellow, orange, white, black, transparent
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`].
    ///
    /// Unknown color names fall back to white with a warning.
    pub fn to_color(&self) -> Color {
        match self {
            ColorSpec::Name(name) => name_to_color(name).unwrap_or_else(|| {
                warn!("Unknown color '{}', using white", name);
                WHITE
            }),
            ColorSpec::Rgb([r, g, b]) => Color::from_rgb8(*r, *g, *b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_spec_resolves_names_and_rgb() {
        assert_eq!(ColorSpec::Name("Red".into()).to_color(), RED);
        assert_eq!(ColorSpec::Name("no-such-color".into()).to_color(), WHITE);
        assert_eq!(ColorSpec::Rgb([0, 0, 255]).to_color(), BLUE);
    }
}
