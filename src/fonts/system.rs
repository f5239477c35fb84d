//! Pango-backed family enumeration.

use super::family::{FaceInfo, FamilyPayload, FamilySource, FontError};
use log::debug;
use pango::glib::translate::IntoGlib;
use pango::prelude::*;

/// Looks families up in the default `pangocairo` font map.
///
/// The font map is per-thread in Pango, so this type holds no Pango objects
/// and queries the calling thread's map on every build.
#[derive(Debug, Default, Clone, Copy)]
pub struct PangoFamilySource;

impl PangoFamilySource {
    pub fn new() -> Self {
        Self
    }

    /// Names of every family the platform exposes, sorted case-insensitively.
    pub fn available_families(&self) -> Vec<String> {
        let font_map = pangocairo::FontMap::default();
        let mut names: Vec<String> = font_map
            .list_families()
            .iter()
            .map(|family| family.name().to_string())
            .collect();
        names.sort_by_key(|name| super::cache::fold_name(name));
        names
    }
}

impl FamilySource for PangoFamilySource {
    fn build_family(&self, name: &str) -> Result<FamilyPayload, FontError> {
        let font_map = pangocairo::FontMap::default();
        let wanted = super::cache::fold_name(name);

        let family = font_map
            .list_families()
            .into_iter()
            .find(|family| super::cache::fold_name(&family.name()) == wanted)
            .ok_or_else(|| FontError::FamilyNotFound(name.to_string()))?;

        let faces: Vec<FaceInfo> = family
            .list_faces()
            .iter()
            .map(|face| {
                let description = face.describe();
                FaceInfo {
                    name: face.face_name().to_string(),
                    weight: description.weight().into_glib().clamp(1, 1000) as u16,
                    italic: matches!(
                        description.style(),
                        pango::Style::Italic | pango::Style::Oblique
                    ),
                    synthesized: face.is_synthesized(),
                }
            })
            .collect();

        debug!(
            "Pango resolved '{}' to '{}' with {} face(s)",
            name,
            family.name(),
            faces.len()
        );

        Ok(FamilyPayload {
            canonical_name: family.name().to_string(),
            faces,
            monospace: family.is_monospace(),
            variable: family.is_variable(),
        })
    }
}
