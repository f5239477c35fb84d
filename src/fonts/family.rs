//! Font family descriptors and the process-wide family cache.
//!
//! Building a family means enumerating the platform font map, which is far
//! more expensive than a map lookup, and callers compare families by identity.
//! [`FontFamily::resolve`] therefore always goes through [`family_cache`].

use super::cache::{CacheError, InternCache, Interned};
use log::{debug, warn};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Errors produced while building or resolving a font family.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("font family '{0}' is not installed")]
    FamilyNotFound(String),

    #[error("font backend failed for '{name}': {reason}")]
    Backend { name: String, reason: String },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// One face of a family as reported by the font backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceInfo {
    /// Face name, e.g. "Bold Italic"
    pub name: String,
    /// CSS-style weight (100-900)
    pub weight: u16,
    pub italic: bool,
    /// True when the backend fakes this face (e.g. slanted regular)
    pub synthesized: bool,
}

/// Backend-specific data describing a font family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyPayload {
    /// Family name as spelled by the backend, used when realizing fonts.
    pub canonical_name: String,
    pub faces: Vec<FaceInfo>,
    pub monospace: bool,
    pub variable: bool,
}

impl FamilyPayload {
    /// Payload with no face information, for backends that resolve lazily.
    pub fn bare(canonical_name: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            faces: Vec::new(),
            monospace: false,
            variable: false,
        }
    }
}

/// Builds family payloads from a name. Invoked only on a cache miss.
pub trait FamilySource {
    fn build_family(&self, name: &str) -> Result<FamilyPayload, FontError>;
}

/// An immutable, interned font family.
#[derive(Debug)]
pub struct FontFamily {
    name: String,
    payload: FamilyPayload,
}

/// Header line of the family cache dump.
pub const FAMILY_CACHE_TITLE: &str = "Font families by name";

/// The process-wide font family cache, created on first use.
pub fn family_cache() -> &'static InternCache<FontFamily> {
    static CACHE: OnceLock<InternCache<FontFamily>> = OnceLock::new();
    CACHE.get_or_init(|| InternCache::new(FAMILY_CACHE_TITLE))
}

impl FontFamily {
    /// Creates an uncached candidate. Most callers want [`FontFamily::resolve`].
    pub fn new(name: impl Into<String>, payload: FamilyPayload) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &FamilyPayload {
        &self.payload
    }

    /// Family name the backend expects when realizing text.
    pub fn canonical_name(&self) -> &str {
        &self.payload.canonical_name
    }

    /// Resolves `name` through the global cache, building it with `source` on a miss.
    ///
    /// # Errors
    /// Propagates the source's error on a miss, or [`CacheError::EmptyName`] for
    /// an empty name.
    pub fn resolve(name: &str, source: &dyn FamilySource) -> Result<Arc<FontFamily>, FontError> {
        Self::resolve_in(family_cache(), name, source)
    }

    /// Same as [`FontFamily::resolve`] against an explicit cache instance.
    pub fn resolve_in(
        cache: &InternCache<FontFamily>,
        name: &str,
        source: &dyn FamilySource,
    ) -> Result<Arc<FontFamily>, FontError> {
        if name.trim().is_empty() {
            return Err(CacheError::EmptyName.into());
        }
        if let Some(hit) = cache.lookup(name) {
            return Ok(hit);
        }

        debug!("Font family '{}' not cached, building", name);
        let payload = source.build_family(name)?;
        let candidate = Arc::new(FontFamily::new(name, payload));
        Ok(cache.intern_or_get(candidate)?)
    }

    /// Resolves every name, logging (and skipping) the ones that fail.
    ///
    /// Returns the families that resolved, in input order.
    pub fn preload(names: &[String], source: &dyn FamilySource) -> Vec<Arc<FontFamily>> {
        names
            .iter()
            .filter_map(|name| match Self::resolve(name, source) {
                Ok(family) => Some(family),
                Err(err) => {
                    warn!("Failed to preload font family '{}': {}", name, err);
                    None
                }
            })
            .collect()
    }
}

impl Interned for FontFamily {
    fn intern_name(&self) -> &str {
        &self.name
    }

    fn debug_summary(&self) -> String {
        let mut summary = format!(
            "{} ({} face{}",
            self.payload.canonical_name,
            self.payload.faces.len(),
            if self.payload.faces.len() == 1 { "" } else { "s" }
        );
        if self.payload.monospace {
            summary.push_str(", monospace");
        }
        if self.payload.variable {
            summary.push_str(", variable");
        }
        summary.push(')');
        summary
    }
}
