//! Font families and the shared interning cache behind them.
//!
//! - [`InternCache`]: case-insensitive name → shared instance map
//! - [`FontFamily`]: interned family descriptor, resolved through [`family_cache`]
//! - [`PangoFamilySource`]: builds family payloads from the platform font map
//! - [`Font`]: the size/style selection stored in a graphics state

pub mod cache;
pub mod family;
pub mod font;
pub mod system;

pub use cache::{CacheError, InternCache, Interned};
pub use family::{
    FAMILY_CACHE_TITLE, FaceInfo, FamilyPayload, FamilySource, FontError, FontFamily,
    family_cache,
};
pub use font::{Font, FontStyle};
pub use system::PangoFamilySource;
