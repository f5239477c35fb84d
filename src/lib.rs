//! Library exports for drawstack.
//!
//! Drawing surfaces with nested, skip-level save/restore over Cairo and PDF
//! page-content backends, plus the process-wide font family cache they share.
//! The configuration types are exported so external tools can reuse the same
//! validation and schema.

pub mod config;
pub mod draw;
pub mod fonts;
pub mod pdf;
pub mod scene;
pub mod util;

pub use config::Config;
pub use draw::{DrawingSurface, SavePoint, SurfaceError};
pub use fonts::{FontFamily, family_cache};
