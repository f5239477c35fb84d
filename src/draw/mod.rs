//! Drawing surfaces with nested save/restore.
//!
//! This module defines:
//! - [`GraphicsStateStack`]: ordered save points with skip-level restore
//! - [`StateAttributes`]: transform, clip, pen, brush and font of one state
//! - [`DrawingSurface`]: the client-facing object that owns a stack and a backend
//! - [`backend`]: Cairo and PDF page-content adapters

pub mod backend;
pub mod color;
pub mod matrix;
pub mod path;
pub mod stack;
pub mod state;
pub mod surface;

pub use backend::{Backend, BackendError, BackendKind, CairoBackend, DocumentBackend};
pub use color::Color;
pub use matrix::Matrix;
pub use path::{Path, PathElement};
pub use stack::{GraphicsStateStack, StateError, StateHooks};
pub use state::{
    Antialias, Brush, ClipRect, GraphicsState, LineCap, LineJoin, Pen, SavePoint, StackId,
    StateAttributes,
};
pub use surface::{DrawingSurface, SurfaceError};

// Re-export color constants for public API
#[allow(unused_imports)]
pub use color::{BLACK, BLUE, GREEN, ORANGE, RED, TRANSPARENT, WHITE, YELLOW};
