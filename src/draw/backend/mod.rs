//! Backend adapters that a [`DrawingSurface`](super::DrawingSurface) forwards to.
//!
//! Every backend is also a [`StateHooks`] implementor: the surface hands it
//! each push and pop so the native save/restore primitive (`cairo_save` or
//! PDF `q`/`Q`) runs in lockstep with the logical state stack. Paint calls
//! receive the current [`StateAttributes`] and realize whatever they need.

pub mod document;
pub mod native;

pub use document::DocumentBackend;
pub use native::CairoBackend;

use super::path::Path;
use super::stack::StateHooks;
use super::state::StateAttributes;
use crate::fonts::Font;
use crate::util::{Point, Size};
use thiserror::Error;

/// What kind of output a backend produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-memory raster surface
    Image,
    /// Vector SVG file
    Svg,
    /// Vector PDF file rendered by Cairo
    Pdf,
    /// PDF page content written directly as content-stream operators
    Document,
}

/// Failures reported by a backend while painting or finishing.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("failed to encode PNG: {0}")]
    Png(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transform is not invertible, cannot realize {0}")]
    SingularTransform(&'static str),

    #[error("backend already finished")]
    Finished,

    #[error("{operation} is not supported by the {kind:?} backend")]
    Unsupported {
        kind: BackendKind,
        operation: &'static str,
    },
}

/// A native drawing target.
pub trait Backend: StateHooks {
    fn kind(&self) -> BackendKind;

    /// Page or surface size in user-space units.
    fn size(&self) -> Size;

    fn stroke_path(&mut self, path: &Path, attrs: &StateAttributes) -> Result<(), BackendError>;

    fn fill_path(&mut self, path: &Path, attrs: &StateAttributes) -> Result<(), BackendError>;

    /// Draws `text` with its first baseline starting at `origin`.
    fn draw_text(
        &mut self,
        text: &str,
        origin: Point,
        font: &Font,
        attrs: &StateAttributes,
    ) -> Result<(), BackendError>;

    /// Flushes pending output. Later paint calls fail with [`BackendError::Finished`].
    fn finish(&mut self) -> Result<(), BackendError>;
}
