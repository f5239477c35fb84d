//! Minimal PDF output: a content-stream writer and a single-page document writer.

pub mod content;
pub mod document;

pub use content::{ContentStream, DEFAULT_PRECISION};
pub use document::{FontResource, PdfPage};
