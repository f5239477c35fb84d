//! Graphics state snapshots and save-point tokens.
//!
//! A [`GraphicsState`] pairs the drawing attributes ([`StateAttributes`]) with
//! the bookkeeping the stack needs: a per-stack ordinal used for membership
//! tests, the nesting level, and a validity flag shared with the
//! [`SavePoint`] handed to the caller. The flag flips to false exactly once,
//! when the stack pops the state.

use super::color::{BLACK, Color};
use super::matrix::Matrix;
use crate::fonts::Font;
use crate::util::Rect;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Line cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Line join style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Antialiasing applied by raster backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialias {
    #[default]
    Default,
    None,
    Gray,
    Subpixel,
}

/// Stroke selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    pub color: Color,
    pub width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    /// Alternating on/off lengths; empty means solid
    pub dash: Vec<f64>,
    pub dash_offset: f64,
}

impl Default for Pen {
    fn default() -> Self {
        Self::new(BLACK, 1.0)
    }
}

impl Pen {
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            miter_limit: 10.0,
            dash: Vec::new(),
            dash_offset: 0.0,
        }
    }

    pub fn with_dash(mut self, dash: Vec<f64>, offset: f64) -> Self {
        self.dash = dash;
        self.dash_offset = offset;
        self
    }
}

/// Fill selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Brush {
    Solid(Color),
}

impl Default for Brush {
    fn default() -> Self {
        Brush::Solid(BLACK)
    }
}

impl Brush {
    pub fn color(&self) -> Color {
        match self {
            Brush::Solid(color) => *color,
        }
    }
}

/// A clip rectangle together with the transform active when it was set.
///
/// The effective clip region is the intersection of every entry, each one
/// interpreted in its own captured coordinate system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub rect: Rect,
    pub transform: Matrix,
}

/// The drawing attributes of one state. Opaque to the stack, which only clones it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateAttributes {
    pub transform: Matrix,
    pub clip: Vec<ClipRect>,
    pub pen: Pen,
    pub brush: Brush,
    pub font: Option<Font>,
    pub antialias: Antialias,
}

impl StateAttributes {
    /// True when the transform, or the transform captured by any clip,
    /// collapses user space. Nothing painted under such a state is visible.
    pub fn is_degenerate(&self) -> bool {
        self.transform.invert().is_none()
            || self.clip.iter().any(|clip| clip.transform.invert().is_none())
    }
}

/// Process-unique identity of a [`GraphicsStateStack`](super::GraphicsStateStack).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackId(u64);

impl StackId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        StackId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stack #{}", self.0)
    }
}

/// One entry of a graphics state stack.
#[derive(Debug)]
pub struct GraphicsState {
    pub attrs: StateAttributes,
    ordinal: u64,
    level: usize,
    valid: Rc<Cell<bool>>,
}

impl GraphicsState {
    pub(crate) fn base(attrs: StateAttributes) -> Self {
        Self {
            attrs,
            ordinal: 0,
            level: 0,
            valid: Rc::new(Cell::new(true)),
        }
    }

    /// Copy-constructs a new state from this one with fresh bookkeeping.
    pub(crate) fn fork(&self, ordinal: u64, level: usize) -> Self {
        Self {
            attrs: self.attrs.clone(),
            ordinal,
            level,
            valid: Rc::new(Cell::new(true)),
        }
    }

    pub(crate) fn token(&self, stack: StackId) -> SavePoint {
        SavePoint {
            stack,
            ordinal: self.ordinal,
            level: self.level,
            valid: Rc::clone(&self.valid),
        }
    }

    pub(crate) fn invalidate(&self) {
        self.valid.set(false);
    }

    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// Nesting depth: 0 for the base state, 1 for the first save, and so on.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }
}

/// Opaque handle returned by a save, presented later to restore to that point.
///
/// Clones refer to the same saved state; once it is restored every clone
/// reports [`SavePoint::is_valid`] as false.
#[derive(Debug, Clone)]
pub struct SavePoint {
    stack: StackId,
    ordinal: u64,
    level: usize,
    valid: Rc<Cell<bool>>,
}

impl SavePoint {
    pub fn stack(&self) -> StackId {
        self.stack
    }

    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// Level of the saved state; restoring it leaves `level - 1` saves open.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn is_valid(&self) -> bool {
        self.valid.get()
    }
}

impl fmt::Display for SavePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "save point {} (level {}) of {}",
            self.ordinal, self.level, self.stack
        )
    }
}
