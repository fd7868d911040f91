//! Error types for layout composition and TV-layout visualization.
//!
//! ```text
//! TvLayoutError
//! ├── InvalidParameter    - a shape <= 0, a stride < 0 or a zero bit width
//! ├── CompositionFailure  - the layouts cannot form a tiled copy (wraps LayoutError)
//! └── Render              - the output sink rejected a write
//! ```

use thiserror::Error;

use crate::layout::{IntTuple, Layout};

/// Result type alias for visualization operations.
pub type Result<T> = std::result::Result<T, TvLayoutError>;

/// Failures of the layout algebra and of tiled-copy construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LayoutError {
    /// Shape and stride do not share a nesting profile.
    #[error("shape {shape} and stride {stride} are not congruent")]
    NotCongruent { shape: String, stride: String },

    /// An operation received a layout of the wrong rank.
    #[error("{op} expects rank {expected}, got {layout}")]
    Rank {
        op: &'static str,
        expected: usize,
        layout: String,
    },

    #[error("stride divisibility condition violated: mode of size {shape} vs stride {stride}")]
    StrideDivisibility { shape: i64, stride: i64 },

    #[error("shape divisibility condition violated: {shape} is not divisible by {divisor}")]
    ShapeDivisibility { shape: i64, divisor: i64 },

    /// The copy width is not a whole number of elements.
    #[error("copy width of {copy_bits} bits is not a multiple of the {element_bits}-bit element")]
    CopyWidth { copy_bits: u32, element_bits: u32 },

    #[error("TiledCopy uses too few threads for selected CopyAtom: {tiled} is not a multiple of {atom}")]
    TooFewThreads { tiled: i64, atom: i64 },

    #[error("TiledCopy uses too few values for selected CopyAtom: {tiled} is not a multiple of {atom}")]
    TooFewValues { tiled: i64, atom: i64 },

    /// The TV layout reaches past the last element of the tile.
    #[error("TV layout {layout_tv} addresses index {index}, outside tile {tiler} of {size} elements")]
    OutOfTile {
        layout_tv: String,
        tiler: String,
        index: i64,
        size: i64,
    },

    /// The TV layout leaves part of the tile without an owner.
    #[error("TV layout {layout_tv} covers only {covered} of the {size} elements of tile {tiler}")]
    IncompleteCover {
        layout_tv: String,
        tiler: String,
        covered: i64,
        size: i64,
    },

    /// The layout spans more elements than an `i64` can index.
    #[error("layout {layout} is too large: its size or extent overflows i64")]
    SizeOverflow { layout: String },

    #[error("tile index {index} is owned by more than one (thread, value) pair")]
    DuplicateIndex { index: i64 },
}

impl LayoutError {
    pub(crate) fn not_congruent(shape: &IntTuple, stride: &IntTuple) -> Self {
        Self::NotCongruent {
            shape: shape.to_string(),
            stride: stride.to_string(),
        }
    }

    pub(crate) fn rank(op: &'static str, expected: usize, layout: &Layout) -> Self {
        Self::Rank {
            op,
            expected,
            layout: layout.to_string(),
        }
    }
}

/// Errors surfaced by [`crate::visualize`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TvLayoutError {
    /// Some shape is not positive or some stride is negative.
    ///
    /// Deliberately carries no field-level detail.
    #[error("Invalid parameters")]
    InvalidParameter,

    /// The validated layouts cannot be composed into a tiled copy.
    #[error(transparent)]
    CompositionFailure(#[from] LayoutError),

    #[error("failed to write rendering: {0}")]
    Render(#[from] std::fmt::Error),
}

impl TvLayoutError {
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter)
    }
}
