//! TV-layout visualizer - render how a tiled copy spreads a tile over
//! threads and values, as LaTeX.
//!
//! A thread layout `(m,n):(sm,sn)` and a value layout are nested into one
//! TV layout, tiled by a universal copy atom over an `(M,N)` tile, and the
//! resulting (m,n) -> (thread, value) map is drawn with TikZ.
//!
//! ```
//! use tvlayout::visualize_layout_tv;
//!
//! // 64 threads, 8 consecutive half-precision values each, over a 4x128 tile
//! let latex = visualize_layout_tv(4, 128, 4, 16, 1, 8, 1, 32, 1, 4).unwrap();
//! assert!(latex.contains("\\begin{tikzpicture}"));
//! assert!(!latex.contains("% Error"));
//! ```
//!
//! The layout algebra follows NVIDIA CuTe: https://github.com/NVIDIA/cutlass

pub mod copy;
pub mod error;
pub mod inverse;
pub mod latex;
pub mod layout;
pub mod logging;
pub mod request;
pub mod visualize;

pub use copy::{CopyAtom, TiledCopy};
pub use error::{LayoutError, Result, TvLayoutError};
pub use inverse::{
    make_inverse_tv, render_tv_grid, tiler_crd_to_layout_tv_crd, InverseTv, TvEntry,
};
pub use latex::{latex_string, print_latex, write_latex};
pub use layout::{
    coalesce, coalesce_by_mode, compact_col_major, complement, composition,
    composition_with_tile, crd2idx, filter_layout, filter_zeros, idx2crd, idx2crd_with_stride,
    logical_divide, logical_divide_with_tile, make_layout, right_inverse, zip2, zipped_divide,
    IntTuple, Layout, LayoutResult, Tile,
};
pub use logging::{init_logging, LogConfig, LogLevel};
pub use request::{
    LayoutDescriptor, TvLayoutRequest, ValidatedRequest, DEFAULT_COPY_WIDTH_BITS,
    DEFAULT_ELEMENT_WIDTH_BITS, DEFAULT_TILER,
};
pub use visualize::{compose, visualize, visualize_layout_tv, visualize_text};
