//! Visualization requests and their validation.

use std::fmt::{self, Write};

use crate::copy::CopyAtom;
use crate::error::{Result, TvLayoutError};
use crate::layout::{make_layout, Layout, LayoutResult};

/// Tile covered by one copy when the caller does not pick one.
pub const DEFAULT_TILER: (i64, i64) = (4, 128);
/// Half-precision elements.
pub const DEFAULT_ELEMENT_WIDTH_BITS: u32 = 16;
/// A 16-byte universal copy.
pub const DEFAULT_COPY_WIDTH_BITS: u32 = 128;

/// One 2-D affine layout, `(m, n):(sm, sn)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutDescriptor {
    pub shape: (i64, i64),
    pub stride: (i64, i64),
}

impl LayoutDescriptor {
    pub fn new(shape: (i64, i64), stride: (i64, i64)) -> Self {
        Self { shape, stride }
    }

    fn is_valid(&self) -> bool {
        self.shape.0 > 0 && self.shape.1 > 0 && self.stride.0 >= 0 && self.stride.1 >= 0
    }

    pub fn to_layout(&self) -> Layout {
        Layout::new(self.shape, Some(self.stride.into()))
    }
}

/// Full input of one visualization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TvLayoutRequest {
    pub thread_layout: LayoutDescriptor,
    pub value_layout: LayoutDescriptor,
    pub tile_shape: (i64, i64),
    pub element_width_bits: u32,
    pub copy_width_bits: u32,
}

impl TvLayoutRequest {
    /// A request over the default tiler and a 128-bit copy of 16-bit elements.
    pub fn new(thread_layout: LayoutDescriptor, value_layout: LayoutDescriptor) -> Self {
        Self {
            thread_layout,
            value_layout,
            tile_shape: DEFAULT_TILER,
            element_width_bits: DEFAULT_ELEMENT_WIDTH_BITS,
            copy_width_bits: DEFAULT_COPY_WIDTH_BITS,
        }
    }

    #[must_use]
    pub fn with_tile_shape(mut self, m: i64, n: i64) -> Self {
        self.tile_shape = (m, n);
        self
    }

    #[must_use]
    pub fn with_element_width_bits(mut self, bits: u32) -> Self {
        self.element_width_bits = bits;
        self
    }

    #[must_use]
    pub fn with_copy_width_bits(mut self, bits: u32) -> Self {
        self.copy_width_bits = bits;
        self
    }

    /// Reject the request if any shape is not positive, any stride is
    /// negative, or a bit width is zero. The error names no field.
    pub fn validate(&self) -> Result<ValidatedRequest> {
        let valid = self.thread_layout.is_valid()
            && self.value_layout.is_valid()
            && self.tile_shape.0 > 0
            && self.tile_shape.1 > 0
            && self.element_width_bits > 0
            && self.copy_width_bits > 0;
        if !valid {
            return Err(TvLayoutError::InvalidParameter);
        }
        Ok(ValidatedRequest(*self))
    }
}

/// A request that passed [`TvLayoutRequest::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRequest(TvLayoutRequest);

impl ValidatedRequest {
    pub fn request(&self) -> &TvLayoutRequest {
        &self.0
    }

    pub fn thread_layout(&self) -> Layout {
        self.0.thread_layout.to_layout()
    }

    pub fn value_layout(&self) -> Layout {
        self.0.value_layout.to_layout()
    }

    /// ((thr_m,thr_n),(val_m,val_n)):((thr_sm,thr_sn),(val_sm,val_sn))
    pub fn layout_tv(&self) -> Layout {
        make_layout(&[&self.thread_layout(), &self.value_layout()])
    }

    /// (tile_m,tile_n), compact column-major.
    pub fn tiler(&self) -> Layout {
        Layout::new(self.0.tile_shape, None)
    }

    pub fn copy_atom(&self) -> LayoutResult<CopyAtom> {
        CopyAtom::universal(self.0.copy_width_bits, self.0.element_width_bits)
    }

    /// `%`-prefixed comment block echoing the configuration.
    pub fn write_config_block<W: Write>(&self, out: &mut W) -> fmt::Result {
        let r = &self.0;
        let (thr, val) = (r.thread_layout, r.value_layout);
        writeln!(out, "% Layout Configuration:")?;
        writeln!(out, "% Thread Shape: ({}, {})", thr.shape.0, thr.shape.1)?;
        writeln!(out, "% Thread Stride: ({}, {})", thr.stride.0, thr.stride.1)?;
        writeln!(out, "% Value Shape: ({}, {})", val.shape.0, val.shape.1)?;
        writeln!(out, "% Value Stride: ({}, {})", val.stride.0, val.stride.1)?;
        writeln!(out, "% Tiler: ({}, {})", r.tile_shape.0, r.tile_shape.1)?;
        if r.copy_width_bits % 8 == 0 {
            writeln!(
                out,
                "% Copy Size: {} bits ({} bytes)",
                r.copy_width_bits,
                r.copy_width_bits / 8
            )?;
        } else {
            writeln!(out, "% Copy Size: {} bits", r.copy_width_bits)?;
        }
        writeln!(out, "% Element Size: {} bits", r.element_width_bits)
    }
}
