//! Copy atoms and tiled copies.
//!
//! A [`CopyAtom`] is the smallest copy one thread issues (a universal copy of
//! `copy_width_bits`, moving `copy_width_bits / element_width_bits` values).
//! A [`TiledCopy`] repeats that atom across a TV layout and answers the
//! question the renderer asks: which (thread, value) owns tile element (m, n)?

use tracing::debug;

use crate::error::LayoutError;
use crate::layout::{
    coalesce_by_mode, composition, composition_with_tile, right_inverse, zip2, zipped_divide,
    Layout, LayoutResult, Tile,
};
use crate::{int, tile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyAtom {
    copy_width_bits: u32,
    element_width_bits: u32,
}

impl CopyAtom {
    /// Universal copy moving `copy_width_bits` per instruction over elements
    /// of `element_width_bits`.
    pub fn universal(copy_width_bits: u32, element_width_bits: u32) -> LayoutResult<Self> {
        if element_width_bits == 0
            || copy_width_bits == 0
            || copy_width_bits % element_width_bits != 0
        {
            return Err(LayoutError::CopyWidth {
                copy_bits: copy_width_bits,
                element_bits: element_width_bits,
            });
        }
        Ok(CopyAtom {
            copy_width_bits,
            element_width_bits,
        })
    }

    pub fn copy_width_bits(&self) -> u32 {
        self.copy_width_bits
    }

    pub fn element_width_bits(&self) -> u32 {
        self.element_width_bits
    }

    pub fn num_threads(&self) -> i64 {
        1
    }

    pub fn num_values(&self) -> i64 {
        i64::from(self.copy_width_bits / self.element_width_bits)
    }

    /// thr -> thr_idx
    pub fn thr_id(&self) -> Layout {
        Layout::new(self.num_threads(), None)
    }

    /// (thr,val) -> offset, in elements
    pub fn val_layout_src(&self) -> Layout {
        Layout::new(
            int!(self.num_threads(), self.num_values()),
            Some(int!(0, 1)),
        )
    }

    /// (thr,val) -> offset, in elements
    pub fn val_layout_dst(&self) -> Layout {
        self.val_layout_src()
    }

    /// Reference layout the source/destination layouts are expressed against.
    pub fn val_layout_ref(&self) -> Layout {
        self.val_layout_src()
    }
}

/// A copy atom tiled over a TV layout and an (M, N) tiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiledCopy {
    atom: CopyAtom,
    layout_tv: Layout,
    tiler: Layout,
    layout_src_tv: Layout,
    layout_src_mn: Layout,
    layout_dst_mn: Layout,
}

impl TiledCopy {
    /// Tile `atom` over `layout_tv` ((thr),(val)) -> tile index, within `tiler`.
    ///
    /// Fails unless the TV layout is a whole number of atoms and maps onto
    /// every element of the tile without leaving it. Layouts or tilers whose
    /// size overflows `i64` are rejected with [`LayoutError::SizeOverflow`].
    pub fn new(atom: CopyAtom, layout_tv: Layout, tiler: Layout) -> LayoutResult<Self> {
        if layout_tv.shape.is_int() || layout_tv.rank() != 2 {
            return Err(LayoutError::rank("TiledCopy layout_tv", 2, &layout_tv));
        }
        if tiler.shape.is_int() || tiler.rank() != 2 {
            return Err(LayoutError::rank("TiledCopy tiler", 2, &tiler));
        }
        layout_tv.check_extent()?;
        tiler.check_extent()?;

        let tiled_threads = layout_tv.mode(0).size();
        let tiled_values = layout_tv.mode(1).size();
        if tiled_threads % atom.num_threads() != 0 {
            return Err(LayoutError::TooFewThreads {
                tiled: tiled_threads,
                atom: atom.num_threads(),
            });
        }
        if tiled_values % atom.num_values() != 0 {
            return Err(LayoutError::TooFewValues {
                tiled: tiled_values,
                atom: atom.num_values(),
            });
        }

        let ref2src = composition(&right_inverse(&atom.val_layout_ref()), &atom.val_layout_src())?;
        let ref2dst = composition(&right_inverse(&atom.val_layout_ref()), &atom.val_layout_dst())?;

        let layout_src_tv = tile2thrfrg(&layout_tv, &atom, &ref2src)?;
        let layout_dst_tv = tile2thrfrg(&layout_tv, &atom, &ref2dst)?;
        let layout_src_mn = layout_mn(&layout_src_tv, &layout_tv, &tiler)?;
        let layout_dst_mn = layout_mn(&layout_dst_tv, &layout_tv, &tiler)?;

        debug!(
            layout_tv = %layout_tv,
            tiler = %tiler,
            layout_src_mn = %layout_src_mn,
            "tiled copy composed"
        );

        Ok(TiledCopy {
            atom,
            layout_tv,
            tiler,
            layout_src_tv,
            layout_src_mn,
            layout_dst_mn,
        })
    }

    pub fn atom(&self) -> &CopyAtom {
        &self.atom
    }

    pub fn layout_tv(&self) -> &Layout {
        &self.layout_tv
    }

    pub fn tiler(&self) -> &Layout {
        &self.tiler
    }

    pub fn tiled_num_threads(&self) -> i64 {
        self.layout_tv.mode(0).size()
    }

    pub fn tiled_num_values(&self) -> i64 {
        self.layout_tv.mode(1).size()
    }

    /// (thr_idx,val_idx) -> tile index
    pub fn layout_src_tv(&self) -> &Layout {
        &self.layout_src_tv
    }

    /// (m,n) -> thr_idx + tiled_num_threads * val_idx
    pub fn layout_src_mn(&self) -> &Layout {
        &self.layout_src_mn
    }

    /// (m,n) -> thr_idx + tiled_num_threads * val_idx
    pub fn layout_dst_mn(&self) -> &Layout {
        &self.layout_dst_mn
    }

    /// thrid -> thr_idx
    pub fn thr_id(&self) -> Layout {
        Layout::new(self.tiled_num_threads(), None)
    }

    /// Regroup any TV-shaped layout against this copy's atom, in source terms.
    pub fn tile2thrfrg(&self, layout_tv: &Layout) -> LayoutResult<Layout> {
        let ref2src = composition(
            &right_inverse(&self.atom.val_layout_ref()),
            &self.atom.val_layout_src(),
        )?;
        tile2thrfrg(layout_tv, &self.atom, &ref2src)
    }
}

/// Regroup the TV layout around the atom:
/// ((atom_tid,atom_val),(rest_tid,rest_val)) -> ((atom_tid,rest_tid),(atom_val,rest_val)),
/// with the atom part moved into the target (src or dst) layout.
fn tile2thrfrg(layout_tv: &Layout, atom: &CopyAtom, ref2trg: &Layout) -> LayoutResult<Layout> {
    let atom_tile = tile!(
        Layout::new(atom.num_threads(), None),
        Layout::new(atom.num_values(), None)
    );
    let atom_layout_tv = zipped_divide(layout_tv, &atom_tile)?;
    let trg_layout_tv = composition_with_tile(&atom_layout_tv, &Tile::new(vec![ref2trg.clone()]))?;
    let thrval2mn = zip2(&trg_layout_tv)?;
    Ok(coalesce_by_mode(&thrval2mn, &int!(1, 1)))
}

/// Invert (thr,val) -> tile index into (m,n) -> (thr,val), shaped by the tiler.
fn layout_mn(thrval2mn: &Layout, layout_tv: &Layout, tiler: &Layout) -> LayoutResult<Layout> {
    let size = tiler.size();

    let cosize = thrval2mn.cosize();
    if cosize > size {
        return Err(LayoutError::OutOfTile {
            layout_tv: layout_tv.to_string(),
            tiler: tiler.shape.to_string(),
            index: cosize - 1,
            size,
        });
    }

    let inverse = right_inverse(thrval2mn);
    if inverse.size() < size {
        return Err(LayoutError::IncompleteCover {
            layout_tv: layout_tv.to_string(),
            tiler: tiler.shape.to_string(),
            covered: inverse.size(),
            size,
        });
    }

    inverse.with_shape(tiler.shape.clone())
}
