//! Inverse TV maps: who owns each element of a tile.

use std::collections::BTreeMap;

use crate::error::LayoutError;
use crate::int;
use crate::layout::{
    compact_col_major, crd2idx, idx2crd, idx2crd_with_stride, IntTuple, Layout, LayoutResult,
};

/// One (thread, value) pair landing on a tile element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TvEntry {
    pub thr_crd: IntTuple,
    pub val_crd: IntTuple,
    pub thr_idx: i64,
    pub val_idx: i64,
}

/// Tile index -> the (thread, value) pairs that map onto it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InverseTv(BTreeMap<i64, Vec<TvEntry>>);

impl InverseTv {
    /// Entries owning `index`; empty if nobody does.
    pub fn get(&self, index: i64) -> &[TvEntry] {
        self.0.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct tile indices reached.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &[TvEntry])> {
        self.0.iter().map(|(&k, v)| (k, v.as_slice()))
    }
}

/// Walk every (thread, value) of `layout_tv` and record where it lands.
///
/// Unless `maybe_duplicates` is set, two pairs landing on the same index is
/// an error.
pub fn make_inverse_tv(layout_tv: &Layout, maybe_duplicates: bool) -> LayoutResult<InverseTv> {
    if layout_tv.shape.is_int() || layout_tv.rank() != 2 {
        return Err(LayoutError::rank("make_inverse_tv", 2, layout_tv));
    }
    layout_tv.check_extent()?;
    let thr_shape = layout_tv.shape.get(0);
    let val_shape = layout_tv.shape.get(1);

    let mut inverse: BTreeMap<i64, Vec<TvEntry>> = BTreeMap::new();
    for thr_idx in 0..thr_shape.size() {
        let thr_crd = idx2crd(thr_idx, thr_shape);
        for val_idx in 0..val_shape.size() {
            let index = layout_tv.call(&int!(thr_idx, val_idx));
            let owners = inverse.entry(index).or_default();
            if !maybe_duplicates && !owners.is_empty() {
                return Err(LayoutError::DuplicateIndex { index });
            }
            owners.push(TvEntry {
                thr_crd: thr_crd.clone(),
                val_crd: idx2crd(val_idx, val_shape),
                thr_idx,
                val_idx,
            });
        }
    }
    Ok(InverseTv(inverse))
}

/// Translate an (m, n) coordinate of the tile into the TV coordinate whose
/// layout function produces the same index.
pub fn tiler_crd_to_layout_tv_crd(
    tiler_crd: (i64, i64),
    tiler_mn: (i64, i64),
    layout_tv_shape: &IntTuple,
    layout_tv_stride: &IntTuple,
) -> LayoutResult<IntTuple> {
    if !layout_tv_shape.congruent(layout_tv_stride) {
        return Err(LayoutError::not_congruent(layout_tv_shape, layout_tv_stride));
    }
    let tiler_shape = IntTuple::from(tiler_mn);
    let tiler_idx = crd2idx(
        IntTuple::from(tiler_crd),
        &tiler_shape,
        &compact_col_major(&tiler_shape),
    );
    Ok(idx2crd_with_stride(tiler_idx, layout_tv_shape, layout_tv_stride))
}

/// Plain-text table of the tile, each cell `T<thr>V<val>`.
///
/// Cells reached by several pairs list them joined by `|`; unreached cells
/// stay blank.
pub fn render_tv_grid(tiler_mn: (i64, i64), layout_tv: &Layout) -> LayoutResult<String> {
    let tiler = Layout::new(tiler_mn, None);
    tiler.check_extent()?;
    let inverse = make_inverse_tv(layout_tv, true)?;
    let (m_size, n_size) = (tiler_mn.0.max(0), tiler_mn.1.max(0));

    let mut cells = Vec::new();
    for m in 0..m_size {
        for n in 0..n_size {
            let label = inverse
                .get(tiler.call(&int!(m, n)))
                .iter()
                .map(|e| format!("T{}V{}", e.thr_idx, e.val_idx))
                .collect::<Vec<_>>()
                .join("|");
            cells.push(label);
        }
    }
    let width = cells
        .iter()
        .map(String::len)
        .chain(std::iter::once(n_size.to_string().len()))
        .max()
        .unwrap_or(1);

    let mut lines = vec![format!("{} <- {}", IntTuple::from(tiler_mn), layout_tv)];

    let mut header = "   ".to_string();
    for n in 0..n_size {
        header.push_str(&format!("{:>w$}", n, w = width + 3));
    }
    lines.push(header);

    let sep = "    +".to_string() + &format!("{}+", "-".repeat(width + 2)).repeat(n_size as usize);
    lines.push(sep.clone());

    for (m, row_cells) in cells.chunks(n_size.max(1) as usize).enumerate() {
        let mut row = format!("{m:>2}  |");
        for cell in row_cells {
            row.push_str(&format!("{:>w$} |", cell, w = width + 1));
        }
        lines.push(row);
        lines.push(sep.clone());
    }

    Ok(lines.join("\n"))
}
