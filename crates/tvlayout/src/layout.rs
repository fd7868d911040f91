//! CuTe-style hierarchical layouts: the algebra a tiled copy is assembled from.
//!
//! A [`Layout`] is a function from coordinates to indices, written
//! `shape:stride`, e.g. `(4,(8,16)):(1,(64,4))`. Everything is evaluated
//! at runtime on plain `i64` tuples; see NVIDIA CUTLASS for the reference
//! semantics.

use std::fmt::{self, Display};

use crate::error::LayoutError;

/// Result of a fallible layout-algebra operation.
pub type LayoutResult<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntTuple {
    Int(i64),
    Tuple(Vec<IntTuple>),
}

impl IntTuple {
    /// Top-level arity; an Int counts as one.
    pub fn rank(&self) -> usize {
        match self {
            IntTuple::Int(_) => 1,
            IntTuple::Tuple(v) => v.len(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            IntTuple::Int(_) => 0,
            IntTuple::Tuple(v) => 1 + v.iter().map(IntTuple::depth).max().unwrap_or(0),
        }
    }

    /// Number of coordinates the tuple spans.
    pub fn size(&self) -> i64 {
        match self {
            IntTuple::Int(n) => *n,
            IntTuple::Tuple(v) => v.iter().map(IntTuple::size).product(),
        }
    }

    /// [`IntTuple::size`], or `None` if the product does not fit an `i64`.
    pub fn checked_size(&self) -> Option<i64> {
        match self {
            IntTuple::Int(n) => Some(*n),
            IntTuple::Tuple(v) => v
                .iter()
                .try_fold(1i64, |acc, x| acc.checked_mul(x.checked_size()?)),
        }
    }

    pub fn flatten(&self) -> Vec<i64> {
        match self {
            IntTuple::Int(n) => vec![*n],
            IntTuple::Tuple(v) => v.iter().flat_map(IntTuple::flatten).collect(),
        }
    }

    /// Element `i` of a tuple. An Int behaves as a rank-1 tuple holding itself.
    ///
    /// Panics if `i` is out of range.
    pub fn get(&self, i: usize) -> &IntTuple {
        match self {
            IntTuple::Int(_) if i == 0 => self,
            IntTuple::Int(_) => panic!("index {i} out of range for an Int"),
            IntTuple::Tuple(v) => &v[i],
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, IntTuple::Int(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            IntTuple::Int(n) => Some(*n),
            IntTuple::Tuple(_) => None,
        }
    }

    /// `(4,2)` -> `((4,2))`
    pub fn wrap(self) -> IntTuple {
        IntTuple::Tuple(vec![self])
    }

    /// True when both tuples have the same nesting profile.
    pub fn congruent(&self, other: &IntTuple) -> bool {
        match (self, other) {
            (IntTuple::Int(_), IntTuple::Int(_)) => true,
            (IntTuple::Tuple(a), IntTuple::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.congruent(y))
            }
            _ => false,
        }
    }
}

impl Display for IntTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntTuple::Int(n) => write!(f, "{n}"),
            IntTuple::Tuple(v) => {
                write!(f, "(")?;
                for (i, x) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<i64> for IntTuple {
    fn from(n: i64) -> Self {
        IntTuple::Int(n)
    }
}

impl From<(i64, i64)> for IntTuple {
    fn from((a, b): (i64, i64)) -> Self {
        IntTuple::Tuple(vec![IntTuple::Int(a), IntTuple::Int(b)])
    }
}

impl From<&IntTuple> for IntTuple {
    fn from(t: &IntTuple) -> Self {
        t.clone()
    }
}

impl<T: Into<IntTuple>, const N: usize> From<[T; N]> for IntTuple {
    fn from(arr: [T; N]) -> Self {
        IntTuple::Tuple(arr.into_iter().map(Into::into).collect())
    }
}

/// `int!(4, int!(8, 16))` builds `(4,(8,16))`; a single argument converts as-is.
#[macro_export]
macro_rules! int {
    ($e:expr) => { $crate::layout::IntTuple::from($e) };
    ($($e:expr),+ $(,)?) => { $crate::layout::IntTuple::Tuple(vec![$( $crate::int!($e) ),+]) };
}

/// Coordinates are IntTuples too.
#[macro_export]
macro_rules! make_coord {
    ($($e:expr),+ $(,)?) => { $crate::int!($($e),+) };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub shape: IntTuple,
    pub stride: IntTuple,
}

impl Layout {
    /// `stride: None` means compact column-major.
    pub fn new(shape: impl Into<IntTuple>, stride: Option<IntTuple>) -> Self {
        let shape = shape.into();
        let stride = stride.unwrap_or_else(|| compact_col_major(&shape));
        Layout { shape, stride }
    }

    /// Like [`Layout::new`] with an explicit stride, rejecting non-congruent pairs.
    pub fn try_new(shape: impl Into<IntTuple>, stride: impl Into<IntTuple>) -> LayoutResult<Self> {
        let shape = shape.into();
        let stride = stride.into();
        if !shape.congruent(&stride) {
            return Err(LayoutError::not_congruent(&shape, &stride));
        }
        Ok(Layout { shape, stride })
    }

    pub fn call(&self, coord: &IntTuple) -> i64 {
        crd2idx(coord, &self.shape, &self.stride)
    }

    /// Evaluate at a flat (colexicographic) index.
    pub fn call_1d(&self, idx: i64) -> i64 {
        crd2idx(idx, &self.shape, &self.stride)
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn size(&self) -> i64 {
        self.shape.size()
    }

    /// One past the largest index the layout produces.
    pub fn cosize(&self) -> i64 {
        cosize_impl(&self.shape, &self.stride)
    }

    /// Fails with [`LayoutError::SizeOverflow`] unless both the size and the
    /// largest index of the layout fit an `i64`. Once this holds, evaluating
    /// the layout at any in-range coordinate cannot overflow.
    pub fn check_extent(&self) -> LayoutResult<()> {
        match (
            self.shape.checked_size(),
            checked_cosize_impl(&self.shape, &self.stride),
        ) {
            (Some(_), Some(_)) => Ok(()),
            _ => Err(LayoutError::SizeOverflow {
                layout: self.to_string(),
            }),
        }
    }

    /// Sublayout for mode i.
    pub fn mode(&self, i: usize) -> Layout {
        Layout {
            shape: self.shape.get(i).clone(),
            stride: self.stride.get(i).clone(),
        }
    }

    /// ((2,3),5,7):((1,2),6,30) -> (2,3,5,7):(1,2,6,30)
    pub fn flatten(&self) -> Layout {
        let to_tuple = |v: Vec<i64>| IntTuple::Tuple(v.into_iter().map(IntTuple::Int).collect());
        Layout {
            shape: to_tuple(self.shape.flatten()),
            stride: to_tuple(self.stride.flatten()),
        }
    }

    /// Reinterpret the domain of this layout with a new (compact) shape.
    /// Equivalent to `composition(self, make_layout(shape))`.
    pub fn with_shape(&self, shape: impl Into<IntTuple>) -> LayoutResult<Layout> {
        composition(self, &Layout::new(shape, None))
    }
}

/// Nest layouts as the modes of a new one: `(a.shape,b.shape):(a.stride,b.stride)`.
pub fn make_layout(layouts: &[&Layout]) -> Layout {
    let shapes: Vec<IntTuple> = layouts.iter().map(|l| l.shape.clone()).collect();
    let strides: Vec<IntTuple> = layouts.iter().map(|l| l.stride.clone()).collect();
    Layout {
        shape: IntTuple::Tuple(shapes),
        stride: IntTuple::Tuple(strides),
    }
}

impl Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.shape, self.stride)
    }
}

/// Per-mode tiler, printed `<l0, l1, ...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile(pub Vec<Layout>);

impl Tile {
    pub fn new(layouts: Vec<Layout>) -> Self {
        Tile(layouts)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::ops::Index<usize> for Tile {
    type Output = Layout;
    fn index(&self, i: usize) -> &Self::Output {
        &self.0[i]
    }
}

impl Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        for (i, l) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{l}")?;
        }
        write!(f, ">")
    }
}

#[macro_export]
macro_rules! tile {
    ($($layout:expr),+ $(,)?) => {
        $crate::layout::Tile::new(vec![$($layout),+])
    };
}

fn cosize_impl(shape: &IntTuple, stride: &IntTuple) -> i64 {
    match (shape, stride) {
        (IntTuple::Int(0), _) => 0,
        (IntTuple::Int(s), IntTuple::Int(d)) => (s - 1) * d + 1,
        (IntTuple::Tuple(shapes), IntTuple::Tuple(strides)) => {
            let max_idx: i64 = shapes
                .iter()
                .zip(strides)
                .map(|(s, d)| cosize_impl(s, d) - 1)
                .sum();
            max_idx + 1
        }
        _ => panic!("shape and stride must have matching structure"),
    }
}

fn checked_cosize_impl(shape: &IntTuple, stride: &IntTuple) -> Option<i64> {
    match (shape, stride) {
        (IntTuple::Int(0), _) => Some(0),
        (IntTuple::Int(s), IntTuple::Int(d)) => (s - 1).checked_mul(*d)?.checked_add(1),
        (IntTuple::Tuple(shapes), IntTuple::Tuple(strides)) => shapes
            .iter()
            .zip(strides)
            .try_fold(0i64, |acc, (s, d)| {
                acc.checked_add(checked_cosize_impl(s, d)? - 1)
            })?
            .checked_add(1),
        _ => None,
    }
}

/// Index of `coord` under `shape:stride`.
///
/// An integral coordinate fed to a tuple mode is split colexicographically,
/// so `crd2idx(16, ..)`, `crd2idx(make_coord!(1, 5), ..)` and the fully
/// nested coordinate all agree.
pub fn crd2idx(coord: impl Into<IntTuple>, shape: &IntTuple, stride: &IntTuple) -> i64 {
    crd2idx_impl(&coord.into(), shape, stride)
}

fn crd2idx_impl(coord: &IntTuple, shape: &IntTuple, stride: &IntTuple) -> i64 {
    match (coord, shape, stride) {
        (IntTuple::Int(c), IntTuple::Int(_), IntTuple::Int(d)) => c * d,

        // Integral coordinate into a tuple shape: split colexicographically
        (IntTuple::Int(c), IntTuple::Tuple(shapes), IntTuple::Tuple(strides)) => {
            let mut result = 0i64;
            let mut remaining = *c;
            let last = shapes.len().saturating_sub(1);
            for (i, (s, d)) in shapes.iter().zip(strides).enumerate() {
                let mode_size = s.size();
                // the last mode absorbs whatever is left over
                let mode_coord = if i == last {
                    remaining
                } else {
                    remaining % mode_size
                };
                remaining /= mode_size;
                result += crd2idx_impl(&IntTuple::Int(mode_coord), s, d);
            }
            result
        }

        (IntTuple::Tuple(coords), IntTuple::Tuple(shapes), IntTuple::Tuple(strides)) => coords
            .iter()
            .zip(shapes)
            .zip(strides)
            .map(|((c, s), d)| crd2idx_impl(c, s, d))
            .sum(),

        _ => panic!("mismatched structures in crd2idx"),
    }
}

/// Natural (fully nested) coordinate of an index, or of any partially
/// nested coordinate, within `shape`.
pub fn idx2crd(input: impl Into<IntTuple>, shape: &IntTuple) -> IntTuple {
    let stride = compact_col_major(shape);
    idx2crd_with_stride(crd2idx(input, shape, &stride), shape, &stride)
}

/// Coordinate whose digits are `(idx / stride) % shape`; broadcast modes read 0.
pub fn idx2crd_with_stride(idx: i64, shape: &IntTuple, stride: &IntTuple) -> IntTuple {
    match (shape, stride) {
        (IntTuple::Int(1), _) | (IntTuple::Int(_), IntTuple::Int(0)) => IntTuple::Int(0),
        (IntTuple::Int(s), IntTuple::Int(d)) => IntTuple::Int((idx / d) % s),
        (IntTuple::Tuple(shapes), IntTuple::Tuple(strides)) => IntTuple::Tuple(
            shapes
                .iter()
                .zip(strides)
                .map(|(s, d)| idx2crd_with_stride(idx, s, d))
                .collect(),
        ),
        _ => panic!("mismatched structures in idx2crd"),
    }
}

/// Compact column-major strides: `(4,(8,16))` -> `(1,(4,32))`.
pub fn compact_col_major(shape: &IntTuple) -> IntTuple {
    compact_col_major_inner(shape, 1)
}

fn compact_col_major_inner(shape: &IntTuple, current: i64) -> IntTuple {
    match shape {
        IntTuple::Int(_) => IntTuple::Int(current),
        IntTuple::Tuple(shapes) => {
            let mut strides = Vec::with_capacity(shapes.len());
            let mut stride = current;
            for s in shapes {
                strides.push(compact_col_major_inner(s, stride));
                // saturates only past the last mode of an oversized shape
                stride = stride.saturating_mul(s.checked_size().unwrap_or(i64::MAX));
            }
            IntTuple::Tuple(strides)
        }
    }
}

fn from_flat_modes(shapes: Vec<i64>, strides: Vec<i64>) -> Layout {
    match shapes.len() {
        0 => Layout::new(1i64, Some(IntTuple::Int(0))),
        1 => Layout::new(shapes[0], Some(IntTuple::Int(strides[0]))),
        _ => Layout {
            shape: IntTuple::Tuple(shapes.into_iter().map(IntTuple::Int).collect()),
            stride: IntTuple::Tuple(strides.into_iter().map(IntTuple::Int).collect()),
        },
    }
}

/// Same function, fewest flat modes: size-1 modes go, and `s0:d0, s1:d1`
/// merge whenever `s0 * d0 == d1`.
pub fn coalesce(layout: &Layout) -> Layout {
    let flat_shapes = layout.shape.flatten();
    let flat_strides = layout.stride.flatten();

    let mut result_shapes: Vec<i64> = Vec::new();
    let mut result_strides: Vec<i64> = Vec::new();

    // Right to left, so merges always target the front
    for (&curr_shape, &curr_stride) in flat_shapes.iter().zip(&flat_strides).rev() {
        if curr_shape == 1 {
            continue;
        }

        match result_strides.first() {
            Some(&prev_stride) if curr_shape * curr_stride == prev_stride => {
                result_shapes[0] *= curr_shape;
                result_strides[0] = curr_stride;
            }
            Some(_) => {
                result_shapes.insert(0, curr_shape);
                result_strides.insert(0, curr_stride);
            }
            None => {
                result_shapes.push(curr_shape);
                result_strides.push(curr_stride);
            }
        }
    }

    from_flat_modes(result_shapes, result_strides)
}

/// [`coalesce`] each mode that `profile` marks with an integer, recursing into tuples.
pub fn coalesce_by_mode(layout: &Layout, profile: &IntTuple) -> Layout {
    match profile {
        IntTuple::Int(_) => coalesce(layout),
        IntTuple::Tuple(profile_modes) => {
            let (shapes, strides): (Vec<_>, Vec<_>) = profile_modes
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let sub = coalesce_by_mode(&layout.mode(i), p);
                    (sub.shape, sub.stride)
                })
                .unzip();
            Layout {
                shape: IntTuple::Tuple(shapes),
                stride: IntTuple::Tuple(strides),
            }
        }
    }
}

pub fn filter_zeros(layout: &Layout) -> Layout {
    fn filter_z(shape: &IntTuple, stride: &IntTuple) -> (IntTuple, IntTuple) {
        match (shape, stride) {
            (IntTuple::Int(_), IntTuple::Int(0)) => (IntTuple::Int(1), IntTuple::Int(0)),
            (IntTuple::Tuple(shapes), IntTuple::Tuple(strides)) => {
                let (new_shapes, new_strides): (Vec<_>, Vec<_>) = shapes
                    .iter()
                    .zip(strides)
                    .map(|(s, d)| filter_z(s, d))
                    .unzip();
                (IntTuple::Tuple(new_shapes), IntTuple::Tuple(new_strides))
            }
            _ => (shape.clone(), stride.clone()),
        }
    }

    let (shape, stride) = filter_z(&layout.shape, &layout.stride);
    Layout { shape, stride }
}

pub fn filter_layout(layout: &Layout) -> Layout {
    coalesce(&filter_zeros(layout))
}

fn ceil_div(a: i64, b: i64) -> i64 {
    (a + b - 1) / b
}

/// Layout over the indices `< cotarget` that `layout` misses, ordered so
/// `(layout, complement)` is injective.
pub fn complement(layout: &Layout, cotarget: Option<i64>) -> Layout {
    let cotarget = cotarget.unwrap_or_else(|| layout.cosize());
    let filtered = filter_layout(layout);

    let flat_shapes = filtered.shape.flatten();
    let flat_strides = filtered.stride.flatten();

    if filtered.size() == 0 || flat_strides.iter().all(|&s| s == 0) {
        return Layout::new(cotarget, None);
    }

    let mut modes: Vec<_> = flat_shapes.into_iter().zip(flat_strides).collect();
    modes.sort_by_key(|&(_, s)| s.abs());

    let mut result_shapes = Vec::new();
    let mut result_strides = Vec::new();
    let mut prev_end = 1i64;

    for (shape, stride) in modes {
        if stride == 0 {
            continue;
        }

        let abs_stride = stride.abs();
        if abs_stride > prev_end {
            let gap_size = abs_stride / prev_end;
            if gap_size > 1 {
                result_shapes.push(gap_size);
                result_strides.push(prev_end);
            }
        }

        prev_end = abs_stride * shape;
    }

    if prev_end < cotarget {
        let remaining = ceil_div(cotarget, prev_end);
        if remaining > 1 {
            result_shapes.push(remaining);
            result_strides.push(prev_end);
        }
    }

    from_flat_modes(result_shapes, result_strides)
}

/// Right inverse R of a layout L: L(R(i)) == i for every i in [0, size(R)).
///
/// Only the contiguous prefix of the image starting at 0 is inverted; stride-0
/// (broadcast) modes never contribute.
pub fn right_inverse(layout: &Layout) -> Layout {
    let flat_shapes = layout.shape.flatten();
    let flat_strides = layout.stride.flatten();

    // stride of each mode inside the (colexicographic) domain
    let mut domain_strides = Vec::with_capacity(flat_shapes.len());
    let mut acc = 1i64;
    for &s in &flat_shapes {
        domain_strides.push(acc);
        acc *= s;
    }

    let mut modes: Vec<(i64, i64, i64)> = flat_strides
        .iter()
        .zip(&flat_shapes)
        .zip(&domain_strides)
        .map(|((&d, &s), &r)| (d, s, r))
        .collect();
    modes.sort_unstable();

    let mut result_shapes = Vec::new();
    let mut result_strides = Vec::new();
    let mut next_index = 1i64;

    for (stride, shape, domain_stride) in modes {
        if shape == 1 || stride == 0 {
            continue;
        }
        if stride != next_index {
            break;
        }
        result_shapes.push(shape);
        result_strides.push(domain_stride);
        next_index = shape * stride;
    }

    coalesce(&from_flat_modes(result_shapes, result_strides))
}

/// Functional composition of layouts: result(c) = lhs(rhs(c)).
///
/// Fails when `rhs` does not satisfy the stride or shape divisibility
/// conditions against the modes of `lhs`.
pub fn composition(lhs: &Layout, rhs: &Layout) -> LayoutResult<Layout> {
    let lhs_flat = coalesce(lhs);

    let (rhs_shape, rhs_stride) = match (&rhs.shape, &rhs.stride) {
        // Tuple RHS distributes over its modes
        (IntTuple::Tuple(shapes), IntTuple::Tuple(strides)) => {
            let mut new_shapes = Vec::with_capacity(shapes.len());
            let mut new_strides = Vec::with_capacity(strides.len());
            for (s, d) in shapes.iter().zip(strides) {
                let sub_rhs = Layout {
                    shape: s.clone(),
                    stride: d.clone(),
                };
                let sub = composition(&lhs_flat, &sub_rhs)?;
                new_shapes.push(sub.shape);
                new_strides.push(sub.stride);
            }
            return Ok(Layout {
                shape: IntTuple::Tuple(new_shapes),
                stride: IntTuple::Tuple(new_strides),
            });
        }
        (IntTuple::Int(s), IntTuple::Int(d)) => (*s, *d),
        _ => return Err(LayoutError::not_congruent(&rhs.shape, &rhs.stride)),
    };

    if rhs_stride == 0 {
        return Ok(Layout::new(rhs_shape, Some(IntTuple::Int(0))));
    }

    if let (IntTuple::Int(_), IntTuple::Int(lhs_stride)) = (&lhs_flat.shape, &lhs_flat.stride) {
        return Ok(Layout::new(
            rhs_shape,
            Some(IntTuple::Int(rhs_stride * lhs_stride)),
        ));
    }

    // LHS is a flat tuple, RHS is integral
    let lhs_shapes = lhs_flat.shape.flatten();
    let lhs_strides = lhs_flat.stride.flatten();
    let last = lhs_shapes.len() - 1;

    let mut result_shapes = Vec::new();
    let mut result_strides = Vec::new();
    let mut rest_shape = rhs_shape;
    let mut rest_stride = rhs_stride;

    for (&curr_shape, &curr_stride) in lhs_shapes[..last].iter().zip(&lhs_strides[..last]) {
        let abs_stride = rest_stride.abs();
        if rest_shape > 1 && curr_shape % abs_stride != 0 && abs_stride % curr_shape != 0 {
            return Err(LayoutError::StrideDivisibility {
                shape: curr_shape,
                stride: rest_stride,
            });
        }

        let next_shape = ceil_div(curr_shape, abs_stride);
        let mut next_stride = ceil_div(abs_stride, curr_shape) * rest_stride.signum();
        if next_stride == 0 {
            next_stride = 1;
        }

        if next_shape <= 1 || rest_shape <= 1 {
            rest_stride = next_stride;
        } else {
            let new_shape = next_shape.min(rest_shape);
            if rest_shape % new_shape != 0 {
                return Err(LayoutError::ShapeDivisibility {
                    shape: rest_shape,
                    divisor: new_shape,
                });
            }
            result_shapes.push(new_shape);
            result_strides.push(rest_stride * curr_stride);
            rest_shape /= new_shape;
            rest_stride = next_stride;
        }
    }

    if rest_shape > 1 {
        result_shapes.push(rest_shape);
        result_strides.push(rest_stride * lhs_strides[last]);
    }

    Ok(from_flat_modes(result_shapes, result_strides))
}

/// Compose mode `i` of `lhs` with `tile[i]`; remaining modes pass through.
pub fn composition_with_tile(lhs: &Layout, tile: &Tile) -> LayoutResult<Layout> {
    if lhs.shape.is_int() || lhs.rank() < tile.len() {
        return Err(LayoutError::rank("composition_with_tile", tile.len(), lhs));
    }

    let (shapes, strides): (Vec<_>, Vec<_>) = (0..lhs.rank())
        .map(|i| {
            let mode_layout = lhs.mode(i);
            let composed = if i < tile.len() {
                composition(&mode_layout, &tile[i])?
            } else {
                mode_layout
            };
            Ok((composed.shape, composed.stride))
        })
        .collect::<LayoutResult<Vec<_>>>()?
        .into_iter()
        .unzip();

    Ok(Layout {
        shape: IntTuple::Tuple(shapes),
        stride: IntTuple::Tuple(strides),
    })
}

/// `(tile, rest)`: `layout` composed with `tiler` and its complement.
pub fn logical_divide(layout: &Layout, tiler: &Layout) -> LayoutResult<Layout> {
    let coal_layout = coalesce(layout);
    let cotarget = if coal_layout.size() > 0 {
        coal_layout.size()
    } else {
        tiler.size()
    };

    let comp = complement(tiler, Some(cotarget));
    composition(layout, &make_layout(&[tiler, &comp]))
}

pub fn logical_divide_with_tile(layout: &Layout, tile: &Tile) -> LayoutResult<Layout> {
    if layout.shape.is_int() || layout.rank() < tile.len() {
        return Err(LayoutError::rank("logical_divide", tile.len(), layout));
    }

    let (shapes, strides): (Vec<_>, Vec<_>) = (0..layout.rank())
        .map(|i| {
            let mode_layout = layout.mode(i);
            let divided = if i < tile.len() {
                logical_divide(&mode_layout, &tile[i])?
            } else {
                make_layout(&[&mode_layout])
            };
            Ok((divided.shape, divided.stride))
        })
        .collect::<LayoutResult<Vec<_>>>()?
        .into_iter()
        .unzip();

    Ok(Layout {
        shape: IntTuple::Tuple(shapes),
        stride: IntTuple::Tuple(strides),
    })
}

/// ((TileM,RestM),(TileN,RestN)) -> ((TileM,TileN),(RestM,RestN))
pub fn zipped_divide(layout: &Layout, tile: &Tile) -> LayoutResult<Layout> {
    let ld = logical_divide_with_tile(layout, tile)?;

    let mut tile_modes = Vec::new();
    let mut rest_modes = Vec::new();

    for i in 0..ld.rank() {
        let mode = ld.mode(i);
        if mode.rank() >= 2 {
            tile_modes.push(mode.mode(0));
            rest_modes.push(mode.mode(1));
        } else {
            tile_modes.push(mode);
        }
    }

    let tile_part = make_layout(&tile_modes.iter().collect::<Vec<_>>());
    let rest_part = make_layout(&rest_modes.iter().collect::<Vec<_>>());
    Ok(make_layout(&[&tile_part, &rest_part]))
}

/// Transpose the two outer modes of a rank-2-of-rank-2 layout.
/// ((a0,a1),(b0,b1)) => ((a0,b0),(a1,b1))
pub fn zip2(layout: &Layout) -> LayoutResult<Layout> {
    if layout.shape.is_int() || layout.rank() != 2 {
        return Err(LayoutError::rank("zip2", 2, layout));
    }
    let (a, b) = (layout.mode(0), layout.mode(1));
    if a.shape.is_int() || b.shape.is_int() || a.rank() != 2 || b.rank() != 2 {
        return Err(LayoutError::rank("zip2", 2, layout));
    }
    let first = make_layout(&[&a.mode(0), &b.mode(0)]);
    let second = make_layout(&[&a.mode(1), &b.mode(1)]);
    Ok(make_layout(&[&first, &second]))
}
