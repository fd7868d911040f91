use tvlayout::{int, make_layout, CopyAtom, Layout, LayoutError, TiledCopy};

// 64 threads of (4,16):(1,32), 8 values each of (1,8):(1,4), over a 4x128 tile
fn canonical_tv() -> Layout {
    let thr = Layout::new(int!(4, 16), Some(int!(1, 32)));
    let val = Layout::new(int!(1, 8), Some(int!(1, 4)));
    make_layout(&[&thr, &val])
}

fn tiler(m: i64, n: i64) -> Layout {
    Layout::new(int!(m, n), None)
}

fn half_atom() -> CopyAtom {
    CopyAtom::universal(128, 16).unwrap()
}

#[test]
fn test_copy_atom_layouts() {
    let atom = half_atom();
    assert_eq!(atom.num_threads(), 1);
    assert_eq!(atom.num_values(), 8);
    assert_eq!(atom.thr_id().to_string(), "1:1");
    assert_eq!(atom.val_layout_src().to_string(), "(1,8):(0,1)");
    assert_eq!(atom.val_layout_dst(), atom.val_layout_src());
    assert_eq!(atom.copy_width_bits(), 128);
    assert_eq!(atom.element_width_bits(), 16);
}

#[test]
fn test_tiled_copy_canonical() {
    let copy = TiledCopy::new(half_atom(), canonical_tv(), tiler(4, 128)).unwrap();

    assert_eq!(copy.tiled_num_threads(), 64);
    assert_eq!(copy.tiled_num_values(), 8);
    assert_eq!(copy.layout_src_tv().to_string(), "((4,16),8):((1,32),4)");
    assert_eq!(copy.layout_src_mn().to_string(), "(4,(8,16)):(1,(64,4))");
    assert_eq!(copy.layout_dst_mn(), copy.layout_src_mn());
    assert_eq!(copy.thr_id().to_string(), "64:1");
    assert_eq!(copy.tiler().to_string(), "(4,128):(1,4)");
}

#[test]
fn test_layout_mn_inverts_layout_tv() {
    let copy = TiledCopy::new(half_atom(), canonical_tv(), tiler(4, 128)).unwrap();
    let tv = copy.layout_tv();
    let mn = copy.layout_src_mn();
    let tile = copy.tiler();
    let num_thr = copy.tiled_num_threads();

    for m in 0..4i64 {
        for n in 0..128i64 {
            let idx = mn.call(&int!(m, n));
            let (thr, val) = (idx % num_thr, idx / num_thr);
            assert_eq!(tv.call(&int!(thr, val)), tile.call(&int!(m, n)));
        }
    }
}

#[test]
fn test_thread_ownership_in_tile() {
    let copy = TiledCopy::new(half_atom(), canonical_tv(), tiler(4, 128)).unwrap();
    let mn = copy.layout_src_mn();

    // thread 0 owns the first 8 columns of row 0, thread 4 the next 8
    for n in 0..8i64 {
        assert_eq!(mn.call(&int!(0, n)), 64 * n);
        assert_eq!(mn.call(&int!(0, n + 8)), 4 + 64 * n);
    }
    // thread 1 sits on row 1
    assert_eq!(mn.call(&int!(1, 0)), 1);
}

#[test]
fn test_tile2thrfrg_on_tiled_copy() {
    let copy = TiledCopy::new(half_atom(), canonical_tv(), tiler(4, 128)).unwrap();
    let regrouped = copy.tile2thrfrg(&canonical_tv()).unwrap();
    assert_eq!(&regrouped, copy.layout_src_tv());
}

#[test]
fn test_wider_elements_need_fewer_values() {
    // 32-bit elements: a 128-bit atom moves 4 of them
    let atom = CopyAtom::universal(128, 32).unwrap();
    let thr = Layout::new(int!(4, 16), Some(int!(1, 16)));
    let val = Layout::new(int!(1, 4), Some(int!(1, 4)));
    let copy = TiledCopy::new(atom, make_layout(&[&thr, &val]), tiler(4, 64)).unwrap();

    assert_eq!(copy.layout_src_tv().to_string(), "((4,16),4):((1,16),4)");
    assert_eq!(copy.layout_src_mn().to_string(), "(4,(4,16)):(1,(64,4))");
}

#[test]
fn test_too_few_values() {
    let thr = Layout::new(int!(4, 4), Some(int!(1, 4)));
    let val = Layout::new(int!(2, 2), Some(int!(4, 1)));
    let err = TiledCopy::new(half_atom(), make_layout(&[&thr, &val]), tiler(4, 128)).unwrap_err();

    assert_eq!(err, LayoutError::TooFewValues { tiled: 4, atom: 8 });
    assert_eq!(
        err.to_string(),
        "TiledCopy uses too few values for selected CopyAtom: 4 is not a multiple of 8"
    );
}

#[test]
fn test_layout_outside_tile() {
    let err = TiledCopy::new(half_atom(), canonical_tv(), tiler(3, 5)).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::OutOfTile {
            index: 511,
            size: 15,
            ..
        }
    ));
}

#[test]
fn test_layout_does_not_cover_tile() {
    let err = TiledCopy::new(half_atom(), canonical_tv(), tiler(8, 128)).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::IncompleteCover {
            covered: 512,
            size: 1024,
            ..
        }
    ));
}

#[test]
fn test_rank_checks() {
    let flat = Layout::new(64i64, None);
    assert!(matches!(
        TiledCopy::new(half_atom(), flat, tiler(4, 128)),
        Err(LayoutError::Rank { .. })
    ));
    assert!(matches!(
        TiledCopy::new(half_atom(), canonical_tv(), Layout::new(512i64, None)),
        Err(LayoutError::Rank { .. })
    ));
}
