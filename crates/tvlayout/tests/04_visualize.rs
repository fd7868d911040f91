use tvlayout::{
    int, latex_string, make_inverse_tv, make_layout, render_tv_grid, tiler_crd_to_layout_tv_crd,
    visualize, visualize_layout_tv, visualize_text, CopyAtom, Layout, LayoutDescriptor,
    LayoutError, TiledCopy, TvLayoutError, TvLayoutRequest,
};

const CANONICAL_CONFIG: &str = "\
% Layout Configuration:
% Thread Shape: (4, 16)
% Thread Stride: (1, 32)
% Value Shape: (1, 8)
% Value Stride: (1, 4)
% Tiler: (4, 128)
% Copy Size: 128 bits (16 bytes)
% Element Size: 16 bits
";

fn canonical() -> String {
    visualize_layout_tv(4, 128, 4, 16, 1, 8, 1, 32, 1, 4).unwrap()
}

#[test]
fn test_invalid_parameters() {
    let cases = [
        (0, 128, 4, 16, 1, 8, 1, 32, 1, 4),
        (4, -128, 4, 16, 1, 8, 1, 32, 1, 4),
        (4, 128, 0, 16, 1, 8, 1, 32, 1, 4),
        (4, 128, 4, 16, 1, -8, 1, 32, 1, 4),
        (4, 128, 4, 16, 1, 8, -1, 32, 1, 4),
        (4, 128, 4, 16, 1, 8, 1, 32, 1, -4),
    ];
    for (tm, tn, sm, sn, vm, vn, ssm, ssn, vsm, vsn) in cases {
        let err = visualize_layout_tv(tm, tn, sm, sn, vm, vn, ssm, ssn, vsm, vsn).unwrap_err();
        assert_eq!(err, TvLayoutError::InvalidParameter);
        assert_eq!(err.to_string(), "Invalid parameters");
    }
}

#[test]
fn test_valid_layout_renders_latex() {
    let out = canonical();

    assert!(out.starts_with(CANONICAL_CONFIG));
    assert!(!out.contains("% Error"));

    let body = &out[CANONICAL_CONFIG.len()..];
    assert!(body.starts_with(
        "% LayoutS: (4,(8,16)):(1,(64,4))\n\
         % ThrIDS : 64:1\n\
         % LayoutD: (4,(8,16)):(1,(64,4))\n\
         % ThrIDD : 64:1\n\
         \n\
         \\documentclass{standalone}\n"
    ));
    assert!(body.ends_with("\\end{tikzpicture}\n\\end{document}\n"));
}

#[test]
fn test_latex_boxes_and_labels() {
    let out = canonical();

    // two 4x128 grids of boxes
    assert_eq!(out.matches("\\node[box,").count(), 2 * 512);

    assert!(out.contains(
        r"\node[box,fill={rgb,255:red,175;green,175;blue,255}] at (0,0) {\shortstack{T0 \\ V0}};"
    ));
    assert!(out.contains(
        r"\node[box,fill={rgb,255:red,175;green,255;blue,175}] at (1,0) {\shortstack{T1 \\ V0}};"
    ));
    assert!(out.contains(r"at (0,1) {\shortstack{T0 \\ V1}};"));
    assert!(out.contains(r"at (0,8) {\shortstack{T4 \\ V0}};"));

    // destination grid is shifted right by N + 3
    assert!(out.contains(r"at (0,131) {\shortstack{T0 \\ V0}};"));
    assert!(out.contains(r"\draw[color=black,thick,shift={(-0.5,-0.5)}] (0,0) grid (4,128);"));
    assert!(out.contains(r"\draw[color=black,thick,shift={(-0.5,-0.5)}] (0,131) grid (4,259);"));

    // row and column labels
    assert!(out.contains(r"\node at (3,-1) {\Large{\texttt{3}}};"));
    assert!(out.contains(r"\node at (-1,127) {\Large{\texttt{127}}};"));
    assert!(out.contains(r"\node at (0,259) {\Large{\texttt{0}}};"));
}

#[test]
fn test_too_few_values_is_diagnostic() {
    let out = visualize_layout_tv(4, 128, 4, 4, 2, 2, 1, 4, 4, 1).unwrap();

    let expected = "\
% Error generating tiled copy layout: TiledCopy uses too few values for selected CopyAtom: 4 is not a multiple of 8
% Layout Configuration:
% Thread Shape: (4, 4)
% Thread Stride: (1, 4)
% Value Shape: (2, 2)
% Value Stride: (4, 1)
% Tiler: (4, 128)
% Copy Size: 128 bits (16 bytes)
% Element Size: 16 bits
";
    assert_eq!(out, expected);
    assert!(!out.contains("tikzpicture"));
}

#[test]
fn test_small_tile_is_diagnostic() {
    let out = visualize_layout_tv(3, 5, 4, 16, 1, 8, 1, 32, 1, 4).unwrap();

    let mut lines = out.lines();
    assert!(lines
        .next()
        .unwrap()
        .starts_with("% Error generating tiled copy layout: "));
    assert_eq!(lines.next(), Some("% Layout Configuration:"));
    assert!(out.contains("% Tiler: (3, 5)\n"));
    assert!(!out.contains("\\begin{tikzpicture}"));
}

#[test]
fn test_incompatible_widths_are_diagnostic() {
    let request = TvLayoutRequest::new(
        LayoutDescriptor::new((4, 16), (1, 32)),
        LayoutDescriptor::new((1, 8), (1, 4)),
    )
    .with_element_width_bits(24);

    let out = visualize(&request).unwrap();
    assert!(out.starts_with("% Error generating tiled copy layout: copy width of 128 bits"));
    assert!(out.ends_with("% Element Size: 24 bits\n"));
}

#[test]
fn test_request_with_wider_elements() {
    let request = TvLayoutRequest::new(
        LayoutDescriptor::new((4, 16), (1, 16)),
        LayoutDescriptor::new((1, 4), (1, 4)),
    )
    .with_tile_shape(4, 64)
    .with_element_width_bits(32);

    let out = visualize(&request).unwrap();
    assert!(out.contains("% Element Size: 32 bits\n"));
    assert!(out.contains("% LayoutS: (4,(4,16)):(1,(64,4))\n"));
    assert!(!out.contains("% Error"));
}

#[test]
fn test_idempotent() {
    assert_eq!(canonical(), canonical());

    let a = visualize_layout_tv(3, 5, 4, 16, 1, 8, 1, 32, 1, 4).unwrap();
    let b = visualize_layout_tv(3, 5, 4, 16, 1, 8, 1, 32, 1, 4).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_concurrent_calls_do_not_interleave() {
    let expected_ok = canonical();
    let expected_diag = visualize_layout_tv(4, 128, 4, 4, 2, 2, 1, 4, 4, 1).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                s.spawn(move || {
                    if i % 2 == 0 {
                        visualize_layout_tv(4, 128, 4, 16, 1, 8, 1, 32, 1, 4)
                    } else {
                        visualize_layout_tv(4, 128, 4, 4, 2, 2, 1, 4, 4, 1)
                    }
                })
            })
            .collect();

        for (i, h) in handles.into_iter().enumerate() {
            let out = h.join().unwrap().unwrap();
            if i % 2 == 0 {
                assert_eq!(out, expected_ok);
            } else {
                assert_eq!(out, expected_diag);
            }
        }
    });
}

#[test]
fn test_latex_string_matches_visualize_body() {
    let thr = Layout::new(int!(4, 16), Some(int!(1, 32)));
    let val = Layout::new(int!(1, 8), Some(int!(1, 4)));
    let copy = TiledCopy::new(
        CopyAtom::universal(128, 16).unwrap(),
        make_layout(&[&thr, &val]),
        Layout::new(int!(4, 128), None),
    )
    .unwrap();

    let latex = latex_string(&copy).unwrap();
    assert_eq!(canonical(), format!("{CANONICAL_CONFIG}{latex}"));
}

// 4 threads of two values over a 2x4 tile
fn small_tv() -> Layout {
    Layout::new(
        int!(int!(2, 2), int!(1, 2)),
        Some(int!(int!(1, 4), int!(1, 2))),
    )
}

#[test]
fn test_make_inverse_tv() {
    let inverse = make_inverse_tv(&small_tv(), false).unwrap();
    assert_eq!(inverse.len(), 8);

    let owners = inverse.get(5);
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].thr_idx, 3);
    assert_eq!(owners[0].val_idx, 0);
    assert_eq!(owners[0].thr_crd.to_string(), "(1,1)");
    assert_eq!(owners[0].val_crd.to_string(), "(0,0)");

    let owners = inverse.get(6);
    assert_eq!((owners[0].thr_idx, owners[0].val_idx), (2, 1));

    assert!(inverse.get(8).is_empty());

    // one owner per index, visited in index order
    let indices: Vec<i64> = inverse.iter().map(|(index, _)| index).collect();
    assert_eq!(indices, (0..8).collect::<Vec<_>>());
    assert!(inverse.iter().all(|(_, owners)| owners.len() == 1));
}

#[test]
fn test_make_inverse_tv_duplicates() {
    // every thread writes the same 4 elements
    let broadcast = Layout::new(int!(2, 4), Some(int!(0, 1)));
    assert_eq!(
        make_inverse_tv(&broadcast, false),
        Err(LayoutError::DuplicateIndex { index: 0 })
    );

    let inverse = make_inverse_tv(&broadcast, true).unwrap();
    assert_eq!(inverse.len(), 4);
    let owners: Vec<_> = inverse.get(2).iter().map(|e| e.thr_idx).collect();
    assert_eq!(owners, vec![0, 1]);
}

#[test]
fn test_tiler_crd_to_layout_tv_crd() {
    let tv = small_tv();
    let crd = tiler_crd_to_layout_tv_crd((1, 2), (2, 4), &tv.shape, &tv.stride).unwrap();
    assert_eq!(crd.to_string(), "((1,1),(0,0))");
    // the coordinate lands back on tile index 1 + 2 * 2
    assert_eq!(tv.call(&crd), 5);

    assert!(matches!(
        tiler_crd_to_layout_tv_crd((0, 0), (2, 4), &tv.shape, &int!(1, 2)),
        Err(LayoutError::NotCongruent { .. })
    ));
}

#[test]
fn test_render_tv_grid() {
    let grid = render_tv_grid((2, 4), &small_tv()).unwrap();
    let expected = "\
(2,4) <- ((2,2),(1,2)):((1,4),(1,2))
         0      1      2      3
    +------+------+------+------+
 0  | T0V0 | T0V1 | T2V0 | T2V1 |
    +------+------+------+------+
 1  | T1V0 | T1V1 | T3V0 | T3V1 |
    +------+------+------+------+";
    assert_eq!(grid, expected);
}

#[test]
fn test_render_tv_grid_marks_duplicates() {
    let broadcast = Layout::new(int!(2, 4), Some(int!(0, 1)));
    let grid = render_tv_grid((2, 2), &broadcast).unwrap();
    assert!(grid.contains("T0V0|T1V0"));
    assert!(grid.contains("T0V3|T1V3"));
}

#[test]
fn test_oversized_request_is_diagnosed() {
    let big = 1i64 << 40;

    // thread count overflows i64
    let out = visualize_layout_tv(4, 128, big, big, 1, 8, 1, 32, 1, 4).unwrap();
    assert!(out.starts_with(
        "% Error generating tiled copy layout: layout \
         ((1099511627776,1099511627776),(1,8)):((1,32),(1,4)) is too large"
    ));
    assert!(out.ends_with("% Element Size: 16 bits\n"));
    assert!(!out.contains("tikzpicture"));

    // the size fits, the largest index does not
    let out = visualize_layout_tv(4, 128, 4, 16, 1, 8, 1, 1 << 62, 1, 4).unwrap();
    assert!(out.starts_with("% Error generating tiled copy layout: "));
    assert!(out.contains("overflows i64"));

    // tile element count overflows i64
    let out = visualize_layout_tv(big, big, 4, 16, 1, 8, 1, 32, 1, 4).unwrap();
    assert!(out.starts_with(
        "% Error generating tiled copy layout: layout \
         (1099511627776,1099511627776):(1,1099511627776) is too large"
    ));
}

#[test]
fn test_oversized_inverse_and_grid() {
    let big = 1i64 << 40;
    let tv = Layout::new(
        int!(int!(big, big), int!(1, 8)),
        Some(int!(int!(1, 32), int!(1, 4))),
    );
    assert!(matches!(
        make_inverse_tv(&tv, true),
        Err(LayoutError::SizeOverflow { .. })
    ));
    assert!(matches!(
        render_tv_grid((big, big), &small_tv()),
        Err(LayoutError::SizeOverflow { .. })
    ));
}

fn small_request() -> TvLayoutRequest {
    TvLayoutRequest::new(
        LayoutDescriptor::new((2, 2), (1, 4)),
        LayoutDescriptor::new((1, 2), (1, 2)),
    )
    .with_tile_shape(2, 4)
    .with_copy_width_bits(32)
}

#[test]
fn test_visualize_text() {
    let out = visualize_text(&small_request()).unwrap();
    let expected = "\
% Layout Configuration:
% Thread Shape: (2, 2)
% Thread Stride: (1, 4)
% Value Shape: (1, 2)
% Value Stride: (1, 2)
% Tiler: (2, 4)
% Copy Size: 32 bits (4 bytes)
% Element Size: 16 bits
(2,4) <- ((2,2),(1,2)):((1,4),(1,2))
         0      1      2      3
    +------+------+------+------+
 0  | T0V0 | T0V1 | T2V0 | T2V1 |
    +------+------+------+------+
 1  | T1V0 | T1V1 | T3V0 | T3V1 |
    +------+------+------+------+
";
    assert_eq!(out, expected);
}

#[test]
fn test_visualize_text_diagnoses_like_latex() {
    // 4 values per thread against an 8-value atom
    let too_few_values = TvLayoutRequest::new(
        LayoutDescriptor::new((4, 16), (1, 32)),
        LayoutDescriptor::new((1, 4), (1, 4)),
    );
    let out = visualize_text(&too_few_values).unwrap();
    assert!(out.starts_with("% Error generating tiled copy layout: "));
    assert!(!out.contains("T0V0"));
    assert_eq!(out, visualize(&too_few_values).unwrap());

    // a tile larger than the layout is not drawn with blank cells
    let uncovered = small_request().with_tile_shape(4, 4);
    let out = visualize_text(&uncovered).unwrap();
    assert!(out.starts_with("% Error generating tiled copy layout: TV layout"));
    assert!(!out.contains('+'));

    assert_eq!(
        visualize_text(&small_request().with_tile_shape(0, 4)),
        Err(TvLayoutError::InvalidParameter)
    );
}
