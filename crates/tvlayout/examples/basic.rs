use tvlayout::{
    render_tv_grid, visualize, visualize_layout_tv, LayoutDescriptor, TvLayoutRequest,
};

// 64 threads copying a 4x128 tile of halves, 8 contiguous values each
// (one 128-bit load per thread).

fn main() -> tvlayout::Result<()> {
    let latex = visualize_layout_tv(4, 128, 4, 16, 1, 8, 1, 32, 1, 4)?;
    let lines: Vec<&str> = latex.lines().collect();
    println!("{}", lines[..14].join("\n"));
    println!("... ({} lines total)", lines.len());

    // 4 values of 16 bits cannot feed a 128-bit atom: diagnostic only
    let diag = visualize_layout_tv(4, 128, 4, 4, 2, 2, 1, 4, 4, 1)?;
    println!("\n{diag}");

    // a small 2x4 tile, 4 threads of two 32-bit values
    let request = TvLayoutRequest::new(
        LayoutDescriptor::new((2, 2), (1, 4)),
        LayoutDescriptor::new((1, 2), (1, 2)),
    )
    .with_tile_shape(2, 4)
    .with_element_width_bits(32)
    .with_copy_width_bits(64);
    let validated = request.validate()?;
    println!("{}", render_tv_grid(request.tile_shape, &validated.layout_tv())?);
    println!("\n{}", visualize(&request)?);

    Ok(())
}
