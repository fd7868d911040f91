//! The visualization entry point: validate, compose, render.
//!
//! Invalid parameters are returned as errors. A request that validates but
//! cannot be composed into a tiled copy is never an error here: the caller
//! gets a diagnostic comment block in place of the rendered body.

use std::fmt::Write;

use tracing::{debug, warn};

use crate::copy::TiledCopy;
use crate::error::Result;
use crate::inverse::render_tv_grid;
use crate::latex::write_latex;
use crate::layout::LayoutResult;
use crate::request::{LayoutDescriptor, TvLayoutRequest, ValidatedRequest};

/// Build the tiled copy a validated request describes.
pub fn compose(request: &ValidatedRequest) -> LayoutResult<TiledCopy> {
    let atom = request.copy_atom()?;
    TiledCopy::new(atom, request.layout_tv(), request.tiler())
}

/// Render `request` as LaTeX, prefixed with its configuration block.
///
/// On composition failure the result is `% Error generating tiled copy
/// layout: <message>` followed by the configuration block.
pub fn visualize(request: &TvLayoutRequest) -> Result<String> {
    render(request, |out, copy| Ok(write_latex(out, copy)?))
}

/// [`visualize`] with the body drawn as a [`render_tv_grid`] table.
///
/// Requests that do not compose get the same diagnostic block, so the
/// table only ever shows a tiled copy that covers the tile exactly.
pub fn visualize_text(request: &TvLayoutRequest) -> Result<String> {
    render(request, |out, copy| {
        out.push_str(&render_tv_grid(request.tile_shape, copy.layout_tv())?);
        out.push('\n');
        Ok(())
    })
}

fn render<F>(request: &TvLayoutRequest, body: F) -> Result<String>
where
    F: FnOnce(&mut String, &TiledCopy) -> Result<()>,
{
    let validated = request.validate()?;
    let mut out = String::new();

    match compose(&validated) {
        Ok(copy) => {
            debug!(
                threads = copy.tiled_num_threads(),
                values = copy.tiled_num_values(),
                "rendering tiled copy"
            );
            validated.write_config_block(&mut out)?;
            body(&mut out, &copy)?;
        }
        Err(err) => {
            warn!(
                error = %err,
                layout_tv = %validated.layout_tv(),
                "tiled copy composition failed"
            );
            writeln!(out, "% Error generating tiled copy layout: {err}")?;
            validated.write_config_block(&mut out)?;
        }
    }

    Ok(out)
}

/// Ten-integer form of [`visualize`] with the default element and copy widths.
#[allow(clippy::too_many_arguments)]
pub fn visualize_layout_tv(
    tiler_m: i64,
    tiler_n: i64,
    thr_shape_m: i64,
    thr_shape_n: i64,
    val_shape_m: i64,
    val_shape_n: i64,
    thr_stride_m: i64,
    thr_stride_n: i64,
    val_stride_m: i64,
    val_stride_n: i64,
) -> Result<String> {
    let request = TvLayoutRequest::new(
        LayoutDescriptor::new((thr_shape_m, thr_shape_n), (thr_stride_m, thr_stride_n)),
        LayoutDescriptor::new((val_shape_m, val_shape_n), (val_stride_m, val_stride_n)),
    )
    .with_tile_shape(tiler_m, tiler_n);
    visualize(&request)
}
