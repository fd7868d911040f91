//! Command-line front end: print the TV layout of a tiled copy.
//!
//! ```text
//! tvlayout --thr-shape-m 4 --thr-shape-n 16 --thr-stride-m 1 --thr-stride-n 32 \
//!          --val-shape-m 1 --val-shape-n 8 --val-stride-m 1 --val-stride-n 4 > copy.tex
//! ```

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::error;

use tvlayout::{
    init_logging, visualize, visualize_text, LayoutDescriptor, LogConfig, TvLayoutRequest,
    DEFAULT_COPY_WIDTH_BITS, DEFAULT_ELEMENT_WIDTH_BITS, DEFAULT_TILER,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Standalone TikZ document
    Latex,
    /// ASCII grid of T<thr>V<val> cells, after the same composition checks
    Text,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(
        long,
        env = "TVLAYOUT_TILER_M",
        default_value_t = DEFAULT_TILER.0,
        allow_negative_numbers = true
    )]
    tiler_m: i64,
    #[arg(
        long,
        env = "TVLAYOUT_TILER_N",
        default_value_t = DEFAULT_TILER.1,
        allow_negative_numbers = true
    )]
    tiler_n: i64,

    #[arg(long, env = "TVLAYOUT_THR_SHAPE_M", allow_negative_numbers = true)]
    thr_shape_m: i64,
    #[arg(long, env = "TVLAYOUT_THR_SHAPE_N", allow_negative_numbers = true)]
    thr_shape_n: i64,
    #[arg(long, env = "TVLAYOUT_VAL_SHAPE_M", allow_negative_numbers = true)]
    val_shape_m: i64,
    #[arg(long, env = "TVLAYOUT_VAL_SHAPE_N", allow_negative_numbers = true)]
    val_shape_n: i64,

    #[arg(long, env = "TVLAYOUT_THR_STRIDE_M", allow_negative_numbers = true)]
    thr_stride_m: i64,
    #[arg(long, env = "TVLAYOUT_THR_STRIDE_N", allow_negative_numbers = true)]
    thr_stride_n: i64,
    #[arg(long, env = "TVLAYOUT_VAL_STRIDE_M", allow_negative_numbers = true)]
    val_stride_m: i64,
    #[arg(long, env = "TVLAYOUT_VAL_STRIDE_N", allow_negative_numbers = true)]
    val_stride_n: i64,

    #[arg(
        long,
        env = "TVLAYOUT_COPY_BITS",
        default_value_t = DEFAULT_COPY_WIDTH_BITS,
        help = "Bits moved by one copy instruction."
    )]
    copy_bits: u32,
    #[arg(
        long,
        env = "TVLAYOUT_ELEMENT_BITS",
        default_value_t = DEFAULT_ELEMENT_WIDTH_BITS,
        help = "Bits per element."
    )]
    element_bits: u32,

    #[arg(long, value_enum, env = "TVLAYOUT_FORMAT", default_value = "latex")]
    format: Format,

    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (-v, -vv, -vvv)."
    )]
    verbose: u8,
}

impl Args {
    fn request(&self) -> TvLayoutRequest {
        TvLayoutRequest::new(
            LayoutDescriptor::new(
                (self.thr_shape_m, self.thr_shape_n),
                (self.thr_stride_m, self.thr_stride_n),
            ),
            LayoutDescriptor::new(
                (self.val_shape_m, self.val_shape_n),
                (self.val_stride_m, self.val_stride_n),
            ),
        )
        .with_tile_shape(self.tiler_m, self.tiler_n)
        .with_copy_width_bits(self.copy_bits)
        .with_element_width_bits(self.element_bits)
    }
}

fn run(args: &Args) -> tvlayout::Result<String> {
    let request = args.request();
    match args.format {
        Format::Latex => visualize(&request),
        Format::Text => visualize_text(&request),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&LogConfig::from_verbosity(args.verbose));

    match run(&args) {
        Ok(out) => {
            print!("{out}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "visualization failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
