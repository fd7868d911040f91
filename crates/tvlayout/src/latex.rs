//! LaTeX/TikZ rendering of a tiled copy, 8 colours keyed by thread.
//!
//! Rendering writes into any [`fmt::Write`] sink, so capturing the text is
//! just rendering into a `String`.

use std::fmt::{self, Write};

use crate::copy::TiledCopy;
use crate::int;
use crate::layout::Layout;

const LATEX_HEADER: &str = "\\documentclass{standalone}\n\
\\usepackage{tikz}\n\
\\usetikzlibrary{external}\n\
\\tikzexternalize\n\
\\begin{document}\n\
\\begin{tikzpicture}[x={(0cm,-1cm)},y={(1cm,0cm)},box/.style={rectangle,draw=black,thick,minimum size=1cm,anchor=center}]\n\n";

const LATEX_FOOTER: &str = "\\end{tikzpicture}\n\\end{document}\n";

const COLOR_MAP: [&str; 8] = [
    "{rgb,255:red,175;green,175;blue,255}",
    "{rgb,255:red,175;green,255;blue,175}",
    "{rgb,255:red,255;green,255;blue,175}",
    "{rgb,255:red,255;green,175;blue,175}",
    "{rgb,255:red,210;green,210;blue,255}",
    "{rgb,255:red,210;green,255;blue,210}",
    "{rgb,255:red,255;green,255;blue,210}",
    "{rgb,255:red,255;green,210;blue,210}",
];

/// Write the source and destination partitions of `copy` as a standalone
/// TikZ document.
pub fn write_latex<W: Write>(out: &mut W, copy: &TiledCopy) -> fmt::Result {
    let thr_id = copy.thr_id();
    write_latex_copy(out, copy.layout_src_mn(), &thr_id, copy.layout_dst_mn(), &thr_id)
}

/// Render `copy` into a fresh `String`.
pub fn latex_string(copy: &TiledCopy) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_latex(&mut out, copy)?;
    Ok(out)
}

/// Print the rendering of `copy` to stdout.
pub fn print_latex(copy: &TiledCopy) -> fmt::Result {
    print!("{}", latex_string(copy)?);
    Ok(())
}

fn mn_extent(layout: &Layout) -> (i64, i64) {
    (layout.shape.get(0).size(), layout.shape.get(1).size())
}

/// `s`, `d`: (m,n) -> (thrid,val_idx); `ts`, `td`: thrid -> thr_idx.
fn write_latex_copy<W: Write>(
    out: &mut W,
    s: &Layout,
    ts: &Layout,
    d: &Layout,
    td: &Layout,
) -> fmt::Result {
    writeln!(out, "% LayoutS: {s}")?;
    writeln!(out, "% ThrIDS : {ts}")?;
    writeln!(out, "% LayoutD: {d}")?;
    writeln!(out, "% ThrIDD : {td}")?;
    writeln!(out)?;

    out.write_str(LATEX_HEADER)?;

    let (s_m, s_n) = mn_extent(s);
    let (d_m, d_n) = mn_extent(d);

    // S starting at 0,0
    write_boxes(out, s, ts, 0)?;
    writeln!(
        out,
        "\\draw[color=black,thick,shift={{(-0.5,-0.5)}}] ({},{}) grid ({},{});\n",
        0, 0, s_m, s_n
    )?;
    for i in 0..s_m {
        write_label(out, i, -1, i)?;
    }
    for j in 0..s_n {
        write_label(out, -1, j, j)?;
    }

    // D starting at 0,s_n+3
    let offset = s_n + 3;
    write_boxes(out, d, td, offset)?;
    writeln!(
        out,
        "\\draw[color=black,thick,shift={{(-0.5,-0.5)}}] ({},{}) grid ({},{});\n",
        0,
        offset,
        d_m,
        d_n + offset
    )?;
    for i in 0..d_m {
        write_label(out, i, d_n + offset, i)?;
    }
    for j in 0..d_n {
        write_label(out, -1, j + offset, j)?;
    }

    out.write_str(LATEX_FOOTER)
}

fn write_boxes<W: Write>(
    out: &mut W,
    layout: &Layout,
    thr_id: &Layout,
    col_offset: i64,
) -> fmt::Result {
    let (m, n) = mn_extent(layout);
    let num_thr = thr_id.size();
    for i in 0..m {
        for j in 0..n {
            let idx = layout.call(&int!(i, j));
            let thrid = idx % num_thr;
            let val_idx = idx / num_thr;
            let thr_idx = thr_id.call_1d(thrid);
            let color = COLOR_MAP[thr_idx.rem_euclid(8) as usize];

            writeln!(
                out,
                "\\node[box,fill={color}] at ({},{}) {{\\shortstack{{T{thr_idx} \\\\ V{val_idx}}}}};",
                i,
                j + col_offset
            )?;
        }
    }
    Ok(())
}

fn write_label<W: Write>(out: &mut W, x: i64, y: i64, text: i64) -> fmt::Result {
    writeln!(out, "\\node at ({x},{y}) {{\\Large{{\\texttt{{{text}}}}}}};")
}
