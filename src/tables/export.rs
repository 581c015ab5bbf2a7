// Tabular rendering of extracted tables and table diffs.
//
// Two surfaces: CSV-style text for `export` (and anything downstream that
// wants to reparse it), and aligned grids for terminal display. All numeric
// formatting is fixed 2 decimal places and happens here only — computation
// upstream stays exact.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::tables::diff::TableDelta;
use crate::tables::extract::CalTable;

const CELL_WIDTH: usize = 8;

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Write a table as CSV: corner cell + column breakpoints, then one line per
/// row (row breakpoint first). Axis order matches the definition; nothing is
/// re-sorted.
pub fn write_table<W: Write>(w: &mut W, table: &CalTable) -> io::Result<()> {
    write!(w, "{} \\ {}", table.row_label, table.col_label)?;
    for bp in &table.col_axis {
        write!(w, ",{bp:.2}")?;
    }
    writeln!(w)?;

    for (bp, row) in table.row_axis.iter().zip(&table.values) {
        write!(w, "{bp:.2}")?;
        for value in row {
            write!(w, ",{value:.2}")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Write a table diff as CSV, one delta per cell.
pub fn write_delta<W: Write>(w: &mut W, delta: &TableDelta) -> io::Result<()> {
    write!(w, "{} \\ {}", delta.row_label, delta.col_label)?;
    for bp in &delta.col_axis {
        write!(w, ",{bp:.2}")?;
    }
    writeln!(w)?;

    for (bp, row) in delta.row_axis.iter().zip(&delta.deltas) {
        write!(w, "{bp:.2}")?;
        for value in row {
            write!(w, ",{value:.2}")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Write a table to a file. Single local write, not retried.
pub fn export_table(path: &Path, table: &CalTable) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_table(&mut writer, table)?;
    writer.flush()
}

/// Write a table diff to a file.
pub fn export_delta(path: &Path, delta: &TableDelta) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_delta(&mut writer, delta)?;
    writer.flush()
}

// ---------------------------------------------------------------------------
// Terminal grids
// ---------------------------------------------------------------------------

fn corner(row_label: &str, col_label: &str) -> String {
    format!("{row_label} \\ {col_label}")
}

fn grid_header(out: &mut String, corner: &str, label_width: usize, col_axis: &[f64]) {
    let cell = CELL_WIDTH;
    out.push_str(&format!("{corner:>label_width$} |"));
    for bp in col_axis {
        out.push_str(&format!(" {bp:>cell$.2}"));
    }
    out.push('\n');
    let rule_len = label_width + 2 + col_axis.len() * (cell + 1);
    out.push_str(&"-".repeat(rule_len));
    out.push('\n');
}

/// Render an extracted table as an aligned grid.
pub fn render_table(table: &CalTable) -> String {
    let corner = corner(&table.row_label, &table.col_label);
    let label_width = corner.len().max(CELL_WIDTH);

    let cell = CELL_WIDTH;
    let mut out = String::new();
    grid_header(&mut out, &corner, label_width, &table.col_axis);
    for (bp, row) in table.row_axis.iter().zip(&table.values) {
        out.push_str(&format!("{bp:>label_width$.2} |"));
        for value in row {
            out.push_str(&format!(" {value:>cell$.2}"));
        }
        out.push('\n');
    }
    out
}

/// Render a table diff as an aligned grid: changed cells show their signed
/// delta, unchanged cells stay blank so edits stand out.
pub fn render_delta(delta: &TableDelta) -> String {
    let corner = corner(&delta.row_label, &delta.col_label);
    let label_width = corner.len().max(CELL_WIDTH);

    let cell = CELL_WIDTH;
    let mut out = String::new();
    grid_header(&mut out, &corner, label_width, &delta.col_axis);
    for (r, (bp, row)) in delta.row_axis.iter().zip(&delta.deltas).enumerate() {
        out.push_str(&format!("{bp:>label_width$.2} |"));
        for (c, value) in row.iter().enumerate() {
            if delta.is_changed(r, c) {
                out.push_str(&format!(" {value:>+cell$.2}"));
            } else {
                out.push_str(&format!(" {:>cell$}", ""));
            }
        }
        out.push('\n');
    }
    out
}

/// One-line aggregate summary for a table diff.
pub fn summary_line(delta: &TableDelta) -> String {
    if delta.changed == 0 {
        return format!(
            "no cells differ beyond tolerance {} in '{}'",
            delta.tolerance, delta.name
        );
    }
    let (pr, pc) = delta.peak;
    format!(
        "{} cell(s) differ in '{}' (tolerance {}); min {:+.2}, max {:+.2}, peak at {} {:.0} / {} {:.0}",
        delta.changed,
        delta.name,
        delta.tolerance,
        delta.min_delta,
        delta.max_delta,
        delta.row_label,
        delta.row_axis[pr],
        delta.col_label,
        delta.col_axis[pc],
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
