//! Result table persistence.
//!
//! Writes the finished grid as CSV and as JSON Lines, keyed by the
//! canonical H3 string id. Consumers treat both as read-only exports; no
//! filtering or thresholding happens here.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::json;

use crate::error::Result;
use crate::grid::Grid;

/// Column order of the CSV export.
pub const CSV_HEADER: &str = "cell_id,intersects_a,intersects_b,dist_a,dist_b,score";

/// Writes the grid as CSV. Undefined distances serialize as `NaN`.
pub fn write_csv(grid: &Grid, path: impl AsRef<Path>) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{CSV_HEADER}")?;
    for record in grid.records() {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            record.cell,
            record.intersects_a,
            record.intersects_b,
            record.dist_a.unwrap_or(f64::NAN),
            record.dist_b.unwrap_or(f64::NAN),
            record.score
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Writes the grid as JSON Lines. Undefined distances serialize as `null`.
pub fn write_jsonl(grid: &Grid, path: impl AsRef<Path>) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for record in grid.records() {
        let row = json!({
            "cell_id": record.cell.to_string(),
            "intersects_a": record.intersects_a,
            "intersects_b": record.intersects_b,
            "dist_a": record.dist_a,
            "dist_b": record.dist_b,
            "score": record.score,
        });
        writeln!(out, "{row}")?;
    }
    out.flush()?;
    Ok(())
}
