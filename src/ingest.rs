//! Polygon ingestion from WKT files.
//!
//! Line-oriented: one WKT geometry per line, `#` comments and blank lines
//! ignored. Only POLYGON and MULTIPOLYGON carry area; anything else on a
//! line is a data-quality signal and is skipped with a warning, as is any
//! line that fails to parse. Coordinates must already be WGS84 lon/lat
//! degrees - reprojection happens upstream of this tool.

use std::fs;
use std::path::Path;

use geo_types::Geometry;
use tracing::warn;

use crate::error::Result;
use crate::geometry::{PolygonSet, parse_wkt};

/// Reads a polygon set from a WKT file.
///
/// IO failures are errors; malformed individual lines are not.
pub fn read_wkt_file(path: impl AsRef<Path>, tag: &str) -> Result<PolygonSet> {
    let text = fs::read_to_string(path)?;
    Ok(parse_wkt_lines(&text, tag))
}

/// Parses line-separated WKT into a polygon set, skipping bad lines.
pub fn parse_wkt_lines(text: &str, tag: &str) -> PolygonSet {
    let mut polygons = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_wkt(line) {
            Ok(Geometry::Polygon(polygon)) => polygons.push(polygon),
            Ok(Geometry::MultiPolygon(multi)) => polygons.extend(multi),
            Ok(_) => warn!(
                "set '{tag}' line {}: skipping non-polygon geometry",
                idx + 1
            ),
            Err(err) => warn!(
                "set '{tag}' line {}: skipping unparsable WKT: {err}",
                idx + 1
            ),
        }
    }
    PolygonSet::new(tag, polygons)
}
