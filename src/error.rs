//! Error types for the prospectivity pipeline.

use thiserror::Error;

/// Pipeline errors.
///
/// Only failures that abort a whole run live here. Per-geometry data-quality
/// problems (invalid polygons, unparsable input lines) are skipped and logged
/// at their call sites instead.
#[derive(Error, Debug)]
pub enum ProspectError {
    /// Invalid configuration: out-of-range parameter, degenerate bounding
    /// region, mixed-resolution cell set.
    #[error("configuration error: {0}")]
    Config(String),

    /// WKT parsing error on input that must be well-formed (not a skippable
    /// per-line issue).
    #[error("WKT parse error: {0}")]
    WktParse(String),

    /// IO error reading polygon input or writing results.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, ProspectError>;
