//! Sequential composition of the pipeline stages.
//!
//! Index both polygon sets, build the covering grid, compute the two
//! distance fields, then score. Each stage runs to completion before the
//! next starts; the two distance runs read the same immutable grid and
//! write disjoint columns, so a caller could execute them concurrently
//! without changing any result, but this composition keeps them sequential.

use tracing::info;

use crate::config::PipelineConfig;
use crate::distance::attach_distances;
use crate::error::Result;
use crate::geometry::{BoundingBox, PolygonSet};
use crate::grid::{Grid, build_grid};
use crate::indexer::{CellCache, index_with_cache};
use crate::score::score_grid;

/// Runs the whole pipeline and returns the finished grid table.
///
/// The configuration is validated up front; any out-of-range parameter or
/// degenerate bounding region aborts before work starts. The returned grid
/// is complete: intersection flags, metre distances (NaN-free, undefined as
/// `None`), and scores in `[0, 1]`.
pub fn run(
    rock_a: &PolygonSet,
    rock_b: &PolygonSet,
    explicit_bbox: Option<BoundingBox>,
    config: &PipelineConfig,
    cache: Option<&dyn CellCache>,
) -> Result<Grid> {
    config.validate()?;
    let resolution = config.resolution()?;

    info!(
        "indexing rock types '{}' ({} polygons) and '{}' ({} polygons) at r{}",
        rock_a.tag(),
        rock_a.len(),
        rock_b.tag(),
        rock_b.len(),
        u8::from(resolution)
    );
    let cells_a = index_with_cache(rock_a, resolution, cache);
    let cells_b = index_with_cache(rock_b, resolution, cache);

    let mut grid = build_grid(resolution, rock_a, rock_b, &cells_a, &cells_b, explicit_bbox)?;

    attach_distances(&mut grid);
    score_grid(&mut grid, config.decay_kernel(), config.weight_a);

    info!("scored {} cells", grid.len());
    Ok(grid)
}
