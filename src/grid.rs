//! Grid Builder: the hex cell table covering the study area.
//!
//! A [`Grid`] is an ordered, duplicate-free table of H3 cells covering the
//! bounding region of both rock-type polygon sets (or an explicitly supplied
//! box), tagged with per-rock intersection flags. It is built once per
//! pipeline run, enriched in place by the distance and scoring stages, and
//! then read as an immutable result table.

use h3o::geom::{ContainmentMode, PolyfillConfig, ToCells};
use h3o::{CellIndex, Resolution};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::info;

use crate::error::{ProspectError, Result};
use crate::geometry::{BoundingBox, PolygonSet};

/// Selects one of the two rock-type columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rock {
    /// Rock type A.
    A,
    /// Rock type B.
    B,
}

impl Rock {
    /// Short column tag ("a" / "b") used in logs.
    pub fn tag(self) -> &'static str {
        match self {
            Rock::A => "a",
            Rock::B => "b",
        }
    }
}

/// One row of the grid table.
#[derive(Clone, Copy, Debug)]
pub struct CellRecord {
    /// Cell identifier.
    pub cell: CellIndex,
    /// Whether the cell's tile intersects rock type A.
    pub intersects_a: bool,
    /// Whether the cell's tile intersects rock type B.
    pub intersects_b: bool,
    /// Distance to the nearest A cell in metres; `None` when undefined.
    pub dist_a: Option<f64>,
    /// Distance to the nearest B cell in metres; `None` when undefined.
    pub dist_b: Option<f64>,
    /// Combined prospectivity score in `[0, 1]`.
    pub score: f64,
}

impl CellRecord {
    fn new(cell: CellIndex) -> Self {
        Self {
            cell,
            intersects_a: false,
            intersects_b: false,
            dist_a: None,
            dist_b: None,
            score: 0.0,
        }
    }

    /// Intersection flag for the given rock type.
    pub fn intersects(&self, rock: Rock) -> bool {
        match rock {
            Rock::A => self.intersects_a,
            Rock::B => self.intersects_b,
        }
    }

    /// Distance column for the given rock type.
    pub fn dist(&self, rock: Rock) -> Option<f64> {
        match rock {
            Rock::A => self.dist_a,
            Rock::B => self.dist_b,
        }
    }

    pub(crate) fn set_dist(&mut self, rock: Rock, dist: Option<f64>) {
        match rock {
            Rock::A => self.dist_a = dist,
            Rock::B => self.dist_b = dist,
        }
    }
}

/// Ordered, duplicate-free cell table at a single resolution.
pub struct Grid {
    resolution: Resolution,
    records: Vec<CellRecord>,
    rows: FxHashMap<CellIndex, usize>,
}

impl Grid {
    /// Builds a grid from an arbitrary cell collection.
    ///
    /// Duplicates collapse to one row; rows are ordered by cell id so
    /// repeated runs produce identical tables. Every cell must be at
    /// `resolution` - a mixed-resolution collection is a configuration
    /// defect, not recoverable data.
    pub fn from_cells(
        resolution: Resolution,
        cells: impl IntoIterator<Item = CellIndex>,
    ) -> Result<Self> {
        let mut unique: Vec<CellIndex> = Vec::new();
        let mut seen = FxHashSet::default();
        for cell in cells {
            if cell.resolution() != resolution {
                return Err(ProspectError::Config(format!(
                    "cell {cell} is at r{}, expected r{}",
                    u8::from(cell.resolution()),
                    u8::from(resolution)
                )));
            }
            if seen.insert(cell) {
                unique.push(cell);
            }
        }
        unique.sort_unstable();

        let rows = unique
            .iter()
            .enumerate()
            .map(|(row, &cell)| (cell, row))
            .collect();
        let records = unique.into_iter().map(CellRecord::new).collect();
        Ok(Self {
            resolution,
            records,
            rows,
        })
    }

    /// Marks every listed cell as intersecting the given rock type.
    ///
    /// Cells outside the grid are ignored; the flag column stays false
    /// everywhere else.
    pub fn tag_intersections(&mut self, rock: Rock, cells: &FxHashSet<CellIndex>) {
        for record in &mut self.records {
            if cells.contains(&record.cell) {
                match rock {
                    Rock::A => record.intersects_a = true,
                    Rock::B => record.intersects_b = true,
                }
            }
        }
    }

    /// Tiling granularity of every cell in this grid.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the grid holds no cells.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `cell` is part of this grid.
    pub fn contains(&self, cell: CellIndex) -> bool {
        self.rows.contains_key(&cell)
    }

    /// Row for `cell`, if present.
    pub fn get(&self, cell: CellIndex) -> Option<&CellRecord> {
        self.rows.get(&cell).map(|&row| &self.records[row])
    }

    /// All rows in cell-id order.
    pub fn records(&self) -> &[CellRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [CellRecord] {
        &mut self.records
    }

    /// Cell ids in table order.
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.records.iter().map(|r| r.cell)
    }

    /// Centre-to-centre spacing of edge-adjacent cells, in metres.
    ///
    /// `edge_length * sqrt(3)` for the average hexagon at this resolution.
    /// One BFS step spans this distance, so step counts convert to metres by
    /// multiplication; the result is quantized to the grid, not geodesic.
    pub fn step_metres(&self) -> f64 {
        self.resolution.edge_length_m() * 3f64.sqrt()
    }
}

/// Builds the grid covering both polygon sets.
///
/// The bounding region is `explicit` when given, otherwise the union of both
/// sets' extents. Every cell whose tile intersects that region is included
/// (full coverage, not only polygon-intersecting cells), then tagged against
/// the indexed cell sets. A region with no area fails with a configuration
/// error instead of producing a silent empty grid.
pub fn build_grid(
    resolution: Resolution,
    rock_a: &PolygonSet,
    rock_b: &PolygonSet,
    cells_a: &FxHashSet<CellIndex>,
    cells_b: &FxHashSet<CellIndex>,
    explicit: Option<BoundingBox>,
) -> Result<Grid> {
    let bbox = match explicit {
        Some(bbox) => bbox,
        None => {
            let a = rock_a.bounding_box();
            let b = rock_b.bounding_box();
            match (a, b) {
                (Some(a), Some(b)) => a.union(b),
                (Some(only), None) | (None, Some(only)) => only,
                (None, None) => {
                    return Err(ProspectError::Config(
                        "cannot determine bounding region: both polygon sets are empty \
                         and no explicit bounding box was given"
                            .into(),
                    ));
                }
            }
        }
    };
    if bbox.is_degenerate() {
        return Err(ProspectError::Config(format!(
            "degenerate bounding region: [{}, {}, {}, {}] has no area",
            bbox.west, bbox.south, bbox.east, bbox.north
        )));
    }

    let region = h3o::geom::Polygon::from_degrees(bbox.to_polygon())
        .map_err(|e| ProspectError::Config(format!("bounding region is not tileable: {e}")))?;
    let covering =
        region.to_cells(PolyfillConfig::new(resolution).containment_mode(ContainmentMode::Covers));

    let mut grid = Grid::from_cells(resolution, covering)?;
    grid.tag_intersections(Rock::A, cells_a);
    grid.tag_intersections(Rock::B, cells_b);

    info!(
        "built grid: {} cells at r{} ({} intersect a, {} intersect b)",
        grid.len(),
        u8::from(resolution),
        grid.records().iter().filter(|r| r.intersects_a).count(),
        grid.records().iter().filter(|r| r.intersects_b).count()
    );
    Ok(grid)
}
