#![warn(missing_docs)]
//! Prospectivity scoring over a hexagonal grid.
//!
//! Turns two sets of rock-type polygons into a continuous prospectivity
//! surface: every H3 cell covering the study area gets a score in `[0, 1]`
//! expressing how likely it sits near a geological contact zone between the
//! two rock types.
//!
//! The pipeline runs in four stages:
//!
//! 1. [`indexer`] - map each polygon set to the hex cells it intersects.
//! 2. [`grid`] - build the full cell table covering the bounding region and
//!    tag per-rock intersection flags.
//! 3. [`distance`] - multi-source BFS per rock type over the hex adjacency
//!    graph, restricted to the grid; step counts convert to metres.
//! 4. [`score`] - decay-kernel memberships combined by a weighted fuzzy AND.
//!
//! Distances are grid-step approximations, not geodesics: a cell's distance
//! is its BFS depth times the centre-to-centre cell spacing, so the error is
//! bounded by the hex grid's quantization at the configured resolution.
//! Grids spanning projection discontinuities (antimeridian, poles) are not
//! supported.

pub mod config;
pub mod distance;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod indexer;
pub mod ingest;
pub mod persist;
pub mod pipeline;
pub mod score;

pub use config::{GridSettings, KernelSettings, KernelShape, PipelineConfig};
pub use error::{ProspectError, Result};
pub use geometry::{BoundingBox, PolygonSet};
pub use grid::{CellRecord, Grid, Rock};
pub use indexer::{CellCache, FsCellCache};
pub use score::DecayKernel;
