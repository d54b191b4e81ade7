//! Distance Field Engine: multi-source BFS over the hex adjacency graph.
//!
//! For each rock type, every grid cell gets the step count to the nearest
//! source cell (a cell whose intersection flag is set), measured along
//! edge-adjacency and restricted to the grid's own cell set. Cells outside
//! the grid are not traversable, so the search runs on a finite vertex set
//! with the six-neighbour function evaluated on demand.
//!
//! Correctness invariant: BFS explores in non-decreasing depth order and
//! each cell is recorded exactly once, on first visit, so the stored depth
//! is the length of a shortest path from any source. Uniform edge weights
//! mean no relaxation or revisiting is ever needed.

use std::collections::VecDeque;

use h3o::CellIndex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::grid::{Grid, Rock};

/// Step distances from one BFS run.
///
/// A total map over the grid: cells absent from the inner map have no
/// defined distance - either the run had zero sources, or the cell is
/// unreachable inside the grid. "Undefined" is a distinct outcome from both
/// zero and infinity and propagates as such into scoring.
pub struct DistanceField {
    steps: FxHashMap<CellIndex, u32>,
}

impl DistanceField {
    /// Step count to the nearest source, or `None` when undefined.
    pub fn steps(&self, cell: CellIndex) -> Option<u32> {
        self.steps.get(&cell).copied()
    }

    /// Number of cells with a defined distance.
    pub fn reached(&self) -> usize {
        self.steps.len()
    }
}

/// Runs one multi-source BFS for the given rock type.
///
/// Sources are the grid cells whose flag for `rock` is set; they seed the
/// FIFO queue at depth 0. With zero sources the result is entirely
/// undefined. An empty grid yields an empty field, not an error.
pub fn distance_field(grid: &Grid, rock: Rock) -> DistanceField {
    let mut steps = FxHashMap::default();
    let mut queue = VecDeque::new();

    for record in grid.records() {
        if record.intersects(rock) {
            steps.insert(record.cell, 0u32);
            queue.push_back(record.cell);
        }
    }

    while let Some(cell) = queue.pop_front() {
        let depth = steps[&cell];
        let neighbors: Vec<CellIndex> = cell.grid_disk(1);
        for neighbor in neighbors {
            if neighbor == cell || !grid.contains(neighbor) {
                continue;
            }
            // First visit wins: BFS depth order makes this the minimum.
            if !steps.contains_key(&neighbor) {
                steps.insert(neighbor, depth + 1);
                queue.push_back(neighbor);
            }
        }
    }

    debug!(
        "distance field '{}': {}/{} cells reached",
        rock.tag(),
        steps.len(),
        grid.len()
    );
    DistanceField { steps }
}

/// Computes both distance fields and writes the metre columns in place.
///
/// Step counts convert to metres via the grid's centre-to-centre spacing;
/// the result approximates geodesic distance only to within the hex grid's
/// quantization error at this resolution.
pub fn attach_distances(grid: &mut Grid) {
    let field_a = distance_field(grid, Rock::A);
    let field_b = distance_field(grid, Rock::B);

    let step_m = grid.step_metres();
    for record in grid.records_mut() {
        let cell = record.cell;
        record.set_dist(Rock::A, field_a.steps(cell).map(|s| f64::from(s) * step_m));
        record.set_dist(Rock::B, field_b.steps(cell).map(|s| f64::from(s) * step_m));
    }
}
