//! Cell Indexer: polygon sets to hex cell sets.
//!
//! Maps each [`PolygonSet`] to the set of H3 cells whose tile intersects at
//! least one of its polygons, at a fixed resolution. Invalid or degenerate
//! polygons are a data-quality signal, not an error: they are skipped with a
//! warning and the rest of the set is still indexed.
//!
//! Indexing results may be memoized behind a [`CellCache`] keyed by
//! `(set tag, resolution)`. The cache is a pure optimization: a hit must
//! yield exactly the set a fresh run would, and any unreadable cache entry
//! is treated as a miss.

use std::fs;
use std::path::PathBuf;

use geo::Area;
use h3o::geom::{ContainmentMode, PolyfillConfig, ToCells};
use h3o::{CellIndex, Resolution};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::geometry::PolygonSet;

/// Cells whose tile intersects at least one polygon of the set.
///
/// Uses covering containment, so a polygon smaller than a single tile still
/// indexes the tile that contains it. The result is deduplicated; iteration
/// order is unspecified.
pub fn cells_intersecting(set: &PolygonSet, resolution: Resolution) -> FxHashSet<CellIndex> {
    let mut cells = FxHashSet::default();
    let mut skipped = 0usize;

    for polygon in set.polygons() {
        if polygon.unsigned_area() == 0.0 {
            warn!(
                "skipping zero-area polygon in set '{}' (data quality)",
                set.tag()
            );
            skipped += 1;
            continue;
        }
        let config = PolyfillConfig::new(resolution).containment_mode(ContainmentMode::Covers);
        match h3o::geom::Polygon::from_degrees(polygon.clone()) {
            Ok(poly) => cells.extend(poly.to_cells(config)),
            Err(err) => {
                warn!(
                    "skipping invalid polygon in set '{}' (data quality): {err}",
                    set.tag()
                );
                skipped += 1;
            }
        }
    }

    debug!(
        "indexed set '{}': {} polygons -> {} cells at r{} ({} skipped)",
        set.tag(),
        set.len(),
        cells.len(),
        u8::from(resolution),
        skipped
    );
    cells
}

/// Indexes a set, consulting `cache` first when one is supplied.
pub fn index_with_cache(
    set: &PolygonSet,
    resolution: Resolution,
    cache: Option<&dyn CellCache>,
) -> FxHashSet<CellIndex> {
    if let Some(cache) = cache {
        if let Some(cells) = cache.get(set.tag(), resolution) {
            debug!(
                "cell cache hit for set '{}' at r{}: {} cells",
                set.tag(),
                u8::from(resolution),
                cells.len()
            );
            return cells.into_iter().collect();
        }
    }

    let cells = cells_intersecting(set, resolution);
    if let Some(cache) = cache {
        let mut sorted: Vec<CellIndex> = cells.iter().copied().collect();
        sorted.sort_unstable();
        cache.put(set.tag(), resolution, &sorted);
    }
    cells
}

// ── Cache plumbing ──────────────────────────────────────────────────

/// Memoization of per-tag indexing results.
///
/// Implementations must key on both tag and resolution so a changed
/// resolution never reuses stale cells. `put` failures must not surface as
/// pipeline errors; dropping a cache write only costs a recomputation.
pub trait CellCache {
    /// Cached cells for `(tag, resolution)`, or `None` on miss.
    fn get(&self, tag: &str, resolution: Resolution) -> Option<Vec<CellIndex>>;

    /// Stores cells for `(tag, resolution)`.
    fn put(&self, tag: &str, resolution: Resolution, cells: &[CellIndex]);
}

/// On-disk cache: one JSON array of u64 cell ids per `(tag, resolution)`.
pub struct FsCellCache {
    dir: PathBuf,
}

impl FsCellCache {
    /// Cache rooted at `dir`. The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, tag: &str, resolution: Resolution) -> PathBuf {
        self.dir.join(format!("{tag}_r{}.json", u8::from(resolution)))
    }
}

impl CellCache for FsCellCache {
    fn get(&self, tag: &str, resolution: Resolution) -> Option<Vec<CellIndex>> {
        let path = self.entry_path(tag, resolution);
        let raw = fs::read(&path).ok()?;
        let ids: Vec<u64> = match serde_json::from_slice(&raw) {
            Ok(ids) => ids,
            Err(err) => {
                warn!("unreadable cell cache entry {}: {err}", path.display());
                return None;
            }
        };
        let mut cells = Vec::with_capacity(ids.len());
        for id in ids {
            match CellIndex::try_from(id) {
                Ok(cell) => cells.push(cell),
                Err(err) => {
                    warn!("corrupt cell id in cache entry {}: {err}", path.display());
                    return None;
                }
            }
        }
        Some(cells)
    }

    fn put(&self, tag: &str, resolution: Resolution, cells: &[CellIndex]) {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!("cannot create cache dir {}: {err}", self.dir.display());
            return;
        }
        let ids: Vec<u64> = cells.iter().map(|&c| u64::from(c)).collect();
        let path = self.entry_path(tag, resolution);
        match serde_json::to_vec(&ids) {
            Ok(bytes) => {
                if let Err(err) = fs::write(&path, bytes) {
                    warn!("cannot write cache entry {}: {err}", path.display());
                }
            }
            Err(err) => warn!("cannot encode cache entry {}: {err}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::polygon;
    use h3o::LatLng;

    fn square(west: f64, south: f64, size: f64) -> geo_types::Polygon<f64> {
        polygon![
            (x: west, y: south),
            (x: west + size, y: south),
            (x: west + size, y: south + size),
            (x: west, y: south + size),
            (x: west, y: south),
        ]
    }

    fn sample_set() -> PolygonSet {
        PolygonSet::new("a", vec![square(-122.41, 37.76, 0.02)])
    }

    #[test]
    fn indexes_cell_containing_polygon_centroid() {
        let cells = cells_intersecting(&sample_set(), Resolution::Seven);
        assert!(!cells.is_empty());

        let centroid = LatLng::new(37.77, -122.40).unwrap();
        assert!(cells.contains(&centroid.to_cell(Resolution::Seven)));
    }

    #[test]
    fn resolution_controls_cell_count() {
        let coarse = cells_intersecting(&sample_set(), Resolution::Six);
        let fine = cells_intersecting(&sample_set(), Resolution::Eight);
        assert!(fine.len() > coarse.len());
    }

    #[test]
    fn empty_set_indexes_to_nothing() {
        let set = PolygonSet::new("b", Vec::new());
        assert!(cells_intersecting(&set, Resolution::Seven).is_empty());
    }

    #[test]
    fn invalid_polygon_is_skipped_not_fatal() {
        // A non-finite vertex makes the polygon untileable; the good polygon
        // must still be indexed.
        let broken = polygon![
            (x: -122.41, y: 37.76),
            (x: f64::NAN, y: 37.76),
            (x: -122.40, y: 37.77),
            (x: -122.41, y: 37.76),
        ];
        let set = PolygonSet::new("a", vec![broken, square(-122.41, 37.76, 0.02)]);
        let cells = cells_intersecting(&set, Resolution::Seven);
        let good_only = cells_intersecting(&sample_set(), Resolution::Seven);
        assert_eq!(cells, good_only);
    }

    #[test]
    fn zero_area_polygon_is_skipped() {
        let set = PolygonSet::new("a", vec![square(-122.41, 37.76, 0.0)]);
        assert!(cells_intersecting(&set, Resolution::Seven).is_empty());
    }

    #[test]
    fn tiny_polygon_still_maps_to_its_covering_cell() {
        // Far smaller than one res-7 tile.
        let set = PolygonSet::new("a", vec![square(-122.4001, 37.7701, 0.0001)]);
        let cells = cells_intersecting(&set, Resolution::Seven);
        assert!(!cells.is_empty());
    }

    // ── Cache behavior ──────────────────────────────────────────────

    #[test]
    fn fs_cache_roundtrips_cells() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCellCache::new(dir.path());

        let fresh = index_with_cache(&sample_set(), Resolution::Seven, Some(&cache));
        let cached = index_with_cache(&sample_set(), Resolution::Seven, Some(&cache));
        assert_eq!(fresh, cached);
        assert!(
            dir.path().join("a_r7.json").exists(),
            "cache entry should be written under tag and resolution"
        );
    }

    #[test]
    fn cache_never_changes_the_result() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCellCache::new(dir.path());

        let without = index_with_cache(&sample_set(), Resolution::Seven, None);
        let with = index_with_cache(&sample_set(), Resolution::Seven, Some(&cache));
        let hit = index_with_cache(&sample_set(), Resolution::Seven, Some(&cache));
        assert_eq!(without, with);
        assert_eq!(without, hit);
    }

    #[test]
    fn cache_entries_are_keyed_by_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCellCache::new(dir.path());

        let r7 = index_with_cache(&sample_set(), Resolution::Seven, Some(&cache));
        let r8 = index_with_cache(&sample_set(), Resolution::Eight, Some(&cache));
        assert_ne!(r7, r8);
        assert!(dir.path().join("a_r7.json").exists());
        assert!(dir.path().join("a_r8.json").exists());
    }

    #[test]
    fn corrupt_cache_entry_falls_back_to_recompute() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FsCellCache::new(dir.path());
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join("a_r7.json"), b"not json").unwrap();

        let cells = index_with_cache(&sample_set(), Resolution::Seven, Some(&cache));
        assert_eq!(
            cells,
            cells_intersecting(&sample_set(), Resolution::Seven),
            "a broken cache entry must behave like a miss"
        );
    }
}
