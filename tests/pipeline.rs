//! End-to-end pipeline scenarios.

use geo_types::{Polygon, polygon};
use prospectivity::{
    DecayKernel, FsCellCache, Grid, GridSettings, KernelSettings, PipelineConfig, PolygonSet, Rock,
    pipeline,
};

fn square(west: f64, south: f64, size: f64) -> Polygon<f64> {
    polygon![
        (x: west, y: south),
        (x: west + size, y: south),
        (x: west + size, y: south + size),
        (x: west, y: south + size),
        (x: west, y: south),
    ]
}

/// Two overlapping outcrops, so some cells intersect both rock types.
fn overlapping_sets() -> (PolygonSet, PolygonSet) {
    (
        PolygonSet::new("a", vec![square(-122.45, 37.75, 0.03)]),
        PolygonSet::new("b", vec![square(-122.43, 37.76, 0.03)]),
    )
}

fn test_config() -> PipelineConfig {
    PipelineConfig {
        grid: GridSettings { resolution: 8 },
        ..PipelineConfig::default()
    }
}

fn run_overlapping(config: &PipelineConfig) -> Grid {
    let (a, b) = overlapping_sets();
    pipeline::run(&a, &b, None, config, None).unwrap()
}

#[test]
fn scores_stay_in_unit_interval() {
    let grid = run_overlapping(&test_config());
    assert!(!grid.is_empty());
    for record in grid.records() {
        assert!(
            (0.0..=1.0).contains(&record.score),
            "score {} out of range for cell {}",
            record.score,
            record.cell
        );
    }
}

#[test]
fn intersecting_cells_have_zero_distance() {
    let grid = run_overlapping(&test_config());
    for record in grid.records() {
        if record.intersects_a {
            assert_eq!(record.dist_a, Some(0.0));
        }
        if record.intersects_b {
            assert_eq!(record.dist_b, Some(0.0));
        }
    }
}

#[test]
fn score_is_one_exactly_on_double_intersections() {
    let grid = run_overlapping(&test_config());
    let mut double = 0;
    for record in grid.records() {
        if record.dist_a == Some(0.0) && record.dist_b == Some(0.0) {
            assert_eq!(record.score, 1.0);
            double += 1;
        } else {
            assert!(record.score < 1.0);
        }
    }
    assert!(double > 0, "overlapping outcrops must share at least one cell");
}

#[test]
fn empty_rock_b_zeroes_every_score() {
    let (a, _) = overlapping_sets();
    let b = PolygonSet::new("b", Vec::new());
    let grid = pipeline::run(&a, &b, None, &test_config(), None).unwrap();

    assert!(!grid.is_empty());
    for record in grid.records() {
        assert_eq!(record.dist_b, None, "no B sources -> undefined everywhere");
        assert_eq!(record.score, 0.0, "undefined membership must zero the score");
    }
    // A's own field is still defined on its side of the region.
    assert!(grid.records().iter().any(|r| r.dist_a == Some(0.0)));
}

#[test]
fn full_weight_on_a_scores_by_a_alone() {
    let config = PipelineConfig {
        weight_a: 1.0,
        ..test_config()
    };
    let grid = run_overlapping(&config);
    let kernel = config.decay_kernel();

    for record in grid.records() {
        let expected = kernel.membership(record.dist(Rock::A));
        assert!(
            (record.score - expected).abs() < 1e-12,
            "w=1 must reduce to membership of A"
        );
    }
}

#[test]
fn linear_kernel_is_a_drop_in_substitute() {
    let config = PipelineConfig {
        kernel: KernelSettings {
            shape: prospectivity::KernelShape::Linear,
            ..KernelSettings::default()
        },
        ..test_config()
    };
    let grid = run_overlapping(&config);
    assert!(matches!(config.decay_kernel(), DecayKernel::Linear { .. }));
    for record in grid.records() {
        assert!((0.0..=1.0).contains(&record.score));
        if record.dist_a == Some(0.0) && record.dist_b == Some(0.0) {
            assert_eq!(record.score, 1.0);
        }
    }
}

#[test]
fn reruns_produce_identical_tables() {
    let config = test_config();
    let first = run_overlapping(&config);
    let second = run_overlapping(&config);

    assert_eq!(first.len(), second.len());
    for (x, y) in first.records().iter().zip(second.records()) {
        assert_eq!(x.cell, y.cell);
        assert_eq!(x.intersects_a, y.intersects_a);
        assert_eq!(x.intersects_b, y.intersects_b);
        assert_eq!(x.dist_a, y.dist_a);
        assert_eq!(x.dist_b, y.dist_b);
        assert_eq!(x.score, y.score);
    }
}

#[test]
fn cell_cache_does_not_change_results() {
    let config = test_config();
    let (a, b) = overlapping_sets();
    let dir = tempfile::tempdir().unwrap();
    let cache = FsCellCache::new(dir.path());

    let plain = pipeline::run(&a, &b, None, &config, None).unwrap();
    let cold = pipeline::run(&a, &b, None, &config, Some(&cache)).unwrap();
    let warm = pipeline::run(&a, &b, None, &config, Some(&cache)).unwrap();

    for (x, y) in plain.records().iter().zip(cold.records()) {
        assert_eq!(x.cell, y.cell);
        assert_eq!(x.score, y.score);
    }
    for (x, y) in plain.records().iter().zip(warm.records()) {
        assert_eq!(x.cell, y.cell);
        assert_eq!(x.score, y.score);
    }
}

#[test]
fn far_cells_score_below_near_cells() {
    // Push the bounding box well past the outcrops so the grid has cells far
    // from any contact zone.
    let (a, b) = overlapping_sets();
    let bbox = prospectivity::BoundingBox::new(-122.55, 37.70, -122.30, 37.85);
    let grid = pipeline::run(&a, &b, Some(bbox), &test_config(), None).unwrap();

    let best = grid
        .records()
        .iter()
        .map(|r| r.score)
        .fold(f64::NEG_INFINITY, f64::max);
    let worst = grid
        .records()
        .iter()
        .map(|r| r.score)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(best, 1.0);
    assert!(worst < 0.01, "distant cells should decay toward zero");
}

#[test]
fn csv_export_matches_table_shape() {
    let grid = run_overlapping(&test_config());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.csv");
    prospectivity::persist::write_csv(&grid, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), grid.len() + 1);
    assert!(text.starts_with("cell_id,intersects_a,intersects_b,dist_a,dist_b,score"));
}
