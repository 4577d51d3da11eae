//! Integration tests: snapshot save and restore.
//!
//! - search equivalence between an index and its restored copy
//! - byte-identical save -> open -> save round trip
//! - settings survive the round trip
//! - restore with a caller-provided metric

use smallworld::{Cosine, Index, Settings};
use std::sync::Arc;
use tempfile::TempDir;

fn seeded_points(count: usize, dim: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..count)
        .map(|_| (0..dim).map(|_| rng.f64()).collect())
        .collect()
}

fn build_index(settings: Settings, points: &[Vec<f64>]) -> Index {
    let index = Index::new(points[0].len(), settings).unwrap();
    for (i, point) in points.iter().enumerate() {
        index.insert(format!("p{:04}", i), point.clone()).unwrap();
    }
    index
}

#[test]
fn test_restored_index_answers_identically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.idx");

    let settings = Settings::with_m(4).with_ef_construction(32).with_ef_search(40);
    let points = seeded_points(200, 2, 42);
    let index = build_index(settings, &points);

    index.save(&path).unwrap();
    let restored = Index::open(&path).unwrap();

    assert_eq!(restored.len(), index.len());
    assert_eq!(restored.descriptor_size(), 2);
    assert_eq!(restored.settings(), index.settings());

    // The restored graph is the same graph, so searches must agree exactly.
    for query in seeded_points(50, 2, 7) {
        let before = index.search(&query, 10).unwrap();
        let after = restored.search(&query, 10).unwrap();
        assert_eq!(before, after);
    }
}

#[test]
fn test_roundtrip_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("a.idx");
    let second = dir.path().join("b.idx");

    let points = seeded_points(120, 3, 5);
    let index = build_index(Settings::with_m(4).with_ef_construction(24), &points);

    index.save(&first).unwrap();
    let restored = Index::open(&first).unwrap();
    restored.save(&second).unwrap();

    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert_eq!(a, b, "save -> open -> save must reproduce the file exactly");
}

#[test]
fn test_restored_index_accepts_inserts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.idx");

    let points = seeded_points(50, 2, 3);
    build_index(Settings::with_m(4), &points).save(&path).unwrap();

    let restored = Index::open(&path).unwrap();
    restored.insert("late", vec![0.5, 0.5]).unwrap();
    assert_eq!(restored.len(), 51);

    let results = restored.search(&[0.5, 0.5], 1).unwrap();
    assert_eq!(results[0].name, "late");
}

#[test]
fn test_open_with_metric() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.idx");

    let index = Index::with_metric(2, Settings::default(), Arc::new(Cosine)).unwrap();
    index.insert("east", vec![5.0, 0.0]).unwrap();
    index.insert("north", vec![0.0, 5.0]).unwrap();
    index.save(&path).unwrap();

    let restored = Index::open_with_metric(&path, Arc::new(Cosine)).unwrap();
    let results = restored.search(&[1.0, 0.1], 2).unwrap();
    assert_eq!(results[0].name, "east");
}

#[test]
fn test_single_node_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("t.idx");

    let index = Index::new(3, Settings::default()).unwrap();
    index.insert("only", vec![1.0, 2.0, 3.0]).unwrap();
    index.save(&path).unwrap();

    let restored = Index::open(&path).unwrap();
    assert_eq!(restored.len(), 1);

    let results = restored.search(&[1.0, 2.0, 3.0], 5).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "only");
    assert_eq!(results[0].distance, 0.0);
}
