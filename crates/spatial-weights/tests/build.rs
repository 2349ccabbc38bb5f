// Integration tests for neighbor-graph construction:
//   queen, rook, knn and distance rules over small square grids.

use geo::{polygon, MultiPolygon};
use spatial_weights::{build, Rule, UnitId};

fn square(x: f64, y: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![polygon![
        (x: x, y: y), (x: x + 1.0, y: y), (x: x + 1.0, y: y + 1.0), (x: x, y: y + 1.0), (x: x, y: y),
    ]])
}

/// 2x2 grid, row-major from the bottom-left: 0 1 / 2 3 (bottom row 0, 1).
fn grid_2x2() -> Vec<MultiPolygon<f64>> {
    vec![square(0.0, 0.0), square(1.0, 0.0), square(0.0, 1.0), square(1.0, 1.0)]
}

fn ids(raw: &[u32]) -> Vec<UnitId> { raw.iter().map(|&u| UnitId(u)).collect() }

#[test]
fn queen_links_diagonal_corners() {
    let adj = build(&grid_2x2(), Rule::Queen).unwrap();
    assert_eq!(adj.neighbors(UnitId(0)), &ids(&[1, 2, 3])[..]);
    assert_eq!(adj.neighbors(UnitId(3)), &ids(&[0, 1, 2])[..]);
    assert!(adj.is_symmetric());
}

#[test]
fn rook_requires_shared_edge() {
    let adj = build(&grid_2x2(), Rule::Rook).unwrap();
    assert_eq!(adj.neighbors(UnitId(0)), &ids(&[1, 2])[..]);
    assert!(!adj.contains(UnitId(0), UnitId(3)));
    assert!(!adj.contains(UnitId(1), UnitId(2)));
    assert!(adj.is_symmetric());
}

#[test]
fn rook_is_subset_of_queen() {
    let shapes = grid_2x2();
    let rook = build(&shapes, Rule::Rook).unwrap();
    let queen = build(&shapes, Rule::Queen).unwrap();
    for u in (0..4).map(UnitId) {
        assert!(rook.neighbors(u).iter().all(|&v| queen.contains(u, v)));
    }
}

#[test]
fn isolated_unit_is_kept_with_empty_row() {
    let mut shapes = grid_2x2();
    shapes.push(square(10.0, 10.0));

    let adj = build(&shapes, Rule::Queen).unwrap();
    assert_eq!(adj.num_units(), 5);
    assert!(adj.neighbors(UnitId(4)).is_empty());
    assert_eq!(adj.isolates().collect::<Vec<_>>(), vec![UnitId(4)]);
}

#[test]
fn no_self_loops_under_any_rule() {
    let shapes = grid_2x2();
    for rule in [Rule::Queen, Rule::Rook, Rule::Knn { k: 2 }, Rule::Distance { radius: 5.0 }] {
        let adj = build(&shapes, rule).unwrap();
        for u in (0..4).map(UnitId) {
            assert!(!adj.contains(u, u), "{rule} produced a self-loop on {u}");
        }
    }
}

#[test]
fn knn_returns_exactly_k_sorted_by_distance() {
    // Centroids on a line at x = 0.5, 1.5, 2.5, 5.5
    let shapes = vec![square(0.0, 0.0), square(1.0, 0.0), square(2.0, 0.0), square(5.0, 0.0)];
    let adj = build(&shapes, Rule::Knn { k: 2 }).unwrap();

    for u in (0..4).map(UnitId) { assert_eq!(adj.degree(u), 2) }
    assert_eq!(adj.neighbors(UnitId(3)), &ids(&[1, 2])[..]);
    // 3 picks 2 and 1, but nobody picks 3 back: knn need not be symmetric.
    assert!(!adj.is_symmetric());
}

#[test]
fn distance_rule_is_symmetric_and_bounded() {
    let shapes = vec![square(0.0, 0.0), square(1.0, 0.0), square(2.0, 0.0), square(5.0, 0.0)];
    let adj = build(&shapes, Rule::Distance { radius: 1.0 }).unwrap();

    assert_eq!(adj.neighbors(UnitId(0)), &ids(&[1])[..]);
    assert_eq!(adj.neighbors(UnitId(1)), &ids(&[0, 2])[..]);
    assert!(adj.neighbors(UnitId(3)).is_empty());
    assert!(adj.is_symmetric());
}

#[test]
fn empty_geometry_becomes_isolate() {
    let shapes = vec![square(0.0, 0.0), square(1.0, 0.0), MultiPolygon(vec![])];
    for rule in [Rule::Queen, Rule::Knn { k: 1 }] {
        let adj = build(&shapes, rule).unwrap();
        assert!(adj.neighbors(UnitId(2)).is_empty());
        assert!(!adj.contains(UnitId(0), UnitId(2)));
    }
}
