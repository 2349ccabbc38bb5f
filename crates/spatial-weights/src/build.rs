//! Neighbor-graph construction over a slice of polygon geometries.
//!
//! Contiguity rules (queen, rook) query an R-tree of bounding boxes and
//! confirm candidates with a DE-9IM relate; distance rules (knn, distance)
//! query an R-tree of centroids.  Every unit gets a row, so units without
//! neighbors survive as isolates.

use geo::{BoundingRect, Centroid, Coord, MultiPolygon, Relate};
use rstar::{RTree, AABB};

use crate::adj::AdjacencyMatrix;
use crate::bbox::{BoundingBox, CentroidPoint};
use crate::error::WeightsError;
use crate::rule::Rule;
use crate::unit::UnitId;

/// Build the adjacency matrix for `shapes` under `rule`.  `UnitId(i)` refers
/// to `shapes[i]`.
pub fn build(shapes: &[MultiPolygon<f64>], rule: Rule) -> Result<AdjacencyMatrix, WeightsError> {
    let lists = match rule {
        Rule::Queen => contiguity(shapes, false)?,
        Rule::Rook => contiguity(shapes, true)?,
        Rule::Knn { k } => knn(&centroids(shapes), k),
        Rule::Distance { radius } => within_distance(&centroids(shapes), radius),
    };
    AdjacencyMatrix::from_lists(lists)
}

/// Pairwise contiguity.  Queen links any pair whose closures intersect; rook
/// additionally requires a one-dimensional shared boundary (or an areal
/// overlap, which real-world tessellations occasionally contain).
fn contiguity(shapes: &[MultiPolygon<f64>], rook: bool) -> Result<Vec<Vec<UnitId>>, WeightsError> {
    let rtree = RTree::bulk_load(
        shapes.iter().enumerate()
            .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
            .collect()
    );

    let mut lists = vec![Vec::new(); shapes.len()];
    for (i, shape) in shapes.iter().enumerate() {
        let Some(rect) = shape.bounding_rect() else { continue };

        for cand in rtree.locate_in_envelope_intersecting(&BoundingBox::search_envelope(&rect, 0.0)) {
            let j = cand.idx();
            if j <= i { continue } // check each unordered pair once

            let im = shape.relate(&shapes[j]);
            if !im.is_intersects() { continue }

            let linked = if rook {
                // Index 4 is Boundary/Boundary, index 0 is Interior/Interior.
                im.matches("****1****").map_err(|e| WeightsError::Predicate(e.to_string()))?
                    || im.matches("2********").map_err(|e| WeightsError::Predicate(e.to_string()))?
            } else { true };

            if linked {
                lists[i].push(UnitId::from(j));
                lists[j].push(UnitId::from(i));
            }
        }
    }

    Ok(lists)
}

/// Centroid of each shape, or `None` for empty geometries.
fn centroids(shapes: &[MultiPolygon<f64>]) -> Vec<Option<Coord<f64>>> {
    shapes.iter().map(|shape| shape.centroid().map(|p| p.0)).collect()
}

fn point_tree(points: &[Option<Coord<f64>>]) -> RTree<CentroidPoint> {
    RTree::bulk_load(
        points.iter().enumerate()
            .filter_map(|(idx, p)| p.map(|coord| CentroidPoint { idx, coord }))
            .collect()
    )
}

/// Candidates within `radius` of `points[i]`, excluding `i`, as (distance, idx).
fn candidates_within(tree: &RTree<CentroidPoint>, i: usize, at: Coord<f64>, radius: f64) -> Vec<(f64, usize)> {
    let envelope = AABB::from_corners([at.x - radius, at.y - radius], [at.x + radius, at.y + radius]);
    tree.locate_in_envelope_intersecting(&envelope)
        .filter(|cand| cand.idx != i)
        .map(|cand| (cand.distance(at), cand.idx))
        .filter(|&(d, _)| d <= radius)
        .collect()
}

/// The `k` nearest centroids of every unit, ties broken by row index.
///
/// Grows a square search window until it holds at least `k` candidates
/// within the window's inscribed radius; any unit outside that radius is
/// farther than all of them, so the search is exact.
fn knn(points: &[Option<Coord<f64>>], k: usize) -> Vec<Vec<UnitId>> {
    let tree = point_tree(points);
    let present = points.iter().flatten().count();

    // Diagonal of the centroid extent bounds every pairwise distance.
    let extent = points.iter().flatten().fold(None::<(Coord<f64>, Coord<f64>)>, |acc, &c| match acc {
        None => Some((c, c)),
        Some((lo, hi)) => Some((
            Coord { x: lo.x.min(c.x), y: lo.y.min(c.y) },
            Coord { x: hi.x.max(c.x), y: hi.y.max(c.y) },
        )),
    });
    let diagonal = extent.map_or(0.0, |(lo, hi)| (hi.x - lo.x).hypot(hi.y - lo.y));
    let initial = if diagonal > 0.0 {
        diagonal * (k as f64 / present.max(1) as f64).sqrt()
    } else { 1.0 };
    let max_radius = diagonal.max(initial);

    points.iter().enumerate().map(|(i, p)| {
        let Some(at) = *p else { return Vec::new() };

        let mut radius = initial;
        loop {
            let mut found = candidates_within(&tree, i, at, radius);
            if found.len() >= k || radius >= max_radius {
                found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                found.truncate(k);
                return found.into_iter().map(|(_, j)| UnitId::from(j)).collect();
            }
            radius *= 2.0;
        }
    }).collect()
}

/// All centroids within `radius` of every unit.
fn within_distance(points: &[Option<Coord<f64>>], radius: f64) -> Vec<Vec<UnitId>> {
    let tree = point_tree(points);
    points.iter().enumerate().map(|(i, p)| match *p {
        Some(at) => candidates_within(&tree, i, at, radius).into_iter()
            .map(|(_, j)| UnitId::from(j))
            .collect(),
        None => Vec::new(),
    }).collect()
}
