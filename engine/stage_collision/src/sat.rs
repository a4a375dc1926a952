//! Separating-axis test for convex polygons.

use stage_ir::{Point, Polygon};

/// Edge lengths below this are treated as degenerate and skipped as axes.
const MIN_EDGE: f64 = 1e-12;

/// Projection interval of a polygon onto an axis.
fn project(polygon: &Polygon, axis: Point) -> (f64, f64) {
    polygon
        .vertices
        .iter()
        .map(|v| v.dot(axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        })
}

/// Unit normals of a polygon's edges.
fn axes(polygon: &Polygon) -> impl Iterator<Item = Point> + '_ {
    polygon.edges().filter_map(|(start, end)| {
        let edge = Point::new(end.x - start.x, end.y - start.y);
        let len = edge.x.hypot(edge.y);
        (len > MIN_EDGE).then(|| Point::new(-edge.y / len, edge.x / len))
    })
}

/// Minimum overlap of two convex polygons over all candidate axes.
///
/// `None` if some axis separates them. Polygons that merely touch have zero
/// overlap on the touching axis and count as separated.
pub fn penetration_depth(a: &Polygon, b: &Polygon) -> Option<f64> {
    if a.vertices.len() < 2 || b.vertices.len() < 2 {
        return None;
    }
    let mut depth = f64::INFINITY;
    for axis in axes(a).chain(axes(b)) {
        let (a_min, a_max) = project(a, axis);
        let (b_min, b_max) = project(b, axis);
        let overlap = a_max.min(b_max) - a_min.max(b_min);
        if overlap <= 0.0 {
            return None;
        }
        depth = depth.min(overlap);
    }
    depth.is_finite().then_some(depth)
}

/// Whether two convex polygons overlap with positive area.
#[inline]
pub fn polygons_intersect(a: &Polygon, b: &Polygon) -> bool {
    penetration_depth(a, b).is_some()
}
