//! Stage Collision - polygon collision sensor for sprite looks.
//!
//! Every look carries a fixed set of convex polygons in image coordinates.
//! [`check_collision`] places both sets on the stage using the looks' current
//! pose and measures how much they overlap:
//!
//! - `0.0` when either look is hidden, has no polygons, or the two are apart
//! - otherwise the sum, over every intersecting polygon pair, of that pair's
//!   penetration depth (the smallest overlap along a separating axis)
//!
//! Nothing is cached; the pose may change every frame, so each call transforms
//! the polygons afresh.

mod sat;

use smallvec::SmallVec;
use stage_ir::geometry::Vertices;
use stage_ir::{BoundingBox, Look, Point, Polygon};

pub use sat::{penetration_depth, polygons_intersect};

/// Polygons of one look, placed on the stage.
pub type StagePolygons = SmallVec<[Polygon; 4]>;

/// Collision magnitude between two looks (0 = not touching).
pub fn check_collision(a: &Look, b: &Look) -> f64 {
    if !a.visible || !b.visible {
        return 0.0;
    }
    if a.collision_polygons().is_empty() || b.collision_polygons().is_empty() {
        return 0.0;
    }

    let first = transform_polygons(a);
    let second = transform_polygons(b);
    let (Some(first_bounds), Some(second_bounds)) = (bounding_box(&first), bounding_box(&second))
    else {
        return 0.0;
    };
    if !first_bounds.overlaps(&second_bounds) {
        return 0.0;
    }

    let mut total = 0.0;
    for p in &first {
        for q in &second {
            if let Some(depth) = penetration_depth(p, q) {
                total += depth;
            }
        }
    }
    tracing::trace!(
        a = a.data.as_ref().map_or("", |d| d.name.as_str()),
        b = b.data.as_ref().map_or("", |d| d.name.as_str()),
        total,
        "collision check"
    );
    total
}

/// Place a look's polygons on the stage.
///
/// Image coordinates are taken relative to the image centre, scaled by
/// `size / 100`, rotated counter-clockwise by `90 - direction` degrees and
/// translated to the look's position.
pub fn transform_polygons(look: &Look) -> StagePolygons {
    let Some(data) = look.data.as_ref() else {
        return StagePolygons::new();
    };
    let centre = Point::new(data.width / 2.0, data.height / 2.0);
    let scale = look.scale();
    let (sin, cos) = look.rotation().to_radians().sin_cos();

    data.collision_polygons
        .iter()
        .map(|polygon| {
            let vertices: Vertices = polygon
                .vertices
                .iter()
                .map(|p| {
                    let dx = (p.x - centre.x) * scale;
                    let dy = (p.y - centre.y) * scale;
                    Point::new(dx * cos - dy * sin + look.x, dx * sin + dy * cos + look.y)
                })
                .collect();
            Polygon { vertices }
        })
        .collect()
}

/// Bounding box around a set of polygons, `None` if there are no vertices.
pub fn bounding_box(polygons: &[Polygon]) -> Option<BoundingBox> {
    BoundingBox::around(polygons.iter().flat_map(|p| p.vertices.iter()))
}

#[cfg(test)]
mod tests;
