use pretty_assertions::assert_eq;
use proptest::prelude::*;
use stage_ir::LookData;

use super::*;

fn square_look(name: &str, side: f64) -> Look {
    Look::with_data(LookData {
        name: name.to_owned(),
        width: side,
        height: side,
        collision_polygons: vec![Polygon::rect(0.0, 0.0, side, side)],
    })
}

/// A 100x100 ring approximated by two halves, each split in convex pieces.
fn donut_look() -> Look {
    Look::with_data(LookData {
        name: "donut".to_owned(),
        width: 100.0,
        height: 100.0,
        collision_polygons: vec![
            Polygon::rect(0.0, 0.0, 100.0, 30.0),
            Polygon::rect(0.0, 70.0, 100.0, 30.0),
        ],
    })
}

#[test]
fn test_apart_looks_do_not_collide() {
    let a = square_look("a", 100.0);
    let mut b = square_look("b", 100.0);
    b.x = 250.0;
    assert_eq!(check_collision(&a, &b), 0.0);
}

#[test]
fn test_moving_closer_collides() {
    let a = square_look("a", 100.0);
    let mut b = square_look("b", 100.0);
    b.x = 250.0;
    b.x -= 200.0;
    assert!(check_collision(&a, &b) > 0.0);
}

#[test]
fn test_growing_collides() {
    let a = square_look("a", 100.0);
    let mut b = square_look("b", 100.0);
    b.x = 150.0;
    assert_eq!(check_collision(&a, &b), 0.0);
    b.set_size(b.size() + 300.0);
    assert!(check_collision(&a, &b) > 0.0);
}

#[test]
fn test_touching_edges_do_not_collide() {
    let a = square_look("a", 100.0);
    let mut b = square_look("b", 100.0);
    b.x = 100.0;
    assert_eq!(check_collision(&a, &b), 0.0);
}

#[test]
fn test_hidden_look_never_collides() {
    let a = square_look("a", 100.0);
    let mut b = square_look("b", 100.0);
    b.visible = false;
    assert_eq!(check_collision(&a, &b), 0.0);
}

#[test]
fn test_look_without_polygons_never_collides() {
    let a = square_look("a", 100.0);
    let b = Look::default();
    assert_eq!(check_collision(&a, &b), 0.0);
    assert_eq!(check_collision(&b, &a), 0.0);
}

#[test]
fn test_rotation_is_applied() {
    let bar = Look::with_data(LookData {
        name: "bar".to_owned(),
        width: 100.0,
        height: 10.0,
        collision_polygons: vec![Polygon::rect(0.0, 0.0, 100.0, 10.0)],
    });
    let mut dot = square_look("dot", 10.0);
    dot.y = 40.0;

    let mut upright = bar;
    assert_eq!(check_collision(&upright, &dot), 0.0);
    upright.set_direction(0.0);
    assert!(check_collision(&upright, &dot) > 0.0);
}

#[test]
fn test_transform_centres_on_position() {
    let mut look = square_look("a", 10.0);
    look.set_position(20.0, -5.0);
    let placed = transform_polygons(&look);
    let bounds = bounding_box(&placed);
    assert_eq!(
        bounds,
        Some(BoundingBox {
            min: Point::new(15.0, -10.0),
            max: Point::new(25.0, 0.0),
        })
    );
}

#[test]
fn test_donut_hole_is_empty() {
    let donut = donut_look();
    let pea = square_look("pea", 10.0);
    assert_eq!(check_collision(&donut, &pea), 0.0);

    let mut on_rim = pea.clone();
    on_rim.y = 40.0;
    assert!(check_collision(&donut, &on_rim) > 0.0);
}

#[test]
fn test_multi_polygon_sums_pairs() {
    let donut = donut_look();
    let mut column = Look::with_data(LookData {
        name: "column".to_owned(),
        width: 10.0,
        height: 200.0,
        collision_polygons: vec![Polygon::rect(0.0, 0.0, 10.0, 200.0)],
    });
    column.x = 0.0;
    let both_rims = check_collision(&donut, &column);

    column.y = 80.0;
    let one_rim = check_collision(&donut, &column);
    assert!(both_rims > one_rim);
    assert!(one_rim > 0.0);
}

#[test]
fn test_polygons_intersect() {
    let a = Polygon::rect(0.0, 0.0, 10.0, 10.0);
    let b = Polygon::rect(5.0, 5.0, 10.0, 10.0);
    let c = Polygon::rect(20.0, 0.0, 10.0, 10.0);
    assert!(polygons_intersect(&a, &b));
    assert!(!polygons_intersect(&a, &c));
    assert_eq!(penetration_depth(&a, &b), Some(5.0));
}

#[test]
fn test_triangle_separated_by_its_own_edge() {
    // Boxes overlap, but the triangle's hypotenuse separates them.
    let triangle = Polygon::new([
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(0.0, 10.0),
    ]);
    let square = Polygon::rect(8.0, 8.0, 4.0, 4.0);
    assert!(!polygons_intersect(&triangle, &square));
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 500,
        ..ProptestConfig::default()
    })]

    /// Sliding one look toward the other never lowers the magnitude.
    #[test]
    fn closer_never_collides_less(far in 0.0f64..200.0, closer_by in 0.0f64..200.0) {
        let a = square_look("a", 100.0);
        let mut b = square_look("b", 100.0);
        b.x = far;
        let at_far = check_collision(&a, &b);
        b.x = (far - closer_by).max(0.0);
        let at_near = check_collision(&a, &b);
        prop_assert!(at_near >= at_far);
    }

    /// Argument order does not matter.
    #[test]
    fn collision_is_symmetric(dx in -150.0f64..150.0, dy in -150.0f64..150.0, dir in -180.0f64..180.0) {
        let a = square_look("a", 100.0);
        let mut b = square_look("b", 60.0);
        b.set_position(dx, dy);
        b.set_direction(dir);
        let ab = check_collision(&a, &b);
        let ba = check_collision(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-9);
        prop_assert!(ab >= 0.0);
    }
}
