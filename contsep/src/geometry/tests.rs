use super::*;

const EPSILON: f64 = 1e-10;

fn square(x0: f64, y0: f64, side: f64) -> Polygon {
    // Closed ring, first vertex repeated
    Polygon::from_xy(&[
        (x0, y0),
        (x0 + side, y0),
        (x0 + side, y0 + side),
        (x0, y0 + side),
        (x0, y0),
    ])
}

#[test]
fn test_area_is_winding_independent() {
    let ccw = square(0.0, 0.0, 3.0);
    let cw = Polygon::new(ccw.vertices().iter().rev().copied().collect());
    assert!((ccw.area() - 9.0).abs() < EPSILON);
    assert!((cw.area() - 9.0).abs() < EPSILON);
    assert!(ccw.signed_area() > 0.0);
    assert!(cw.signed_area() < 0.0);
}

#[test]
fn test_closed_and_open_rings_have_equal_area() {
    let closed = square(1.0, 1.0, 2.0);
    let open = Polygon::new(closed.vertices()[..4].to_vec());
    assert!((closed.area() - open.area()).abs() < EPSILON);
}

#[test]
fn test_contains_inside_and_outside() {
    let sq = square(0.0, 0.0, 4.0);
    assert!(sq.contains(DVec2::new(2.0, 2.0)));
    assert!(sq.contains(DVec2::new(0.1, 3.9)));
    assert!(!sq.contains(DVec2::new(-0.1, 2.0)));
    assert!(!sq.contains(DVec2::new(2.0, 4.5)));
    assert!(!sq.contains(DVec2::new(f64::NAN, 2.0)));
}

#[test]
fn test_contains_concave() {
    // U shape opening upward; the notch is outside
    let u = Polygon::from_xy(&[
        (0.0, 0.0),
        (6.0, 0.0),
        (6.0, 6.0),
        (4.0, 6.0),
        (4.0, 2.0),
        (2.0, 2.0),
        (2.0, 6.0),
        (0.0, 6.0),
    ]);
    assert!(u.contains(DVec2::new(1.0, 5.0)));
    assert!(u.contains(DVec2::new(5.0, 5.0)));
    assert!(u.contains(DVec2::new(3.0, 1.0)));
    assert!(!u.contains(DVec2::new(3.0, 4.0)));
}

#[test]
fn test_contains_ray_through_vertex() {
    // Diamond: a horizontal ray from the centre passes exactly through a vertex
    let diamond = Polygon::from_xy(&[(0.0, -2.0), (2.0, 0.0), (0.0, 2.0), (-2.0, 0.0)]);
    assert!(diamond.contains(DVec2::new(0.0, 0.0)));
    assert!(!diamond.contains(DVec2::new(-3.0, 0.0)));
}

#[test]
fn test_degenerate_too_few_vertices() {
    let tri = Polygon::from_xy(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (0.0, 0.0)]);
    assert_eq!(tri.vertex_count(), 4);
    assert!(tri.area() > Polygon::MIN_AREA);
    assert!(tri.is_degenerate());
}

#[test]
fn test_degenerate_non_finite() {
    let mut pts = vec![(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 5.0), (0.0, 0.0)];
    pts[2].1 = f64::NAN;
    assert!(Polygon::from_xy(&pts).is_degenerate());
    pts[2].1 = f64::INFINITY;
    assert!(Polygon::from_xy(&pts).is_degenerate());
}

#[test]
fn test_degenerate_area_threshold_is_inclusive() {
    // side sqrt(2) -> area exactly 2
    let at_limit = Polygon::from_xy(&[
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 1.0),
        (0.0, 1.0),
        (0.0, 0.0),
    ]);
    assert!((at_limit.area() - 2.0).abs() < EPSILON);
    assert!(at_limit.is_degenerate());

    assert!(!square(0.0, 0.0, 1.5).is_degenerate());
}

#[test]
fn test_centroid() {
    let c = square(2.0, 4.0, 2.0).centroid().unwrap();
    assert!((c.x - 3.0).abs() < EPSILON);
    assert!((c.y - 5.0).abs() < EPSILON);

    let flat = Polygon::from_xy(&[(0.0, 0.0), (2.0, 0.0), (4.0, 0.0)]);
    let c = flat.centroid().unwrap();
    assert!((c.x - 2.0).abs() < EPSILON);

    assert!(Polygon::new(Vec::new()).centroid().is_none());
}

#[test]
fn test_bounds_and_map() {
    let sq = square(1.0, 2.0, 3.0);
    let b = sq.bounds().unwrap();
    assert_eq!(b.min, DVec2::new(1.0, 2.0));
    assert_eq!(b.max, DVec2::new(4.0, 5.0));
    assert!(b.contains(DVec2::new(4.0, 5.0)));
    assert!(!b.contains(DVec2::new(4.1, 5.0)));

    let shifted = sq.map(|v| v + DVec2::new(10.0, 0.0));
    assert!(shifted.contains(DVec2::new(12.5, 3.5)));
    assert!((shifted.area() - sq.area()).abs() < EPSILON);

    let padded = b.padded(0.5);
    assert_eq!(padded.size(), DVec2::new(4.0, 4.0));
}
