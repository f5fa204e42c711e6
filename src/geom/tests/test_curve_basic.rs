use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::geom::{
    ArcCurve, Curve, Curve3, Interval, LineCurve, Plane, Point3, PolylineCurve, Transform, Vec3,
};

fn assert_close(a: Point3, b: Point3, tol: f64) {
    assert!(a.distance_to(b) <= tol, "{a:?} != {b:?}");
}

#[test]
fn line_maps_domain_onto_segment() {
    let line = LineCurve::new(Point3::ORIGIN, Point3::new(4.0, 0.0, 0.0), Interval::new(2.0, 6.0));
    assert_close(line.point_at(3.0), Point3::new(1.0, 0.0, 0.0), 1e-12);
    assert_eq!(line.derivative_at(4.0), Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn arc_from_three_points_uses_sweep_as_domain() {
    let arc = ArcCurve::from_three_points(
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
    )
    .unwrap();
    assert!((arc.radius - 1.0).abs() < 1e-12);
    assert!((arc.sweep() - PI).abs() < 1e-12);
    assert!(arc.domain.epsilon_equals(Interval::new(0.0, PI), 1e-12));
    assert_close(arc.mid_point(), Point3::new(0.0, 1.0, 0.0), 1e-12);
    assert_close(arc.end_point(), Point3::new(-1.0, 0.0, 0.0), 1e-12);
}

#[test]
fn arc_from_collinear_points_is_none() {
    let arc = ArcCurve::from_three_points(
        Point3::ORIGIN,
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
    );
    assert!(arc.is_none());
}

#[test]
fn reversed_arc_traces_same_points_backwards() {
    let arc = Curve::Arc(ArcCurve {
        plane: Plane::WORLD_XY,
        radius: 2.0,
        angle: Interval::new(0.0, FRAC_PI_2),
        domain: Interval::new(0.0, 1.0),
    });
    let rev = arc.reversed();
    assert_eq!(rev.domain(), Interval::new(-1.0, 0.0));
    assert_close(rev.start_point(), arc.end_point(), 1e-12);
    assert_close(rev.end_point(), arc.start_point(), 1e-12);
    assert_close(rev.point_at(-0.3), arc.point_at(0.3), 1e-12);
}

#[test]
fn trimmed_arc_keeps_parameters() {
    let circle = Curve::Arc(ArcCurve::circle(Plane::WORLD_XY, 1.0));
    let piece = circle.trimmed(Interval::new(FRAC_PI_2, PI)).unwrap();
    assert_eq!(piece.domain(), Interval::new(FRAC_PI_2, PI));
    assert_close(piece.start_point(), Point3::new(0.0, 1.0, 0.0), 1e-12);
    assert_close(piece.point_at(3.0), circle.point_at(3.0), 1e-12);
}

#[test]
fn circle_is_closed_and_has_expected_length() {
    let circle = Curve::Arc(ArcCurve::circle(Plane::WORLD_XY, 1.5));
    assert!(circle.is_closed(1e-12));
    assert!((circle.length() - 1.5 * TAU).abs() < 1e-12);
}

#[test]
fn polyline_is_parametrized_by_chord_length() {
    let poly = PolylineCurve::new(vec![
        Point3::ORIGIN,
        Point3::new(3.0, 0.0, 0.0),
        Point3::new(3.0, 4.0, 0.0),
    ]);
    assert_eq!(poly.domain(), Interval::new(0.0, 7.0));
    assert_close(poly.point_at(5.0), Point3::new(3.0, 2.0, 0.0), 1e-12);
    assert!((poly.closest_point(Point3::new(4.0, 1.0, 0.0)) - 4.0).abs() < 1e-12);
}

#[test]
fn to_nurbs_keeps_domain_and_shape() {
    let arc = Curve::Arc(ArcCurve {
        plane: Plane::WORLD_XY,
        radius: 3.0,
        angle: Interval::new(0.0, PI),
        domain: Interval::new(10.0, 20.0),
    });
    let nurbs = arc.to_nurbs().unwrap();
    assert!(nurbs.domain().epsilon_equals(Interval::new(10.0, 20.0), 1e-12));
    assert_close(nurbs.point_at(15.0), Point3::new(0.0, 3.0, 0.0), 1e-12);
}

#[test]
fn with_domain_reparametrizes_polyline() {
    let poly = Curve::Polyline(PolylineCurve::new(vec![
        Point3::ORIGIN,
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
    ]));
    let remapped = poly.with_domain(Interval::new(0.0, 1.0)).unwrap();
    assert_close(remapped.point_at(0.5), Point3::new(1.0, 0.0, 0.0), 1e-12);
}

#[test]
fn scaled_arc_scales_radius() {
    let arc = Curve::Arc(ArcCurve::circle(Plane::WORLD_XY, 2.0));
    let Curve::Arc(scaled) = arc.scaled(0.5) else {
        panic!("scaling changed the curve kind");
    };
    assert!((scaled.radius - 1.0).abs() < 1e-12);
}

#[test]
fn closest_point_on_line_clamps_to_ends() {
    let line = Curve::Line(LineCurve::new(
        Point3::ORIGIN,
        Point3::new(2.0, 0.0, 0.0),
        Interval::new(0.0, 2.0),
    ));
    assert_eq!(line.closest_point(Point3::new(5.0, 1.0, 0.0)), 2.0);
    assert!((line.closest_point(Point3::new(0.5, 3.0, 0.0)) - 0.5).abs() < 1e-12);

    let moved = line.transformed(&Transform::translate(Vec3::new(0.0, 0.0, 1.0)));
    assert_close(moved.start_point(), Point3::new(0.0, 0.0, 1.0), 1e-12);
}
