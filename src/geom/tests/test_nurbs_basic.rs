use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::geom::{GeomError, HPoint, Interval, NurbsCurve, Plane, Point3, Vec3};

fn assert_close(a: Point3, b: Point3, tol: f64) {
    assert!(a.distance_to(b) <= tol, "{a:?} != {b:?}");
}

fn cubic() -> NurbsCurve {
    NurbsCurve::from_points(
        3,
        &[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(3.0, 2.0, 1.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(6.0, -1.0, 2.0),
        ],
    )
    .unwrap()
}

#[test]
fn constructor_rejects_wrong_knot_count() {
    let points = vec![
        HPoint::new(0.0, 0.0, 0.0, 1.0),
        HPoint::new(1.0, 0.0, 0.0, 1.0),
        HPoint::new(2.0, 0.0, 0.0, 1.0),
    ];
    let err = NurbsCurve::new(2, points, vec![0.0, 0.0, 1.0]).unwrap_err();
    assert!(matches!(err, GeomError::KnotCount { expected: 4, found: 3 }));
}

#[test]
fn constructor_rejects_non_positive_weight() {
    let points = vec![HPoint::new(0.0, 0.0, 0.0, 1.0), HPoint::new(1.0, 0.0, 0.0, 0.0)];
    let err = NurbsCurve::new(1, points, vec![0.0, 1.0]).unwrap_err();
    assert!(matches!(err, GeomError::InvalidWeight));
}

#[test]
fn arc_lies_on_circle_and_domain_is_angle() {
    let arc = NurbsCurve::arc(&Plane::WORLD_XY, 2.0, Interval::new(0.0, PI)).unwrap();
    assert_eq!(arc.domain(), Interval::new(0.0, PI));
    assert_eq!(arc.point_count(), 5);
    assert!(arc.is_rational());

    for i in 0..=20 {
        let t = PI * f64::from(i) / 20.0;
        let p = arc.point_at(t);
        assert!((p.to_vec3().length() - 2.0).abs() < 1e-12);
    }
    assert_close(arc.point_at(FRAC_PI_2), Point3::new(0.0, 2.0, 0.0), 1e-12);
    assert_close(arc.point_at(PI), Point3::new(-2.0, 0.0, 0.0), 1e-12);
}

#[test]
fn ellipse_passes_through_axis_points() {
    let ellipse = NurbsCurve::ellipse(&Plane::WORLD_XY, 3.0, 1.5);
    assert_eq!(ellipse.domain(), Interval::new(0.0, TAU));
    assert!(ellipse.is_closed(1e-12));
    assert_close(ellipse.point_at(0.0), Point3::new(3.0, 0.0, 0.0), 1e-12);
    assert_close(ellipse.point_at(FRAC_PI_2), Point3::new(0.0, 1.5, 0.0), 1e-12);
    assert_close(ellipse.point_at(PI), Point3::new(-3.0, 0.0, 0.0), 1e-12);

    for i in 0..32 {
        let p = ellipse.point_at(TAU * f64::from(i) / 32.0);
        let e = (p.x / 3.0).powi(2) + (p.y / 1.5).powi(2);
        assert!((e - 1.0).abs() < 1e-12);
    }
}

#[test]
fn derivative_matches_finite_difference() {
    let curve = cubic();
    let h = 1e-6;
    for &t in &[0.3, 1.0, 1.7] {
        let fd = (curve.point_at(t + h) - curve.point_at(t - h)) / (2.0 * h);
        let d = curve.derivative_at(t);
        assert!((d - fd).length() < 1e-5, "t={t}: {d:?} vs {fd:?}");
    }
}

#[test]
fn split_keeps_shape_on_both_sides() {
    let curve = cubic();
    let (left, right) = curve.split_at(0.8).unwrap();
    assert_eq!(left.domain(), Interval::new(0.0, 0.8));
    assert_eq!(right.domain(), Interval::new(0.8, 2.0));
    assert_close(left.point_at(0.4), curve.point_at(0.4), 1e-12);
    assert_close(right.point_at(1.5), curve.point_at(1.5), 1e-12);
    assert_close(left.point_at(0.8), right.point_at(0.8), 1e-12);
}

#[test]
fn trimmed_covers_only_the_interval() {
    let curve = cubic();
    let piece = curve.trimmed(Interval::new(0.5, 1.5)).unwrap();
    assert!(piece.domain().epsilon_equals(Interval::new(0.5, 1.5), 1e-12));
    assert_close(piece.point_at(1.1), curve.point_at(1.1), 1e-12);
    assert!(curve.trimmed(Interval::new(1.5, 0.5)).is_none());
}

#[test]
fn change_closed_seam_shifts_domain_by_one_period() {
    let ellipse = NurbsCurve::ellipse(&Plane::WORLD_XY, 3.0, 1.5);
    for &seam in &[FRAC_PI_2, 1.0, 4.0] {
        let moved = ellipse.change_closed_seam(seam, 1e-9).unwrap();
        assert!(moved.domain().epsilon_equals(Interval::new(seam, seam + TAU), 1e-9));
        assert_close(moved.point_at(seam), ellipse.point_at(seam), 1e-9);
        let before_seam = seam - 0.25;
        assert_close(moved.point_at(before_seam + TAU), ellipse.point_at(before_seam), 1e-9);
    }
}

#[test]
fn change_closed_seam_rejects_open_curves() {
    assert!(cubic().change_closed_seam(1.0, 1e-9).is_none());
}

#[test]
fn reversed_negates_domain() {
    let curve = cubic();
    let rev = curve.reversed();
    assert_eq!(rev.domain(), Interval::new(-2.0, 0.0));
    assert_close(rev.point_at(-0.5), curve.point_at(0.5), 1e-12);
}

#[test]
fn with_domain_remaps_linearly() {
    let curve = cubic();
    let remapped = curve.with_domain(Interval::new(10.0, 14.0)).unwrap();
    assert_close(remapped.point_at(12.0), curve.point_at(1.0), 1e-12);
    assert!(curve.with_domain(Interval::new(1.0, 1.0)).is_none());
}

#[test]
fn extended_line_grows_straight() {
    let line = NurbsCurve::line(Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0), Interval::UNIT);
    let longer = line.extended(Interval::new(-1.0, 2.0)).unwrap();
    assert!(longer.domain().epsilon_equals(Interval::new(-1.0, 2.0), 1e-12));
    assert_close(longer.point_at(2.0), Point3::new(2.0, 0.0, 0.0), 1e-12);
    assert_close(longer.point_at(-1.0), Point3::new(-1.0, 0.0, 0.0), 1e-12);
}

#[test]
fn extended_cubic_keeps_original_part() {
    let curve = cubic();
    let longer = curve.extended(Interval::new(0.0, 2.5)).unwrap();
    assert_close(longer.point_at(1.2), curve.point_at(1.2), 1e-10);
    assert_close(longer.point_at(2.0), curve.point_at(2.0), 1e-10);
}

#[test]
fn elevation_preserves_shape() {
    let arc = NurbsCurve::arc(&Plane::WORLD_XY, 1.0, Interval::new(0.0, PI)).unwrap();
    let raised = arc.elevated(3).unwrap();
    assert_eq!(raised.degree(), 3);
    for i in 0..=10 {
        let t = PI * f64::from(i) / 10.0;
        assert_close(raised.point_at(t), arc.point_at(t), 1e-12);
    }
}

#[test]
fn make_compatible_shares_knots() {
    let line = NurbsCurve::line(Point3::ORIGIN, Point3::new(4.0, 0.0, 0.0), Interval::new(0.0, 4.0));
    let curve = cubic();
    let both = NurbsCurve::make_compatible(&[line.clone(), curve.clone()]).unwrap();
    assert_eq!(both[0].knots(), both[1].knots());
    assert_eq!(both[0].degree(), 3);
    assert_close(both[0].point_at(0.5), line.point_at(2.0), 1e-12);
    assert_close(both[1].point_at(0.5), curve.point_at(1.0), 1e-12);
}

#[test]
fn hermite_segments_interpolate_points_and_tangents() {
    let points = [Point3::ORIGIN, Point3::new(1.0, 1.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
    let tangents = [Vec3::new(1.0, 2.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, -2.0, 0.0)];
    let curve = NurbsCurve::from_hermite_segments(&points, &tangents, &[0.0, 1.0, 2.0]).unwrap();

    assert_close(curve.point_at(1.0), points[1], 1e-12);
    assert_close(curve.point_at(2.0), points[2], 1e-12);
    assert!((curve.derivative_at(0.0) - tangents[0]).length() < 1e-9);
    assert!((curve.derivative_at(2.0) - tangents[2]).length() < 1e-9);
}

#[test]
fn closest_point_finds_parameter_on_curve() {
    let curve = cubic();
    let target = curve.point_at(1.3);
    let t = curve.closest_point(target);
    assert!((t - 1.3).abs() < 1e-7);
}
