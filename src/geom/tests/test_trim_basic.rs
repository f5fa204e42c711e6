use crate::geom::{
    CurveOrientation, Interval, Point2, RegionContainment, TrimCurve, TrimError, TrimLoop,
    closed_curve_orientation, planar_closed_curve_relationship,
};

fn square_loop(min: f64, max: f64) -> TrimLoop {
    let corners = [
        Point2::new(min, min),
        Point2::new(max, min),
        Point2::new(max, max),
        Point2::new(min, max),
    ];
    let mut lp = TrimLoop::new();
    for i in 0..4 {
        let segment = TrimCurve::line(corners[i], corners[(i + 1) % 4], Interval::new(0.0, 1.0)).unwrap();
        lp.append_segment(segment);
    }
    lp
}

#[test]
fn trim_curve_rejects_bad_input() {
    let err = TrimCurve::new(vec![Point2::new(0.0, 0.0)], vec![0.0]).unwrap_err();
    assert_eq!(err, TrimError::InsufficientPoints { count: 1 });

    let err = TrimCurve::new(
        vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
        vec![1.0, 0.0],
    )
    .unwrap_err();
    assert_eq!(err, TrimError::DecreasingParameters);
}

#[test]
fn trim_curve_interpolates_between_parameters() {
    let curve = TrimCurve::new(
        vec![Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), Point2::new(2.0, 2.0)],
        vec![0.0, 1.0, 3.0],
    )
    .unwrap();
    assert_eq!(curve.point_at(0.5), Point2::new(1.0, 0.0));
    assert_eq!(curve.point_at(2.0), Point2::new(2.0, 1.0));
    assert_eq!(curve.domain(), Interval::new(0.0, 3.0));

    let rev = curve.reversed();
    assert_eq!(rev.domain(), Interval::new(-3.0, 0.0));
    assert_eq!(rev.point_at(-2.0), Point2::new(2.0, 1.0));
}

#[test]
fn loop_orientation_follows_winding() {
    let ccw = square_loop(0.0, 1.0);
    assert!(ccw.is_closed(1e-12));
    assert_eq!(ccw.orientation(), CurveOrientation::CounterClockwise);

    let cw: Vec<Point2> = ccw.polygon().into_iter().rev().collect();
    assert_eq!(closed_curve_orientation(&cw), CurveOrientation::Clockwise);

    let flat = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)];
    assert_eq!(closed_curve_orientation(&flat), CurveOrientation::Undefined);
}

#[test]
fn make_closed_snaps_small_gap() {
    let mut lp = TrimLoop::new();
    lp.append_segment(TrimCurve::line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Interval::UNIT).unwrap());
    lp.append_segment(TrimCurve::line(Point2::new(1.0, 0.0), Point2::new(1.0, 1.0), Interval::UNIT).unwrap());
    lp.append_segment(TrimCurve::line(Point2::new(1.0, 1.0), Point2::new(1e-7, 0.0), Interval::UNIT).unwrap());

    assert!(!lp.is_closed(1e-9));
    assert!(!lp.make_closed(1e-9));
    assert!(lp.make_closed(1e-6));
    assert_eq!(lp.end(), Some(Point2::new(0.0, 0.0)));
}

#[test]
fn containment_between_loops() {
    let outer = square_loop(0.0, 4.0);
    let hole = square_loop(1.0, 2.0);
    let apart = square_loop(5.0, 6.0);
    let crossing = square_loop(3.0, 5.0);

    assert_eq!(hole.relationship(&outer, 1e-9), RegionContainment::AInsideB);
    assert_eq!(outer.relationship(&hole, 1e-9), RegionContainment::BInsideA);
    assert_eq!(outer.relationship(&apart, 1e-9), RegionContainment::Disjoint);
    assert_eq!(
        planar_closed_curve_relationship(&outer.polygon(), &crossing.polygon(), 1e-9),
        RegionContainment::MutualIntersection
    );

    assert!(outer.contains_point(Point2::new(1.5, 3.0), 1e-9));
    assert!(!outer.contains_point(Point2::new(4.5, 3.0), 1e-9));
}
