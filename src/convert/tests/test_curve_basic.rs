use std::f64::consts::{FRAC_PI_2, TAU};

use crate::convert::{
    ConversionError, ConversionOptions, UNBOUND_LINE_EXTENT, decode_curve, decode_curve_with_options, decode_curves,
    encode_curve, pad_end_knots, strip_end_knots,
};
use crate::geom::{Curve, Curve3, Interval, Point3, PolylineCurve};
use crate::host::{
    HostArc, HostCurve, HostCylindricalHelix, HostEllipse, HostHermiteSpline, HostLine, HostNurbSpline,
    HostPlane, Xyz,
};

fn assert_close(a: Point3, b: Xyz, tol: f64) {
    let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2) + (a.z - b.z).powi(2)).sqrt();
    assert!(d <= tol, "{a:?} != {b:?} ({d:e})");
}

fn xy_plane() -> HostPlane {
    HostPlane::create_by_origin_and_basis(Xyz::ZERO, Xyz::BASIS_X, Xyz::BASIS_Y).unwrap()
}

fn spline() -> HostNurbSpline {
    HostNurbSpline::create_curve(
        3,
        vec![0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0],
        vec![
            Xyz::new(0.0, 0.0, 0.0),
            Xyz::new(1.0, 2.0, 0.0),
            Xyz::new(2.0, -1.0, 0.5),
            Xyz::new(3.0, 1.0, 0.0),
            Xyz::new(4.0, 0.0, 1.0),
        ],
        None,
    )
    .unwrap()
}

#[test]
fn end_knots_are_stripped_and_padded() {
    let host = [0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0, 1.0];
    let guest = strip_end_knots(&host);
    assert_eq!(guest, vec![0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0]);
    assert_eq!(pad_end_knots(&guest), host.to_vec());
    assert!(strip_end_knots(&[1.0]).is_empty());
    assert!(pad_end_knots(&[]).is_empty());
}

#[test]
fn bound_line_keeps_its_domain() {
    let a = Xyz::new(1.0, 2.0, 3.0);
    let b = Xyz::new(4.0, 2.0, 3.0);
    let host = HostCurve::Line(HostLine::create_bound_with_parameters(a, b, 2.0, 5.0).unwrap());
    let curve = decode_curve(&host).unwrap();

    assert!(matches!(curve, Curve::Line(_)));
    assert_eq!(curve.domain(), Interval::new(2.0, 5.0));
    assert_close(curve.start_point(), a, 1e-12);
    assert_close(curve.end_point(), b, 1e-12);

    let HostCurve::Line(encoded) = encode_curve(&curve).unwrap() else {
        panic!("expected a line");
    };
    let encoded = HostCurve::Line(encoded);
    assert_eq!(encoded.parameter_range(), Some([2.0, 5.0]));
    assert_close(curve.point_at(3.5), encoded.evaluate(3.5), 1e-12);
}

#[test]
fn unbound_line_gets_a_finite_extent() {
    let host = HostCurve::Line(HostLine::create_unbound(Xyz::new(0.0, 1.0, 0.0), Xyz::BASIS_X).unwrap());
    let curve = decode_curve(&host).unwrap();
    assert_eq!(curve.domain(), Interval::new(-UNBOUND_LINE_EXTENT, UNBOUND_LINE_EXTENT));
    assert_close(curve.point_at(0.0), Xyz::new(0.0, 1.0, 0.0), 1e-9);
}

#[test]
fn bound_arc_matches_source_parametrization() {
    let host = HostCurve::Arc(HostArc::create(&xy_plane(), 2.0, 0.5, 2.0).unwrap());
    let curve = decode_curve(&host).unwrap();

    let Curve::Arc(arc) = &curve else {
        panic!("expected an arc");
    };
    assert!((arc.radius - 2.0).abs() < 1e-12);
    assert_eq!(curve.domain(), Interval::new(0.5, 2.0));
    for t in [0.5, 1.1, 2.0] {
        assert_close(curve.point_at(t), host.evaluate(t), 1e-9);
    }

    let encoded = encode_curve(&curve).unwrap();
    let [t0, t1] = encoded.parameter_range().unwrap();
    assert!((t0 - 0.5).abs() < 1e-9 && (t1 - 2.0).abs() < 1e-9);
    assert_close(curve.point_at(1.1), encoded.evaluate(1.1), 1e-9);
}

#[test]
fn full_circle_decodes_over_a_full_turn() {
    let host = HostCurve::Arc(HostArc::create(&xy_plane(), 1.5, 0.0, TAU).unwrap());
    assert!(!host.is_bound());
    let curve = decode_curve(&host).unwrap();
    assert!((curve.domain().length() - TAU).abs() < 1e-12);
    assert!(curve.is_closed(1e-9));
    assert_close(curve.point_at(FRAC_PI_2), Xyz::new(0.0, 1.5, 0.0), 1e-9);
}

#[test]
fn nurbs_knots_follow_each_kernel_convention() {
    let host = spline();
    let curve = decode_curve(&HostCurve::NurbSpline(host.clone())).unwrap();
    let Curve::Nurbs(nurbs) = &curve else {
        panic!("expected nurbs");
    };
    assert_eq!(nurbs.point_count(), 5);
    assert_eq!(nurbs.knots().len(), 5 + 3 - 1);
    assert_close(curve.start_point(), host.control_points()[0], 1e-12);
    assert_close(curve.end_point(), host.control_points()[4], 1e-12);

    let HostCurve::NurbSpline(encoded) = encode_curve(&curve).unwrap() else {
        panic!("expected a nurb spline");
    };
    let knots = encoded.knots();
    assert_eq!(knots.len(), 5 + 3 + 1);
    assert_eq!(knots[0], knots[1]);
    assert_eq!(knots[knots.len() - 1], knots[knots.len() - 2]);
    assert_eq!(knots, host.knots());
}

#[test]
fn rational_weights_survive_both_directions() {
    let w = std::f64::consts::FRAC_1_SQRT_2;
    let host = HostNurbSpline::create_curve(
        2,
        vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        vec![Xyz::new(1.0, 0.0, 0.0), Xyz::new(1.0, 1.0, 0.0), Xyz::new(0.0, 1.0, 0.0)],
        Some(vec![1.0, w, 1.0]),
    )
    .unwrap();
    let curve = decode_curve(&HostCurve::NurbSpline(host)).unwrap();
    // quarter circle
    let mid = curve.point_at(0.5);
    assert!((mid.x.hypot(mid.y) - 1.0).abs() < 1e-12);

    let HostCurve::NurbSpline(encoded) = encode_curve(&curve).unwrap() else {
        panic!("expected a nurb spline");
    };
    assert!(encoded.is_rational());
    assert!((encoded.weights()[1] - w).abs() < 1e-12);
    assert_close(curve.point_at(0.0), encoded.control_points()[0], 1e-12);
}

#[test]
fn bounded_ellipse_is_reseamed_at_its_start() {
    for t0 in [0.3, 2.0, 4.5] {
        let t1 = t0 + 2.0;
        let host = HostCurve::Ellipse(
            HostEllipse::create(Xyz::new(1.0, 1.0, 0.0), 3.0, 1.0, Xyz::BASIS_X, Xyz::BASIS_Y, t0, t1).unwrap(),
        );
        let curve = decode_curve(&host).unwrap();
        assert_eq!(curve.domain(), Interval::new(t0, t1), "t0 = {t0}");
        assert_close(curve.start_point(), host.evaluate(t0), 1e-6);
        assert_close(curve.end_point(), host.evaluate(t1), 1e-6);

        let again = decode_curve(&encode_curve(&curve).unwrap()).unwrap();
        assert_eq!(again.domain(), Interval::new(t0, t1));
        assert_close(again.start_point(), host.evaluate(t0), 1e-6);
    }
}

#[test]
fn hermite_spline_interpolates_its_nodes() {
    let points = vec![Xyz::new(0.0, 0.0, 0.0), Xyz::new(1.0, 1.0, 0.0), Xyz::new(3.0, 0.0, 0.0)];
    let tangents = vec![Xyz::new(1.0, 1.0, 0.0), Xyz::new(1.0, 0.0, 0.0), Xyz::new(1.0, -1.0, 0.0)];
    let host = HostCurve::HermiteSpline(HostHermiteSpline::create(points.clone(), tangents, vec![0.0, 1.0, 3.0]).unwrap());
    let curve = decode_curve(&host).unwrap();
    assert_eq!(curve.domain(), Interval::new(0.0, 3.0));
    assert_close(curve.point_at(0.0), points[0], 1e-9);
    assert_close(curve.point_at(1.0), points[1], 1e-9);
    assert_close(curve.point_at(3.0), points[2], 1e-9);
}

#[test]
fn helix_keeps_its_parameter_range() {
    let helix = HostCylindricalHelix::create(Xyz::ZERO, 2.0, Xyz::BASIS_X, Xyz::new(0.0, 0.0, 1.0), true, 0.0, 3.0 * TAU, 1.0)
        .unwrap();
    let host = HostCurve::CylindricalHelix(helix);
    let curve = decode_curve(&host).unwrap();
    assert_eq!(curve.domain(), Interval::new(0.0, 3.0 * TAU));
    for t in [0.0, 1.0, 7.5, 3.0 * TAU] {
        assert_close(curve.point_at(t), host.evaluate(t), 1e-2);
    }
}

#[test]
fn polyline_encodes_only_when_straight() {
    let straight = Curve::Polyline(PolylineCurve::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(3.0, 0.0, 0.0),
    ]));
    assert!(matches!(encode_curve(&straight), Ok(HostCurve::Line(_))));

    let bent = Curve::Polyline(PolylineCurve::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
    ]));
    assert_eq!(
        encode_curve(&bent),
        Err(ConversionError::UnsupportedGeometryType {
            kind: "PolylineCurve"
        })
    );
}

#[test]
fn scale_factor_applies_after_decoding() {
    let host = HostCurve::Line(HostLine::create_bound(Xyz::ZERO, Xyz::new(2.0, 0.0, 0.0)).unwrap());
    let options = ConversionOptions::default().with_scale_factor(0.5);
    let curve = decode_curve_with_options(&host, &options).unwrap();
    assert_close(curve.end_point(), Xyz::new(1.0, 0.0, 0.0), 1e-12);
}

#[test]
fn batch_decoding_keeps_order_and_failures() {
    let curves = vec![
        HostCurve::NurbSpline(spline()),
        HostCurve::Line(HostLine::create_bound(Xyz::ZERO, Xyz::BASIS_X).unwrap()),
    ];
    let decoded = decode_curves(&curves, &ConversionOptions::default());
    assert_eq!(decoded.len(), 2);
    assert!(matches!(decoded[0], Ok(Curve::Nurbs(_))));
    assert!(matches!(decoded[1], Ok(Curve::Line(_))));
}
