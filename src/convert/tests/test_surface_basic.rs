use std::f64::consts::PI;

use crate::convert::{ConversionOptions, decode_surface, decode_surface_with_options, encode_surface};
use crate::geom::{Direction, Point3, Surface, Surface3};
use crate::host::{
    HostBoundingBoxUv, HostCurve, HostCylindricalSurface, HostFace, HostHermiteSurface, HostLine,
    HostNurbsSurface, HostPlane, HostRuledSurface, HostSurface, RuledProfile, Uv, Xyz,
};

fn assert_close(a: Point3, b: Xyz, tol: f64) {
    let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2) + (a.z - b.z).powi(2)).sqrt();
    assert!(d <= tol, "{a:?} != {b:?} ({d:e})");
}

fn face(surface: HostSurface, u: [f64; 2], v: [f64; 2]) -> HostFace {
    HostFace::new(surface, HostBoundingBoxUv::new(u[0], v[0], u[1], v[1]))
}

fn samples(u: [f64; 2], v: [f64; 2]) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    for i in 0..=3 {
        for j in 0..=3 {
            let s = f64::from(i) / 3.0;
            let t = f64::from(j) / 3.0;
            out.push((u[0] + (u[1] - u[0]) * s, v[0] + (v[1] - v[0]) * t));
        }
    }
    out
}

fn assert_matches_host(surface: &Surface, host: &HostSurface, u: [f64; 2], v: [f64; 2], tol: f64) {
    for (s, t) in samples(u, v) {
        assert_close(surface.point_at(s, t), host.evaluate(Uv::new(s, t)), tol);
    }
}

/// Flat 2 x 2 Hermite patch `(u, 2 v, 0)` over the unit square.
fn flat_hermite() -> HostHermiteSurface {
    let points = vec![
        Xyz::new(0.0, 0.0, 0.0),
        Xyz::new(1.0, 0.0, 0.0),
        Xyz::new(0.0, 2.0, 0.0),
        Xyz::new(1.0, 2.0, 0.0),
    ];
    HostHermiteSurface::create(
        vec![0.0, 1.0],
        vec![0.0, 1.0],
        points,
        vec![Xyz::BASIS_X; 4],
        vec![Xyz::new(0.0, 2.0, 0.0); 4],
        vec![Xyz::ZERO; 4],
    )
    .unwrap()
}

fn bilinear(z: f64) -> HostNurbsSurface {
    HostNurbsSurface::create(
        1,
        1,
        vec![0.0, 0.0, 1.0, 1.0],
        vec![0.0, 0.0, 1.0, 1.0],
        vec![
            Xyz::new(0.0, 0.0, z),
            Xyz::new(0.0, 2.0, z),
            Xyz::new(1.0, 0.0, z),
            Xyz::new(1.0, 2.0, z),
        ],
        None,
    )
    .unwrap()
}

#[test]
fn plane_follows_host_parametrization() {
    let plane = HostPlane::create_by_origin_and_basis(Xyz::new(1.0, 2.0, 3.0), Xyz::BASIS_X, Xyz::BASIS_Y).unwrap();
    let host = HostSurface::Plane(plane);
    let (surface, parametric) = decode_surface(&face(host.clone(), [0.0, 2.0], [-1.0, 1.0]), 0.0).unwrap();
    assert!(parametric);
    assert!(matches!(surface, Surface::Plane(_)));
    assert_matches_host(&surface, &host, [0.0, 2.0], [-1.0, 1.0], 1e-12);
}

#[test]
fn relative_tolerance_inflates_the_domain() {
    let plane = HostPlane::create_by_origin_and_basis(Xyz::ZERO, Xyz::BASIS_X, Xyz::BASIS_Y).unwrap();
    let f = face(HostSurface::Plane(plane), [0.0, 1.0], [0.0, 1.0]);
    let (tight, _) = decode_surface(&f, 0.0).unwrap();
    let (loose, _) = decode_surface(&f, 1.0).unwrap();
    assert!(loose.domain(Direction::U).length() > tight.domain(Direction::U).length());
    assert!(loose.domain(Direction::V).t0 < 0.0);
}

#[test]
fn cylinder_follows_host_parametrization() {
    let cylinder =
        HostCylindricalSurface::create(Xyz::new(0.0, 0.0, 1.0), Xyz::BASIS_X, Xyz::BASIS_Y, Xyz::BASIS_Z, 2.0)
            .unwrap();
    let host = HostSurface::Cylinder(cylinder);
    let (surface, parametric) = decode_surface(&face(host.clone(), [0.0, PI], [0.0, 3.0]), 0.0).unwrap();
    assert!(parametric);
    assert_matches_host(&surface, &host, [0.0, PI], [0.0, 3.0], 1e-9);
}

#[test]
fn left_handed_cylinder_reports_flipped_parametrization() {
    let cylinder = HostCylindricalSurface::create(Xyz::ZERO, Xyz::BASIS_X, Xyz::BASIS_Y, -Xyz::BASIS_Z, 1.0).unwrap();
    let host = HostSurface::Cylinder(cylinder);
    let (surface, parametric) = decode_surface(&face(host.clone(), [0.0, PI], [0.0, 1.0]), 0.0).unwrap();
    assert!(!parametric);
    assert_matches_host(&surface, &host, [0.0, PI], [0.0, 1.0], 1e-9);
}

#[test]
fn extruded_ruled_surface_becomes_a_sum_surface() {
    let a = HostCurve::Line(HostLine::create_bound(Xyz::ZERO, Xyz::new(2.0, 0.0, 0.0)).unwrap());
    let b = HostCurve::Line(HostLine::create_bound(Xyz::new(0.0, 0.0, 1.0), Xyz::new(2.0, 0.0, 1.0)).unwrap());
    let ruled = HostRuledSurface::create(RuledProfile::Curve(a), RuledProfile::Curve(b)).unwrap();
    assert!(ruled.is_extruded());
    let host = HostSurface::Ruled(ruled);
    let (surface, _) = decode_surface(&face(host.clone(), [0.0, 1.0], [0.0, 1.0]), 0.0).unwrap();
    assert!(matches!(surface, Surface::Sum(_)));
    assert_matches_host(&surface, &host, [0.0, 1.0], [0.0, 1.0], 1e-9);
}

#[test]
fn ruled_surface_to_a_point_is_lofted() {
    let a = HostCurve::Line(HostLine::create_bound(Xyz::ZERO, Xyz::new(2.0, 0.0, 0.0)).unwrap());
    let ruled = HostRuledSurface::create(RuledProfile::Curve(a), RuledProfile::Point(Xyz::new(1.0, 1.0, 1.0))).unwrap();
    let host = HostSurface::Ruled(ruled);
    let (surface, _) = decode_surface(&face(host.clone(), [0.0, 1.0], [0.0, 1.0]), 0.0).unwrap();
    assert!(matches!(surface, Surface::Nurbs(_)));
    assert_matches_host(&surface, &host, [0.0, 1.0], [0.0, 1.0], 1e-9);
}

#[test]
fn nurbs_surface_strips_and_pads_knots() {
    let host = bilinear(0.0);
    let (surface, _) = decode_surface(&face(HostSurface::Nurbs(host.clone()), [0.0, 1.0], [0.0, 1.0]), 0.0).unwrap();
    let Surface::Nurbs(nurbs) = &surface else {
        panic!("expected nurbs");
    };
    assert_eq!(nurbs.knots(Direction::U), &[0.0, 1.0]);
    assert_eq!(nurbs.knots(Direction::V), &[0.0, 1.0]);
    assert_matches_host(&surface, &HostSurface::Nurbs(host.clone()), [0.0, 1.0], [0.0, 1.0], 1e-12);

    let encoded = encode_surface(&surface).unwrap();
    assert_eq!(encoded.knots_u(), host.knots_u());
    assert_eq!(encoded.knots_v(), host.knots_v());
}

#[test]
fn hermite_surface_prefers_exported_nurbs() {
    let host = HostSurface::Hermite(flat_hermite().with_exported_nurbs(bilinear(1.0)));
    let (surface, _) = decode_surface(&face(host, [0.0, 1.0], [0.0, 1.0]), 0.0).unwrap();
    assert!((surface.point_at(0.5, 0.5).z - 1.0).abs() < 1e-12);
}

#[test]
fn hermite_surface_without_export_builds_a_patch() {
    let host = HostSurface::Hermite(flat_hermite());
    let (surface, _) = decode_surface(&face(host.clone(), [0.0, 1.0], [0.0, 1.0]), 0.0).unwrap();
    assert!(matches!(surface, Surface::Nurbs(_)));
    assert_matches_host(&surface, &host, [0.0, 1.0], [0.0, 1.0], 1e-9);
}

#[test]
fn plane_encodes_as_nurbs_with_the_same_points() {
    let plane = HostPlane::create_by_origin_and_basis(Xyz::new(0.0, 0.0, 2.0), Xyz::BASIS_X, Xyz::BASIS_Y).unwrap();
    let (surface, _) = decode_surface(&face(HostSurface::Plane(plane), [0.0, 1.0], [0.0, 1.0]), 0.0).unwrap();
    let encoded = HostSurface::Nurbs(encode_surface(&surface).unwrap());
    let u = surface.domain(Direction::U);
    let v = surface.domain(Direction::V);
    assert_matches_host(&surface, &encoded, [u.t0, u.t1], [v.t0, v.t1], 1e-9);
}

#[test]
fn scale_factor_scales_decoded_surfaces() {
    let plane = HostPlane::create_by_origin_and_basis(Xyz::new(1.0, 1.0, 1.0), Xyz::BASIS_X, Xyz::BASIS_Y).unwrap();
    let options = ConversionOptions::default().with_scale_factor(2.0);
    let (surface, _) =
        decode_surface_with_options(&face(HostSurface::Plane(plane), [0.0, 1.0], [0.0, 1.0]), 0.0, &options).unwrap();
    let d = surface.domain(Direction::U);
    let origin = surface.point_at(d.t0, surface.domain(Direction::V).t0);
    assert_close(origin, Xyz::new(2.0, 2.0, 2.0), 1e-12);
}

#[test]
fn ruled_surface_grows_with_the_relative_tolerance() {
    let a = HostCurve::Line(HostLine::create_bound(Xyz::ZERO, Xyz::new(2.0, 0.0, 0.0)).unwrap());
    let b = HostCurve::Line(HostLine::create_bound(Xyz::new(0.0, 2.0, 1.0), Xyz::new(2.0, 3.0, 1.0)).unwrap());
    let ruled = HostRuledSurface::create(RuledProfile::Curve(a), RuledProfile::Curve(b)).unwrap();
    assert!(!ruled.is_extruded());
    let host = HostSurface::Ruled(ruled);
    let f = face(host.clone(), [0.0, 1.0], [0.0, 1.0]);

    let (tight, _) = decode_surface(&f, 0.0).unwrap();
    let (loose, _) = decode_surface(&f, 10.0).unwrap();
    assert!(loose.domain(Direction::U).t0 < tight.domain(Direction::U).t0);
    assert!(loose.domain(Direction::U).t1 > tight.domain(Direction::U).t1);
    assert!(loose.domain(Direction::V).t0 < 0.0);
    assert!(loose.domain(Direction::V).t1 > 1.0);
    assert_matches_host(&loose, &host, [0.0, 1.0], [0.0, 1.0], 1e-9);
}
