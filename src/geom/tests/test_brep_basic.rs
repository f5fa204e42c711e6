use std::collections::HashMap;

use crate::geom::{
    Brep, Curve, Interval, LineCurve, LoopType, Plane, PlaneSurface, Point2, Point3,
    SolidOrientation, Surface, TrimCurve, TrimType,
};

const CORNERS: [[f64; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
];

/// Counter-clockwise seen from outside.
const FACES: [[usize; 4]; 6] = [
    [0, 2, 3, 1],
    [4, 5, 7, 6],
    [0, 1, 5, 4],
    [2, 6, 7, 3],
    [0, 4, 6, 2],
    [1, 3, 7, 5],
];

fn corner(i: usize) -> Point3 {
    let [x, y, z] = CORNERS[i];
    Point3::new(x, y, z)
}

fn box_brep(face_count: usize) -> Brep {
    let mut brep = Brep::new();
    let mut edges: HashMap<(usize, usize), usize> = HashMap::new();

    for quad in FACES.iter().take(face_count) {
        let origin = corner(quad[0]);
        let plane = Plane::new(origin, corner(quad[1]) - origin, corner(quad[3]) - origin).unwrap();
        let surface = brep.add_surface(Surface::Plane(PlaneSurface {
            plane,
            u: Interval::new(0.0, 1.0),
            v: Interval::new(0.0, 1.0),
        }));
        let face = brep.add_face(surface);
        let lp = brep.add_loop(face, LoopType::Outer);

        for k in 0..4 {
            let (i, j) = (quad[k], quad[(k + 1) % 4]);
            let key = (i.min(j), i.max(j));
            let edge = *edges.entry(key).or_insert_with(|| {
                let curve = brep.add_edge_curve(Curve::Line(LineCurve::new(
                    corner(key.0),
                    corner(key.1),
                    Interval::new(0.0, 1.0),
                )));
                brep.add_edge(curve)
            });
            let reversed = i > j;
            let uv = |n: usize| {
                let (u, v, _) = plane.coordinates_of(corner(n));
                Point2::new(u, v)
            };
            let domain = if reversed { Interval::new(-1.0, 0.0) } else { Interval::new(0.0, 1.0) };
            let trim = brep.add_trim_curve(TrimCurve::line(uv(i), uv(j), domain).unwrap());
            brep.add_trim(trim, edge, reversed, lp);
        }
    }

    brep.set_vertices(1e-9);
    brep.set_tolerances_and_flags();
    brep
}

#[test]
fn cube_shares_edges_and_vertices() {
    let brep = box_brep(6);
    assert_eq!(brep.faces.len(), 6);
    assert_eq!(brep.edges.len(), 12);
    assert_eq!(brep.vertices.len(), 8);
    assert!(brep.vertices.iter().all(|v| v.edges.len() == 3));
    assert!(brep.edges.iter().all(|e| e.trims.len() == 2));
    assert!(brep.trims.iter().all(|t| t.trim_type == TrimType::Mated));
    assert!(brep.is_valid(1e-9), "{:?}", brep.validate(1e-9));
}

#[test]
fn cube_orientation_follows_face_flags() {
    let mut brep = box_brep(6);
    assert!(brep.is_solid());
    assert_eq!(brep.solid_orientation(), SolidOrientation::Outward);
    assert!((brep.signed_volume() - 1.0).abs() < 1e-9);

    for face in &mut brep.faces {
        face.orientation_reversed = true;
    }
    assert_eq!(brep.solid_orientation(), SolidOrientation::Inward);
}

#[test]
fn open_box_has_no_orientation() {
    let brep = box_brep(5);
    assert!(!brep.is_solid());
    assert_eq!(brep.solid_orientation(), SolidOrientation::None);
    assert!(brep.trims.iter().any(|t| t.trim_type == TrimType::Boundary));
}

#[test]
fn scaled_cube_stays_valid() {
    let brep = box_brep(6).scaled(2.0);
    assert!(brep.is_valid(1e-9), "{:?}", brep.validate(1e-9));
    assert!((brep.signed_volume() - 8.0).abs() < 1e-9);
    let bbox = brep.bbox();
    assert_eq!(bbox.max, Point3::new(2.0, 2.0, 2.0));
}

#[test]
fn repair_closes_small_uv_gaps() {
    let mut brep = box_brep(6);
    let curve = brep.trims[0].curve;
    let end = brep.curves2d[curve].end();
    brep.curves2d[curve].set_end(Point2::new(end.x + 1e-5, end.y));
    assert!(!brep.is_valid(1e-9));

    brep.repair(1e-9);
    assert!(brep.is_valid(1e-9), "{:?}", brep.validate(1e-9));
    assert!(brep.edges[brep.trims[0].edge.unwrap()].tolerance > 0.0);
}

#[test]
fn trims_outside_the_surface_domain_are_reported() {
    let mut brep = box_brep(6);
    let curve = brep.trims[0].curve;
    let shifted: Vec<Point2> = brep.curves2d[curve]
        .points()
        .iter()
        .map(|p| Point2::new(p.x + 2.0, p.y))
        .collect();
    let parameters = brep.curves2d[curve].parameters().to_vec();
    brep.curves2d[curve] = TrimCurve::new(shifted, parameters).unwrap();

    let problems = brep.validate(1e-9);
    assert!(problems.iter().any(|p| p.contains("leaves the domain")), "{problems:?}");
}

#[test]
fn match_ends_snaps_within_tolerance() {
    let mut brep = box_brep(6);
    let curve = brep.trims[1].curve;
    let start = brep.curves2d[curve].start();
    brep.curves2d[curve].set_start(Point2::new(start.x, start.y + 1e-8));

    brep.match_ends(1e-6);
    let previous = brep.curves2d[brep.trims[0].curve].end();
    assert_eq!(previous, brep.curves2d[curve].start());
}

#[test]
fn outer_loop_and_polygon() {
    let brep = box_brep(1);
    let lp = brep.outer_loop(0).unwrap();
    let polygon = brep.loop_polygon(lp);
    assert_eq!(polygon.len(), 4);
    assert_eq!(brep.edge_parameter(0, 0.25), 0.25);
}
