use std::collections::HashMap;

use crate::host::{
    BRepBuilder, BRepType, BuilderEdgeId, ElementId, HostArc, HostCurve, HostCylindricalHelix,
    HostError, HostLine, HostNurbsSurface, HostPlane, Xyz,
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

fn corner(i: usize) -> Xyz {
    let [x, y, z] = CORNERS[i];
    Xyz::new(x, y, z)
}

/// Bilinear patch with `u` along `a -> b` and `v` along `a -> d`.
fn quad_surface(quad: [usize; 4]) -> HostNurbsSurface {
    let [a, b, c, d] = quad.map(corner);
    HostNurbsSurface::create(
        1,
        1,
        vec![0.0, 0.0, 1.0, 1.0],
        vec![0.0, 0.0, 1.0, 1.0],
        vec![a, d, b, c],
        None,
    )
    .unwrap()
}

fn box_builder(brep_type: BRepType, face_count: usize) -> BRepBuilder {
    let mut builder = BRepBuilder::new(brep_type);
    let mut edges: HashMap<(usize, usize), BuilderEdgeId> = HashMap::new();
    for quad in FACES.iter().take(face_count) {
        let face = builder.add_face(quad_surface(*quad), None, false).unwrap();
        builder.set_face_material_id(face, ElementId(7)).unwrap();
        let lp = builder.add_loop(face).unwrap();
        for k in 0..4 {
            let (i, j) = (quad[k], quad[(k + 1) % 4]);
            let key = (i.min(j), i.max(j));
            let edge = match edges.get(&key) {
                Some(edge) => *edge,
                None => {
                    let curve = HostCurve::Line(HostLine::create_bound(corner(key.0), corner(key.1)).unwrap());
                    let edge = builder.add_edge(curve).unwrap();
                    edges.insert(key, edge);
                    edge
                }
            };
            builder.add_co_edge(lp, edge, i > j).unwrap();
        }
        builder.finish_loop(lp).unwrap();
        builder.finish_face(face).unwrap();
    }
    builder
}

#[test]
fn cube_builds_a_closed_solid() {
    let mut builder = box_builder(BRepType::Solid, 6);
    builder.finish().unwrap();
    assert!(builder.is_result_available());

    let solid = builder.get_result().unwrap();
    assert_eq!(solid.faces.len(), 6);
    assert_eq!(solid.edges().len(), 12);
    assert!(solid.is_closed());
    assert!(solid.faces.iter().all(|f| f.orientation_matches_surface));
    assert!(solid.faces.iter().all(|f| f.material_id == ElementId(7)));
    assert!(!builder.is_result_available());
}

#[test]
fn open_box_needs_open_shell() {
    let mut solid = box_builder(BRepType::Solid, 5);
    assert!(matches!(solid.finish(), Err(HostError::NonManifoldEdge { uses: 1, .. })));
    assert!(!solid.is_result_available());

    let mut shell = box_builder(BRepType::OpenShell, 5);
    shell.finish().unwrap();
    let result = shell.get_result().unwrap();
    assert_eq!(result.faces.len(), 5);
    assert!(!result.is_closed());
}

#[test]
fn face_normal_follows_the_reversed_flag() {
    let mut builder = BRepBuilder::new(BRepType::OpenShell);
    let face = builder.add_face(quad_surface(FACES[0]), None, true).unwrap();
    let lp = builder.add_loop(face).unwrap();
    let quad = FACES[0];
    for k in (0..4).rev() {
        let curve = HostCurve::Line(HostLine::create_bound(corner(quad[(k + 1) % 4]), corner(quad[k])).unwrap());
        let edge = builder.add_edge(curve).unwrap();
        builder.add_co_edge(lp, edge, false).unwrap();
    }
    builder.finish_loop(lp).unwrap();
    builder.finish_face(face).unwrap();
    builder.finish().unwrap();

    let solid = builder.get_result().unwrap();
    let face = &solid.faces[0];
    assert!(!face.orientation_matches_surface);
    let n = face.compute_normal(crate::host::Uv::new(0.5, 0.5)).unwrap();
    assert!((n.z - 1.0).abs() < 1e-6, "{n:?}");
}

#[test]
fn loop_must_close() {
    let mut builder = BRepBuilder::new(BRepType::OpenShell);
    let face = builder.add_face(quad_surface(FACES[0]), None, false).unwrap();
    let lp = builder.add_loop(face).unwrap();
    let a = builder
        .add_edge(HostCurve::Line(HostLine::create_bound(corner(0), corner(2)).unwrap()))
        .unwrap();
    let b = builder
        .add_edge(HostCurve::Line(HostLine::create_bound(corner(2), corner(3)).unwrap()))
        .unwrap();
    builder.add_co_edge(lp, a, false).unwrap();
    builder.add_co_edge(lp, b, false).unwrap();
    assert!(matches!(builder.finish_loop(lp), Err(HostError::LoopNotClosed { .. })));
    assert!(matches!(builder.finish_face(face), Err(HostError::LoopNotClosed { .. })));
}

#[test]
fn empty_loop_and_face_are_rejected() {
    let mut builder = BRepBuilder::new(BRepType::OpenShell);
    let face = builder.add_face(quad_surface(FACES[0]), None, false).unwrap();
    assert!(matches!(builder.finish_face(face), Err(HostError::EmptyFace { .. })));
    let lp = builder.add_loop(face).unwrap();
    assert!(matches!(builder.finish_loop(lp), Err(HostError::EmptyLoop { .. })));
}

#[test]
fn only_bound_simple_curves_become_edges() {
    let mut builder = BRepBuilder::new(BRepType::OpenShell);
    let helix = HostCylindricalHelix::create(Xyz::ZERO, 1.0, Xyz::BASIS_X, Xyz::BASIS_Z, true, 0.0, 1.0, 1.0).unwrap();
    assert!(matches!(
        builder.add_edge(HostCurve::CylindricalHelix(helix)),
        Err(HostError::UnsupportedEdgeCurve { kind: "CylindricalHelix" })
    ));

    let plane = HostPlane::create_by_origin_and_basis(Xyz::ZERO, Xyz::BASIS_X, Xyz::BASIS_Y).unwrap();
    let circle = HostArc::create(&plane, 1.0, 0.0, std::f64::consts::TAU).unwrap();
    assert!(builder.add_edge(HostCurve::Arc(circle)).is_err());

    let half = HostArc::create(&plane, 1.0, 0.0, std::f64::consts::PI).unwrap();
    assert!(builder.add_edge(HostCurve::Arc(half)).is_ok());
}

#[test]
fn finished_builder_rejects_more_work() {
    let mut builder = box_builder(BRepType::Solid, 6);
    builder.finish().unwrap();
    assert!(matches!(
        builder.add_face(quad_surface(FACES[0]), None, false),
        Err(HostError::AlreadyFinished { .. })
    ));
    assert!(matches!(builder.finish(), Err(HostError::AlreadyFinished { .. })));
}
