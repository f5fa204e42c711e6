use std::collections::HashMap;

use crate::host::{
    HostBoundingBoxUv, HostCoEdge, HostCurve, HostEdge, HostEdgeLoop, HostFace, HostLine, HostPlane,
    HostSolid, HostSurface, Xyz,
};

pub(super) const CORNERS: [[f64; 3]; 8] = [
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
pub(super) const FACES: [[usize; 4]; 6] = [
    [0, 2, 3, 1],
    [4, 5, 7, 6],
    [0, 1, 5, 4],
    [2, 6, 7, 3],
    [0, 4, 6, 2],
    [1, 3, 7, 5],
];

pub(super) fn corner(i: usize) -> Xyz {
    let [x, y, z] = CORNERS[i];
    Xyz::new(x, y, z)
}

/// Planar face over `quad` with `u` along `a -> b`, `v` along `a -> d`.
pub(super) fn quad_face(quad: [usize; 4], edges: &mut HashMap<(usize, usize), usize>) -> HostFace {
    let [a, b, _, d] = quad.map(corner);
    let plane = HostPlane::create_by_origin_and_basis(a, b - a, d - a).unwrap();
    let mut face = HostFace::new(HostSurface::Plane(plane), HostBoundingBoxUv::new(0.0, 0.0, 1.0, 1.0));

    let coedges = (0..4)
        .map(|k| {
            let (i, j) = (quad[k], quad[(k + 1) % 4]);
            let key = (i.min(j), i.max(j));
            let next = edges.len();
            let id = *edges.entry(key).or_insert(next);
            let curve = HostCurve::Line(HostLine::create_bound(corner(key.0), corner(key.1)).unwrap());
            HostCoEdge::new(HostEdge { id, curve }, i > j)
        })
        .collect();
    face.loops.push(HostEdgeLoop::new(coedges));
    face
}

/// Unit cube with outward normals and twelve shared edges.
pub(super) fn host_cube() -> HostSolid {
    let mut edges = HashMap::new();
    HostSolid {
        faces: FACES.iter().map(|q| quad_face(*q, &mut edges)).collect(),
    }
}
