use std::collections::HashMap;

use brep_interchange::convert::{
    ConversionContext, ConversionDiagnostics, ConversionOptions, ConversionWarning, decode_curve, decode_mesh,
    decode_solid, decode_solid_with_options, encode_curve, encode_mesh, encode_solid,
};
use brep_interchange::geom::{Curve3, Interval, SolidOrientation};
use brep_interchange::host::{
    ElementId, HostBoundingBoxUv, HostCoEdge, HostCurve, HostEdge, HostEdgeLoop, HostEllipse, HostFace, HostLine,
    HostMesh, HostMeshFacet, HostPlane, HostSolid, HostSurface, Xyz,
};

fn corner(i: usize) -> Xyz {
    let bit = |k: usize| if (i >> k) & 1 == 1 { 1.0 } else { 0.0 };
    Xyz::new(bit(0), bit(1), bit(2))
}

const QUADS: [[usize; 4]; 6] = [
    [0, 2, 3, 1],
    [4, 5, 7, 6],
    [0, 1, 5, 4],
    [2, 6, 7, 3],
    [0, 4, 6, 2],
    [1, 3, 7, 5],
];

fn box_solid(size: f64) -> HostSolid {
    let p = |i: usize| corner(i) * size;
    let mut ids: HashMap<(usize, usize), usize> = HashMap::new();
    let faces = QUADS
        .iter()
        .map(|&quad| {
            let [a, b, _, d] = quad.map(p);
            let plane = HostPlane::create_by_origin_and_basis(a, (b - a).normalize().unwrap(), (d - a).normalize().unwrap()).unwrap();
            let mut face = HostFace::new(HostSurface::Plane(plane), HostBoundingBoxUv::new(0.0, 0.0, size, size));
            let coedges = (0..4)
                .map(|k| {
                    let (i, j) = (quad[k], quad[(k + 1) % 4]);
                    let key = (i.min(j), i.max(j));
                    let next = ids.len();
                    let id = *ids.entry(key).or_insert(next);
                    let line = HostLine::create_bound(p(key.0), p(key.1)).unwrap();
                    HostCoEdge::new(HostEdge { id, curve: HostCurve::Line(line) }, i > j)
                })
                .collect();
            face.loops.push(HostEdgeLoop::new(coedges));
            face
        })
        .collect();
    HostSolid { faces }
}

#[test]
fn box_survives_a_round_trip_through_both_kernels() {
    let (brep, decoded) = decode_solid(&box_solid(2.0));
    let brep = brep.unwrap();
    assert!(decoded.is_clean());
    assert_eq!(brep.solid_orientation(), SolidOrientation::Outward);
    assert!((brep.signed_volume() - 8.0).abs() < 1e-2);

    let (solid, encoded) = encode_solid(&brep);
    let solid = solid.unwrap();
    assert!(encoded.is_clean());
    assert!(solid.is_closed());
    assert_eq!(encoded.face_count, 6);
    assert_eq!(encoded.edge_count, 12);

    let (again, _) = decode_solid(&solid);
    let again = again.unwrap();
    assert_eq!(again.faces.len(), 6);
    assert_eq!(again.solid_orientation(), SolidOrientation::Outward);
}

#[test]
fn scale_factor_applies_to_whole_solids() {
    let options = ConversionOptions::default().with_scale_factor(0.5);
    let (brep, _) = decode_solid_with_options(&box_solid(2.0), &options);
    let bbox = brep.unwrap().bbox();
    assert!((bbox.max.x - 1.0).abs() < 1e-9);
    assert!((bbox.max.z - 1.0).abs() < 1e-9);
}

#[test]
fn ellipse_arc_keeps_its_domain_through_both_directions() {
    let host = HostCurve::Ellipse(
        HostEllipse::create(Xyz::ZERO, 2.0, 1.0, Xyz::BASIS_X, Xyz::BASIS_Y, 1.0, 4.0).unwrap(),
    );
    let curve = decode_curve(&host).unwrap();
    assert_eq!(curve.domain(), Interval::new(1.0, 4.0));

    let back = encode_curve(&curve).unwrap();
    let [t0, t1] = back.parameter_range().unwrap();
    assert!((t0 - 1.0).abs() < 1e-9 && (t1 - 4.0).abs() < 1e-9);
    for t in [1.0, 2.5, 4.0] {
        let a = host.evaluate(t);
        let b = back.evaluate(t);
        assert!(a.distance_to(b) < 1e-6, "t = {t}");
    }
}

#[test]
fn mesh_round_trip_keeps_quads_and_closedness() {
    let vertices = (0..8).map(corner).collect();
    let facets = QUADS
        .iter()
        .map(|q| HostMeshFacet {
            indices: q.iter().map(|&i| i as u32).collect(),
            material_id: ElementId::INVALID,
        })
        .collect();
    let host = HostMesh {
        vertices,
        facets,
        is_closed: true,
        graphics_style_id: ElementId::INVALID,
    };

    let mesh = decode_mesh(&host);
    assert_eq!(mesh.face_counts(), (0, 6));
    assert_eq!(mesh.solid_orientation(), SolidOrientation::Outward);

    let _guard = ConversionContext::with_material(ElementId(5)).push();
    let back = encode_mesh(&mesh).unwrap();
    assert!(back.is_closed);
    assert_eq!(back.num_quads(), 6);
    assert!(back.facets.iter().all(|f| f.material_id == ElementId(5)));
}

#[test]
fn context_is_popped_when_the_guard_drops() {
    assert_eq!(ConversionContext::depth(), 0);
    {
        let _outer = ConversionContext::with_material(ElementId(1)).push();
        {
            let _inner = ConversionContext::with_material(ElementId(2)).push();
            assert_eq!(ConversionContext::current().material_id, ElementId(2));
        }
        assert_eq!(ConversionContext::current().material_id, ElementId(1));
    }
    assert_eq!(ConversionContext::depth(), 0);
}

#[test]
fn diagnostics_serialize_to_json() {
    let mut diagnostics = ConversionDiagnostics::new();
    diagnostics.record(ConversionWarning::SkippedEdge {
        edge: 3,
        kind: "PolylineCurve".into(),
    });
    let json = serde_json::to_string(&diagnostics).unwrap();
    let back: ConversionDiagnostics = serde_json::from_str(&json).unwrap();
    assert_eq!(back, diagnostics);
    assert!(!back.is_clean());
}
