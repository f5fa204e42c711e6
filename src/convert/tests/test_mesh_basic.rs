use crate::convert::{
    ConversionContext, ConversionError, ConversionOptions, decode_mesh, decode_meshes, encode_mesh,
};
use crate::geom::{Mesh, MeshFace, Point3};
use crate::host::{ElementId, HostMesh, HostMeshFacet, Xyz};

fn facet(indices: &[u32]) -> HostMeshFacet {
    HostMeshFacet {
        indices: indices.to_vec(),
        material_id: ElementId::INVALID,
    }
}

fn host_mesh(facets: Vec<HostMeshFacet>) -> HostMesh {
    HostMesh {
        vertices: vec![
            Xyz::new(0.0, 0.0, 0.0),
            Xyz::new(1.0, 0.0, 0.0),
            Xyz::new(2.0, 1.0, 0.0),
            Xyz::new(1.0, 2.0, 0.0),
            Xyz::new(0.0, 1.0, 0.0),
        ],
        facets,
        is_closed: false,
        graphics_style_id: ElementId::INVALID,
    }
}

/// Unit cube of six outward quads.
fn cube() -> Mesh {
    let mut mesh = Mesh::with_capacity(8, 6);
    for i in 0..8u32 {
        mesh.add_vertex(Point3::new(
            f64::from(i & 1),
            f64::from((i >> 1) & 1),
            f64::from((i >> 2) & 1),
        ));
    }
    for [a, b, c, d] in [
        [0, 2, 3, 1],
        [4, 5, 7, 6],
        [0, 1, 5, 4],
        [2, 6, 7, 3],
        [0, 4, 6, 2],
        [1, 3, 7, 5],
    ] {
        mesh.add_quad(a, b, c, d);
    }
    mesh
}

#[test]
fn triangles_and_quads_are_copied() {
    let mesh = decode_mesh(&host_mesh(vec![facet(&[0, 1, 2]), facet(&[0, 2, 3, 4])]));
    assert_eq!(mesh.vertex_count(), 5);
    assert_eq!(mesh.face_counts(), (1, 1));
    assert_eq!(mesh.faces[1], MeshFace::Quad([0, 2, 3, 4]));
    assert_eq!(mesh.face_normals.len(), 2);
    assert!(mesh.is_valid());
}

#[test]
fn larger_polygons_are_fanned_and_slivers_dropped() {
    let mesh = decode_mesh(&host_mesh(vec![facet(&[0, 1, 2, 3, 4]), facet(&[0, 1])]));
    assert_eq!(mesh.face_counts(), (3, 0));
    assert_eq!(mesh.faces[0], MeshFace::Triangle([0, 1, 2]));
    assert_eq!(mesh.faces[2], MeshFace::Triangle([0, 3, 4]));
}

#[test]
fn batch_decoding_keeps_order() {
    let meshes = vec![host_mesh(vec![facet(&[0, 1, 2])]), host_mesh(vec![facet(&[0, 2, 3, 4])])];
    let decoded = decode_meshes(&meshes, &ConversionOptions::default());
    assert_eq!(decoded[0].face_counts(), (1, 0));
    assert_eq!(decoded[1].face_counts(), (0, 1));
}

#[test]
fn closed_cube_encodes_as_a_solid() {
    let encoded = encode_mesh(&cube()).unwrap();
    assert!(encoded.is_closed);
    assert_eq!(encoded.vertices.len(), 8);
    assert_eq!(encoded.num_quads(), 6);
    assert!(encoded.indices_in_bounds());
}

#[test]
fn faces_take_the_context_material() {
    let _guard = ConversionContext::with_material(ElementId(12))
        .with_graphics_style(ElementId(3))
        .push();
    let encoded = encode_mesh(&cube()).unwrap();
    assert_eq!(encoded.graphics_style_id, ElementId(3));
    assert!(encoded.facets.iter().all(|f| f.material_id == ElementId(12)));
}

#[test]
fn non_planar_quad_is_split_along_the_short_diagonal() {
    let mut mesh = Mesh::new();
    mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
    mesh.add_vertex(Point3::new(2.0, 0.0, 0.0));
    mesh.add_vertex(Point3::new(2.0, 1.0, 0.5));
    mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
    mesh.add_quad(0, 1, 2, 3);

    let encoded = encode_mesh(&mesh).unwrap();
    assert!(!encoded.is_closed);
    assert_eq!(encoded.num_triangles(), 2);
    assert_eq!(encoded.num_quads(), 0);
}

#[test]
fn empty_mesh_fails() {
    let err = encode_mesh(&Mesh::new()).unwrap_err();
    assert!(matches!(err, ConversionError::ConversionFailed { .. }));
}
