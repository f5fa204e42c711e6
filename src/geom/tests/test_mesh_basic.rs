use crate::geom::{Mesh, MeshFace, Point3, SolidOrientation, Vec3};

fn cube_mesh(quads: usize) -> Mesh {
    let mut mesh = Mesh::with_capacity(8, 6);
    for i in 0..8u32 {
        mesh.add_vertex(Point3::new(
            f64::from(i & 1),
            f64::from((i >> 1) & 1),
            f64::from((i >> 2) & 1),
        ));
    }
    let faces = [
        [0, 2, 3, 1],
        [4, 5, 7, 6],
        [0, 1, 5, 4],
        [2, 6, 7, 3],
        [0, 4, 6, 2],
        [1, 3, 7, 5],
    ];
    for [a, b, c, d] in faces.into_iter().take(quads) {
        mesh.add_quad(a, b, c, d);
    }
    mesh
}

#[test]
fn closed_cube_is_outward() {
    let mesh = cube_mesh(6);
    assert!(mesh.is_valid());
    assert!(mesh.is_closed());
    assert!((mesh.signed_volume() - 1.0).abs() < 1e-12);
    assert_eq!(mesh.solid_orientation(), SolidOrientation::Outward);
    assert_eq!(mesh.face_counts(), (0, 6));
}

#[test]
fn flipped_cube_is_inward() {
    let mut mesh = cube_mesh(6);
    for face in &mut mesh.faces {
        if let MeshFace::Quad([a, b, c, d]) = *face {
            *face = MeshFace::Quad([a, d, c, b]);
        }
    }
    assert_eq!(mesh.solid_orientation(), SolidOrientation::Inward);
}

#[test]
fn open_mesh_has_no_orientation() {
    let mesh = cube_mesh(5);
    assert!(!mesh.is_closed());
    assert_eq!(mesh.solid_orientation(), SolidOrientation::None);
}

#[test]
fn face_normals_point_out_of_the_cube() {
    let mut mesh = cube_mesh(6);
    mesh.compute_face_normals();
    assert_eq!(mesh.face_normals.len(), 6);
    assert!((mesh.face_normals[0] - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    assert!((mesh.face_normals[1] - Vec3::Z).length() < 1e-12);
    assert!(mesh.is_valid());
}

#[test]
fn degenerate_triangle_has_no_normal() {
    let mut mesh = Mesh::new();
    let a = mesh.add_vertex(Point3::ORIGIN);
    let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
    let c = mesh.add_vertex(Point3::new(2.0, 0.0, 0.0));
    mesh.add_triangle(a, b, c);
    assert!(mesh.face_normal(0).is_none());
}

#[test]
fn out_of_range_index_is_invalid() {
    let mut mesh = cube_mesh(1);
    mesh.add_triangle(0, 1, 42);
    assert!(!mesh.is_valid());
}

#[test]
fn scaled_mesh_scales_volume() {
    let mesh = cube_mesh(6).scaled(3.0);
    assert!((mesh.signed_volume() - 27.0).abs() < 1e-9);
    assert_eq!(mesh.bbox().max, Point3::new(3.0, 3.0, 3.0));
}
