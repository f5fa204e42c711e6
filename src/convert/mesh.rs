//! Mesh conversion in both directions.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::context::ConversionContext;
use super::error::{ConversionError, ConversionResult};
use super::options::{ConversionOptions, HostTolerances};
use super::values::{decode_point, encode_point};
use crate::geom::{Mesh, MeshFace, Point3, SolidOrientation};
use crate::host::{HostMesh, TessellatedFace, TessellatedShapeBuilder};

pub fn decode_mesh(mesh: &HostMesh) -> Mesh {
    decode_mesh_with_options(mesh, &ConversionOptions::default())
}

/// Triangles and quads are copied; larger polygons are fanned into triangles
/// around their first vertex and facets with fewer than three indices are
/// dropped.
pub fn decode_mesh_with_options(mesh: &HostMesh, options: &ConversionOptions) -> Mesh {
    let mut decoded = Mesh::with_capacity(mesh.vertices.len(), mesh.facets.len());
    decoded
        .vertices
        .extend(mesh.vertices.iter().map(|p| decode_point(*p)));

    let mut dropped = 0usize;
    for facet in &mesh.facets {
        match facet.indices.as_slice() {
            &[a, b, c] => decoded.add_triangle(a, b, c),
            &[a, b, c, d] => decoded.add_quad(a, b, c, d),
            [first, rest @ ..] if rest.len() > 3 => {
                for pair in rest.windows(2) {
                    decoded.add_triangle(*first, pair[0], pair[1]);
                }
            }
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        log::debug!("dropped {dropped} facets with fewer than three vertices");
    }
    decoded.compute_face_normals();

    if options.is_scaled() {
        decoded.scaled(options.scale_factor)
    } else {
        decoded
    }
}

/// Decodes independent meshes, on the thread pool with the `parallel` feature.
pub fn decode_meshes(meshes: &[HostMesh], options: &ConversionOptions) -> Vec<Mesh> {
    cfg_if::cfg_if! {
        if #[cfg(feature = "parallel")] {
            meshes.par_iter().map(|m| decode_mesh_with_options(m, options)).collect()
        } else {
            meshes.iter().map(|m| decode_mesh_with_options(m, options)).collect()
        }
    }
}

pub fn encode_mesh(mesh: &Mesh) -> ConversionResult<HostMesh> {
    encode_mesh_with_options(mesh, &ConversionOptions::default())
}

/// Closed meshes are built as solids. Every face takes the material of the
/// current [`ConversionContext`]; non planar quads are split along their
/// shorter diagonal.
pub fn encode_mesh_with_options(mesh: &Mesh, options: &ConversionOptions) -> ConversionResult<HostMesh> {
    let scaled;
    let mesh = if options.is_scaled() {
        scaled = mesh.scaled(options.scale_factor);
        &scaled
    } else {
        mesh
    };
    if !mesh.bbox().is_valid() {
        return Err(ConversionError::failed("mesh has no valid bounding box"));
    }
    if !mesh.is_valid() {
        return Err(ConversionError::failed("mesh face index out of bounds"));
    }

    let context = ConversionContext::current();
    let is_solid = mesh.solid_orientation() != SolidOrientation::None;
    let mut builder = TessellatedShapeBuilder::new();
    builder.graphics_style_id = context.graphics_style_id;
    builder.open_connected_face_set(is_solid);

    let vertex = |i: u32| mesh.vertices[i as usize];
    for face in &mesh.faces {
        match *face {
            MeshFace::Triangle([a, b, c]) => add_polygon(&mut builder, &[vertex(a), vertex(b), vertex(c)], &context)?,
            MeshFace::Quad(indices) => {
                let quad = indices.map(vertex);
                if is_planar_quad(&quad, &options.tolerances) {
                    add_polygon(&mut builder, &quad, &context)?;
                } else {
                    let [p0, p1, p2, p3] = quad;
                    let (first, second) = if p0.distance_to(p2) <= p1.distance_to(p3) {
                        ([p0, p1, p2], [p0, p2, p3])
                    } else {
                        ([p0, p1, p3], [p1, p2, p3])
                    };
                    add_polygon(&mut builder, &first, &context)?;
                    add_polygon(&mut builder, &second, &context)?;
                }
            }
        }
    }
    builder.close_connected_face_set();

    let built = builder
        .build()
        .map_err(|err| ConversionError::failed(format!("mesh build: {err}")))?;
    log::debug!(
        "encoded mesh with {} vertices and {} facets (solid: {is_solid})",
        built.vertices.len(),
        built.facets.len()
    );
    Ok(built)
}

fn add_polygon(
    builder: &mut TessellatedShapeBuilder,
    points: &[Point3],
    context: &ConversionContext,
) -> ConversionResult<()> {
    let vertices = points.iter().map(|p| encode_point(*p)).collect();
    builder.add_face(TessellatedFace::new(vertices, context.material_id))?;
    Ok(())
}

/// The fourth corner lies on the plane of the first three.
fn is_planar_quad(quad: &[Point3; 4], tolerances: &HostTolerances) -> bool {
    let [p0, p1, p2, p3] = *quad;
    let Some(normal) = (p1 - p0).cross(p2 - p0).normalized() else {
        return false;
    };
    (p3 - p0).dot(normal).abs() <= tolerances.vertex
}
