//! Polygon meshes of the host kernel and the tessellated shape builder that
//! produces them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::HostError;
use super::values::{ElementId, VERTEX_TOLERANCE, Xyz};

/// One polygon of a [`HostMesh`]; three or more vertex indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMeshFacet {
    pub indices: Vec<u32>,
    pub material_id: ElementId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMesh {
    pub vertices: Vec<Xyz>,
    pub facets: Vec<HostMeshFacet>,
    pub is_closed: bool,
    pub graphics_style_id: ElementId,
}

impl HostMesh {
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.facets.iter().filter(|f| f.indices.len() == 3).count()
    }

    #[must_use]
    pub fn num_quads(&self) -> usize {
        self.facets.iter().filter(|f| f.indices.len() == 4).count()
    }

    /// Every facet index addresses a vertex.
    #[must_use]
    pub fn indices_in_bounds(&self) -> bool {
        let count = self.vertices.len();
        self.facets
            .iter()
            .flat_map(|f| f.indices.iter())
            .all(|&i| (i as usize) < count)
    }
}

/// Planar polygon handed to the [`TessellatedShapeBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TessellatedFace {
    pub vertices: Vec<Xyz>,
    pub material_id: ElementId,
}

impl TessellatedFace {
    #[must_use]
    pub fn new(vertices: Vec<Xyz>, material_id: ElementId) -> Self {
        Self { vertices, material_id }
    }
}

/// Collects polygon faces inside one connected face set and merges them into a
/// [`HostMesh`], welding vertices closer than the vertex tolerance.
#[derive(Debug, Default)]
pub struct TessellatedShapeBuilder {
    pub graphics_style_id: ElementId,
    faces: Vec<TessellatedFace>,
    is_solid: bool,
    open: bool,
}

impl TessellatedShapeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_connected_face_set(&mut self, is_solid: bool) {
        self.is_solid = is_solid;
        self.open = true;
    }

    pub fn add_face(&mut self, face: TessellatedFace) -> Result<(), HostError> {
        if !self.open {
            return Err(HostError::FaceSetNotOpen);
        }
        self.faces.push(face);
        Ok(())
    }

    pub fn close_connected_face_set(&mut self) {
        self.open = false;
    }

    /// Faces with fewer than three distinct vertices, or that are not planar
    /// within the vertex tolerance, are dropped.
    pub fn build(self) -> Result<HostMesh, HostError> {
        if self.open {
            return Err(HostError::FaceSetNotOpen);
        }

        let mut welder = VertexWelder::default();
        let mut facets = Vec::with_capacity(self.faces.len());
        let mut dropped = 0usize;
        for face in &self.faces {
            match distinct_polygon(&face.vertices) {
                Ok(polygon) if is_planar(&polygon) => {
                    let indices = polygon.iter().map(|p| welder.insert(*p)).collect();
                    facets.push(HostMeshFacet {
                        indices,
                        material_id: face.material_id,
                    });
                }
                _ => dropped += 1,
            }
        }
        if dropped > 0 {
            log::debug!("TessellatedShapeBuilder dropped {dropped} degenerate faces");
        }
        if facets.is_empty() {
            return Err(HostError::NothingBuilt);
        }

        Ok(HostMesh {
            vertices: welder.points,
            facets,
            is_closed: self.is_solid,
            graphics_style_id: self.graphics_style_id,
        })
    }
}

fn distinct_polygon(vertices: &[Xyz]) -> Result<Vec<Xyz>, HostError> {
    let mut out: Vec<Xyz> = Vec::with_capacity(vertices.len());
    for &v in vertices {
        if out.last().is_none_or(|last| !last.is_almost_equal_to(v, VERTEX_TOLERANCE)) {
            out.push(v);
        }
    }
    while out.len() > 1 && out[0].is_almost_equal_to(out[out.len() - 1], VERTEX_TOLERANCE) {
        out.pop();
    }
    if out.len() < 3 {
        return Err(HostError::DegenerateFace { count: out.len() });
    }
    Ok(out)
}

fn is_planar(polygon: &[Xyz]) -> bool {
    // Newell normal
    let mut normal = Xyz::ZERO;
    for (i, a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        normal = normal
            + Xyz::new(
                (a.y - b.y) * (a.z + b.z),
                (a.z - b.z) * (a.x + b.x),
                (a.x - b.x) * (a.y + b.y),
            );
    }
    let Some(normal) = normal.normalize() else {
        return false;
    };
    let origin = polygon[0];
    polygon
        .iter()
        .all(|p| (*p - origin).dot_product(normal).abs() <= VERTEX_TOLERANCE)
}

#[derive(Default)]
struct VertexWelder {
    points: Vec<Xyz>,
    grid: HashMap<(i64, i64, i64), Vec<u32>>,
}

impl VertexWelder {
    #[allow(clippy::cast_possible_truncation)]
    fn cell(p: Xyz) -> (i64, i64, i64) {
        let s = 1.0 / VERTEX_TOLERANCE;
        ((p.x * s).floor() as i64, (p.y * s).floor() as i64, (p.z * s).floor() as i64)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn insert(&mut self, p: Xyz) -> u32 {
        let (cx, cy, cz) = Self::cell(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(bucket) = self.grid.get(&(cx + dx, cy + dy, cz + dz)) {
                        if let Some(&hit) = bucket
                            .iter()
                            .find(|&&i| self.points[i as usize].is_almost_equal_to(p, VERTEX_TOLERANCE))
                        {
                            return hit;
                        }
                    }
                }
            }
        }
        let index = self.points.len() as u32;
        self.points.push(p);
        self.grid.entry((cx, cy, cz)).or_default().push(index);
        index
    }
}
