use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::brep::SolidOrientation;
use super::core::{BBox, Point3, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshFace {
    Triangle([u32; 3]),
    Quad([u32; 4]),
}

impl MeshFace {
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        match self {
            Self::Triangle(i) => i,
            Self::Quad(i) => i,
        }
    }

    #[must_use]
    pub const fn is_quad(&self) -> bool {
        matches!(self, Self::Quad(_))
    }
}

/// Polygon mesh of triangles and quads with optional per-face normals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Point3>,
    pub faces: Vec<MeshFace>,
    /// Either empty or one unit normal per face.
    pub face_normals: Vec<Vec3>,
}

impl Mesh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
            face_normals: Vec::new(),
        }
    }

    pub fn add_vertex(&mut self, point: Point3) -> u32 {
        self.vertices.push(point);
        (self.vertices.len() - 1) as u32
    }

    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.faces.push(MeshFace::Triangle([a, b, c]));
    }

    pub fn add_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.faces.push(MeshFace::Quad([a, b, c, d]));
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// `(triangles, quads)`.
    #[must_use]
    pub fn face_counts(&self) -> (usize, usize) {
        let quads = self.faces.iter().filter(|f| f.is_quad()).count();
        (self.faces.len() - quads, quads)
    }

    /// Returns true if all face indices are within bounds and every vertex is finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let n = self.vertices.len() as u32;
        self.vertices.iter().all(|p| p.is_valid())
            && self.faces.iter().all(|f| f.indices().iter().all(|&i| i < n))
            && (self.face_normals.is_empty() || self.face_normals.len() == self.faces.len())
    }

    /// Newell normal of a face, or `None` when it has no area.
    #[must_use]
    pub fn face_normal(&self, face: usize) -> Option<Vec3> {
        let indices = self.faces[face].indices();
        let mut normal = Vec3::ZERO;
        for k in 0..indices.len() {
            let a = self.vertices[indices[k] as usize];
            let b = self.vertices[indices[(k + 1) % indices.len()] as usize];
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        normal.normalized()
    }

    /// Recomputes `face_normals`; degenerate faces get a zero normal.
    pub fn compute_face_normals(&mut self) {
        self.face_normals = (0..self.faces.len())
            .map(|f| self.face_normal(f).unwrap_or(Vec3::ZERO))
            .collect();
    }

    #[must_use]
    pub fn bbox(&self) -> BBox {
        BBox::from_points(&self.vertices)
    }

    /// Closed means every undirected edge is used by exactly two faces.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        if self.faces.is_empty() {
            return false;
        }
        let mut uses: HashMap<(u32, u32), usize> = HashMap::new();
        for face in &self.faces {
            let indices = face.indices();
            for k in 0..indices.len() {
                let (a, b) = (indices[k], indices[(k + 1) % indices.len()]);
                *uses.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        uses.values().all(|&n| n == 2)
    }

    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;
        for face in &self.faces {
            let indices = face.indices();
            let p0 = self.vertices[indices[0] as usize].to_vec3();
            for k in 1..indices.len() - 1 {
                let p1 = self.vertices[indices[k] as usize].to_vec3();
                let p2 = self.vertices[indices[k + 1] as usize].to_vec3();
                volume += p0.dot(p1.cross(p2)) / 6.0;
            }
        }
        volume
    }

    #[must_use]
    pub fn solid_orientation(&self) -> SolidOrientation {
        if !self.is_closed() {
            return SolidOrientation::None;
        }
        let volume = self.signed_volume();
        if volume > 0.0 {
            SolidOrientation::Outward
        } else if volume < 0.0 {
            SolidOrientation::Inward
        } else {
            SolidOrientation::None
        }
    }

    /// Uniform scale about the origin; normals are unchanged for positive factors.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let flip = if factor < 0.0 { -1.0 } else { 1.0 };
        Self {
            vertices: self.vertices.iter().map(|p| p.scaled(factor)).collect(),
            faces: self.faces.clone(),
            face_normals: self.face_normals.iter().map(|n| *n * flip).collect(),
        }
    }
}
