//! Faces, edges and solids of the host kernel.
//!
//! A face walks each of its edge loops counter-clockwise about the face
//! normal (outer loop) or clockwise (holes). Co-edges carry the shared edge by
//! value; edges are identified by `id` within one solid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::curve::HostCurve;
use super::surface::HostSurface;
use super::values::{ElementId, HostBoundingBoxUv, Uv, Xyz};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEdge {
    pub id: usize,
    pub curve: HostCurve,
}

/// Use of an edge by one face. `flipped` means the face traverses the edge
/// against the edge curve direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostCoEdge {
    pub edge: HostEdge,
    pub flipped: bool,
}

impl HostCoEdge {
    #[must_use]
    pub fn new(edge: HostEdge, flipped: bool) -> Self {
        Self { edge, flipped }
    }

    /// The edge curve oriented the way the face traverses it.
    #[must_use]
    pub fn curve_following_face(&self) -> HostCurve {
        if self.flipped {
            self.edge.curve.create_reversed()
        } else {
            self.edge.curve.clone()
        }
    }

    #[must_use]
    pub fn start_point(&self) -> Option<Xyz> {
        self.edge.curve.end_point(usize::from(self.flipped))
    }

    #[must_use]
    pub fn end_point(&self) -> Option<Xyz> {
        self.edge.curve.end_point(usize::from(!self.flipped))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostEdgeLoop {
    pub coedges: Vec<HostCoEdge>,
}

impl HostEdgeLoop {
    #[must_use]
    pub fn new(coedges: Vec<HostCoEdge>) -> Self {
        Self { coedges }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostFace {
    pub surface: HostSurface,
    pub uv_box: HostBoundingBoxUv,
    /// Whether the face normal equals the surface orientation normal.
    pub orientation_matches_surface: bool,
    pub loops: Vec<HostEdgeLoop>,
    pub material_id: ElementId,
}

impl HostFace {
    #[must_use]
    pub fn new(surface: HostSurface, uv_box: HostBoundingBoxUv) -> Self {
        Self {
            surface,
            uv_box,
            orientation_matches_surface: true,
            loops: Vec::new(),
            material_id: ElementId::INVALID,
        }
    }

    /// Unit face normal at `uv`.
    #[must_use]
    pub fn compute_normal(&self, uv: Uv) -> Option<Xyz> {
        let n = self.surface.parametric_normal(uv)?;
        let same = self.surface.matches_parametric_orientation() == self.orientation_matches_surface;
        Some(if same { n } else { -n })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSolid {
    pub faces: Vec<HostFace>,
}

impl HostSolid {
    /// Distinct edges referenced by the faces, ordered by id.
    #[must_use]
    pub fn edges(&self) -> Vec<&HostEdge> {
        let mut edges = BTreeMap::new();
        for coedge in self.coedges() {
            edges.entry(coedge.edge.id).or_insert(&coedge.edge);
        }
        edges.into_values().collect()
    }

    /// Number of co-edges referencing each edge id.
    #[must_use]
    pub fn edge_uses(&self) -> BTreeMap<usize, usize> {
        let mut uses = BTreeMap::new();
        for coedge in self.coedges() {
            *uses.entry(coedge.edge.id).or_insert(0) += 1;
        }
        uses
    }

    /// Every edge is shared by exactly two faces.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        let uses = self.edge_uses();
        !uses.is_empty() && uses.values().all(|n| *n == 2)
    }

    fn coedges(&self) -> impl Iterator<Item = &HostCoEdge> {
        self.faces
            .iter()
            .flat_map(|f| f.loops.iter())
            .flat_map(|l| l.coedges.iter())
    }
}
