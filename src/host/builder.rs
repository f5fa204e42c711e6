//! Incremental B-rep construction for the host kernel.
//!
//! Faces take a NURBS surface, edges take bound lines, arcs or NURBS splines.
//! Loops are chains of co-edges that must close; `finish` checks that every
//! edge is used in a way compatible with the requested [`BRepType`] and
//! assembles the [`HostSolid`].

use serde::{Deserialize, Serialize};

use super::curve::HostCurve;
use super::error::HostError;
use super::surface::{HostNurbsSurface, HostSurface};
use super::topology::{HostCoEdge, HostEdge, HostEdgeLoop, HostFace, HostSolid};
use super::values::{ABSOLUTE_TOLERANCE, ElementId, HostBoundingBoxUv, Xyz};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BRepType {
    /// Closed shell with outward normals.
    Solid,
    /// Closed shell with inward normals.
    Void,
    OpenShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuilderFaceId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuilderLoopId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuilderEdgeId(usize);

#[derive(Debug)]
struct FaceDraft {
    surface: HostNurbsSurface,
    uv_box: HostBoundingBoxUv,
    reversed: bool,
    material_id: ElementId,
    loops: Vec<usize>,
    finished: bool,
}

#[derive(Debug)]
struct LoopDraft {
    coedges: Vec<(usize, bool)>,
    finished: bool,
}

#[derive(Debug)]
pub struct BRepBuilder {
    brep_type: BRepType,
    faces: Vec<FaceDraft>,
    loops: Vec<LoopDraft>,
    edges: Vec<HostCurve>,
    finished: bool,
    result: Option<HostSolid>,
}

impl BRepBuilder {
    #[must_use]
    pub fn new(brep_type: BRepType) -> Self {
        Self {
            brep_type,
            faces: Vec::new(),
            loops: Vec::new(),
            edges: Vec::new(),
            finished: false,
            result: None,
        }
    }

    #[must_use]
    pub const fn brep_type(&self) -> BRepType {
        self.brep_type
    }

    /// Adds a face on `surface`. Without `uv_box` the face covers the whole
    /// knot range. `reversed` flips the face normal against the surface.
    pub fn add_face(
        &mut self,
        surface: HostNurbsSurface,
        uv_box: Option<HostBoundingBoxUv>,
        reversed: bool,
    ) -> Result<BuilderFaceId, HostError> {
        self.check_open()?;
        let uv_box = uv_box.unwrap_or_else(|| {
            let (ku, kv) = (surface.knots_u(), surface.knots_v());
            HostBoundingBoxUv::new(ku[0], kv[0], ku[ku.len() - 1], kv[kv.len() - 1])
        });
        self.faces.push(FaceDraft {
            surface,
            uv_box,
            reversed,
            material_id: ElementId::INVALID,
            loops: Vec::new(),
            finished: false,
        });
        Ok(BuilderFaceId(self.faces.len() - 1))
    }

    pub fn set_face_material_id(&mut self, face: BuilderFaceId, material_id: ElementId) -> Result<(), HostError> {
        self.face_mut(face.0)?.material_id = material_id;
        Ok(())
    }

    pub fn add_loop(&mut self, face: BuilderFaceId) -> Result<BuilderLoopId, HostError> {
        self.check_open()?;
        let id = self.loops.len();
        let draft = self.face_mut(face.0)?;
        if draft.finished {
            return Err(HostError::AlreadyFinished { id: face.0 });
        }
        draft.loops.push(id);
        self.loops.push(LoopDraft {
            coedges: Vec::new(),
            finished: false,
        });
        Ok(BuilderLoopId(id))
    }

    /// Registers an edge geometry. Only bound lines, bound arcs and NURBS
    /// splines are accepted.
    pub fn add_edge(&mut self, curve: HostCurve) -> Result<BuilderEdgeId, HostError> {
        self.check_open()?;
        match &curve {
            HostCurve::Line(_) | HostCurve::Arc(_) | HostCurve::NurbSpline(_) if curve.is_bound() => {}
            other => {
                return Err(HostError::UnsupportedEdgeCurve {
                    kind: other.kind_name(),
                });
            }
        }
        self.edges.push(curve);
        Ok(BuilderEdgeId(self.edges.len() - 1))
    }

    pub fn add_co_edge(&mut self, lp: BuilderLoopId, edge: BuilderEdgeId, reversed: bool) -> Result<(), HostError> {
        self.check_open()?;
        if edge.0 >= self.edges.len() {
            return Err(HostError::UnknownId { id: edge.0 });
        }
        let draft = self.loops.get_mut(lp.0).ok_or(HostError::UnknownId { id: lp.0 })?;
        if draft.finished {
            return Err(HostError::AlreadyFinished { id: lp.0 });
        }
        draft.coedges.push((edge.0, reversed));
        Ok(())
    }

    /// Closes the loop; consecutive co-edges must meet within the absolute
    /// tolerance, including the last and the first.
    pub fn finish_loop(&mut self, lp: BuilderLoopId) -> Result<(), HostError> {
        let draft = self.loops.get(lp.0).ok_or(HostError::UnknownId { id: lp.0 })?;
        if draft.finished {
            return Err(HostError::AlreadyFinished { id: lp.0 });
        }
        if draft.coedges.is_empty() {
            return Err(HostError::EmptyLoop { id: lp.0 });
        }

        let ends: Vec<(Xyz, Xyz)> = draft
            .coedges
            .iter()
            .map(|&(edge, reversed)| self.coedge_ends(edge, reversed))
            .collect::<Result<_, _>>()?;
        let mut gap: f64 = 0.0;
        for (i, (_, end)) in ends.iter().enumerate() {
            let (next_start, _) = ends[(i + 1) % ends.len()];
            gap = gap.max(end.distance_to(next_start));
        }
        if gap > ABSOLUTE_TOLERANCE {
            return Err(HostError::LoopNotClosed { id: lp.0, gap });
        }

        self.loops[lp.0].finished = true;
        Ok(())
    }

    pub fn finish_face(&mut self, face: BuilderFaceId) -> Result<(), HostError> {
        let draft = self.faces.get(face.0).ok_or(HostError::UnknownId { id: face.0 })?;
        if draft.finished {
            return Err(HostError::AlreadyFinished { id: face.0 });
        }
        if draft.loops.is_empty() {
            return Err(HostError::EmptyFace { id: face.0 });
        }
        if let Some(open) = draft.loops.iter().find(|l| !self.loops[**l].finished) {
            return Err(HostError::LoopNotClosed {
                id: *open,
                gap: f64::NAN,
            });
        }
        self.faces[face.0].finished = true;
        Ok(())
    }

    /// Validates edge usage and assembles the result.
    pub fn finish(&mut self) -> Result<(), HostError> {
        self.check_open()?;
        self.finished = true;

        if self.faces.is_empty() {
            return Err(HostError::NothingBuilt);
        }
        if let Some(id) = self.faces.iter().position(|f| !f.finished) {
            return Err(HostError::EmptyFace { id });
        }

        let mut uses = vec![(0usize, 0usize); self.edges.len()];
        for lp in self.loops.iter().filter(|l| l.finished) {
            for &(edge, reversed) in &lp.coedges {
                if reversed {
                    uses[edge].1 += 1;
                } else {
                    uses[edge].0 += 1;
                }
            }
        }
        let closed = matches!(self.brep_type, BRepType::Solid | BRepType::Void);
        for (id, &(forward, backward)) in uses.iter().enumerate() {
            let total = forward + backward;
            if total == 0 {
                continue;
            }
            if total > 2 || (closed && total != 2) {
                return Err(HostError::NonManifoldEdge { id, uses: total });
            }
            if forward > 1 || backward > 1 {
                return Err(HostError::InconsistentEdgeOrientation { id });
            }
        }

        let faces = self
            .faces
            .iter()
            .map(|draft| HostFace {
                surface: HostSurface::Nurbs(draft.surface.clone()),
                uv_box: draft.uv_box,
                orientation_matches_surface: !draft.reversed,
                loops: draft
                    .loops
                    .iter()
                    .map(|&l| {
                        HostEdgeLoop::new(
                            self.loops[l]
                                .coedges
                                .iter()
                                .map(|&(edge, reversed)| {
                                    HostCoEdge::new(
                                        HostEdge {
                                            id: edge,
                                            curve: self.edges[edge].clone(),
                                        },
                                        reversed,
                                    )
                                })
                                .collect(),
                        )
                    })
                    .collect(),
                material_id: draft.material_id,
            })
            .collect();

        log::debug!(
            "BRepBuilder finished {:?} with {} faces and {} edges",
            self.brep_type,
            self.faces.len(),
            self.edges.len()
        );
        self.result = Some(HostSolid { faces });
        Ok(())
    }

    #[must_use]
    pub fn is_result_available(&self) -> bool {
        self.result.is_some()
    }

    /// Takes the built solid.
    pub fn get_result(&mut self) -> Option<HostSolid> {
        self.result.take()
    }

    fn check_open(&self) -> Result<(), HostError> {
        if self.finished {
            Err(HostError::AlreadyFinished { id: 0 })
        } else {
            Ok(())
        }
    }

    fn face_mut(&mut self, id: usize) -> Result<&mut FaceDraft, HostError> {
        self.faces.get_mut(id).ok_or(HostError::UnknownId { id })
    }

    fn coedge_ends(&self, edge: usize, reversed: bool) -> Result<(Xyz, Xyz), HostError> {
        let curve = &self.edges[edge];
        let (Some(start), Some(end)) = (curve.end_point(0), curve.end_point(1)) else {
            return Err(HostError::UnsupportedEdgeCurve {
                kind: curve.kind_name(),
            });
        };
        Ok(if reversed { (end, start) } else { (start, end) })
    }
}
