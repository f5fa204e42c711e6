//! Guest B-reps to host solids through the host [`BRepBuilder`].
//!
//! The builder takes NURBS surfaces only, and bound lines, arcs and NURBS
//! splines as edges. Faces whose surface or edges have no such form are left
//! out before building starts, which turns the result into an open shell.

use super::context::ConversionContext;
use super::curve::encode_raw;
use super::diagnostics::{ConversionDiagnostics, ConversionWarning};
use super::error::ConversionError;
use super::options::{ConversionOptions, HostTolerances};
use super::surface::encode_nurbs_surface;
use crate::geom::{Brep, Curve, Curve3, Interval, SolidOrientation, Surface, UvDomain};
use crate::host::{
    BRepBuilder, BRepType, BuilderEdgeId, HostBoundingBoxUv, HostCurve, HostError, HostNurbsSurface, HostSolid,
};

/// Host curves of one guest edge, in edge direction.
#[derive(Debug, Clone)]
enum EdgeGeometry {
    Curves(Vec<HostCurve>),
    /// Shorter than the short curve tolerance; contributes no co-edge.
    Short,
    Unsupported(&'static str),
}

pub fn encode_solid(brep: &Brep) -> (Option<HostSolid>, ConversionDiagnostics) {
    encode_solid_with_options(brep, &ConversionOptions::default())
}

/// Best effort: faces that cannot be encoded are left out and reported; a
/// builder failure yields `None` with a [`ConversionWarning::BuilderFailed`].
pub fn encode_solid_with_options(brep: &Brep, options: &ConversionOptions) -> (Option<HostSolid>, ConversionDiagnostics) {
    let tolerances = &options.tolerances;
    let mut diagnostics = ConversionDiagnostics::new();

    let scaled;
    let brep = if options.is_scaled() {
        scaled = brep.scaled(options.scale_factor);
        &scaled
    } else {
        brep
    };

    let bbox = brep.bbox();
    if !bbox.is_valid() || bbox.diagonal() < tolerances.short_curve {
        let err = ConversionError::failed("brep is empty or smaller than the short curve tolerance");
        diagnostics.record(ConversionWarning::BuilderFailed { reason: err.to_string() });
        return (None, diagnostics);
    }

    let geometry: Vec<EdgeGeometry> = (0..brep.edges.len())
        .map(|edge| edge_geometry(brep, edge, tolerances))
        .collect();
    for (edge, g) in geometry.iter().enumerate() {
        if let EdgeGeometry::Unsupported(kind) = g {
            diagnostics.record(ConversionWarning::SkippedEdge {
                edge,
                kind: (*kind).to_string(),
            });
        }
    }

    let mut surfaces = Vec::with_capacity(brep.faces.len());
    for face in 0..brep.faces.len() {
        match face_surface(brep, face, &geometry) {
            Ok(surface) => surfaces.push(Some(surface)),
            Err(reason) => {
                diagnostics.record(ConversionWarning::SkippedFace { face, reason });
                surfaces.push(None);
            }
        }
    }

    let brep_type = if surfaces.iter().any(Option::is_none) {
        BRepType::OpenShell
    } else {
        match brep.solid_orientation() {
            SolidOrientation::Outward => BRepType::Solid,
            SolidOrientation::Inward => BRepType::Void,
            SolidOrientation::None => BRepType::OpenShell,
        }
    };

    let context = ConversionContext::current();
    let mut encoder = Encoder {
        brep,
        geometry: &geometry,
        builder: BRepBuilder::new(brep_type),
        edges: vec![None; brep.edges.len()],
    };
    let built = encoder.build(surfaces, &context);

    match built {
        Ok(solid) => {
            diagnostics.face_count = solid.faces.len();
            diagnostics.edge_count = encoder.edges.iter().flatten().map(Vec::len).sum();
            log::debug!(
                "encoded {:?} with {} of {} faces",
                brep_type,
                diagnostics.face_count,
                brep.faces.len()
            );
            (Some(solid), diagnostics)
        }
        Err(err) => {
            diagnostics.record(ConversionWarning::BuilderFailed { reason: err.to_string() });
            (None, diagnostics)
        }
    }
}

/// NURBS form of the surface of `face` and, for native NURBS surfaces, the
/// parameter box of its outer loop. `Err` holds the reason to skip the face.
fn face_surface(
    brep: &Brep,
    face: usize,
    geometry: &[EdgeGeometry],
) -> Result<(HostNurbsSurface, Option<HostBoundingBoxUv>), String> {
    for &l in &brep.faces[face].loops {
        for &t in &brep.loops[l].trims {
            if let Some(edge) = brep.trims[t].edge {
                if let EdgeGeometry::Unsupported(kind) = geometry[edge] {
                    return Err(format!("edge {edge} is a {kind}"));
                }
            }
        }
    }

    let surface = brep.face_surface(face);
    let nurbs = surface
        .to_nurbs()
        .ok_or_else(|| format!("{} has no NURBS form", surface.kind_name()))?;
    let encoded = encode_nurbs_surface(&nurbs).map_err(|err| err.to_string())?;

    let uv_box = match (surface, brep.outer_loop(face)) {
        (Surface::Nurbs(_), Some(outer)) => {
            let extent = UvDomain::from_points(&brep.loop_polygon(outer));
            Some(HostBoundingBoxUv::new(extent.u.t0, extent.v.t0, extent.u.t1, extent.v.t1))
        }
        _ => None,
    };
    Ok((encoded, uv_box))
}

/// Host curves for `edge`: its curve restricted to the edge domain, in edge
/// direction, with closed curves split in two halves.
fn edge_geometry(brep: &Brep, edge: usize, tolerances: &HostTolerances) -> EdgeGeometry {
    let e = &brep.edges[edge];
    let curve = brep.edge_curve(edge);
    let curve = if curve.domain().epsilon_equals(e.domain, 0.0) {
        curve.clone()
    } else {
        match curve.trimmed(e.domain) {
            Some(trimmed) => trimmed,
            None => return EdgeGeometry::Short,
        }
    };
    let curve = if e.proxy_reversed { curve.reversed() } else { curve };

    if curve.is_short(tolerances.short_curve) {
        log::debug!("edge {edge} is shorter than the short curve tolerance");
        return EdgeGeometry::Short;
    }

    let pieces = if curve.is_closed(tolerances.vertex) {
        split_closed(&curve)
    } else {
        vec![curve]
    };
    let mut curves = Vec::with_capacity(pieces.len());
    for piece in &pieces {
        match encode_raw(piece, tolerances) {
            Ok(host) => curves.push(host),
            Err(err) => {
                log::debug!("edge {edge}: {err}");
                return EdgeGeometry::Unsupported(piece.kind_name());
            }
        }
    }
    EdgeGeometry::Curves(curves)
}

fn split_closed(curve: &Curve) -> Vec<Curve> {
    let d = curve.domain();
    let mid = d.mid();
    match (curve.trimmed(Interval::new(d.t0, mid)), curve.trimmed(Interval::new(mid, d.t1))) {
        (Some(a), Some(b)) => vec![a, b],
        _ => vec![curve.clone()],
    }
}

struct Encoder<'a> {
    brep: &'a Brep,
    geometry: &'a [EdgeGeometry],
    builder: BRepBuilder,
    /// Builder edges per guest edge, added on first use.
    edges: Vec<Option<Vec<BuilderEdgeId>>>,
}

impl Encoder<'_> {
    fn add_face(
        &mut self,
        face: usize,
        surface: HostNurbsSurface,
        uv_box: Option<HostBoundingBoxUv>,
        context: &ConversionContext,
    ) -> Result<(), HostError> {
        let brep = self.brep;
        let guest = &brep.faces[face];
        let reversed = guest.orientation_reversed;
        let id = self.builder.add_face(surface, uv_box, reversed)?;
        self.builder
            .set_face_material_id(id, context.face_material(face, guest.material_id))?;

        for &l in &guest.loops {
            let trims = &brep.loops[l].trims;
            let ordered: Vec<usize> = if reversed {
                trims.iter().rev().copied().collect()
            } else {
                trims.clone()
            };

            let mut coedges = Vec::with_capacity(ordered.len());
            for t in ordered {
                let trim = &brep.trims[t];
                let Some(edge) = trim.edge else {
                    continue;
                };
                let coedge_reversed = reversed != trim.reversed;
                let ids = self.builder_edges(edge)?;
                if coedge_reversed {
                    coedges.extend(ids.into_iter().rev().map(|e| (e, true)));
                } else {
                    coedges.extend(ids.into_iter().map(|e| (e, false)));
                }
            }
            if coedges.is_empty() {
                log::debug!("face {face}: loop {l} has no encodable edges");
                continue;
            }

            let lp = self.builder.add_loop(id)?;
            for (edge, coedge_reversed) in coedges {
                self.builder.add_co_edge(lp, edge, coedge_reversed)?;
            }
            self.builder.finish_loop(lp)?;
        }
        self.builder.finish_face(id)
    }

    fn builder_edges(&mut self, edge: usize) -> Result<Vec<BuilderEdgeId>, HostError> {
        if let Some(ids) = &self.edges[edge] {
            return Ok(ids.clone());
        }
        let ids = match &self.geometry[edge] {
            EdgeGeometry::Curves(curves) => curves
                .iter()
                .map(|c| self.builder.add_edge(c.clone()))
                .collect::<Result<Vec<_>, _>>()?,
            EdgeGeometry::Short | EdgeGeometry::Unsupported(_) => Vec::new(),
        };
        self.edges[edge] = Some(ids.clone());
        Ok(ids)
    }

    fn build(
        &mut self,
        surfaces: Vec<Option<(HostNurbsSurface, Option<HostBoundingBoxUv>)>>,
        context: &ConversionContext,
    ) -> Result<HostSolid, HostError> {
        for (face, surface) in surfaces.into_iter().enumerate() {
            if let Some((surface, uv_box)) = surface {
                self.add_face(face, surface, uv_box, context)?;
            }
        }
        self.builder.finish()?;
        self.builder.get_result().ok_or(HostError::NothingBuilt)
    }
}
