//! Host faces and solids to guest B-reps.
//!
//! Each host face is decoded onto one surface; its edge loops are pulled back
//! into that surface's parameter space, classified by winding and grouped into
//! shells, one guest face per outer loop. Edges shared between host faces
//! become one guest edge through a cache keyed by host edge id that lives for
//! a single call.

use std::collections::HashMap;

use super::curve::decode_raw;
use super::diagnostics::{ConversionDiagnostics, ConversionWarning};
use super::options::{ConversionOptions, HostTolerances};
use super::pullback::Pullback;
use super::surface::decode_surface_raw;
use crate::geom::{
    Brep, Curve, Curve3, CurveOrientation, Interval, LoopType, Point3, RegionContainment, Surface,
    TrimCurve, TrimLoop, Vec3,
};
use crate::host::{HostCoEdge, HostEdge, HostFace, HostSolid};

/// Surfaces decoded for topology assembly are not inflated.
const TOPOLOGY_RELATIVE_TOLERANCE: f64 = 0.0;

/// Guest edge per host edge id; `None` for edges whose curve failed to decode.
#[derive(Debug, Default)]
struct EdgeCache {
    edges: HashMap<usize, Option<usize>>,
}

impl EdgeCache {
    fn edge(
        &mut self,
        brep: &mut Brep,
        edge: &HostEdge,
        tolerances: &HostTolerances,
        diagnostics: &mut ConversionDiagnostics,
    ) -> Option<usize> {
        if let Some(cached) = self.edges.get(&edge.id) {
            return *cached;
        }
        let built = match decode_raw(&edge.curve, tolerances) {
            Ok(curve) => {
                let curve = brep.add_edge_curve(curve);
                Some(brep.add_edge(curve))
            }
            Err(err) => {
                log::debug!("edge {}: {err}", edge.id);
                diagnostics.record(ConversionWarning::SkippedEdge {
                    edge: edge.id,
                    kind: edge.curve.kind_name().to_string(),
                });
                None
            }
        };
        self.edges.insert(edge.id, built);
        built
    }
}

/// One closed boundary in parameter space. `edges[i]` is `None` for a
/// singular trim; `orientation[i]` is `+1` when trim `i` runs along its edge.
#[derive(Debug, Clone)]
struct Boundary {
    kind: LoopType,
    edges: Vec<Option<usize>>,
    orientation: Vec<i32>,
    trims: TrimLoop,
}

pub fn decode_face(face: &HostFace) -> (Option<Brep>, ConversionDiagnostics) {
    decode_face_with_options(face, &ConversionOptions::default())
}

pub fn decode_face_with_options(face: &HostFace, options: &ConversionOptions) -> (Option<Brep>, ConversionDiagnostics) {
    decode_faces(std::slice::from_ref(face), options)
}

/// Best effort: faces that cannot be decoded are left out and reported, an
/// invalid result gets one repair pass.
pub fn decode_solid(solid: &HostSolid) -> (Option<Brep>, ConversionDiagnostics) {
    decode_solid_with_options(solid, &ConversionOptions::default())
}

pub fn decode_solid_with_options(solid: &HostSolid, options: &ConversionOptions) -> (Option<Brep>, ConversionDiagnostics) {
    decode_faces(&solid.faces, options)
}

fn decode_faces(faces: &[HostFace], options: &ConversionOptions) -> (Option<Brep>, ConversionDiagnostics) {
    let tolerances = &options.tolerances;
    let mut diagnostics = ConversionDiagnostics::new();
    let mut brep = Brep::new();
    let mut cache = EdgeCache::default();

    for (index, face) in faces.iter().enumerate() {
        let Some((surface, shells)) = pull_face(&mut brep, face, index, &mut cache, tolerances, &mut diagnostics)
        else {
            continue;
        };
        if shells.is_empty() {
            diagnostics.record(ConversionWarning::SkippedFace {
                face: index,
                reason: "no outer loop".into(),
            });
            continue;
        }
        let surface = brep.add_surface(surface);
        trim_surface(&mut brep, surface, face, shells);
    }

    if brep.faces.is_empty() {
        return (None, diagnostics);
    }

    brep.match_ends(tolerances.vertex);
    brep.set_vertices(tolerances.vertex);
    brep.set_tolerances_and_flags();

    let problems = brep.validate(tolerances.vertex);
    if !problems.is_empty() {
        log::debug!("repairing decoded brep ({} problems)", problems.len());
        brep.repair(tolerances.vertex);
        diagnostics.repaired = true;
        diagnostics.record(ConversionWarning::DegradedGeometry { problems });
    }

    diagnostics.face_count = brep.faces.len();
    diagnostics.edge_count = brep.edges.len();
    log::debug!(
        "decoded {} faces, {} edges from {} host faces",
        diagnostics.face_count,
        diagnostics.edge_count,
        faces.len()
    );

    let brep = if options.is_scaled() {
        brep.scaled(options.scale_factor)
    } else {
        brep
    };
    (Some(brep), diagnostics)
}

/// Surface of `face` and the face's loops pulled back onto it, grouped in
/// shells, outer loop first. Edges are added to `brep` as they are met.
fn pull_face(
    brep: &mut Brep,
    face: &HostFace,
    face_index: usize,
    cache: &mut EdgeCache,
    tolerances: &HostTolerances,
    diagnostics: &mut ConversionDiagnostics,
) -> Option<(Surface, Vec<Vec<Boundary>>)> {
    let surface = match decode_surface_raw(face, TOPOLOGY_RELATIVE_TOLERANCE, tolerances) {
        Ok(surface) => surface,
        Err(err) => {
            log::debug!("face {face_index}: {err}");
            diagnostics.record(ConversionWarning::UnavailableSurface {
                face: face_index,
                kind: face.surface.kind_name().to_string(),
            });
            return None;
        }
    };
    let surface = if face.surface.matches_parametric_orientation() {
        surface
    } else {
        surface.transposed()
    };
    let pullback = Pullback::new(&surface, tolerances.vertex);

    let mut boundaries = Vec::with_capacity(face.loops.len());
    for (loop_index, edge_loop) in face.loops.iter().enumerate() {
        if edge_loop.coedges.is_empty() {
            continue;
        }
        let Some(boundary) = pull_loop(
            brep,
            face,
            (face_index, loop_index),
            &edge_loop.coedges,
            &surface,
            &pullback,
            cache,
            tolerances,
            diagnostics,
        ) else {
            continue;
        };
        boundaries.push(boundary);
    }

    let shells = group_shells(boundaries, face_index, tolerances.vertex, diagnostics);
    Some((surface, shells))
}

#[allow(clippy::too_many_arguments)]
fn pull_loop(
    brep: &mut Brep,
    face: &HostFace,
    (face_index, loop_index): (usize, usize),
    coedges: &[HostCoEdge],
    surface: &Surface,
    pullback: &Pullback<'_>,
    cache: &mut EdgeCache,
    tolerances: &HostTolerances,
    diagnostics: &mut ConversionDiagnostics,
) -> Option<Boundary> {
    let flipped = !face.orientation_matches_surface;
    let ordered: Vec<_> = if flipped {
        coedges.iter().rev().collect()
    } else {
        coedges.iter().collect()
    };

    let mut trims: Vec<TrimCurve> = Vec::with_capacity(ordered.len());
    let mut edges = Vec::with_capacity(ordered.len());
    let mut orientation = Vec::with_capacity(ordered.len());
    for coedge in ordered {
        let Some(edge) = cache.edge(brep, &coedge.edge, tolerances, diagnostics) else {
            continue;
        };
        let Ok(segment) = decode_raw(&coedge.curve_following_face(), tolerances) else {
            continue;
        };
        let segment = if flipped { segment.reversed() } else { segment };

        let along = tangent_at_mid(&segment).is_parallel_to(tangent_at_mid(brep.edge_curve(edge)), tolerances.angle);
        if along == 0 {
            log::debug!("face {face_index}: degenerate co-edge on edge {edge} skipped");
            continue;
        }
        let Some(trim) = pullback.pull(&segment, trims.last().map(TrimCurve::end)) else {
            log::debug!("face {face_index}: edge {edge} could not be pulled back");
            continue;
        };
        trims.push(trim);
        edges.push(edge);
        orientation.push(along);
    }
    if trims.is_empty() {
        return None;
    }
    let trims = pullback.shift_into_domain(trims);

    let mut boundary = Boundary {
        kind: LoopType::Unknown,
        edges: Vec::with_capacity(edges.len() + 1),
        orientation: Vec::with_capacity(edges.len() + 1),
        trims: TrimLoop::new(),
    };
    let n = trims.len();
    for a in 0..n {
        let b = (a + 1) % n;
        boundary.trims.append_segment(trims[a].clone());
        boundary.edges.push(Some(edges[a]));
        boundary.orientation.push(orientation[a]);

        let leaving = loop_end(brep, edges[a], orientation[a]);
        let arriving = loop_start(brep, edges[b], orientation[b]);
        let gap = leaving.distance_to(arriving);
        if gap > tolerances.vertex {
            diagnostics.record(ConversionWarning::MissingEdge {
                face: face_index,
                loop_index,
                gap,
            });
            continue;
        }

        let (from, to) = (trims[a].end(), trims[b].start());
        let mid = from.midpoint(to);
        if from.distance_to(to) > 0.0 && surface.is_at_singularity(mid.x, mid.y, tolerances.vertex) {
            if let Ok(singular) = TrimCurve::line(from, to, Interval::UNIT) {
                boundary.trims.append_segment(singular);
                boundary.edges.push(None);
                boundary.orientation.push(0);
            }
        }
    }

    boundary.trims.make_closed(tolerances.vertex);
    boundary.kind = match boundary.trims.orientation() {
        CurveOrientation::CounterClockwise => LoopType::Outer,
        CurveOrientation::Clockwise => LoopType::Inner,
        CurveOrientation::Undefined => {
            diagnostics.record(ConversionWarning::UnknownLoopOrientation {
                face: face_index,
                loop_index,
            });
            LoopType::Unknown
        }
    };
    Some(boundary)
}

fn tangent_at_mid(curve: &Curve) -> Vec3 {
    curve.derivative_at(curve.domain().mid())
}

/// Point where the loop leaves `edge`.
fn loop_end(brep: &Brep, edge: usize, orientation: i32) -> Point3 {
    let (start, end) = brep.edge_end_points(edge);
    if orientation > 0 { end } else { start }
}

/// Point where the loop enters `edge`.
fn loop_start(brep: &Brep, edge: usize, orientation: i32) -> Point3 {
    let (start, end) = brep.edge_end_points(edge);
    if orientation > 0 { start } else { end }
}

/// One shell per outer loop. Inner loops join the only shell, or the first
/// shell whose outer boundary contains them; loops of unknown winding join
/// the first shell.
fn group_shells(
    boundaries: Vec<Boundary>,
    face_index: usize,
    tolerance: f64,
    diagnostics: &mut ConversionDiagnostics,
) -> Vec<Vec<Boundary>> {
    let mut shells: Vec<Vec<Boundary>> = Vec::new();
    let mut inner = Vec::new();
    let mut unknown = Vec::new();
    for (loop_index, boundary) in boundaries.into_iter().enumerate() {
        match boundary.kind {
            LoopType::Outer => shells.push(vec![boundary]),
            LoopType::Inner => inner.push((loop_index, boundary)),
            LoopType::Unknown => unknown.push(boundary),
        }
    }
    if shells.is_empty() {
        return shells;
    }

    if shells.len() == 1 {
        shells[0].extend(inner.into_iter().map(|(_, b)| b));
    } else {
        for (loop_index, boundary) in inner {
            let containing: Vec<usize> = shells
                .iter()
                .enumerate()
                .filter(|(_, shell)| boundary.trims.relationship(&shell[0].trims, tolerance) == RegionContainment::AInsideB)
                .map(|(i, _)| i)
                .collect();
            if containing.len() != 1 {
                diagnostics.record(ConversionWarning::AmbiguousTopology {
                    face: face_index,
                    loop_index,
                    candidates: containing.len(),
                });
            }
            if let Some(&first) = containing.first() {
                shells[first].push(boundary);
            }
        }
    }
    shells[0].extend(unknown);
    shells
}

/// One guest face per shell, all sharing `surface`.
fn trim_surface(brep: &mut Brep, surface: usize, face: &HostFace, shells: Vec<Vec<Boundary>>) {
    for shell in shells {
        let face_index = brep.add_face(surface);
        brep.faces[face_index].orientation_reversed = !face.orientation_matches_surface;
        brep.faces[face_index].material_id = face.material_id.is_valid().then_some(face.material_id.0);

        for boundary in shell {
            let loop_index = brep.add_loop(face_index, boundary.kind);
            let segments = boundary.trims.into_segments();
            for ((segment, edge), orientation) in segments.into_iter().zip(boundary.edges).zip(boundary.orientation) {
                let curve = brep.add_trim_curve(segment);
                match edge {
                    Some(edge) => {
                        brep.add_trim(curve, edge, orientation < 0, loop_index);
                    }
                    None => {
                        brep.add_singular_trim(curve, loop_index);
                    }
                }
            }
        }
    }
}
