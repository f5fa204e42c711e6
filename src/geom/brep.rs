//! Index-arena boundary representation for the guest kernel.
//!
//! A [`Brep`] owns flat arrays of surfaces, 3D edge curves, 2D trim curves,
//! vertices, edges, trims, loops and faces; elements refer to each other by
//! index. Trim parameters run in step with their edge: a trim that is not
//! reversed uses the edge parameter `t` directly, a reversed one uses `-t`.

use serde::{Deserialize, Serialize};

use super::core::{BBox, Interval, Point2, Point3, Vec3};
use super::curve::{Curve, Curve3};
use super::surface::{Direction, Surface, Surface3};
use super::trim::{TrimCurve, UvDomain, contains_point_polygon};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrimType {
    Unknown,
    Boundary,
    Mated,
    Seam,
    Singular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopType {
    Unknown,
    Outer,
    Inner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolidOrientation {
    /// Not a closed solid.
    None,
    Outward,
    Inward,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrepVertex {
    pub point: Point3,
    pub edges: Vec<usize>,
    pub tolerance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrepEdge {
    pub curve: usize,
    pub domain: Interval,
    pub trims: Vec<usize>,
    pub vertices: [Option<usize>; 2],
    /// The edge runs against its curve.
    pub proxy_reversed: bool,
    pub tolerance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrepTrim {
    pub curve: usize,
    pub edge: Option<usize>,
    pub reversed: bool,
    pub loop_index: usize,
    pub trim_type: TrimType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrepLoop {
    pub kind: LoopType,
    pub face: usize,
    pub trims: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrepFace {
    pub surface: usize,
    pub loops: Vec<usize>,
    pub orientation_reversed: bool,
    pub material_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Brep {
    pub surfaces: Vec<Surface>,
    pub curves3d: Vec<Curve>,
    pub curves2d: Vec<TrimCurve>,
    pub vertices: Vec<BrepVertex>,
    pub edges: Vec<BrepEdge>,
    pub trims: Vec<BrepTrim>,
    pub loops: Vec<BrepLoop>,
    pub faces: Vec<BrepFace>,
}

impl Brep {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── construction ────────────────────────────────────────────────────────

    pub fn add_surface(&mut self, surface: Surface) -> usize {
        self.surfaces.push(surface);
        self.surfaces.len() - 1
    }

    pub fn add_edge_curve(&mut self, curve: Curve) -> usize {
        self.curves3d.push(curve);
        self.curves3d.len() - 1
    }

    pub fn add_trim_curve(&mut self, curve: TrimCurve) -> usize {
        self.curves2d.push(curve);
        self.curves2d.len() - 1
    }

    /// Edge over the full domain of curve `curve`.
    pub fn add_edge(&mut self, curve: usize) -> usize {
        let domain = self.curves3d[curve].domain();
        self.edges.push(BrepEdge {
            curve,
            domain,
            trims: Vec::new(),
            vertices: [None, None],
            proxy_reversed: false,
            tolerance: 0.0,
        });
        self.edges.len() - 1
    }

    pub fn add_face(&mut self, surface: usize) -> usize {
        self.faces.push(BrepFace {
            surface,
            loops: Vec::new(),
            orientation_reversed: false,
            material_id: None,
        });
        self.faces.len() - 1
    }

    pub fn add_loop(&mut self, face: usize, kind: LoopType) -> usize {
        self.loops.push(BrepLoop {
            kind,
            face,
            trims: Vec::new(),
        });
        let index = self.loops.len() - 1;
        self.faces[face].loops.push(index);
        index
    }

    /// Appends a trim on `edge` to `loop_index`.
    pub fn add_trim(&mut self, curve: usize, edge: usize, reversed: bool, loop_index: usize) -> usize {
        let index = self.trims.len();
        let mated = !self.edges[edge].trims.is_empty();
        if mated {
            for &other in &self.edges[edge].trims {
                self.trims[other].trim_type = TrimType::Mated;
            }
        }
        self.trims.push(BrepTrim {
            curve,
            edge: Some(edge),
            reversed,
            loop_index,
            trim_type: if mated { TrimType::Mated } else { TrimType::Boundary },
        });
        self.edges[edge].trims.push(index);
        self.loops[loop_index].trims.push(index);
        index
    }

    /// Appends an edgeless trim running along a collapsed side of the surface.
    pub fn add_singular_trim(&mut self, curve: usize, loop_index: usize) -> usize {
        let index = self.trims.len();
        self.trims.push(BrepTrim {
            curve,
            edge: None,
            reversed: false,
            loop_index,
            trim_type: TrimType::Singular,
        });
        self.loops[loop_index].trims.push(index);
        index
    }

    // ── queries ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn face_surface(&self, face: usize) -> &Surface {
        &self.surfaces[self.faces[face].surface]
    }

    #[must_use]
    pub fn edge_curve(&self, edge: usize) -> &Curve {
        &self.curves3d[self.edges[edge].curve]
    }

    #[must_use]
    pub fn trim_curve(&self, trim: usize) -> &TrimCurve {
        &self.curves2d[self.trims[trim].curve]
    }

    #[must_use]
    pub fn outer_loop(&self, face: usize) -> Option<usize> {
        self.faces[face]
            .loops
            .iter()
            .copied()
            .find(|&l| self.loops[l].kind == LoopType::Outer)
    }

    /// Closed UV polygon of a loop.
    #[must_use]
    pub fn loop_polygon(&self, loop_index: usize) -> Vec<Point2> {
        let mut points: Vec<Point2> = Vec::new();
        for &t in &self.loops[loop_index].trims {
            for &p in self.trim_curve(t).points() {
                if points.last().is_some_and(|q| *q == p) {
                    continue;
                }
                points.push(p);
            }
        }
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        points
    }

    /// Edge curve parameter matching trim parameter `t`.
    #[must_use]
    pub fn edge_parameter(&self, trim: usize, t: f64) -> f64 {
        if self.trims[trim].reversed { -t } else { t }
    }

    /// Endpoints of an edge over its domain, in edge direction.
    #[must_use]
    pub fn edge_end_points(&self, edge: usize) -> (Point3, Point3) {
        let e = &self.edges[edge];
        let curve = &self.curves3d[e.curve];
        let (a, b) = (curve.point_at(e.domain.t0), curve.point_at(e.domain.t1));
        if e.proxy_reversed { (b, a) } else { (a, b) }
    }

    #[must_use]
    pub fn bbox(&self) -> BBox {
        let mut bbox = self
            .curves3d
            .iter()
            .fold(BBox::EMPTY, |acc, c| acc.union(c.bbox()));
        for face in &self.faces {
            if face.loops.is_empty() {
                bbox = bbox.union(self.surfaces[face.surface].bbox());
            }
        }
        bbox
    }

    // ── topology bookkeeping ────────────────────────────────────────────────

    /// Snaps the UV end of every trim onto the start of the next one in its
    /// loop when they are within `tolerance`.
    pub fn match_ends(&mut self, tolerance: f64) {
        for l in 0..self.loops.len() {
            let trims = self.loops[l].trims.clone();
            let n = trims.len();
            if n < 2 {
                continue;
            }
            for i in 0..n {
                let (a, b) = (trims[i], trims[(i + 1) % n]);
                let end = self.trim_curve(a).end();
                let start = self.trim_curve(b).start();
                if end.distance_to(start) > tolerance {
                    continue;
                }
                let mid = end.midpoint(start);
                let (ca, cb) = (self.trims[a].curve, self.trims[b].curve);
                self.curves2d[ca].set_end(mid);
                self.curves2d[cb].set_start(mid);
            }
        }
    }

    /// Rebuilds vertices from edge end points, merging ends closer than
    /// `tolerance`.
    pub fn set_vertices(&mut self, tolerance: f64) {
        self.vertices.clear();
        for e in 0..self.edges.len() {
            let (start, end) = self.edge_end_points(e);
            let vs = self.find_or_add_vertex(start, e, tolerance);
            let ve = self.find_or_add_vertex(end, e, tolerance);
            self.edges[e].vertices = [Some(vs), Some(ve)];
        }
    }

    fn find_or_add_vertex(&mut self, point: Point3, edge: usize, tolerance: f64) -> usize {
        if let Some(index) = self
            .vertices
            .iter()
            .position(|v| v.point.distance_to(point) <= tolerance)
        {
            let vertex = &mut self.vertices[index];
            if !vertex.edges.contains(&edge) {
                vertex.edges.push(edge);
            }
            vertex.tolerance = vertex.tolerance.max(vertex.point.distance_to(point));
            return index;
        }
        self.vertices.push(BrepVertex {
            point,
            edges: vec![edge],
            tolerance: 0.0,
        });
        self.vertices.len() - 1
    }

    /// Measures how far each edge strays from its trims mapped through their
    /// surfaces and records it as the edge tolerance. Vertex tolerances cover
    /// their edges.
    pub fn set_tolerances_and_flags(&mut self) {
        const SAMPLES: usize = 8;

        for e in 0..self.edges.len() {
            let mut deviation: f64 = 0.0;
            for &t in &self.edges[e].trims {
                let trim = &self.trims[t];
                let face = self.loops[trim.loop_index].face;
                let surface = self.face_surface(face);
                let curve2d = &self.curves2d[trim.curve];
                let curve3d = &self.curves3d[self.edges[e].curve];
                let domain = curve2d.domain();
                for k in 0..=SAMPLES {
                    let s = domain.parameter_at(k as f64 / SAMPLES as f64);
                    let uv = curve2d.point_at(s);
                    let on_surface = surface.point_at(uv.x, uv.y);
                    let on_edge = curve3d.point_at(if trim.reversed { -s } else { s });
                    deviation = deviation.max(on_surface.distance_to(on_edge));
                }
            }
            self.edges[e].tolerance = deviation;
        }

        for v in 0..self.vertices.len() {
            let edge_tol = self.vertices[v]
                .edges
                .iter()
                .map(|&e| self.edges[e].tolerance)
                .fold(0.0, f64::max);
            let vertex = &mut self.vertices[v];
            vertex.tolerance = vertex.tolerance.max(edge_tol);
        }

        for t in 0..self.trims.len() {
            let trim = &self.trims[t];
            if let Some(e) = trim.edge {
                let kind = if self.edges[e].trims.len() > 1 {
                    let faces: Vec<usize> = self.edges[e]
                        .trims
                        .iter()
                        .map(|&o| self.loops[self.trims[o].loop_index].face)
                        .collect();
                    if faces.iter().all(|&f| f == faces[0]) {
                        TrimType::Seam
                    } else {
                        TrimType::Mated
                    }
                } else {
                    TrimType::Boundary
                };
                self.trims[t].trim_type = kind;
            }
        }
    }

    /// Problems found by a structural and geometric check; empty when valid.
    #[must_use]
    pub fn validate(&self, tolerance: f64) -> Vec<String> {
        let mut problems = Vec::new();

        for (f, face) in self.faces.iter().enumerate() {
            if face.surface >= self.surfaces.len() {
                problems.push(format!("face {f} refers to a missing surface"));
                continue;
            }
            let outer = face
                .loops
                .iter()
                .filter(|&&l| self.loops[l].kind == LoopType::Outer)
                .count();
            if outer != 1 {
                problems.push(format!("face {f} has {outer} outer loops"));
            }
            if face.loops.first().is_some_and(|&l| self.loops[l].kind != LoopType::Outer) {
                problems.push(format!("face {f} does not start with its outer loop"));
            }
        }

        for (l, lp) in self.loops.iter().enumerate() {
            let n = lp.trims.len();
            if n == 0 {
                problems.push(format!("loop {l} is empty"));
                continue;
            }
            let domain = self.loop_uv_extent(l);
            let uv_tol = 1e-7 * domain.u.length().abs().max(domain.v.length().abs()).max(1.0);

            let surface = self.face_surface(lp.face);
            let (su, sv) = (surface.domain(Direction::U), surface.domain(Direction::V));
            let slack = |i: Interval| 1e-4 * i.length().abs().max(1.0);
            let outside = lp.trims.iter().find(|&&t| {
                self.trim_curve(t)
                    .points()
                    .iter()
                    .any(|p| !su.includes(p.x, slack(su)) || !sv.includes(p.y, slack(sv)))
            });
            if let Some(t) = outside {
                problems.push(format!("trim {t} leaves the domain of its surface"));
            }
            for i in 0..n {
                let (a, b) = (lp.trims[i], lp.trims[(i + 1) % n]);
                let gap = self.trim_curve(a).end().distance_to(self.trim_curve(b).start());
                if gap > uv_tol {
                    problems.push(format!("loop {l} has a gap of {gap:e} after trim {a}"));
                }
            }
        }

        for (e, edge) in self.edges.iter().enumerate() {
            if edge.trims.len() > 2 {
                problems.push(format!("edge {e} is used by {} trims", edge.trims.len()));
            }
            let (start, end) = self.edge_end_points(e);
            let allowed = tolerance.max(edge.tolerance * 1.01);
            for &t in &edge.trims {
                let trim = &self.trims[t];
                let face = self.loops[trim.loop_index].face;
                let surface = self.face_surface(face);
                let uv0 = self.trim_curve(t).start();
                let uv1 = self.trim_curve(t).end();
                let (p0, p1) = (surface.point_at(uv0.x, uv0.y), surface.point_at(uv1.x, uv1.y));
                let (e0, e1) = if trim.reversed { (end, start) } else { (start, end) };
                if p0.distance_to(e0) > allowed || p1.distance_to(e1) > allowed {
                    problems.push(format!("trim {t} does not meet the ends of edge {e}"));
                }
            }
        }

        problems
    }

    #[must_use]
    pub fn is_valid(&self, tolerance: f64) -> bool {
        self.validate(tolerance).is_empty()
    }

    /// One pass of tolerance based healing: closes UV gaps, merges vertices
    /// and widens edge tolerances to the measured deviation.
    pub fn repair(&mut self, tolerance: f64) {
        for l in 0..self.loops.len() {
            let extent = self.loop_uv_extent(l);
            let uv_tol = 1e-3 * extent.u.length().abs().max(extent.v.length().abs());
            let trims = self.loops[l].trims.clone();
            let n = trims.len();
            for i in 0..n {
                let (a, b) = (trims[i], trims[(i + 1) % n]);
                let end = self.trim_curve(a).end();
                let start = self.trim_curve(b).start();
                if end.distance_to(start) <= uv_tol {
                    let mid = end.midpoint(start);
                    let (ca, cb) = (self.trims[a].curve, self.trims[b].curve);
                    self.curves2d[ca].set_end(mid);
                    self.curves2d[cb].set_start(mid);
                }
            }
        }
        self.set_vertices(tolerance * 10.0);
        self.set_tolerances_and_flags();
    }

    fn loop_uv_extent(&self, loop_index: usize) -> UvDomain {
        UvDomain::from_points(&self.loop_polygon(loop_index))
    }

    // ── solid classification ────────────────────────────────────────────────

    /// Whether every edge is shared by exactly two trims.
    #[must_use]
    pub fn is_solid(&self) -> bool {
        !self.edges.is_empty() && self.edges.iter().all(|e| e.trims.len() == 2)
    }

    #[must_use]
    pub fn solid_orientation(&self) -> SolidOrientation {
        if !self.is_solid() {
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

    /// Divergence theorem estimate, `1/3 ∮ p·n dA`, integrated with a midpoint
    /// grid over the trimmed region of every face.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        const GRID: usize = 32;

        let center = self.bbox().center();
        let center = if center.is_valid() { center } else { Point3::ORIGIN };
        let mut volume = 0.0;

        for (f, face) in self.faces.iter().enumerate() {
            let surface = &self.surfaces[face.surface];
            let Some(outer) = self.outer_loop(f) else {
                continue;
            };
            let outer_polygon = self.loop_polygon(outer);
            let holes: Vec<Vec<Point2>> = face
                .loops
                .iter()
                .filter(|&&l| l != outer)
                .map(|&l| self.loop_polygon(l))
                .collect();

            let extent = UvDomain::from_points(&outer_polygon);
            let du = extent.u.length() / GRID as f64;
            let dv = extent.v.length() / GRID as f64;
            if !(du > 0.0 && dv > 0.0) {
                continue;
            }

            let sign = if face.orientation_reversed { -1.0 } else { 1.0 };
            for a in 0..GRID {
                let u = extent.u.t0 + (a as f64 + 0.5) * du;
                for b in 0..GRID {
                    let v = extent.v.t0 + (b as f64 + 0.5) * dv;
                    let uv = Point2::new(u, v);
                    if !contains_point_polygon(uv, &outer_polygon, 0.0)
                        || holes.iter().any(|h| contains_point_polygon(uv, h, 0.0))
                    {
                        continue;
                    }
                    let (su, sv) = surface.partial_derivatives_at(u, v);
                    let n: Vec3 = su.cross(sv);
                    let p = surface.point_at(u, v) - center;
                    volume += sign * p.dot(n) * du * dv / 3.0;
                }
            }
        }

        volume
    }

    // ── editing ─────────────────────────────────────────────────────────────

    /// Uniform scale about the origin. Plane parameters are lengths, so trims
    /// on planar faces scale with the geometry.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let mut brep = self.clone();
        brep.surfaces = self.surfaces.iter().map(|s| s.scaled(factor)).collect();
        brep.curves3d = self.curves3d.iter().map(|c| c.scaled(factor)).collect();
        for v in &mut brep.vertices {
            v.point = v.point.scaled(factor);
            v.tolerance *= factor.abs();
        }
        for e in &mut brep.edges {
            e.tolerance *= factor.abs();
        }

        let mut scaled_curves = vec![false; brep.curves2d.len()];
        for face in &self.faces {
            if !matches!(self.surfaces[face.surface], Surface::Plane(_)) {
                continue;
            }
            for &l in &face.loops {
                for &t in &self.loops[l].trims {
                    let c = self.trims[t].curve;
                    if scaled_curves[c] {
                        continue;
                    }
                    scaled_curves[c] = true;
                    let curve = &self.curves2d[c];
                    let points = curve
                        .points()
                        .iter()
                        .map(|p| Point2::new(p.x * factor, p.y * factor))
                        .collect();
                    if let Ok(scaled) = TrimCurve::new(points, curve.parameters().to_vec()) {
                        brep.curves2d[c] = scaled;
                    }
                }
            }
        }
        brep
    }
}
