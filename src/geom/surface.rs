use serde::{Deserialize, Serialize};

use super::core::{BBox, Interval, Plane, Point3, Tolerance, Transform, Vec3};
use super::curve::{Curve, Curve3};
use super::error::GeomError;
use super::nurbs::{HPoint, NurbsCurve, de_boor, find_span, full_knot_vector, is_non_decreasing};

/// Parametric direction of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    U,
    V,
}

pub trait Surface3 {
    fn point_at(&self, u: f64, v: f64) -> Point3;

    fn domain_u(&self) -> Interval;

    fn domain_v(&self) -> Interval;

    #[must_use]
    fn domain(&self, direction: Direction) -> Interval {
        match direction {
            Direction::U => self.domain_u(),
            Direction::V => self.domain_v(),
        }
    }

    /// Central differences, one-sided on the domain border.
    #[must_use]
    fn partial_derivatives_at(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        let du_dom = self.domain_u();
        let dv_dom = self.domain_v();

        let mut du = Vec3::ZERO;
        let mut dv = Vec3::ZERO;

        let u_span = du_dom.length();
        if u_span.is_finite() && u_span != 0.0 {
            let h = Tolerance::DERIVATIVE.relative_to(u_span);
            let ua = (u - h).max(du_dom.min());
            let ub = (u + h).min(du_dom.max());
            if ua != ub {
                du = (self.point_at(ub, v) - self.point_at(ua, v)) / (ub - ua);
            }
        }

        let v_span = dv_dom.length();
        if v_span.is_finite() && v_span != 0.0 {
            let h = Tolerance::DERIVATIVE.relative_to(v_span);
            let va = (v - h).max(dv_dom.min());
            let vb = (v + h).min(dv_dom.max());
            if va != vb {
                dv = (self.point_at(u, vb) - self.point_at(u, va)) / (vb - va);
            }
        }

        (du, dv)
    }

    /// Unit normal `du × dv`. At a collapsed side the evaluation point is
    /// nudged towards the middle of the domain.
    #[must_use]
    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        let (du, dv) = self.partial_derivatives_at(u, v);
        if let Some(n) = du.cross(dv).normalized() {
            return Some(n);
        }
        let (iu, iv) = (self.domain_u(), self.domain_v());
        let nudge = 1e-4;
        let u = u + (iu.mid() - u) * nudge;
        let v = v + (iv.mid() - v) * nudge;
        let (du, dv) = self.partial_derivatives_at(u, v);
        du.cross(dv).normalized()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plane
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneSurface {
    pub plane: Plane,
    pub u: Interval,
    pub v: Interval,
}

impl Surface3 for PlaneSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.plane.point_at(u, v)
    }

    fn domain_u(&self) -> Interval {
        self.u
    }

    fn domain_v(&self) -> Interval {
        self.v
    }

    fn partial_derivatives_at(&self, _u: f64, _v: f64) -> (Vec3, Vec3) {
        (self.plane.x_axis, self.plane.y_axis)
    }

    fn normal_at(&self, _u: f64, _v: f64) -> Option<Vec3> {
        Some(self.plane.z_axis)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Surface of revolution
// ─────────────────────────────────────────────────────────────────────────────

/// `profile` swept about the axis through `axis_origin` along the unit
/// `axis_direction`. Natural parameters are `(angle, profile)`; `transposed`
/// swaps them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevSurface {
    pub profile: Curve,
    pub axis_origin: Point3,
    pub axis_direction: Vec3,
    pub angle: Interval,
    pub transposed: bool,
}

impl RevSurface {
    fn natural(&self, u: f64, v: f64) -> (f64, f64) {
        if self.transposed { (v, u) } else { (u, v) }
    }

    fn rotate(&self, p: Point3, angle: f64) -> Point3 {
        let k = self.axis_direction;
        let r = p - self.axis_origin;
        let (s, c) = angle.sin_cos();
        let rotated = r * c + k.cross(r) * s + k * (k.dot(r) * (1.0 - c));
        self.axis_origin + rotated
    }
}

impl Surface3 for RevSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let (angle, t) = self.natural(u, v);
        self.rotate(self.profile.point_at(t), angle)
    }

    fn domain_u(&self) -> Interval {
        if self.transposed { self.profile.domain() } else { self.angle }
    }

    fn domain_v(&self) -> Interval {
        if self.transposed { self.angle } else { self.profile.domain() }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sum surface
// ─────────────────────────────────────────────────────────────────────────────

/// Translational surface `curve_u(u) + curve_v(v) - base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SumSurface {
    pub curve_u: Curve,
    pub curve_v: Curve,
    pub base: Point3,
}

impl Surface3 for SumSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.curve_u.point_at(u) + (self.curve_v.point_at(v) - self.base)
    }

    fn domain_u(&self) -> Interval {
        self.curve_u.domain()
    }

    fn domain_v(&self) -> Interval {
        self.curve_v.domain()
    }

    fn partial_derivatives_at(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        (self.curve_u.derivative_at(u), self.curve_v.derivative_at(v))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NURBS surface
// ─────────────────────────────────────────────────────────────────────────────

/// Tensor product NURBS surface. Control points are stored u-major
/// (`points[i * count_v + j]`), knots follow the curve convention
/// (`count + degree - 1` per direction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NurbsSurface {
    degree_u: usize,
    degree_v: usize,
    count_u: usize,
    count_v: usize,
    points: Vec<HPoint>,
    knots_u: Vec<f64>,
    knots_v: Vec<f64>,
}

impl NurbsSurface {
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        count_u: usize,
        count_v: usize,
        points: Vec<HPoint>,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
    ) -> Result<Self, GeomError> {
        for (degree, count, knots) in [
            (degree_u, count_u, &knots_u),
            (degree_v, count_v, &knots_v),
        ] {
            if degree == 0 {
                return Err(GeomError::InvalidDegree { degree });
            }
            if count <= degree {
                return Err(GeomError::TooFewControlPoints { degree, count });
            }
            let expected = count + degree - 1;
            if knots.len() != expected {
                return Err(GeomError::KnotCount {
                    expected,
                    found: knots.len(),
                });
            }
            if knots.iter().any(|k| !k.is_finite()) || !is_non_decreasing(knots) {
                return Err(GeomError::DecreasingKnots);
            }
            if knots[degree - 1] >= knots[count - 1] {
                return Err(GeomError::EmptyDomain);
            }
        }
        if points.len() != count_u * count_v {
            return Err(GeomError::GridSize {
                count_u,
                count_v,
                found: points.len(),
            });
        }
        if points.iter().any(|p| !p.w.is_finite() || p.w <= 0.0) {
            return Err(GeomError::InvalidWeight);
        }
        if points
            .iter()
            .any(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(GeomError::NonFinitePoint);
        }

        Ok(Self {
            degree_u,
            degree_v,
            count_u,
            count_v,
            points,
            knots_u,
            knots_v,
        })
    }

    /// Degree 1 patch over `u × v` through four corners ordered
    /// `(u0,v0), (u0,v1), (u1,v0), (u1,v1)`.
    #[must_use]
    pub fn bilinear(corners: [Point3; 4], u: Interval, v: Interval) -> Self {
        Self {
            degree_u: 1,
            degree_v: 1,
            count_u: 2,
            count_v: 2,
            points: corners.iter().map(|p| HPoint::from_point(*p, 1.0)).collect(),
            knots_u: vec![u.t0, u.t1],
            knots_v: vec![v.t0, v.t1],
        }
    }

    /// Straight ruling between two rails. `u` runs along the rails over
    /// `[0, 1]`, `v` goes from `a` to `b` with degree 1 on `[0, 1]`.
    #[must_use]
    pub fn ruled(a: &NurbsCurve, b: &NurbsCurve) -> Option<Self> {
        let rails = NurbsCurve::make_compatible(&[a.clone(), b.clone()])?;
        let (a, b) = (&rails[0], &rails[1]);
        let count_u = a.point_count();
        if b.point_count() != count_u {
            return None;
        }
        let mut points = Vec::with_capacity(count_u * 2);
        for i in 0..count_u {
            points.push(a.points()[i]);
            points.push(b.points()[i]);
        }
        Some(Self {
            degree_u: a.degree(),
            degree_v: 1,
            count_u,
            count_v: 2,
            points,
            knots_u: a.knots().to_vec(),
            knots_v: vec![0.0, 1.0],
        })
    }

    #[must_use]
    pub const fn degree(&self, direction: Direction) -> usize {
        match direction {
            Direction::U => self.degree_u,
            Direction::V => self.degree_v,
        }
    }

    #[must_use]
    pub const fn count(&self, direction: Direction) -> usize {
        match direction {
            Direction::U => self.count_u,
            Direction::V => self.count_v,
        }
    }

    #[must_use]
    pub fn knots(&self, direction: Direction) -> &[f64] {
        match direction {
            Direction::U => &self.knots_u,
            Direction::V => &self.knots_v,
        }
    }

    #[must_use]
    pub fn points(&self) -> &[HPoint] {
        &self.points
    }

    #[must_use]
    pub fn control_point(&self, i: usize, j: usize) -> HPoint {
        self.points[i * self.count_v + j]
    }

    #[must_use]
    pub fn is_rational(&self) -> bool {
        self.points.iter().any(|p| (p.w - 1.0).abs() > f64::EPSILON)
    }

    /// Swaps the roles of `u` and `v`.
    #[must_use]
    pub fn transposed(&self) -> Self {
        let mut points = Vec::with_capacity(self.points.len());
        for j in 0..self.count_v {
            for i in 0..self.count_u {
                points.push(self.control_point(i, j));
            }
        }
        Self {
            degree_u: self.degree_v,
            degree_v: self.degree_u,
            count_u: self.count_v,
            count_v: self.count_u,
            points,
            knots_u: self.knots_v.clone(),
            knots_v: self.knots_u.clone(),
        }
    }

    /// Applies the same curve operation to every row of control points running
    /// in `direction`. All rows share a knot vector, so the results do too.
    fn map_rows(
        &self,
        direction: Direction,
        f: impl Fn(&NurbsCurve) -> Option<NurbsCurve>,
    ) -> Option<Self> {
        let surface = match direction {
            Direction::U => self.clone(),
            Direction::V => self.transposed(),
        };

        let mut rows = Vec::with_capacity(surface.count_v);
        for j in 0..surface.count_v {
            let row: Vec<HPoint> = (0..surface.count_u)
                .map(|i| surface.control_point(i, j))
                .collect();
            let curve = NurbsCurve::from_parts(surface.degree_u, row, surface.knots_u.clone());
            rows.push(f(&curve)?);
        }

        let first = rows.first()?;
        let degree_u = first.degree();
        let count_u = first.point_count();
        let knots_u = first.knots().to_vec();
        if rows
            .iter()
            .any(|r| r.point_count() != count_u || r.knots().len() != knots_u.len())
        {
            return None;
        }

        let mut points = Vec::with_capacity(count_u * surface.count_v);
        for i in 0..count_u {
            for row in &rows {
                points.push(row.points()[i]);
            }
        }
        let mapped = Self {
            degree_u,
            degree_v: surface.degree_v,
            count_u,
            count_v: surface.count_v,
            points,
            knots_u,
            knots_v: surface.knots_v,
        };

        Some(match direction {
            Direction::U => mapped,
            Direction::V => mapped.transposed(),
        })
    }

    /// Sub-patch over `interval` in `direction`.
    #[must_use]
    pub fn trimmed(&self, direction: Direction, interval: Interval) -> Option<Self> {
        self.map_rows(direction, |c| c.trimmed(interval))
    }

    /// Polynomial extension so the `direction` domain covers `interval`.
    #[must_use]
    pub fn extended(&self, direction: Direction, interval: Interval) -> Option<Self> {
        self.map_rows(direction, |c| c.extended(interval))
    }

    #[must_use]
    pub fn with_domain(&self, direction: Direction, interval: Interval) -> Option<Self> {
        self.map_rows(direction, |c| c.with_domain(interval))
    }

    #[must_use]
    pub fn transformed(&self, xform: &Transform) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| HPoint::from_point(xform.apply_point(p.euclidean()), p.w))
                .collect(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn bbox(&self) -> BBox {
        let points: Vec<Point3> = self.points.iter().map(|p| p.euclidean()).collect();
        BBox::from_points(&points)
    }
}

impl Surface3 for NurbsSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let (pu, pv) = (self.degree_u, self.degree_v);
        let fu = full_knot_vector(&self.knots_u);
        let fv = full_knot_vector(&self.knots_v);
        let su = find_span(self.count_u - 1, pu, u, &fu);
        let sv = find_span(self.count_v - 1, pv, v, &fv);

        let mut column = Vec::with_capacity(pu + 1);
        for a in 0..=pu {
            let i = su - pu + a;
            let mut d: Vec<HPoint> = (0..=pv)
                .map(|b| self.control_point(i, sv - pv + b))
                .collect();
            de_boor(&mut d, sv, pv, pv, v, &fv);
            column.push(d[pv]);
        }
        de_boor(&mut column, su, pu, pu, u, &fu);
        column[pu].euclidean()
    }

    fn domain_u(&self) -> Interval {
        Interval::new(self.knots_u[self.degree_u - 1], self.knots_u[self.count_u - 1])
    }

    fn domain_v(&self) -> Interval {
        Interval::new(self.knots_v[self.degree_v - 1], self.knots_v[self.count_v - 1])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Surface
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Surface {
    Plane(PlaneSurface),
    Revolution(RevSurface),
    Sum(SumSurface),
    Nurbs(NurbsSurface),
}

impl Surface {
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Plane(_) => "PlaneSurface",
            Self::Revolution(_) => "RevSurface",
            Self::Sum(_) => "SumSurface",
            Self::Nurbs(_) => "NurbsSurface",
        }
    }

    fn as_surface3(&self) -> &dyn Surface3 {
        match self {
            Self::Plane(s) => s,
            Self::Revolution(s) => s,
            Self::Sum(s) => s,
            Self::Nurbs(s) => s,
        }
    }

    /// Swaps `u` and `v`, which also flips the natural normal.
    #[must_use]
    pub fn transposed(&self) -> Self {
        match self {
            Self::Plane(p) => Self::Plane(PlaneSurface {
                plane: p.plane.transposed(),
                u: p.v,
                v: p.u,
            }),
            Self::Revolution(r) => Self::Revolution(RevSurface {
                transposed: !r.transposed,
                ..r.clone()
            }),
            Self::Sum(s) => Self::Sum(SumSurface {
                curve_u: s.curve_v.clone(),
                curve_v: s.curve_u.clone(),
                base: s.base,
            }),
            Self::Nurbs(n) => Self::Nurbs(n.transposed()),
        }
    }

    /// NURBS form with the same shape over the same domain. Arcs become
    /// rational quadratics whose parameter matches the angle only at span
    /// knots, so `point_at` agrees there and nowhere else in general.
    #[must_use]
    pub fn to_nurbs(&self) -> Option<NurbsSurface> {
        match self {
            Self::Plane(p) => Some(NurbsSurface::bilinear(
                [
                    p.plane.point_at(p.u.t0, p.v.t0),
                    p.plane.point_at(p.u.t0, p.v.t1),
                    p.plane.point_at(p.u.t1, p.v.t0),
                    p.plane.point_at(p.u.t1, p.v.t1),
                ],
                p.u,
                p.v,
            )),
            Self::Sum(s) => sum_to_nurbs(s),
            Self::Revolution(r) => revolution_to_nurbs(r),
            Self::Nurbs(n) => Some(n.clone()),
        }
    }

    /// Parameters of the surface point closest to `point`.
    #[must_use]
    pub fn closest_point(&self, point: Point3) -> (f64, f64) {
        const GRID: usize = 24;

        if let Self::Plane(p) = self {
            let (u, v, _) = p.plane.coordinates_of(point);
            return (u, v);
        }

        let (iu, iv) = (self.domain_u(), self.domain_v());
        let mut best = (f64::INFINITY, iu.t0, iv.t0);
        for a in 0..=GRID {
            let u = iu.parameter_at(a as f64 / GRID as f64);
            for b in 0..=GRID {
                let v = iv.parameter_at(b as f64 / GRID as f64);
                let d = self.point_at(u, v).distance_squared_to(point);
                if d < best.0 {
                    best = (d, u, v);
                }
            }
        }
        self.closest_point_from(point, (best.1, best.2))
    }

    /// Gauss-Newton refinement of the closest point starting at `seed`.
    #[must_use]
    pub fn closest_point_from(&self, point: Point3, seed: (f64, f64)) -> (f64, f64) {
        if let Self::Plane(p) = self {
            let (u, v, _) = p.plane.coordinates_of(point);
            return (u, v);
        }

        let (iu, iv) = (self.domain_u(), self.domain_v());
        let (mut u, mut v) = (iu.clamp(seed.0), iv.clamp(seed.1));
        let mut dist = self.point_at(u, v).distance_to(point);
        for _ in 0..32 {
            let (su, sv) = self.partial_derivatives_at(u, v);
            let r = self.point_at(u, v) - point;
            let (a, b, c) = (su.dot(su), su.dot(sv), sv.dot(sv));
            let det = a * c - b * b;
            let scale = a.max(c).max(f64::MIN_POSITIVE);
            if det.abs() <= 1e-14 * scale * scale {
                break;
            }
            let (gu, gv) = (-r.dot(su), -r.dot(sv));
            let du = (c * gu - b * gv) / det;
            let dv = (a * gv - b * gu) / det;

            let (nu, nv) = (iu.clamp(u + du), iv.clamp(v + dv));
            let next = self.point_at(nu, nv).distance_to(point);
            if next > dist {
                break;
            }
            let converged = (nu - u).abs() <= 1e-14 * (1.0 + u.abs())
                && (nv - v).abs() <= 1e-14 * (1.0 + v.abs());
            u = nu;
            v = nv;
            dist = next;
            if converged {
                break;
            }
        }
        (u, v)
    }

    /// Whether `(u, v)` lies on a side of the domain that collapses to a
    /// single 3D point.
    #[must_use]
    pub fn is_at_singularity(&self, u: f64, v: f64, tolerance: f64) -> bool {
        let (iu, iv) = (self.domain_u(), self.domain_v());
        let param_tol_u = 1e-6 * iu.length().abs().max(1.0);
        let param_tol_v = 1e-6 * iv.length().abs().max(1.0);

        let collapsed_u = |at: f64| {
            let first = self.point_at(at, iv.t0);
            (1..=8).all(|k| {
                self.point_at(at, iv.parameter_at(f64::from(k) / 8.0))
                    .distance_to(first)
                    <= tolerance
            })
        };
        let collapsed_v = |at: f64| {
            let first = self.point_at(iu.t0, at);
            (1..=8).all(|k| {
                self.point_at(iu.parameter_at(f64::from(k) / 8.0), at)
                    .distance_to(first)
                    <= tolerance
            })
        };

        ((u - iu.t0).abs() <= param_tol_u && collapsed_u(iu.t0))
            || ((u - iu.t1).abs() <= param_tol_u && collapsed_u(iu.t1))
            || ((v - iv.t0).abs() <= param_tol_v && collapsed_v(iv.t0))
            || ((v - iv.t1).abs() <= param_tol_v && collapsed_v(iv.t1))
    }

    #[must_use]
    pub fn transformed(&self, xform: &Transform) -> Self {
        match self {
            Self::Plane(p) => Self::Plane(PlaneSurface {
                plane: p.plane.transform(xform),
                u: scale_interval(p.u, xform),
                v: scale_interval(p.v, xform),
            }),
            Self::Revolution(r) => Self::Revolution(RevSurface {
                profile: r.profile.transformed(xform),
                axis_origin: xform.apply_point(r.axis_origin),
                axis_direction: xform
                    .apply_vec(r.axis_direction)
                    .normalized()
                    .unwrap_or(r.axis_direction),
                ..r.clone()
            }),
            Self::Sum(s) => Self::Sum(SumSurface {
                curve_u: s.curve_u.transformed(xform),
                curve_v: s.curve_v.transformed(xform),
                base: xform.apply_point(s.base),
            }),
            Self::Nurbs(n) => Self::Nurbs(n.transformed(xform)),
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        self.transformed(&Transform::uniform_scale(factor))
    }

    #[must_use]
    pub fn bbox(&self) -> BBox {
        const GRID: usize = 16;

        if let Self::Nurbs(n) = self {
            return n.bbox();
        }
        let (iu, iv) = (self.domain_u(), self.domain_v());
        let mut points = Vec::with_capacity((GRID + 1) * (GRID + 1));
        for a in 0..=GRID {
            for b in 0..=GRID {
                points.push(self.point_at(
                    iu.parameter_at(a as f64 / GRID as f64),
                    iv.parameter_at(b as f64 / GRID as f64),
                ));
            }
        }
        BBox::from_points(&points)
    }
}

impl Surface3 for Surface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.as_surface3().point_at(u, v)
    }

    fn domain_u(&self) -> Interval {
        self.as_surface3().domain_u()
    }

    fn domain_v(&self) -> Interval {
        self.as_surface3().domain_v()
    }

    fn partial_derivatives_at(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        self.as_surface3().partial_derivatives_at(u, v)
    }

    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        self.as_surface3().normal_at(u, v)
    }
}

/// Plane parameters are lengths, so a scale changes them too.
fn scale_interval(i: Interval, xform: &Transform) -> Interval {
    let s = xform.apply_vec(Vec3::X).length();
    Interval::new(i.t0 * s, i.t1 * s)
}

fn sum_to_nurbs(s: &SumSurface) -> Option<NurbsSurface> {
    let a = s.curve_u.to_nurbs()?;
    let b = s.curve_v.to_nurbs()?;
    let mut points = Vec::with_capacity(a.point_count() * b.point_count());
    for pa in a.points() {
        for pb in b.points() {
            let p = pa.euclidean() + (pb.euclidean() - s.base);
            points.push(HPoint::from_point(p, pa.w * pb.w));
        }
    }
    NurbsSurface::new(
        a.degree(),
        b.degree(),
        a.point_count(),
        b.point_count(),
        points,
        a.knots().to_vec(),
        b.knots().to_vec(),
    )
    .ok()
}

fn revolution_to_nurbs(r: &RevSurface) -> Option<NurbsSurface> {
    let profile = r.profile.to_nurbs()?;
    let unit = NurbsCurve::arc(&Plane::WORLD_XY, 1.0, r.angle)?;
    let k = r.axis_direction;

    let mut points = Vec::with_capacity(unit.point_count() * profile.point_count());
    for arc_point in unit.points() {
        let local = arc_point.euclidean();
        for q in profile.points() {
            let p = q.euclidean();
            let center = r.axis_origin + k * (p - r.axis_origin).dot(k);
            let radial = p - center;
            let x = radial
                .normalized()
                .or_else(|| k.perpendicular())
                .unwrap_or(Vec3::X);
            let y = k.cross(x);
            let radius = radial.length();
            let position = center + x * (radius * local.x) + y * (radius * local.y);
            points.push(HPoint::from_point(position, arc_point.w * q.w));
        }
    }

    let surface = NurbsSurface::new(
        unit.degree(),
        profile.degree(),
        unit.point_count(),
        profile.point_count(),
        points,
        unit.knots().to_vec(),
        profile.knots().to_vec(),
    )
    .ok()?;

    Some(if r.transposed { surface.transposed() } else { surface })
}
