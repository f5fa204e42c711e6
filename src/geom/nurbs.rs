//! Rational B-spline curves in the guest kernel convention.
//!
//! Control points are stored in homogeneous form (`x·w, y·w, z·w, w`) and the
//! knot vector omits the two superfluous end knots, so a curve with `n` control
//! points of degree `d` carries `n + d - 1` knots and its domain is
//! `[knots[d - 1], knots[n - 1]]`.
//!
//! Every editing operation returns a new curve; nothing mutates in place.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI, TAU};
use std::iter::repeat_n;

use serde::{Deserialize, Serialize};

use super::core::{BBox, Interval, Plane, Point3, Tolerance, Transform, Vec3};
use super::error::GeomError;

// ─────────────────────────────────────────────────────────────────────────────
// Homogeneous control points
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl HPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Homogeneous point for the euclidean point `p` with weight `w`.
    #[must_use]
    pub const fn from_point(p: Point3, w: f64) -> Self {
        Self::new(p.x * w, p.y * w, p.z * w, w)
    }

    #[must_use]
    pub fn lerp(self, rhs: Self, t: f64) -> Self {
        let s = 1.0 - t;
        Self::new(
            self.x * s + rhs.x * t,
            self.y * s + rhs.y * t,
            self.z * s + rhs.z * t,
            self.w * s + rhs.w * t,
        )
    }

    #[must_use]
    pub const fn scaled(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }

    #[must_use]
    pub fn to_point3(self) -> Option<Point3> {
        if self.w.is_finite() && self.w != 0.0 {
            Some(Point3::new(self.x / self.w, self.y / self.w, self.z / self.w))
        } else {
            None
        }
    }

    /// Euclidean location, [`Point3::UNSET`] for a zero weight.
    #[must_use]
    pub fn euclidean(self) -> Point3 {
        self.to_point3().unwrap_or(Point3::UNSET)
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NurbsCurve
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NurbsCurve {
    degree: usize,
    points: Vec<HPoint>,
    knots: Vec<f64>,
}

impl NurbsCurve {
    pub fn new(degree: usize, points: Vec<HPoint>, knots: Vec<f64>) -> Result<Self, GeomError> {
        if degree == 0 {
            return Err(GeomError::InvalidDegree { degree });
        }
        if points.len() <= degree {
            return Err(GeomError::TooFewControlPoints {
                degree,
                count: points.len(),
            });
        }

        let expected = points.len() + degree - 1;
        if knots.len() != expected {
            return Err(GeomError::KnotCount {
                expected,
                found: knots.len(),
            });
        }
        if knots.iter().any(|k| !k.is_finite()) || !is_non_decreasing(&knots) {
            return Err(GeomError::DecreasingKnots);
        }
        if points.iter().any(|p| !p.w.is_finite() || p.w <= 0.0) {
            return Err(GeomError::InvalidWeight);
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(GeomError::NonFinitePoint);
        }
        if knots[degree - 1] >= knots[points.len() - 1] {
            return Err(GeomError::EmptyDomain);
        }

        Ok(Self {
            degree,
            points,
            knots,
        })
    }

    /// Non-rational clamped curve with uniform interior knots on `[0, n - d]`.
    pub fn from_points(degree: usize, points: &[Point3]) -> Result<Self, GeomError> {
        let n = points.len();
        if degree == 0 {
            return Err(GeomError::InvalidDegree { degree });
        }
        if n <= degree {
            return Err(GeomError::TooFewControlPoints { degree, count: n });
        }

        let last = (n - degree) as f64;
        let mut knots = Vec::with_capacity(n + degree - 1);
        knots.extend(repeat_n(0.0, degree));
        knots.extend((1..n - degree).map(|i| i as f64));
        knots.extend(repeat_n(last, degree));

        let points = points.iter().map(|p| HPoint::from_point(*p, 1.0)).collect();
        Self::new(degree, points, knots)
    }

    /// Degree 1 curve from `from` to `to` over `domain`.
    #[must_use]
    pub fn line(from: Point3, to: Point3, domain: Interval) -> Self {
        Self {
            degree: 1,
            points: vec![HPoint::from_point(from, 1.0), HPoint::from_point(to, 1.0)],
            knots: vec![domain.t0, domain.t1],
        }
    }

    /// Degree 1 curve collapsed to a single point, used for rails that
    /// degenerate to an apex.
    #[must_use]
    pub fn degenerate(point: Point3, domain: Interval) -> Self {
        Self::line(point, point, domain)
    }

    /// Degree 1 curve through `points`, one knot per point.
    pub fn polyline(points: &[Point3], parameters: &[f64]) -> Result<Self, GeomError> {
        if parameters.len() != points.len() {
            return Err(GeomError::KnotCount {
                expected: points.len(),
                found: parameters.len(),
            });
        }
        let points = points.iter().map(|p| HPoint::from_point(*p, 1.0)).collect();
        Self::new(1, points, parameters.to_vec())
    }

    /// Exact rational quadratic circular arc on `plane`, split into spans of at
    /// most a quarter turn. The domain equals `angle`.
    #[must_use]
    pub fn arc(plane: &Plane, radius: f64, angle: Interval) -> Option<Self> {
        let sweep = angle.length();
        if !(sweep > 0.0) || !(radius > 0.0) || sweep > TAU + Tolerance::DEFAULT.eps {
            return None;
        }

        let spans = ((sweep / FRAC_PI_2) - 1e-9).ceil().max(1.0) as usize;
        let step = sweep / spans as f64;
        let mid_weight = (step * 0.5).cos();
        let on_circle = |a: f64| plane.point_at(radius * a.cos(), radius * a.sin());

        let mut points = Vec::with_capacity(2 * spans + 1);
        let mut knots = Vec::with_capacity(2 * spans + 2);
        points.push(HPoint::from_point(on_circle(angle.t0), 1.0));
        knots.extend([angle.t0, angle.t0]);

        for i in 0..spans {
            let a0 = angle.t0 + step * i as f64;
            let a1 = a0 + step;
            let mid = 0.5 * (a0 + a1);
            let r = radius / mid_weight;
            let apex = plane.point_at(r * mid.cos(), r * mid.sin());
            points.push(HPoint::from_point(apex, mid_weight));
            points.push(HPoint::from_point(on_circle(a1), 1.0));
            let k = if i + 1 == spans { angle.t1 } else { a1 };
            knots.extend([k, k]);
        }

        Some(Self {
            degree: 2,
            points,
            knots,
        })
    }

    /// Closed rational quadratic ellipse on `plane`, domain `[0, 2π]`, seam on
    /// the positive x axis.
    #[must_use]
    pub fn ellipse(plane: &Plane, radius_x: f64, radius_y: f64) -> Self {
        const UNIT: [(f64, f64); 9] = [
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (-1.0, 1.0),
            (-1.0, 0.0),
            (-1.0, -1.0),
            (0.0, -1.0),
            (1.0, -1.0),
            (1.0, 0.0),
        ];

        let points = UNIT
            .iter()
            .enumerate()
            .map(|(i, (x, y))| {
                let w = if i % 2 == 1 { FRAC_1_SQRT_2 } else { 1.0 };
                HPoint::from_point(plane.point_at(x * radius_x, y * radius_y), w)
            })
            .collect();

        let knots = vec![
            0.0,
            0.0,
            FRAC_PI_2,
            FRAC_PI_2,
            PI,
            PI,
            3.0 * FRAC_PI_2,
            3.0 * FRAC_PI_2,
            TAU,
            TAU,
        ];

        Self {
            degree: 2,
            points,
            knots,
        }
    }

    /// C1 piecewise cubic through `points` with the given first derivatives at
    /// the parameters `parameters`.
    pub fn from_hermite_segments(
        points: &[Point3],
        tangents: &[Vec3],
        parameters: &[f64],
    ) -> Result<Self, GeomError> {
        let count = points.len();
        if count < 2 {
            return Err(GeomError::TooFewControlPoints { degree: 3, count });
        }
        if tangents.len() != count || parameters.len() != count {
            return Err(GeomError::KnotCount {
                expected: count,
                found: tangents.len().min(parameters.len()),
            });
        }
        if parameters.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(GeomError::DecreasingKnots);
        }

        let mut control = Vec::with_capacity(3 * (count - 1) + 1);
        let mut knots = Vec::with_capacity(3 * count);
        control.push(HPoint::from_point(points[0], 1.0));
        for i in 0..count - 1 {
            let delta = (parameters[i + 1] - parameters[i]) / 3.0;
            control.push(HPoint::from_point(points[i] + tangents[i] * delta, 1.0));
            control.push(HPoint::from_point(points[i + 1] - tangents[i + 1] * delta, 1.0));
            control.push(HPoint::from_point(points[i + 1], 1.0));
        }
        for t in parameters {
            knots.extend(repeat_n(*t, 3));
        }

        Self::new(3, control, knots)
    }

    // ── accessors ───────────────────────────────────────────────────────────

    #[must_use]
    pub const fn degree(&self) -> usize {
        self.degree
    }

    #[must_use]
    pub fn points(&self) -> &[HPoint] {
        &self.points
    }

    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn control_point(&self, index: usize) -> Point3 {
        self.points[index].euclidean()
    }

    #[must_use]
    pub fn weight(&self, index: usize) -> f64 {
        self.points[index].w
    }

    #[must_use]
    pub fn is_rational(&self) -> bool {
        self.points.iter().any(|p| (p.w - 1.0).abs() > f64::EPSILON)
    }

    #[must_use]
    pub fn domain(&self) -> Interval {
        Interval::new(
            self.knots[self.degree - 1],
            self.knots[self.points.len() - 1],
        )
    }

    #[must_use]
    pub fn bbox(&self) -> BBox {
        let points: Vec<Point3> = self.points.iter().map(|p| p.euclidean()).collect();
        BBox::from_points(&points)
    }

    #[must_use]
    pub fn is_closed(&self, tolerance: f64) -> bool {
        let d = self.domain();
        self.point_at(d.t0).distance_to(self.point_at(d.t1)) <= tolerance
    }

    /// Distinct knot values with their multiplicities.
    #[must_use]
    pub fn knot_multiplicities(&self, tol: Tolerance) -> Vec<(f64, usize)> {
        let mut result: Vec<(f64, usize)> = Vec::new();
        for &k in &self.knots {
            match result.last_mut() {
                Some((value, count)) if tol.approx_eq_f64(*value, k) => *count += 1,
                _ => result.push((k, 1)),
            }
        }
        result
    }

    // ── evaluation ──────────────────────────────────────────────────────────

    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3 {
        self.evaluate(t).map_or(Point3::UNSET, |(p, _)| p)
    }

    /// Exact first derivative at `t`.
    #[must_use]
    pub fn derivative_at(&self, t: f64) -> Vec3 {
        self.evaluate(t).map_or(Vec3::ZERO, |(_, d)| d)
    }

    fn evaluate(&self, t: f64) -> Option<(Point3, Vec3)> {
        let p = self.degree;
        let full = self.full_knots();
        let n = self.points.len() - 1;
        let span = find_span(n, p, t, &full);

        let mut d: Vec<HPoint> = (0..=p).map(|j| self.points[span - p + j]).collect();
        de_boor(&mut d, span, p, p - 1, t, &full);

        let width = full[span + 1] - full[span];
        if width == 0.0 {
            return None;
        }

        let scale = p as f64 / width;
        let hd = HPoint::new(
            (d[p].x - d[p - 1].x) * scale,
            (d[p].y - d[p - 1].y) * scale,
            (d[p].z - d[p - 1].z) * scale,
            (d[p].w - d[p - 1].w) * scale,
        );
        let h = d[p - 1].lerp(d[p], (t - full[span]) / width);
        let point = h.to_point3()?;
        let derivative = Vec3::new(
            (hd.x - hd.w * point.x) / h.w,
            (hd.y - hd.w * point.y) / h.w,
            (hd.z - hd.w * point.z) / h.w,
        );
        Some((point, derivative))
    }

    /// Parameter of the curve point closest to `point`.
    #[must_use]
    pub fn closest_point(&self, point: Point3) -> f64 {
        let domain = self.domain();
        let samples_per_span = 2 * self.degree + 2;

        let mut best_t = domain.t0;
        let mut best_d = f64::INFINITY;
        let mut step = domain.length();
        for w in self.knot_multiplicities(Tolerance::KNOT).windows(2) {
            let (a, b) = (w[0].0, w[1].0);
            if b <= domain.t0 || a >= domain.t1 {
                continue;
            }
            let h = (b - a) / samples_per_span as f64;
            for i in 0..=samples_per_span {
                let t = a + h * i as f64;
                let d = self.point_at(t).distance_squared_to(point);
                if d < best_d {
                    best_d = d;
                    best_t = t;
                    step = h;
                }
            }
        }

        let lo = (best_t - step).max(domain.t0);
        let hi = (best_t + step).min(domain.t1);
        let mut t = golden_section(lo, hi, |t| self.point_at(t).distance_to(point));

        for _ in 0..4 {
            let (c, d) = match self.evaluate(t) {
                Some(e) => e,
                None => break,
            };
            let dd = d.length_squared();
            if dd == 0.0 {
                break;
            }
            let next = domain.clamp(t - (c - point).dot(d) / dd);
            if self.point_at(next).distance_to(point) > c.distance_to(point) {
                break;
            }
            t = next;
        }
        t
    }

    // ── editing ─────────────────────────────────────────────────────────────

    /// Inserts `t` up to `times` times, capped so its multiplicity stays at or
    /// below the degree.
    #[must_use]
    pub fn insert_knot(&self, t: f64, times: usize) -> Self {
        let u = self.snap_to_knot(t);
        let (points, full) = insert_knot_full(self.degree, &self.points, &self.full_knots(), u, times);
        Self::from_full(self.degree, points, &full)
    }

    /// Splits at `t` into the pieces before and after it.
    #[must_use]
    pub fn split_at(&self, t: f64) -> Option<(Self, Self)> {
        let domain = self.domain();
        let tol = self.knot_tolerance();
        if !(t > domain.t0 + tol && t < domain.t1 - tol) {
            return None;
        }
        self.split_unchecked(self.snap_to_knot(t))
    }

    fn split_unchecked(&self, u: f64) -> Option<(Self, Self)> {
        let p = self.degree;
        let (qw, uq) = insert_knot_full(p, &self.points, &self.full_knots(), u, p);
        let a = uq.iter().position(|&k| k == u)?;
        if a == 0 || a >= qw.len() || a + p > uq.len() {
            return None;
        }

        let mut left_full = uq[..a].to_vec();
        left_full.extend(repeat_n(u, p + 1));
        let mut right_full = vec![u; p + 1];
        right_full.extend_from_slice(&uq[a + p..]);

        if left_full.len() != a + p + 1 || right_full.len() != qw.len() - a + 1 + p + 1 {
            return None;
        }

        Some((
            Self::from_full(p, qw[..a].to_vec(), &left_full),
            Self::from_full(p, qw[a - 1..].to_vec(), &right_full),
        ))
    }

    /// The sub-curve over `interval`, which must lie inside the domain.
    #[must_use]
    pub fn trimmed(&self, interval: Interval) -> Option<Self> {
        let domain = self.domain();
        let tol = self.knot_tolerance();
        let (t0, t1) = (interval.t0, interval.t1);
        if !(t1 - t0 > tol) || t0 < domain.t0 - tol || t1 > domain.t1 + tol {
            return None;
        }

        let mut curve = self.clone();
        if t1 < domain.t1 - tol {
            curve = curve.split_at(t1)?.0;
        }
        if t0 > domain.t0 + tol {
            curve = curve.split_at(t0)?.1;
        }
        Some(curve)
    }

    /// Moves the seam of a closed curve to `t`. The result runs over
    /// `[t, t + L]` where `L` is the length of the current domain.
    #[must_use]
    pub fn change_closed_seam(&self, t: f64, tolerance: f64) -> Option<Self> {
        if !self.is_closed(tolerance) {
            return None;
        }
        let curve = self.clamped()?;
        let domain = curve.domain();
        let period = domain.length();
        let tol = curve.knot_tolerance();

        if (t - domain.t0).abs() <= tol {
            return Some(curve);
        }
        if (t - domain.t1).abs() <= tol {
            return Some(curve.shifted(period));
        }
        if t < domain.t0 || t > domain.t1 {
            return None;
        }

        let (left, right) = curve.split_at(t)?;
        right.joined(&left.shifted(period))
    }

    /// Same shape, knots remapped linearly onto `domain`.
    #[must_use]
    pub fn with_domain(&self, domain: Interval) -> Option<Self> {
        if !domain.is_increasing() {
            return None;
        }
        let current = self.domain();
        let scale = domain.length() / current.length();
        let knots = self
            .knots
            .iter()
            .map(|k| domain.t0 + (k - current.t0) * scale)
            .collect();
        Some(Self {
            degree: self.degree,
            points: self.points.clone(),
            knots,
        })
    }

    /// Same shape traversed backwards; the domain `[a, b]` becomes `[-b, -a]`.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            degree: self.degree,
            points: self.points.iter().rev().copied().collect(),
            knots: self.knots.iter().rev().map(|k| -k).collect(),
        }
    }

    /// Extends the end spans polynomially so the domain covers `domain`.
    #[must_use]
    pub fn extended(&self, domain: Interval) -> Option<Self> {
        let current = self.domain();
        let mut curve = self.clamped()?;
        if domain.t1 > current.t1 {
            curve = curve.extend_end(domain.t1)?;
        }
        if domain.t0 < current.t0 {
            curve = curve.reversed().extend_end(-domain.t0)?.reversed();
        }
        Some(curve)
    }

    fn extend_end(&self, t: f64) -> Option<Self> {
        let p = self.degree;
        let end = self.domain().t1;
        let span_start = self.knots.iter().rev().copied().find(|&k| k < end)?;
        let curve = self.insert_knot(span_start, p);

        let n = curve.points.len();
        let s = (t - span_start) / (end - span_start);
        let mut work: Vec<HPoint> = curve.points[n - p - 1..].to_vec();
        let mut bezier = Vec::with_capacity(p + 1);
        bezier.push(work[0]);
        for r in 1..=p {
            for i in 0..=p - r {
                work[i] = work[i].lerp(work[i + 1], s);
            }
            bezier.push(work[0]);
        }

        let mut points = curve.points;
        points.truncate(n - p - 1);
        points.extend(bezier);
        let mut knots = curve.knots;
        let k = knots.len();
        for knot in &mut knots[k - p..] {
            *knot = t;
        }
        Some(Self {
            degree: p,
            points,
            knots,
        })
    }

    /// Same shape represented at a higher degree. Interior breakpoints end up
    /// with full multiplicity.
    #[must_use]
    pub fn elevated(&self, degree: usize) -> Option<Self> {
        if degree <= self.degree {
            return Some(self.clone());
        }

        let mut curve = self.clamped()?;
        let p = curve.degree;
        let domain = curve.domain();
        let breakpoints: Vec<f64> = curve
            .knot_multiplicities(Tolerance::KNOT)
            .into_iter()
            .map(|(k, _)| k)
            .filter(|&k| k > domain.t0 && k < domain.t1)
            .collect();
        for &u in &breakpoints {
            curve = curve.insert_knot(u, p);
        }

        let count = curve.points.len();
        if (count - 1) % p != 0 {
            return None;
        }
        let segments = (count - 1) / p;

        let mut points = Vec::with_capacity(segments * degree + 1);
        for seg in 0..segments {
            let mut bezier = curve.points[seg * p..=seg * p + p].to_vec();
            while bezier.len() - 1 < degree {
                bezier = elevate_bezier(&bezier);
            }
            let skip = usize::from(seg > 0);
            points.extend_from_slice(&bezier[skip..]);
        }

        let mut knots = Vec::with_capacity(points.len() + degree - 1);
        knots.extend(repeat_n(domain.t0, degree));
        for &u in &breakpoints {
            knots.extend(repeat_n(u, degree));
        }
        knots.extend(repeat_n(domain.t1, degree));

        Some(Self {
            degree,
            points,
            knots,
        })
    }

    /// Brings `curves` to a common degree, the unit domain and a common knot
    /// vector, as needed to skin a surface through them.
    #[must_use]
    pub fn make_compatible(curves: &[Self]) -> Option<Vec<Self>> {
        let degree = curves.iter().map(|c| c.degree).max()?;
        let mut compatible = curves
            .iter()
            .map(|c| c.elevated(degree)?.with_domain(Interval::UNIT))
            .collect::<Option<Vec<_>>>()?;

        let tol = Tolerance::new(1e-10);
        let mut merged: Vec<(f64, usize)> = Vec::new();
        for curve in &compatible {
            for (value, count) in curve.knot_multiplicities(tol) {
                match merged.iter_mut().find(|(v, _)| tol.approx_eq_f64(*v, value)) {
                    Some(entry) => entry.1 = entry.1.max(count),
                    None => merged.push((value, count)),
                }
            }
        }

        for curve in &mut compatible {
            for &(value, count) in &merged {
                let have = curve
                    .knots
                    .iter()
                    .filter(|&&k| tol.approx_eq_f64(k, value))
                    .count();
                if have < count {
                    *curve = curve.insert_knot(value, count - have);
                }
            }
        }

        let knot_count = compatible.first()?.knots.len();
        if compatible.iter().any(|c| c.knots.len() != knot_count) {
            return None;
        }
        Some(compatible)
    }

    #[must_use]
    pub fn transformed(&self, xform: &Transform) -> Self {
        let points = self
            .points
            .iter()
            .map(|p| HPoint::from_point(xform.apply_point(p.euclidean()), p.w))
            .collect();
        Self {
            degree: self.degree,
            points,
            knots: self.knots.clone(),
        }
    }

    // ── internals ───────────────────────────────────────────────────────────

    fn knot_tolerance(&self) -> f64 {
        Tolerance::KNOT.relative_to(self.domain().length())
    }

    fn snap_to_knot(&self, t: f64) -> f64 {
        let tol = self.knot_tolerance();
        self.knots
            .iter()
            .copied()
            .find(|k| (k - t).abs() <= tol)
            .unwrap_or(t)
    }

    fn full_knots(&self) -> Vec<f64> {
        full_knot_vector(&self.knots)
    }

    /// Unchecked constructor for data already known to be consistent.
    pub(crate) fn from_parts(degree: usize, points: Vec<HPoint>, knots: Vec<f64>) -> Self {
        Self {
            degree,
            points,
            knots,
        }
    }

    fn from_full(degree: usize, points: Vec<HPoint>, full: &[f64]) -> Self {
        Self {
            degree,
            points,
            knots: full[1..full.len() - 1].to_vec(),
        }
    }

    fn shifted(&self, delta: f64) -> Self {
        Self {
            degree: self.degree,
            points: self.points.clone(),
            knots: self.knots.iter().map(|k| k + delta).collect(),
        }
    }

    fn is_clamped(&self) -> bool {
        let p = self.degree;
        let k = &self.knots;
        let n = k.len();
        k[..p].iter().all(|&x| x == k[0]) && k[n - p..].iter().all(|&x| x == k[n - 1])
    }

    /// Equivalent curve whose end knots have full multiplicity.
    fn clamped(&self) -> Option<Self> {
        if self.is_clamped() {
            return Some(self.clone());
        }
        let domain = self.domain();
        let mut curve = self.clone();
        if curve.knots[..curve.degree].iter().any(|&k| k != domain.t0) {
            curve = curve.split_unchecked(domain.t0)?.1;
        }
        let n = curve.knots.len();
        if curve.knots[n - curve.degree..].iter().any(|&k| k != domain.t1) {
            curve = curve.split_unchecked(domain.t1)?.0;
        }
        Some(curve)
    }

    /// Appends `other`, whose start must coincide with this curve's end, and
    /// whose domain must start where this one ends.
    fn joined(&self, other: &Self) -> Option<Self> {
        let p = self.degree;
        if other.degree != p {
            return None;
        }
        let last = *self.points.last()?;
        let first = *other.points.first()?;
        if first.w == 0.0 {
            return None;
        }
        let scale = last.w / first.w;

        let mut points = self.points.clone();
        points.extend(other.points[1..].iter().map(|h| h.scaled(scale)));
        let mut knots = self.knots.clone();
        knots.extend_from_slice(&other.knots[p..]);

        Some(Self {
            degree: p,
            points,
            knots,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Knot vector kernels (operate on the full "count + degree + 1" knot vector)
// ─────────────────────────────────────────────────────────────────────────────

/// Knot vector with the two superfluous end knots restored.
pub(crate) fn full_knot_vector(knots: &[f64]) -> Vec<f64> {
    let mut full = Vec::with_capacity(knots.len() + 2);
    full.push(knots[0]);
    full.extend_from_slice(knots);
    full.push(knots[knots.len() - 1]);
    full
}

pub(crate) fn is_non_decreasing(knots: &[f64]) -> bool {
    knots.windows(2).all(|w| w[0] <= w[1])
}

pub(crate) fn find_span(n: usize, p: usize, u: f64, knots: &[f64]) -> usize {
    if u >= knots[n + 1] {
        return n;
    }
    if u <= knots[p] {
        return p;
    }

    let mut low = p;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Runs `levels` rounds of de Boor's recursion in place on the `p + 1`
/// points of `span`.
pub(crate) fn de_boor(d: &mut [HPoint], span: usize, p: usize, levels: usize, u: f64, knots: &[f64]) {
    for r in 1..=levels {
        for j in (r..=p).rev() {
            let i = span - p + j;
            let denom = knots[i + p + 1 - r] - knots[i];
            let alpha = if denom == 0.0 { 0.0 } else { (u - knots[i]) / denom };
            d[j] = d[j - 1].lerp(d[j], alpha);
        }
    }
}

/// Boehm insertion of `u` up to `times` times.
pub(crate) fn insert_knot_full(
    p: usize,
    pw: &[HPoint],
    up: &[f64],
    u: f64,
    times: usize,
) -> (Vec<HPoint>, Vec<f64>) {
    let n = pw.len() - 1;
    let unchanged = || (pw.to_vec(), up.to_vec());

    let Some(k) = up.iter().rposition(|&x| x <= u) else {
        return unchanged();
    };
    let s = up.iter().filter(|&&x| x == u).count();
    if times == 0 || s >= p || k < p || k - s > n {
        return unchanged();
    }
    let r = times.min(p - s);
    let mp = n + p + 1;

    let mut uq = Vec::with_capacity(up.len() + r);
    uq.extend_from_slice(&up[..=k]);
    uq.extend(repeat_n(u, r));
    uq.extend_from_slice(&up[k + 1..=mp]);

    let mut qw = vec![HPoint::new(0.0, 0.0, 0.0, 0.0); n + 1 + r];
    qw[..=k - p].copy_from_slice(&pw[..=k - p]);
    for i in (k - s)..=n {
        qw[i + r] = pw[i];
    }

    let mut rw: Vec<HPoint> = (0..=p - s).map(|i| pw[k - p + i]).collect();
    let mut l = k - p;
    for j in 1..=r {
        l = k - p + j;
        for i in 0..=(p - j - s) {
            let denom = up[i + k + 1] - up[l + i];
            let alpha = if denom == 0.0 { 0.0 } else { (u - up[l + i]) / denom };
            rw[i] = rw[i].lerp(rw[i + 1], alpha);
        }
        qw[l] = rw[0];
        qw[k + r - j - s] = rw[p - j - s];
    }
    for i in (l + 1)..(k - s) {
        qw[i] = rw[i - l];
    }

    (qw, uq)
}

fn elevate_bezier(points: &[HPoint]) -> Vec<HPoint> {
    let p = points.len() - 1;
    let q = (p + 1) as f64;
    let mut out = Vec::with_capacity(p + 2);
    out.push(points[0]);
    for i in 1..=p {
        let a = i as f64 / q;
        out.push(points[i].lerp(points[i - 1], a));
    }
    out.push(points[p]);
    out
}

pub(crate) fn golden_section(mut lo: f64, mut hi: f64, f: impl Fn(f64) -> f64) -> f64 {
    const INV_PHI: f64 = 0.618_033_988_749_894_9;
    let mut c = hi - (hi - lo) * INV_PHI;
    let mut d = lo + (hi - lo) * INV_PHI;
    let mut fc = f(c);
    let mut fd = f(d);
    for _ in 0..200 {
        if (hi - lo).abs() <= 1e-15 * (1.0 + lo.abs().max(hi.abs())) {
            break;
        }
        if fc < fd {
            hi = d;
            d = c;
            fd = fc;
            c = hi - (hi - lo) * INV_PHI;
            fc = f(c);
        } else {
            lo = c;
            c = d;
            fc = fd;
            d = lo + (hi - lo) * INV_PHI;
            fd = f(d);
        }
    }
    0.5 * (lo + hi)
}
