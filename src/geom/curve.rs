use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::core::{BBox, Interval, Plane, Point3, Tolerance, Transform, Vec3};
use super::nurbs::NurbsCurve;

pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    fn domain(&self) -> Interval;

    #[must_use]
    fn derivative_at(&self, t: f64) -> Vec3 {
        let d = self.domain();
        let span = d.length();
        if !span.is_finite() || span == 0.0 {
            return Vec3::ZERO;
        }

        let h = Tolerance::DERIVATIVE.relative_to(span);
        let t0 = (t - h).max(d.t0);
        let t1 = (t + h).min(d.t1);
        if t1 == t0 {
            return Vec3::ZERO;
        }

        let p0 = self.point_at(t0);
        let p1 = self.point_at(t1);
        p1.sub_point(p0).mul_scalar(1.0 / (t1 - t0))
    }

    /// Returns the unit tangent vector at parameter `t`.
    /// Returns `None` if the derivative is zero or degenerate.
    #[must_use]
    fn tangent_at(&self, t: f64) -> Option<Vec3> {
        self.derivative_at(t).normalized()
    }

    #[must_use]
    fn start_point(&self) -> Point3 {
        self.point_at(self.domain().t0)
    }

    #[must_use]
    fn end_point(&self) -> Point3 {
        self.point_at(self.domain().t1)
    }

    #[must_use]
    fn is_closed(&self, tolerance: f64) -> bool {
        self.start_point().distance_to(self.end_point()) <= tolerance
    }

    /// Chord length of a `samples`-segment polyline approximation.
    #[must_use]
    fn sampled_length(&self, samples: usize) -> f64 {
        let d = self.domain();
        let samples = samples.max(1);
        let mut prev = self.point_at(d.t0);
        let mut total = 0.0;
        for i in 1..=samples {
            let p = self.point_at(d.parameter_at(i as f64 / samples as f64));
            total += prev.distance_to(p);
            prev = p;
        }
        total
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Line
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineCurve {
    pub from: Point3,
    pub to: Point3,
    pub domain: Interval,
}

impl LineCurve {
    #[must_use]
    pub const fn new(from: Point3, to: Point3, domain: Interval) -> Self {
        Self { from, to, domain }
    }
}

impl Curve3 for LineCurve {
    fn point_at(&self, t: f64) -> Point3 {
        self.from.lerp(self.to, self.domain.normalized_parameter_at(t))
    }

    fn domain(&self) -> Interval {
        self.domain
    }

    fn derivative_at(&self, _t: f64) -> Vec3 {
        self.to.sub_point(self.from).mul_scalar(1.0 / self.domain.length())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Arc
// ─────────────────────────────────────────────────────────────────────────────

/// Circular arc on `plane` centred at its origin, spanning `angle` radians
/// measured from the plane x axis. `domain` maps linearly onto `angle`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcCurve {
    pub plane: Plane,
    pub radius: f64,
    pub angle: Interval,
    pub domain: Interval,
}

impl ArcCurve {
    /// Full circle with domain `[0, 2π]`.
    #[must_use]
    pub const fn circle(plane: Plane, radius: f64) -> Self {
        Self {
            plane,
            radius,
            angle: Interval::new(0.0, TAU),
            domain: Interval::new(0.0, TAU),
        }
    }

    /// Arc starting at `start`, passing through `interior` and ending at `end`.
    /// The domain is the swept angle.
    #[must_use]
    pub fn from_three_points(start: Point3, interior: Point3, end: Point3) -> Option<Self> {
        let ab = interior - start;
        let ac = end - start;
        let n = ab.cross(ac);
        let nn = n.length_squared();
        if nn <= Tolerance::ZERO_LENGTH.eps * ab.length_squared().max(ac.length_squared()) {
            return None;
        }

        let offset = (ac.cross(n) * ab.length_squared() + n.cross(ab) * ac.length_squared()) / (2.0 * nn);
        let center = start + offset;
        let radius = offset.length();
        let x = offset.neg().normalized()?;
        let z = n.normalized()?;
        let plane = Plane::new(center, x, z.cross(x))?;

        let (ex, ey, _) = plane.coordinates_of(end);
        let mut sweep = ey.atan2(ex);
        if sweep <= Tolerance::DEFAULT.eps {
            sweep += TAU;
        }

        Some(Self {
            plane,
            radius,
            angle: Interval::new(0.0, sweep),
            domain: Interval::new(0.0, sweep),
        })
    }

    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.angle.length()
    }

    #[must_use]
    pub fn is_circle(&self) -> bool {
        (self.sweep() - TAU).abs() <= 1e-9
    }

    #[must_use]
    pub fn mid_point(&self) -> Point3 {
        self.point_at(self.domain.mid())
    }

    fn angle_at(&self, t: f64) -> f64 {
        self.angle.parameter_at(self.domain.normalized_parameter_at(t))
    }

    fn parameter_of_angle(&self, a: f64) -> f64 {
        self.domain.parameter_at(self.angle.normalized_parameter_at(a))
    }

    #[must_use]
    pub fn closest_point(&self, point: Point3) -> f64 {
        let (x, y, _) = self.plane.coordinates_of(point);
        if x == 0.0 && y == 0.0 {
            return self.domain.t0;
        }
        let mut a = y.atan2(x);
        while a < self.angle.t0 {
            a += TAU;
        }
        while a > self.angle.t0 + TAU {
            a -= TAU;
        }
        if a <= self.angle.t1 {
            return self.parameter_of_angle(a);
        }
        let to_start = point.distance_to(self.start_point());
        let to_end = point.distance_to(self.end_point());
        if to_start < to_end {
            self.domain.t0
        } else {
            self.domain.t1
        }
    }
}

impl Curve3 for ArcCurve {
    fn point_at(&self, t: f64) -> Point3 {
        let a = self.angle_at(t);
        self.plane
            .point_at(self.radius * a.cos(), self.radius * a.sin())
    }

    fn domain(&self) -> Interval {
        self.domain
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        let a = self.angle_at(t);
        let da_dt = self.angle.length() / self.domain.length();
        let dx = self.plane.x_axis.mul_scalar(-self.radius * a.sin());
        let dy = self.plane.y_axis.mul_scalar(self.radius * a.cos());
        dx.add(dy).mul_scalar(da_dt)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Polyline
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineCurve {
    pub points: Vec<Point3>,
    pub parameters: Vec<f64>,
}

impl PolylineCurve {
    /// Polyline parametrized by cumulative chord length.
    #[must_use]
    pub fn new(points: Vec<Point3>) -> Self {
        let mut parameters = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                total += points[i - 1].distance_to(*p);
            }
            parameters.push(total);
        }
        Self { points, parameters }
    }

    fn segment_at(&self, t: f64) -> (usize, f64) {
        let last = self.points.len().saturating_sub(2);
        let i = self
            .parameters
            .windows(2)
            .position(|w| t < w[1])
            .unwrap_or(last)
            .min(last);
        let (a, b) = (self.parameters[i], self.parameters[i + 1]);
        let s = if b > a { (t - a) / (b - a) } else { 0.0 };
        (i, s)
    }

    #[must_use]
    pub fn closest_point(&self, point: Point3) -> f64 {
        let mut best = (f64::INFINITY, self.domain().t0);
        for i in 0..self.points.len().saturating_sub(1) {
            let (a, b) = (self.points[i], self.points[i + 1]);
            let ab = b - a;
            let len2 = ab.length_squared();
            let s = if len2 > 0.0 {
                ((point - a).dot(ab) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let d = a.lerp(b, s).distance_squared_to(point);
            if d < best.0 {
                let (t0, t1) = (self.parameters[i], self.parameters[i + 1]);
                best = (d, t0 + (t1 - t0) * s);
            }
        }
        best.1
    }
}

impl Curve3 for PolylineCurve {
    fn point_at(&self, t: f64) -> Point3 {
        if self.points.len() < 2 {
            return self.points.first().copied().unwrap_or(Point3::UNSET);
        }
        let (i, s) = self.segment_at(t);
        self.points[i].lerp(self.points[i + 1], s)
    }

    fn domain(&self) -> Interval {
        match (self.parameters.first(), self.parameters.last()) {
            (Some(&a), Some(&b)) => Interval::new(a, b),
            _ => Interval::new(0.0, 0.0),
        }
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        if self.points.len() < 2 {
            return Vec3::ZERO;
        }
        let (i, _) = self.segment_at(t);
        let dt = self.parameters[i + 1] - self.parameters[i];
        if dt == 0.0 {
            return Vec3::ZERO;
        }
        (self.points[i + 1] - self.points[i]) / dt
    }
}

impl Curve3 for NurbsCurve {
    fn point_at(&self, t: f64) -> Point3 {
        NurbsCurve::point_at(self, t)
    }

    fn domain(&self) -> Interval {
        NurbsCurve::domain(self)
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        NurbsCurve::derivative_at(self, t)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Curve
// ─────────────────────────────────────────────────────────────────────────────

/// A curve of the guest kernel. Every variant carries its own parameter domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    Line(LineCurve),
    Arc(ArcCurve),
    Nurbs(NurbsCurve),
    Polyline(PolylineCurve),
}

impl Curve {
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Line(_) => "LineCurve",
            Self::Arc(_) => "ArcCurve",
            Self::Nurbs(_) => "NurbsCurve",
            Self::Polyline(_) => "PolylineCurve",
        }
    }

    fn as_curve3(&self) -> &dyn Curve3 {
        match self {
            Self::Line(c) => c,
            Self::Arc(c) => c,
            Self::Nurbs(c) => c,
            Self::Polyline(c) => c,
        }
    }

    /// Same point set traversed backwards; domain `[a, b]` becomes `[-b, -a]`.
    #[must_use]
    pub fn reversed(&self) -> Self {
        match self {
            Self::Line(l) => Self::Line(LineCurve::new(l.to, l.from, l.domain.reversed())),
            Self::Arc(a) => {
                let plane = Plane {
                    origin: a.plane.origin,
                    x_axis: a.plane.x_axis,
                    y_axis: a.plane.y_axis.neg(),
                    z_axis: a.plane.z_axis.neg(),
                };
                Self::Arc(ArcCurve {
                    plane,
                    radius: a.radius,
                    angle: Interval::new(-a.angle.t1, -a.angle.t0),
                    domain: a.domain.reversed(),
                })
            }
            Self::Nurbs(n) => Self::Nurbs(n.reversed()),
            Self::Polyline(p) => Self::Polyline(PolylineCurve {
                points: p.points.iter().rev().copied().collect(),
                parameters: p.parameters.iter().rev().map(|t| -t).collect(),
            }),
        }
    }

    /// Reparametrizes onto `domain` without changing the shape.
    #[must_use]
    pub fn with_domain(&self, domain: Interval) -> Option<Self> {
        if !domain.is_increasing() {
            return None;
        }
        let current = self.domain();
        Some(match self {
            Self::Line(l) => Self::Line(LineCurve::new(l.from, l.to, domain)),
            Self::Arc(a) => Self::Arc(ArcCurve { domain, ..*a }),
            Self::Nurbs(n) => Self::Nurbs(n.with_domain(domain)?),
            Self::Polyline(p) => Self::Polyline(PolylineCurve {
                points: p.points.clone(),
                parameters: p
                    .parameters
                    .iter()
                    .map(|t| domain.parameter_at(current.normalized_parameter_at(*t)))
                    .collect(),
            }),
        })
    }

    /// Restriction to `interval`, keeping the parameters of the kept part.
    #[must_use]
    pub fn trimmed(&self, interval: Interval) -> Option<Self> {
        let d = self.domain();
        let tol = Tolerance::KNOT.relative_to(d.length());
        if !(interval.t1 - interval.t0 > tol) || !d.includes(interval.t0, tol) || !d.includes(interval.t1, tol) {
            return None;
        }
        let interval = Interval::new(d.clamp(interval.t0), d.clamp(interval.t1));

        Some(match self {
            Self::Line(l) => Self::Line(LineCurve::new(l.point_at(interval.t0), l.point_at(interval.t1), interval)),
            Self::Arc(a) => Self::Arc(ArcCurve {
                angle: Interval::new(a.angle_at(interval.t0), a.angle_at(interval.t1)),
                domain: interval,
                ..*a
            }),
            Self::Nurbs(n) => Self::Nurbs(n.trimmed(interval)?),
            Self::Polyline(p) => {
                let mut points = vec![p.point_at(interval.t0)];
                let mut parameters = vec![interval.t0];
                for (q, t) in p.points.iter().zip(&p.parameters) {
                    if *t > interval.t0 + tol && *t < interval.t1 - tol {
                        points.push(*q);
                        parameters.push(*t);
                    }
                }
                points.push(p.point_at(interval.t1));
                parameters.push(interval.t1);
                Self::Polyline(PolylineCurve { points, parameters })
            }
        })
    }

    #[must_use]
    pub fn closest_point(&self, point: Point3) -> f64 {
        match self {
            Self::Line(l) => {
                let ab = l.to - l.from;
                let len2 = ab.length_squared();
                if len2 == 0.0 {
                    return l.domain.t0;
                }
                let s = ((point - l.from).dot(ab) / len2).clamp(0.0, 1.0);
                l.domain.parameter_at(s)
            }
            Self::Arc(a) => a.closest_point(point),
            Self::Nurbs(n) => n.closest_point(point),
            Self::Polyline(p) => p.closest_point(point),
        }
    }

    /// NURBS form with the same domain.
    #[must_use]
    pub fn to_nurbs(&self) -> Option<NurbsCurve> {
        match self {
            Self::Line(l) => Some(NurbsCurve::line(l.from, l.to, l.domain)),
            Self::Arc(a) => NurbsCurve::arc(&a.plane, a.radius, a.angle)?.with_domain(a.domain),
            Self::Nurbs(n) => Some(n.clone()),
            Self::Polyline(p) => NurbsCurve::polyline(&p.points, &p.parameters).ok(),
        }
    }

    /// Applies a similarity transform.
    #[must_use]
    pub fn transformed(&self, xform: &Transform) -> Self {
        match self {
            Self::Line(l) => Self::Line(LineCurve::new(
                xform.apply_point(l.from),
                xform.apply_point(l.to),
                l.domain,
            )),
            Self::Arc(a) => Self::Arc(ArcCurve {
                plane: a.plane.transform(xform),
                radius: a.radius * xform.apply_vec(a.plane.x_axis).length(),
                ..*a
            }),
            Self::Nurbs(n) => Self::Nurbs(n.transformed(xform)),
            Self::Polyline(p) => Self::Polyline(PolylineCurve {
                points: p.points.iter().map(|q| xform.apply_point(*q)).collect(),
                parameters: p.parameters.clone(),
            }),
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        self.transformed(&Transform::uniform_scale(factor))
    }

    #[must_use]
    pub fn bbox(&self) -> BBox {
        match self {
            Self::Line(l) => BBox::from_points(&[l.from, l.to]),
            Self::Polyline(p) => BBox::from_points(&p.points),
            Self::Nurbs(n) => n.bbox(),
            Self::Arc(a) => {
                let d = a.domain;
                let samples: Vec<Point3> = (0..=64)
                    .map(|i| a.point_at(d.parameter_at(f64::from(i) / 64.0)))
                    .collect();
                BBox::from_points(&samples)
            }
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        match self {
            Self::Line(l) => l.from.distance_to(l.to),
            Self::Arc(a) => a.radius * a.sweep().abs(),
            Self::Polyline(p) => p.points.windows(2).map(|w| w[0].distance_to(w[1])).sum(),
            Self::Nurbs(n) => n.sampled_length(32 * n.point_count()),
        }
    }

    #[must_use]
    pub fn is_short(&self, tolerance: f64) -> bool {
        self.length() < tolerance
    }
}

impl Curve3 for Curve {
    fn point_at(&self, t: f64) -> Point3 {
        self.as_curve3().point_at(t)
    }

    fn domain(&self) -> Interval {
        self.as_curve3().domain()
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        self.as_curve3().derivative_at(t)
    }
}
