//! Curves of the host kernel.
//!
//! Every curve evaluates on its own raw parameter. Arcs, ellipses and helices
//! are parametrized by angle, lines by `origin + t·direction`, splines by their
//! knots or interpolation parameters. Reversal maps a parameter range `[a, b]`
//! onto `[-b, -a]`.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::error::HostError;
use super::values::{HostPlane, HostTransform, SHORT_CURVE_TOLERANCE, Xyz};
use crate::geom::{HPoint, de_boor, find_span};

fn invalid(reason: impl Into<String>) -> HostError {
    HostError::InvalidCurve {
        reason: reason.into(),
    }
}

fn check_range(t0: f64, t1: f64) -> Result<(), HostError> {
    if t0.is_finite() && t1.is_finite() && t1 > t0 {
        Ok(())
    } else {
        Err(invalid(format!("parameter range [{t0}, {t1}] is empty")))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Line
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostLine {
    origin: Xyz,
    direction: Xyz,
    bounds: Option<[f64; 2]>,
}

impl HostLine {
    /// Segment from `end0` to `end1` parametrized by arc length from `end0`.
    pub fn create_bound(end0: Xyz, end1: Xyz) -> Result<Self, HostError> {
        let length = end0.distance_to(end1);
        Self::create_bound_with_parameters(end0, end1, 0.0, length)
    }

    /// Segment from `end0` to `end1` whose parameters run from `t0` to `t1`.
    pub fn create_bound_with_parameters(end0: Xyz, end1: Xyz, t0: f64, t1: f64) -> Result<Self, HostError> {
        let length = end0.distance_to(end1);
        if !(length >= SHORT_CURVE_TOLERANCE) {
            return Err(HostError::CurveTooShort { length });
        }
        check_range(t0, t1)?;
        let direction = (end1 - end0) * (1.0 / (t1 - t0));
        Ok(Self {
            origin: end0 - direction * t0,
            direction,
            bounds: Some([t0, t1]),
        })
    }

    pub fn create_unbound(origin: Xyz, direction: Xyz) -> Result<Self, HostError> {
        let direction = direction
            .normalize()
            .ok_or_else(|| invalid("line direction is zero"))?;
        Ok(Self {
            origin,
            direction,
            bounds: None,
        })
    }

    #[must_use]
    pub const fn origin(&self) -> Xyz {
        self.origin
    }

    #[must_use]
    pub const fn direction(&self) -> Xyz {
        self.direction
    }

    fn evaluate(&self, t: f64) -> Xyz {
        self.origin + self.direction * t
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Arc
// ─────────────────────────────────────────────────────────────────────────────

/// Circular arc, `center + r·(cos t·x + sin t·y)`. An unbound arc is a full
/// circle on `[0, 2π]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostArc {
    center: Xyz,
    radius: f64,
    x_direction: Xyz,
    y_direction: Xyz,
    bounds: Option<[f64; 2]>,
}

impl HostArc {
    /// Arc on `plane` between two angles measured from the plane x axis.
    /// A sweep of a full turn gives an unbound circle.
    pub fn create(plane: &HostPlane, radius: f64, start_angle: f64, end_angle: f64) -> Result<Self, HostError> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(invalid(format!("arc radius {radius} must be positive")));
        }
        check_range(start_angle, end_angle)?;
        let sweep = end_angle - start_angle;
        if sweep * radius < SHORT_CURVE_TOLERANCE {
            return Err(HostError::CurveTooShort {
                length: sweep * radius,
            });
        }
        let bounds = if sweep >= TAU - 1e-9 {
            None
        } else {
            Some([start_angle, end_angle])
        };
        Ok(Self {
            center: plane.origin,
            radius,
            x_direction: plane.x_vec,
            y_direction: plane.y_vec,
            bounds,
        })
    }

    /// Arc from `end0` to `end1` passing through `point_on_arc`. Its
    /// parameters run from `0` to the swept angle.
    pub fn create_by_three_points(end0: Xyz, end1: Xyz, point_on_arc: Xyz) -> Result<Self, HostError> {
        let ab = point_on_arc - end0;
        let ac = end1 - end0;
        let n = ab.cross_product(ac);
        let nn = n.dot_product(n);
        let scale = ab.dot_product(ab).max(ac.dot_product(ac));
        if nn <= 1e-24 * scale * scale || scale == 0.0 {
            return Err(invalid("arc points are collinear"));
        }

        let offset = (ac.cross_product(n) * ab.dot_product(ab) + n.cross_product(ab) * ac.dot_product(ac))
            * (1.0 / (2.0 * nn));
        let center = end0 + offset;
        let radius = offset.length();
        let x_direction = (-offset).normalize().ok_or_else(|| invalid("arc radius is zero"))?;
        let z = n.normalize().ok_or_else(|| invalid("arc points are collinear"))?;
        let y_direction = z.cross_product(x_direction);

        let to_end = end1 - center;
        let mut sweep = to_end.dot_product(y_direction).atan2(to_end.dot_product(x_direction));
        if sweep <= 1e-12 {
            sweep += TAU;
        }
        if sweep * radius < SHORT_CURVE_TOLERANCE {
            return Err(HostError::CurveTooShort {
                length: sweep * radius,
            });
        }

        Ok(Self {
            center,
            radius,
            x_direction,
            y_direction,
            bounds: Some([0.0, sweep]),
        })
    }

    #[must_use]
    pub const fn center(&self) -> Xyz {
        self.center
    }

    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub const fn x_direction(&self) -> Xyz {
        self.x_direction
    }

    #[must_use]
    pub const fn y_direction(&self) -> Xyz {
        self.y_direction
    }

    #[must_use]
    pub const fn normal(&self) -> Xyz {
        self.x_direction.cross_product(self.y_direction)
    }

    fn evaluate(&self, t: f64) -> Xyz {
        let (s, c) = t.sin_cos();
        self.center + self.x_direction * (self.radius * c) + self.y_direction * (self.radius * s)
    }

    fn derivative(&self, t: f64) -> Xyz {
        let (s, c) = t.sin_cos();
        self.x_direction * (-self.radius * s) + self.y_direction * (self.radius * c)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ellipse
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostEllipse {
    center: Xyz,
    radius_x: f64,
    radius_y: f64,
    x_direction: Xyz,
    y_direction: Xyz,
    bounds: Option<[f64; 2]>,
}

impl HostEllipse {
    pub fn create(
        center: Xyz,
        radius_x: f64,
        radius_y: f64,
        x_direction: Xyz,
        y_direction: Xyz,
        start_parameter: f64,
        end_parameter: f64,
    ) -> Result<Self, HostError> {
        if !(radius_x > 0.0 && radius_y > 0.0 && radius_x.is_finite() && radius_y.is_finite()) {
            return Err(invalid("ellipse radii must be positive"));
        }
        if !x_direction.is_unit_length() || !y_direction.is_unit_length() || x_direction.dot_product(y_direction).abs() > 1e-9 {
            return Err(invalid("ellipse axes must be orthonormal"));
        }
        check_range(start_parameter, end_parameter)?;
        let bounds = if end_parameter - start_parameter >= TAU - 1e-9 {
            None
        } else {
            Some([start_parameter, end_parameter])
        };
        Ok(Self {
            center,
            radius_x,
            radius_y,
            x_direction,
            y_direction,
            bounds,
        })
    }

    #[must_use]
    pub const fn center(&self) -> Xyz {
        self.center
    }

    #[must_use]
    pub const fn radius_x(&self) -> f64 {
        self.radius_x
    }

    #[must_use]
    pub const fn radius_y(&self) -> f64 {
        self.radius_y
    }

    #[must_use]
    pub const fn x_direction(&self) -> Xyz {
        self.x_direction
    }

    #[must_use]
    pub const fn y_direction(&self) -> Xyz {
        self.y_direction
    }

    fn evaluate(&self, t: f64) -> Xyz {
        let (s, c) = t.sin_cos();
        self.center + self.x_direction * (self.radius_x * c) + self.y_direction * (self.radius_y * s)
    }

    fn derivative(&self, t: f64) -> Xyz {
        let (s, c) = t.sin_cos();
        self.x_direction * (-self.radius_x * s) + self.y_direction * (self.radius_y * c)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NurbSpline
// ─────────────────────────────────────────────────────────────────────────────

/// B-spline with a clamped knot vector of `count + degree + 1` entries.
/// `weights` is empty for a non-rational spline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostNurbSpline {
    degree: usize,
    control_points: Vec<Xyz>,
    weights: Vec<f64>,
    knots: Vec<f64>,
}

impl HostNurbSpline {
    pub fn create_curve(
        degree: usize,
        knots: Vec<f64>,
        control_points: Vec<Xyz>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, HostError> {
        let nurbs = |reason: String| HostError::InvalidNurbs { reason };
        let count = control_points.len();
        if degree == 0 {
            return Err(nurbs("degree must be at least 1".into()));
        }
        if count <= degree {
            return Err(nurbs(format!("{count} control points for degree {degree}")));
        }
        if knots.len() != count + degree + 1 {
            return Err(nurbs(format!(
                "expected {} knots, got {}",
                count + degree + 1,
                knots.len()
            )));
        }
        if knots.iter().any(|k| !k.is_finite()) || knots.windows(2).any(|w| w[1] < w[0]) {
            return Err(nurbs("knots must be finite and non-decreasing".into()));
        }
        if !(knots[degree] < knots[count]) {
            return Err(nurbs("knot vector spans an empty range".into()));
        }
        if control_points.iter().any(|p| !p.is_finite()) {
            return Err(nurbs("control points must be finite".into()));
        }
        let weights = weights.unwrap_or_default();
        if !weights.is_empty() {
            if weights.len() != count {
                return Err(nurbs(format!("{} weights for {count} control points", weights.len())));
            }
            if weights.iter().any(|w| !(*w > 0.0 && w.is_finite())) {
                return Err(nurbs("weights must be positive".into()));
            }
        }

        Ok(Self {
            degree,
            control_points,
            weights,
            knots,
        })
    }

    #[must_use]
    pub const fn degree(&self) -> usize {
        self.degree
    }

    #[must_use]
    pub fn control_points(&self) -> &[Xyz] {
        &self.control_points
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    #[must_use]
    pub fn is_rational(&self) -> bool {
        !self.weights.is_empty()
    }

    fn weight(&self, index: usize) -> f64 {
        self.weights.get(index).copied().unwrap_or(1.0)
    }

    fn range(&self) -> [f64; 2] {
        [self.knots[self.degree], self.knots[self.control_points.len()]]
    }

    fn evaluate(&self, t: f64) -> Xyz {
        let p = self.degree;
        let n = self.control_points.len() - 1;
        let span = find_span(n, p, t, &self.knots);
        let mut d: Vec<HPoint> = (0..=p)
            .map(|j| {
                let i = span - p + j;
                let q = self.control_points[i];
                let w = self.weight(i);
                HPoint::new(q.x * w, q.y * w, q.z * w, w)
            })
            .collect();
        de_boor(&mut d, span, p, p, t, &self.knots);
        let h = d[p];
        Xyz::new(h.x / h.w, h.y / h.w, h.z / h.w)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HermiteSpline
// ─────────────────────────────────────────────────────────────────────────────

/// Piecewise cubic through `control_points` with the given first derivatives
/// at the interpolation `parameters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostHermiteSpline {
    control_points: Vec<Xyz>,
    tangents: Vec<Xyz>,
    parameters: Vec<f64>,
}

impl HostHermiteSpline {
    pub fn create(control_points: Vec<Xyz>, tangents: Vec<Xyz>, parameters: Vec<f64>) -> Result<Self, HostError> {
        let count = control_points.len();
        if count < 2 {
            return Err(invalid("hermite spline needs at least 2 points"));
        }
        if tangents.len() != count || parameters.len() != count {
            return Err(invalid("hermite spline needs one tangent and one parameter per point"));
        }
        if parameters.iter().any(|t| !t.is_finite()) || parameters.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(invalid("hermite parameters must be increasing"));
        }
        Ok(Self {
            control_points,
            tangents,
            parameters,
        })
    }

    #[must_use]
    pub fn control_points(&self) -> &[Xyz] {
        &self.control_points
    }

    #[must_use]
    pub fn tangents(&self) -> &[Xyz] {
        &self.tangents
    }

    #[must_use]
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    fn segment(&self, t: f64) -> (usize, f64, f64) {
        let last = self.parameters.len() - 2;
        let i = self
            .parameters
            .windows(2)
            .position(|w| t < w[1])
            .unwrap_or(last)
            .min(last);
        let h = self.parameters[i + 1] - self.parameters[i];
        (i, (t - self.parameters[i]) / h, h)
    }

    fn evaluate(&self, t: f64) -> Xyz {
        let (i, s, h) = self.segment(t);
        let (s2, s3) = (s * s, s * s * s);
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;
        self.control_points[i] * h00
            + self.tangents[i] * (h10 * h)
            + self.control_points[i + 1] * h01
            + self.tangents[i + 1] * (h11 * h)
    }

    fn derivative(&self, t: f64) -> Xyz {
        let (i, s, h) = self.segment(t);
        let s2 = s * s;
        let d00 = (6.0 * s2 - 6.0 * s) / h;
        let d10 = 3.0 * s2 - 4.0 * s + 1.0;
        let d01 = (-6.0 * s2 + 6.0 * s) / h;
        let d11 = 3.0 * s2 - 2.0 * s;
        self.control_points[i] * d00
            + self.tangents[i] * d10
            + self.control_points[i + 1] * d01
            + self.tangents[i + 1] * d11
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CylindricalHelix
// ─────────────────────────────────────────────────────────────────────────────

/// `base + r·(cos t·x + sin t·y) + pitch·t/2π·z` where `y = z × x` for a right
/// handed helix and `x × z` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostCylindricalHelix {
    base_point: Xyz,
    radius: f64,
    x_vector: Xyz,
    z_vector: Xyz,
    pitch: f64,
    right_handed: bool,
    bounds: [f64; 2],
}

impl HostCylindricalHelix {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        base_point: Xyz,
        radius: f64,
        x_vector: Xyz,
        z_vector: Xyz,
        right_handed: bool,
        start_angle: f64,
        end_angle: f64,
        pitch: f64,
    ) -> Result<Self, HostError> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(invalid("helix radius must be positive"));
        }
        if !pitch.is_finite() {
            return Err(invalid("helix pitch must be finite"));
        }
        if !x_vector.is_unit_length() || !z_vector.is_unit_length() || x_vector.dot_product(z_vector).abs() > 1e-9 {
            return Err(invalid("helix axes must be orthonormal"));
        }
        check_range(start_angle, end_angle)?;
        Ok(Self {
            base_point,
            radius,
            x_vector,
            z_vector,
            pitch,
            right_handed,
            bounds: [start_angle, end_angle],
        })
    }

    #[must_use]
    pub const fn base_point(&self) -> Xyz {
        self.base_point
    }

    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub const fn x_vector(&self) -> Xyz {
        self.x_vector
    }

    #[must_use]
    pub const fn z_vector(&self) -> Xyz {
        self.z_vector
    }

    #[must_use]
    pub const fn y_vector(&self) -> Xyz {
        if self.right_handed {
            self.z_vector.cross_product(self.x_vector)
        } else {
            self.x_vector.cross_product(self.z_vector)
        }
    }

    #[must_use]
    pub const fn pitch(&self) -> f64 {
        self.pitch
    }

    #[must_use]
    pub const fn is_right_handed(&self) -> bool {
        self.right_handed
    }

    fn evaluate(&self, t: f64) -> Xyz {
        let (s, c) = t.sin_cos();
        self.base_point
            + self.x_vector * (self.radius * c)
            + self.y_vector() * (self.radius * s)
            + self.z_vector * (self.pitch * t / TAU)
    }

    fn derivative(&self, t: f64) -> Xyz {
        let (s, c) = t.sin_cos();
        self.x_vector * (-self.radius * s) + self.y_vector() * (self.radius * c) + self.z_vector * (self.pitch / TAU)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HostCurve
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostCurve {
    Line(HostLine),
    Arc(HostArc),
    Ellipse(HostEllipse),
    NurbSpline(HostNurbSpline),
    HermiteSpline(HostHermiteSpline),
    CylindricalHelix(HostCylindricalHelix),
}

impl HostCurve {
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Line(_) => "Line",
            Self::Arc(_) => "Arc",
            Self::Ellipse(_) => "Ellipse",
            Self::NurbSpline(_) => "NurbSpline",
            Self::HermiteSpline(_) => "HermiteSpline",
            Self::CylindricalHelix(_) => "CylindricalHelix",
        }
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        match self {
            Self::Line(c) => c.bounds.is_some(),
            Self::Arc(c) => c.bounds.is_some(),
            Self::Ellipse(c) => c.bounds.is_some(),
            Self::NurbSpline(_) | Self::HermiteSpline(_) | Self::CylindricalHelix(_) => true,
        }
    }

    /// Closed periodic curves (unbound arcs and ellipses).
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        matches!(self, Self::Arc(c) if c.bounds.is_none()) || matches!(self, Self::Ellipse(c) if c.bounds.is_none())
    }

    /// Parameter range; `None` for an unbound line. Unbound arcs and ellipses
    /// report one full turn.
    #[must_use]
    pub fn parameter_range(&self) -> Option<[f64; 2]> {
        match self {
            Self::Line(c) => c.bounds,
            Self::Arc(c) => Some(c.bounds.unwrap_or([0.0, TAU])),
            Self::Ellipse(c) => Some(c.bounds.unwrap_or([0.0, TAU])),
            Self::NurbSpline(c) => Some(c.range()),
            Self::HermiteSpline(c) => {
                let p = &c.parameters;
                Some([p[0], p[p.len() - 1]])
            }
            Self::CylindricalHelix(c) => Some(c.bounds),
        }
    }

    #[must_use]
    pub fn end_parameter(&self, index: usize) -> Option<f64> {
        self.parameter_range().map(|r| r[index.min(1)])
    }

    #[must_use]
    pub fn end_point(&self, index: usize) -> Option<Xyz> {
        self.end_parameter(index).map(|t| self.evaluate(t))
    }

    /// Point at the raw parameter `t`.
    #[must_use]
    pub fn evaluate(&self, t: f64) -> Xyz {
        match self {
            Self::Line(c) => c.evaluate(t),
            Self::Arc(c) => c.evaluate(t),
            Self::Ellipse(c) => c.evaluate(t),
            Self::NurbSpline(c) => c.evaluate(t),
            Self::HermiteSpline(c) => c.evaluate(t),
            Self::CylindricalHelix(c) => c.evaluate(t),
        }
    }

    /// Point at the normalized parameter `s` in `[0, 1]`.
    #[must_use]
    pub fn evaluate_normalized(&self, s: f64) -> Option<Xyz> {
        let [t0, t1] = self.parameter_range()?;
        Some(self.evaluate(t0 + (t1 - t0) * s))
    }

    #[must_use]
    pub fn derivative(&self, t: f64) -> Xyz {
        match self {
            Self::Line(c) => c.direction,
            Self::Arc(c) => c.derivative(t),
            Self::Ellipse(c) => c.derivative(t),
            Self::HermiteSpline(c) => c.derivative(t),
            Self::CylindricalHelix(c) => c.derivative(t),
            Self::NurbSpline(c) => {
                let [t0, t1] = c.range();
                let h = 1e-6 * (t1 - t0);
                let a = (t - h).max(t0);
                let b = (t + h).min(t1);
                (c.evaluate(b) - c.evaluate(a)) * (1.0 / (b - a))
            }
        }
    }

    /// Approximate length, infinite for an unbound line.
    #[must_use]
    pub fn length(&self) -> f64 {
        const SAMPLES: usize = 64;
        let Some([t0, t1]) = self.parameter_range() else {
            return f64::INFINITY;
        };
        if let Self::Line(c) = self {
            return c.direction.length() * (t1 - t0);
        }
        let mut length = 0.0;
        let mut previous = self.evaluate(t0);
        for i in 1..=SAMPLES {
            let p = self.evaluate(t0 + (t1 - t0) * i as f64 / SAMPLES as f64);
            length += p.distance_to(previous);
            previous = p;
        }
        length
    }

    /// Same point set traversed backwards, on the parameter range `[-b, -a]`.
    #[must_use]
    pub fn create_reversed(&self) -> Self {
        let flip = |b: [f64; 2]| [-b[1], -b[0]];
        match self {
            Self::Line(c) => Self::Line(HostLine {
                origin: c.origin,
                direction: -c.direction,
                bounds: c.bounds.map(flip),
            }),
            Self::Arc(c) => Self::Arc(HostArc {
                y_direction: -c.y_direction,
                bounds: c.bounds.map(flip),
                ..*c
            }),
            Self::Ellipse(c) => Self::Ellipse(HostEllipse {
                y_direction: -c.y_direction,
                bounds: c.bounds.map(flip),
                ..*c
            }),
            Self::NurbSpline(c) => Self::NurbSpline(HostNurbSpline {
                degree: c.degree,
                control_points: c.control_points.iter().rev().copied().collect(),
                weights: c.weights.iter().rev().copied().collect(),
                knots: c.knots.iter().rev().map(|k| -k).collect(),
            }),
            Self::HermiteSpline(c) => Self::HermiteSpline(HostHermiteSpline {
                control_points: c.control_points.iter().rev().copied().collect(),
                tangents: c.tangents.iter().rev().map(|t| -*t).collect(),
                parameters: c.parameters.iter().rev().map(|t| -t).collect(),
            }),
            Self::CylindricalHelix(c) => Self::CylindricalHelix(HostCylindricalHelix {
                z_vector: -c.z_vector,
                bounds: flip(c.bounds),
                ..*c
            }),
        }
    }

    /// Image under a conformal transform.
    #[must_use]
    pub fn create_transformed(&self, transform: &HostTransform) -> Self {
        let scale = transform.basis_x.length();
        let dir = |v: Xyz| transform.of_vector(v) * (1.0 / scale);
        match self {
            Self::Line(c) => Self::Line(HostLine {
                origin: transform.of_point(c.origin),
                direction: transform.of_vector(c.direction),
                bounds: c.bounds,
            }),
            Self::Arc(c) => Self::Arc(HostArc {
                center: transform.of_point(c.center),
                radius: c.radius * scale,
                x_direction: dir(c.x_direction),
                y_direction: dir(c.y_direction),
                bounds: c.bounds,
            }),
            Self::Ellipse(c) => Self::Ellipse(HostEllipse {
                center: transform.of_point(c.center),
                radius_x: c.radius_x * scale,
                radius_y: c.radius_y * scale,
                x_direction: dir(c.x_direction),
                y_direction: dir(c.y_direction),
                bounds: c.bounds,
            }),
            Self::NurbSpline(c) => Self::NurbSpline(HostNurbSpline {
                control_points: c.control_points.iter().map(|p| transform.of_point(*p)).collect(),
                ..c.clone()
            }),
            Self::HermiteSpline(c) => Self::HermiteSpline(HostHermiteSpline {
                control_points: c.control_points.iter().map(|p| transform.of_point(*p)).collect(),
                tangents: c.tangents.iter().map(|t| transform.of_vector(*t)).collect(),
                parameters: c.parameters.clone(),
            }),
            Self::CylindricalHelix(c) => Self::CylindricalHelix(HostCylindricalHelix {
                base_point: transform.of_point(c.base_point),
                radius: c.radius * scale,
                x_vector: dir(c.x_vector),
                z_vector: dir(c.z_vector),
                pitch: c.pitch * scale,
                right_handed: c.right_handed == (transform.determinant() > 0.0),
                bounds: c.bounds,
            }),
        }
    }
}
