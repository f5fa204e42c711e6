//! Surfaces of the host kernel.
//!
//! Frame based surfaces (plane, cone, cylinder, revolution) evaluate in the
//! frame `origin, x, y, axis`; the angular parameter `u` turns from `x`
//! towards `y`. A surface matches its parametric orientation when its own
//! orientation normal agrees with `∂u × ∂v`, which for frame based surfaces
//! means a right handed frame.

use serde::{Deserialize, Serialize};

use super::curve::HostCurve;
use super::error::HostError;
use super::values::{HostPlane, Uv, Xyz};
use crate::geom::{HPoint, de_boor, find_span};

fn invalid(reason: impl Into<String>) -> HostError {
    HostError::InvalidSurface {
        reason: reason.into(),
    }
}

fn check_frame(x: Xyz, y: Xyz, axis: Xyz) -> Result<(), HostError> {
    let unit = x.is_unit_length() && y.is_unit_length() && axis.is_unit_length();
    let orthogonal =
        x.dot_product(y).abs() <= 1e-9 && y.dot_product(axis).abs() <= 1e-9 && axis.dot_product(x).abs() <= 1e-9;
    if unit && orthogonal {
        Ok(())
    } else {
        Err(invalid("surface frame must be orthonormal"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostConicalSurface {
    pub origin: Xyz,
    pub x_dir: Xyz,
    pub y_dir: Xyz,
    pub axis: Xyz,
    pub half_angle: f64,
}

impl HostConicalSurface {
    /// Cone with apex `origin`; `v` is the distance from the apex along a ruling.
    pub fn create(origin: Xyz, x_dir: Xyz, y_dir: Xyz, axis: Xyz, half_angle: f64) -> Result<Self, HostError> {
        check_frame(x_dir, y_dir, axis)?;
        if !(half_angle > 0.0 && half_angle < std::f64::consts::FRAC_PI_2) {
            return Err(invalid(format!("cone half angle {half_angle} out of range")));
        }
        Ok(Self {
            origin,
            x_dir,
            y_dir,
            axis,
            half_angle,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostCylindricalSurface {
    pub origin: Xyz,
    pub x_dir: Xyz,
    pub y_dir: Xyz,
    pub axis: Xyz,
    pub radius: f64,
}

impl HostCylindricalSurface {
    pub fn create(origin: Xyz, x_dir: Xyz, y_dir: Xyz, axis: Xyz, radius: f64) -> Result<Self, HostError> {
        check_frame(x_dir, y_dir, axis)?;
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(invalid("cylinder radius must be positive"));
        }
        Ok(Self {
            origin,
            x_dir,
            y_dir,
            axis,
            radius,
        })
    }
}

/// `profile` is expressed in the local frame (`x`, `y`, `axis` as the
/// coordinate axes) and revolved about the local z axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRevolvedSurface {
    pub origin: Xyz,
    pub x_dir: Xyz,
    pub y_dir: Xyz,
    pub axis: Xyz,
    pub profile: HostCurve,
}

impl HostRevolvedSurface {
    pub fn create(origin: Xyz, x_dir: Xyz, y_dir: Xyz, axis: Xyz, profile: HostCurve) -> Result<Self, HostError> {
        check_frame(x_dir, y_dir, axis)?;
        if !profile.is_bound() {
            return Err(invalid("revolution profile must be bound"));
        }
        Ok(Self {
            origin,
            x_dir,
            y_dir,
            axis,
            profile,
        })
    }
}

/// One side of a ruled surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuledProfile {
    Curve(HostCurve),
    Point(Xyz),
}

/// Straight lines between two profiles, each a bound curve or a point.
/// `u` runs along the profiles over `[0, 1]`, `v` across over `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRuledSurface {
    curves: [Option<HostCurve>; 2],
    points: [Option<Xyz>; 2],
    extruded: bool,
}

impl HostRuledSurface {
    pub fn create(first: RuledProfile, second: RuledProfile) -> Result<Self, HostError> {
        let split = |side: RuledProfile| match side {
            RuledProfile::Curve(curve) => (Some(curve), None),
            RuledProfile::Point(point) => (None, Some(point)),
        };
        let (c0, p0) = split(first);
        let (c1, p1) = split(second);
        if c0.is_none() && c1.is_none() {
            return Err(invalid("a ruled surface needs at least one profile curve"));
        }
        if [&c0, &c1].into_iter().flatten().any(|c| !c.is_bound()) {
            return Err(invalid("ruled surface profiles must be bound"));
        }
        let extruded = match (&c0, &c1) {
            (Some(a), Some(b)) => is_translation(a, b),
            _ => false,
        };
        Ok(Self {
            curves: [c0, c1],
            points: [p0, p1],
            extruded,
        })
    }

    #[must_use]
    pub fn curve(&self, index: usize) -> Option<&HostCurve> {
        self.curves[index.min(1)].as_ref()
    }

    #[must_use]
    pub fn point(&self, index: usize) -> Option<Xyz> {
        self.points[index.min(1)]
    }

    /// Whether the second profile is a translated copy of the first.
    #[must_use]
    pub const fn is_extruded(&self) -> bool {
        self.extruded
    }

    fn rail(&self, index: usize, s: f64) -> Xyz {
        match (&self.curves[index], self.points[index]) {
            (Some(curve), _) => curve.evaluate_normalized(s).unwrap_or(Xyz::ZERO),
            (None, Some(point)) => point,
            (None, None) => Xyz::ZERO,
        }
    }
}

fn is_translation(a: &HostCurve, b: &HostCurve) -> bool {
    let (Some(a0), Some(b0)) = (a.evaluate_normalized(0.0), b.evaluate_normalized(0.0)) else {
        return false;
    };
    let offset = b0 - a0;
    (1..=8).all(|k| {
        let s = f64::from(k) / 8.0;
        match (a.evaluate_normalized(s), b.evaluate_normalized(s)) {
            (Some(p), Some(q)) => (q - p).is_almost_equal_to(offset, 1e-9 * (1.0 + offset.length())),
            _ => false,
        }
    })
}

/// Clamped tensor product NURBS with `count + degree + 1` knots per direction.
/// Control points are stored u-major (`points[u * count_v + v]`); `weights` is
/// empty for a non-rational surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostNurbsSurface {
    degree_u: usize,
    degree_v: usize,
    knots_u: Vec<f64>,
    knots_v: Vec<f64>,
    control_points: Vec<Xyz>,
    weights: Vec<f64>,
}

impl HostNurbsSurface {
    pub fn create(
        degree_u: usize,
        degree_v: usize,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        control_points: Vec<Xyz>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, HostError> {
        let nurbs = |reason: String| HostError::InvalidNurbs { reason };
        for (degree, knots) in [(degree_u, &knots_u), (degree_v, &knots_v)] {
            if degree == 0 {
                return Err(nurbs("degree must be at least 1".into()));
            }
            if knots.len() < 2 * (degree + 1) {
                return Err(nurbs(format!("{} knots for degree {degree}", knots.len())));
            }
            if knots.iter().any(|k| !k.is_finite()) || knots.windows(2).any(|w| w[1] < w[0]) {
                return Err(nurbs("knots must be finite and non-decreasing".into()));
            }
            let count = knots.len() - degree - 1;
            if !(knots[degree] < knots[count]) {
                return Err(nurbs("knot vector spans an empty range".into()));
            }
        }
        let count = (knots_u.len() - degree_u - 1) * (knots_v.len() - degree_v - 1);
        if control_points.len() != count {
            return Err(nurbs(format!(
                "expected {count} control points, got {}",
                control_points.len()
            )));
        }
        if control_points.iter().any(|p| !p.is_finite()) {
            return Err(nurbs("control points must be finite".into()));
        }
        let weights = weights.unwrap_or_default();
        if !weights.is_empty() && (weights.len() != count || weights.iter().any(|w| !(*w > 0.0 && w.is_finite()))) {
            return Err(nurbs("weights must be positive, one per control point".into()));
        }
        Ok(Self {
            degree_u,
            degree_v,
            knots_u,
            knots_v,
            control_points,
            weights,
        })
    }

    #[must_use]
    pub const fn degree_u(&self) -> usize {
        self.degree_u
    }

    #[must_use]
    pub const fn degree_v(&self) -> usize {
        self.degree_v
    }

    #[must_use]
    pub fn knots_u(&self) -> &[f64] {
        &self.knots_u
    }

    #[must_use]
    pub fn knots_v(&self) -> &[f64] {
        &self.knots_v
    }

    #[must_use]
    pub fn count_u(&self) -> usize {
        self.knots_u.len() - self.degree_u - 1
    }

    #[must_use]
    pub fn count_v(&self) -> usize {
        self.knots_v.len() - self.degree_v - 1
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
    pub fn is_rational(&self) -> bool {
        !self.weights.is_empty()
    }

    fn homogeneous(&self, i: usize, j: usize) -> HPoint {
        let index = i * self.count_v() + j;
        let p = self.control_points[index];
        let w = self.weights.get(index).copied().unwrap_or(1.0);
        HPoint::new(p.x * w, p.y * w, p.z * w, w)
    }

    #[must_use]
    pub fn evaluate(&self, uv: Uv) -> Xyz {
        let (p, q) = (self.degree_u, self.degree_v);
        let span_u = find_span(self.count_u() - 1, p, uv.u, &self.knots_u);
        let span_v = find_span(self.count_v() - 1, q, uv.v, &self.knots_v);

        let mut column: Vec<HPoint> = (0..=p)
            .map(|a| {
                let i = span_u - p + a;
                let mut row: Vec<HPoint> = (0..=q).map(|b| self.homogeneous(i, span_v - q + b)).collect();
                de_boor(&mut row, span_v, q, q, uv.v, &self.knots_v);
                row[q]
            })
            .collect();
        de_boor(&mut column, span_u, p, p, uv.u, &self.knots_u);
        let h = column[p];
        Xyz::new(h.x / h.w, h.y / h.w, h.z / h.w)
    }
}

/// Bicubic Hermite data on a grid of `params_u × params_v` nodes. Node data is
/// stored with `u` varying fastest (`points[v * count_u + u]`). `exported`
/// holds the NURBS export of the same surface when the document provides one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostHermiteSurface {
    pub params_u: Vec<f64>,
    pub params_v: Vec<f64>,
    pub points: Vec<Xyz>,
    pub tangents_u: Vec<Xyz>,
    pub tangents_v: Vec<Xyz>,
    pub mixed_derivs: Vec<Xyz>,
    pub exported: Option<HostNurbsSurface>,
}

impl HostHermiteSurface {
    pub fn create(
        params_u: Vec<f64>,
        params_v: Vec<f64>,
        points: Vec<Xyz>,
        tangents_u: Vec<Xyz>,
        tangents_v: Vec<Xyz>,
        mixed_derivs: Vec<Xyz>,
    ) -> Result<Self, HostError> {
        if params_u.len() < 2 || params_v.len() < 2 {
            return Err(invalid("hermite surface needs at least 2 x 2 nodes"));
        }
        for params in [&params_u, &params_v] {
            if params.iter().any(|t| !t.is_finite()) || params.windows(2).any(|w| !(w[1] > w[0])) {
                return Err(invalid("hermite parameters must be increasing"));
            }
        }
        let count = params_u.len() * params_v.len();
        if [points.len(), tangents_u.len(), tangents_v.len(), mixed_derivs.len()]
            .iter()
            .any(|n| *n != count)
        {
            return Err(invalid(format!("hermite surface expects {count} values per array")));
        }
        Ok(Self {
            params_u,
            params_v,
            points,
            tangents_u,
            tangents_v,
            mixed_derivs,
            exported: None,
        })
    }

    #[must_use]
    pub fn with_exported_nurbs(mut self, nurbs: HostNurbsSurface) -> Self {
        self.exported = Some(nurbs);
        self
    }

    fn node(&self, i: usize, j: usize) -> usize {
        j * self.params_u.len() + i
    }

    #[must_use]
    pub fn evaluate(&self, uv: Uv) -> Xyz {
        let (i, s, hu) = hermite_cell(&self.params_u, uv.u);
        let (j, t, hv) = hermite_cell(&self.params_v, uv.v);
        let bu = hermite_basis(s);
        let bv = hermite_basis(t);

        let mut p = Xyz::ZERO;
        for a in 0..2 {
            for b in 0..2 {
                let k = self.node(i + a, j + b);
                let (pu, du) = (bu[a], bu[a + 2] * hu);
                let (pv, dv) = (bv[b], bv[b + 2] * hv);
                p = p
                    + self.points[k] * (pu * pv)
                    + self.tangents_u[k] * (du * pv)
                    + self.tangents_v[k] * (pu * dv)
                    + self.mixed_derivs[k] * (du * dv);
            }
        }
        p
    }
}

fn hermite_cell(params: &[f64], t: f64) -> (usize, f64, f64) {
    let last = params.len() - 2;
    let i = params.windows(2).position(|w| t < w[1]).unwrap_or(last).min(last);
    let h = params[i + 1] - params[i];
    (i, (t - params[i]) / h, h)
}

/// Cubic Hermite basis `[h00, h01, h10, h11]` at `s`.
fn hermite_basis(s: f64) -> [f64; 4] {
    let (s2, s3) = (s * s, s * s * s);
    [
        2.0 * s3 - 3.0 * s2 + 1.0,
        -2.0 * s3 + 3.0 * s2,
        s3 - 2.0 * s2 + s,
        s3 - s2,
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostSurface {
    Plane(HostPlane),
    Cone(HostConicalSurface),
    Cylinder(HostCylindricalSurface),
    Revolution(HostRevolvedSurface),
    Ruled(HostRuledSurface),
    Hermite(HostHermiteSurface),
    Nurbs(HostNurbsSurface),
}

impl HostSurface {
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Plane(_) => "Plane",
            Self::Cone(_) => "ConicalSurface",
            Self::Cylinder(_) => "CylindricalSurface",
            Self::Revolution(_) => "RevolvedSurface",
            Self::Ruled(_) => "RuledSurface",
            Self::Hermite(_) => "HermiteSurface",
            Self::Nurbs(_) => "NurbsSurface",
        }
    }

    #[must_use]
    pub fn evaluate(&self, uv: Uv) -> Xyz {
        let Uv { u, v } = uv;
        let (s, c) = u.sin_cos();
        match self {
            Self::Plane(p) => p.origin + p.x_vec * u + p.y_vec * v,
            Self::Cone(k) => {
                let (sh, ch) = k.half_angle.sin_cos();
                let radial = k.x_dir * c + k.y_dir * s;
                k.origin + (k.axis * ch + radial * sh) * v
            }
            Self::Cylinder(k) => k.origin + (k.x_dir * c + k.y_dir * s) * k.radius + k.axis * v,
            Self::Revolution(r) => {
                let local = r.profile.evaluate(v);
                let x = local.x * c - local.y * s;
                let y = local.x * s + local.y * c;
                r.origin + r.x_dir * x + r.y_dir * y + r.axis * local.z
            }
            Self::Ruled(r) => {
                let a = r.rail(0, u);
                let b = r.rail(1, u);
                a + (b - a) * v
            }
            Self::Hermite(h) => h.evaluate(uv),
            Self::Nurbs(n) => n.evaluate(uv),
        }
    }

    /// Central difference partial derivatives.
    #[must_use]
    pub fn derivatives(&self, uv: Uv) -> (Xyz, Xyz) {
        const H: f64 = 1e-6;
        let du = (self.evaluate(Uv::new(uv.u + H, uv.v)) - self.evaluate(Uv::new(uv.u - H, uv.v))) * (0.5 / H);
        let dv = (self.evaluate(Uv::new(uv.u, uv.v + H)) - self.evaluate(Uv::new(uv.u, uv.v - H))) * (0.5 / H);
        (du, dv)
    }

    /// Unit `∂u × ∂v`, `None` at a singular point.
    #[must_use]
    pub fn parametric_normal(&self, uv: Uv) -> Option<Xyz> {
        let (du, dv) = self.derivatives(uv);
        du.cross_product(dv).normalize()
    }

    /// Whether the surface orientation normal equals `∂u × ∂v`.
    #[must_use]
    pub fn matches_parametric_orientation(&self) -> bool {
        let handed = |x: Xyz, y: Xyz, n: Xyz| x.cross_product(y).dot_product(n) > 0.0;
        match self {
            Self::Plane(p) => handed(p.x_vec, p.y_vec, p.normal),
            Self::Cone(k) => handed(k.x_dir, k.y_dir, k.axis),
            Self::Cylinder(k) => handed(k.x_dir, k.y_dir, k.axis),
            Self::Revolution(r) => handed(r.x_dir, r.y_dir, r.axis),
            Self::Ruled(_) | Self::Hermite(_) | Self::Nurbs(_) => true,
        }
    }
}
