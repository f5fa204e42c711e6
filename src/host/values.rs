//! Value types of the host kernel: coordinates, ids, transforms, planes and
//! bounding boxes. Lengths are in internal units (feet).

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::error::HostError;

/// Distance below which two points are the same point.
pub const VERTEX_TOLERANCE: f64 = ABSOLUTE_TOLERANCE / 10.0;
/// Modelling tolerance of the host document.
pub const ABSOLUTE_TOLERANCE: f64 = 1.0 / 192.0;
/// Curves shorter than this are rejected by the curve constructors.
pub const SHORT_CURVE_TOLERANCE: f64 = ABSOLUTE_TOLERANCE / 2.0;
/// One degree.
pub const ANGLE_TOLERANCE: f64 = std::f64::consts::PI / 180.0;

// ─────────────────────────────────────────────────────────────────────────────
// Xyz / Uv
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Xyz {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const BASIS_X: Self = Self::new(1.0, 0.0, 0.0);
    pub const BASIS_Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const BASIS_Z: Self = Self::new(0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn dot_product(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross_product(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot_product(self).sqrt()
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Unit vector in the same direction, `None` for a zero vector.
    #[must_use]
    pub fn normalize(self) -> Option<Self> {
        let len = self.length();
        if len > f64::EPSILON && len.is_finite() {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_unit_length(self) -> bool {
        (self.length() - 1.0).abs() <= 1e-9
    }

    #[must_use]
    pub fn is_almost_equal_to(self, other: Self, tolerance: f64) -> bool {
        self.distance_to(other) <= tolerance
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Angle in `[0, π]` between two non zero vectors.
    #[must_use]
    pub fn angle_to(self, other: Self) -> f64 {
        let denom = self.length() * other.length();
        if denom == 0.0 {
            return 0.0;
        }
        (self.dot_product(other) / denom).clamp(-1.0, 1.0).acos()
    }
}

impl Add for Xyz {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Xyz {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Xyz {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Xyz {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Uv {
    pub u: f64,
    pub v: f64,
}

impl Uv {
    #[must_use]
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

/// Identifier of a host document element (material, graphics style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub i64);

impl ElementId {
    pub const INVALID: Self = Self(-1);

    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::INVALID
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transform
// ─────────────────────────────────────────────────────────────────────────────

/// Affine map `p -> origin + x·basis_x + y·basis_y + z·basis_z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostTransform {
    pub origin: Xyz,
    pub basis_x: Xyz,
    pub basis_y: Xyz,
    pub basis_z: Xyz,
}

impl HostTransform {
    pub const IDENTITY: Self = Self {
        origin: Xyz::ZERO,
        basis_x: Xyz::BASIS_X,
        basis_y: Xyz::BASIS_Y,
        basis_z: Xyz::BASIS_Z,
    };

    #[must_use]
    pub const fn create_translation(offset: Xyz) -> Self {
        Self {
            origin: offset,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn of_point(&self, p: Xyz) -> Xyz {
        self.origin + self.of_vector(p)
    }

    #[must_use]
    pub fn of_vector(&self, v: Xyz) -> Xyz {
        self.basis_x * v.x + self.basis_y * v.y + self.basis_z * v.z
    }

    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.basis_x
            .dot_product(self.basis_y.cross_product(self.basis_z))
    }

    /// Unit, mutually orthogonal basis vectors within `tolerance`.
    #[must_use]
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let (x, y, z) = (self.basis_x, self.basis_y, self.basis_z);
        [x, y, z].iter().all(|b| (b.length() - 1.0).abs() <= tolerance)
            && x.dot_product(y).abs() <= tolerance
            && y.dot_product(z).abs() <= tolerance
            && z.dot_product(x).abs() <= tolerance
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.origin.is_finite()
            && self.basis_x.is_finite()
            && self.basis_y.is_finite()
            && self.basis_z.is_finite()
    }
}

impl Default for HostTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plane
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostPlane {
    pub origin: Xyz,
    pub x_vec: Xyz,
    pub y_vec: Xyz,
    pub normal: Xyz,
}

impl HostPlane {
    /// Plane through `origin` spanned by the orthonormal pair `x_vec`, `y_vec`.
    pub fn create_by_origin_and_basis(origin: Xyz, x_vec: Xyz, y_vec: Xyz) -> Result<Self, HostError> {
        if !x_vec.is_unit_length() || !y_vec.is_unit_length() {
            return Err(HostError::InvalidSurface {
                reason: "plane basis vectors must be unit length".into(),
            });
        }
        if x_vec.dot_product(y_vec).abs() > 1e-9 {
            return Err(HostError::InvalidSurface {
                reason: "plane basis vectors must be orthogonal".into(),
            });
        }
        Ok(Self {
            origin,
            x_vec,
            y_vec,
            normal: x_vec.cross_product(y_vec),
        })
    }

    /// Plane through `origin` with the given normal and an arbitrary x axis.
    pub fn create_by_normal_and_origin(normal: Xyz, origin: Xyz) -> Result<Self, HostError> {
        let normal = normal.normalize().ok_or_else(|| HostError::InvalidSurface {
            reason: "plane normal is zero".into(),
        })?;
        let helper = if normal.x.abs() < 0.9 { Xyz::BASIS_X } else { Xyz::BASIS_Y };
        let x_vec = (helper - normal * helper.dot_product(normal))
            .normalize()
            .ok_or_else(|| HostError::InvalidSurface {
                reason: "plane normal is zero".into(),
            })?;
        Ok(Self {
            origin,
            x_vec,
            y_vec: normal.cross_product(x_vec),
            normal,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bounding boxes and polylines
// ─────────────────────────────────────────────────────────────────────────────

/// Axis aligned box in the coordinate system of `transform`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostBoundingBoxXyz {
    pub min: Xyz,
    pub max: Xyz,
    pub transform: HostTransform,
    pub enabled: bool,
}

impl HostBoundingBoxXyz {
    #[must_use]
    pub const fn new(min: Xyz, max: Xyz) -> Self {
        Self {
            min,
            max,
            transform: HostTransform::IDENTITY,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostBoundingBoxUv {
    pub min: Uv,
    pub max: Uv,
}

impl HostBoundingBoxUv {
    #[must_use]
    pub const fn new(min_u: f64, min_v: f64, max_u: f64, max_v: f64) -> Self {
        Self {
            min: Uv::new(min_u, min_v),
            max: Uv::new(max_u, max_v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostPolyLine {
    points: Vec<Xyz>,
}

impl HostPolyLine {
    pub fn create(points: Vec<Xyz>) -> Result<Self, HostError> {
        if points.len() < 2 {
            return Err(HostError::InvalidCurve {
                reason: format!("polyline needs at least 2 points, got {}", points.len()),
            });
        }
        Ok(Self { points })
    }

    #[must_use]
    pub fn coordinates(&self) -> &[Xyz] {
        &self.points
    }

    #[must_use]
    pub fn number_of_coordinates(&self) -> usize {
        self.points.len()
    }
}
