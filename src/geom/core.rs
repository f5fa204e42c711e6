use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit vector along the X axis.
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    /// Unit vector along the Y axis.
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    /// Unit vector along the Z axis.
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub const fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len.is_finite() && len > 0.0 {
            Some(Self::new(self.x / len, self.y / len, self.z / len))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn mul_scalar(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    #[must_use]
    pub const fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    #[must_use]
    pub const fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    #[must_use]
    pub const fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Parallel test with the kernel convention: `+1` parallel, `-1` anti-parallel,
    /// `0` when either vector is degenerate or the angle exceeds `angle_tolerance`.
    #[must_use]
    pub fn is_parallel_to(self, other: Self, angle_tolerance: f64) -> i32 {
        let (Some(a), Some(b)) = (self.normalized(), other.normalized()) else {
            return 0;
        };
        let cos = a.dot(b);
        let limit = angle_tolerance.cos();
        if cos >= limit {
            1
        } else if cos <= -limit {
            -1
        } else {
            0
        }
    }

    /// Any unit vector perpendicular to `self`.
    #[must_use]
    pub fn perpendicular(self) -> Option<Self> {
        let n = self.normalized()?;
        let reference = if n.x.abs() < 0.9 { Self::X } else { Self::Y };
        n.cross(reference).normalized()
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::add(self, rhs)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::sub(self, rhs)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        self.mul_scalar(rhs)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Self::Output {
        rhs.mul_scalar(self)
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::neg(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// The origin point (0, 0, 0).
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    /// Sentinel used for "no point" (all components NaN).
    pub const UNSET: Self = Self::new(f64::NAN, f64::NAN, f64::NAN);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Convert point to a position vector from the origin.
    #[must_use]
    pub const fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    #[must_use]
    pub const fn add_vec(self, v: Vec3) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }

    #[must_use]
    pub const fn sub_vec(self, v: Vec3) -> Self {
        Self::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }

    #[must_use]
    pub const fn sub_point(self, rhs: Self) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    /// Linear interpolation between two points.
    /// Returns `self * (1 - t) + rhs * t`.
    #[must_use]
    pub fn lerp(self, rhs: Self, t: f64) -> Self {
        Self::new(
            self.x + (rhs.x - self.x) * t,
            self.y + (rhs.y - self.y) * t,
            self.z + (rhs.z - self.z) * t,
        )
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        self.sub_point(other).length()
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared_to(self, other: Self) -> f64 {
        self.sub_point(other).length_squared()
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[must_use]
    pub fn epsilon_equals(self, other: Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }

    #[must_use]
    pub const fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl Default for Point3 {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl From<Vec3> for Point3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Point3> for Vec3 {
    fn from(p: Point3) -> Self {
        p.to_vec3()
    }
}

impl Add<Vec3> for Point3 {
    type Output = Self;
    fn add(self, rhs: Vec3) -> Self::Output {
        self.add_vec(rhs)
    }
}

impl Sub<Vec3> for Point3 {
    type Output = Self;
    fn sub(self, rhs: Vec3) -> Self::Output {
        self.sub_vec(rhs)
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_point(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point2 / Vec2
// ─────────────────────────────────────────────────────────────────────────────

/// A point in a surface parameter space (or any 2D plane).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn lerp(self, rhs: Self, t: f64) -> Self {
        Self::new(self.x + (rhs.x - self.x) * t, self.y + (rhs.y - self.y) * t)
    }

    #[must_use]
    pub fn midpoint(self, rhs: Self) -> Self {
        self.lerp(rhs, 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Sub for Point2 {
    type Output = Vec2;
    fn sub(self, rhs: Self) -> Self::Output {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vec2> for Point2 {
    type Output = Self;
    fn add(self, rhs: Vec2) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Interval
// ─────────────────────────────────────────────────────────────────────────────

/// A parameter interval `[t0, t1]`. `t0 > t1` is allowed and means "decreasing".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub t0: f64,
    pub t1: f64,
}

impl Interval {
    pub const UNIT: Self = Self::new(0.0, 1.0);

    #[must_use]
    pub const fn new(t0: f64, t1: f64) -> Self {
        Self { t0, t1 }
    }

    #[must_use]
    pub fn min(self) -> f64 {
        self.t0.min(self.t1)
    }

    #[must_use]
    pub fn max(self) -> f64 {
        self.t0.max(self.t1)
    }

    #[must_use]
    pub fn mid(self) -> f64 {
        0.5 * (self.t0 + self.t1)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.t1 - self.t0
    }

    #[must_use]
    pub fn is_increasing(self) -> bool {
        self.t0 < self.t1 && self.t0.is_finite() && self.t1.is_finite()
    }

    /// Parameter at normalized position `s` (0 → t0, 1 → t1).
    #[must_use]
    pub fn parameter_at(self, s: f64) -> f64 {
        self.t0 + (self.t1 - self.t0) * s
    }

    /// Normalized position of `t` (t0 → 0, t1 → 1).
    #[must_use]
    pub fn normalized_parameter_at(self, t: f64) -> f64 {
        let len = self.length();
        if len == 0.0 { 0.0 } else { (t - self.t0) / len }
    }

    #[must_use]
    pub fn includes(self, t: f64, tolerance: f64) -> bool {
        t >= self.min() - tolerance && t <= self.max() + tolerance
    }

    #[must_use]
    pub fn clamp(self, t: f64) -> f64 {
        t.clamp(self.min(), self.max())
    }

    #[must_use]
    pub fn inflated(self, amount: f64) -> Self {
        Self::new(self.t0 - amount, self.t1 + amount)
    }

    #[must_use]
    pub fn swapped(self) -> Self {
        Self::new(self.t1, self.t0)
    }

    /// `[a, b]` becomes `[-b, -a]`, the domain of a reversed curve.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self::new(-self.t1, -self.t0)
    }

    #[must_use]
    pub fn epsilon_equals(self, other: Self, epsilon: f64) -> bool {
        (self.t0 - other.t0).abs() <= epsilon && (self.t1 - other.t1).abs() <= epsilon
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plane
// ─────────────────────────────────────────────────────────────────────────────

/// An oriented plane: origin plus an orthonormal frame whose z axis is the normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
}

impl Plane {
    pub const WORLD_XY: Self = Self {
        origin: Point3::ORIGIN,
        x_axis: Vec3::X,
        y_axis: Vec3::Y,
        z_axis: Vec3::Z,
    };

    /// Builds a plane from an origin and two in-plane directions.
    /// The y direction is re-orthogonalized against x.
    #[must_use]
    pub fn new(origin: Point3, x_direction: Vec3, y_direction: Vec3) -> Option<Self> {
        let x_axis = x_direction.normalized()?;
        let z_axis = x_direction.cross(y_direction).normalized()?;
        let y_axis = z_axis.cross(x_axis).normalized()?;
        Some(Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    /// Builds a plane from an origin and normal with an arbitrary x axis.
    #[must_use]
    pub fn from_normal(origin: Point3, normal: Vec3) -> Option<Self> {
        let z_axis = normal.normalized()?;
        let x_axis = z_axis.perpendicular()?;
        let y_axis = z_axis.cross(x_axis);
        Some(Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    #[must_use]
    pub fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.origin + self.x_axis * u + self.y_axis * v
    }

    #[must_use]
    pub fn point_at_3d(&self, u: f64, v: f64, w: f64) -> Point3 {
        self.origin + self.x_axis * u + self.y_axis * v + self.z_axis * w
    }

    /// Plane coordinates `(u, v, w)` of a world point.
    #[must_use]
    pub fn coordinates_of(&self, p: Point3) -> (f64, f64, f64) {
        let d = p - self.origin;
        (d.dot(self.x_axis), d.dot(self.y_axis), d.dot(self.z_axis))
    }

    /// Same plane with the x and y axes swapped (the normal flips).
    #[must_use]
    pub fn transposed(&self) -> Self {
        Self {
            origin: self.origin,
            x_axis: self.y_axis,
            y_axis: self.x_axis,
            z_axis: -self.z_axis,
        }
    }

    /// Rotates the x/y axes about the normal by `angle`.
    #[must_use]
    pub fn rotated(&self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            origin: self.origin,
            x_axis: self.x_axis * c + self.y_axis * s,
            y_axis: self.y_axis * c - self.x_axis * s,
            z_axis: self.z_axis,
        }
    }

    #[must_use]
    pub fn transform(&self, t: &Transform) -> Self {
        let origin = t.apply_point(self.origin);
        let x = t.apply_vec(self.x_axis);
        let y = t.apply_vec(self.y_axis);
        Self::new(origin, x, y).unwrap_or(*self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transform
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    m: [[f64; 4]; 4],
}

impl Transform {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Builds a transform from a raw row-major matrix.
    #[must_use]
    pub const fn from_matrix(m: [[f64; 4]; 4]) -> Self {
        Self { m }
    }

    /// Construct a transform from origin and three basis axes (stored as columns).
    #[must_use]
    pub fn from_axes(origin: Point3, x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Self {
        Self {
            m: [
                [x_axis.x, y_axis.x, z_axis.x, origin.x],
                [x_axis.y, y_axis.y, z_axis.y, origin.y],
                [x_axis.z, y_axis.z, z_axis.z, origin.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Maps `Plane::WORLD_XY` onto `plane`.
    #[must_use]
    pub fn plane_to_plane(plane: &Plane) -> Self {
        Self::from_axes(plane.origin, plane.x_axis, plane.y_axis, plane.z_axis)
    }

    #[must_use]
    pub const fn translate(offset: Vec3) -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, offset.x],
                [0.0, 1.0, 0.0, offset.y],
                [0.0, 0.0, 1.0, offset.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    #[must_use]
    pub fn uniform_scale(s: f64) -> Self {
        Self {
            m: [
                [s, 0.0, 0.0, 0.0],
                [0.0, s, 0.0, 0.0],
                [0.0, 0.0, s, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation of `angle` radians about the line through `center` along `axis`.
    #[must_use]
    pub fn rotation(angle: f64, axis: Vec3, center: Point3) -> Option<Self> {
        let a = axis.normalized()?;
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let r = [
            [t * a.x * a.x + c, t * a.x * a.y - s * a.z, t * a.x * a.z + s * a.y],
            [t * a.x * a.y + s * a.z, t * a.y * a.y + c, t * a.y * a.z - s * a.x],
            [t * a.x * a.z - s * a.y, t * a.y * a.z + s * a.x, t * a.z * a.z + c],
        ];
        let mut m = [[0.0; 4]; 4];
        for i in 0..3 {
            m[i][..3].copy_from_slice(&r[i]);
            let rc = r[i][0] * center.x + r[i][1] * center.y + r[i][2] * center.z;
            let ci = [center.x, center.y, center.z][i];
            m[i][3] = ci - rc;
        }
        m[3][3] = 1.0;
        Some(Self { m })
    }

    #[must_use]
    pub fn compose(self, other: Self) -> Self {
        let mut result = Self::identity();
        for i in 0..4 {
            for j in 0..4 {
                result.m[i][j] = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j]
                    + self.m[i][3] * other.m[3][j];
            }
        }
        result
    }

    /// Basis column `index` (0 = x, 1 = y, 2 = z).
    #[must_use]
    pub fn basis(self, index: usize) -> Vec3 {
        Vec3::new(self.m[0][index], self.m[1][index], self.m[2][index])
    }

    /// Get the translation component of this transform.
    #[must_use]
    pub fn translation(self) -> Vec3 {
        Vec3::new(self.m[0][3], self.m[1][3], self.m[2][3])
    }

    /// True when the bottom row is `[0, 0, 0, 1]` and every entry is finite.
    #[must_use]
    pub fn is_affine(self) -> bool {
        self.m.iter().flatten().all(|v| v.is_finite())
            && self.m[3][0] == 0.0
            && self.m[3][1] == 0.0
            && self.m[3][2] == 0.0
            && self.m[3][3] == 1.0
    }

    /// True when affine and the basis is orthonormal within `tolerance`.
    #[must_use]
    pub fn is_rigid(self, tolerance: f64) -> bool {
        if !self.is_affine() {
            return false;
        }
        let (x, y, z) = (self.basis(0), self.basis(1), self.basis(2));
        (x.length() - 1.0).abs() <= tolerance
            && (y.length() - 1.0).abs() <= tolerance
            && (z.length() - 1.0).abs() <= tolerance
            && x.dot(y).abs() <= tolerance
            && y.dot(z).abs() <= tolerance
            && z.dot(x).abs() <= tolerance
    }

    #[must_use]
    pub fn apply_point(self, p: Point3) -> Point3 {
        let x = self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2] * p.z + self.m[0][3];
        let y = self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2] * p.z + self.m[1][3];
        let z = self.m[2][0] * p.x + self.m[2][1] * p.y + self.m[2][2] * p.z + self.m[2][3];
        Point3::new(x, y, z)
    }

    #[must_use]
    pub fn apply_vec(self, v: Vec3) -> Vec3 {
        let x = self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z;
        let y = self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z;
        let z = self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z;
        Vec3::new(x, y, z)
    }

    /// Access the raw 4x4 matrix data.
    #[must_use]
    pub const fn as_matrix(&self) -> &[[f64; 4]; 4] {
        &self.m
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Transform {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BBox
// ─────────────────────────────────────────────────────────────────────────────

/// Axis-aligned box. [`BBox::EMPTY`] (min > max) is the "unset" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point3,
    pub max: Point3,
}

impl BBox {
    pub const EMPTY: Self = Self {
        min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
        max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    /// NaN box returned for disabled sources.
    pub const NAN: Self = Self {
        min: Point3::UNSET,
        max: Point3::UNSET,
    };

    #[must_use]
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn from_points(points: &[Point3]) -> Self {
        points
            .iter()
            .fold(Self::EMPTY, |acc, &p| acc.expand_point(p))
    }

    /// True when min/max are finite and min <= max on every axis.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.min.is_valid()
            && self.max.is_valid()
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.z <= self.max.z
    }

    #[must_use]
    pub fn center(self) -> Point3 {
        self.min.lerp(self.max, 0.5)
    }

    /// Diagonal length of the bounding box.
    #[must_use]
    pub fn diagonal(self) -> f64 {
        if self.is_valid() {
            self.max.sub_point(self.min).length()
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn expand_point(self, p: Point3) -> Self {
        Self::new(
            Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        )
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if !other.is_valid() {
            return self;
        }
        if !self.is_valid() {
            return other;
        }
        self.expand_point(other.min).expand_point(other.max)
    }

    /// Eight corners, min corner first.
    #[must_use]
    pub fn corners(self) -> [Point3; 8] {
        [
            Point3::new(self.min.x, self.min.y, self.min.z),
            Point3::new(self.max.x, self.min.y, self.min.z),
            Point3::new(self.min.x, self.max.y, self.min.z),
            Point3::new(self.max.x, self.max.y, self.min.z),
            Point3::new(self.min.x, self.min.y, self.max.z),
            Point3::new(self.max.x, self.min.y, self.max.z),
            Point3::new(self.min.x, self.max.y, self.max.z),
            Point3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Apply a transform to this bounding box.
    /// Note: this computes the axis-aligned bounding box of the transformed corners.
    #[must_use]
    pub fn transform(self, t: Transform) -> Self {
        if !self.is_valid() {
            return self;
        }
        let corners = self.corners().map(|c| t.apply_point(c));
        Self::from_points(&corners)
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Tolerance configuration for numeric kernels.
///
/// - `Tolerance::default_geom()` - General geometry comparisons (1e-9)
/// - `Tolerance::ZERO_LENGTH` - Detecting degenerate/zero-length vectors (1e-12)
/// - `Tolerance::DERIVATIVE` - First derivative numerical step size (1e-6)
/// - `Tolerance::KNOT` - Knot value comparisons (1e-12, relative to the domain span)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    /// Default geometric tolerance (1e-9).
    pub const DEFAULT: Self = Self { eps: 1e-9 };

    /// Tolerance for detecting zero-length/degenerate vectors and edges (1e-12).
    pub const ZERO_LENGTH: Self = Self { eps: 1e-12 };

    /// Step size for numerical differentiation (1e-6).
    /// Use this as a multiplier for domain span when computing first derivatives.
    pub const DERIVATIVE: Self = Self { eps: 1e-6 };

    /// Knot comparisons, relative to the domain span.
    pub const KNOT: Self = Self { eps: 1e-12 };

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    #[must_use]
    pub const fn default_geom() -> Self {
        Self::DEFAULT
    }

    /// Create tolerance relative to a span/domain size.
    #[must_use]
    pub fn relative_to(self, span: f64) -> f64 {
        self.eps * span.abs().max(1.0)
    }

    #[must_use]
    pub fn approx_eq_f64(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eps
    }

    #[must_use]
    pub fn approx_eq_point3(self, a: Point3, b: Point3) -> bool {
        a.sub_point(b).length_squared() <= self.eps * self.eps
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
