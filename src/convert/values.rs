//! Point, vector, plane, box and transform conversions.
//!
//! Decoding is total: every finite host value has a guest counterpart.
//! Encoding fails only where the host type carries an invariant the guest
//! value may break (orthonormal plane bases, rigid transforms, polylines with
//! fewer than two points).

use serde::{Deserialize, Serialize};

use super::error::{ConversionError, ConversionResult};
use super::options::ConversionOptions;
use crate::geom::{BBox, Plane, Point2, Point3, PolylineCurve, Transform, Vec2, Vec3};
use crate::host::{HostBoundingBoxXyz, HostPlane, HostPolyLine, HostTransform, Uv, Xyz};

/// Basis vectors of an encoded transform must be unit and orthogonal within this.
const RIGID_TOLERANCE: f64 = 1e-9;

/// Box spanned by `local` in the coordinate system of `plane`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    pub plane: Plane,
    pub local: BBox,
}

impl OrientedBox {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.local.is_valid()
    }

    /// World space corners, min corner first.
    #[must_use]
    pub fn corners(&self) -> [Point3; 8] {
        self.local
            .corners()
            .map(|c| self.plane.point_at_3d(c.x, c.y, c.z))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decode
// ─────────────────────────────────────────────────────────────────────────────

#[must_use]
pub fn decode_point(p: Xyz) -> Point3 {
    Point3::new(p.x, p.y, p.z)
}

#[must_use]
pub fn decode_point_with_options(p: Xyz, options: &ConversionOptions) -> Point3 {
    decode_point(p).scaled(options.scale_factor)
}

#[must_use]
pub fn decode_vector(v: Xyz) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[must_use]
pub fn decode_uv(uv: Uv) -> Point2 {
    Point2::new(uv.u, uv.v)
}

#[must_use]
pub fn decode_uv_vector(uv: Uv) -> Vec2 {
    Vec2::new(uv.u, uv.v)
}

#[must_use]
pub fn decode_plane(plane: &HostPlane) -> Plane {
    Plane {
        origin: decode_point(plane.origin),
        x_axis: decode_vector(plane.x_vec),
        y_axis: decode_vector(plane.y_vec),
        z_axis: decode_vector(plane.normal),
    }
}

/// Basis vectors become matrix columns, the origin the translation column.
#[must_use]
pub fn decode_transform(transform: &HostTransform) -> Transform {
    Transform::from_axes(
        decode_point(transform.origin),
        decode_vector(transform.basis_x),
        decode_vector(transform.basis_y),
        decode_vector(transform.basis_z),
    )
}

/// World aligned box around the transformed source box; [`BBox::NAN`] when the
/// source is disabled or inverted.
#[must_use]
pub fn decode_bbox(bbox: &HostBoundingBoxXyz) -> BBox {
    let local = BBox::new(decode_point(bbox.min), decode_point(bbox.max));
    if !bbox.enabled || !local.is_valid() {
        return BBox::NAN;
    }
    local.transform(decode_transform(&bbox.transform))
}

#[must_use]
pub fn decode_oriented_box(bbox: &HostBoundingBoxXyz) -> OrientedBox {
    let t = &bbox.transform;
    let plane = Plane {
        origin: decode_point(t.origin),
        x_axis: decode_vector(t.basis_x),
        y_axis: decode_vector(t.basis_y),
        z_axis: decode_vector(t.basis_z),
    };
    let local = if bbox.enabled {
        BBox::new(decode_point(bbox.min), decode_point(bbox.max))
    } else {
        BBox::NAN
    };
    OrientedBox { plane, local }
}

#[must_use]
pub fn decode_polyline(polyline: &HostPolyLine) -> PolylineCurve {
    PolylineCurve::new(polyline.coordinates().iter().map(|p| decode_point(*p)).collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Encode
// ─────────────────────────────────────────────────────────────────────────────

#[must_use]
pub fn encode_point(p: Point3) -> Xyz {
    Xyz::new(p.x, p.y, p.z)
}

#[must_use]
pub fn encode_point_with_options(p: Point3, options: &ConversionOptions) -> Xyz {
    encode_point(p.scaled(options.scale_factor))
}

#[must_use]
pub fn encode_vector(v: Vec3) -> Xyz {
    Xyz::new(v.x, v.y, v.z)
}

#[must_use]
pub fn encode_uv(p: Point2) -> Uv {
    Uv::new(p.x, p.y)
}

#[must_use]
pub fn encode_uv_vector(v: Vec2) -> Uv {
    Uv::new(v.x, v.y)
}

pub fn encode_plane(plane: &Plane) -> ConversionResult<HostPlane> {
    Ok(HostPlane::create_by_origin_and_basis(
        encode_point(plane.origin),
        encode_vector(plane.x_axis),
        encode_vector(plane.y_axis),
    )?)
}

/// Only rigid motions have a host counterpart.
pub fn encode_transform(transform: &Transform) -> ConversionResult<HostTransform> {
    if !transform.is_affine() {
        return Err(ConversionError::InvalidTransform {
            reason: "transform is not affine".into(),
        });
    }
    if !transform.is_rigid(RIGID_TOLERANCE) {
        return Err(ConversionError::InvalidTransform {
            reason: "transform basis is not orthonormal".into(),
        });
    }
    Ok(HostTransform {
        origin: encode_vector(transform.translation()),
        basis_x: encode_vector(transform.basis(0)),
        basis_y: encode_vector(transform.basis(1)),
        basis_z: encode_vector(transform.basis(2)),
    })
}

/// World aligned host box; disabled when `bbox` is not valid.
#[must_use]
pub fn encode_bbox(bbox: BBox) -> HostBoundingBoxXyz {
    HostBoundingBoxXyz {
        enabled: bbox.is_valid(),
        ..HostBoundingBoxXyz::new(encode_point(bbox.min), encode_point(bbox.max))
    }
}

pub fn encode_oriented_box(bbox: &OrientedBox) -> ConversionResult<HostBoundingBoxXyz> {
    let transform = encode_transform(&Transform::from_axes(
        bbox.plane.origin,
        bbox.plane.x_axis,
        bbox.plane.y_axis,
        bbox.plane.z_axis,
    ))?;
    Ok(HostBoundingBoxXyz {
        min: encode_point(bbox.local.min),
        max: encode_point(bbox.local.max),
        transform,
        enabled: bbox.is_valid(),
    })
}

pub fn encode_polyline(polyline: &PolylineCurve) -> ConversionResult<HostPolyLine> {
    Ok(HostPolyLine::create(
        polyline.points.iter().map(|p| encode_point(*p)).collect(),
    )?)
}
