//! Surface decoding and NURBS encoding.
//!
//! Every decoded surface covers the face's UV box, inflated by a length (or
//! angle) proportional to the caller's relative tolerance so that trims
//! pulled back later land inside the domain.

use super::curve::{decode_raw, geom_failed, pad_end_knots, strip_end_knots};
use super::error::{ConversionError, ConversionResult};
use super::options::{ConversionOptions, HostTolerances};
use super::values::{decode_point, decode_vector, encode_point};
use crate::geom::{
    Curve, Curve3, Direction, HPoint, Interval, LineCurve, NurbsCurve, NurbsSurface, Plane,
    PlaneSurface, RevSurface, SumSurface, Surface, Vec3,
};
use crate::host::{
    HostBoundingBoxUv, HostConicalSurface, HostCylindricalSurface, HostFace, HostHermiteSurface,
    HostNurbsSurface, HostPlane, HostRevolvedSurface, HostRuledSurface, HostSurface,
    HostTransform, Xyz,
};

/// Hermite patches are extended further than analytic surfaces.
const HERMITE_EXTENSION: f64 = 5.0;

/// Cones get a wider angular margin than cylinders and revolutions.
const CONE_ANGLE_EXTENSION: f64 = 10.0;

// ─────────────────────────────────────────────────────────────────────────────
// Decode
// ─────────────────────────────────────────────────────────────────────────────

/// Surface of `face` and whether the host surface matches its parametric
/// orientation. Callers transpose the surface when it does not.
pub fn decode_surface(face: &HostFace, relative_tolerance: f64) -> ConversionResult<(Surface, bool)> {
    decode_surface_with_options(face, relative_tolerance, &ConversionOptions::default())
}

pub fn decode_surface_with_options(
    face: &HostFace,
    relative_tolerance: f64,
    options: &ConversionOptions,
) -> ConversionResult<(Surface, bool)> {
    let surface = decode_surface_raw(face, relative_tolerance, &options.tolerances)?;
    let surface = if options.is_scaled() {
        surface.scaled(options.scale_factor)
    } else {
        surface
    };
    Ok((surface, face.surface.matches_parametric_orientation()))
}

pub(crate) fn decode_surface_raw(
    face: &HostFace,
    relative_tolerance: f64,
    tolerances: &HostTolerances,
) -> ConversionResult<Surface> {
    let uv = UvBox::of(&face.uv_box);
    let ctol = relative_tolerance * tolerances.short_curve;
    let atol = relative_tolerance * tolerances.angle;

    match &face.surface {
        HostSurface::Plane(plane) => decode_plane_surface(plane, uv, ctol).map(Surface::Plane),
        HostSurface::Cone(cone) => Ok(Surface::Revolution(decode_cone(
            cone,
            uv,
            ctol,
            atol * CONE_ANGLE_EXTENSION,
        ))),
        HostSurface::Cylinder(cylinder) => Ok(Surface::Revolution(decode_cylinder(cylinder, uv, ctol, atol))),
        HostSurface::Revolution(revolved) => decode_revolved(revolved, uv, ctol, atol, tolerances).map(Surface::Revolution),
        HostSurface::Ruled(ruled) if ruled.is_extruded() => decode_extruded(ruled, uv, ctol, tolerances).map(Surface::Sum),
        HostSurface::Ruled(ruled) => decode_ruled(ruled, uv, ctol, tolerances).map(Surface::Nurbs),
        HostSurface::Hermite(hermite) => {
            decode_hermite(hermite, uv, ctol * HERMITE_EXTENSION).map(Surface::Nurbs)
        }
        HostSurface::Nurbs(nurbs) => decode_nurbs_surface(nurbs).map(Surface::Nurbs),
    }
}

#[derive(Debug, Clone, Copy)]
struct UvBox {
    u: Interval,
    v: Interval,
}

impl UvBox {
    fn of(bbox: &HostBoundingBoxUv) -> Self {
        Self {
            u: Interval::new(bbox.min.u, bbox.max.u),
            v: Interval::new(bbox.min.v, bbox.max.v),
        }
    }
}

fn frame_plane(origin: Xyz, x: Xyz, y: Xyz) -> ConversionResult<Plane> {
    Plane::new(decode_point(origin), decode_vector(x), decode_vector(y))
        .ok_or_else(|| ConversionError::failed("surface frame is degenerate"))
}

fn decode_plane_surface(plane: &HostPlane, uv: UvBox, ctol: f64) -> ConversionResult<PlaneSurface> {
    Ok(PlaneSurface {
        plane: frame_plane(plane.origin, plane.x_vec, plane.y_vec)?,
        u: uv.u.inflated(ctol),
        v: uv.v.inflated(ctol),
    })
}

/// Ruling through the apex, revolved about the frame normal.
fn decode_cone(cone: &HostConicalSurface, uv: UvBox, ctol: f64, atol: f64) -> RevSurface {
    let v = uv.v.inflated(ctol);
    let origin = decode_point(cone.origin);
    let x = decode_vector(cone.x_dir);
    let dir = (decode_vector(cone.axis) + x * cone.half_angle.tan())
        .normalized()
        .unwrap_or(x);
    RevSurface {
        profile: Curve::Line(LineCurve::new(origin + dir * v.t0, origin + dir * v.t1, v)),
        axis_origin: origin,
        axis_direction: frame_normal(cone.x_dir, cone.y_dir),
        angle: uv.u.inflated(atol),
        transposed: false,
    }
}

fn decode_cylinder(cylinder: &HostCylindricalSurface, uv: UvBox, ctol: f64, atol: f64) -> RevSurface {
    let v = uv.v.inflated(ctol);
    let origin = decode_point(cylinder.origin);
    let foot = origin + decode_vector(cylinder.x_dir) * cylinder.radius;
    let axis = decode_vector(cylinder.axis);
    RevSurface {
        profile: Curve::Line(LineCurve::new(foot + axis * v.t0, foot + axis * v.t1, v)),
        axis_origin: origin,
        axis_direction: frame_normal(cylinder.x_dir, cylinder.y_dir),
        angle: uv.u.inflated(atol),
        transposed: false,
    }
}

/// The profile is stored in frame coordinates; it is moved to world space
/// before decoding.
fn decode_revolved(
    revolved: &HostRevolvedSurface,
    uv: UvBox,
    ctol: f64,
    atol: f64,
    tolerances: &HostTolerances,
) -> ConversionResult<RevSurface> {
    let frame = HostTransform {
        origin: revolved.origin,
        basis_x: revolved.x_dir,
        basis_y: revolved.y_dir,
        basis_z: revolved.axis,
    };
    let profile = decode_raw(&revolved.profile.create_transformed(&frame), tolerances)?;
    let profile = if ctol > 0.0 {
        extended_by_length(&profile, ctol).unwrap_or(profile)
    } else {
        profile
    };
    Ok(RevSurface {
        profile,
        axis_origin: decode_point(revolved.origin),
        axis_direction: frame_normal(revolved.x_dir, revolved.y_dir),
        angle: uv.u.inflated(atol),
        transposed: false,
    })
}

fn frame_normal(x: Xyz, y: Xyz) -> Vec3 {
    let n = decode_vector(x).cross(decode_vector(y));
    n.normalized().unwrap_or(Vec3::Z)
}

/// A translated profile becomes the sum of the first rail and the straight
/// path between the rail starts.
fn decode_extruded(
    ruled: &HostRuledSurface,
    uv: UvBox,
    ctol: f64,
    tolerances: &HostTolerances,
) -> ConversionResult<SumSurface> {
    let (Some(first), Some(second)) = (ruled.curve(0), ruled.curve(1)) else {
        return Err(ConversionError::failed("extruded surface needs two profiles"));
    };
    let (Some(c0), Some(c1)) = (first.evaluate_normalized(0.0), second.evaluate_normalized(0.0)) else {
        return Err(ConversionError::failed("extruded surface profiles are unbound"));
    };
    let (c0, c1) = (decode_point(c0), decode_point(c1));
    let axis_at = |v: f64| c0 + (c1 - c0) * v;

    let rail = decode_raw(first, tolerances)?
        .with_domain(Interval::UNIT)
        .ok_or_else(|| ConversionError::failed("extruded profile has an empty domain"))?;
    let speed = rail.derivative_at(Interval::UNIT.mid()).length();
    let u_margin = if speed > 0.0 { ctol / speed } else { 0.0 };
    let curve_u = fitted(&rail, uv.u.inflated(u_margin))
        .ok_or_else(|| ConversionError::failed("extruded profile could not be fitted to the face"))?;

    let offset = (c1 - c0).length();
    let v_margin = if offset > 0.0 { ctol / offset } else { 0.0 };
    let v = uv.v.inflated(v_margin);
    let curve_v = Curve::Line(LineCurve::new(axis_at(v.t0), axis_at(v.t1), v));

    Ok(SumSurface {
        curve_u,
        curve_v,
        base: c0,
    })
}

/// Straight ruling between the two rails, a point rail collapsing to a
/// degenerate curve. `u` runs along the rails, as on the host. Both
/// directions are grown by about `ctol` beyond the UV box.
fn decode_ruled(
    ruled: &HostRuledSurface,
    uv: UvBox,
    ctol: f64,
    tolerances: &HostTolerances,
) -> ConversionResult<NurbsSurface> {
    let rail = |index: usize| -> ConversionResult<NurbsCurve> {
        if let Some(curve) = ruled.curve(index) {
            return decode_raw(curve, tolerances)?
                .with_domain(Interval::UNIT)
                .and_then(|c| c.to_nurbs())
                .ok_or_else(|| ConversionError::failed("ruled profile has no NURBS form"));
        }
        let point = ruled
            .point(index)
            .ok_or_else(|| ConversionError::failed("ruled surface side has neither curve nor point"))?;
        Ok(NurbsCurve::degenerate(decode_point(point), Interval::UNIT))
    };

    let (a, b) = (rail(0)?, rail(1)?);
    let surface = NurbsSurface::ruled(&a, &b)
        .ok_or_else(|| ConversionError::failed("ruled surface rails are incompatible"))?;

    let (u, v) = if ctol > 0.0 {
        let speed = [&a, &b]
            .into_iter()
            .flat_map(|rail| [0.0, 1.0].map(|t| rail.derivative_at(t).length()))
            .fold(0.0, f64::max);
        let ruling = a.point_at(0.5).distance_to(b.point_at(0.5));
        let margin = |length: f64| if length > 0.0 { ctol / length } else { 0.0 };
        (uv.u.inflated(margin(speed)), uv.v.inflated(margin(ruling)))
    } else {
        (uv.u, uv.v)
    };
    let surface = surface.extended(Direction::U, u).unwrap_or(surface);
    Ok(surface.extended(Direction::V, v).unwrap_or(surface))
}

/// Exported NURBS data wins; otherwise the Hermite nodes are turned into a
/// grid of bicubic Bézier patches. Either way the result is cut to the UV box
/// and grown by `extension`.
fn decode_hermite(hermite: &HostHermiteSurface, uv: UvBox, extension: f64) -> ConversionResult<NurbsSurface> {
    let surface = match &hermite.exported {
        Some(exported) => decode_nurbs_surface(exported)?,
        None => hermite_patches(hermite)?,
    };

    let trimmed = surface
        .trimmed(Direction::U, uv.u)
        .and_then(|s| s.trimmed(Direction::V, uv.v))
        .unwrap_or(surface);
    if extension <= 0.0 {
        return Ok(trimmed);
    }
    let grown = trimmed
        .extended(Direction::U, uv.u.inflated(extension))
        .unwrap_or(trimmed);
    Ok(grown
        .extended(Direction::V, uv.v.inflated(extension))
        .unwrap_or(grown))
}

/// Bicubic, C1 across patch borders. Control row `3i + a` belongs to node `i`
/// with `a` in `-1..=1` stepping one third of the neighbouring span along the
/// node tangent.
pub(crate) fn hermite_patches(hermite: &HostHermiteSurface) -> ConversionResult<NurbsSurface> {
    let (pu, pv) = (&hermite.params_u, &hermite.params_v);
    let (nu, nv) = (pu.len(), pv.len());
    if nu < 2 || nv < 2 {
        return Err(ConversionError::failed("hermite surface data is unavailable"));
    }
    let node = |i: usize, j: usize| j * nu + i;
    let step = |params: &[f64], i: usize, a: isize| match a {
        -1 => params[i] - params[i - 1],
        1 => params[i + 1] - params[i],
        _ => 0.0,
    };

    let (count_u, count_v) = (3 * (nu - 1) + 1, 3 * (nv - 1) + 1);
    let mut points = Vec::with_capacity(count_u * count_v);
    for cu in 0..count_u {
        let (i, a) = split_row(cu);
        let hu = step(pu, i, a);
        for cv in 0..count_v {
            let (j, b) = split_row(cv);
            let hv = step(pv, j, b);
            let k = node(i, j);
            let (su, sv) = (a as f64 * hu / 3.0, b as f64 * hv / 3.0);
            let p = decode_point(hermite.points[k])
                + decode_vector(hermite.tangents_u[k]) * su
                + decode_vector(hermite.tangents_v[k]) * sv
                + decode_vector(hermite.mixed_derivs[k]) * (su * sv);
            points.push(HPoint::from_point(p, 1.0));
        }
    }

    let knots = |params: &[f64]| params.iter().flat_map(|t| [*t; 3]).collect::<Vec<_>>();
    NurbsSurface::new(3, 3, count_u, count_v, points, knots(pu), knots(pv)).map_err(geom_failed)
}

/// Node index and side of control row `row`.
fn split_row(row: usize) -> (usize, isize) {
    match row % 3 {
        0 => (row / 3, 0),
        1 => (row / 3, 1),
        _ => (row / 3 + 1, -1),
    }
}

pub(crate) fn decode_nurbs_surface(nurbs: &HostNurbsSurface) -> ConversionResult<NurbsSurface> {
    let weights = nurbs.weights();
    let points = nurbs
        .control_points()
        .iter()
        .enumerate()
        .map(|(i, p)| HPoint::from_point(decode_point(*p), weights.get(i).copied().unwrap_or(1.0)))
        .collect();
    NurbsSurface::new(
        nurbs.degree_u(),
        nurbs.degree_v(),
        nurbs.count_u(),
        nurbs.count_v(),
        points,
        strip_end_knots(nurbs.knots_u()),
        strip_end_knots(nurbs.knots_v()),
    )
    .map_err(geom_failed)
}

/// `curve` restricted or extended so its domain is `interval`.
pub(crate) fn fitted(curve: &Curve, interval: Interval) -> Option<Curve> {
    if let Curve::Line(line) = curve {
        return Some(Curve::Line(LineCurve::new(
            line.point_at(interval.t0),
            line.point_at(interval.t1),
            interval,
        )));
    }
    let domain = curve.domain();
    if interval.t0 >= domain.t0 && interval.t1 <= domain.t1 {
        return curve.trimmed(interval);
    }
    let extended = curve.to_nurbs()?.extended(interval)?;
    extended.trimmed(interval).map(Curve::Nurbs)
}

/// Grows both ends of `curve` by about `length`.
fn extended_by_length(curve: &Curve, length: f64) -> Option<Curve> {
    let domain = curve.domain();
    let margin = |t: f64| {
        let speed = curve.derivative_at(t).length();
        if speed > 0.0 { length / speed } else { 0.0 }
    };
    fitted(
        curve,
        Interval::new(domain.t0 - margin(domain.t0), domain.t1 + margin(domain.t1)),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Encode
// ─────────────────────────────────────────────────────────────────────────────

/// NURBS form of `surface`; the host builder accepts nothing else.
pub fn encode_surface(surface: &Surface) -> ConversionResult<HostNurbsSurface> {
    encode_surface_with_options(surface, &ConversionOptions::default())
}

pub fn encode_surface_with_options(surface: &Surface, options: &ConversionOptions) -> ConversionResult<HostNurbsSurface> {
    if options.is_scaled() {
        encode_surface_raw(&surface.scaled(options.scale_factor))
    } else {
        encode_surface_raw(surface)
    }
}

pub(crate) fn encode_surface_raw(surface: &Surface) -> ConversionResult<HostNurbsSurface> {
    let nurbs = surface
        .to_nurbs()
        .ok_or_else(|| ConversionError::failed(format!("{} has no NURBS form", surface.kind_name())))?;
    encode_nurbs_surface(&nurbs)
}

pub(crate) fn encode_nurbs_surface(nurbs: &NurbsSurface) -> ConversionResult<HostNurbsSurface> {
    let points = nurbs.points().iter().map(|p| encode_point(p.euclidean())).collect();
    let weights = nurbs
        .is_rational()
        .then(|| nurbs.points().iter().map(|p| p.w).collect());
    Ok(HostNurbsSurface::create(
        nurbs.degree(Direction::U),
        nurbs.degree(Direction::V),
        pad_end_knots(nurbs.knots(Direction::U)),
        pad_end_knots(nurbs.knots(Direction::V)),
        points,
        weights,
    )?)
}
