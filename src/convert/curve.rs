//! Curve decoding and encoding.
//!
//! Decoded curves keep the host parameter range as their domain, so
//! evaluating either side at the same `t` gives the same point. Host splines
//! carry `count + degree + 1` clamped knots; the guest drops the outermost
//! knot at each end.

use std::f64::consts::{FRAC_PI_8, TAU};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::error::{ConversionError, ConversionResult};
use super::options::{ConversionOptions, HostTolerances};
use super::values::{decode_point, decode_vector, encode_point, encode_vector};
use crate::geom::{
    ArcCurve, Curve, Curve3, GeomError, HPoint, Interval, LineCurve, NurbsCurve, Plane, Point3,
    PolylineCurve,
};
use crate::host::{
    HostArc, HostCurve, HostEllipse, HostHermiteSpline, HostLine, HostNurbSpline, HostPlane,
};

/// Half length of the segment an unbound line decodes to.
pub const UNBOUND_LINE_EXTENT: f64 = 15_000.0;

/// Largest angular step between the Hermite nodes sampled from a helix.
const HELIX_STEP: f64 = FRAC_PI_8;

pub(crate) fn geom_failed(err: GeomError) -> ConversionError {
    ConversionError::failed(err.to_string())
}

/// Guest knots from host knots: the first and the last entry are dropped.
#[must_use]
pub fn strip_end_knots(knots: &[f64]) -> Vec<f64> {
    knots
        .get(1..knots.len().saturating_sub(1))
        .map(<[f64]>::to_vec)
        .unwrap_or_default()
}

/// Host knots from guest knots: each end is repeated once more.
#[must_use]
pub fn pad_end_knots(knots: &[f64]) -> Vec<f64> {
    let (Some(&first), Some(&last)) = (knots.first(), knots.last()) else {
        return Vec::new();
    };
    let mut padded = Vec::with_capacity(knots.len() + 2);
    padded.push(first);
    padded.extend_from_slice(knots);
    padded.push(last);
    padded
}

// ─────────────────────────────────────────────────────────────────────────────
// Decode
// ─────────────────────────────────────────────────────────────────────────────

pub fn decode_curve(curve: &HostCurve) -> ConversionResult<Curve> {
    decode_curve_with_options(curve, &ConversionOptions::default())
}

pub fn decode_curve_with_options(curve: &HostCurve, options: &ConversionOptions) -> ConversionResult<Curve> {
    let decoded = decode_raw(curve, &options.tolerances)?;
    Ok(if options.is_scaled() {
        decoded.scaled(options.scale_factor)
    } else {
        decoded
    })
}

/// Decodes `curves` independently, on the rayon pool with the `parallel`
/// feature.
pub fn decode_curves(curves: &[HostCurve], options: &ConversionOptions) -> Vec<ConversionResult<Curve>> {
    cfg_if::cfg_if! {
        if #[cfg(feature = "parallel")] {
            curves
                .par_iter()
                .map(|c| decode_curve_with_options(c, options))
                .collect()
        } else {
            curves
                .iter()
                .map(|c| decode_curve_with_options(c, options))
                .collect()
        }
    }
}

/// Decoding in host units.
pub(crate) fn decode_raw(curve: &HostCurve, tolerances: &HostTolerances) -> ConversionResult<Curve> {
    match curve {
        HostCurve::Line(line) => Ok(Curve::Line(decode_line(line, curve))),
        HostCurve::Arc(arc) => decode_arc(arc, curve).map(Curve::Arc),
        HostCurve::Ellipse(ellipse) => decode_ellipse(ellipse, curve, tolerances).map(Curve::Nurbs),
        HostCurve::NurbSpline(spline) => decode_nurb_spline(spline).map(Curve::Nurbs),
        HostCurve::HermiteSpline(spline) => decode_hermite_spline(spline).map(Curve::Nurbs),
        HostCurve::CylindricalHelix(_) => decode_helix(curve).map(Curve::Nurbs),
    }
}

fn decode_line(line: &HostLine, curve: &HostCurve) -> LineCurve {
    if let Some([t0, t1]) = curve.parameter_range() {
        return LineCurve::new(
            decode_point(curve.evaluate(t0)),
            decode_point(curve.evaluate(t1)),
            Interval::new(t0, t1),
        );
    }
    let origin = decode_point(line.origin());
    let direction = decode_vector(line.direction());
    LineCurve::new(
        origin - direction * UNBOUND_LINE_EXTENT,
        origin + direction * UNBOUND_LINE_EXTENT,
        Interval::new(-UNBOUND_LINE_EXTENT, UNBOUND_LINE_EXTENT),
    )
}

fn decode_arc(arc: &HostArc, curve: &HostCurve) -> ConversionResult<ArcCurve> {
    if !curve.is_bound() {
        let plane = Plane::new(
            decode_point(arc.center()),
            decode_vector(arc.x_direction()),
            decode_vector(arc.y_direction()),
        )
        .ok_or_else(|| ConversionError::failed("circle axes are degenerate"))?;
        return Ok(ArcCurve::circle(plane, arc.radius()));
    }

    let (Some([t0, t1]), Some(mid)) = (curve.parameter_range(), curve.evaluate_normalized(0.5)) else {
        return Err(ConversionError::failed("arc has no parameter range"));
    };
    let shape = ArcCurve::from_three_points(
        decode_point(curve.evaluate(t0)),
        decode_point(mid),
        decode_point(curve.evaluate(t1)),
    )
    .ok_or_else(|| ConversionError::failed("arc points are collinear"))?;
    Ok(ArcCurve {
        domain: Interval::new(t0, t1),
        ..shape
    })
}

/// The closed NURBS ellipse is re-seamed at the source start point before
/// trimming, so the kept part never wraps across the old seam.
fn decode_ellipse(
    ellipse: &HostEllipse,
    curve: &HostCurve,
    tolerances: &HostTolerances,
) -> ConversionResult<NurbsCurve> {
    let plane = Plane::new(
        decode_point(ellipse.center()),
        decode_vector(ellipse.x_direction()),
        decode_vector(ellipse.y_direction()),
    )
    .ok_or_else(|| ConversionError::failed("ellipse axes are degenerate"))?;
    let closed = NurbsCurve::ellipse(&plane, ellipse.radius_x(), ellipse.radius_y());
    if !curve.is_bound() {
        return Ok(closed);
    }

    let (Some([t0, t1]), Some(start), Some(end)) =
        (curve.parameter_range(), curve.end_point(0), curve.end_point(1))
    else {
        return Err(ConversionError::failed("ellipse has no parameter range"));
    };

    let period = closed.domain().length();
    let param0 = closed.closest_point(decode_point(start));
    let seamed = closed
        .change_closed_seam(param0, tolerances.vertex)
        .or_else(|| closed.with_domain(Interval::new(param0, param0 + period)))
        .ok_or_else(|| ConversionError::failed("ellipse seam could not be moved"))?;

    let seam_domain = seamed.domain();
    let mut param1 = seamed.closest_point(decode_point(end));
    if param1 <= seam_domain.t0 + period * 1e-9 {
        param1 = seam_domain.t1;
    }
    seamed
        .trimmed(Interval::new(seam_domain.t0, param1))
        .and_then(|arc| arc.with_domain(Interval::new(t0, t1)))
        .ok_or_else(|| ConversionError::failed("ellipse could not be trimmed to its bounds"))
}

pub(crate) fn decode_nurb_spline(spline: &HostNurbSpline) -> ConversionResult<NurbsCurve> {
    let weights = spline.weights();
    let points = spline
        .control_points()
        .iter()
        .enumerate()
        .map(|(i, p)| HPoint::from_point(decode_point(*p), weights.get(i).copied().unwrap_or(1.0)))
        .collect();
    NurbsCurve::new(spline.degree(), points, strip_end_knots(spline.knots())).map_err(geom_failed)
}

fn decode_hermite_spline(spline: &HostHermiteSpline) -> ConversionResult<NurbsCurve> {
    let points: Vec<Point3> = spline.control_points().iter().map(|p| decode_point(*p)).collect();
    let tangents: Vec<_> = spline.tangents().iter().map(|t| decode_vector(*t)).collect();
    NurbsCurve::from_hermite_segments(&points, &tangents, spline.parameters()).map_err(geom_failed)
}

/// Hermite interpolation of the helix at nodes no more than `HELIX_STEP`
/// apart, over the exact source parameter range.
fn decode_helix(curve: &HostCurve) -> ConversionResult<NurbsCurve> {
    let [t0, t1] = curve
        .parameter_range()
        .ok_or_else(|| ConversionError::failed("helix has no parameter range"))?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let segments = ((t1 - t0) / HELIX_STEP).ceil().max(1.0) as usize;

    let parameters: Vec<f64> = (0..=segments)
        .map(|i| t0 + (t1 - t0) * i as f64 / segments as f64)
        .collect();
    let points: Vec<Point3> = parameters.iter().map(|t| decode_point(curve.evaluate(*t))).collect();
    let tangents: Vec<_> = parameters
        .iter()
        .map(|t| decode_vector(curve.derivative(*t)))
        .collect();
    NurbsCurve::from_hermite_segments(&points, &tangents, &parameters).map_err(geom_failed)
}

// ─────────────────────────────────────────────────────────────────────────────
// Encode
// ─────────────────────────────────────────────────────────────────────────────

pub fn encode_curve(curve: &Curve) -> ConversionResult<HostCurve> {
    encode_curve_with_options(curve, &ConversionOptions::default())
}

pub fn encode_curve_with_options(curve: &Curve, options: &ConversionOptions) -> ConversionResult<HostCurve> {
    if options.is_scaled() {
        encode_raw(&curve.scaled(options.scale_factor), &options.tolerances)
    } else {
        encode_raw(curve, &options.tolerances)
    }
}

/// Encoding of a curve already in host units.
pub(crate) fn encode_raw(curve: &Curve, tolerances: &HostTolerances) -> ConversionResult<HostCurve> {
    match curve {
        Curve::Line(line) => Ok(HostCurve::Line(HostLine::create_bound_with_parameters(
            encode_point(line.from),
            encode_point(line.to),
            line.domain.t0,
            line.domain.t1,
        )?)),
        Curve::Arc(arc) => encode_arc(arc).map(HostCurve::Arc),
        Curve::Nurbs(nurbs) => encode_nurbs_curve(nurbs).map(HostCurve::NurbSpline),
        Curve::Polyline(polyline) => encode_straight_polyline(polyline, tolerances).map(HostCurve::Line),
    }
}

/// Keeps the domain when it runs in step with the angle; otherwise falls back
/// to three points, which keeps only the shape.
fn encode_arc(arc: &ArcCurve) -> ConversionResult<HostArc> {
    let sweep = arc.sweep();
    if arc.is_circle() {
        let plane = encode_arc_plane(&arc.plane.rotated(arc.angle.t0))?;
        return Ok(HostArc::create(&plane, arc.radius, 0.0, TAU)?);
    }
    if (arc.domain.length() - sweep).abs() <= 1e-9 * sweep.max(1.0) {
        let plane = encode_arc_plane(&arc.plane.rotated(arc.angle.t0 - arc.domain.t0))?;
        return Ok(HostArc::create(&plane, arc.radius, arc.domain.t0, arc.domain.t1)?);
    }
    Ok(HostArc::create_by_three_points(
        encode_point(arc.start_point()),
        encode_point(arc.end_point()),
        encode_point(arc.mid_point()),
    )?)
}

fn encode_arc_plane(plane: &Plane) -> ConversionResult<HostPlane> {
    Ok(HostPlane::create_by_origin_and_basis(
        encode_point(plane.origin),
        encode_vector(plane.x_axis),
        encode_vector(plane.y_axis),
    )?)
}

pub(crate) fn encode_nurbs_curve(nurbs: &NurbsCurve) -> ConversionResult<HostNurbSpline> {
    let points = nurbs.points().iter().map(|p| encode_point(p.euclidean())).collect();
    let weights = nurbs
        .is_rational()
        .then(|| nurbs.points().iter().map(|p| p.w).collect());
    Ok(HostNurbSpline::create_curve(
        nurbs.degree(),
        pad_end_knots(nurbs.knots()),
        points,
        weights,
    )?)
}

/// A polyline has a host counterpart only when it is one straight segment.
fn encode_straight_polyline(polyline: &PolylineCurve, tolerances: &HostTolerances) -> ConversionResult<HostLine> {
    let unsupported = ConversionError::UnsupportedGeometryType {
        kind: "PolylineCurve",
    };
    let (Some(&first), Some(&last)) = (polyline.points.first(), polyline.points.last()) else {
        return Err(unsupported);
    };
    let chord = last - first;
    let Some(direction) = chord.normalized() else {
        return Err(unsupported);
    };
    let straight = polyline.points.iter().all(|p| {
        let offset = *p - first;
        let along = offset.dot(direction);
        (offset - direction * along).length() <= tolerances.vertex
            && along >= -tolerances.vertex
            && along <= chord.length() + tolerances.vertex
    });
    if !straight {
        return Err(unsupported);
    }
    let domain = polyline.domain();
    Ok(HostLine::create_bound_with_parameters(
        encode_point(first),
        encode_point(last),
        domain.t0,
        domain.t1,
    )?)
}
