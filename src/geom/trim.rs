//! Trim curves and loop boundaries in surface parameter space.
//!
//! A trim is a 2D polyline on a face's UV domain whose parameters run in step
//! with the 3D edge it was pulled back from. Trims are chained into a
//! [`TrimLoop`], which classifies itself as outer (counter-clockwise) or inner
//! (clockwise) and answers containment queries against other loops.
//!
//! # Main Types
//! - [`TrimCurve`]: A parametrized UV polyline
//! - [`TrimLoop`]: An ordered chain of trim curves forming one boundary
//! - [`CurveOrientation`]: Winding of a closed UV boundary
//! - [`RegionContainment`]: Relationship between two closed boundaries
//! - [`TrimError`]: Typed errors for trim construction

use std::fmt;

use serde::{Deserialize, Serialize};

use super::core::{Interval, Point2, Tolerance};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TrimError {
    /// Points contain NaN or infinite values.
    NonFinitePoints,
    /// A trim needs at least two points.
    InsufficientPoints { count: usize },
    /// Points and parameters differ in length.
    ParameterCount { points: usize, parameters: usize },
    /// Parameters must strictly increase.
    DecreasingParameters,
}

impl fmt::Display for TrimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinitePoints => write!(f, "trim curve points must be finite"),
            Self::InsufficientPoints { count } => {
                write!(f, "trim curve requires at least 2 points, got {count}")
            }
            Self::ParameterCount { points, parameters } => write!(
                f,
                "trim curve has {points} points but {parameters} parameters"
            ),
            Self::DecreasingParameters => write!(f, "trim curve parameters must increase"),
        }
    }
}

impl std::error::Error for TrimError {}

// ============================================================================
// UV Domain
// ============================================================================

/// A rectangular domain in UV parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvDomain {
    pub u: Interval,
    pub v: Interval,
}

impl UvDomain {
    #[must_use]
    pub const fn new(u: Interval, v: Interval) -> Self {
        Self { u, v }
    }

    #[must_use]
    pub fn from_points(points: &[Point2]) -> Self {
        let mut u = Interval::new(f64::INFINITY, f64::NEG_INFINITY);
        let mut v = u;
        for p in points {
            u = Interval::new(u.t0.min(p.x), u.t1.max(p.x));
            v = Interval::new(v.t0.min(p.y), v.t1.max(p.y));
        }
        Self { u, v }
    }

    #[must_use]
    pub fn contains(&self, point: Point2, tol: f64) -> bool {
        self.u.includes(point.x, tol) && self.v.includes(point.y, tol)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        (self.u.length() * self.v.length()).abs()
    }
}

// ============================================================================
// Polygon helpers
// ============================================================================

fn signed_area(points: &[Point2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        area += a.x * b.y - b.x * a.y;
    }
    0.5 * area
}

fn point_on_segment(p: Point2, a: Point2, b: Point2, tol: f64) -> bool {
    let ab = b - a;
    let ap = p - a;

    let cross = ab.x * ap.y - ab.y * ap.x;
    let ab_len = ab.length();
    if cross.abs() > tol * ab_len.max(1.0) {
        return false;
    }

    let dot = ap.x * ab.x + ap.y * ab.y;
    if dot < -tol * ab_len {
        return false;
    }
    dot - ab_len * ab_len <= tol * ab_len
}

fn orient2d(a: Point2, b: Point2, c: Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn segments_intersect(a: Point2, b: Point2, c: Point2, d: Point2, tol: f64) -> bool {
    let o1 = orient2d(a, b, c);
    let o2 = orient2d(a, b, d);
    let o3 = orient2d(c, d, a);
    let o4 = orient2d(c, d, b);

    if point_on_segment(c, a, b, tol)
        || point_on_segment(d, a, b, tol)
        || point_on_segment(a, c, d, tol)
        || point_on_segment(b, c, d, tol)
    {
        return true;
    }

    let ab = (o1 > 0.0 && o2 < 0.0) || (o1 < 0.0 && o2 > 0.0);
    let cd = (o3 > 0.0 && o4 < 0.0) || (o3 < 0.0 && o4 > 0.0);
    ab && cd
}

fn loops_intersect(a: &[Point2], b: &[Point2], tol: f64) -> bool {
    if a.len() < 2 || b.len() < 2 {
        return false;
    }

    for i in 0..a.len() {
        let a0 = a[i];
        let a1 = a[(i + 1) % a.len()];
        for j in 0..b.len() {
            let b0 = b[j];
            let b1 = b[(j + 1) % b.len()];
            if segments_intersect(a0, a1, b0, b1, tol) {
                return true;
            }
        }
    }

    false
}

/// Even-odd containment; points on the boundary count as inside.
pub(crate) fn contains_point_polygon(p: Point2, points: &[Point2], tol: f64) -> bool {
    if points.len() < 3 {
        return false;
    }

    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        if point_on_segment(p, a, b, tol) {
            return true;
        }
    }

    let mut inside = false;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];

        if (a.y > p.y) == (b.y > p.y) {
            continue;
        }

        let t = (p.y - a.y) / (b.y - a.y);
        let x = a.x + t * (b.x - a.x);
        if p.x <= x {
            inside = !inside;
        }
    }

    inside
}

// ============================================================================
// TrimCurve
// ============================================================================

/// A UV polyline with one parameter per vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimCurve {
    points: Vec<Point2>,
    parameters: Vec<f64>,
}

impl TrimCurve {
    pub fn new(points: Vec<Point2>, parameters: Vec<f64>) -> Result<Self, TrimError> {
        if points.len() < 2 {
            return Err(TrimError::InsufficientPoints {
                count: points.len(),
            });
        }
        if points.len() != parameters.len() {
            return Err(TrimError::ParameterCount {
                points: points.len(),
                parameters: parameters.len(),
            });
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite())
            || parameters.iter().any(|t| !t.is_finite())
        {
            return Err(TrimError::NonFinitePoints);
        }
        if parameters.windows(2).any(|w| w[1] <= w[0]) {
            return Err(TrimError::DecreasingParameters);
        }
        Ok(Self { points, parameters })
    }

    /// Straight trim between two UV points.
    pub fn line(from: Point2, to: Point2, domain: Interval) -> Result<Self, TrimError> {
        Self::new(vec![from, to], vec![domain.t0, domain.t1])
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[must_use]
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    #[must_use]
    pub fn domain(&self) -> Interval {
        Interval::new(self.parameters[0], self.parameters[self.parameters.len() - 1])
    }

    #[must_use]
    pub fn start(&self) -> Point2 {
        self.points[0]
    }

    #[must_use]
    pub fn end(&self) -> Point2 {
        self.points[self.points.len() - 1]
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        let last = self.points.len() - 2;
        let i = self
            .parameters
            .windows(2)
            .position(|w| t < w[1])
            .unwrap_or(last)
            .min(last);
        let (a, b) = (self.parameters[i], self.parameters[i + 1]);
        self.points[i].lerp(self.points[i + 1], (t - a) / (b - a))
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance_to(w[1])).sum()
    }

    /// Same trace backwards; domain `[a, b]` becomes `[-b, -a]`.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
            parameters: self.parameters.iter().rev().map(|t| -t).collect(),
        }
    }

    #[must_use]
    pub fn bbox(&self) -> UvDomain {
        UvDomain::from_points(&self.points)
    }

    pub fn set_start(&mut self, p: Point2) {
        self.points[0] = p;
    }

    pub fn set_end(&mut self, p: Point2) {
        let last = self.points.len() - 1;
        self.points[last] = p;
    }
}

// ============================================================================
// Orientation / containment
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveOrientation {
    CounterClockwise,
    Clockwise,
    Undefined,
}

/// Winding of the closed polygon through `points`. Loops whose area is
/// negligible relative to their bounding box are `Undefined`.
#[must_use]
pub fn closed_curve_orientation(points: &[Point2]) -> CurveOrientation {
    let area = signed_area(points);
    let box_area = UvDomain::from_points(points).area();
    if !area.is_finite() || area.abs() <= Tolerance::ZERO_LENGTH.eps.max(box_area * 1e-9) {
        return CurveOrientation::Undefined;
    }
    if area > 0.0 {
        CurveOrientation::CounterClockwise
    } else {
        CurveOrientation::Clockwise
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionContainment {
    Disjoint,
    MutualIntersection,
    AInsideB,
    BInsideA,
}

/// How the regions bounded by closed polygons `a` and `b` relate.
#[must_use]
pub fn planar_closed_curve_relationship(a: &[Point2], b: &[Point2], tol: f64) -> RegionContainment {
    if loops_intersect(a, b, tol) {
        return RegionContainment::MutualIntersection;
    }
    match (a.first(), b.first()) {
        (Some(&pa), _) if contains_point_polygon(pa, b, tol) => RegionContainment::AInsideB,
        (_, Some(&pb)) if contains_point_polygon(pb, a, tol) => RegionContainment::BInsideA,
        _ => RegionContainment::Disjoint,
    }
}

// ============================================================================
// TrimLoop
// ============================================================================

/// An ordered chain of trim curves bounding one region of a face.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrimLoop {
    segments: Vec<TrimCurve>,
}

impl TrimLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_segment(&mut self, segment: TrimCurve) {
        self.segments.push(segment);
    }

    #[must_use]
    pub fn segments(&self) -> &[TrimCurve] {
        &self.segments
    }

    #[must_use]
    pub fn into_segments(self) -> Vec<TrimCurve> {
        self.segments
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn start(&self) -> Option<Point2> {
        self.segments.first().map(TrimCurve::start)
    }

    #[must_use]
    pub fn end(&self) -> Option<Point2> {
        self.segments.last().map(TrimCurve::end)
    }

    #[must_use]
    pub fn is_closed(&self, tol: f64) -> bool {
        match (self.start(), self.end()) {
            (Some(s), Some(e)) => s.distance_to(e) <= tol,
            _ => false,
        }
    }

    /// Snaps the loop's last end onto its first start when the gap is within
    /// `tol`. Returns whether the loop is closed afterwards.
    pub fn make_closed(&mut self, tol: f64) -> bool {
        let Some(start) = self.start() else {
            return false;
        };
        if !self.is_closed(tol) {
            return false;
        }
        if let Some(last) = self.segments.last_mut() {
            last.set_end(start);
        }
        true
    }

    /// Vertices of the loop as one closed polygon, without the repeated
    /// closing vertex.
    #[must_use]
    pub fn polygon(&self) -> Vec<Point2> {
        let mut points: Vec<Point2> = Vec::new();
        for segment in &self.segments {
            for &p in segment.points() {
                if points.last().is_some_and(|q| *q == p) {
                    continue;
                }
                points.push(p);
            }
        }
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        points
    }

    #[must_use]
    pub fn orientation(&self) -> CurveOrientation {
        closed_curve_orientation(&self.polygon())
    }

    #[must_use]
    pub fn bbox(&self) -> UvDomain {
        UvDomain::from_points(&self.polygon())
    }

    #[must_use]
    pub fn contains_point(&self, p: Point2, tol: f64) -> bool {
        contains_point_polygon(p, &self.polygon(), tol)
    }

    #[must_use]
    pub fn relationship(&self, other: &Self, tol: f64) -> RegionContainment {
        planar_closed_curve_relationship(&self.polygon(), &other.polygon(), tol)
    }
}
