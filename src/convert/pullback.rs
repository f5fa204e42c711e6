//! Projection of 3D edge curves into the parameter space of a face.
//!
//! A pulled back trim is sampled at parameters of the 3D curve, so trim
//! parameters run in step with the curve. Each sample is found by a local
//! closest point search seeded with the previous one, falling back to a
//! global search when the local one misses. On a surface closed in one
//! direction the samples are unwrapped so a loop stays continuous across the
//! seam.

use std::f64::consts::{PI, TAU};

use crate::geom::{
    Curve, Curve3, Direction, Interval, Point2, Point3, Surface, Surface3, TrimCurve,
};

/// Angular step for sampling arcs.
const ARC_STEP: f64 = PI / 32.0;
const MIN_ARC_SAMPLES: usize = 4;
const MIN_CURVE_SAMPLES: usize = 16;
const SAMPLES_PER_SPAN: usize = 8;
/// Angular slack when placing a loop that starts on the seam.
const SEAM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Period {
    direction: Direction,
    domain: Interval,
}

impl Period {
    fn coordinate(self, p: Point2) -> f64 {
        match self.direction {
            Direction::U => p.x,
            Direction::V => p.y,
        }
    }

    fn shifted(self, p: Point2, by: f64) -> Point2 {
        match self.direction {
            Direction::U => Point2::new(p.x + by, p.y),
            Direction::V => Point2::new(p.x, p.y + by),
        }
    }

    /// `p` moved by whole turns to the copy nearest `toward`.
    fn unwrapped(self, p: Point2, toward: Point2) -> Point2 {
        let turns = ((self.coordinate(toward) - self.coordinate(p)) / TAU).round();
        if turns == 0.0 { p } else { self.shifted(p, turns * TAU) }
    }
}

pub(crate) struct Pullback<'a> {
    surface: &'a Surface,
    tolerance: f64,
    period: Option<Period>,
}

impl<'a> Pullback<'a> {
    pub(crate) fn new(surface: &'a Surface, tolerance: f64) -> Self {
        Self {
            surface,
            tolerance,
            period: periodic_direction(surface),
        }
    }

    /// Trim for `curve`, starting near `seed` when given (the end of the
    /// previous trim of the loop).
    pub(crate) fn pull(&self, curve: &Curve, seed: Option<Point2>) -> Option<TrimCurve> {
        let parameters = sample_parameters(curve, matches!(self.surface, Surface::Plane(_)));
        let mut points = Vec::with_capacity(parameters.len());
        let mut previous = seed;
        for &t in &parameters {
            let uv = self.project(curve.point_at(t), previous);
            points.push(uv);
            previous = Some(uv);
        }
        self.settle_singular_ends(&mut points);
        TrimCurve::new(points, parameters).ok()
    }

    /// An end on a collapsed side of the surface takes the free coordinate of
    /// its neighbour, so the trim leaves the singularity straight.
    fn settle_singular_ends(&self, points: &mut [Point2]) {
        let n = points.len();
        if n < 2 {
            return;
        }
        for (end, next) in [(0, 1), (n - 1, n - 2)] {
            let (p, q) = (points[end], points[next]);
            if !self.surface.is_at_singularity(p.x, p.y, self.tolerance) {
                continue;
            }
            let at = self.surface.point_at(p.x, p.y);
            if let Some(settled) = [Point2::new(q.x, p.y), Point2::new(p.x, q.y)]
                .into_iter()
                .find(|c| self.distance(at, *c) <= self.tolerance)
            {
                points[end] = settled;
            }
        }
    }

    fn project(&self, point: Point3, seed: Option<Point2>) -> Point2 {
        let global = || {
            let (u, v) = self.surface.closest_point(point);
            Point2::new(u, v)
        };
        let Some(seed) = seed else {
            return global();
        };

        let (u, v) = self.surface.closest_point_from(point, (seed.x, seed.y));
        let mut best = Point2::new(u, v);
        let mut best_distance = self.distance(point, best);
        if best_distance > self.tolerance {
            let candidate = global();
            let distance = self.distance(point, candidate);
            if distance < best_distance {
                best = candidate;
                best_distance = distance;
            }
        }
        log::trace!("pullback sample at distance {best_distance:e}");

        match self.period {
            Some(period) => period.unwrapped(best, seed),
            None => best,
        }
    }

    fn distance(&self, point: Point3, uv: Point2) -> f64 {
        self.surface.point_at(uv.x, uv.y).distance_to(point)
    }

    /// Moves a whole loop by full turns so its lowest angular coordinate lies
    /// in `[t0, t0 + TAU)` of the surface domain.
    pub(crate) fn shift_into_domain(&self, trims: Vec<TrimCurve>) -> Vec<TrimCurve> {
        let Some(period) = self.period else {
            return trims;
        };
        let lowest = trims
            .iter()
            .flat_map(|trim| trim.points().iter().map(|p| period.coordinate(*p)))
            .fold(f64::INFINITY, f64::min);
        if !lowest.is_finite() {
            return trims;
        }
        let turns = ((lowest - period.domain.t0 + SEAM_TOLERANCE) / TAU).floor();
        if turns == 0.0 {
            return trims;
        }
        let by = -turns * TAU;
        trims
            .into_iter()
            .map(|trim| {
                let points = trim.points().iter().map(|p| period.shifted(*p, by)).collect();
                TrimCurve::new(points, trim.parameters().to_vec()).unwrap_or(trim)
            })
            .collect()
    }
}

/// The angular direction of a surface of revolution making a full turn.
fn periodic_direction(surface: &Surface) -> Option<Period> {
    let Surface::Revolution(revolution) = surface else {
        return None;
    };
    if revolution.angle.length() < TAU - 1e-9 {
        return None;
    }
    let direction = if revolution.transposed { Direction::V } else { Direction::U };
    Some(Period {
        direction,
        domain: surface.domain(direction),
    })
}

/// Strictly increasing curve parameters at which to sample `curve`.
fn sample_parameters(curve: &Curve, on_plane: bool) -> Vec<f64> {
    let domain = curve.domain();
    let count = match curve {
        Curve::Polyline(polyline) => return polyline.parameters.clone(),
        Curve::Line(_) if on_plane => 1,
        Curve::Line(_) => MIN_CURVE_SAMPLES,
        Curve::Arc(arc) => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let steps = (arc.sweep().abs() / ARC_STEP).ceil() as usize;
            steps.max(MIN_ARC_SAMPLES)
        }
        Curve::Nurbs(nurbs) => {
            let spans = nurbs
                .knots()
                .windows(2)
                .filter(|w| w[1] > w[0] && w[0] >= domain.t0 && w[1] <= domain.t1)
                .count();
            (SAMPLES_PER_SPAN * spans).max(MIN_CURVE_SAMPLES)
        }
    };
    (0..=count)
        .map(|i| domain.parameter_at(i as f64 / count as f64))
        .collect()
}
