use serde::{Deserialize, Serialize};

use crate::host::{ABSOLUTE_TOLERANCE, ANGLE_TOLERANCE, SHORT_CURVE_TOLERANCE, VERTEX_TOLERANCE};

/// Length scale that leaves geometry unchanged.
pub const NO_SCALE: f64 = 1.0;

/// Tolerances of the host kernel, in host length units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostTolerances {
    pub absolute: f64,
    pub short_curve: f64,
    pub vertex: f64,
    /// Radians.
    pub angle: f64,
}

impl Default for HostTolerances {
    fn default() -> Self {
        Self {
            absolute: ABSOLUTE_TOLERANCE,
            short_curve: SHORT_CURVE_TOLERANCE,
            vertex: VERTEX_TOLERANCE,
            angle: ANGLE_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionOptions {
    pub tolerances: HostTolerances,
    /// Multiplies lengths after decoding and before encoding.
    pub scale_factor: f64,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            tolerances: HostTolerances::default(),
            scale_factor: NO_SCALE,
        }
    }
}

impl ConversionOptions {
    #[must_use]
    pub fn with_tolerances(mut self, tolerances: HostTolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    #[must_use]
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    #[must_use]
    pub fn with_vertex_tolerance(mut self, vertex: f64) -> Self {
        self.tolerances.vertex = vertex;
        self
    }

    pub(crate) fn is_scaled(&self) -> bool {
        (self.scale_factor - NO_SCALE).abs() > f64::EPSILON
    }
}
