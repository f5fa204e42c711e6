//! Non-fatal findings collected while converting one solid, face or mesh.
//!
//! Conversions that degrade instead of failing return their result together
//! with a [`ConversionDiagnostics`]. Every recorded warning is also emitted
//! through `log::warn!`.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConversionWarning {
    /// The solid failed validation; one repair pass was applied.
    DegradedGeometry { problems: Vec<String> },
    /// An inner loop could not be assigned to exactly one outer loop.
    AmbiguousTopology { face: usize, loop_index: usize, candidates: usize },
    /// An edge with an unsupported curve was left out.
    SkippedEdge { edge: usize, kind: String },
    /// A face whose edges or surface could not be converted was left out.
    SkippedFace { face: usize, reason: String },
    /// Two consecutive edges of a loop do not meet.
    MissingEdge { face: usize, loop_index: usize, gap: f64 },
    /// A loop whose winding is neither clockwise nor counter-clockwise.
    UnknownLoopOrientation { face: usize, loop_index: usize },
    /// A surface that has no usable representation.
    UnavailableSurface { face: usize, kind: String },
    /// The host builder rejected the input.
    BuilderFailed { reason: String },
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegradedGeometry { problems } => {
                write!(f, "degraded geometry after repair ({} problems)", problems.len())?;
                if let Some(first) = problems.first() {
                    write!(f, ": {first}")?;
                }
                Ok(())
            }
            Self::AmbiguousTopology {
                face,
                loop_index,
                candidates,
            } => write!(
                f,
                "face {face}: inner loop {loop_index} matches {candidates} outer loops"
            ),
            Self::SkippedEdge { edge, kind } => write!(f, "edge {edge}: skipped {kind} curve"),
            Self::SkippedFace { face, reason } => write!(f, "face {face} skipped: {reason}"),
            Self::MissingEdge {
                face,
                loop_index,
                gap,
            } => write!(f, "face {face}: loop {loop_index} has a gap of {gap}"),
            Self::UnknownLoopOrientation { face, loop_index } => {
                write!(f, "face {face}: loop {loop_index} has no defined winding")
            }
            Self::UnavailableSurface { face, kind } => {
                write!(f, "face {face}: {kind} is unavailable")
            }
            Self::BuilderFailed { reason } => write!(f, "builder failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionDiagnostics {
    pub warnings: Vec<ConversionWarning>,
    /// Faces written to the output.
    pub face_count: usize,
    /// Distinct edges written to the output.
    pub edge_count: usize,
    /// Whether the repair pass ran.
    pub repaired: bool,
}

impl ConversionDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, warning: ConversionWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ConversionWarning::DegradedGeometry { .. }))
    }

    /// Number of warnings matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&ConversionWarning) -> bool) -> usize {
        self.warnings.iter().filter(|w| predicate(w)).count()
    }

    pub fn merge(&mut self, other: Self) {
        self.warnings.extend(other.warnings);
        self.face_count += other.face_count;
        self.edge_count += other.edge_count;
        self.repaired |= other.repaired;
    }
}
