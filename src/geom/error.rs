/// Errors raised by the validating constructors of the NURBS kernel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeomError {
    #[error("nurbs degree must be >= 1, got {degree}")]
    InvalidDegree { degree: usize },
    #[error("nurbs requires more than {degree} control points, got {count}")]
    TooFewControlPoints { degree: usize, count: usize },
    #[error("nurbs knot count must be {expected}, got {found}")]
    KnotCount { expected: usize, found: usize },
    #[error("nurbs knots must be finite and non-decreasing")]
    DecreasingKnots,
    #[error("nurbs weights must be finite and > 0")]
    InvalidWeight,
    #[error("nurbs control points must be finite")]
    NonFinitePoint,
    #[error("control point grid has {found} points, expected {count_u} x {count_v}")]
    GridSize {
        count_u: usize,
        count_v: usize,
        found: usize,
    },
    #[error("nurbs domain is empty")]
    EmptyDomain,
}
