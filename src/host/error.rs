/// Errors raised by the host kernel constructors and builders.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    #[error("invalid curve: {reason}")]
    InvalidCurve { reason: String },
    #[error("curve length {length} is below the short curve tolerance")]
    CurveTooShort { length: f64 },
    #[error("invalid nurbs data: {reason}")]
    InvalidNurbs { reason: String },
    #[error("invalid surface: {reason}")]
    InvalidSurface { reason: String },
    #[error("{kind} is not accepted as an edge curve")]
    UnsupportedEdgeCurve { kind: &'static str },
    #[error("unknown builder id {id}")]
    UnknownId { id: usize },
    #[error("builder object {id} is already finished")]
    AlreadyFinished { id: usize },
    #[error("loop {id} is not closed, gap {gap}")]
    LoopNotClosed { id: usize, gap: f64 },
    #[error("loop {id} has no co-edges")]
    EmptyLoop { id: usize },
    #[error("face {id} has no loops")]
    EmptyFace { id: usize },
    #[error("edge {id} is used by {uses} co-edges")]
    NonManifoldEdge { id: usize, uses: usize },
    #[error("edge {id} is traversed twice in the same direction")]
    InconsistentEdgeOrientation { id: usize },
    #[error("tessellated face has {count} distinct vertices")]
    DegenerateFace { count: usize },
    #[error("connected face set is not open")]
    FaceSetNotOpen,
    #[error("the builder produced nothing")]
    NothingBuilt,
}
