use crate::host::HostError;

/// Result type of the conversions that can stop outright.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Failures that stop a single conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// The source or target variant has no counterpart on the other side.
    #[error("unsupported geometry type: {kind}")]
    UnsupportedGeometryType { kind: &'static str },
    /// A builder produced no usable result.
    #[error("conversion failed: {reason}")]
    ConversionFailed { reason: String },
    /// A transform that is not an orthonormal rigid motion.
    #[error("invalid transform: {reason}")]
    InvalidTransform { reason: String },
    #[error(transparent)]
    Host(#[from] HostError),
}

impl ConversionError {
    pub(crate) fn failed(reason: impl Into<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
        }
    }
}
