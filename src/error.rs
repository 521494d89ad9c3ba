use thiserror::Error;

use crate::core::ValueKind;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("value type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },

    /// A combination the engine has no code path for. Callers should treat this
    /// as a bug in the integration rather than bad user input.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl ChartError {
    /// Returns `true` for errors that indicate a missing code path rather than
    /// invalid input.
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}
