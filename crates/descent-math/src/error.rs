//! Error types for line-search operations.

use thiserror::Error;

/// A specialized Result type for line-search operations.
pub type MathResult<T> = Result<T, MathError>;

/// Errors that can occur during line-search operations.
#[derive(Error, Debug, Clone)]
pub enum MathError {
    /// Bracket triple does not satisfy the ordering invariant.
    #[error("Invalid bracket: expected lower < mid < upper, got ({lower}, {mid}, {upper})")]
    InvalidBracket {
        /// Lower end of the bracket.
        lower: f64,
        /// Interior point of the bracket.
        mid: f64,
        /// Upper end of the bracket.
        upper: f64,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl MathError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
