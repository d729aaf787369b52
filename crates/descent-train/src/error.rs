//! Error types for the training layer.

use thiserror::Error;

/// A specialized Result type for training operations.
pub type TrainResult<T> = Result<T, TrainError>;

/// Errors that can occur in the training layer.
///
/// These are contract violations: once one is returned, the trainer state
/// should not be relied on for further calls. Numerical edge cases inside the
/// line search (degenerate denominators, exhausted iteration budgets) are
/// deliberately *not* errors; see `descent_math::linesearch`.
#[derive(Error, Debug, Clone)]
pub enum TrainError {
    /// Mask length does not match the model's full parameter count.
    #[error("Mask has {mask_len} entries but the model has {params_len} parameters")]
    MaskLength {
        /// Number of entries in the mask.
        mask_len: usize,
        /// Number of parameters in the model.
        params_len: usize,
    },

    /// Reduced parameter vector does not match the mask's free count.
    #[error("Reduced vector has {actual} elements but {required} parameters are free")]
    ReducedLength {
        /// Number of free (optimizable) parameters.
        required: usize,
        /// Number of elements supplied.
        actual: usize,
    },

    /// Vector dimensions are incompatible.
    #[error("Dimension mismatch: {reason}")]
    Dimension {
        /// Description of the mismatch.
        reason: String,
    },

    /// Error propagated from the scalar line-search layer.
    #[error(transparent)]
    Math(#[from] descent_math::MathError),
}

impl TrainError {
    /// Creates a dimension mismatch error.
    #[must_use]
    pub fn dimension(reason: impl Into<String>) -> Self {
        Self::Dimension {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrainError::MaskLength {
            mask_len: 3,
            params_len: 5,
        };
        assert!(err.to_string().contains("3 entries"));

        let err = TrainError::ReducedLength {
            required: 2,
            actual: 4,
        };
        assert!(err.to_string().contains("2 parameters are free"));
    }
}
