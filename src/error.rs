//! Error types for the batched Newton-Raphson solver.
//!
//! This module provides a unified error type [`NewtonError`] that covers
//! the fatal conditions of a solve: broken preconditions, evaluators that
//! violate their shape contract, and linear-algebra failures.
//!
//! Non-convergence and bound saturation are not errors. They are reported
//! per block through [`BlockStatus`](crate::solver::BlockStatus).

use thiserror::Error;

/// Result type alias using [`NewtonError`].
pub type Result<T> = std::result::Result<T, NewtonError>;

/// Unified error type for all solver operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NewtonError {
    // ============ Precondition Errors ============
    /// Unknown vector length does not match the block partition
    #[error("Length of indep ({actual}) does not equal niter * nsim_targets ({expected})")]
    LengthMismatch { expected: usize, actual: usize },

    /// Invalid solve configuration
    #[error("Invalid solve configuration: {message}")]
    InvalidConfig { message: String },

    // ============ Evaluator Errors ============
    /// Evaluator returned a residual or Jacobian of the wrong size
    #[error("Evaluator returned {what} of length {actual}, expected {expected}")]
    EvaluationShape {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Evaluator reported its own failure
    #[error("Evaluation failed: {message}")]
    Evaluation { message: String },

    // ============ Linear Algebra Errors ============
    /// Matrix is singular and cannot be solved
    #[error("Singular matrix - block Jacobian has a zero pivot")]
    SingularMatrix,

    /// Linear system dimensions are inconsistent
    #[error("Linear system dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl NewtonError {
    /// Create a length mismatch error
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::LengthMismatch { expected, actual }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an evaluation failure error
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// Create an evaluator shape error
    pub fn evaluation_shape(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::EvaluationShape {
            what,
            expected,
            actual,
        }
    }
}
