//! Residual and Jacobian evaluation.
//!
//! The driver treats the evaluator as an opaque capability: given the full
//! unknown vector it returns the residuals and the dense Jacobian evaluated
//! at that same point.
//!
//! ## Jacobian layout
//!
//! For an unknown vector of length `N`, the Jacobian is an `N × N` matrix
//! flattened column-major:
//!
//! ```text
//! J[r + c * N] = d f_r / d x_c
//! ```
//!
//! Block extraction in the driver depends on this mapping exactly.

#[cfg(feature = "dual")]
mod dual;

#[cfg(feature = "dual")]
pub use dual::DualEvaluator;

use crate::error::{NewtonError, Result};

/// Residuals and Jacobian evaluated at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// `f(x)`, same length as `x`
    pub residuals: Vec<f64>,
    /// `f'(x)`, column-major, length `x.len()²`
    pub jacobian: Vec<f64>,
}

impl Evaluation {
    /// Bundle residuals and a column-major Jacobian.
    pub fn new(residuals: Vec<f64>, jacobian: Vec<f64>) -> Self {
        Self {
            residuals,
            jacobian,
        }
    }

    /// Check the evaluation against an unknown vector of length `n`.
    pub fn check_shape(&self, n: usize) -> Result<()> {
        if self.residuals.len() != n {
            return Err(NewtonError::evaluation_shape(
                "residuals",
                n,
                self.residuals.len(),
            ));
        }
        if n.checked_mul(n) != Some(self.jacobian.len()) {
            return Err(NewtonError::evaluation_shape(
                "jacobian",
                n.saturating_mul(n),
                self.jacobian.len(),
            ));
        }
        Ok(())
    }
}

/// Computes residuals and the dense Jacobian of a system at a point.
pub trait Evaluator {
    /// Evaluate `f(x)` and `f'(x)` over the whole vector `x`.
    fn evaluate(&mut self, x: &[f64]) -> Result<Evaluation>;
}

impl<F> Evaluator for F
where
    F: FnMut(&[f64]) -> (Vec<f64>, Vec<f64>),
{
    fn evaluate(&mut self, x: &[f64]) -> Result<Evaluation> {
        let (residuals, jacobian) = self(x);
        Ok(Evaluation::new(residuals, jacobian))
    }
}
