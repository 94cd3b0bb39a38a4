//! Solve configuration.

use crate::error::{NewtonError, Result};

use super::{DEFAULT_INDEP_MAX, DEFAULT_INDEP_MIN, DEFAULT_MAX_ITERS, DEFAULT_TOLERANCE};

/// Configuration for one batched solve.
///
/// Immutable for the duration of a solve call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveConfig {
    /// Lower bound applied to every unknown.
    pub indep_min: f64,
    /// Upper bound applied to every unknown.
    pub indep_max: f64,
    /// Maximum number of outer Newton iterations.
    pub max_iters: usize,
    /// Convergence threshold on the norm of a block's Newton step.
    pub tolerance: f64,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            indep_min: DEFAULT_INDEP_MIN,
            indep_max: DEFAULT_INDEP_MAX,
            max_iters: DEFAULT_MAX_ITERS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl SolveConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lower and upper bounds for the unknowns.
    pub fn with_bounds(mut self, indep_min: f64, indep_max: f64) -> Self {
        self.indep_min = indep_min;
        self.indep_max = indep_max;
        self
    }

    /// Set the outer iteration budget.
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the convergence tolerance.
    ///
    /// The tolerance is compared against the Euclidean norm of each block's
    /// Newton step, not against the residual.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Check that the configuration describes a usable solve.
    ///
    /// The driver itself does not call this; a zero budget or inverted
    /// bounds still run and simply produce the corresponding status codes.
    pub fn validate(&self) -> Result<()> {
        if self.indep_min.is_nan() || self.indep_max.is_nan() {
            return Err(NewtonError::invalid_config("bounds must not be NaN"));
        }

        if self.indep_min > self.indep_max {
            return Err(NewtonError::invalid_config(format!(
                "indep_min ({}) is greater than indep_max ({})",
                self.indep_min, self.indep_max
            )));
        }

        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(NewtonError::invalid_config(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }

        if self.max_iters == 0 {
            return Err(NewtonError::invalid_config("max_iters must be > 0"));
        }

        Ok(())
    }
}
