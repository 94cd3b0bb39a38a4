//! Dense LU solve for the per-block linear systems.

use crate::error::{NewtonError, Result};

use super::PIVOT_EPSILON;

/// A dense linear solver for small square systems `A x = b`.
///
/// `a` is an `n × n` matrix stored column-major (element `(r, c)` at
/// `r + c * n`). Implementations may use `a` as scratch. On success `b` is
/// overwritten with the solution `x`.
pub trait LinearSolver: Send + Sync {
    /// Solve `A x = b` in place.
    fn solve(&self, n: usize, a: &mut [f64], b: &mut [f64]) -> Result<()>;
}

/// LU decomposition with partial pivoting.
#[derive(Debug, Clone, Copy)]
pub struct LuSolver {
    /// Pivots smaller than this fraction of the largest entry are treated as zero
    pub pivot_epsilon: f64,
}

impl Default for LuSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LuSolver {
    /// Create a new LU solver with the default pivot threshold.
    pub fn new() -> Self {
        Self {
            pivot_epsilon: PIVOT_EPSILON,
        }
    }

    /// Create an LU solver with a custom relative pivot threshold.
    pub fn with_pivot_epsilon(pivot_epsilon: f64) -> Self {
        Self { pivot_epsilon }
    }
}

impl LinearSolver for LuSolver {
    fn solve(&self, n: usize, a: &mut [f64], b: &mut [f64]) -> Result<()> {
        if n.checked_mul(n) != Some(a.len()) {
            return Err(NewtonError::DimensionMismatch {
                expected: n.saturating_mul(n),
                actual: a.len(),
            });
        }
        if b.len() != n {
            return Err(NewtonError::DimensionMismatch {
                expected: n,
                actual: b.len(),
            });
        }

        // Pivot cutoff scales with the block, so small but well
        // conditioned Jacobians still factor.
        let scale = a.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let cutoff = self.pivot_epsilon * scale;

        // Factor in place. Row swaps are applied to b as we go, so no
        // separate permutation vector is kept.
        for k in 0..n {
            // Find pivot in column k
            let mut max_val = a[k + k * n].abs();
            let mut max_row = k;

            for i in (k + 1)..n {
                let val = a[i + k * n].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_val.is_nan() || max_val == 0.0 || max_val < cutoff {
                return Err(NewtonError::SingularMatrix);
            }

            if max_row != k {
                for j in 0..n {
                    a.swap(k + j * n, max_row + j * n);
                }
                b.swap(k, max_row);
            }

            // Eliminate below the pivot
            let pivot = a[k + k * n];
            for i in (k + 1)..n {
                let factor = a[i + k * n] / pivot;
                a[i + k * n] = factor;
                for j in (k + 1)..n {
                    a[i + j * n] -= factor * a[k + j * n];
                }
            }
        }

        // Forward substitution (L * y = Pb)
        for i in 0..n {
            for j in 0..i {
                b[i] -= a[i + j * n] * b[j];
            }
        }

        // Back substitution (U * x = y)
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                b[i] -= a[i + j * n] * b[j];
            }
            b[i] /= a[i + i * n];
        }

        Ok(())
    }
}
