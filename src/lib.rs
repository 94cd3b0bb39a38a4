//! # Batched Newton
//!
//! A batched Newton-Raphson root finder for nonlinear systems made of many
//! small, independent sub-problems that share one flattened unknown vector.
//!
//! This library provides:
//! - A driver that solves every block from a single Jacobian evaluation per
//!   outer iteration
//! - Block-diagonal extraction from a dense column-major Jacobian
//! - Per-block LU solves, optionally in parallel
//! - Bound clamping and per-block status codes
//! - A forward-mode AD evaluator built on dual numbers
//!
//! ## Architecture
//!
//! - [`evaluator`] - Residual and Jacobian evaluation ([`Evaluator`] trait)
//! - [`solver`] - The batched Newton loop, block linear solves and configuration
//! - [`norm`] - Euclidean norm used as the convergence metric
//! - [`error`] - Error types
//!
//! ## Method
//!
//! The unknown vector holds `niter` blocks of `nsim_targets` values. For each
//! outer iteration:
//!
//! 1. Evaluate residuals `y = f(x)` and the full Jacobian `J = f'(x)`
//! 2. For every unsolved block, solve `J_b w = y_b` on its diagonal block
//! 3. Mark the block converged if `|w| < tolerance`
//! 4. Update `x := x - w` and clamp to `[indep_min, indep_max]`
//!
//! Cross-block Jacobian entries are never read.
//!
//! ## Usage
//!
//! ```
//! use batched_newton::newton_raphson;
//!
//! // Three scalar blocks, f_i(x) = x² - (i + 1)
//! let mut f = |x: &[f64]| {
//!     let n = x.len();
//!     let mut residuals = vec![0.0; n];
//!     let mut jacobian = vec![0.0; n * n];
//!     for (i, v) in x.iter().enumerate() {
//!         residuals[i] = v * v - (i + 1) as f64;
//!         jacobian[i + i * n] = 2.0 * v;
//!     }
//!     (residuals, jacobian)
//! };
//!
//! let mut x = vec![1.0, 1.0, 1.0];
//! let codes = newton_raphson(&mut x, &mut f, 3, 1, 0.0, 1000.0, 50, 1e-12).unwrap();
//!
//! assert_eq!(codes, vec![1, 1, 1]);
//! assert!((x[2] - 3.0_f64.sqrt()).abs() < 1e-10);
//! ```

pub mod error;
pub mod evaluator;
pub mod norm;
pub mod solver;

// Re-export main types for convenience
pub use error::{NewtonError, Result};
pub use evaluator::{Evaluation, Evaluator};
pub use norm::euclid_norm;
pub use solver::{BatchedNewton, BlockStatus, LinearSolver, LuSolver, SolveConfig, SolveOutcome};

/// Solve a batch of block systems and return one status code per block.
///
/// `indep` is updated in place and must hold `niter * nsim_targets` values.
/// The codes are `1` (converged), `-1` (iteration limit), `-2` (clamped at
/// `indep_min`), `-3` (clamped at `indep_max`) and `-4` (degenerate block
/// Jacobian).
#[allow(clippy::too_many_arguments)]
pub fn newton_raphson<E: Evaluator>(
    indep: &mut [f64],
    evaluator: &mut E,
    niter: usize,
    nsim_targets: usize,
    indep_min: f64,
    indep_max: f64,
    max_iters: usize,
    tolerance: f64,
) -> Result<Vec<i32>> {
    let config = SolveConfig::new()
        .with_bounds(indep_min, indep_max)
        .with_max_iters(max_iters)
        .with_tolerance(tolerance);

    let outcome = BatchedNewton::new(config).solve(indep, evaluator, niter, nsim_targets)?;
    Ok(outcome.codes())
}
