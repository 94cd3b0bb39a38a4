//! Batched Newton-Raphson solver.
//!
//! This module provides the numerical engine: the outer Newton loop, the
//! block-diagonal extraction from the full Jacobian, the per-block linear
//! solves and the bound clamping.
//!
//! ## Block structure
//!
//! The unknown vector of length `N = niter * nsim_targets` is split into
//! `niter` contiguous blocks. Only the diagonal blocks of the Jacobian are
//! read:
//!
//! ```text
//! [ J_0  .    .   ] [ x_0 ]   [ f_0 ]
//! [ .    J_1  .   ] [ x_1 ] = [ f_1 ]
//! [ .    .    J_2 ] [ x_2 ]   [ f_2 ]
//! ```
//!
//! Each `J_b` is `nsim_targets × nsim_targets` and is solved on its own.

mod config;
mod lu;
mod newton;
mod status;

pub use config::SolveConfig;
pub use lu::{LinearSolver, LuSolver};
pub use newton::{BatchedNewton, SolveOutcome};
pub use status::BlockStatus;

/// Default lower bound for the unknowns.
pub const DEFAULT_INDEP_MIN: f64 = 0.0;

/// Default upper bound for the unknowns.
pub const DEFAULT_INDEP_MAX: f64 = 1000.0;

/// Default outer iteration budget.
pub const DEFAULT_MAX_ITERS: usize = 50;

/// Default convergence tolerance on the Newton step norm.
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// Relative pivot threshold: a block Jacobian is singular when a pivot falls
/// below this fraction of its largest entry.
pub const PIVOT_EPSILON: f64 = 1e-15;
