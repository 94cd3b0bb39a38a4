//! Newton-Raphson iteration over independent blocks.

use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, debug_span, trace, warn};

use super::{BlockStatus, LinearSolver, LuSolver, SolveConfig};
use crate::error::{NewtonError, Result};
use crate::evaluator::{Evaluation, Evaluator};
use crate::norm::euclid_norm;

/// Result of a batched solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    /// Final status of each block, in block order
    pub statuses: Vec<BlockStatus>,
    /// Outer iterations performed (the largest count over all chunks)
    pub iterations: usize,
    /// Total evaluator calls
    pub evaluations: usize,
}

impl SolveOutcome {
    /// Integer status codes, one per block.
    pub fn codes(&self) -> Vec<i32> {
        self.statuses.iter().map(|s| s.code()).collect()
    }

    /// Whether every block finished converged.
    pub fn all_converged(&self) -> bool {
        self.statuses.iter().all(|s| s.is_converged())
    }
}

/// Per-block bookkeeping carried through the outer loop.
#[derive(Debug, Clone, Copy, Default)]
struct BlockState {
    status: BlockStatus,
    /// Converged or degenerate; never solved again
    frozen: bool,
}

/// What one block did during a sweep.
enum BlockStep {
    /// Step staged, block keeps iterating
    Staged,
    /// Step staged and its norm was below tolerance
    Converged,
    /// Linear solve failed or produced a non-finite step
    Degenerate,
}

/// Mutable state of one solve call.
struct SweepState {
    blocks: Vec<BlockState>,
    n_frozen: usize,
}

impl SweepState {
    fn new(niter: usize) -> Self {
        Self {
            blocks: vec![BlockState::default(); niter],
            n_frozen: 0,
        }
    }

    fn all_frozen(&self) -> bool {
        self.n_frozen == self.blocks.len()
    }

    fn into_statuses(self) -> Vec<BlockStatus> {
        self.blocks.into_iter().map(|b| b.status).collect()
    }
}

/// Check that `indep` holds exactly `niter * nsim_targets` values.
fn checked_len(indep: &[f64], niter: usize, nsim_targets: usize) -> Result<usize> {
    let n_total = niter.checked_mul(nsim_targets).ok_or_else(|| {
        NewtonError::invalid_config(format!(
            "niter ({}) * nsim_targets ({}) overflows usize",
            niter, nsim_targets
        ))
    })?;
    if indep.len() != n_total {
        return Err(NewtonError::length_mismatch(n_total, indep.len()));
    }
    Ok(n_total)
}

/// Batched Newton-Raphson solver for block-diagonal systems.
///
/// One evaluator call per outer iteration produces residuals and the full
/// Jacobian. Each unsolved block then extracts its diagonal sub-block,
/// solves `J_b w = f_b` and stages `w`. The whole vector is updated with
/// `x := x - w` and clamped to `[indep_min, indep_max]`.
///
/// # Example
///
/// ```
/// use batched_newton::{BatchedNewton, BlockStatus, SolveConfig};
///
/// // Two independent blocks: x = 2 and x = 7
/// let mut f = |x: &[f64]| {
///     let residuals = vec![x[0] - 2.0, x[1] - 7.0];
///     let jacobian = vec![1.0, 0.0, 0.0, 1.0];
///     (residuals, jacobian)
/// };
///
/// let solver = BatchedNewton::new(SolveConfig::default());
/// let mut x = vec![1.0, 1.0];
/// let outcome = solver.solve(&mut x, &mut f, 2, 1).unwrap();
///
/// assert!(outcome.all_converged());
/// assert_eq!(x, vec![2.0, 7.0]);
/// assert_eq!(outcome.statuses[0], BlockStatus::Converged);
/// ```
#[derive(Debug, Clone)]
pub struct BatchedNewton<S = LuSolver> {
    config: SolveConfig,
    linear: S,
}

impl BatchedNewton<LuSolver> {
    /// Create a solver using the built-in LU block solve.
    pub fn new(config: SolveConfig) -> Self {
        Self::with_solver(config, LuSolver::new())
    }
}

impl Default for BatchedNewton<LuSolver> {
    fn default() -> Self {
        Self::new(SolveConfig::default())
    }
}

impl<S: LinearSolver> BatchedNewton<S> {
    /// Create a solver with a custom dense linear solver for the blocks.
    pub fn with_solver(config: SolveConfig, linear: S) -> Self {
        Self { config, linear }
    }

    /// Returns a reference to the solve configuration.
    pub fn config(&self) -> &SolveConfig {
        &self.config
    }

    /// Drive every block of `indep` to a root.
    ///
    /// `indep` is updated in place and must have length
    /// `niter * nsim_targets`. A length mismatch is reported before the
    /// evaluator is called. Non-convergence, clamping and degenerate blocks
    /// are reported through the returned statuses, not as errors.
    ///
    /// An evaluator failure aborts the solve; `indep` then holds the
    /// iterate reached so far.
    pub fn solve<E: Evaluator>(
        &self,
        indep: &mut [f64],
        evaluator: &mut E,
        niter: usize,
        nsim_targets: usize,
    ) -> Result<SolveOutcome> {
        let n_total = checked_len(indep, niter, nsim_targets)?;
        if nsim_targets == 0 && niter > 0 {
            return Err(NewtonError::invalid_config("nsim_targets must be positive"));
        }

        let _span = debug_span!("batched_newton", niter, nsim_targets).entered();

        let mut state = SweepState::new(niter);
        let mut delta = vec![0.0; n_total];
        let mut iterations = 0;

        while !state.all_frozen() && iterations < self.config.max_iters {
            iterations += 1;
            debug!(
                iteration = iterations,
                unsolved = niter - state.n_frozen,
                "Newton iteration"
            );

            let eval = evaluator.evaluate(indep)?;
            eval.check_shape(n_total)?;

            self.sweep(&eval, nsim_targets, &mut state, &mut delta);

            // Update x = x - w
            for (x, d) in indep.iter_mut().zip(&delta) {
                *x -= d;
            }

            self.clamp(indep, nsim_targets, &mut state.blocks);
        }

        if !state.all_frozen() {
            warn!(
                iterations,
                unsolved = niter - state.n_frozen,
                "Iteration budget exhausted with unsolved blocks"
            );
        }

        Ok(SolveOutcome {
            statuses: state.into_statuses(),
            iterations,
            evaluations: iterations,
        })
    }

    /// Solve `indep` in runs of at most `chunk_blocks` blocks.
    ///
    /// Each run is an independent [`solve`](Self::solve) with its own
    /// evaluator, built by `make_evaluator` from the run's block range. The
    /// Jacobian held in memory is therefore bounded by the run size instead
    /// of the whole batch. The evaluator for a run sees only that run's
    /// slice of `indep`.
    pub fn solve_chunked<E, M>(
        &self,
        indep: &mut [f64],
        niter: usize,
        nsim_targets: usize,
        chunk_blocks: usize,
        mut make_evaluator: M,
    ) -> Result<SolveOutcome>
    where
        E: Evaluator,
        M: FnMut(Range<usize>) -> E,
    {
        let n_total = checked_len(indep, niter, nsim_targets)?;
        if chunk_blocks == 0 {
            return Err(NewtonError::invalid_config("chunk_blocks must be positive"));
        }

        let mut outcome = SolveOutcome {
            statuses: Vec::with_capacity(niter),
            iterations: 0,
            evaluations: 0,
        };

        let mut start = 0;
        while start < niter {
            let end = (start + chunk_blocks).min(niter);
            debug!(first_block = start, last_block = end - 1, "Solving chunk");

            let mut evaluator = make_evaluator(start..end);
            let chunk = &mut indep[start * nsim_targets..end * nsim_targets];
            let part = self.solve(chunk, &mut evaluator, end - start, nsim_targets)?;

            outcome.statuses.extend(part.statuses);
            outcome.iterations = outcome.iterations.max(part.iterations);
            outcome.evaluations += part.evaluations;
            start = end;
        }

        Ok(outcome)
    }

    /// Solve every unfrozen block and stage its step into `delta`.
    ///
    /// Frozen blocks get a zero step.
    fn sweep(&self, eval: &Evaluation, nsim: usize, state: &mut SweepState, delta: &mut [f64]) {
        delta.fill(0.0);
        if nsim == 0 {
            return;
        }

        #[cfg(feature = "parallel")]
        {
            delta
                .par_chunks_mut(nsim)
                .zip(state.blocks.par_iter_mut())
                .enumerate()
                .for_each_init(
                    || vec![0.0; nsim * nsim],
                    |block_jac, (block, (step, bs))| {
                        self.update_block(block, nsim, eval, block_jac, step, bs);
                    },
                );
        }

        #[cfg(not(feature = "parallel"))]
        {
            let mut block_jac = vec![0.0; nsim * nsim];
            for (block, (step, bs)) in delta
                .chunks_mut(nsim)
                .zip(state.blocks.iter_mut())
                .enumerate()
            {
                self.update_block(block, nsim, eval, &mut block_jac, step, bs);
            }
        }

        state.n_frozen = state.blocks.iter().filter(|b| b.frozen).count();
    }

    fn update_block(
        &self,
        block: usize,
        nsim: usize,
        eval: &Evaluation,
        block_jac: &mut [f64],
        step: &mut [f64],
        bs: &mut BlockState,
    ) {
        if bs.frozen {
            return;
        }

        match self.block_step(block, nsim, eval, block_jac, step) {
            BlockStep::Staged => {}
            BlockStep::Converged => {
                trace!(block, "Block converged");
                bs.status = BlockStatus::Converged;
                bs.frozen = true;
            }
            BlockStep::Degenerate => {
                trace!(block, "Block Jacobian degenerate");
                step.fill(0.0);
                bs.status = BlockStatus::Degenerate;
                bs.frozen = true;
            }
        }
    }

    /// Compute the Newton step of one block into `step`.
    fn block_step(
        &self,
        block: usize,
        nsim: usize,
        eval: &Evaluation,
        block_jac: &mut [f64],
        step: &mut [f64],
    ) -> BlockStep {
        let n_total = eval.residuals.len();
        let offset = block * nsim;

        step.copy_from_slice(&eval.residuals[offset..offset + nsim]);

        // Diagonal block of the column-major full Jacobian
        for col in 0..nsim {
            let src = (offset + col) * n_total + offset;
            block_jac[col * nsim..(col + 1) * nsim]
                .copy_from_slice(&eval.jacobian[src..src + nsim]);
        }

        if self.linear.solve(nsim, block_jac, step).is_err() {
            return BlockStep::Degenerate;
        }

        if !step.iter().all(|w| w.is_finite()) {
            return BlockStep::Degenerate;
        }

        if euclid_norm(step) < self.config.tolerance {
            BlockStep::Converged
        } else {
            BlockStep::Staged
        }
    }

    /// Clamp every unknown to the configured bounds, tagging its block.
    fn clamp(&self, indep: &mut [f64], nsim: usize, blocks: &mut [BlockState]) {
        let SolveConfig {
            indep_min,
            indep_max,
            ..
        } = self.config;

        for (i, x) in indep.iter_mut().enumerate() {
            if *x < indep_min {
                *x = indep_min;
                blocks[i / nsim].status = BlockStatus::BelowMin;
            }
            if *x > indep_max {
                *x = indep_max;
                blocks[i / nsim].status = BlockStatus::AboveMax;
            }
        }
    }
}
