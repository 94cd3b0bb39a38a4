//! Forward-mode AD evaluator built on `num_dual::Dual64`.

use num_dual::Dual64;

use super::{Evaluation, Evaluator};
use crate::error::{NewtonError, Result};

/// Evaluator that differentiates a residual function with dual numbers.
///
/// The residual function is written once over [`Dual64`]. The Jacobian is
/// assembled one column at a time by seeding the derivative part of a
/// single unknown, which costs `N` function calls per evaluation.
///
/// # Example
///
/// ```
/// use batched_newton::evaluator::{DualEvaluator, Evaluator};
/// use num_dual::Dual64;
///
/// // f(x) = x² - 4 elementwise
/// let mut eval = DualEvaluator::new(|x: &[Dual64]| {
///     x.iter().map(|&xi| xi * xi - Dual64::from(4.0)).collect()
/// });
///
/// let e = eval.evaluate(&[3.0]).unwrap();
/// assert_eq!(e.residuals, vec![5.0]);
/// assert_eq!(e.jacobian, vec![6.0]);
/// ```
pub struct DualEvaluator<F> {
    f: F,
    seeds: Vec<Dual64>,
}

impl<F> DualEvaluator<F>
where
    F: Fn(&[Dual64]) -> Vec<Dual64>,
{
    /// Wrap a residual function written over dual numbers.
    pub fn new(f: F) -> Self {
        Self {
            f,
            seeds: Vec::new(),
        }
    }
}

impl<F> Evaluator for DualEvaluator<F>
where
    F: Fn(&[Dual64]) -> Vec<Dual64>,
{
    fn evaluate(&mut self, x: &[f64]) -> Result<Evaluation> {
        let n = x.len();
        let mut residuals = vec![0.0; n];
        let mut jacobian = vec![0.0; n * n];

        self.seeds.clear();
        self.seeds.extend(x.iter().map(|&xi| Dual64::from(xi)));

        for col in 0..n {
            self.seeds[col].eps = 1.0;
            let out = (self.f)(&self.seeds);
            self.seeds[col].eps = 0.0;

            if out.len() != n {
                return Err(NewtonError::evaluation_shape("residuals", n, out.len()));
            }

            if col == 0 {
                for (r, v) in residuals.iter_mut().zip(&out) {
                    *r = v.re;
                }
            }

            let column = &mut jacobian[col * n..(col + 1) * n];
            for (j, v) in column.iter_mut().zip(&out) {
                *j = v.eps;
            }
        }

        Ok(Evaluation::new(residuals, jacobian))
    }
}
