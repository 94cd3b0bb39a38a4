//! Euclidean norm used as the convergence metric.

/// Euclidean norm of `xs`.
///
/// Accumulates the sum of squares first and takes a single square root.
/// An empty slice has norm zero.
pub fn euclid_norm(xs: &[f64]) -> f64 {
    xs.iter().map(|x| x * x).sum::<f64>().sqrt()
}
