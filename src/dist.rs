//! Distance functions for the exact verification step.
use ndarray::prelude::*;

/// L2 norm of a single vector.
///
/// # Examples
///
/// ```
/// use pstable_lsh::dist::l2_norm;
/// let a = vec![3., -4.];
/// assert!((l2_norm(&a) - 5.).abs() < 1e-12);
/// ```
pub fn l2_norm(x: &[f64]) -> f64 {
    let x = aview1(x);
    x.dot(&x).sqrt()
}

/// Euclidean distance between two vectors.
///
/// # Panics
///
/// Panics if `a.len() != b.len()`.
///
/// # Examples
///
/// ```
/// use pstable_lsh::dist::l2_dist;
/// let d = l2_dist(&[0., 0.], &[3., 4.]);
/// assert!((d - 5.).abs() < 1e-12);
/// ```
pub fn l2_dist(a: &[f64], b: &[f64]) -> f64 {
    let d = &aview1(a) - &aview1(b);
    d.dot(&d).sqrt()
}
