//! Parameter estimation for the hash family, in the style of the E2LSH
//! manual.
use statrs::consts::SQRT_2PI;
use statrs::distribution::{Normal, Univariate};

/// Collision probability of a single AM04 hash for two points at distance
/// c, with bucket width w. Distances are in units of R.
///
/// Compute P1 with c = 1, P2 with the approximation factor c.
pub fn collision_prob(w: f64, c: f64) -> f64 {
    let norm = Normal::new(0., 1.).unwrap();
    1. - 2. * norm.cdf(-w / c)
        - 2. / (SQRT_2PI * w / c) * (1. - (-(w.powf(2.) / (2. * c.powf(2.)))).exp())
}

/// Number of tables needed to return an R-near neighbor with
/// probability 1 - delta.
///
/// # Arguments
/// * `delta` - Probability the neighbor is not returned.
/// * `p1` - Single-hash collision probability at distance R.
/// * `k` - Number of hashes per collection.
pub fn estimate_l(delta: f64, p1: f64, k: usize) -> usize {
    (delta.ln() / (1. - p1.powf(k as f64)).ln()).round() as usize
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_collision_prob() {
        // tested w/ numpy
        assert!((collision_prob(2.0, 1.0) - 0.609548422215397).abs() < 1e-9);
        // farther points collide less
        assert!(collision_prob(2.0, 2.0) < collision_prob(2.0, 1.0));
    }

    #[test]
    fn test_estimate_l() {
        let delta = 0.2;
        let p1 = 0.6;
        let k = 5;
        assert_eq!(20, estimate_l(delta, p1, k));
    }
}
