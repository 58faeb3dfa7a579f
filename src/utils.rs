use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// RNG for reproducible sampling. A seed of 0 seeds from the OS.
pub fn create_rng(seed: u64) -> SmallRng {
    if seed == 0 {
        SmallRng::from_entropy()
    } else {
        SmallRng::seed_from_u64(seed)
    }
}

pub fn rand_unit_vec<RNG: Rng>(size: usize, rng: RNG) -> Vec<f64> {
    rng.sample_iter(StandardNormal).take(size).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_create_rng_deterministic() {
        let a: u64 = create_rng(12).gen();
        let b: u64 = create_rng(12).gen();
        assert_eq!(a, b);
    }
}
