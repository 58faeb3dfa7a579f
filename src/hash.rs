//! The numeric hash functions: the p-stable AM04 hash that maps points to
//! integers, and the universal mod-P hash that reduces integer vectors to
//! bucket indexes and fingerprints.
use crate::data::Fingerprint;
use crate::error::{Error, Result};
use ndarray::prelude::*;
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Largest prime below 2^32. All universal hashing is done mod P.
pub const P: u64 = 4_294_967_291;

/// Common capability of the numeric hash functions in this crate.
pub trait HashFunction {
    type Input: ?Sized;
    type Output;

    /// Length of the input vectors this function accepts.
    fn dimension(&self) -> usize;
    fn apply(&self, v: &Self::Input) -> Result<Self::Output>;
}

/// Universal hash over integer vectors: sum of z\[i\] * r\[i\] mod P,
/// truncated to the output width `K`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ModPHash<K = u32> {
    r: Vec<u64>,
    phantom: PhantomData<K>,
}

impl<K: Fingerprint> ModPHash<K> {
    /// Draw the coefficients uniformly from u32.
    pub fn new(dim: usize, rng: &mut SmallRng) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidParameters(
                "hash dimension must be > 0".to_string(),
            ));
        }
        let r = (0..dim).map(|_| rng.gen::<u32>() as u64).collect();
        Ok(ModPHash {
            r,
            phantom: PhantomData,
        })
    }

    fn check_dim(&self, len: usize) -> Result<()> {
        if len != self.r.len() {
            return Err(Error::InvalidDimension {
                expected: self.r.len(),
                got: len,
            });
        }
        Ok(())
    }

    /// The running sum mod P, before truncation to the output width.
    /// Linear in the input vector mod P.
    pub fn hash_mod_p(&self, z: &[i32]) -> Result<u64> {
        self.check_dim(z.len())?;
        let mut acc: u64 = 0;
        for (&zi, &ri) in z.iter().zip(&self.r) {
            // promote to 64 bit so the product cannot overflow
            let prod = (zi as i64 * ri as i64).rem_euclid(P as i64) as u64;
            acc = (acc + prod) % P;
        }
        Ok(acc)
    }

    pub fn hash(&self, z: &[i32]) -> Result<K> {
        Ok(K::truncate(self.hash_mod_p(z)?))
    }

    /// Scalar form for one-dimensional input.
    pub fn hash_scalar(&self, z: i32) -> Result<K> {
        self.hash(&[z])
    }
}

impl<K: Fingerprint> HashFunction for ModPHash<K> {
    type Input = [i32];
    type Output = K;

    fn dimension(&self) -> usize {
        self.r.len()
    }

    fn apply(&self, v: &[i32]) -> Result<K> {
        self.hash(v)
    }
}

/// A single p-stable hash h(v) = floor(a.v / R + b). [Read more.](https://www.cs.princeton.edu/courses/archive/spring05/cos598E/bib/p253-datar.pdf)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Am04Hash {
    pub a: Array1<f64>,
    pub b: f64,
    pub r: f64,
}

impl Am04Hash {
    /// Hash a data point. Rounding is toward negative infinity.
    pub fn hash(&self, v: &[f64]) -> Result<i32> {
        if v.len() != self.a.len() {
            return Err(Error::InvalidDimension {
                expected: self.a.len(),
                got: v.len(),
            });
        }
        Ok((self.a.dot(&aview1(v)) / self.r + self.b).floor() as i32)
    }
}

impl HashFunction for Am04Hash {
    type Input = [f64];
    type Output = i32;

    fn dimension(&self) -> usize {
        self.a.len()
    }

    fn apply(&self, v: &[f64]) -> Result<i32> {
        self.hash(v)
    }
}

/// Family of p-stable hashes for one (d, w, R) configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Am04HashFamily {
    dim: usize,
    w: f64,
    r: f64,
}

impl Am04HashFamily {
    pub fn new(dim: usize, w: f64, r: f64) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidParameters(
                "point dimension must be > 0".to_string(),
            ));
        }
        if w <= 0. {
            return Err(Error::InvalidParameters(format!(
                "bucket width w must be > 0, got {}",
                w
            )));
        }
        if r <= 0. {
            return Err(Error::InvalidParameters(format!(
                "radius R must be > 0, got {}",
                r
            )));
        }
        Ok(Am04HashFamily { dim, w, r })
    }

    /// Draw a new hash: a ~ N(0, 1/w^2) per component, b ~ U[0, 1).
    pub fn sample(&self, rng: &mut SmallRng) -> Am04Hash {
        let a: Array1<f64> = Array::random_using(self.dim, StandardNormal, rng);
        Am04Hash {
            a: a.mapv(|x| x / self.w),
            b: rng.gen::<f64>(),
            r: self.r,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}
