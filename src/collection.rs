//! Hash collections: the g- and u-compositions of AM04 hashes.
//!
//! A g-function concatenates k independent hashes, one collection per
//! table. A u-function concatenates two half collections drawn from a
//! shared pool of m, so a pool serves L = m (m - 1) / 2 tables while only
//! m half evaluations are computed per point.
use crate::error::{Error, Result};
use crate::hash::{Am04Hash, Am04HashFamily};
use crate::utils::create_rng;
use itertools::Itertools;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maps a data point to a hash vector. Implement this trait to drive the
/// index with your own hash collections.
pub trait VecHash {
    /// Dimension of the data points.
    fn dim(&self) -> usize;
    /// Length of the produced hash vector.
    fn hash_len(&self) -> usize;
    /// Hash a data point.
    fn hash_vec(&self, v: &[f64]) -> Result<Vec<i32>>;

    /// Evaluate the shared state for `v` once. The result can be passed to
    /// every collection drawing from the same pool.
    fn precompute(&self, _v: &[f64]) -> Result<Precomputed> {
        Ok(Precomputed::Identity)
    }

    /// Hash through previously computed state.
    fn hash_vec_precomputed(&self, v: &[f64], _pre: &Precomputed) -> Result<Vec<i32>> {
        self.hash_vec(v)
    }
}

/// Output of [VecHash::precompute]. `Identity` stands for the point itself.
#[derive(Clone, Debug)]
pub enum Precomputed {
    Identity,
    Halves {
        pool: Arc<HashPool>,
        halves: Vec<Vec<i32>>,
    },
}

/// k independent AM04 hashes. Two of its hash vectors collide with
/// probability p(c)^k for points at distance c.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HashCollection {
    hashes: Vec<Am04Hash>,
    dim: usize,
}

impl HashCollection {
    pub fn sample(family: &Am04HashFamily, k: usize, rng: &mut SmallRng) -> Self {
        let hashes = (0..k).map(|_| family.sample(rng)).collect();
        HashCollection {
            hashes,
            dim: family.dim(),
        }
    }
}

impl VecHash for HashCollection {
    fn dim(&self) -> usize {
        self.dim
    }

    fn hash_len(&self) -> usize {
        self.hashes.len()
    }

    fn hash_vec(&self, v: &[f64]) -> Result<Vec<i32>> {
        self.hashes.iter().map(|h| h.hash(v)).collect()
    }
}

/// Shared, immutable pool of half-size collections backing the u-functions.
#[derive(Serialize, Deserialize, Debug)]
pub struct HashPool {
    collections: Vec<HashCollection>,
}

impl HashPool {
    /// Evaluate all m half collections for one point.
    pub fn hash_all(&self, v: &[f64]) -> Result<Vec<Vec<i32>>> {
        self.collections.iter().map(|c| c.hash_vec(v)).collect()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// u-function: the concatenation of two half collections from a shared
/// pool. Pool identity is pointer identity; a precomputation carrying a
/// foreign pool is rejected.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CompositeHashCollection {
    pool: Arc<HashPool>,
    left: usize,
    right: usize,
}

impl CompositeHashCollection {
    /// The (i, j) pair into the pool, i < j.
    pub fn pair(&self) -> (usize, usize) {
        (self.left, self.right)
    }

    fn concat(&self, left: &[i32], right: &[i32]) -> Vec<i32> {
        let mut out = Vec::with_capacity(left.len() + right.len());
        out.extend_from_slice(left);
        out.extend_from_slice(right);
        out
    }
}

impl VecHash for CompositeHashCollection {
    fn dim(&self) -> usize {
        self.pool.collections[self.left].dim
    }

    fn hash_len(&self) -> usize {
        self.pool.collections[self.left].hashes.len()
            + self.pool.collections[self.right].hashes.len()
    }

    fn hash_vec(&self, v: &[f64]) -> Result<Vec<i32>> {
        let left = self.pool.collections[self.left].hash_vec(v)?;
        let right = self.pool.collections[self.right].hash_vec(v)?;
        Ok(self.concat(&left, &right))
    }

    fn precompute(&self, v: &[f64]) -> Result<Precomputed> {
        Ok(Precomputed::Halves {
            pool: self.pool.clone(),
            halves: self.pool.hash_all(v)?,
        })
    }

    fn hash_vec_precomputed(&self, v: &[f64], pre: &Precomputed) -> Result<Vec<i32>> {
        match pre {
            Precomputed::Identity => self.hash_vec(v),
            Precomputed::Halves { pool, halves } => {
                if !Arc::ptr_eq(pool, &self.pool) {
                    return Err(Error::PoolMismatch);
                }
                Ok(self.concat(&halves[self.left], &halves[self.right]))
            }
        }
    }
}

/// Sample L independent g-functions of k hashes each.
pub fn build_g(
    dim: usize,
    w: f64,
    k: usize,
    l: usize,
    r: f64,
    seed: u64,
) -> Result<Vec<HashCollection>> {
    if k == 0 {
        return Err(Error::InvalidParameters("k must be > 0".to_string()));
    }
    if l == 0 {
        return Err(Error::InvalidParameters(
            "at least one table is required".to_string(),
        ));
    }
    let family = Am04HashFamily::new(dim, w, r)?;
    let mut rng = create_rng(seed);
    Ok((0..l)
        .map(|_| HashCollection::sample(&family, k, &mut rng))
        .collect())
}

/// Sample a pool of m half collections and emit the L = m (m - 1) / 2
/// u-functions over it, in lexicographic (i, j) order.
pub fn build_u(
    dim: usize,
    w: f64,
    k: usize,
    l: usize,
    r: f64,
    m: usize,
    seed: u64,
) -> Result<Vec<CompositeHashCollection>> {
    if k == 0 || k % 2 != 0 {
        return Err(Error::InvalidParameters(format!(
            "k must be even and > 0, got {}",
            k
        )));
    }
    if m < 2 {
        return Err(Error::InvalidParameters(format!(
            "pool size m must be >= 2, got {}",
            m
        )));
    }
    if l != m * (m - 1) / 2 {
        return Err(Error::InvalidParameters(format!(
            "L must equal m (m - 1) / 2 = {}, got {}",
            m * (m - 1) / 2,
            l
        )));
    }
    let family = Am04HashFamily::new(dim, w, r)?;
    let mut rng = create_rng(seed);
    let collections = (0..m)
        .map(|_| HashCollection::sample(&family, k / 2, &mut rng))
        .collect();
    let pool = Arc::new(HashPool { collections });
    Ok((0..m)
        .tuple_combinations::<(_, _)>()
        .map(|(left, right)| CompositeHashCollection {
            pool: pool.clone(),
            left,
            right,
        })
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::rand_unit_vec;

    #[test]
    fn test_build_u_pair_order() {
        let collections = build_u(10, 4., 6, 10, 1., 5, 1).unwrap();
        assert_eq!(collections.len(), 10);
        let pairs: Vec<(usize, usize)> = collections.iter().map(|c| c.pair()).collect();
        let expect = vec![
            (0, 1),
            (0, 2),
            (0, 3),
            (0, 4),
            (1, 2),
            (1, 3),
            (1, 4),
            (2, 3),
            (2, 4),
            (3, 4),
        ];
        assert_eq!(pairs, expect);
        for c in &collections {
            assert_eq!(c.hash_len(), 6);
            assert_eq!(c.dim(), 10);
        }
    }

    #[test]
    fn test_build_u_invalid_params() {
        // k odd
        assert!(build_u(10, 4., 5, 10, 1., 5, 1).is_err());
        // L inconsistent with m
        assert!(build_u(10, 4., 6, 9, 1., 5, 1).is_err());
        // pool too small
        assert!(build_u(10, 4., 6, 0, 1., 1, 1).is_err());
        // family params
        assert!(build_u(0, 4., 6, 10, 1., 5, 1).is_err());
        assert!(build_g(10, -1., 6, 10, 1., 1).is_err());
        assert!(build_g(10, 4., 6, 10, 0., 1).is_err());
    }

    #[test]
    fn test_precompute_equivalence() {
        let mut rng = create_rng(4);
        let collections = build_u(10, 4., 6, 10, 1., 5, 4).unwrap();
        for _ in 0..20 {
            let v = rand_unit_vec(10, &mut rng);
            let pre = collections[0].precompute(&v).unwrap();
            for c in &collections {
                assert_eq!(
                    c.hash_vec(&v).unwrap(),
                    c.hash_vec_precomputed(&v, &pre).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_precompute_identity_falls_back() {
        let mut rng = create_rng(5);
        let collections = build_u(8, 4., 4, 3, 1., 3, 5).unwrap();
        let v = rand_unit_vec(8, &mut rng);
        let raw = collections[0].hash_vec(&v).unwrap();
        let via_identity = collections[0]
            .hash_vec_precomputed(&v, &Precomputed::Identity)
            .unwrap();
        assert_eq!(raw, via_identity);
    }

    #[test]
    fn test_pool_mismatch() {
        let mut rng = create_rng(6);
        let a = build_u(8, 4., 4, 3, 1., 3, 6).unwrap();
        let b = build_u(8, 4., 4, 3, 1., 3, 7).unwrap();
        let v = rand_unit_vec(8, &mut rng);
        let pre = a[0].precompute(&v).unwrap();
        assert_eq!(b[0].hash_vec_precomputed(&v, &pre), Err(Error::PoolMismatch));
    }

    #[test]
    fn test_g_collection() {
        let collections = build_g(4, 4., 3, 7, 1., 2).unwrap();
        assert_eq!(collections.len(), 7);
        let v = [0.1, -0.3, 0.5, 0.7];
        for c in &collections {
            assert_eq!(c.hash_len(), 3);
            let pre = c.precompute(&v).unwrap();
            assert_eq!(c.hash_vec(&v).unwrap(), c.hash_vec_precomputed(&v, &pre).unwrap());
        }
    }
}
