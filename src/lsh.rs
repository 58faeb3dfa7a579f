//! The LSH index: L hash tables driven by one family of hash collections.
use crate::collection::VecHash;
use crate::data::Fingerprint;
use crate::dist::l2_dist;
use crate::error::{Error, Result};
use crate::table::{HashTable, PointId};
use crate::utils::create_rng;
use fnv::FnvHashSet;
use log::{debug, trace};
use rayon::prelude::*;


/// R-near-neighbor index over a borrowed dataset.
///
/// Built once, immutable afterwards. Every data point is inserted into all
/// L tables; a query probes all L tables and verifies the surfaced
/// candidates against the exact Euclidean distance.
///
/// # Example
///
/// ```
/// use pstable_lsh::prelude::*;
/// let points = vec![
///     vec![0., 0.],
///     vec![1., 0.],
///     vec![10., 10.],
/// ];
/// let collections = build_g(2, 4., 4, 10, 1.5, 1).unwrap();
/// let index: LshIndex<_, u32> = LshIndex::build(1.5, collections, &points, 1).unwrap();
/// let ids = index.query(&[0., 0.]).unwrap();
/// assert!(ids.contains(&0));
/// ```
pub struct LshIndex<'a, H, K = u32>
where
    H: VecHash,
    K: Fingerprint,
{
    /// Query radius. Also the divisor inside the AM04 hashes.
    pub r: f64,
    points: &'a [Vec<f64>],
    collections: Vec<H>,
    tables: Vec<HashTable<K>>,
}

impl<'a, H, K> LshIndex<'a, H, K>
where
    H: VecHash,
    K: Fingerprint,
{
    /// Build an index with the default two slots per data point.
    pub fn build(r: f64, collections: Vec<H>, points: &'a [Vec<f64>], seed: u64) -> Result<Self> {
        Self::build_with_capacity_factor(r, collections, points, 2, seed)
    }

    /// The tables never rehash; they are sized up front to
    /// `factor * points.len()` slots each.
    pub fn build_with_capacity_factor(
        r: f64,
        collections: Vec<H>,
        points: &'a [Vec<f64>],
        factor: usize,
        seed: u64,
    ) -> Result<Self> {
        if r <= 0. {
            return Err(Error::InvalidParameters(format!(
                "radius R must be > 0, got {}",
                r
            )));
        }
        if collections.is_empty() {
            return Err(Error::InvalidParameters(
                "at least one hash collection is required".to_string(),
            ));
        }
        let mut rng = create_rng(seed);
        let mut tables = Vec::with_capacity(collections.len());
        for c in &collections {
            tables.push(HashTable::new(c.hash_len(), points.len(), factor, &mut rng)?);
        }
        let mut index = LshIndex {
            r,
            points,
            collections,
            tables,
        };
        for (i, p) in points.iter().enumerate() {
            index.insert(i as PointId, p)?;
        }
        debug!(
            "built lsh index: {} tables, {} points, R = {}",
            index.tables.len(),
            points.len(),
            r
        );
        Ok(index)
    }

    fn insert(&mut self, id: PointId, p: &[f64]) -> Result<()> {
        let pre = self.collections[0].precompute(p)?;
        for (c, t) in self.collections.iter().zip(self.tables.iter_mut()) {
            let hash = c.hash_vec_precomputed(p, &pre)?;
            t.insert(&hash, id)?;
        }
        Ok(())
    }

    /// All points within distance R of `q`.
    ///
    /// Every candidate surfaced by the tables is distance-checked at most
    /// once and the returned ids are unique. Order is unspecified.
    pub fn query(&self, q: &[f64]) -> Result<Vec<PointId>> {
        let pre = self.collections[0].precompute(q)?;
        let mut tried = vec![false; self.points.len()];
        let mut neighbors = Vec::new();
        let mut n_candidates = 0;
        for (c, t) in self.collections.iter().zip(&self.tables) {
            let hash = c.hash_vec_precomputed(q, &pre)?;
            let ids = match t.lookup(&hash)? {
                None => continue,
                Some(ids) => ids,
            };
            n_candidates += ids.len();
            for &id in ids {
                if tried[id as usize] {
                    continue;
                }
                tried[id as usize] = true;
                if l2_dist(&self.points[id as usize], q) <= self.r {
                    neighbors.push(id);
                }
            }
        }
        trace!(
            "query surfaced {} candidates, {} within radius",
            n_candidates,
            neighbors.len()
        );
        Ok(neighbors)
    }

    /// Like [query](LshIndex::query), resolving ids to the borrowed points.
    pub fn query_points(&self, q: &[f64]) -> Result<Vec<&'a Vec<f64>>> {
        let points = self.points;
        Ok(self
            .query(q)?
            .into_iter()
            .map(move |id| &points[id as usize])
            .collect())
    }

    /// The deduplicated union of all bucket candidates, without the
    /// distance filter.
    pub fn query_candidates(&self, q: &[f64]) -> Result<Vec<PointId>> {
        let pre = self.collections[0].precompute(q)?;
        let mut union: FnvHashSet<PointId> = FnvHashSet::default();
        for (c, t) in self.collections.iter().zip(&self.tables) {
            let hash = c.hash_vec_precomputed(q, &pre)?;
            if let Some(ids) = t.lookup(&hash)? {
                union.extend(ids.iter().copied());
            }
        }
        Ok(union.into_iter().collect())
    }

    pub fn query_batch(&self, qs: &[Vec<f64>]) -> Result<Vec<Vec<PointId>>> {
        qs.iter().map(|q| self.query(q)).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn n_tables(&self) -> usize {
        self.tables.len()
    }

    /// Occupancy statistics of the underlying bucket maps.
    /// # Statistics
    /// * average bucket length
    /// * minimal bucket length
    /// * maximum bucket length
    /// * bucket length standard deviation
    pub fn describe(&self) -> String {
        let mut lengths: Vec<usize> = vec![];
        for t in &self.tables {
            for (_, ids) in t.bucket_map().buckets() {
                lengths.push(ids.len());
            }
        }
        if lengths.is_empty() {
            return "empty index".to_string();
        }
        let max_len = lengths.iter().max().copied().unwrap_or(0);
        let min_len = lengths.iter().min().copied().unwrap_or(0);
        let avg = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
        let var = lengths
            .iter()
            .map(|&v| (avg - v as f64).powf(2.))
            .sum::<f64>()
            / lengths.len() as f64;
        let std_dev = var.powf(0.5);

        let mut out = String::from(&format!("No. of tables: {}\n", self.tables.len()));
        out.push_str(&format!("No. of points: {}\n", self.points.len()));
        out.push_str("\nBucket lengths:\n");
        out.push_str(&format!("avg:\t{:?}\n", avg));
        out.push_str(&format!("std-dev:\t{:?}\n", std_dev));
        out.push_str(&format!("min:\t{:?}\n", min_len));
        out.push_str(&format!("max:\t{:?}\n", max_len));
        out
    }
}

impl<'a, H, K> LshIndex<'a, H, K>
where
    H: VecHash + Sync,
    K: Fingerprint,
{
    /// Query a batch of points in parallel.
    ///
    /// # Arguments
    /// * `qs` - Array of query points.
    pub fn query_batch_par(&self, qs: &[Vec<f64>]) -> Result<Vec<Vec<PointId>>> {
        qs.into_par_iter().map(|q| self.query(q)).collect()
    }
}
