//! The two-level hash tables. The probe position of a slot comes from the
//! t1 hash of a k-vector, the stored key is its t2 fingerprint.
use crate::data::Fingerprint;
use crate::error::{Error, Result};
use crate::hash::ModPHash;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

/// Index of a data point in the dataset.
pub type PointId = u32;
/// Bucket contains indexes into the dataset.
pub type Bucket = Vec<PointId>;

#[derive(Serialize, Deserialize, Clone, Debug)]
enum Slot<K> {
    Empty,
    Occupied { fingerprint: K, ids: Bucket },
}

/// Open-addressing map from (bucket index, fingerprint) to point ids.
///
/// Equality inside the map is fingerprint equality, never structural
/// equality on the original k-vector. Distinct k-vectors may collide into
/// one slot; the Euclidean post-filter removes the resulting false
/// positives. The map is sized at construction and never rehashes.
#[derive(Serialize, Deserialize, Debug)]
pub struct BucketMap<K> {
    slots: Vec<Slot<K>>,
    mask: u32,
    occupied: usize,
}

impl<K: Fingerprint> BucketMap<K> {
    /// Capacity is the next power of two >= factor * n_points.
    pub fn with_capacity(n_points: usize, factor: usize) -> Self {
        let n_slots = (n_points.max(1) * factor.max(1)).next_power_of_two();
        BucketMap {
            slots: vec![Slot::Empty; n_slots],
            mask: (n_slots - 1) as u32,
            occupied: 0,
        }
    }

    pub fn n_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn n_occupied(&self) -> usize {
        self.occupied
    }

    /// Probing is triangular: idx, idx + 1, idx + 3, idx + 6, ... mod the
    /// capacity, which visits every slot once for power-of-two capacities.
    pub fn insert(&mut self, bucket: u32, fingerprint: K, id: PointId) -> Result<()> {
        let mask = self.mask as usize;
        let mut idx = (bucket & self.mask) as usize;
        for step in 1..=self.slots.len() {
            let slot = &mut self.slots[idx];
            match slot {
                Slot::Empty => {
                    *slot = Slot::Occupied {
                        fingerprint,
                        ids: vec![id],
                    };
                    self.occupied += 1;
                    return Ok(());
                }
                Slot::Occupied {
                    fingerprint: f,
                    ids,
                } if *f == fingerprint => {
                    ids.push(id);
                    return Ok(());
                }
                Slot::Occupied { .. } => idx = (idx + step) & mask,
            }
        }
        Err(Error::CapacityExceeded)
    }

    /// The ids stored under this (bucket, fingerprint) address. A hit may
    /// belong to a different k-vector that collided in both t1 and t2.
    pub fn get(&self, bucket: u32, fingerprint: K) -> Option<&[PointId]> {
        let mask = self.mask as usize;
        let mut idx = (bucket & self.mask) as usize;
        for step in 1..=self.slots.len() {
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied {
                    fingerprint: f,
                    ids,
                } if *f == fingerprint => return Some(ids.as_slice()),
                Slot::Occupied { .. } => idx = (idx + step) & mask,
            }
        }
        None
    }

    /// Iterate over the occupied slots.
    pub fn buckets(&self) -> impl Iterator<Item = (&K, &[PointId])> {
        self.slots.iter().filter_map(|s| match s {
            Slot::Occupied { fingerprint, ids } => Some((fingerprint, ids.as_slice())),
            Slot::Empty => None,
        })
    }
}

/// One of the L tables: an independent (t1, t2) pair over the k-vectors of
/// a single collection, backed by a [BucketMap].
#[derive(Serialize, Deserialize, Debug)]
pub struct HashTable<K> {
    t1: ModPHash<u32>,
    t2: ModPHash<K>,
    map: BucketMap<K>,
}

impl<K: Fingerprint> HashTable<K> {
    pub fn new(hash_len: usize, n_points: usize, factor: usize, rng: &mut SmallRng) -> Result<Self> {
        Ok(HashTable {
            t1: ModPHash::new(hash_len, rng)?,
            t2: ModPHash::new(hash_len, rng)?,
            map: BucketMap::with_capacity(n_points, factor),
        })
    }

    fn address(&self, hash: &[i32]) -> Result<(u32, K)> {
        Ok((self.t1.hash(hash)?, self.t2.hash(hash)?))
    }

    pub fn insert(&mut self, hash: &[i32], id: PointId) -> Result<()> {
        let (bucket, fingerprint) = self.address(hash)?;
        self.map.insert(bucket, fingerprint, id)
    }

    pub fn lookup(&self, hash: &[i32]) -> Result<Option<&[PointId]>> {
        let (bucket, fingerprint) = self.address(hash)?;
        Ok(self.map.get(bucket, fingerprint))
    }

    pub fn bucket_map(&self) -> &BucketMap<K> {
        &self.map
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::create_rng;

    #[test]
    fn test_bucket_map_insert_get() {
        let mut map: BucketMap<u32> = BucketMap::with_capacity(8, 2);
        assert_eq!(map.n_slots(), 16);
        map.insert(3, 0xdead, 1).unwrap();
        map.insert(3, 0xdead, 2).unwrap();
        // same bucket, different fingerprint: probed to another slot
        map.insert(3, 0xbeef, 3).unwrap();
        assert_eq!(map.get(3, 0xdead), Some(&[1, 2][..]));
        assert_eq!(map.get(3, 0xbeef), Some(&[3][..]));
        assert_eq!(map.get(7, 0xdead), None);
        assert_eq!(map.n_occupied(), 2);
    }

    #[test]
    fn test_bucket_map_wraps_probe() {
        // bucket indexes far above the capacity wrap onto the slot array
        let mut map: BucketMap<u32> = BucketMap::with_capacity(2, 2);
        map.insert(u32::max_value(), 7, 0).unwrap();
        assert_eq!(map.get(u32::max_value(), 7), Some(&[0][..]));
    }

    #[test]
    fn test_bucket_map_capacity_exceeded() {
        let mut map: BucketMap<u32> = BucketMap::with_capacity(1, 1);
        assert_eq!(map.n_slots(), 1);
        map.insert(0, 1, 0).unwrap();
        assert_eq!(map.insert(0, 2, 1), Err(Error::CapacityExceeded));
        // the colliding fingerprint still appends
        map.insert(0, 1, 9).unwrap();
        assert_eq!(map.get(0, 1), Some(&[0, 9][..]));
    }

    #[test]
    fn test_hash_table_roundtrip() {
        let mut rng = create_rng(5);
        let mut t: HashTable<u32> = HashTable::new(4, 10, 2, &mut rng).unwrap();
        t.insert(&[1, 2, 3, 4], 0).unwrap();
        t.insert(&[1, 2, 3, 4], 1).unwrap();
        t.insert(&[-1, 0, 0, 9], 2).unwrap();
        assert_eq!(t.lookup(&[1, 2, 3, 4]).unwrap(), Some(&[0, 1][..]));
        assert_eq!(t.lookup(&[-1, 0, 0, 9]).unwrap(), Some(&[2][..]));
        // arity is checked before the map is touched
        assert!(t.lookup(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_hash_table_deterministic() {
        let z = [4, -2, 0, 11];
        let mut t1: HashTable<u32> = HashTable::new(4, 4, 2, &mut create_rng(9)).unwrap();
        let t2: HashTable<u32> = HashTable::new(4, 4, 2, &mut create_rng(9)).unwrap();
        t1.insert(&z, 0).unwrap();
        assert_eq!(t1.address(&z).unwrap(), t2.address(&z).unwrap());
    }
}
