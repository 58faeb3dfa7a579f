//! # pstable-lsh
//!
//! Approximate R-near-neighbor search in Euclidean space with p-stable
//! Locality Sensitive Hashing.
//!
//! The index keeps L hash tables. Each table addresses its buckets with
//! the two-level scheme of E2LSH: a universal hash t1 chooses the probe
//! position, a second universal hash t2 is stored as the fingerprint.
//! Candidates surfaced by the tables are verified against the exact
//! Euclidean distance, so every returned id lies within the radius.
//!
//! # Example
//!
//! ```
//! use pstable_lsh::prelude::*;
//!
//! // 100 points on a 2-D grid
//! let points: Vec<Vec<f64>> = (0..10)
//!     .flat_map(|i| (0..10).map(move |j| vec![i as f64, j as f64]))
//!     .collect();
//!
//! // 20 tables of 4 concatenated hashes each, radius 1.5
//! let collections = build_g(2, 4., 4, 20, 1.5, 1).unwrap();
//! let index: LshIndex<_, u32> = LshIndex::build(1.5, collections, &points, 1).unwrap();
//!
//! let neighbors = index.query(&points[55]).unwrap();
//! assert!(neighbors.contains(&55));
//! ```
#![allow(dead_code)]
pub mod collection;
pub mod data;
pub mod dist;
pub mod error;
pub mod hash;
pub mod lsh;
pub mod prelude;
pub mod stats;
pub mod table;
pub mod utils;

pub use crate::collection::{build_g, build_u, VecHash};
pub use crate::error::{Error, Result};
pub use crate::lsh::LshIndex;
