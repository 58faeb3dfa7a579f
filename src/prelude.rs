//! Re-export of the public api of pstable-lsh.
pub use crate::{
    collection::{
        build_g, build_u, CompositeHashCollection, HashCollection, HashPool, Precomputed, VecHash,
    },
    data::Fingerprint,
    error::{Error, Result},
    hash::{Am04Hash, Am04HashFamily, HashFunction, ModPHash},
    lsh::LshIndex,
    table::{BucketMap, HashTable, PointId},
};
