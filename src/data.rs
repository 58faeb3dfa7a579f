//! Generic traits for the hash output widths.
use num::traits::{PrimInt, Unsigned};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Unsigned integer stored as the fingerprint in a bucket map. The width
/// determines how often two distinct hash vectors end up indistinguishable.
pub trait Fingerprint:
    PrimInt + Unsigned + Hash + Debug + Send + Sync + Serialize + DeserializeOwned
{
    /// Truncate a value already reduced mod P to this width.
    fn truncate(v: u64) -> Self;
}

impl Fingerprint for u16 {
    fn truncate(v: u64) -> u16 {
        v as u16
    }
}

impl Fingerprint for u32 {
    fn truncate(v: u64) -> u32 {
        v as u32
    }
}

impl Fingerprint for u64 {
    fn truncate(v: u64) -> u64 {
        v
    }
}
