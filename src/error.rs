use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("input has length {got}, hash function expects {expected}")]
    InvalidDimension { expected: usize, got: usize },
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("bucket map is at capacity")]
    CapacityExceeded,
    #[error("precomputed hashes belong to a different pool")]
    PoolMismatch,
}
