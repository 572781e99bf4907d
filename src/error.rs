//! Error type shared across the crate. Structured variants for the
//! conditions callers are expected to match on; IO/format errors wrap the
//! underlying crate errors via `#[from]`.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = SimError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("duplicate identifier {0:?}")]
    DuplicateIdentifier(String),

    #[error("mapping is not a bijection: {0}")]
    NotBijective(String),

    #[error("refusing to overwrite existing file {0:?}")]
    AlreadyExists(PathBuf),

    #[error("{path:?} does not carry the required .{expected} extension")]
    InvalidName { path: PathBuf, expected: &'static str },

    #[error("{side} user list is not strictly ascending")]
    UnsortedInput { side: &'static str },

    #[error("dimension mismatch: {left} vs {right}")]
    ShapeMismatch { left: usize, right: usize },

    #[error("count {max} exceeds the {limit} limit of the count type")]
    OverflowRisk { max: u64, limit: u64 },

    #[error("unsupported precision: {0} bits (expected 16 or 32)")]
    InvalidPrecision(u8),

    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("column {index} out of range for matrix with {cols} columns")]
    ColumnOutOfRange { index: usize, cols: usize },

    #[error("cluster keys do not line up: {0}")]
    KeyMismatch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Encode(#[from] bincode::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
