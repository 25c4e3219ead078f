//! Error type shared by every fallible operation in the crate

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by matrix construction, algebra, I/O and parameter handling.
#[derive(Debug, Error)]
pub enum Error {
    /// Backing storage could not be reserved, or a fixed capacity was exceeded.
    #[error("cannot store {requested} entries (capacity {capacity})")]
    Allocation { requested: usize, capacity: usize },

    /// Operand shapes are incompatible.
    #[error("dimension mismatch in {op}: expected {expected}, found {found}")]
    DimensionMismatch {
        op: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("index {index} is out of range 0..{bound}")]
    IndexOutOfRange { index: usize, bound: usize },

    /// Malformed Matrix-Market input.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("cannot access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing an already opened stream failed.
    #[error("stream error: {0}")]
    Stream(#[from] std::io::Error),

    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The matrix handle was released and can no longer be used.
    #[error("matrix handle has been released")]
    InvalidHandle,

    #[error("invalid permutation: {reason}")]
    InvalidPermutation { reason: String },

    /// `A·Bᵀ` was expected to vanish over GF(2).
    #[error("matrices are not orthogonal: product has {weight} non-zero entries")]
    NotOrthogonal { weight: usize },

    #[error("invalid parameter {arg:?}: {reason}")]
    InvalidParameter { arg: String, reason: String },

    #[error("unsupported: {0}")]
    Unsupported(String),

    /// `-h` or `--help` was passed; the caller should print usage.
    #[error("help requested")]
    HelpRequested,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn mismatch(op: &'static str, expected: usize, found: usize) -> Self {
        Error::DimensionMismatch {
            op,
            expected,
            found,
        }
    }
}
