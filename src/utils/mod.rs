//! Utility functions and helpers

pub mod formats;

pub use formats::{from_ndarray, from_sprs, to_ndarray, to_sprs_csr};

use crate::error::{Error, Result};

/// Zero-filled index vector, failing with [`Error::Allocation`] instead of
/// aborting when `len` entries cannot be reserved
pub fn try_zeroed(len: usize) -> Result<Vec<usize>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| Error::Allocation {
        requested: len,
        capacity: 0,
    })?;
    v.resize(len, 0);
    Ok(v)
}

/// Computes an exclusive prefix sum (scan) for a vector
///
/// The result has one more element than the input, the total.
pub fn exclusive_scan(input: &[usize]) -> Result<Vec<usize>> {
    let len = input.len().checked_add(1).ok_or(Error::Allocation {
        requested: usize::MAX,
        capacity: 0,
    })?;
    let mut result = Vec::new();
    result.try_reserve_exact(len).map_err(|_| Error::Allocation {
        requested: len,
        capacity: 0,
    })?;
    let mut sum = 0;

    result.push(0); // First element is always 0

    for &val in input {
        sum += val;
        result.push(sum);
    }

    Ok(result)
}
