//! Utilities for converting between our matrix formats and external libraries

use ndarray::{Array2, ArrayView2};
use num_traits::Zero;
use sprs::CsMat;

use crate::error::Result;
use crate::matrix::{BitMatrix, CsrMatrix, DenseBinaryMatrix};

/// Converts our CSR matrix to a sprs CSR matrix with every stored value 1
pub fn to_sprs_csr(matrix: &CsrMatrix) -> Result<CsMat<u8>> {
    matrix.ensure_live()?;
    // sprs requires sorted, duplicate free rows
    let mut compressed = matrix.clone();
    if !compressed.is_compressed() {
        compressed.compress()?;
    }
    Ok(CsMat::new(
        (compressed.n_rows(), compressed.n_cols()),
        compressed.row_ptr().to_vec(),
        compressed.col_idx().to_vec(),
        vec![1u8; compressed.nnz()],
    ))
}

/// Converts a sprs matrix (CSR or CSC storage) to our CSR format.
///
/// Only the pattern is kept: every stored value that is not zero becomes a 1.
pub fn from_sprs<N>(matrix: &CsMat<N>) -> Result<CsrMatrix>
where
    N: Zero,
{
    let (n_rows, n_cols) = matrix.shape();
    let pairs = matrix
        .iter()
        .filter(|(value, _)| !value.is_zero())
        .map(|(_, (row, col))| (row, col));
    CsrMatrix::from_pairs(n_rows, n_cols, pairs)
}

/// Dense 0/1 array copy of a bit matrix
pub fn to_ndarray<D: DenseBinaryMatrix + ?Sized>(matrix: &D) -> Array2<u8> {
    Array2::from_shape_fn((matrix.nrows(), matrix.ncols()), |(i, j)| {
        u8::from(matrix.get(i, j))
    })
}

/// Bit matrix with a 1 wherever `array` is non-zero
pub fn from_ndarray<N: Zero>(array: ArrayView2<'_, N>) -> BitMatrix {
    let (nrows, ncols) = array.dim();
    let mut m = BitMatrix::zeros(nrows, ncols);
    for ((i, j), value) in array.indexed_iter() {
        if !value.is_zero() {
            m.set(i, j, true);
        }
    }
    m
}
