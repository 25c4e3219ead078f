//! Conversion functions between matrix layouts: transposition, permutations
//! and the bridge to dense bit matrices

use tracing::instrument;

use crate::error::{Error, Result};
use crate::matrix::{BitMatrix, CsrMatrix, DenseBinaryMatrix, Permutation};
use crate::utils::{exclusive_scan, try_zeroed};

impl CsrMatrix {
    /// Returns the transpose as a new matrix.
    ///
    /// Source rows are scattered in ascending order, so every destination row
    /// comes out ascending. Repeated indices are carried over, never merged.
    #[instrument(level = "trace", skip_all)]
    pub fn transpose(&self) -> Result<CsrMatrix> {
        self.ensure_live()?;

        // Count non-zeros per column
        let mut col_counts = try_zeroed(self.n_cols())?;
        for &col in self.col_idx() {
            col_counts[col] += 1;
        }

        // Compute row pointers of the transpose via prefix sum
        let row_ptr = exclusive_scan(&col_counts)?;

        let mut col_idx = vec![0; self.nnz()];
        let mut next = row_ptr.clone();
        for i in 0..self.n_rows() {
            for col in self.row_iter(i) {
                col_idx[next[col]] = i;
                next[col] += 1;
            }
        }

        // Duplicates in a source row become adjacent duplicates here
        CsrMatrix::new(self.n_cols(), self.n_rows(), row_ptr, col_idx)
    }

    /// Returns a new matrix whose row `i` is row `perm[i]` of `self`.
    pub fn apply_perm(&self, perm: &Permutation) -> Result<CsrMatrix> {
        self.ensure_live()?;
        if perm.len() != self.n_rows() {
            return Err(Error::mismatch("CsrMatrix::apply_perm", self.n_rows(), perm.len()));
        }

        let mut row_ptr = Vec::with_capacity(self.n_rows() + 1);
        let mut col_idx = Vec::with_capacity(self.nnz());
        row_ptr.push(0);
        for &src in perm.as_slice() {
            col_idx.extend_from_slice(self.row(src));
            row_ptr.push(col_idx.len());
        }

        CsrMatrix::new(self.n_rows(), self.n_cols(), row_ptr, col_idx)
    }

    /// Returns a new compressed matrix where column `c` is relabeled `perm[c]`.
    pub fn apply_col_perm(&self, perm: &Permutation) -> Result<CsrMatrix> {
        self.ensure_live()?;
        if perm.len() != self.n_cols() {
            return Err(Error::mismatch("CsrMatrix::apply_col_perm", self.n_cols(), perm.len()));
        }
        let pairs = (0..self.n_rows()).flat_map(|i| self.row_iter(i).map(move |c| (i, perm[c])));
        CsrMatrix::from_pairs(self.n_rows(), self.n_cols(), pairs)
    }

    /// Builds a compressed matrix holding exactly the set bits of `dense`.
    pub fn from_dense<D: DenseBinaryMatrix + ?Sized>(dense: &D) -> CsrMatrix {
        let n_rows = dense.nrows();
        let n_cols = dense.ncols();
        let rows = (0..n_rows)
            .map(|i| crate::bitvec::Ones::new(dense.row_words(i)).collect())
            .collect();
        CsrMatrix::from_sorted_rows(n_rows, n_cols, rows)
    }

    /// Dense copy of the matrix. Repeated indices cancel.
    pub fn to_dense(&self) -> Result<BitMatrix> {
        self.ensure_live()?;
        let mut dense = BitMatrix::zeros(self.n_rows(), self.n_cols());
        for i in 0..self.n_rows() {
            for col in self.row_iter(i) {
                dense.flip(i, col);
            }
        }
        Ok(dense)
    }
}
