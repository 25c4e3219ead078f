//! Parity accumulators for sparse binary matrix multiplication
//!
//! Over GF(2) a row of `A·B` is the XOR of the rows of `B` selected by the
//! row of `A`. An accumulator collects the intermediate column indices of one
//! output row and keeps those that occur an odd number of times. Two
//! strategies are provided and chosen per row from the size of the
//! intermediate product (see [`crate::matrix::categorize_rows`]).

pub mod dense;
pub mod sort;

use crate::matrix::config::AccumulationMethod;
use crate::matrix::{CsrMatrix, RowPlan};

/// Trait for accumulators that merge the intermediate products of one output row
pub trait ParityAccumulator {
    /// Reset the accumulator to prepare for a new row
    fn reset(&mut self);

    /// Add a single 1-entry at `col`; two additions cancel
    fn toggle(&mut self, col: usize);

    /// Extract the columns holding a 1, sorted ascending
    ///
    /// The accumulator must be reset before it is fed the next row.
    fn extract_result(&mut self) -> Vec<usize>;
}

/// Feeds the intermediate products of row `a_row` of `A·B` into `acc`.
pub(crate) fn accumulate_row<A: ParityAccumulator>(
    acc: &mut A,
    a_row: &[usize],
    b: &CsrMatrix,
) {
    for &k in a_row {
        for col in b.row_iter(k) {
            acc.toggle(col);
        }
    }
}

// Re-export key functions for convenient access
pub use dense::{multiply_row_dense, DenseAccumulator};
pub use sort::{multiply_row_sort, SortAccumulator};

/// Accumulators shared by the rows of one product
///
/// The dense accumulator is sized to the output width and allocated on the
/// first row that needs it.
pub struct RowWorkspace {
    n_cols: usize,
    sort: SortAccumulator,
    dense: Option<DenseAccumulator>,
}

impl RowWorkspace {
    /// Workspace for products with `n_cols` output columns
    pub fn new(n_cols: usize) -> Self {
        Self {
            n_cols,
            sort: SortAccumulator::new(0),
            dense: None,
        }
    }

    /// Computes row `a_row` of `A·B` with the accumulator chosen by `plan`
    pub fn multiply_row(&mut self, a_row: usize, a: &CsrMatrix, b: &CsrMatrix, plan: RowPlan) -> Vec<usize> {
        match plan.method {
            AccumulationMethod::Sort => multiply_row_sort(&mut self.sort, a_row, a, b, plan.intermediate),
            AccumulationMethod::Dense => {
                let n_cols = self.n_cols;
                let dense = self.dense.get_or_insert_with(|| DenseAccumulator::new(n_cols));
                multiply_row_dense(dense, a_row, a, b)
            }
        }
    }
}
