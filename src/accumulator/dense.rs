//! Dense parity accumulator
//!
//! Keeps one parity flag per output column. Suited to rows whose
//! intermediate product is large relative to the output width.

use crate::accumulator::{accumulate_row, ParityAccumulator};
use crate::matrix::CsrMatrix;

/// Dense accumulator for a single row of a GF(2) sparse product
pub struct DenseAccumulator {
    /// Current parity of each output column
    parity: Vec<bool>,

    /// Flags to track which positions have been touched since the last reset
    occupied: Vec<bool>,

    /// Columns touched since the last reset, in first-touch order
    col_indices: Vec<usize>,
}

impl DenseAccumulator {
    /// Create a new dense accumulator with specified column capacity
    ///
    /// # Arguments
    ///
    /// * `n_cols` - The number of columns in the output matrix
    pub fn new(n_cols: usize) -> Self {
        Self {
            parity: vec![false; n_cols],
            occupied: vec![false; n_cols],
            col_indices: Vec::new(),
        }
    }
}

impl ParityAccumulator for DenseAccumulator {
    /// Clears only the touched positions, without reallocating
    fn reset(&mut self) {
        for &col in &self.col_indices {
            self.occupied[col] = false;
            self.parity[col] = false;
        }
        self.col_indices.clear();
    }

    fn toggle(&mut self, col: usize) {
        if !self.occupied[col] {
            // First time seeing this column, mark it and add to indices
            self.occupied[col] = true;
            self.col_indices.push(col);
        }
        self.parity[col] ^= true;
    }

    fn extract_result(&mut self) -> Vec<usize> {
        let parity = &self.parity;
        let mut result: Vec<usize> = self.col_indices.iter().copied().filter(|&col| parity[col]).collect();
        result.sort_unstable();
        result
    }
}

/// Multiply a single row of matrix A with matrix B using a dense accumulator
///
/// Returns the sorted columns where row `a_row` of `A·B` is 1. The
/// accumulator must be at least `b.n_cols()` wide and is reset first.
pub fn multiply_row_dense(
    accumulator: &mut DenseAccumulator,
    a_row: usize,
    a: &CsrMatrix,
    b: &CsrMatrix,
) -> Vec<usize> {
    accumulator.reset();
    accumulate_row(accumulator, a.row(a_row), b);
    accumulator.extract_result()
}
