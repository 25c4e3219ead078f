//! Sort-based parity accumulator
//!
//! Collects intermediate column indices in an unsorted list, then sorts and
//! cancels repeated indices in pairs. Cheaper than the dense accumulator when
//! the intermediate product is short.

use crate::accumulator::{accumulate_row, ParityAccumulator};
use crate::matrix::CsrMatrix;

/// Compacts a sorted slice to the values that occur an odd number of times.
///
/// The survivors are moved to the front of `cols`, in ascending order, and
/// their count is returned.
pub fn xor_reduce_sorted(cols: &mut [usize]) -> usize {
    let mut kept = 0;
    let mut i = 0;
    while i < cols.len() {
        let col = cols[i];
        let mut j = i + 1;
        while j < cols.len() && cols[j] == col {
            j += 1;
        }
        if (j - i) % 2 == 1 {
            cols[kept] = col;
            kept += 1;
        }
        i = j;
    }
    kept
}

/// Sort-based accumulator for a single row of a GF(2) sparse product
pub struct SortAccumulator {
    /// Temporary storage for column indices of intermediate products
    col_indices: Vec<usize>,
}

impl SortAccumulator {
    /// Create a new sort-based accumulator
    ///
    /// # Arguments
    ///
    /// * `initial_capacity` - Initial capacity for the temporary storage
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            col_indices: Vec::with_capacity(initial_capacity),
        }
    }
}

impl ParityAccumulator for SortAccumulator {
    fn reset(&mut self) {
        self.col_indices.clear();
    }

    fn toggle(&mut self, col: usize) {
        // Simply add the entry to our unsorted list
        self.col_indices.push(col);
    }

    fn extract_result(&mut self) -> Vec<usize> {
        self.col_indices.sort_unstable();
        let kept = xor_reduce_sorted(&mut self.col_indices);
        self.col_indices[..kept].to_vec()
    }
}

/// Multiply a single row of matrix A with matrix B using a sort-based accumulator
///
/// Returns the sorted columns where row `a_row` of `A·B` is 1.
/// `intermediate` is the number of products the row generates, as counted
/// during categorization.
pub fn multiply_row_sort(
    accumulator: &mut SortAccumulator,
    a_row: usize,
    a: &CsrMatrix,
    b: &CsrMatrix,
    intermediate: usize,
) -> Vec<usize> {
    accumulator.reset();
    accumulator.col_indices.reserve(intermediate);
    accumulate_row(accumulator, a.row(a_row), b);
    accumulator.extract_result()
}
