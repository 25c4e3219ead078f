//! Compressed Sparse Row (CSR) binary matrix format implementation

use std::fmt;
use std::io::{self, Write};

use tracing::instrument;

use crate::accumulator::sort::xor_reduce_sorted;
use crate::bitvec::BitVec;
use crate::error::{Error, Result};
use crate::utils::{exclusive_scan, try_zeroed};

/// A sparse binary matrix in Compressed Sparse Row (CSR) format
///
/// Only the positions of the 1-entries are stored:
/// - row_ptr: Array of size n_rows + 1; row i occupies col_idx[row_ptr[i]..row_ptr[i + 1]]
/// - col_idx: Array of size nnz containing column indices of stored entries
///
/// Entries are elements of GF(2). A row may temporarily hold unsorted or
/// repeated column indices; [`CsrMatrix::compress`] sorts every row and merges
/// repeats by parity, so two copies of the same index cancel.
#[derive(Clone)]
pub struct CsrMatrix {
    n_rows: usize,
    n_cols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    /// Capacity bound for col_idx
    nzmax: usize,
    /// Rows populated so far by `push_row`
    filled_rows: usize,
    /// Every row is strictly ascending
    compressed: bool,
    released: bool,
}

impl CsrMatrix {
    /// Allocates an `n_rows × n_cols` matrix with empty rows and room for
    /// `nzmax` entries.
    ///
    /// Rows are then appended in order with [`CsrMatrix::push_row`].
    pub fn init(n_rows: usize, n_cols: usize, nzmax: usize) -> Result<Self> {
        let ptr_len = n_rows.checked_add(1).ok_or(Error::Allocation {
            requested: usize::MAX,
            capacity: 0,
        })?;
        let row_ptr = try_zeroed(ptr_len)?;

        let mut col_idx = Vec::new();
        col_idx
            .try_reserve_exact(nzmax)
            .map_err(|_| Error::Allocation {
                requested: nzmax,
                capacity: 0,
            })?;

        Ok(Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            nzmax,
            filled_rows: 0,
            compressed: true,
            released: false,
        })
    }

    /// Creates a matrix from raw CSR arrays, validating their consistency.
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
    ) -> Result<Self> {
        if row_ptr.len() != n_rows + 1 {
            return Err(Error::mismatch("CsrMatrix::new row_ptr", n_rows + 1, row_ptr.len()));
        }
        if row_ptr[0] != 0 || row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::InvalidParameter {
                arg: "row_ptr".into(),
                reason: "must start at 0 and be non-decreasing".into(),
            });
        }
        if row_ptr[n_rows] != col_idx.len() {
            return Err(Error::mismatch("CsrMatrix::new col_idx", row_ptr[n_rows], col_idx.len()));
        }
        if let Some(&col) = col_idx.iter().find(|&&c| c >= n_cols) {
            return Err(Error::IndexOutOfRange {
                index: col,
                bound: n_cols,
            });
        }

        let compressed = (0..n_rows).all(|i| {
            col_idx[row_ptr[i]..row_ptr[i + 1]]
                .windows(2)
                .all(|w| w[0] < w[1])
        });

        Ok(Self {
            n_rows,
            n_cols,
            nzmax: col_idx.len(),
            row_ptr,
            col_idx,
            filled_rows: n_rows,
            compressed,
            released: false,
        })
    }

    /// Builds a matrix from a list of `(row, col)` pairs.
    ///
    /// Pairs are bucketed by row and the result is compressed, so a pair
    /// listed twice cancels.
    pub fn from_pairs<I>(n_rows: usize, n_cols: usize, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let pairs: Vec<(usize, usize)> = pairs.into_iter().collect();

        // Count entries per row
        let mut row_counts = try_zeroed(n_rows)?;
        for &(r, c) in &pairs {
            if r >= n_rows {
                return Err(Error::IndexOutOfRange {
                    index: r,
                    bound: n_rows,
                });
            }
            if c >= n_cols {
                return Err(Error::IndexOutOfRange {
                    index: c,
                    bound: n_cols,
                });
            }
            row_counts[r] += 1;
        }

        let row_ptr = exclusive_scan(&row_counts)?;
        let mut col_idx = vec![0; pairs.len()];
        let mut next = row_ptr.clone();
        for &(r, c) in &pairs {
            col_idx[next[r]] = c;
            next[r] += 1;
        }

        let mut mat = Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            nzmax: pairs.len(),
            filled_rows: n_rows,
            compressed: false,
            released: false,
        };
        mat.compress()?;
        Ok(mat)
    }

    /// Creates an empty matrix with the given dimensions
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            row_ptr: vec![0; n_rows + 1],
            col_idx: Vec::new(),
            nzmax: 0,
            filled_rows: n_rows,
            compressed: true,
            released: false,
        }
    }

    /// Creates an identity matrix of the given size
    pub fn identity(n: usize) -> Self {
        Self {
            n_rows: n,
            n_cols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            nzmax: n,
            filled_rows: n,
            compressed: true,
            released: false,
        }
    }

    /// Assembles a matrix from per-row column lists that are already sorted
    /// and free of repeats.
    pub(crate) fn from_sorted_rows(n_rows: usize, n_cols: usize, rows: Vec<Vec<usize>>) -> Self {
        debug_assert_eq!(rows.len(), n_rows);
        let mut row_ptr = Vec::with_capacity(n_rows + 1);
        row_ptr.push(0);
        let mut running_nnz = 0;
        for cols in &rows {
            running_nnz += cols.len();
            row_ptr.push(running_nnz);
        }
        let mut col_idx = Vec::with_capacity(running_nnz);
        for cols in rows {
            col_idx.extend(cols);
        }
        Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            nzmax: running_nnz,
            filled_rows: n_rows,
            compressed: true,
            released: false,
        }
    }

    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.released {
            Err(Error::InvalidHandle)
        } else {
            Ok(())
        }
    }

    /// Appends the next unfilled row.
    pub fn push_row(&mut self, cols: &[usize]) -> Result<()> {
        self.ensure_live()?;
        if self.filled_rows == self.n_rows {
            return Err(Error::mismatch("CsrMatrix::push_row", self.n_rows, self.n_rows + 1));
        }
        if let Some(&col) = cols.iter().find(|&&c| c >= self.n_cols) {
            return Err(Error::IndexOutOfRange {
                index: col,
                bound: self.n_cols,
            });
        }
        let required = self.col_idx.len() + cols.len();
        if required > self.nzmax {
            return Err(Error::Allocation {
                requested: required,
                capacity: self.nzmax,
            });
        }

        self.col_idx.extend_from_slice(cols);
        self.compressed &= cols.windows(2).all(|w| w[0] < w[1]);
        self.filled_rows += 1;
        let nnz = self.col_idx.len();
        self.row_ptr[self.filled_rows..].fill(nnz);
        Ok(())
    }

    /// Grows the capacity by `additional` entries.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.ensure_live()?;
        let target = self.nzmax.checked_add(additional).ok_or(Error::Allocation {
            requested: usize::MAX,
            capacity: self.nzmax,
        })?;
        self.col_idx
            .try_reserve_exact(target - self.col_idx.len())
            .map_err(|_| Error::Allocation {
                requested: target,
                capacity: self.nzmax,
            })?;
        self.nzmax = target;
        Ok(())
    }

    /// Frees the backing storage. Any later use of the handle, including a
    /// second release, fails with [`Error::InvalidHandle`].
    pub fn release(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.row_ptr = vec![0];
        self.col_idx = Vec::new();
        self.n_rows = 0;
        self.n_cols = 0;
        self.nzmax = 0;
        self.filled_rows = 0;
        self.released = true;
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Returns the number of stored entries in the matrix
    pub fn nnz(&self) -> usize {
        self.row_ptr[self.n_rows]
    }

    /// Capacity of the column-index storage.
    pub fn nzmax(&self) -> usize {
        self.nzmax
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn col_idx(&self) -> &[usize] {
        &self.col_idx
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Column indices stored in row `i`.
    pub fn row(&self, i: usize) -> &[usize] {
        assert!(i < self.n_rows, "Row index out of bounds");
        &self.col_idx[self.row_ptr[i]..self.row_ptr[i + 1]]
    }

    /// Returns an iterator over the column indices stored in row i
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.row(i).iter().copied()
    }

    /// Sorts every row and merges repeated column indices by parity, in place.
    ///
    /// Compressing an already compressed matrix leaves it unchanged.
    #[instrument(level = "trace", skip_all)]
    pub fn compress(&mut self) -> Result<()> {
        self.ensure_live()?;
        let mut read_start = 0;
        let mut write = 0;
        for i in 0..self.n_rows {
            let read_end = self.row_ptr[i + 1];
            let row = &mut self.col_idx[read_start..read_end];
            row.sort_unstable();
            let kept = xor_reduce_sorted(row);
            self.col_idx.copy_within(read_start..read_start + kept, write);
            write += kept;
            self.row_ptr[i + 1] = write;
            read_start = read_end;
        }
        self.col_idx.truncate(write);
        self.compressed = true;
        Ok(())
    }

    /// Largest number of entries stored in a single row.
    pub fn max_row_weight(&self) -> Result<usize> {
        self.ensure_live()?;
        Ok(self
            .row_ptr
            .windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0))
    }

    /// Syndrome `H·e` of a length-`n_cols` vector.
    pub fn syndrome(&self, e: &BitVec) -> Result<BitVec> {
        self.ensure_live()?;
        if e.len() != self.n_cols {
            return Err(Error::mismatch("CsrMatrix::syndrome", self.n_cols, e.len()));
        }
        let mut s = BitVec::zeros(self.n_rows);
        for i in 0..self.n_rows {
            let parity = self.row_iter(i).filter(|&c| e.get(c)).count() % 2 == 1;
            s.set(i, parity);
        }
        Ok(s)
    }

    /// Number of unsatisfied checks, the weight of `H·e`.
    pub fn syndrome_weight(&self, e: &BitVec) -> Result<usize> {
        Ok(self.syndrome(e)?.weight())
    }

    /// Whether `H·e ≠ 0` for `e` given by its ascending list of set positions.
    pub fn sparse_syndrome_non_zero(&self, ones: &[usize]) -> Result<bool> {
        self.ensure_live()?;
        debug_assert!(ones.windows(2).all(|w| w[0] < w[1]));
        Ok((0..self.n_rows).any(|i| {
            self.row_iter(i)
                .filter(|c| ones.binary_search(c).is_ok())
                .count()
                % 2
                == 1
        }))
    }

    /// Writes the index listing: a header line, then `row: col col ...` per
    /// row, all one-indexed.
    pub fn write_out<W: Write>(&self, w: &mut W) -> Result<()> {
        self.ensure_live()?;
        let form = if self.compressed {
            "Compressed Row Form"
        } else {
            "Row Form (unsorted)"
        };
        writeln!(
            w,
            "# binary CSR matrix ({} x {}) in {}: nzmax= {}, nz={}",
            self.n_rows,
            self.n_cols,
            form,
            self.nzmax,
            self.nnz()
        )?;
        for i in 0..self.n_rows {
            write!(w, "{}:", i + 1)?;
            for c in self.row_iter(i) {
                write!(w, " {}", c + 1)?;
            }
            writeln!(w)?;
        }
        Ok(())
    }

    /// Prints the index listing to standard output.
    pub fn out(&self) -> Result<()> {
        self.write_out(&mut io::stdout().lock())
    }

    /// Writes `label` followed by the matrix as a grid of `1` and `.`.
    pub fn write_print<W: Write>(&self, w: &mut W, label: &str) -> Result<()> {
        self.ensure_live()?;
        writeln!(w, "{}", label)?;
        for i in 0..self.n_rows {
            let row = BitVec::from_ones(self.n_cols, self.row_iter(i));
            let line: String = (0..self.n_cols)
                .map(|j| if row.get(j) { '1' } else { '.' })
                .collect();
            writeln!(w, "[{}]", line)?;
        }
        Ok(())
    }

    /// Prints the labelled grid to standard output.
    pub fn print(&self, label: &str) -> Result<()> {
        self.write_print(&mut io::stdout().lock(), label)
    }
}

impl PartialEq for CsrMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.n_rows == other.n_rows
            && self.n_cols == other.n_cols
            && self.row_ptr == other.row_ptr
            && self.col_idx == other.col_idx
            && self.released == other.released
    }
}

impl Eq for CsrMatrix {}

impl fmt::Debug for CsrMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CsrMatrix {{")?;
        if self.released {
            return write!(f, "  (released)\n}}");
        }
        writeln!(f, "  dimensions: {} × {}", self.n_rows, self.n_cols)?;
        writeln!(f, "  nnz: {} (nzmax {})", self.nnz(), self.nzmax)?;

        // Print a sample of the matrix content
        let max_rows_to_print = 5.min(self.n_rows);

        if max_rows_to_print > 0 {
            writeln!(f, "  content sample:")?;

            for i in 0..max_rows_to_print {
                write!(f, "    row {}: ", i)?;
                let row = self.row(i);

                if row.is_empty() {
                    writeln!(f, "(empty)")?;
                } else {
                    let max_elements = 8.min(row.len());
                    for c in &row[..max_elements] {
                        write!(f, "{} ", c)?;
                    }
                    if row.len() > max_elements {
                        write!(f, "... ({} more)", row.len() - max_elements)?;
                    }
                    writeln!(f)?;
                }
            }

            if self.n_rows > max_rows_to_print {
                writeln!(f, "    ... ({} more rows)", self.n_rows - max_rows_to_print)?;
            }
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_and_push_rows() {
        let mut m = CsrMatrix::init(3, 4, 5).unwrap();
        assert_eq!(m.row_ptr(), &[0, 0, 0, 0]);
        assert_eq!(m.nzmax(), 5);

        m.push_row(&[3, 1]).unwrap();
        assert_eq!(m.row_ptr(), &[0, 2, 2, 2]);
        m.push_row(&[]).unwrap();
        m.push_row(&[0, 2, 3]).unwrap();

        assert_eq!(m.nnz(), 5);
        assert_eq!(m.row(0), &[3, 1]);
        assert_eq!(m.row(2), &[0, 2, 3]);
        assert!(!m.is_compressed());

        assert!(matches!(
            m.push_row(&[0]),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_push_row_limits() {
        let mut m = CsrMatrix::init(2, 3, 2).unwrap();
        assert!(matches!(
            m.push_row(&[3]),
            Err(Error::IndexOutOfRange { index: 3, bound: 3 })
        ));
        assert!(matches!(
            m.push_row(&[0, 1, 2]),
            Err(Error::Allocation { requested: 3, capacity: 2 })
        ));
        m.reserve(1).unwrap();
        m.push_row(&[0, 1, 2]).unwrap();
        assert_eq!(m.nnz(), 3);
    }

    #[test]
    fn test_oversized_shapes_fail_cleanly() {
        assert!(matches!(
            CsrMatrix::init(usize::MAX, 1, 0),
            Err(Error::Allocation { .. })
        ));
        assert!(matches!(
            CsrMatrix::from_pairs(usize::MAX, 1, []),
            Err(Error::Allocation { .. })
        ));

        let mut m = CsrMatrix::init(1, 1, 4).unwrap();
        assert!(matches!(
            m.reserve(usize::MAX),
            Err(Error::Allocation { capacity: 4, .. })
        ));
        assert_eq!(m.nzmax(), 4);
    }

    #[test]
    fn test_new_validates() {
        assert!(CsrMatrix::new(2, 2, vec![0, 1], vec![0]).is_err());
        assert!(CsrMatrix::new(2, 2, vec![0, 2, 1], vec![0, 1]).is_err());
        assert!(CsrMatrix::new(1, 2, vec![0, 1], vec![2]).is_err());
        let m = CsrMatrix::new(2, 3, vec![0, 2, 3], vec![0, 2, 1]).unwrap();
        assert!(m.is_compressed());
    }

    #[test]
    fn test_compress_sorts_and_cancels_pairs() {
        let mut m = CsrMatrix::new(3, 5, vec![0, 4, 7, 8], vec![4, 1, 4, 0, 2, 2, 2, 3]).unwrap();
        m.compress().unwrap();

        assert!(m.is_compressed());
        assert_eq!(m.row(0), &[0, 1]);
        assert_eq!(m.row(1), &[2]);
        assert_eq!(m.row(2), &[3]);
        assert_eq!(m.row_ptr(), &[0, 2, 3, 4]);
    }

    #[test]
    fn test_compress_idempotent() {
        let mut m = CsrMatrix::from_pairs(3, 3, [(2, 1), (0, 2), (0, 0), (2, 1), (1, 1)]).unwrap();
        let once = m.clone();
        m.compress().unwrap();
        assert_eq!(m, once);
        assert_eq!(m.row(2), &[] as &[usize]);
    }

    #[test]
    fn test_max_row_weight() {
        let m = CsrMatrix::new(3, 4, vec![0, 1, 4, 4], vec![0, 1, 2, 3]).unwrap();
        assert_eq!(m.max_row_weight().unwrap(), 3);
        assert_eq!(CsrMatrix::zeros(0, 4).max_row_weight().unwrap(), 0);
    }

    #[test]
    fn test_release_guards_handle() {
        let mut m = CsrMatrix::identity(3);
        m.release().unwrap();
        assert!(m.is_released());
        assert!(matches!(m.release(), Err(Error::InvalidHandle)));
        assert!(matches!(m.compress(), Err(Error::InvalidHandle)));
        assert!(matches!(m.max_row_weight(), Err(Error::InvalidHandle)));
    }

    #[test]
    fn test_syndrome() {
        // Parity checks of the length-3 repetition code
        let h = CsrMatrix::new(2, 3, vec![0, 2, 4], vec![0, 1, 1, 2]).unwrap();
        let e = BitVec::from_ones(3, [1]);
        assert_eq!(h.syndrome_weight(&e).unwrap(), 2);
        assert!(h.sparse_syndrome_non_zero(&[1]).unwrap());
        assert!(!h.sparse_syndrome_non_zero(&[0, 1, 2]).unwrap());
        assert!(h.syndrome(&BitVec::zeros(4)).is_err());
    }

    #[test]
    fn test_write_out_format() {
        let m = CsrMatrix::new(2, 3, vec![0, 2, 3], vec![0, 2, 1]).unwrap();
        let mut buf = Vec::new();
        m.write_out(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "# binary CSR matrix (2 x 3) in Compressed Row Form: nzmax= 3, nz=3\n1: 1 3\n2: 2\n"
        );
    }

    #[test]
    fn test_write_print_grid() {
        let m = CsrMatrix::new(2, 3, vec![0, 2, 3], vec![0, 2, 1]).unwrap();
        let mut buf = Vec::new();
        m.write_print(&mut buf, "H").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "H\n[1.1]\n[.1.]\n");
    }
}
