//! Word-packed dense binary matrices
//!
//! The CSR routines reach the dense side only through [`DenseBinaryMatrix`],
//! so any backend with the same word layout can stand in for [`BitMatrix`].

use std::fmt;
use std::ops::Range;

use aligned_vec::AVec;

use crate::bitvec::{self, BitVec, WORD_BITS};
use crate::error::{Error, Result};
use crate::matrix::Permutation;

/// Alignment of the dense row storage, one cache line.
const STORAGE_ALIGN: usize = 64;

/// Capability interface for a row-major, bit-packed dense binary matrix.
///
/// Row `r` must be exposed as `bitvec::words_for(ncols())` little-endian words
/// (bit `c` in word `c / 64`, position `c % 64`) with padding bits kept zero.
pub trait DenseBinaryMatrix {
    fn nrows(&self) -> usize;

    fn ncols(&self) -> usize;

    fn get(&self, row: usize, col: usize) -> bool;

    fn set(&mut self, row: usize, col: usize, bit: bool);

    fn row_words(&self, row: usize) -> &[u64];

    fn row_words_mut(&mut self, row: usize) -> &mut [u64];

    fn flip(&mut self, row: usize, col: usize) {
        let bit = self.get(row, col);
        self.set(row, col, !bit);
    }

    /// Zero every bit.
    fn clear(&mut self) {
        for r in 0..self.nrows() {
            self.row_words_mut(r).fill(0);
        }
    }

    /// `self[row] ^= src[src_row]`.
    fn xor_row_from<S>(&mut self, row: usize, src: &S, src_row: usize)
    where
        S: DenseBinaryMatrix + ?Sized,
        Self: Sized,
    {
        bitvec::xor_words(self.row_words_mut(row), src.row_words(src_row));
    }
}

/// A dense binary matrix stored as contiguous, cache-line aligned words.
#[derive(Clone)]
pub struct BitMatrix {
    nrows: usize,
    ncols: usize,
    /// Words per row
    width: usize,
    data: AVec<u64>,
}

impl BitMatrix {
    /// All-zero `nrows × ncols` matrix.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        let width = bitvec::words_for(ncols);
        Self {
            nrows,
            ncols,
            width,
            data: AVec::from_iter(STORAGE_ALIGN, (0..nrows * width).map(|_| 0u64)),
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, true);
        }
        m
    }

    /// Builds a matrix from rows given as slices of 0/1 values.
    ///
    /// # Panics
    ///
    /// Panics if the rows have different lengths.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let ncols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut m = Self::zeros(rows.len(), ncols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            assert_eq!(row.len(), ncols, "all rows must have the same length");
            for (j, &bit) in row.iter().enumerate() {
                if bit != 0 {
                    m.set(i, j, true);
                }
            }
        }
        m
    }

    /// Number of words used by each row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Copy of row `row` as an owned vector.
    pub fn row(&self, row: usize) -> BitVec {
        BitVec::from_words(self.ncols, self.row_words(row))
    }

    /// Total number of set bits.
    pub fn weight(&self) -> usize {
        bitvec::count_ones(&self.data)
    }

    pub fn row_weight(&self, row: usize) -> usize {
        bitvec::count_ones(self.row_words(row))
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&w| w == 0)
    }

    /// First set bit of `row` at or after column `pos`.
    pub fn next_one(&self, row: usize, pos: usize) -> Option<usize> {
        bitvec::next_one(self.row_words(row), pos)
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let w = self.width;
        let (head, tail) = self.data.split_at_mut(hi * w);
        head[lo * w..(lo + 1) * w].swap_with_slice(&mut tail[..w]);
    }

    /// `self[dst] ^= self[src]`.
    pub fn xor_rows(&mut self, dst: usize, src: usize) {
        assert!(dst != src, "cannot add a row to itself");
        let w = self.width;
        if dst < src {
            let (head, tail) = self.data.split_at_mut(src * w);
            bitvec::xor_words(&mut head[dst * w..(dst + 1) * w], &tail[..w]);
        } else {
            let (head, tail) = self.data.split_at_mut(dst * w);
            bitvec::xor_words(&mut tail[..w], &head[src * w..(src + 1) * w]);
        }
    }

    /// Raw word storage, `width()` words per row.
    pub(crate) fn words_mut(&mut self) -> &mut [u64] {
        &mut self.data
    }

    pub fn transpose(&self) -> BitMatrix {
        let mut t = BitMatrix::zeros(self.ncols, self.nrows);
        for i in 0..self.nrows {
            let mut pos = 0;
            while let Some(j) = self.next_one(i, pos) {
                t.set(j, i, true);
                pos = j + 1;
            }
        }
        t
    }

    /// Naive GF(2) product `self × other`.
    pub fn mul(&self, other: &BitMatrix) -> Result<BitMatrix> {
        if self.ncols != other.nrows {
            return Err(Error::mismatch("BitMatrix::mul", self.ncols, other.nrows));
        }
        let mut c = BitMatrix::zeros(self.nrows, other.ncols);
        for i in 0..self.nrows {
            let mut pos = 0;
            while let Some(k) = self.next_one(i, pos) {
                c.xor_row_from(i, other, k);
                pos = k + 1;
            }
        }
        Ok(c)
    }

    /// Rows of `self` followed by rows of `other`.
    pub fn stack(&self, other: &BitMatrix) -> Result<BitMatrix> {
        if self.ncols != other.ncols {
            return Err(Error::mismatch("BitMatrix::stack", self.ncols, other.ncols));
        }
        let mut s = BitMatrix::zeros(self.nrows + other.nrows, self.ncols);
        let split = self.nrows * self.width;
        s.data[..split].copy_from_slice(&self.data);
        s.data[split..].copy_from_slice(&other.data);
        Ok(s)
    }

    /// Copy of the rows in `rows`.
    pub fn row_range(&self, rows: Range<usize>) -> BitMatrix {
        assert!(rows.end <= self.nrows, "row range out of bounds");
        let mut s = BitMatrix::zeros(rows.len(), self.ncols);
        s.data
            .copy_from_slice(&self.data[rows.start * self.width..rows.end * self.width]);
        s
    }

    /// New matrix whose column `perm[c]` holds this matrix's column `c`.
    pub fn apply_col_perm(&self, perm: &Permutation) -> Result<BitMatrix> {
        if perm.len() != self.ncols {
            return Err(Error::mismatch("BitMatrix::apply_col_perm", self.ncols, perm.len()));
        }
        let mut p = BitMatrix::zeros(self.nrows, self.ncols);
        for i in 0..self.nrows {
            let mut pos = 0;
            while let Some(j) = self.next_one(i, pos) {
                p.set(i, perm[j], true);
                pos = j + 1;
            }
        }
        Ok(p)
    }

    /// One elimination step on column `col`: finds a pivot at or below
    /// `begrow`, moves it to `begrow` and clears `col` in every other row.
    ///
    /// Returns `true` if a pivot was found.
    pub fn gauss_one(&mut self, col: usize, begrow: usize) -> bool {
        let Some(pivot) = (begrow..self.nrows).find(|&j| self.get(j, col)) else {
            return false;
        };
        self.swap_rows(begrow, pivot);
        for r in 0..self.nrows {
            if r != begrow && self.get(r, col) {
                self.xor_rows(r, begrow);
            }
        }
        true
    }

    /// Gaussian elimination in column order.
    ///
    /// With `full` set the result is in reduced row echelon form, otherwise
    /// only rows below each pivot are cleared. Returns the pivot columns; the
    /// rank is their count.
    pub fn gauss_naive(&mut self, full: bool) -> Vec<usize> {
        let mut pivots = Vec::new();
        let mut startrow = 0;
        for col in 0..self.ncols {
            if startrow == self.nrows {
                break;
            }
            let Some(pivot) = (startrow..self.nrows).find(|&j| self.get(j, col)) else {
                continue;
            };
            self.swap_rows(startrow, pivot);
            pivots.push(col);
            let first = if full { 0 } else { startrow + 1 };
            for r in first..self.nrows {
                if r != startrow && self.get(r, col) {
                    self.xor_rows(r, startrow);
                }
            }
            startrow += 1;
        }
        pivots
    }

    /// Rank over GF(2); leaves `self` untouched.
    pub fn rank(&self) -> usize {
        self.clone().gauss_naive(false).len()
    }
}

impl DenseBinaryMatrix for BitMatrix {
    fn nrows(&self) -> usize {
        self.nrows
    }

    fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> bool {
        assert!(
            row < self.nrows && col < self.ncols,
            "bit ({}, {}) out of bounds ({} × {})",
            row,
            col,
            self.nrows,
            self.ncols
        );
        (self.data[row * self.width + col / WORD_BITS] >> (col % WORD_BITS)) & 1 == 1
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, bit: bool) {
        assert!(
            row < self.nrows && col < self.ncols,
            "bit ({}, {}) out of bounds ({} × {})",
            row,
            col,
            self.nrows,
            self.ncols
        );
        let word = &mut self.data[row * self.width + col / WORD_BITS];
        let mask = 1u64 << (col % WORD_BITS);
        if bit {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    #[inline]
    fn flip(&mut self, row: usize, col: usize) {
        assert!(
            row < self.nrows && col < self.ncols,
            "bit ({}, {}) out of bounds ({} × {})",
            row,
            col,
            self.nrows,
            self.ncols
        );
        self.data[row * self.width + col / WORD_BITS] ^= 1u64 << (col % WORD_BITS);
    }

    #[inline]
    fn row_words(&self, row: usize) -> &[u64] {
        &self.data[row * self.width..(row + 1) * self.width]
    }

    #[inline]
    fn row_words_mut(&mut self, row: usize) -> &mut [u64] {
        &mut self.data[row * self.width..(row + 1) * self.width]
    }

    fn clear(&mut self) {
        self.data.fill(0);
    }
}

impl PartialEq for BitMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.nrows == other.nrows && self.ncols == other.ncols && self.data[..] == other.data[..]
    }
}

impl Eq for BitMatrix {}

impl fmt::Debug for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitMatrix {} × {} {{", self.nrows, self.ncols)?;
        for i in 0..self.nrows {
            write!(f, "  [")?;
            for j in 0..self.ncols {
                write!(f, "{}", if self.get(i, j) { '1' } else { '0' })?;
            }
            writeln!(f, "]")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_across_words() {
        let mut m = BitMatrix::zeros(2, 130);
        assert_eq!(m.width(), 3);
        m.set(1, 129, true);
        m.set(0, 64, true);
        assert!(m.get(1, 129));
        assert!(m.get(0, 64));
        assert!(!m.get(0, 63));
        assert_eq!(m.weight(), 2);
        m.flip(1, 129);
        assert_eq!(m.weight(), 1);
    }

    #[test]
    fn test_swap_and_xor_rows() {
        let mut m = BitMatrix::from_rows(&[[1u8, 0, 1], [0, 1, 1], [0, 0, 1]]);
        m.swap_rows(0, 2);
        assert_eq!(m, BitMatrix::from_rows(&[[0u8, 0, 1], [0, 1, 1], [1, 0, 1]]));
        m.xor_rows(2, 1);
        assert_eq!(m.row(2).iter_ones().collect::<Vec<_>>(), vec![0, 1]);
        m.xor_rows(0, 1);
        assert_eq!(m.row(0).iter_ones().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_transpose_and_mul() {
        let a = BitMatrix::from_rows(&[[1u8, 1, 0], [0, 1, 1]]);
        let t = a.transpose();
        assert_eq!(t, BitMatrix::from_rows(&[[1u8, 0], [1, 1], [0, 1]]));

        // [1 1 0] · [1 1 0]^T = 0, [1 1 0] · [0 1 1]^T = 1
        let gram = a.mul(&t).unwrap();
        assert_eq!(gram, BitMatrix::from_rows(&[[0u8, 1], [1, 0]]));
        assert!(a.mul(&a).is_err());
    }

    #[test]
    fn test_gauss_naive_full() {
        let mut m = BitMatrix::from_rows(&[[1u8, 1, 0, 1], [1, 1, 1, 0], [0, 0, 1, 1]]);
        let pivots = m.gauss_naive(true);
        assert_eq!(pivots, vec![0, 2]);
        assert_eq!(
            m,
            BitMatrix::from_rows(&[[1u8, 1, 0, 1], [0, 0, 1, 1], [0, 0, 0, 0]])
        );
    }

    #[test]
    fn test_rank_and_identity() {
        assert_eq!(BitMatrix::identity(5).rank(), 5);
        let m = BitMatrix::from_rows(&[[1u8, 1], [1, 1]]);
        assert_eq!(m.rank(), 1);
    }

    #[test]
    fn test_stack_and_row_range() {
        let a = BitMatrix::from_rows(&[[1u8, 0]]);
        let b = BitMatrix::from_rows(&[[0u8, 1], [1, 1]]);
        let s = a.stack(&b).unwrap();
        assert_eq!(s.nrows(), 3);
        assert_eq!(s.row_range(1..3), b);
    }

    #[test]
    fn test_apply_col_perm() {
        let a = BitMatrix::from_rows(&[[1u8, 1, 0]]);
        let perm = Permutation::from_vec(vec![2, 0, 1]).unwrap();
        let p = a.apply_col_perm(&perm).unwrap();
        assert_eq!(p, BitMatrix::from_rows(&[[1u8, 0, 1]]));
    }
}
