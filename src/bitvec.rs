//! Word-packed binary vectors
//!
//! Bits are packed little-endian into 64-bit words: bit `i` lives in word
//! `i / 64` at position `i % 64`. Bits past the logical length are kept at
//! zero so that word-level weight and equality are exact.

use std::fmt;

/// Number of bits in a storage word.
pub const WORD_BITS: usize = 64;

/// Number of words needed to hold `n_bits` bits.
#[inline]
pub fn words_for(n_bits: usize) -> usize {
    n_bits.div_ceil(WORD_BITS)
}

/// Position of the first set bit at or after `pos`, if any.
///
/// Padding bits are assumed to be zero.
#[inline]
pub fn next_one(words: &[u64], pos: usize) -> Option<usize> {
    let mut w = pos / WORD_BITS;
    if w >= words.len() {
        return None;
    }
    let mut word = words[w] & (u64::MAX << (pos % WORD_BITS));
    loop {
        if word != 0 {
            return Some(w * WORD_BITS + word.trailing_zeros() as usize);
        }
        w += 1;
        if w == words.len() {
            return None;
        }
        word = words[w];
    }
}

/// Total number of set bits.
#[inline]
pub fn count_ones(words: &[u64]) -> usize {
    words.iter().map(|w| w.count_ones() as usize).sum()
}

/// `dst ^= src`, word by word.
#[inline]
pub fn xor_words(dst: &mut [u64], src: &[u64]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= *s;
    }
}

/// Iterator over the positions of set bits.
pub struct Ones<'a> {
    words: &'a [u64],
    next: usize,
}

impl<'a> Ones<'a> {
    pub fn new(words: &'a [u64]) -> Self {
        Self { words, next: 0 }
    }
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let pos = next_one(self.words, self.next)?;
        self.next = pos + 1;
        Some(pos)
    }
}

/// An owned binary vector of fixed length.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitVec {
    len: usize,
    words: Vec<u64>,
}

impl BitVec {
    /// All-zero vector of length `len`.
    pub fn zeros(len: usize) -> Self {
        Self {
            len,
            words: vec![0; words_for(len)],
        }
    }

    /// Vector of length `len` with the listed positions set.
    ///
    /// Repeated positions cancel in pairs.
    ///
    /// # Panics
    ///
    /// Panics if a position is `>= len`.
    pub fn from_ones(len: usize, ones: impl IntoIterator<Item = usize>) -> Self {
        let mut v = Self::zeros(len);
        for i in ones {
            v.flip(i);
        }
        v
    }

    /// Wraps words copied out of a dense row.
    pub(crate) fn from_words(len: usize, words: &[u64]) -> Self {
        debug_assert_eq!(words.len(), words_for(len));
        Self {
            len,
            words: words.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.len, "bit index {} out of bounds (len = {})", i, self.len);
        (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, i: usize, bit: bool) {
        assert!(i < self.len, "bit index {} out of bounds (len = {})", i, self.len);
        let mask = 1u64 << (i % WORD_BITS);
        if bit {
            self.words[i / WORD_BITS] |= mask;
        } else {
            self.words[i / WORD_BITS] &= !mask;
        }
    }

    #[inline]
    pub fn flip(&mut self, i: usize) {
        assert!(i < self.len, "bit index {} out of bounds (len = {})", i, self.len);
        self.words[i / WORD_BITS] ^= 1u64 << (i % WORD_BITS);
    }

    /// Hamming weight.
    pub fn weight(&self) -> usize {
        count_ones(&self.words)
    }

    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn iter_ones(&self) -> Ones<'_> {
        Ones::new(&self.words)
    }

    /// `self += other` over GF(2).
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn xor_assign(&mut self, other: &BitVec) {
        assert_eq!(self.len, other.len, "BitVec lengths must match");
        xor_words(&mut self.words, &other.words);
    }

    /// GF(2) inner product.
    pub fn dot(&self, other: &BitVec) -> bool {
        assert_eq!(self.len, other.len, "BitVec lengths must match");
        self.words
            .iter()
            .zip(&other.words)
            .fold(0u32, |acc, (a, b)| acc ^ (a & b).count_ones())
            & 1
            == 1
    }
}

impl fmt::Debug for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVec[")?;
        for i in 0..self.len {
            write!(f, "{}", if self.get(i) { '1' } else { '0' })?;
        }
        write!(f, "]")
    }
}
