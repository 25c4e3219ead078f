//! Permutations of row or column indices

use std::ops::Index;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};

/// A bijection on `0..n`, stored as its image list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    values: Vec<usize>,
}

impl Permutation {
    pub fn identity(n: usize) -> Self {
        Self {
            values: (0..n).collect(),
        }
    }

    /// Validates that `values` is a bijection on `0..values.len()`.
    pub fn from_vec(values: Vec<usize>) -> Result<Self> {
        let n = values.len();
        let mut seen = vec![false; n];
        for &v in &values {
            if v >= n {
                return Err(Error::InvalidPermutation {
                    reason: format!("value {} out of range 0..{}", v, n),
                });
            }
            if std::mem::replace(&mut seen[v], true) {
                return Err(Error::InvalidPermutation {
                    reason: format!("value {} appears twice", v),
                });
            }
        }
        Ok(Self { values })
    }

    /// Uniformly random permutation of `0..n`.
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let mut values: Vec<usize> = (0..n).collect();
        values.shuffle(rng);
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.values
    }

    pub fn inverse(&self) -> Self {
        let mut values = vec![0; self.values.len()];
        for (i, &v) in self.values.iter().enumerate() {
            values[v] = i;
        }
        Self { values }
    }
}

impl Index<usize> for Permutation {
    type Output = usize;

    fn index(&self, i: usize) -> &usize {
        &self.values[i]
    }
}
