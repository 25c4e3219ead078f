//! Sparse × dense and sparse × sparse products over GF(2)

use std::borrow::Cow;

use tracing::{instrument, trace};

use crate::accumulator::RowWorkspace;
use crate::error::{Error, Result};
use crate::matrix::{plan_rows, BitMatrix, CsrMatrix, DenseBinaryMatrix, MulConfig};

/// Computes `dest ^= sparse × dense`, or `dest = sparse × dense` when `clear`
/// is set.
///
/// `dest` must be `sparse.n_rows() × dense.ncols()` and `sparse.n_cols()`
/// must equal `dense.nrows()`.
pub fn csr_mzd_mul<D, S>(dest: &mut D, sparse: &CsrMatrix, dense: &S, clear: bool) -> Result<()>
where
    D: DenseBinaryMatrix,
    S: DenseBinaryMatrix + ?Sized,
{
    check_mzd_shapes(dest, sparse, dense)?;
    if clear {
        dest.clear();
    }
    for i in 0..sparse.n_rows() {
        for k in sparse.row_iter(i) {
            dest.xor_row_from(i, dense, k);
        }
    }
    Ok(())
}

/// Allocating form of [`csr_mzd_mul`].
pub fn csr_mzd_mul_new<S>(sparse: &CsrMatrix, dense: &S) -> Result<BitMatrix>
where
    S: DenseBinaryMatrix + ?Sized,
{
    let mut dest = BitMatrix::zeros(sparse.n_rows(), dense.ncols());
    csr_mzd_mul(&mut dest, sparse, dense, false)?;
    Ok(dest)
}

pub(crate) fn check_mzd_shapes<D, S>(dest: &D, sparse: &CsrMatrix, dense: &S) -> Result<()>
where
    D: DenseBinaryMatrix + ?Sized,
    S: DenseBinaryMatrix + ?Sized,
{
    sparse.ensure_live()?;
    if sparse.n_cols() != dense.nrows() {
        return Err(Error::mismatch("csr_mzd_mul operands", sparse.n_cols(), dense.nrows()));
    }
    if dest.nrows() != sparse.n_rows() {
        return Err(Error::mismatch("csr_mzd_mul destination rows", sparse.n_rows(), dest.nrows()));
    }
    if dest.ncols() != dense.ncols() {
        return Err(Error::mismatch("csr_mzd_mul destination cols", dense.ncols(), dest.ncols()));
    }
    Ok(())
}

/// Computes `dest ^= rows × h` (or `=` when `clear` is set), where every row of
/// `rows` is a vector over the rows of `h`.
pub fn syndrome_vector<D, S>(dest: &mut D, rows: &S, h: &CsrMatrix, clear: bool) -> Result<()>
where
    D: DenseBinaryMatrix,
    S: DenseBinaryMatrix + ?Sized,
{
    h.ensure_live()?;
    if rows.ncols() != h.n_rows() {
        return Err(Error::mismatch("syndrome_vector operands", h.n_rows(), rows.ncols()));
    }
    if dest.nrows() != rows.nrows() {
        return Err(Error::mismatch("syndrome_vector destination rows", rows.nrows(), dest.nrows()));
    }
    if dest.ncols() != h.n_cols() {
        return Err(Error::mismatch("syndrome_vector destination cols", h.n_cols(), dest.ncols()));
    }
    if clear {
        dest.clear();
    }
    for i in 0..rows.nrows() {
        for j in crate::bitvec::Ones::new(rows.row_words(i)) {
            for col in h.row_iter(j) {
                dest.flip(i, col);
            }
        }
    }
    Ok(())
}

/// Number of ones in `A·B`, or in `A·Bᵀ` when `transpose` is set.
pub fn product_weight_csr_mzd(a: &CsrMatrix, b: &BitMatrix, transpose: bool) -> Result<usize> {
    let product = if transpose {
        csr_mzd_mul_new(a, &b.transpose())?
    } else {
        csr_mzd_mul_new(a, b)?
    };
    Ok(product.weight())
}

/// Returns the positions where the GF(2) product `A·B` equals 1, as a
/// compressed CSR matrix.
///
/// # Examples
///
/// ```
/// use gf2csr::{csr_csr_mul_non_zero, CsrMatrix};
///
/// let a = CsrMatrix::from_pairs(1, 2, [(0, 0), (0, 1)]).unwrap();
/// let b = CsrMatrix::from_pairs(2, 2, [(0, 1), (1, 1)]).unwrap();
///
/// // Column 1 is hit twice and cancels
/// let c = csr_csr_mul_non_zero(&a, &b).unwrap();
/// assert_eq!(c.nnz(), 0);
/// ```
pub fn csr_csr_mul_non_zero(a: &CsrMatrix, b: &CsrMatrix) -> Result<CsrMatrix> {
    csr_csr_mul_non_zero_with_config(a, b, &MulConfig::default())
}

/// [`csr_csr_mul_non_zero`] with explicit accumulator tuning.
#[instrument(level = "debug", skip_all, fields(rows = a.n_rows(), cols = b.n_cols()))]
pub fn csr_csr_mul_non_zero_with_config(
    a: &CsrMatrix,
    b: &CsrMatrix,
    config: &MulConfig,
) -> Result<CsrMatrix> {
    check_csr_shapes(a, b)?;

    let plans = plan_rows(a, b, config);
    let mut workspace = RowWorkspace::new(b.n_cols());
    let rows = plans
        .iter()
        .enumerate()
        .map(|(i, &plan)| workspace.multiply_row(i, a, b, plan))
        .collect();

    let c = CsrMatrix::from_sorted_rows(a.n_rows(), b.n_cols(), rows);
    trace!(nnz = c.nnz(), "structural product done");
    Ok(c)
}

pub(crate) fn check_csr_shapes(a: &CsrMatrix, b: &CsrMatrix) -> Result<()> {
    a.ensure_live()?;
    b.ensure_live()?;
    if a.n_cols() != b.n_rows() {
        return Err(Error::mismatch("csr_csr_mul operands", a.n_cols(), b.n_rows()));
    }
    Ok(())
}

/// Whether `A·Bᵀ ≠ 0` over GF(2).
///
/// Merges sorted row pairs and stops at the first pair with odd overlap.
pub fn csr_csr_mul_t_is_non_zero(a: &CsrMatrix, b: &CsrMatrix) -> Result<bool> {
    a.ensure_live()?;
    b.ensure_live()?;
    if a.n_cols() != b.n_cols() {
        return Err(Error::mismatch("csr_csr_mul_t_is_non_zero", a.n_cols(), b.n_cols()));
    }
    let a = compressed(a)?;
    let b = compressed(b)?;

    for i in 0..a.n_rows() {
        let row_a = a.row(i);
        if row_a.is_empty() {
            continue;
        }
        for j in 0..b.n_rows() {
            if odd_overlap(row_a, b.row(j)) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn compressed(m: &CsrMatrix) -> Result<Cow<'_, CsrMatrix>> {
    if m.is_compressed() {
        return Ok(Cow::Borrowed(m));
    }
    let mut owned = m.clone();
    owned.compress()?;
    Ok(Cow::Owned(owned))
}

/// Parity of the intersection of two strictly ascending index lists.
fn odd_overlap(x: &[usize], y: &[usize]) -> bool {
    let (mut p, mut q) = (0, 0);
    let mut parity = false;
    while p < x.len() && q < y.len() {
        match x[p].cmp(&y[q]) {
            std::cmp::Ordering::Less => p += 1,
            std::cmp::Ordering::Greater => q += 1,
            std::cmp::Ordering::Equal => {
                parity = !parity;
                p += 1;
                q += 1;
            }
        }
    }
    parity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> CsrMatrix {
        // [1 1 0]
        // [0 1 1]
        // [1 0 1]
        CsrMatrix::new(3, 3, vec![0, 2, 4, 6], vec![0, 1, 1, 2, 0, 2]).unwrap()
    }

    fn b() -> CsrMatrix {
        // [1 1 0]
        // [0 1 0]
        // [0 1 1]
        CsrMatrix::new(3, 3, vec![0, 2, 3, 5], vec![0, 1, 1, 1, 2]).unwrap()
    }

    #[test]
    fn test_structural_product() {
        let c = csr_csr_mul_non_zero(&a(), &b()).unwrap();
        assert_eq!(c.row(0), &[0]);
        assert_eq!(c.row(1), &[2]);
        assert_eq!(c.row(2), &[0, 2]);
        assert!(c.is_compressed());
    }

    #[test]
    fn test_accumulator_choice_does_not_change_result() {
        let mut config = MulConfig::default();
        config.dense_accum_threshold = 0;
        config.system_params.l2_cache_size = usize::MAX;
        let dense = csr_csr_mul_non_zero_with_config(&a(), &b(), &config).unwrap();
        assert_eq!(dense, csr_csr_mul_non_zero(&a(), &b()).unwrap());
    }

    #[test]
    fn test_structural_product_dimension_mismatch() {
        let wide = CsrMatrix::zeros(3, 4);
        assert!(matches!(
            csr_csr_mul_non_zero(&wide, &b()),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_csr_mzd_mul_matches_dense() {
        let dense_b = b().to_dense().unwrap();
        let expected = a().to_dense().unwrap().mul(&dense_b).unwrap();
        assert_eq!(csr_mzd_mul_new(&a(), &dense_b).unwrap(), expected);
    }

    #[test]
    fn test_csr_mzd_mul_accumulates_without_clear() {
        let dense_b = b().to_dense().unwrap();
        let mut dest = BitMatrix::zeros(3, 3);
        csr_mzd_mul(&mut dest, &a(), &dense_b, false).unwrap();
        csr_mzd_mul(&mut dest, &a(), &dense_b, false).unwrap();
        assert!(dest.is_zero());

        csr_mzd_mul(&mut dest, &a(), &dense_b, true).unwrap();
        csr_mzd_mul(&mut dest, &a(), &dense_b, true).unwrap();
        assert_eq!(dest, csr_mzd_mul_new(&a(), &dense_b).unwrap());
    }

    #[test]
    fn test_csr_mzd_mul_shape_checks() {
        let dense_b = BitMatrix::zeros(4, 3);
        let mut dest = BitMatrix::zeros(3, 3);
        assert!(csr_mzd_mul(&mut dest, &a(), &dense_b, true).is_err());

        let dense_b = BitMatrix::zeros(3, 3);
        let mut bad_dest = BitMatrix::zeros(2, 3);
        assert!(matches!(
            csr_mzd_mul(&mut bad_dest, &a(), &dense_b, true),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_syndrome_vector() {
        // Rows select rows of H: [1 0 1] picks rows 0 and 2 of a()
        let rows = BitMatrix::from_rows(&[[1u8, 0, 1], [0, 1, 0]]);
        let mut dest = BitMatrix::zeros(2, 3);
        syndrome_vector(&mut dest, &rows, &a(), true).unwrap();
        assert_eq!(dest, BitMatrix::from_rows(&[[0u8, 1, 1], [0, 1, 1]]));
    }

    #[test]
    fn test_product_weight() {
        let dense_b = b().to_dense().unwrap();
        assert_eq!(product_weight_csr_mzd(&a(), &dense_b, false).unwrap(), 4);
        // A·Bᵀ
        let expected = a()
            .to_dense()
            .unwrap()
            .mul(&dense_b.transpose())
            .unwrap()
            .weight();
        assert_eq!(product_weight_csr_mzd(&a(), &dense_b, true).unwrap(), expected);
    }

    #[test]
    fn test_mul_t_is_non_zero() {
        let hx = CsrMatrix::from_pairs(1, 3, [(0, 0), (0, 1)]).unwrap();
        let shares_one = CsrMatrix::from_pairs(1, 3, [(0, 1), (0, 2)]).unwrap();
        let shares_two = CsrMatrix::from_pairs(1, 3, [(0, 0), (0, 1), (0, 2)]).unwrap();
        assert!(csr_csr_mul_t_is_non_zero(&hx, &shares_one).unwrap());
        assert!(!csr_csr_mul_t_is_non_zero(&hx, &shares_two).unwrap());
    }

    #[test]
    fn test_mul_t_is_non_zero_uncompressed_input() {
        let mut x = CsrMatrix::init(1, 3, 3).unwrap();
        x.push_row(&[2, 0, 2]).unwrap();
        let y = CsrMatrix::from_pairs(1, 3, [(0, 2)]).unwrap();
        assert!(!csr_csr_mul_t_is_non_zero(&x, &y).unwrap());
    }
}
