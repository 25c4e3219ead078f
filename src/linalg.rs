//! Linear algebra for binary codes: generator matrices and CSS logical operators

use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::matrix::{BitMatrix, CsrMatrix, DenseBinaryMatrix, Permutation};
use crate::multiply::csr_csr_mul_non_zero;

/// Reduces `m` to reduced row echelon form and returns the pivot columns
/// together with the column order `pivots ++ non-pivots`.
///
/// Relabeling columns with the inverse of that order brings the non-zero rows
/// of `m` to the standard form `[I C]`.
fn standard_form_order(m: &mut BitMatrix) -> Result<(usize, Permutation)> {
    let pivots = m.gauss_naive(true);
    let rank = pivots.len();
    let mut is_pivot = vec![false; m.ncols()];
    for &p in &pivots {
        is_pivot[p] = true;
    }
    let mut order = pivots;
    order.extend((0..is_pivot.len()).filter(|&c| !is_pivot[c]));
    Ok((rank, Permutation::from_vec(order)?))
}

/// Dense generator matrix of the code with parity-check matrix `h`.
///
/// The `(n - rank(H)) × n` rows form a basis of `ker H`, so `H·Gᵀ = 0`.
#[instrument(level = "debug", skip_all, fields(rows = h.n_rows(), n = h.n_cols()))]
pub fn generator_from_csr(h: &CsrMatrix) -> Result<BitMatrix> {
    let n = h.n_cols();
    let mut m = h.to_dense()?;
    let (rank, order) = standard_form_order(&mut m)?;
    let std_form = m.apply_col_perm(&order.inverse())?;

    // With H = [I C] the generator is [Cᵀ I]
    let k = n - rank;
    let mut g = BitMatrix::zeros(k, n);
    for row in 0..k {
        for i in 0..rank {
            if std_form.get(i, rank + row) {
                g.set(row, i, true);
            }
        }
        g.set(row, rank + row, true);
    }
    debug!(rank, k, "generator matrix built");

    g.apply_col_perm(&order)
}

/// Logical operators `Lx` of the CSS code with check matrices `hx` and `hz`.
///
/// The rows of the result lie in `ker Hz`, are linearly independent and are
/// independent of the rows of `hx`; their number is
/// `n - rank(Hx) - rank(Hz)`.
#[instrument(level = "debug", skip_all, fields(n = hx.n_cols()))]
pub fn lx_for_css_code(hx: &CsrMatrix, hz: &CsrMatrix) -> Result<CsrMatrix> {
    let n = hx.n_cols();
    if hz.n_cols() != n {
        return Err(Error::mismatch("lx_for_css_code", n, hz.n_cols()));
    }

    let overlap = csr_csr_mul_non_zero(hx, &hz.transpose()?)?;
    if overlap.nnz() > 0 {
        return Err(Error::NotOrthogonal {
            weight: overlap.nnz(),
        });
    }

    let mut mx = hx.to_dense()?;
    let (rank, order) = standard_form_order(&mut mx)?;
    let perm = order.inverse();
    let mx = mx.apply_col_perm(&perm)?;
    let hz_perm = hz.apply_col_perm(&perm)?;
    let mz_star = generator_from_csr(&hz_perm)?;

    let mut stacked = mx.stack(&mz_star)?;
    let rank1 = stacked.gauss_naive(false).len();
    debug!(rank_hx = rank, rank_total = rank1, "logical operators found");

    let lx = CsrMatrix::from_dense(&stacked.row_range(rank..rank1));
    lx.apply_col_perm(&order)
}
