//! # Parallel products
//!
//! Rayon versions of the sparse × dense and sparse × sparse products. Work is
//! split by output row, so every task owns a disjoint slice of the result.
//! Both functions run inside a dedicated pool sized from
//! [`SystemParameters::n_threads`](crate::matrix::SystemParameters) and fall
//! back to the sequential kernels below `parallel_row_threshold` rows.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::instrument;

use crate::bitvec;
use crate::error::Result;
use crate::accumulator::RowWorkspace;
use crate::matrix::{plan_rows, BitMatrix, CsrMatrix, DenseBinaryMatrix, MulConfig};
use crate::multiply::{self, check_csr_shapes, check_mzd_shapes};

fn pool(config: &MulConfig) -> Result<ThreadPool> {
    Ok(ThreadPoolBuilder::new()
        .num_threads(config.system_params.n_threads)
        .build()?)
}

/// Parallel form of [`multiply::csr_mzd_mul`] writing into a [`BitMatrix`].
///
/// When `clear` is set the destination is zeroed before any row task starts.
#[instrument(level = "debug", skip_all, fields(rows = sparse.n_rows()))]
pub fn csr_mzd_mul_parallel<S>(
    dest: &mut BitMatrix,
    sparse: &CsrMatrix,
    dense: &S,
    clear: bool,
    config: &MulConfig,
) -> Result<()>
where
    S: DenseBinaryMatrix + Sync + ?Sized,
{
    check_mzd_shapes(dest, sparse, dense)?;
    if sparse.n_rows() < config.parallel_row_threshold || dest.width() == 0 {
        return multiply::csr_mzd_mul(dest, sparse, dense, clear);
    }
    if clear {
        dest.clear();
    }

    let width = dest.width();
    let words = dest.words_mut();
    pool(config)?.install(|| {
        words
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(i, row)| {
                for k in sparse.row_iter(i) {
                    bitvec::xor_words(row, dense.row_words(k));
                }
            });
    });
    Ok(())
}

/// Parallel form of [`multiply::csr_csr_mul_non_zero_with_config`].
///
/// # Examples
///
/// ```
/// use gf2csr::{csr_csr_mul_non_zero_parallel, CsrMatrix, MulConfig};
///
/// let a = CsrMatrix::identity(2);
/// let c = csr_csr_mul_non_zero_parallel(&a, &a, &MulConfig::default()).unwrap();
/// assert_eq!(c, a);
/// ```
#[instrument(level = "debug", skip_all, fields(rows = a.n_rows(), cols = b.n_cols()))]
pub fn csr_csr_mul_non_zero_parallel(
    a: &CsrMatrix,
    b: &CsrMatrix,
    config: &MulConfig,
) -> Result<CsrMatrix> {
    check_csr_shapes(a, b)?;
    if a.n_rows() < config.parallel_row_threshold {
        return multiply::csr_csr_mul_non_zero_with_config(a, b, config);
    }

    // 1. Determine row categories for adaptive strategy selection
    let plans = plan_rows(a, b, config);

    // 2. Process rows in parallel; each worker reuses its own accumulators
    let rows: Vec<Vec<usize>> = pool(config)?.install(|| {
        plans
            .par_iter()
            .enumerate()
            .map_init(
                || RowWorkspace::new(b.n_cols()),
                |workspace, (i, &plan)| workspace.multiply_row(i, a, b, plan),
            )
            .collect()
    });

    // 3. Assemble the final CSR matrix
    Ok(CsrMatrix::from_sorted_rows(a.n_rows(), b.n_cols(), rows))
}
