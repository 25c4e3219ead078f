//! # Row Categorization for sparse GF(2) products
//!
//! Each row of `A` in `A·B` is assigned an accumulation method from the number
//! of intermediate products it generates (the sum of the lengths of the rows of
//! `B` it selects):
//!
//! 1. **Sort**: the intermediate product has at most `dense_accum_threshold`
//!    entries, or the dense parity array would not fit in L2 cache.
//! 2. **Dense**: otherwise; one parity flag per output column.

use crate::matrix::config::{AccumulationMethod, MulConfig};
use crate::matrix::CsrMatrix;

/// Accumulation choice for one output row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPlan {
    pub method: AccumulationMethod,
    /// Intermediate products the row generates
    pub intermediate: usize,
}

/// Plans every row of `a` in the product `a·b`
///
/// The caller is responsible for `a.n_cols() == b.n_rows()`.
pub fn plan_rows(a: &CsrMatrix, b: &CsrMatrix, config: &MulConfig) -> Vec<RowPlan> {
    let dense_threshold = config.dense_accum_threshold;
    let l2_cache_size = config.system_params.l2_cache_size;

    // Dense accumulator keeps two flags per output column
    let dense_size = 2 * b.n_cols() * std::mem::size_of::<bool>();

    (0..a.n_rows())
        .map(|i| {
            let intermediate: usize = a.row_iter(i).map(|k| b.row(k).len()).sum();
            let method = if intermediate <= dense_threshold || dense_size > l2_cache_size {
                AccumulationMethod::Sort
            } else {
                AccumulationMethod::Dense
            };
            RowPlan {
                method,
                intermediate,
            }
        })
        .collect()
}

/// Chooses an accumulation method for every row of `a` in the product `a·b`
pub fn categorize_rows(a: &CsrMatrix, b: &CsrMatrix, config: &MulConfig) -> Vec<AccumulationMethod> {
    plan_rows(a, b, config).into_iter().map(|plan| plan.method).collect()
}

/// Analyzes matrices A and B and returns a summary of row categorization
pub fn analyze_categorization(a: &CsrMatrix, b: &CsrMatrix, config: &MulConfig) -> CategorizationSummary {
    let categories = categorize_rows(a, b, config);

    let mut summary = CategorizationSummary {
        total_rows: categories.len(),
        ..Default::default()
    };

    for category in categories {
        match category {
            AccumulationMethod::Sort => summary.sort_count += 1,
            AccumulationMethod::Dense => summary.dense_count += 1,
        }
    }

    summary
}

/// Summary of row categorization for a sparse product
#[derive(Debug, Default, Clone, Copy)]
pub struct CategorizationSummary {
    /// Total number of rows analyzed
    pub total_rows: usize,
    /// Number of rows using sort-based accumulation
    pub sort_count: usize,
    /// Number of rows using dense accumulation
    pub dense_count: usize,
}
