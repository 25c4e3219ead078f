//! # gf2csr: sparse binary matrices over GF(2)
//!
//! Sparse Compressed Sparse Row (CSR) matrices whose entries live in the
//! two-element field, bridged to word-packed dense bit matrices, together
//! with the linear algebra used to study classical and quantum CSS codes.
//!
//! ## Overview
//!
//! - [`CsrMatrix`]: positions of the 1-entries only. Repeated column indices
//!   in a row are merged by parity, so two copies cancel.
//! - [`BitMatrix`]: dense rows of little-endian `u64` words, reached through
//!   the [`DenseBinaryMatrix`] capability trait so other backends can stand in.
//! - Products: sparse × dense ([`csr_mzd_mul`]) and structural sparse × sparse
//!   ([`csr_csr_mul_non_zero`]), each with a rayon variant in [`parallel`].
//! - Codes: generator matrices, CSS logical operators and a random-window
//!   upper bound on the distance.
//!
//! Addition is exclusive-or and multiplication is logical AND throughout.
//!
//! ## Usage
//!
//! ```
//! use gf2csr::{csr_csr_mul_non_zero, CsrMatrix};
//!
//! // Rows of a CSS pair must be orthogonal over GF(2)
//! let hx = CsrMatrix::from_pairs(1, 3, [(0, 0), (0, 1)]).unwrap();
//! let hz = CsrMatrix::from_pairs(1, 3, [(0, 0), (0, 1), (0, 2)]).unwrap();
//!
//! let product = csr_csr_mul_non_zero(&hx, &hz.transpose().unwrap()).unwrap();
//! assert_eq!(product.nnz(), 0);
//! ```

pub mod accumulator;
pub mod bitvec;
pub mod distance;
pub mod error;
pub mod linalg;
pub mod matrix;
pub mod multiply;
pub mod parallel;
pub mod params;
pub mod utils;

// Re-export primary components
pub use bitvec::BitVec;
pub use distance::{
    cluster_distance, estimate_distance, random_window_distance, ClusterBound, ClusterOptions, DistanceBound,
    DistanceReport, RwOptions,
};
pub use error::{Error, Result};
pub use linalg::{generator_from_csr, lx_for_css_code};
pub use matrix::config::{AccumulationMethod, MulConfig, SystemParameters};
pub use matrix::{analyze_categorization, categorize_rows, plan_rows, CategorizationSummary, RowPlan};
pub use matrix::{mm_read, read_matrix_market, BitMatrix, CsrMatrix, DenseBinaryMatrix, Permutation};
pub use multiply::{
    csr_csr_mul_non_zero, csr_csr_mul_non_zero_with_config, csr_csr_mul_t_is_non_zero, csr_mzd_mul,
    csr_mzd_mul_new, product_weight_csr_mzd, syndrome_vector,
};
pub use parallel::{csr_csr_mul_non_zero_parallel, csr_mzd_mul_parallel};
pub use params::{CodeContext, CodeMode, CodeParams};
pub use utils::{from_ndarray, from_sprs, to_ndarray, to_sprs_csr};

/// Version information for the gf2csr library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
