// Matrix data structures and operations

pub mod categorization;
pub mod config;
pub mod conversion;
pub mod csr;
pub mod dense;
pub mod io;
pub mod permutation;

pub use categorization::{analyze_categorization, categorize_rows, plan_rows, CategorizationSummary, RowPlan};
pub use config::{AccumulationMethod, MulConfig, SystemParameters};
pub use csr::CsrMatrix;
pub use dense::{BitMatrix, DenseBinaryMatrix};
pub use io::{mm_read, read_matrix_market};
pub use permutation::Permutation;
