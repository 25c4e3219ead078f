//! Tuning parameters for the sparse product kernels

/// System parameters for performance tuning
#[derive(Debug, Clone)]
pub struct SystemParameters {
    /// Size of L2 cache in bytes
    pub l2_cache_size: usize,
    /// Number of threads to use
    pub n_threads: usize,
}

impl Default for SystemParameters {
    fn default() -> Self {
        Self {
            l2_cache_size: 256_000,     // 256KB L2 cache (conservative default)
            n_threads: num_cpus::get(), // Use all available cores
        }
    }
}

/// How the parity of one output row is accumulated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulationMethod {
    /// Collect, sort and cancel pairs; for short intermediate products
    Sort,
    /// One parity flag per output column; for long intermediate products
    Dense,
}

/// Configuration for sparse × sparse and sparse × dense products
#[derive(Debug, Clone)]
pub struct MulConfig {
    /// System parameters for performance tuning
    pub system_params: SystemParameters,

    /// Intermediate products per row above which dense accumulation is used
    pub dense_accum_threshold: usize,

    /// Minimum number of output rows before the parallel kernels split work
    pub parallel_row_threshold: usize,
}

impl Default for MulConfig {
    fn default() -> Self {
        Self {
            system_params: SystemParameters::default(),
            dense_accum_threshold: 256,
            parallel_row_threshold: 1024,
        }
    }
}

impl MulConfig {
    /// Config with a fixed thread count
    pub fn with_threads(n_threads: usize) -> Self {
        let mut config = Self::default();
        config.system_params.n_threads = n_threads.max(1);
        config
    }
}
