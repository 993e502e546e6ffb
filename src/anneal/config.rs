//! Annealer configuration.

/// Candidates sampled per iteration by default.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Iteration budget for calls under time pressure.
pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Iteration budget for calls with time to spare.
pub const MAX_ITERATIONS: usize = 50_000;

/// Attempts an operator makes before returning the current solution.
pub const DEFAULT_MAX_RETRIES: usize = 1_000;

/// Configuration for the fleet annealer.
///
/// # Examples
///
/// ```
/// use u_fleetplan::anneal::{AnnealConfig, MAX_ITERATIONS};
///
/// let config = AnnealConfig::default()
///     .with_pool_size(20)
///     .with_iterations(MAX_ITERATIONS)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct AnnealConfig {
    /// Neighbour candidates sampled per iteration; only the cheapest
    /// competes for acceptance.
    pub pool_size: usize,

    /// Exact number of annealing iterations. 0 returns the initial solution.
    pub iterations: usize,

    /// Attempts per operator call before it gives up and returns an
    /// unchanged copy of the current solution.
    pub max_retries: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,

    /// Whether to evaluate the candidate pool in parallel using rayon.
    ///
    /// Has no effect unless the `parallel` feature is enabled. Results are
    /// identical to sequential evaluation for a fixed seed.
    pub parallel: bool,

    /// Best cost is recorded every `history_interval` iterations.
    pub history_interval: usize,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            iterations: DEFAULT_ITERATIONS,
            max_retries: DEFAULT_MAX_RETRIES,
            seed: None,
            parallel: false,
            history_interval: 100,
        }
    }
}

impl AnnealConfig {
    pub fn with_pool_size(mut self, n: usize) -> Self {
        self.pool_size = n;
        self
    }

    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    pub fn with_max_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_history_interval(mut self, n: usize) -> Self {
        self.history_interval = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.pool_size == 0 {
            return Err("pool_size must be at least 1".into());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".into());
        }
        if self.history_interval == 0 {
            return Err("history_interval must be at least 1".into());
        }
        Ok(())
    }
}
