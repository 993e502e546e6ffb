//! Simulated annealing over fleet assignments.
//!
//! Builds a starting [`Solution`](crate::route::Solution), either the
//! caller's warm-start seed or a greedy round-robin construction, then
//! improves it with two neighbourhood operators:
//!
//! - **Task-order swap**: exchange two events inside one vehicle's chain.
//! - **Vehicle reassignment**: move a whole task to the end of another
//!   vehicle's chain.
//!
//! Each iteration samples a pool of candidates, keeps the cheapest and
//! accepts it by a Metropolis-style test whose temperature is the fraction
//! of the budget already spent.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

mod config;
mod construction;
mod error;
pub mod operators;
mod runner;

pub use config::{
    AnnealConfig, DEFAULT_ITERATIONS, DEFAULT_MAX_RETRIES, DEFAULT_POOL_SIZE, MAX_ITERATIONS,
};
pub use construction::construct_initial;
pub use error::SolverError;
pub use runner::{AnnealResult, Annealer};
