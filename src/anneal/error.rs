//! Errors surfaced by the annealer.

use crate::route::RouteError;
use thiserror::Error;

/// Errors returned by [`Annealer`](super::Annealer) calls.
///
/// An unsolvable instance is never reported as a cheap or empty solution;
/// callers must handle it separately from an expensive but valid result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// Greedy construction met a task heavier than its assigned vehicle
    /// can carry.
    #[error(
        "unsolvable instance: task {task_id} weighs {weight} but vehicle {vehicle_id} carries at most {capacity}"
    )]
    Unsolvable {
        task_id: usize,
        weight: f64,
        vehicle_id: usize,
        capacity: f64,
    },

    /// The fleet is empty.
    #[error("cannot plan without vehicles")]
    NoVehicles,

    /// [`AnnealConfig::validate`](super::AnnealConfig::validate) failed.
    #[error("invalid annealer configuration: {0}")]
    InvalidConfig(String),

    /// A route edit broke its contract; the run is aborted.
    #[error("route consistency violated: {0}")]
    Route(#[from] RouteError),
}
