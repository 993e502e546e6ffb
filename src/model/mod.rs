//! Problem records consumed by the planner.
//!
//! Tasks, vehicles and the distance oracle are owned by the environment;
//! the planner only reads them. Cities are opaque [`CityId`] handles whose
//! meaning is defined entirely by the [`DistanceOracle`] in use.
//!
//! # Key Types
//!
//! - [`Task`]: A pickup-and-delivery request with a weight
//! - [`Vehicle`]: A capacity-constrained vehicle with a per-distance cost
//! - [`DistanceOracle`]: Pure `distance(a, b)` lookup supplied by a topology provider
//! - [`DistanceMatrix`]: Dense oracle over `0..n` city handles
//! - [`DistanceTable`]: Pair-keyed cache built from any distance function

mod distance;
mod types;

pub use distance::{CityPair, DistanceMatrix, DistanceOracle, DistanceTable};
pub use types::{CityId, Task, Vehicle};
