//! Fleet assignments as per-vehicle event chains.
//!
//! A [`Solution`] holds one ordered chain of pickup/delivery [`Event`]s per
//! vehicle. Events live in a single arena and chains link arena indices, so
//! cloning a solution is a bulk copy that shares nothing with its source.
//!
//! # Invariants of a valid solution
//!
//! - Every task has exactly one pickup and one delivery, in the same chain,
//!   pickup first.
//! - Carried load never exceeds the vehicle's capacity along a chain.
//! - Recorded chain lengths match the chains; chains are acyclic and
//!   disjoint.
//! - After a cost refresh, the cached cost equals the structural cost.

mod error;
mod event;
mod plan;
mod solution;

pub use error::RouteError;
pub use event::{Event, EventId, EventKind};
pub use plan::{RoutePlan, Stop, VehicleRoute};
pub use solution::{EventTarget, Removed, RouteIter, Solution};
