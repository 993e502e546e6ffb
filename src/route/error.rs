//! Errors raised by route manipulation and validation.

use super::event::EventKind;
use thiserror::Error;

/// Errors raised while editing or validating a [`Solution`](super::Solution).
///
/// Lookup and edit variants signal a broken caller contract; validation
/// variants name the first invariant a candidate violates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// A vehicle index outside the fleet.
    #[error("vehicle index {vehicle} out of range for a fleet of {fleet}")]
    VehicleOutOfRange { vehicle: usize, fleet: usize },

    /// `event_at` asked for a position past the chain end.
    #[error("no event at position {position} of vehicle {vehicle} (route holds {len})")]
    PositionOutOfRange {
        vehicle: usize,
        position: usize,
        len: usize,
    },

    /// The event targeted by a removal is not linked in that chain.
    #[error("{kind:?} of task {task_id} is not in the route of vehicle {vehicle}")]
    EventNotInRoute {
        vehicle: usize,
        task_id: usize,
        kind: EventKind,
    },

    /// An insertion targeted an event that is already linked somewhere.
    #[error("event of task {task_id} is already linked in the route of vehicle {owner}")]
    EventAlreadyLinked { task_id: usize, owner: usize },

    /// Recorded chain length differs from the walked length.
    #[error("vehicle {vehicle} records {recorded} events but its chain holds {actual}")]
    CountMismatch {
        vehicle: usize,
        recorded: usize,
        actual: usize,
    },

    /// A chain revisits an event, either its own or another chain's.
    #[error("route of vehicle {vehicle} is cyclic or shares an event with another route")]
    CycleOrShared { vehicle: usize },

    /// A task has two events of the same kind.
    #[error("task {task_id} has more than one {kind:?}")]
    DuplicateEvent { task_id: usize, kind: EventKind },

    /// A task's pickup and delivery sit in different chains.
    #[error("task {task_id} is split between vehicles {pickup_vehicle} and {delivery_vehicle}")]
    SplitTask {
        task_id: usize,
        pickup_vehicle: usize,
        delivery_vehicle: usize,
    },

    /// A delivery precedes its pickup, or has none.
    #[error("delivery of task {task_id} on vehicle {vehicle} is not preceded by its pickup")]
    DeliveryBeforePickup { vehicle: usize, task_id: usize },

    /// A pickup was never delivered.
    #[error("task {task_id} is picked up by vehicle {vehicle} but never delivered")]
    MissingCounterpart { vehicle: usize, task_id: usize },

    /// Carried load exceeds capacity somewhere along a chain.
    #[error("vehicle {vehicle} carries {load} over capacity {capacity} after task {task_id}")]
    CapacityExceeded {
        vehicle: usize,
        task_id: usize,
        load: f64,
        capacity: f64,
    },

    /// The solution's tasks differ from the governing task set.
    #[error("solution covers {covered} tasks, governing set has {expected}")]
    TaskSetMismatch { covered: usize, expected: usize },
}
