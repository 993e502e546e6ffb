//! Task and vehicle records.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque city handle.
///
/// The planner never inspects the value; it is only passed back to the
/// [`DistanceOracle`](super::DistanceOracle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CityId(pub u32);

impl From<u32> for CityId {
    fn from(raw: u32) -> Self {
        CityId(raw)
    }
}

impl std::fmt::Display for CityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "city#{}", self.0)
    }
}

/// A pickup-and-delivery request.
///
/// The task's `weight` is carried from the moment it is picked up in
/// `pickup` until it is delivered in `delivery`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Task {
    /// Identifier, unique within one governing task set.
    pub id: usize,
    /// City where the load is collected.
    pub pickup: CityId,
    /// City where the load is dropped.
    pub delivery: CityId,
    /// Load carried between pickup and delivery.
    pub weight: f64,
}

impl Task {
    pub fn new(id: usize, pickup: CityId, delivery: CityId, weight: f64) -> Self {
        Self {
            id,
            pickup,
            delivery,
            weight,
        }
    }
}

/// A vehicle of the fleet.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vehicle {
    /// Identifier, reported in errors only.
    pub id: usize,
    /// Maximum load carried at any point of the route.
    pub capacity: f64,
    /// Cost per unit of distance travelled.
    pub cost_per_distance: f64,
    /// City the route starts from.
    pub current_city: CityId,
}

impl Vehicle {
    pub fn new(id: usize, capacity: f64, cost_per_distance: f64, current_city: CityId) -> Self {
        Self {
            id,
            capacity,
            cost_per_distance,
            current_city,
        }
    }

    /// Whether a single task fits this vehicle when carried alone.
    pub fn can_carry(&self, task: &Task) -> bool {
        task.weight <= self.capacity
    }
}
