//! Flattened per-vehicle itinerary.

use super::event::EventKind;
use crate::model::CityId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One pickup or delivery stop.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stop {
    pub task_id: usize,
    pub kind: EventKind,
    pub city: CityId,
}

/// Ordered stops of one vehicle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleRoute {
    pub vehicle_id: usize,
    /// City the vehicle departs from.
    pub start: CityId,
    pub stops: Vec<Stop>,
    pub cost: f64,
}

impl VehicleRoute {
    /// Cities visited in order, starting city included.
    pub fn cities(&self) -> impl Iterator<Item = CityId> + '_ {
        std::iter::once(self.start).chain(self.stops.iter().map(|s| s.city))
    }
}

/// Itinerary of the whole fleet, as handed to action-emitting collaborators.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoutePlan {
    pub routes: Vec<VehicleRoute>,
    pub total_cost: f64,
}

impl RoutePlan {
    pub fn stop_count(&self) -> usize {
        self.routes.iter().map(|r| r.stops.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cities_start_with_depot() {
        let route = VehicleRoute {
            vehicle_id: 0,
            start: CityId(4),
            stops: vec![
                Stop {
                    task_id: 1,
                    kind: EventKind::Pickup,
                    city: CityId(2),
                },
                Stop {
                    task_id: 1,
                    kind: EventKind::Delivery,
                    city: CityId(7),
                },
            ],
            cost: 8.0,
        };
        let cities: Vec<_> = route.cities().collect();
        assert_eq!(cities, vec![CityId(4), CityId(2), CityId(7)]);

        let plan = RoutePlan {
            routes: vec![route],
            total_cost: 8.0,
        };
        assert_eq!(plan.stop_count(), 2);
    }
}
