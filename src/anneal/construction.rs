//! Greedy initial assignment.

use super::error::SolverError;
use crate::model::{DistanceOracle, Task, Vehicle};
use crate::route::{EventKind, Solution};
use std::sync::Arc;
use tracing::debug;

/// Builds the starting solution for a run.
///
/// Every task goes to vehicle `start_vehicle % fleet size`, in the given
/// order, as a pickup immediately followed by its delivery. The route cost
/// is accumulated while the chain grows.
///
/// Fails with [`SolverError::Unsolvable`] as soon as a task outweighs the
/// chosen vehicle; the instance is never patched by redistributing tasks.
pub fn construct_initial<D>(
    vehicles: Arc<[Vehicle]>,
    tasks: &[Task],
    oracle: &D,
    start_vehicle: usize,
) -> Result<Solution, SolverError>
where
    D: DistanceOracle + ?Sized,
{
    if vehicles.is_empty() {
        return Err(SolverError::NoVehicles);
    }
    let index = start_vehicle % vehicles.len();
    let vehicle = vehicles[index];
    let mut solution = Solution::empty(vehicles);

    let mut tail = None;
    let mut city = vehicle.current_city;
    let mut cost = 0.0;

    for &task in tasks {
        if !vehicle.can_carry(&task) {
            return Err(SolverError::Unsolvable {
                task_id: task.id,
                weight: task.weight,
                vehicle_id: vehicle.id,
                capacity: vehicle.capacity,
            });
        }

        let pickup = solution.new_event(task, EventKind::Pickup);
        let delivery = solution.new_event(task, EventKind::Delivery);
        solution.link_after(index, pickup, tail);
        solution.link_after(index, delivery, Some(pickup));
        tail = Some(delivery);

        cost += oracle.distance(city, task.pickup) * vehicle.cost_per_distance;
        cost += oracle.distance(task.pickup, task.delivery) * vehicle.cost_per_distance;
        city = task.delivery;
    }

    solution.set_route_cost(index, cost);
    debug!(
        vehicle = vehicle.id,
        tasks = tasks.len(),
        cost,
        "constructed initial solution"
    );
    Ok(solution)
}
