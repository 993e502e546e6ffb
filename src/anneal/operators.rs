//! Neighbourhood operators.
//!
//! Both operators take the current solution by shared reference and build
//! every attempt on a fresh clone, so the current solution is never touched.
//! An attempt that breaks capacity or precedence is discarded and retried,
//! up to `max_retries` times; after that the operator returns an unchanged
//! copy of the current solution.

use crate::model::DistanceOracle;
use crate::route::{RouteError, Solution};
use rand::Rng;

/// Which operator produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Exchange two events within one vehicle's chain.
    TaskOrderSwap,
    /// Move one task's pickup and delivery to the end of another vehicle.
    VehicleReassignment,
}

/// A candidate produced by an operator.
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub solution: Solution,
    pub operator: Operator,
    /// Attempts discarded before this candidate.
    pub retries: usize,
    /// True when the retry ceiling was hit and `solution` is a copy of the
    /// current solution.
    pub fallback: bool,
}

impl Neighbor {
    pub fn cost(&self) -> f64 {
        self.solution.total_cost()
    }

    fn unchanged(current: &Solution, operator: Operator, retries: usize) -> Self {
        Self {
            solution: current.clone(),
            operator,
            retries,
            fallback: true,
        }
    }
}

/// Draws one candidate: a task-order swap with probability 0.5 when some
/// chain can be reordered, otherwise a vehicle reassignment.
pub fn sample_neighbor<D, R>(
    current: &Solution,
    oracle: &D,
    max_retries: usize,
    rng: &mut R,
) -> Result<Neighbor, RouteError>
where
    D: DistanceOracle + ?Sized,
    R: Rng,
{
    if current.can_reorder() && rng.random::<f64>() < 0.5 {
        swap_task_order(current, oracle, max_retries, rng)
    } else {
        reassign_vehicle(current, oracle, max_retries, rng)
    }
}

/// Exchanges the events at two distinct random positions of a random
/// vehicle holding more than three events.
pub fn swap_task_order<D, R>(
    current: &Solution,
    oracle: &D,
    max_retries: usize,
    rng: &mut R,
) -> Result<Neighbor, RouteError>
where
    D: DistanceOracle + ?Sized,
    R: Rng,
{
    let eligible: Vec<usize> = (0..current.vehicle_count())
        .filter(|&v| current.event_count(v) > 3)
        .collect();
    if eligible.is_empty() {
        return Ok(Neighbor::unchanged(current, Operator::TaskOrderSwap, 0));
    }

    for attempt in 0..max_retries {
        let vehicle = eligible[rng.random_range(0..eligible.len())];
        let len = current.event_count(vehicle);
        let i = rng.random_range(0..len);
        let j = rng.random_range(0..len);
        if i == j {
            continue;
        }

        let mut candidate = current.clone();
        candidate.swap_positions(vehicle, i, j)?;
        if candidate.is_valid() {
            candidate.refresh_vehicle_cost(vehicle, oracle);
            return Ok(Neighbor {
                solution: candidate,
                operator: Operator::TaskOrderSwap,
                retries: attempt,
                fallback: false,
            });
        }
    }

    Ok(Neighbor::unchanged(
        current,
        Operator::TaskOrderSwap,
        max_retries,
    ))
}

/// Moves the task at a random position of one vehicle to the end of
/// another, pickup immediately followed by delivery.
pub fn reassign_vehicle<D, R>(
    current: &Solution,
    oracle: &D,
    max_retries: usize,
    rng: &mut R,
) -> Result<Neighbor, RouteError>
where
    D: DistanceOracle + ?Sized,
    R: Rng,
{
    let fleet = current.vehicle_count();
    if fleet < 2 || current.total_events() == 0 {
        return Ok(Neighbor::unchanged(
            current,
            Operator::VehicleReassignment,
            0,
        ));
    }

    for attempt in 0..max_retries {
        let from = rng.random_range(0..fleet);
        let to = rng.random_range(0..fleet);
        let len = current.event_count(from);
        if from == to || len < 2 {
            continue;
        }
        let position = rng.random_range(0..len);

        let mut candidate = current.clone();
        candidate.transfer_task(from, position, to)?;
        if candidate.is_valid() {
            candidate.refresh_vehicle_cost(from, oracle);
            candidate.refresh_vehicle_cost(to, oracle);
            return Ok(Neighbor {
                solution: candidate,
                operator: Operator::VehicleReassignment,
                retries: attempt,
                fallback: false,
            });
        }
    }

    Ok(Neighbor::unchanged(
        current,
        Operator::VehicleReassignment,
        max_retries,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anneal::construction::construct_initial;
    use crate::model::{CityId, Task, Vehicle};
    use crate::route::EventKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn line(a: CityId, b: CityId) -> f64 {
        (a.0 as f64 - b.0 as f64).abs()
    }

    fn fleet(capacities: &[f64]) -> Arc<[Vehicle]> {
        capacities
            .iter()
            .enumerate()
            .map(|(i, &c)| Vehicle::new(i, c, 1.0, CityId(0)))
            .collect::<Vec<_>>()
            .into()
    }

    fn tasks(n: usize, weight: f64) -> Vec<Task> {
        (0..n)
            .map(|i| Task::new(i, CityId(i as u32), CityId(i as u32 + 3), weight))
            .collect()
    }

    fn order(sol: &Solution, vehicle: usize) -> Vec<(usize, EventKind)> {
        sol.events(vehicle)
            .map(|id| (sol.event(id).task().id, sol.event(id).kind()))
            .collect()
    }

    #[test]
    fn test_swap_exchanges_exactly_two_events() {
        let current = construct_initial(fleet(&[100.0]), &tasks(3, 1.0), &line, 0).unwrap();
        let before = order(&current, 0);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let n = swap_task_order(&current, &line, 1_000, &mut rng).unwrap();
            assert!(!n.fallback);
            assert!(n.solution.is_valid());
            let after = order(&n.solution, 0);
            let moved = before.iter().zip(&after).filter(|(a, b)| a != b).count();
            assert_eq!(moved, 2);
            assert!((n.cost() - n.solution.recompute_cost(&line)).abs() < 1e-9);
        }
        assert_eq!(order(&current, 0), before);
    }

    #[test]
    fn test_swap_without_eligible_vehicle_falls_back() {
        let current = construct_initial(fleet(&[100.0, 100.0]), &tasks(1, 1.0), &line, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let n = swap_task_order(&current, &line, 10, &mut rng).unwrap();
        assert!(n.fallback);
        assert_eq!(order(&n.solution, 0), order(&current, 0));
    }

    #[test]
    fn test_reassign_keeps_tasks_whole() {
        let current = construct_initial(fleet(&[100.0, 100.0, 100.0]), &tasks(4, 1.0), &line, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..50 {
            let n = reassign_vehicle(&current, &line, 1_000, &mut rng).unwrap();
            assert!(!n.fallback);
            assert!(n.solution.is_valid());
            assert_eq!(n.solution.event_count(0), 6);
            assert_eq!(n.solution.total_events(), 8);
            assert!((n.cost() - n.solution.recompute_cost(&line)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reassign_capacity_exhaustion_falls_back() {
        // vehicle 1 cannot carry anything
        let current = construct_initial(fleet(&[100.0, 0.5]), &tasks(2, 1.0), &line, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let n = reassign_vehicle(&current, &line, 25, &mut rng).unwrap();
        assert!(n.fallback);
        assert_eq!(n.retries, 25);
        assert_eq!(n.cost(), current.total_cost());
    }

    #[test]
    fn test_reassign_single_vehicle_falls_back() {
        let current = construct_initial(fleet(&[100.0]), &tasks(2, 1.0), &line, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let n = reassign_vehicle(&current, &line, 1_000, &mut rng).unwrap();
        assert!(n.fallback);
        assert_eq!(n.retries, 0);
    }

    #[test]
    fn test_sample_uses_reassignment_when_no_reorder() {
        let current = construct_initial(fleet(&[100.0, 100.0]), &tasks(1, 1.0), &line, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let n = sample_neighbor(&current, &line, 100, &mut rng).unwrap();
            assert_eq!(n.operator, Operator::VehicleReassignment);
            assert_eq!(n.solution.event_count(1), 2);
        }
    }
}
