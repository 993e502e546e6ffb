//! Property tests over randomly generated fleets and task sets.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use u_fleetplan::anneal::operators::{reassign_vehicle, sample_neighbor, swap_task_order};
use u_fleetplan::anneal::{construct_initial, AnnealConfig, Annealer};
use u_fleetplan::model::{CityId, Task, Vehicle};
use u_fleetplan::route::{EventKind, RoutePlan, Solution};

fn line(a: CityId, b: CityId) -> f64 {
    (a.0 as f64 - b.0 as f64).abs()
}

#[derive(Debug, Clone)]
struct Instance {
    vehicles: Vec<Vehicle>,
    tasks: Vec<Task>,
}

fn instance() -> impl Strategy<Value = Instance> {
    let vehicles = prop::collection::vec((10u32..30, 1u32..4, 0u32..20), 1..4).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (cap, cpd, home))| Vehicle::new(i, cap as f64, cpd as f64, CityId(home)))
            .collect::<Vec<_>>()
    });
    let tasks = prop::collection::vec((0u32..20, 0u32..20, 1u32..=10), 1..8).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (from, to, w))| Task::new(i, CityId(from), CityId(to), w as f64))
            .collect::<Vec<_>>()
    });
    (vehicles, tasks).prop_map(|(vehicles, tasks)| Instance { vehicles, tasks })
}

/// Independent check of precedence, completeness and capacity on a plan.
fn assert_feasible(plan: &RoutePlan, vehicles: &[Vehicle], tasks: &[Task]) {
    for task in tasks {
        let id = task.id;
        let owners: Vec<(usize, usize, EventKind)> = plan
            .routes
            .iter()
            .enumerate()
            .flat_map(move |(v, r)| {
                r.stops
                    .iter()
                    .enumerate()
                    .filter(move |(_, s)| s.task_id == id)
                    .map(move |(pos, s)| (v, pos, s.kind))
            })
            .collect();
        assert_eq!(owners.len(), 2, "task {} events: {:?}", task.id, owners);
        let pickup = owners.iter().find(|o| o.2 == EventKind::Pickup).unwrap();
        let delivery = owners.iter().find(|o| o.2 == EventKind::Delivery).unwrap();
        assert_eq!(pickup.0, delivery.0, "task {} split", task.id);
        assert!(pickup.1 < delivery.1, "task {} delivered first", task.id);
    }

    for (route, vehicle) in plan.routes.iter().zip(vehicles) {
        let mut load = 0.0;
        for stop in &route.stops {
            let weight = tasks.iter().find(|t| t.id == stop.task_id).unwrap().weight;
            match stop.kind {
                EventKind::Pickup => load += weight,
                EventKind::Delivery => load -= weight,
            }
            assert!(load <= vehicle.capacity + 1e-9);
        }
    }
}

fn initial(inst: &Instance) -> Solution {
    let fleet: Arc<[Vehicle]> = inst.vehicles.clone().into();
    construct_initial(fleet, &inst.tasks, &line, 0).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn solve_result_is_feasible_and_cost_consistent(inst in instance(), seed in any::<u64>()) {
        let mut annealer = Annealer::new(
            AnnealConfig::default().with_iterations(40).with_pool_size(4).with_seed(seed),
        );
        let result = annealer.solve(inst.vehicles.clone(), &inst.tasks, &line).unwrap();

        prop_assert!(result.best.is_valid());
        prop_assert!(result.best.covers(&inst.tasks));
        prop_assert!(result.best_cost <= result.initial_cost + 1e-9);
        prop_assert!((result.best_cost - result.best.recompute_cost(&line)).abs() < 1e-6);
        assert_feasible(&result.best.plan(), &inst.vehicles, &inst.tasks);
    }

    #[test]
    fn construction_cost_matches_recomputation(inst in instance(), start in 0usize..4) {
        let fleet: Arc<[Vehicle]> = inst.vehicles.clone().into();
        let sol = construct_initial(fleet, &inst.tasks, &line, start).unwrap();
        prop_assert!(sol.is_valid());
        prop_assert!((sol.total_cost() - sol.recompute_cost(&line)).abs() < 1e-9);
    }

    #[test]
    fn swap_changes_exactly_two_positions(inst in instance(), seed in any::<u64>()) {
        let current = initial(&inst);
        prop_assume!(current.can_reorder());
        let mut rng = StdRng::seed_from_u64(seed);
        let n = swap_task_order(&current, &line, 1_000, &mut rng).unwrap();

        prop_assert!(n.solution.is_valid());
        if !n.fallback {
            let differing: usize = (0..current.vehicle_count())
                .map(|v| {
                    let a: Vec<_> = current.events(v).map(|id| (current.event(id).task().id, current.event(id).kind())).collect();
                    let b: Vec<_> = n.solution.events(v).map(|id| (n.solution.event(id).task().id, n.solution.event(id).kind())).collect();
                    a.iter().zip(&b).filter(|(x, y)| x != y).count()
                })
                .sum();
            prop_assert_eq!(differing, 2);
        }
        assert_feasible(&n.solution.plan(), &inst.vehicles, &inst.tasks);
    }

    #[test]
    fn reassignment_never_splits_tasks(inst in instance(), seed in any::<u64>()) {
        let current = initial(&inst);
        let mut rng = StdRng::seed_from_u64(seed);
        let n = reassign_vehicle(&current, &line, 200, &mut rng).unwrap();

        prop_assert!(n.solution.is_valid());
        prop_assert_eq!(n.solution.total_events(), current.total_events());
        assert_feasible(&n.solution.plan(), &inst.vehicles, &inst.tasks);
    }

    #[test]
    fn candidates_leave_current_untouched(inst in instance(), seed in any::<u64>()) {
        let current = initial(&inst);
        let before = current.plan();
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..5 {
            let n = sample_neighbor(&current, &line, 100, &mut rng).unwrap();
            prop_assert!((n.cost() - n.solution.recompute_cost(&line)).abs() < 1e-9);
        }
        prop_assert_eq!(current.plan(), before);
    }

    #[test]
    fn clone_edits_are_isolated(inst in instance()) {
        let original = initial(&inst);
        let before = original.plan();

        let mut copy = original.clone();
        let vehicle = (0..copy.vehicle_count()).find(|&v| copy.event_count(v) > 0).unwrap();
        let head = copy.head(vehicle).unwrap();
        let removed = copy.remove(vehicle, head).unwrap();
        copy.insert_after(vehicle, removed.event, copy.tail(vehicle)).unwrap();
        copy.refresh_cost(&line);

        prop_assert_eq!(original.plan(), before);
        prop_assert!(original.is_valid());
    }

    #[test]
    fn filtering_keeps_relative_order(inst in instance(), keep_mask in any::<u8>()) {
        let sol = initial(&inst);
        let kept: Vec<Task> = inst
            .tasks
            .iter()
            .filter(|t| keep_mask & (1 << (t.id % 8)) != 0)
            .copied()
            .collect();
        let filtered = sol.filtered_to(&kept, &line);

        prop_assert!(filtered.is_valid());
        prop_assert!(filtered.covers(&kept));
        prop_assert!((filtered.total_cost() - filtered.recompute_cost(&line)).abs() < 1e-9);
        for v in 0..sol.vehicle_count() {
            let expected: Vec<_> = sol
                .events(v)
                .map(|id| sol.event(id))
                .filter(|e| kept.iter().any(|t| t.id == e.task().id))
                .map(|e| (e.task().id, e.kind()))
                .collect();
            let actual: Vec<_> = filtered
                .events(v)
                .map(|id| (filtered.event(id).task().id, filtered.event(id).kind()))
                .collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
