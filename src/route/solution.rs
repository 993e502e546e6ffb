//! Arena-backed fleet assignment.

use super::error::RouteError;
use super::event::{Event, EventId, EventKind};
use super::plan::{RoutePlan, Stop, VehicleRoute};
use crate::model::{DistanceOracle, Task, Vehicle};
use fxhash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Slack allowed when comparing accumulated loads against capacity.
const CAPACITY_EPSILON: f64 = 1e-9;

/// Selects the event a [`Solution::remove`] detaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget {
    /// A specific arena event.
    Event(EventId),
    /// The event of `kind` for task `task_id`, wherever it sits in the chain.
    Task { task_id: usize, kind: EventKind },
}

impl From<EventId> for EventTarget {
    fn from(id: EventId) -> Self {
        EventTarget::Event(id)
    }
}

/// A detached event together with the event that preceded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removed {
    pub event: EventId,
    /// `None` when the event was the chain head.
    pub predecessor: Option<EventId>,
}

/// Assignment of pickup and delivery events to every vehicle.
///
/// All events live in one arena; each vehicle owns a singly linked chain of
/// arena indices. Cloning copies the arena in bulk, so a clone never shares
/// an event with its source and ids stay valid across the copy.
///
/// Edits through [`insert_after`](Self::insert_after) and
/// [`remove`](Self::remove) leave the cached cost stale until
/// [`refresh_vehicle_cost`](Self::refresh_vehicle_cost) or
/// [`refresh_cost`](Self::refresh_cost) runs.
#[derive(Debug, Clone)]
pub struct Solution {
    vehicles: Arc<[Vehicle]>,
    arena: Vec<Event>,
    heads: Vec<Option<EventId>>,
    counts: Vec<usize>,
    route_costs: Vec<f64>,
    total_cost: f64,
}

/// Iterator over the event ids of one chain, head first.
pub struct RouteIter<'a> {
    arena: &'a [Event],
    cursor: Option<EventId>,
    remaining: usize,
}

impl Iterator for RouteIter<'_> {
    type Item = EventId;

    fn next(&mut self) -> Option<EventId> {
        let id = self.cursor?;
        // bounded so a corrupted chain cannot spin forever
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.cursor = self.arena[id.index()].next;
        Some(id)
    }
}

impl Solution {
    /// A solution in which every vehicle has an empty route.
    pub fn empty(vehicles: impl Into<Arc<[Vehicle]>>) -> Self {
        let vehicles = vehicles.into();
        let n = vehicles.len();
        Self {
            vehicles,
            arena: Vec::new(),
            heads: vec![None; n],
            counts: vec![0; n],
            route_costs: vec![0.0; n],
            total_cost: 0.0,
        }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Shared handle to the fleet, for building sibling solutions.
    pub fn shared_vehicles(&self) -> Arc<[Vehicle]> {
        Arc::clone(&self.vehicles)
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Cached total cost over all vehicles.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Cached cost of one vehicle's route.
    pub fn route_cost(&self, vehicle: usize) -> f64 {
        self.route_costs[vehicle]
    }

    /// Number of events linked in `vehicle`'s chain.
    pub fn event_count(&self, vehicle: usize) -> usize {
        self.counts[vehicle]
    }

    /// Total number of linked events across the fleet.
    pub fn total_events(&self) -> usize {
        self.counts.iter().sum()
    }

    /// True iff some chain is long enough (four events) for an order swap.
    pub fn can_reorder(&self) -> bool {
        self.counts.iter().any(|&c| c >= 4)
    }

    pub fn head(&self, vehicle: usize) -> Option<EventId> {
        self.heads[vehicle]
    }

    /// Last event of `vehicle`'s chain.
    pub fn tail(&self, vehicle: usize) -> Option<EventId> {
        self.events(vehicle).last()
    }

    pub fn event(&self, id: EventId) -> &Event {
        &self.arena[id.index()]
    }

    /// Walks `vehicle`'s chain from its head.
    pub fn events(&self, vehicle: usize) -> RouteIter<'_> {
        RouteIter {
            arena: &self.arena,
            cursor: self.heads[vehicle],
            remaining: self.arena.len(),
        }
    }

    /// Allocates a detached event; link it with [`insert_after`](Self::insert_after).
    pub fn new_event(&mut self, task: Task, kind: EventKind) -> EventId {
        let id = EventId(self.arena.len() as u32);
        self.arena.push(Event::detached(task, kind));
        id
    }

    /// Event at 0-based `position` of `vehicle`'s chain.
    pub fn event_at(&self, vehicle: usize, position: usize) -> Result<EventId, RouteError> {
        self.check_vehicle(vehicle)?;
        let len = self.counts[vehicle];
        let not_found = RouteError::PositionOutOfRange {
            vehicle,
            position,
            len,
        };
        if position >= len {
            return Err(not_found);
        }
        self.events(vehicle).nth(position).ok_or(not_found)
    }

    /// Links the detached `event` right after `after`, or at the chain head
    /// when `after` is `None`.
    pub fn insert_after(
        &mut self,
        vehicle: usize,
        event: EventId,
        after: Option<EventId>,
    ) -> Result<(), RouteError> {
        self.check_vehicle(vehicle)?;
        let ev = &self.arena[event.index()];
        if let Some(owner) = ev.owner {
            return Err(RouteError::EventAlreadyLinked {
                task_id: ev.task().id,
                owner,
            });
        }
        if let Some(prev) = after {
            let p = &self.arena[prev.index()];
            if p.owner != Some(vehicle) {
                return Err(RouteError::EventNotInRoute {
                    vehicle,
                    task_id: p.task().id,
                    kind: p.kind(),
                });
            }
        }
        self.link_after(vehicle, event, after);
        Ok(())
    }

    /// Appends the detached `event` at the end of `vehicle`'s chain.
    pub fn append(&mut self, vehicle: usize, event: EventId) -> Result<(), RouteError> {
        self.check_vehicle(vehicle)?;
        let tail = self.tail(vehicle);
        self.insert_after(vehicle, event, tail)
    }

    /// Detaches the targeted event from `vehicle`'s chain, relinking its
    /// neighbours.
    ///
    /// Fails with [`RouteError::EventNotInRoute`] if the chain holds no
    /// matching event.
    pub fn remove(
        &mut self,
        vehicle: usize,
        target: impl Into<EventTarget>,
    ) -> Result<Removed, RouteError> {
        self.check_vehicle(vehicle)?;
        let target = target.into();
        let mut predecessor: Option<EventId> = None;
        let found = self.events(vehicle).find(|&id| {
            let hit = match target {
                EventTarget::Event(wanted) => wanted == id,
                EventTarget::Task { task_id, kind } => self.arena[id.index()].matches(task_id, kind),
            };
            if !hit {
                predecessor = Some(id);
            }
            hit
        });

        let Some(id) = found else {
            return Err(self.missing(vehicle, target));
        };

        let next = self.arena[id.index()].next;
        match predecessor {
            None => self.heads[vehicle] = next,
            Some(p) => self.arena[p.index()].next = next,
        }
        let ev = &mut self.arena[id.index()];
        ev.next = None;
        ev.owner = None;
        self.counts[vehicle] -= 1;

        Ok(Removed {
            event: id,
            predecessor,
        })
    }

    /// Exchanges the events at positions `i` and `j` of one chain, leaving
    /// every other event in place.
    pub fn swap_positions(&mut self, vehicle: usize, i: usize, j: usize) -> Result<(), RouteError> {
        if i == j {
            return Ok(());
        }
        let first = self.event_at(vehicle, i)?;
        let second = self.event_at(vehicle, j)?;

        let mut anchor = Some(second);
        if self.arena[first.index()].next != Some(second) {
            anchor = self.remove(vehicle, second)?.predecessor;
            self.insert_after(vehicle, second, Some(first))?;
        }
        self.remove(vehicle, first)?;
        self.insert_after(vehicle, first, anchor)
    }

    /// Moves the task owning the event at `position` of `from` to the end of
    /// `to`, pickup immediately followed by delivery.
    pub fn transfer_task(&mut self, from: usize, position: usize, to: usize) -> Result<(), RouteError> {
        self.check_vehicle(to)?;
        let picked = self.event_at(from, position)?;
        let (task_id, kind) = {
            let ev = &self.arena[picked.index()];
            (ev.task().id, ev.kind())
        };

        self.remove(from, picked)?;
        let other = self
            .remove(
                from,
                EventTarget::Task {
                    task_id,
                    kind: kind.counterpart(),
                },
            )?
            .event;

        let (pickup, delivery) = match kind {
            EventKind::Pickup => (picked, other),
            EventKind::Delivery => (other, picked),
        };
        self.append(to, pickup)?;
        self.insert_after(to, delivery, Some(pickup))
    }

    /// Full structural cost of one route, ignoring caches.
    pub fn compute_route_cost<D>(&self, vehicle: usize, oracle: &D) -> f64
    where
        D: DistanceOracle + ?Sized,
    {
        let v = &self.vehicles[vehicle];
        let mut city = v.current_city;
        let mut cost = 0.0;
        for id in self.events(vehicle) {
            let next = self.arena[id.index()].city();
            cost += oracle.distance(city, next) * v.cost_per_distance;
            city = next;
        }
        cost
    }

    /// Full structural cost of the whole solution, ignoring caches.
    pub fn recompute_cost<D>(&self, oracle: &D) -> f64
    where
        D: DistanceOracle + ?Sized,
    {
        (0..self.vehicle_count())
            .map(|v| self.compute_route_cost(v, oracle))
            .sum()
    }

    /// Recomputes one route's cached cost and the total.
    pub fn refresh_vehicle_cost<D>(&mut self, vehicle: usize, oracle: &D)
    where
        D: DistanceOracle + ?Sized,
    {
        self.route_costs[vehicle] = self.compute_route_cost(vehicle, oracle);
        self.sum_route_costs();
    }

    /// Recomputes every cached cost.
    pub fn refresh_cost<D>(&mut self, oracle: &D)
    where
        D: DistanceOracle + ?Sized,
    {
        for v in 0..self.vehicle_count() {
            self.route_costs[v] = self.compute_route_cost(v, oracle);
        }
        self.sum_route_costs();
    }

    /// Checks chain structure and capacity: counts, acyclicity, event
    /// uniqueness, pickup-before-delivery within one chain and load limits.
    ///
    /// Costs are not checked.
    pub fn validate(&self) -> Result<(), RouteError> {
        let mut visited = vec![false; self.arena.len()];
        // task id -> (vehicle, delivered)
        let mut open: FxHashMap<usize, (usize, bool)> = FxHashMap::default();

        for (vehicle, v) in self.vehicles.iter().enumerate() {
            let mut cursor = self.heads[vehicle];
            let mut actual = 0usize;
            let mut load = 0.0;

            while let Some(id) = cursor {
                let seen = &mut visited[id.index()];
                if *seen {
                    return Err(RouteError::CycleOrShared { vehicle });
                }
                *seen = true;
                let ev = &self.arena[id.index()];
                if ev.owner != Some(vehicle) {
                    return Err(RouteError::CycleOrShared { vehicle });
                }
                let task_id = ev.task().id;

                match ev.kind() {
                    EventKind::Pickup => {
                        if open.insert(task_id, (vehicle, false)).is_some() {
                            return Err(RouteError::DuplicateEvent {
                                task_id,
                                kind: EventKind::Pickup,
                            });
                        }
                    }
                    EventKind::Delivery => match open.get_mut(&task_id) {
                        None => {
                            return Err(RouteError::DeliveryBeforePickup { vehicle, task_id });
                        }
                        Some((owner, _)) if *owner != vehicle => {
                            return Err(RouteError::SplitTask {
                                task_id,
                                pickup_vehicle: *owner,
                                delivery_vehicle: vehicle,
                            });
                        }
                        Some((_, delivered)) if *delivered => {
                            return Err(RouteError::DuplicateEvent {
                                task_id,
                                kind: EventKind::Delivery,
                            });
                        }
                        Some((_, delivered)) => *delivered = true,
                    },
                }

                load += ev.load_delta();
                if load > v.capacity + CAPACITY_EPSILON {
                    return Err(RouteError::CapacityExceeded {
                        vehicle,
                        task_id,
                        load,
                        capacity: v.capacity,
                    });
                }

                actual += 1;
                cursor = ev.next;
            }

            if actual != self.counts[vehicle] {
                return Err(RouteError::CountMismatch {
                    vehicle,
                    recorded: self.counts[vehicle],
                    actual,
                });
            }
        }

        if let Some((&task_id, &(vehicle, _))) = open.iter().find(|(_, (_, delivered))| !delivered) {
            return Err(RouteError::MissingCounterpart { vehicle, task_id });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Ids of the tasks that have a pickup linked somewhere.
    pub fn task_ids(&self) -> FxHashSet<usize> {
        (0..self.vehicle_count())
            .flat_map(|v| self.events(v))
            .map(|id| &self.arena[id.index()])
            .filter(|ev| ev.is_pickup())
            .map(|ev| ev.task().id)
            .collect()
    }

    /// Checks that the linked tasks are exactly `tasks`.
    pub fn check_covers(&self, tasks: &[Task]) -> Result<(), RouteError> {
        let covered = self.task_ids();
        let expected: FxHashSet<usize> = tasks.iter().map(|t| t.id).collect();
        if covered == expected {
            Ok(())
        } else {
            Err(RouteError::TaskSetMismatch {
                covered: covered.len(),
                expected: expected.len(),
            })
        }
    }

    pub fn covers(&self, tasks: &[Task]) -> bool {
        self.check_covers(tasks).is_ok()
    }

    /// A copy keeping only events whose task is in `tasks`, in their
    /// original relative order, with costs recomputed.
    pub fn filtered_to<D>(&self, tasks: &[Task], oracle: &D) -> Solution
    where
        D: DistanceOracle + ?Sized,
    {
        let keep: FxHashSet<usize> = tasks.iter().map(|t| t.id).collect();
        let mut out = Solution::empty(self.shared_vehicles());
        for vehicle in 0..self.vehicle_count() {
            let mut tail = None;
            for id in self.events(vehicle) {
                let ev = &self.arena[id.index()];
                if keep.contains(&ev.task().id) {
                    let copy = out.new_event(*ev.task(), ev.kind());
                    out.link_after(vehicle, copy, tail);
                    tail = Some(copy);
                }
            }
        }
        out.refresh_cost(oracle);
        out
    }

    /// A copy with `task` added at the head of `vehicle`'s chain, pickup
    /// first. Used to extend a previous plan into a warm-start seed.
    pub fn with_task<D>(&self, vehicle: usize, task: Task, oracle: &D) -> Result<Solution, RouteError>
    where
        D: DistanceOracle + ?Sized,
    {
        self.check_vehicle(vehicle)?;
        let mut out = self.clone();
        let delivery = out.new_event(task, EventKind::Delivery);
        let pickup = out.new_event(task, EventKind::Pickup);
        out.insert_after(vehicle, delivery, None)?;
        out.insert_after(vehicle, pickup, None)?;
        out.refresh_vehicle_cost(vehicle, oracle);
        Ok(out)
    }

    /// Per-vehicle ordered stops, the walkable form of the assignment.
    pub fn plan(&self) -> RoutePlan {
        let routes = self
            .vehicles
            .iter()
            .enumerate()
            .map(|(i, v)| VehicleRoute {
                vehicle_id: v.id,
                start: v.current_city,
                stops: self
                    .events(i)
                    .map(|id| {
                        let ev = &self.arena[id.index()];
                        Stop {
                            task_id: ev.task().id,
                            kind: ev.kind(),
                            city: ev.city(),
                        }
                    })
                    .collect(),
                cost: self.route_costs[i],
            })
            .collect();
        RoutePlan {
            routes,
            total_cost: self.total_cost,
        }
    }

    pub(crate) fn set_route_cost(&mut self, vehicle: usize, cost: f64) {
        self.route_costs[vehicle] = cost;
        self.sum_route_costs();
    }

    /// Unchecked link; callers guarantee `event` is detached and `after`
    /// belongs to `vehicle`.
    pub(crate) fn link_after(&mut self, vehicle: usize, event: EventId, after: Option<EventId>) {
        let next = match after {
            None => self.heads[vehicle].replace(event),
            Some(prev) => self.arena[prev.index()].next.replace(event),
        };
        let ev = &mut self.arena[event.index()];
        ev.next = next;
        ev.owner = Some(vehicle);
        self.counts[vehicle] += 1;
    }

    fn sum_route_costs(&mut self) {
        self.total_cost = self.route_costs.iter().sum();
    }

    fn check_vehicle(&self, vehicle: usize) -> Result<(), RouteError> {
        if vehicle < self.vehicles.len() {
            Ok(())
        } else {
            Err(RouteError::VehicleOutOfRange {
                vehicle,
                fleet: self.vehicles.len(),
            })
        }
    }

    fn missing(&self, vehicle: usize, target: EventTarget) -> RouteError {
        let (task_id, kind) = match target {
            EventTarget::Event(id) => {
                let ev = &self.arena[id.index()];
                (ev.task().id, ev.kind())
            }
            EventTarget::Task { task_id, kind } => (task_id, kind),
        };
        RouteError::EventNotInRoute {
            vehicle,
            task_id,
            kind,
        }
    }
}
