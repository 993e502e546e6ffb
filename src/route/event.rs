//! Route events: the nodes of a vehicle's chain.

use crate::model::{CityId, Task};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether an event collects or drops its task's load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventKind {
    Pickup,
    Delivery,
}

impl EventKind {
    /// The other half of a task's event pair.
    pub fn counterpart(self) -> Self {
        match self {
            EventKind::Pickup => EventKind::Delivery,
            EventKind::Delivery => EventKind::Pickup,
        }
    }
}

/// Index of an event in its solution's arena.
///
/// Ids are only meaningful for the solution that issued them and for its
/// clones, which share the same arena layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub(crate) u32);

impl EventId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One pickup or delivery of a task.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    task: Task,
    kind: EventKind,
    pub(crate) next: Option<EventId>,
    /// Vehicle whose chain currently links this event; `None` while detached.
    pub(crate) owner: Option<usize>,
}

impl Event {
    pub(crate) fn detached(task: Task, kind: EventKind) -> Self {
        Self {
            task,
            kind,
            next: None,
            owner: None,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn is_pickup(&self) -> bool {
        self.kind == EventKind::Pickup
    }

    /// Successor in the chain, `None` at the chain end.
    pub fn next(&self) -> Option<EventId> {
        self.next
    }

    /// City where the event takes place.
    pub fn city(&self) -> CityId {
        match self.kind {
            EventKind::Pickup => self.task.pickup,
            EventKind::Delivery => self.task.delivery,
        }
    }

    /// Change in carried load caused by this event.
    pub fn load_delta(&self) -> f64 {
        match self.kind {
            EventKind::Pickup => self.task.weight,
            EventKind::Delivery => -self.task.weight,
        }
    }

    pub(crate) fn matches(&self, task_id: usize, kind: EventKind) -> bool {
        self.task.id == task_id && self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_and_delta_follow_kind() {
        let task = Task::new(3, CityId(1), CityId(2), 12.5);
        let p = Event::detached(task, EventKind::Pickup);
        let d = Event::detached(task, EventKind::Delivery);
        assert_eq!(p.city(), CityId(1));
        assert_eq!(d.city(), CityId(2));
        assert_eq!(p.load_delta() + d.load_delta(), 0.0);
        assert!(p.matches(3, EventKind::Pickup));
        assert!(!d.matches(3, EventKind::Pickup));
    }

    #[test]
    fn test_counterpart() {
        assert_eq!(EventKind::Pickup.counterpart(), EventKind::Delivery);
        assert_eq!(EventKind::Delivery.counterpart(), EventKind::Pickup);
    }
}
