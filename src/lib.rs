//! Centralized pickup-and-delivery planning for a capacity-constrained fleet.
//!
//! Assigns every task's pickup and delivery to one vehicle and orders each
//! vehicle's stops to minimise total travel cost:
//!
//! - **Model**: tasks, vehicles and the distance oracle supplied by the
//!   environment.
//! - **Route**: the arena-backed [`Solution`](route::Solution) with one
//!   event chain per vehicle, validation, editing and pruning.
//! - **Anneal**: greedy construction plus simulated annealing over two
//!   neighbourhood operators.
//!
//! # Example
//!
//! ```
//! use u_fleetplan::anneal::{AnnealConfig, Annealer};
//! use u_fleetplan::model::{CityId, DistanceMatrix, Task, Vehicle};
//!
//! let distances = DistanceMatrix::euclidean(&[(0.0, 0.0), (3.0, 4.0), (6.0, 8.0)]);
//! let fleet = vec![Vehicle::new(0, 100.0, 1.0, CityId(0))];
//! let tasks = [
//!     Task::new(0, CityId(0), CityId(1), 30.0),
//!     Task::new(1, CityId(1), CityId(2), 40.0),
//! ];
//!
//! let mut annealer = Annealer::new(AnnealConfig::default().with_iterations(100).with_seed(1));
//! let result = annealer.solve(fleet, &tasks, &distances).unwrap();
//! assert!(result.best_cost <= 10.0 + 1e-9);
//! ```
//!
//! # Architecture
//!
//! The crate owns no topology and performs no I/O. Bidding heuristics,
//! path enumeration and translation of routes into concrete actions live
//! with the caller, which reads results through
//! [`Solution::plan`](route::Solution::plan) or by walking event chains.

pub mod anneal;
pub mod model;
pub mod route;
