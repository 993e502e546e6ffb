//! Annealing loop.

use super::config::AnnealConfig;
use super::construction::construct_initial;
use super::error::SolverError;
use super::operators::{sample_neighbor, Neighbor};
use crate::model::{DistanceOracle, Task, Vehicle};
use crate::route::{RouteError, Solution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealResult {
    /// The best solution observed.
    pub best: Solution,

    /// Cost of the best solution.
    pub best_cost: f64,

    /// Cost of the starting solution.
    pub initial_cost: f64,

    /// Whether the run started from the caller's seed solution.
    pub seeded: bool,

    /// Iterations executed; always the configured budget.
    pub iterations: usize,

    /// Number of accepted pool winners (including improvements).
    pub accepted_moves: usize,

    /// Number of accepted pool winners cheaper than the current solution.
    pub improving_moves: usize,

    /// Operator attempts discarded as invalid.
    pub operator_retries: usize,

    /// Operator calls that returned the current solution unchanged.
    pub fallbacks: usize,

    /// Fallbacks caused by exhausting `max_retries`.
    pub exhausted: usize,

    /// Best cost sampled at regular intervals for history tracking.
    pub cost_history: Vec<f64>,
}

/// Simulated annealing over fleet assignments.
///
/// Each iteration samples `pool_size` neighbours of the current solution,
/// keeps the cheapest, and accepts it with probability
/// `exp(-delta / t)` where `t = iteration / iterations`. Since `t` grows
/// towards 1 over the run, worse moves become more acceptable late in the
/// run; improving or equal moves are always accepted.
///
/// # Concurrency
///
/// The annealer carries a round-robin counter that picks the vehicle for
/// greedy construction, so calls take `&mut self`. Share one instance
/// across threads only behind external synchronisation; independent
/// instances are fully independent.
#[derive(Debug, Clone, Default)]
pub struct Annealer {
    config: AnnealConfig,
    round_robin: usize,
    seed_solution: Option<Solution>,
}

impl Annealer {
    pub fn new(config: AnnealConfig) -> Self {
        Self {
            config,
            round_robin: 0,
            seed_solution: None,
        }
    }

    pub fn config(&self) -> &AnnealConfig {
        &self.config
    }

    pub fn set_iterations(&mut self, iterations: usize) {
        self.config.iterations = iterations;
    }

    /// Sets or clears the warm-start solution used by later calls.
    ///
    /// The seed is checked at each call against that call's fleet and task
    /// set; a seed that fails is ignored and greedy construction runs
    /// instead.
    pub fn set_seed_solution(&mut self, seed: Option<Solution>) {
        self.seed_solution = seed;
    }

    pub fn seed_solution(&self) -> Option<&Solution> {
        self.seed_solution.as_ref()
    }

    /// Vehicle index the next greedy construction will use.
    pub fn next_start_vehicle(&self) -> usize {
        self.round_robin
    }

    /// Starting solution for a run: the seed if it is valid for this
    /// instance, otherwise a greedy construction. The flag reports whether
    /// the seed was used.
    pub fn initial_solution<D>(
        &mut self,
        vehicles: Arc<[Vehicle]>,
        tasks: &[Task],
        oracle: &D,
    ) -> Result<(Solution, bool), SolverError>
    where
        D: DistanceOracle + ?Sized,
    {
        if let Some(seed) = &self.seed_solution {
            match check_seed(seed, &vehicles, tasks) {
                Ok(()) => {
                    let mut solution = seed.clone();
                    solution.refresh_cost(oracle);
                    return Ok((solution, true));
                }
                Err(reason) => debug!(%reason, "seed solution rejected"),
            }
        }

        if vehicles.is_empty() {
            return Err(SolverError::NoVehicles);
        }
        let start = self.round_robin;
        self.round_robin = (self.round_robin + 1) % vehicles.len();
        let solution = construct_initial(vehicles, tasks, oracle, start)?;
        Ok((solution, false))
    }

    /// Runs one annealing pass and returns the best solution observed.
    #[instrument(skip_all, fields(tasks = tasks.len(), iterations = self.config.iterations))]
    pub fn solve<D>(
        &mut self,
        vehicles: impl Into<Arc<[Vehicle]>>,
        tasks: &[Task],
        oracle: &D,
    ) -> Result<AnnealResult, SolverError>
    where
        D: DistanceOracle + ?Sized,
    {
        self.config.validate().map_err(SolverError::InvalidConfig)?;
        let config = self.config.clone();

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let (mut current, seeded) = self.initial_solution(vehicles.into(), tasks, oracle)?;
        let initial_cost = current.total_cost();
        let mut current_cost = initial_cost;
        let mut best = current.clone();
        let mut best_cost = current_cost;

        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;
        let mut operator_retries = 0usize;
        let mut fallbacks = 0usize;
        let mut exhausted = 0usize;

        let mut cost_history = vec![best_cost];
        let budget = config.iterations;

        for iteration in 1..=budget {
            let seeds: Vec<u64> = (0..config.pool_size).map(|_| rng.random()).collect();
            let pool = evaluate_pool(&current, oracle, &config, &seeds)?;

            operator_retries += pool.iter().map(|n| n.retries).sum::<usize>();
            fallbacks += pool.iter().filter(|n| n.fallback).count();
            exhausted += pool
                .iter()
                .filter(|n| n.fallback && n.retries >= config.max_retries)
                .count();

            // first-seen wins ties
            let Some(winner) = pool.into_iter().reduce(|kept, n| {
                if n.cost() < kept.cost() {
                    n
                } else {
                    kept
                }
            }) else {
                continue;
            };

            let delta = winner.cost() - current_cost;
            let t = iteration as f64 / budget as f64;
            let probability = if delta <= 0.0 {
                1.0
            } else {
                (-delta / t).exp()
            };

            if probability >= rng.random::<f64>() {
                if delta < 0.0 {
                    improving_moves += 1;
                }
                accepted_moves += 1;
                current = winner.solution;
                current_cost = current.total_cost();

                if current_cost < best_cost {
                    best = current.clone();
                    best_cost = current_cost;
                }
            }

            if iteration % config.history_interval == 0 {
                cost_history.push(best_cost);
            }
        }

        if cost_history
            .last()
            .is_none_or(|&last| (last - best_cost).abs() > 1e-15)
        {
            cost_history.push(best_cost);
        }

        if exhausted > 0 {
            warn!(
                exhausted,
                max_retries = config.max_retries,
                "operators hit the retry ceiling"
            );
        }
        info!(
            best_cost,
            initial_cost, accepted_moves, improving_moves, seeded, "annealing finished"
        );

        Ok(AnnealResult {
            best,
            best_cost,
            initial_cost,
            seeded,
            iterations: budget,
            accepted_moves,
            improving_moves,
            operator_retries,
            fallbacks,
            exhausted,
            cost_history,
        })
    }

    /// Runs `runs` independent passes and keeps the cheapest result.
    ///
    /// Each pass without a valid seed advances the round-robin counter, so
    /// consecutive passes start from different vehicles.
    pub fn solve_best_of<D>(
        &mut self,
        runs: usize,
        vehicles: impl Into<Arc<[Vehicle]>>,
        tasks: &[Task],
        oracle: &D,
    ) -> Result<AnnealResult, SolverError>
    where
        D: DistanceOracle + ?Sized,
    {
        let vehicles: Arc<[Vehicle]> = vehicles.into();
        let mut best = self.solve(Arc::clone(&vehicles), tasks, oracle)?;
        for _ in 1..runs {
            let result = self.solve(Arc::clone(&vehicles), tasks, oracle)?;
            if result.best_cost < best.best_cost {
                best = result;
            }
        }
        Ok(best)
    }
}

/// A seed must match the fleet, cover exactly the task set and be valid.
fn check_seed(seed: &Solution, vehicles: &[Vehicle], tasks: &[Task]) -> Result<(), String> {
    if seed.vehicles() != vehicles {
        return Err(format!(
            "seed plans for {} vehicles, instance has {}",
            seed.vehicle_count(),
            vehicles.len()
        ));
    }
    seed.validate().map_err(|e| e.to_string())?;
    seed.check_covers(tasks).map_err(|e| e.to_string())
}

/// Builds one candidate per seed from the current solution.
///
/// Candidates only read `current`, so they may be built in parallel; the
/// per-candidate RNG makes the outcome independent of evaluation order.
fn evaluate_pool<D>(
    current: &Solution,
    oracle: &D,
    config: &AnnealConfig,
    seeds: &[u64],
) -> Result<Vec<Neighbor>, RouteError>
where
    D: DistanceOracle + ?Sized,
{
    let sample = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        sample_neighbor(current, oracle, config.max_retries, &mut rng)
    };

    #[cfg(feature = "parallel")]
    {
        if config.parallel {
            return seeds.par_iter().map(|&s| sample(s)).collect();
        }
    }

    seeds.iter().map(|&s| sample(s)).collect()
}
