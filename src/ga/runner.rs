//! GA evolutionary loop execution.
//!
//! [`TspGaRunner`] orchestrates the complete evolutionary process:
//! initialization → selection → crossover → mutation → evaluation → repeat,
//! until the stagnation rule or the generation cap ends the run.

use super::config::TspGaConfig;
use super::operators::{invert_mutation, order_crossover};
use super::population::initialize;
use super::selection::tournament;
use crate::error::{Result, TspGaError};
use crate::geometry::{all_coincident, Point};
use crate::tour::Tour;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// The generation minimum repeated for `stagnation_limit` generations.
    Stagnation,
    /// `max_generations` generations were executed.
    MaxGenerations,
    /// The cancellation flag was raised.
    Cancelled,
}

/// Phase of the stopping policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionState {
    /// The last generation's minimum differed from the one before it.
    Running,
    /// The minimum has repeated at least once, but fewer than `limit` times.
    Stagnant,
    /// The repeat count reached the limit.
    Terminated,
}

/// Counts consecutive generations whose minimum distance is identical.
///
/// Equality is exact on the `f64` value. Any change, better or worse,
/// resets the count.
#[derive(Debug, Clone)]
pub struct StagnationTracker {
    limit: usize,
    previous_min: f64,
    repeats: usize,
}

impl StagnationTracker {
    /// Starts tracking from the minimum of the seed population.
    ///
    /// A `limit` of 0 never terminates.
    pub fn new(limit: usize, initial_min: f64) -> Self {
        Self {
            limit,
            previous_min: initial_min,
            repeats: 0,
        }
    }

    /// Records the minimum of a new generation and returns the resulting state.
    pub fn observe(&mut self, generation_min: f64) -> EvolutionState {
        if generation_min == self.previous_min {
            self.repeats += 1;
        } else {
            self.repeats = 0;
        }
        self.previous_min = generation_min;
        self.state()
    }

    /// Current repeat count.
    pub fn repeats(&self) -> usize {
        self.repeats
    }

    pub fn state(&self) -> EvolutionState {
        if self.limit > 0 && self.repeats >= self.limit {
            EvolutionState::Terminated
        } else if self.repeats > 0 {
            EvolutionState::Stagnant
        } else {
            EvolutionState::Running
        }
    }
}

/// Result of a GA run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TspGaResult {
    /// Best visiting order found during the entire run.
    pub best_tour: Vec<usize>,

    /// Cycle length of `best_tour`.
    pub best_distance: f64,

    /// Best-ever distance after each executed generation (non-increasing).
    pub history: Vec<f64>,

    /// Number of generations executed; equals `history.len()`.
    pub generations: usize,

    /// Why the run stopped.
    pub termination: Termination,

    /// Seed the run RNG was created from.
    pub seed: u64,
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```
/// use u_tsp_ga::ga::{TspGaConfig, TspGaRunner};
/// use u_tsp_ga::Point;
///
/// let points = [
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 0.0),
///     Point::new(1.0, 1.0),
///     Point::new(0.0, 1.0),
/// ];
/// let config = TspGaConfig::default()
///     .with_population_size(20)
///     .with_max_generations(200)
///     .with_mutation_rate(0.1)
///     .with_seed(42);
/// let result = TspGaRunner::run(&points, &config).unwrap();
/// assert!((result.best_distance - 4.0).abs() < 1e-9);
/// ```
pub struct TspGaRunner;

impl TspGaRunner {
    /// Runs the GA optimization.
    pub fn run(points: &[Point], config: &TspGaConfig) -> Result<TspGaResult> {
        Self::run_with_cancel(points, config, None, |_, _| {})
    }

    /// Runs the GA, calling `on_generation(generation, best_distance)` once
    /// per generation. Generations are numbered from 1.
    pub fn run_with_progress<F>(
        points: &[Point],
        config: &TspGaConfig,
        on_generation: F,
    ) -> Result<TspGaResult>
    where
        F: FnMut(usize, f64),
    {
        Self::run_with_cancel(points, config, None, on_generation)
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the GA stops at
    /// the next generation boundary and returns the best tour found so far.
    ///
    /// # Errors
    /// [`TspGaError::InvalidConfiguration`] before any generation runs if the
    /// configuration or the points are unusable.
    /// [`TspGaError::InvariantViolation`] if an operator produced a tour that
    /// is not a permutation.
    pub fn run_with_cancel<F>(
        points: &[Point],
        config: &TspGaConfig,
        cancel: Option<Arc<AtomicBool>>,
        mut on_generation: F,
    ) -> Result<TspGaResult>
    where
        F: FnMut(usize, f64),
    {
        config.validate(points.len())?;
        if let Some(idx) = points.iter().position(|p| !p.is_finite()) {
            return Err(TspGaError::invalid_configuration(format!(
                "point {idx} has a non-finite coordinate: {:?}",
                points[idx]
            )));
        }
        if all_coincident(points) {
            warn!(
                "all {} points coincide; every tour has length 0",
                points.len()
            );
        }

        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        let mut rng = StdRng::seed_from_u64(seed);
        info!(
            "starting GA: points={}, population={}, max_generations={}, seed={}",
            points.len(),
            config.population_size,
            config.max_generations,
            seed
        );

        // 1. Initialize and score generation 0
        let mut population = initialize(points, config.population_size, &mut rng)?;
        let mut best = find_best(&population)?.clone();
        let mut tracker = StagnationTracker::new(config.stagnation_limit, best.distance());

        let mut history = Vec::with_capacity(config.max_generations.min(4096));
        let mut termination = Termination::MaxGenerations;

        // 2. Evolutionary loop
        for generation in 1..=config.max_generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    termination = Termination::Cancelled;
                    break;
                }
            }

            population = next_generation(points, &population, config, &mut rng)
                .map_err(into_defect)?;

            let generation_best = find_best(&population)?;
            let state = tracker.observe(generation_best.distance());

            if generation_best.distance() < best.distance() {
                best = generation_best.clone();
                debug!(
                    "generation {generation}: new best distance {}",
                    best.distance()
                );
            }

            history.push(best.distance());
            on_generation(generation, best.distance());

            if is_progress_generation(generation, config.log_interval) {
                info!(
                    "generation {generation}: best distance = {}",
                    best.distance()
                );
            }

            if state == EvolutionState::Terminated {
                termination = Termination::Stagnation;
                break;
            }
        }

        info!(
            "GA finished after {} generations ({:?}): best distance = {}",
            history.len(),
            termination,
            best.distance()
        );

        Ok(TspGaResult {
            best_distance: best.distance(),
            best_tour: best.into_order(),
            generations: history.len(),
            history,
            termination,
            seed,
        })
    }
}

/// Builds the next generation wholesale.
///
/// Each parent pair gets its own RNG seeded from `rng`, so the serial and
/// parallel paths produce the same children for the same run seed.
fn next_generation<R: Rng>(
    points: &[Point],
    population: &[Tour],
    config: &TspGaConfig,
    rng: &mut R,
) -> Result<Vec<Tour>> {
    let pair_seeds: Vec<u64> = (0..config.population_size / 2)
        .map(|_| rng.random())
        .collect();

    let breed = |seed: &u64| {
        let mut pair_rng = StdRng::seed_from_u64(*seed);
        breed_pair(points, population, config, &mut pair_rng)
    };

    #[cfg(feature = "parallel")]
    let pairs: Result<Vec<[Tour; 2]>> = if config.parallel {
        pair_seeds.par_iter().map(breed).collect()
    } else {
        pair_seeds.iter().map(breed).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let pairs: Result<Vec<[Tour; 2]>> = pair_seeds.iter().map(breed).collect();

    Ok(pairs?.into_iter().flatten().collect())
}

/// Selects two parents and produces both OX children, mutated.
fn breed_pair<R: Rng>(
    points: &[Point],
    population: &[Tour],
    config: &TspGaConfig,
    rng: &mut R,
) -> Result<[Tour; 2]> {
    let parent1 = &population[tournament(population, config.tournament_size, rng)?];
    let parent2 = &population[tournament(population, config.tournament_size, rng)?];

    let child1 = order_crossover(parent1.order(), parent2.order(), rng)?;
    let child2 = order_crossover(parent2.order(), parent1.order(), rng)?;

    let child1 = invert_mutation(child1, config.mutation_rate, rng);
    let child2 = invert_mutation(child2, config.mutation_rate, rng);

    Ok([Tour::new(child1, points)?, Tour::new(child2, points)?])
}

/// Find the tour with the shortest distance; ties go to the earliest.
fn find_best(population: &[Tour]) -> Result<&Tour> {
    population
        .iter()
        .min_by(|a, b| {
            a.distance()
                .partial_cmp(&b.distance())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .ok_or_else(|| TspGaError::invariant_violation("population is empty"))
}

/// Progress is logged on generations 1, 1 + interval, 1 + 2 * interval, ...
fn is_progress_generation(generation: usize, interval: usize) -> bool {
    (generation - 1) % interval == 0
}

/// Operator input errors cannot occur after validation; if one does, it is a defect.
fn into_defect(err: TspGaError) -> TspGaError {
    match err {
        TspGaError::InvalidInput(msg) => TspGaError::InvariantViolation(msg),
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::distance;
    use crate::tour::{is_permutation, tour_length};

    fn unit_square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]
    }

    fn circle(n: usize, radius: f64) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / n as f64;
                Point::new(radius * a.cos() + radius, radius * a.sin() + radius)
            })
            .collect()
    }

    fn scattered(n: usize) -> Vec<Point> {
        // Deterministic pseudo-random layout in [0, 100)^2.
        (0..n)
            .map(|i| {
                let x = (i as f64 * 37.0 + 11.0) % 100.0;
                let y = (i as f64 * 61.0 + 29.0) % 100.0;
                Point::new(x, y)
            })
            .collect()
    }

    // ---- End-to-end ----

    #[test]
    fn test_unit_square_converges_to_perimeter() {
        let points = unit_square();
        let config = TspGaConfig::default()
            .with_population_size(20)
            .with_max_generations(200)
            .with_mutation_rate(0.1)
            .with_seed(42);

        let result = TspGaRunner::run(&points, &config).unwrap();

        assert!(
            (result.best_distance - 4.0).abs() < 1e-9,
            "expected perimeter 4.0, got {}",
            result.best_distance
        );
        assert!(is_permutation(&result.best_tour, 4));
    }

    #[test]
    fn test_circle_near_optimal() {
        let points = circle(10, 50.0);
        let optimal = 10.0 * 2.0 * 50.0 * (std::f64::consts::PI / 10.0).sin();
        let config = TspGaConfig::default().with_seed(42);

        let result = TspGaRunner::run(&points, &config).unwrap();

        assert!(
            result.best_distance <= optimal * 1.15,
            "expected near {optimal}, got {}",
            result.best_distance
        );
    }

    #[test]
    fn test_best_distance_matches_best_tour() {
        let points = scattered(15);
        let config = TspGaConfig::default()
            .with_population_size(40)
            .with_max_generations(100)
            .with_seed(7);

        let result = TspGaRunner::run(&points, &config).unwrap();

        assert!(is_permutation(&result.best_tour, 15));
        assert_eq!(result.best_distance, tour_length(&result.best_tour, &points));
        assert_eq!(result.history.last().copied(), Some(result.best_distance));
    }

    #[test]
    fn test_history_non_increasing() {
        let points = scattered(12);
        let config = TspGaConfig::default()
            .with_population_size(30)
            .with_max_generations(150)
            .with_mutation_rate(0.2)
            .with_seed(3);

        let result = TspGaRunner::run(&points, &config).unwrap();

        assert_eq!(result.history.len(), result.generations);
        for window in result.history.windows(2) {
            assert!(
                window[1] <= window[0],
                "history must be non-increasing: {} > {}",
                window[1],
                window[0]
            );
        }
    }

    #[test]
    fn test_determinism_per_seed() {
        let points = scattered(20);
        let config = TspGaConfig::default()
            .with_population_size(30)
            .with_max_generations(80)
            .with_seed(2024);

        let a = TspGaRunner::run(&points, &config).unwrap();
        let b = TspGaRunner::run(&points, &config).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.seed, 2024);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_serial() {
        let points = scattered(20);
        let config = TspGaConfig::default()
            .with_population_size(40)
            .with_max_generations(60)
            .with_seed(11);

        let serial =
            TspGaRunner::run(&points, &config.clone().with_parallel(false)).unwrap();
        let parallel = TspGaRunner::run(&points, &config.with_parallel(true)).unwrap();

        assert_eq!(serial, parallel);
    }

    // ---- Degenerate inputs ----

    #[test]
    fn test_two_points_out_and_back() {
        let points = vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)];
        let config = TspGaConfig::default()
            .with_population_size(4)
            .with_max_generations(100)
            .with_stagnation_limit(10)
            .with_seed(1);

        let result = TspGaRunner::run(&points, &config).unwrap();

        let expected = 2.0 * distance(points[0], points[1]);
        assert_eq!(result.best_distance, expected);
        // Both orders have the same length, so the minimum never changes.
        assert_eq!(result.termination, Termination::Stagnation);
        assert_eq!(result.generations, 10);
    }

    #[test]
    fn test_coincident_points_stop_on_stagnation() {
        let points = vec![Point::new(5.0, 5.0); 6];
        let config = TspGaConfig::default()
            .with_population_size(10)
            .with_max_generations(1000)
            .with_stagnation_limit(25)
            .with_seed(9);

        let result = TspGaRunner::run(&points, &config).unwrap();

        assert_eq!(result.best_distance, 0.0);
        assert_eq!(result.termination, Termination::Stagnation);
        assert_eq!(result.generations, 25);
        assert!(result.history.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_full_tournament_runs() {
        let points = scattered(8);
        let config = TspGaConfig::default()
            .with_population_size(6)
            .with_tournament_size(6)
            .with_max_generations(50)
            .with_seed(5);

        let result = TspGaRunner::run(&points, &config).unwrap();
        assert!(is_permutation(&result.best_tour, 8));
    }

    // ---- Stopping policy ----

    #[test]
    fn test_max_generations_when_stagnation_disabled() {
        let points = vec![Point::new(1.0, 1.0); 4];
        let config = TspGaConfig::default()
            .with_population_size(8)
            .with_max_generations(40)
            .with_stagnation_limit(0)
            .with_seed(42);

        let result = TspGaRunner::run(&points, &config).unwrap();

        assert_eq!(result.termination, Termination::MaxGenerations);
        assert_eq!(result.generations, 40);
        assert_eq!(result.history.len(), 40);
    }

    #[test]
    fn test_tracker_terminates_at_g_plus_limit() {
        let limit = 4;
        let changing_until = 6;
        let mut tracker = StagnationTracker::new(limit, 100.0);

        let mut stopped_at = None;
        for generation in 1..=50 {
            let min = if generation <= changing_until {
                100.0 - generation as f64
            } else {
                100.0 - changing_until as f64
            };
            if tracker.observe(min) == EvolutionState::Terminated {
                stopped_at = Some(generation);
                break;
            }
        }

        assert_eq!(stopped_at, Some(changing_until + limit));
    }

    #[test]
    fn test_tracker_states_and_reset() {
        let mut tracker = StagnationTracker::new(3, 10.0);
        assert_eq!(tracker.state(), EvolutionState::Running);
        assert_eq!(tracker.observe(9.0), EvolutionState::Running);
        assert_eq!(tracker.observe(9.0), EvolutionState::Stagnant);
        assert_eq!(tracker.observe(9.0), EvolutionState::Stagnant);
        assert_eq!(tracker.repeats(), 2);
        // A worse minimum also breaks the streak.
        assert_eq!(tracker.observe(9.5), EvolutionState::Running);
        assert_eq!(tracker.repeats(), 0);
        tracker.observe(9.5);
        tracker.observe(9.5);
        assert_eq!(tracker.observe(9.5), EvolutionState::Terminated);
    }

    #[test]
    fn test_tracker_limit_zero_never_terminates() {
        let mut tracker = StagnationTracker::new(0, 1.0);
        for _ in 0..1000 {
            assert_ne!(tracker.observe(1.0), EvolutionState::Terminated);
        }
    }

    // ---- Progress & cancellation ----

    #[test]
    fn test_progress_called_once_per_generation() {
        let points = scattered(10);
        let config = TspGaConfig::default()
            .with_population_size(20)
            .with_max_generations(30)
            .with_stagnation_limit(0)
            .with_seed(8);

        let mut calls = Vec::new();
        let result = TspGaRunner::run_with_progress(&points, &config, |generation, best| {
            calls.push((generation, best));
        })
        .unwrap();

        assert_eq!(calls.len(), 30);
        for (i, &(generation, best)) in calls.iter().enumerate() {
            assert_eq!(generation, i + 1);
            assert_eq!(best, result.history[i]);
        }
    }

    #[test]
    fn test_cancelled_before_first_generation() {
        let points = scattered(10);
        let config = TspGaConfig::default()
            .with_population_size(20)
            .with_seed(4);
        let cancel = Arc::new(AtomicBool::new(true));

        let result =
            TspGaRunner::run_with_cancel(&points, &config, Some(cancel), |_, _| {}).unwrap();

        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.generations, 0);
        assert!(result.history.is_empty());
        assert!(is_permutation(&result.best_tour, 10));
        assert_eq!(result.best_distance, tour_length(&result.best_tour, &points));
    }

    #[test]
    fn test_cancellation_from_other_thread() {
        let points = scattered(30);
        let config = TspGaConfig::default()
            .with_population_size(50)
            .with_max_generations(1_000_000)
            .with_stagnation_limit(0)
            .with_seed(42);

        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_clone = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(10));
            cancel_clone.store(true, Ordering::Relaxed);
        });

        let result =
            TspGaRunner::run_with_cancel(&points, &config, Some(cancel), |_, _| {}).unwrap();

        assert_eq!(result.termination, Termination::Cancelled);
        assert!(result.generations < 1_000_000);
    }

    // ---- Configuration errors ----

    #[test]
    fn test_invalid_configurations_fail_before_running() {
        let points = scattered(10);
        let cases = [
            TspGaConfig::default().with_population_size(7),
            TspGaConfig::default().with_max_generations(0),
            TspGaConfig::default()
                .with_population_size(4)
                .with_tournament_size(5),
        ];
        for config in cases {
            let mut called = false;
            let err = TspGaRunner::run_with_progress(&points, &config, |_, _| called = true)
                .unwrap_err();
            assert!(matches!(err, TspGaError::InvalidConfiguration(_)), "{err}");
            assert!(!called);
        }
    }

    #[test]
    fn test_too_few_points() {
        let err =
            TspGaRunner::run(&[Point::new(0.0, 0.0)], &TspGaConfig::default()).unwrap_err();
        assert!(matches!(err, TspGaError::InvalidConfiguration(_)));
        assert!(TspGaRunner::run(&[], &TspGaConfig::default()).is_err());
    }

    #[test]
    fn test_non_finite_point_rejected() {
        let points = vec![Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0)];
        let err = TspGaRunner::run(&points, &TspGaConfig::default()).unwrap_err();
        assert!(matches!(err, TspGaError::InvalidConfiguration(_)));
    }

    // ---- Internals ----

    #[test]
    fn test_next_generation_size_and_validity() {
        let points = scattered(9);
        let config = TspGaConfig::default()
            .with_population_size(12)
            .with_mutation_rate(1.0);
        let mut rng = StdRng::seed_from_u64(42);
        let population = initialize(&points, 12, &mut rng).unwrap();

        let next = next_generation(&points, &population, &config, &mut rng).unwrap();

        assert_eq!(next.len(), 12);
        for tour in &next {
            assert!(is_permutation(tour.order(), 9));
        }
    }

    #[test]
    fn test_find_best_first_on_ties() {
        let points = unit_square();
        let population = vec![
            Tour::new(vec![0, 2, 1, 3], &points).unwrap(),
            Tour::new(vec![0, 1, 2, 3], &points).unwrap(),
            Tour::new(vec![1, 2, 3, 0], &points).unwrap(),
        ];
        let best = find_best(&population).unwrap();
        assert_eq!(best.order(), &[0, 1, 2, 3]);
        assert!(find_best(&[]).is_err());
    }

    #[test]
    fn test_into_defect() {
        let err = into_defect(TspGaError::invalid_input("bad cut"));
        assert_eq!(err, TspGaError::InvariantViolation("bad cut".into()));
    }

    #[test]
    fn test_progress_logged_from_first_generation() {
        let logged: Vec<usize> = (1..=25).filter(|&g| is_progress_generation(g, 10)).collect();
        assert_eq!(logged, vec![1, 11, 21]);
        assert!((1..=5).all(|g| is_progress_generation(g, 1)));
    }

    #[test]
    fn test_best_never_above_any_generation_minimum() {
        let points = scattered(25);
        let config = TspGaConfig::default()
            .with_population_size(30)
            .with_mutation_rate(0.2);

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut population = initialize(&points, config.population_size, &mut rng).unwrap();
            let mut best = find_best(&population).unwrap().clone();

            for _ in 0..100 {
                population = next_generation(&points, &population, &config, &mut rng).unwrap();
                let generation_best = find_best(&population).unwrap();
                if generation_best.distance() < best.distance() {
                    best = generation_best.clone();
                }
                for tour in &population {
                    assert!(is_permutation(tour.order(), 25));
                    assert!(best.distance() <= tour.distance());
                }
            }
            assert_eq!(best.distance(), tour_length(best.order(), &points));
        }
    }

    #[test]
    fn test_unit_square_many_seeds() {
        let points = unit_square();
        for seed in 0..50 {
            let config = TspGaConfig::default()
                .with_population_size(20)
                .with_max_generations(200)
                .with_mutation_rate(0.1)
                .with_seed(seed);
            let result = TspGaRunner::run(&points, &config).unwrap();
            assert!(
                (result.best_distance - 4.0).abs() < 1e-9,
                "seed {seed}: got {}",
                result.best_distance
            );
        }
    }
}
