//! GA configuration.
//!
//! [`TspGaConfig`] holds all parameters that control the evolutionary loop.

use crate::error::{Result, TspGaError};

/// Configuration for the TSP genetic algorithm.
///
/// # Defaults
///
/// ```
/// use u_tsp_ga::ga::TspGaConfig;
///
/// let config = TspGaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.tournament_size, 3);
/// assert_eq!(config.stagnation_limit, 80);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_tsp_ga::ga::TspGaConfig;
///
/// let config = TspGaConfig::default()
///     .with_population_size(200)
///     .with_max_generations(1000)
///     .with_mutation_rate(0.1)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TspGaConfig {
    /// Number of tours in each generation.
    ///
    /// Must be even: children are produced two at a time.
    pub population_size: usize,

    /// Maximum number of generations before termination.
    pub max_generations: usize,

    /// Probability of applying inversion mutation to a child (0.0–1.0).
    pub mutation_rate: f64,

    /// Number of distinct contestants drawn per tournament.
    pub tournament_size: usize,

    /// Consecutive generations with an identical best distance before stopping.
    ///
    /// Set to 0 to disable stagnation-based termination.
    pub stagnation_limit: usize,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Whether to build children in parallel using rayon.
    ///
    /// Has no effect unless the `parallel` feature is enabled. Results are
    /// identical to the serial path for the same seed.
    pub parallel: bool,

    /// Progress is logged at `info` level every `log_interval` generations.
    pub log_interval: usize,
}

impl Default for TspGaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            mutation_rate: 0.05,
            tournament_size: 3,
            stagnation_limit: 80,
            seed: None,
            parallel: false,
            log_interval: 10,
        }
    }
}

impl TspGaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the mutation rate, clamped to `[0, 1]`.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel child production.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets how often progress is logged.
    pub fn with_log_interval(mut self, every: usize) -> Self {
        self.log_interval = every;
        self
    }

    /// Preset for small instances: small population, short patience.
    ///
    /// - Population: 50, Generations: 200, Stagnation limit: 40
    pub fn fast() -> Self {
        Self {
            population_size: 50,
            max_generations: 200,
            stagnation_limit: 40,
            ..Self::default()
        }
    }

    /// Preset matching the defaults.
    ///
    /// - Population: 100, Generations: 500, Stagnation limit: 80
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Preset for large instances: bigger population, longer patience.
    ///
    /// - Population: 200, Generations: 2000, Stagnation limit: 150
    pub fn quality() -> Self {
        Self {
            population_size: 200,
            max_generations: 2000,
            stagnation_limit: 150,
            ..Self::default()
        }
    }

    /// Picks a preset from the number of points.
    ///
    /// - `point_count < 20` → [`fast()`](Self::fast)
    /// - `20 ≤ point_count < 100` → [`balanced()`](Self::balanced)
    /// - `point_count ≥ 100` → [`quality()`](Self::quality)
    pub fn auto_select(point_count: usize) -> Self {
        if point_count < 20 {
            Self::fast()
        } else if point_count < 100 {
            Self::balanced()
        } else {
            Self::quality()
        }
    }

    /// Validates the configuration against an instance with `point_count` points.
    ///
    /// Every operator's random sampling needs are checked here, so a run
    /// that passes validation never fails on sampling mid-loop.
    pub fn validate(&self, point_count: usize) -> Result<()> {
        if point_count < 2 {
            return Err(TspGaError::invalid_configuration(format!(
                "at least 2 points are required, got {point_count}"
            )));
        }
        if self.population_size < 2 {
            return Err(TspGaError::invalid_configuration(
                "population_size must be at least 2",
            ));
        }
        if self.population_size % 2 != 0 {
            return Err(TspGaError::invalid_configuration(format!(
                "population_size must be even, got {}",
                self.population_size
            )));
        }
        if self.max_generations == 0 {
            return Err(TspGaError::invalid_configuration(
                "max_generations must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(TspGaError::invalid_configuration(format!(
                "mutation_rate must be within [0, 1], got {}",
                self.mutation_rate
            )));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(TspGaError::invalid_configuration(format!(
                "tournament_size must be within 1..={}, got {}",
                self.population_size, self.tournament_size
            )));
        }
        if self.log_interval == 0 {
            return Err(TspGaError::invalid_configuration(
                "log_interval must be at least 1",
            ));
        }
        Ok(())
    }
}
