//! Genetic-algorithm optimizer for cyclic tours over 2-D points.
//!
//! Given an ordered set of points, the engine searches for a short closed
//! tour (Traveling Salesman Problem) and returns the best tour, its length,
//! and the best-so-far length after every generation.
//!
//! - [`geometry`]: [`Point`] and Euclidean [`distance`](geometry::distance)
//! - [`tour`]: [`Tour`] and cycle-length evaluation
//! - [`ga`]: population, selection, crossover, mutation, and the evolution loop
//! - [`error`]: [`TspGaError`]
//!
//! # Example
//!
//! ```
//! use u_tsp_ga::{Point, TspGaConfig, TspGaRunner};
//!
//! let points: Vec<Point> = (0..8)
//!     .map(|i| {
//!         let a = std::f64::consts::TAU * i as f64 / 8.0;
//!         Point::new(a.cos(), a.sin())
//!     })
//!     .collect();
//!
//! let config = TspGaConfig::auto_select(points.len()).with_seed(42);
//! let result = TspGaRunner::run(&points, &config).unwrap();
//!
//! assert_eq!(result.best_tour.len(), 8);
//! assert_eq!(result.history.len(), result.generations);
//! ```
//!
//! The engine never installs a logger; it emits progress through the
//! [`log`] facade.

pub mod error;
pub mod ga;
pub mod geometry;
pub mod tour;

pub use error::{Result, TspGaError};
pub use ga::{Termination, TspGaConfig, TspGaResult, TspGaRunner};
pub use geometry::Point;
pub use tour::Tour;
