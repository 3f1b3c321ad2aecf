//! Genetic Algorithm for the Euclidean TSP.
//!
//! Each individual is a [`Tour`](crate::Tour): a permutation of point
//! indices with its cycle length cached. Every generation is rebuilt from
//! scratch by pairing tournament winners, producing two order-crossover
//! children per pair, and applying inversion mutation. A best-ever record is
//! kept outside the population.
//!
//! # Key Types
//!
//! - [`TspGaConfig`]: Algorithm parameters (population size, rates, stopping rule)
//! - [`TspGaRunner`]: Executes the evolutionary loop
//! - [`TspGaResult`]: Best tour, best distance, per-generation history
//! - [`StagnationTracker`]: The repeat-count stopping rule
//!
//! # Submodules
//!
//! - [`operators`]: Order crossover (OX) and inversion mutation
//! - [`population`]: Random seeding of generation 0
//! - [`selection`]: Tournament selection without replacement
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Larrañaga et al. (1999), "Genetic Algorithms for the Travelling Salesman
//!   Problem: A Review of Representations and Operators"

mod config;
pub mod operators;
pub mod population;
mod runner;
pub mod selection;

pub use config::TspGaConfig;
pub use runner::{EvolutionState, StagnationTracker, Termination, TspGaResult, TspGaRunner};
