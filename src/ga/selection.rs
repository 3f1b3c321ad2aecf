//! Tournament selection.
//!
//! Draws `k` distinct contestants uniformly at random, without replacement,
//! and returns the one with the shortest tour. Higher `k` means stronger
//! selection pressure:
//! - k=2: light pressure (good for diversity)
//! - k=3-5: moderate pressure (typical default)
//! - k=population size: always the generation's best
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use crate::error::{Result, TspGaError};
use crate::tour::Tour;
use rand::seq::index;
use rand::Rng;

/// Returns the index of the tournament winner in `population`.
///
/// Fitness is read from each tour's cached distance, so repeated
/// tournaments never re-evaluate. Ties go to the contestant drawn first.
///
/// # Errors
/// [`TspGaError::InvalidInput`] if `k` is 0 or exceeds the population size.
///
/// # Complexity
/// O(k) per selection
pub fn tournament<R: Rng>(population: &[Tour], k: usize, rng: &mut R) -> Result<usize> {
    let n = population.len();
    if k == 0 || k > n {
        return Err(TspGaError::invalid_input(format!(
            "tournament size {k} must be within 1..={n}"
        )));
    }

    let mut contestants = index::sample(rng, n, k).into_iter();
    let mut best_idx = contestants
        .next()
        .ok_or_else(|| TspGaError::invalid_input("empty tournament"))?;
    for idx in contestants {
        if population[idx].distance() < population[best_idx].distance() {
            best_idx = idx;
        }
    }
    Ok(best_idx)
}
