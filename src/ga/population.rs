//! Population seeding.

use crate::error::Result;
use crate::geometry::Point;
use crate::tour::Tour;
use rand::seq::SliceRandom;
use rand::Rng;

/// A uniformly random visiting order over `0..n` (Fisher–Yates).
pub fn random_order<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    order
}

/// Creates `population_size` independent random tours over `points`.
///
/// The caller validates `population_size` (even, at least 2); this
/// function only builds and evaluates the tours.
pub fn initialize<R: Rng>(
    points: &[Point],
    population_size: usize,
    rng: &mut R,
) -> Result<Vec<Tour>> {
    (0..population_size)
        .map(|_| Tour::new(random_order(points.len(), rng), points))
        .collect()
}
