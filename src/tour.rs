//! Tour representation and fitness evaluation.
//!
//! A tour is a permutation of point indices `0..n`, implicitly closed into a
//! cycle: the last stop connects back to the first. Its fitness is the total
//! cycle length, lower is better.

use crate::error::{Result, TspGaError};
use crate::geometry::{distance, Point};

/// Total length of the closed cycle visiting `points` in `order`.
///
/// Includes the wrap-around edge from the last stop back to the first.
/// Tours with fewer than two stops have length 0.
///
/// # Panics
/// Panics if `order` contains an index outside `points`.
pub fn tour_length(order: &[usize], points: &[Point]) -> f64 {
    let n = order.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| distance(points[order[i]], points[order[(i + 1) % n]]))
        .sum()
}

/// Checks that `order` contains every index in `0..n` exactly once.
pub fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &gene in order {
        if gene >= n || seen[gene] {
            return false;
        }
        seen[gene] = true;
    }
    true
}

/// A candidate solution: a visiting order plus its cached cycle length.
///
/// The order cannot be modified once the tour is built, so the cached
/// distance always matches it. Operators produce new orders and wrap them
/// in new tours.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    order: Vec<usize>,
    distance: f64,
}

impl Tour {
    /// Builds a tour and evaluates it against `points`.
    ///
    /// Returns [`TspGaError::InvariantViolation`] if `order` is not a
    /// permutation of `0..points.len()`.
    pub fn new(order: Vec<usize>, points: &[Point]) -> Result<Self> {
        if !is_permutation(&order, points.len()) {
            return Err(TspGaError::invariant_violation(format!(
                "tour {order:?} is not a permutation of 0..{}",
                points.len()
            )));
        }
        let distance = tour_length(&order, points);
        Ok(Self { order, distance })
    }

    /// The visiting order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Cached total cycle length.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn into_order(self) -> Vec<usize> {
        self.order
    }
}
