//! Permutation operators for tours.
//!
//! Both operators take parent orders by reference or by value and return a
//! fresh order, so a child never shares storage with a parent.
//!
//! # Crossover
//!
//! - [`order_crossover`] (OX): Davis (1985) — keeps a slice of one parent in
//!   place and fills the rest in the other parent's relative order
//!
//! # Mutation
//!
//! - [`invert_mutation`]: reverse a random segment (2-opt move)
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

use crate::error::{Result, TspGaError};
use crate::tour::is_permutation;
use rand::seq::index;
use rand::Rng;

const EMPTY: usize = usize::MAX;

// ============================================================================
// Crossover
// ============================================================================

/// Order Crossover (OX) producing a single child.
///
/// # Algorithm
///
/// 1. Draw distinct cut points `c1 < c2` from `0..n`
/// 2. Copy `parent1[c1..c2]` into the child at the same positions
/// 3. Walk `parent2` from `c2`, wrapping around, and drop every gene not yet
///    in the child into the next open slot, scanning slots from `c2` onward
///
/// # Errors
/// [`TspGaError::InvalidInput`] if the parents have different lengths, are
/// shorter than 2, or are not permutations of `0..n`.
///
/// # Complexity
/// O(n) time, O(n) space
pub fn order_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Result<Vec<usize>> {
    let (c1, c2) = random_cut_points(parent1.len(), rng)?;
    order_crossover_at(parent1, parent2, c1, c2)
}

/// Order Crossover with explicit cut points `c1 < c2 < n`.
pub fn order_crossover_at(
    parent1: &[usize],
    parent2: &[usize],
    c1: usize,
    c2: usize,
) -> Result<Vec<usize>> {
    let n = parent1.len();
    if n != parent2.len() {
        return Err(TspGaError::invalid_input(format!(
            "parents must have equal length, got {n} and {}",
            parent2.len()
        )));
    }
    if n < 2 {
        return Err(TspGaError::invalid_input(format!(
            "crossover needs at least 2 genes, got {n}"
        )));
    }
    if !(c1 < c2 && c2 < n) {
        return Err(TspGaError::invalid_input(format!(
            "cut points must satisfy c1 < c2 < {n}, got ({c1}, {c2})"
        )));
    }
    if !is_permutation(parent1, n) || !is_permutation(parent2, n) {
        return Err(TspGaError::invalid_input(
            "parents must be permutations of the same index set",
        ));
    }

    let mut child = vec![EMPTY; n];
    let mut present = vec![false; n];

    for i in c1..c2 {
        child[i] = parent1[i];
        present[parent1[i]] = true;
    }

    // The copied block is contiguous, so the slot cursor only skips it once.
    let mut slot = c2;
    for offset in 0..n {
        let gene = parent2[(c2 + offset) % n];
        if present[gene] {
            continue;
        }
        while child[slot] != EMPTY {
            slot = (slot + 1) % n;
        }
        child[slot] = gene;
        present[gene] = true;
    }

    Ok(child)
}

/// Draws two distinct cut points from `0..n`, returned in ascending order.
///
/// # Errors
/// [`TspGaError::InvalidInput`] if `n < 2`.
pub fn random_cut_points<R: Rng>(n: usize, rng: &mut R) -> Result<(usize, usize)> {
    if n < 2 {
        return Err(TspGaError::invalid_input(format!(
            "need at least 2 positions to draw distinct cut points, got {n}"
        )));
    }
    let picked = index::sample(rng, n, 2);
    let (a, b) = (picked.index(0), picked.index(1));
    Ok(if a < b { (a, b) } else { (b, a) })
}

// ============================================================================
// Mutation
// ============================================================================

/// Inversion mutation.
///
/// With probability `rate`, picks distinct positions `i < j` and reverses
/// `order[i..j]`; otherwise returns `order` unchanged. Orders shorter than 2
/// are returned as-is.
///
/// # Panics
/// Panics if `rate` is NaN or outside `[0, 1]` and `order` has at least 2
/// genes. [`TspGaConfig::validate`](crate::ga::TspGaConfig::validate)
/// rejects such rates before a run starts.
pub fn invert_mutation<R: Rng>(mut order: Vec<usize>, rate: f64, rng: &mut R) -> Vec<usize> {
    let n = order.len();
    if n < 2 || !rng.random_bool(rate) {
        return order;
    }
    let picked = index::sample(rng, n, 2);
    let (a, b) = (picked.index(0), picked.index(1));
    let (i, j) = if a < b { (a, b) } else { (b, a) };
    order[i..j].reverse();
    order
}

// ============================================================================
// Tests
// ============================================================================
