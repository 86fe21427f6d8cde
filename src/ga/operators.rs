//! Genetic operators over whole schedules.
//!
//! # Operators
//!
//! | Operator | Behaviour |
//! |----------|-----------|
//! | Tournament | `k` uniform draws with replacement, fittest wins (first on ties) |
//! | Crossover | single row-major cut point; cells up to the cut from parent A |
//! | Mutation | a few session swaps between unlocked cells outside lunch |
//!
//! Crossover copies whole cells including the lock flag, so a child always
//! inherits a consistent lunch mask. Either operator may split a lab block;
//! fitness scores the pieces as they stand.

use rand::Rng;

use crate::config::{ConstraintConfig, GaConfig};
use crate::models::Schedule;

/// Tournament selection. Returns the index of the winner in `fitness`.
///
/// `fitness` must be non-empty; `size` of zero is treated as one.
pub fn tournament_select<R: Rng>(fitness: &[f64], size: usize, rng: &mut R) -> usize {
    let mut best = rng.random_range(0..fitness.len());
    for _ in 1..size.max(1) {
        let candidate = rng.random_range(0..fitness.len());
        if fitness[candidate] > fitness[best] {
            best = candidate;
        }
    }
    best
}

/// Single-point crossover.
///
/// Draws a cut `(d*, p*)`; the child takes parent A's cell for every
/// row-major index up to and including the cut and parent B's otherwise.
/// Parents must share dimensions.
pub fn crossover<R: Rng>(parent_a: &Schedule, parent_b: &Schedule, rng: &mut R) -> Schedule {
    let day = rng.random_range(0..parent_a.days());
    let period = rng.random_range(0..parent_a.periods_per_day());
    crossover_at(parent_a, parent_b, day * parent_a.periods_per_day() + period)
}

/// Crossover at a fixed flat cut index.
pub fn crossover_at(parent_a: &Schedule, parent_b: &Schedule, cut: usize) -> Schedule {
    let mut child = parent_a.clone();
    for idx in cut + 1..child.cell_count() {
        child.copy_cell_from(idx, parent_b);
    }
    child
}

/// Swaps sessions between random cell pairs.
///
/// Performs between `min_mutation_swaps` and `max_mutation_swaps` draws; a
/// draw touching a locked or lunch-window cell is skipped.
pub fn mutate<R: Rng>(
    schedule: &mut Schedule,
    ga: &GaConfig,
    constraints: &ConstraintConfig,
    rng: &mut R,
) {
    let cells = schedule.cell_count();
    if cells == 0 {
        return;
    }
    let swaps = rng.random_range(ga.min_mutation_swaps..=ga.max_mutation_swaps);
    let periods = schedule.periods_per_day();
    for _ in 0..swaps {
        let a = rng.random_range(0..cells);
        let b = rng.random_range(0..cells);
        let movable = |idx: usize| {
            !schedule.slots()[idx].locked && !constraints.is_lunch(idx % periods)
        };
        if movable(a) && movable(b) {
            schedule.swap_sessions(a, b);
        }
    }
}

/// Mutates with probability `mutation_rate`. Returns whether it fired.
pub fn maybe_mutate<R: Rng>(
    schedule: &mut Schedule,
    ga: &GaConfig,
    constraints: &ConstraintConfig,
    rng: &mut R,
) -> bool {
    if rng.random_bool(ga.mutation_rate) {
        mutate(schedule, ga, constraints, rng);
        true
    } else {
        false
    }
}
