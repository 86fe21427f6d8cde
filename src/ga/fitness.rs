//! Schedule fitness.
//!
//! `fitness = 1 - conflicts / (days × periods)`, where conflicts come from
//! [`ConflictChecker::count_conflicts`]. An empty or conflict-free grid
//! scores 1.0; the value can go negative on heavily conflicted grids.

use rayon::prelude::*;

use crate::constraints::{ConflictBreakdown, ConflictChecker};
use crate::models::Schedule;

/// Fitness from a conflict breakdown over a grid of `cells` cells.
pub fn score(breakdown: &ConflictBreakdown, cells: usize) -> f64 {
    if cells == 0 {
        return 1.0;
    }
    1.0 - breakdown.total() as f64 / cells as f64
}

/// Fitness of one schedule.
pub fn evaluate(schedule: &Schedule, checker: &ConflictChecker) -> f64 {
    score(&checker.count_conflicts(schedule), schedule.cell_count())
}

/// Fitness of every individual, in population order.
///
/// Evaluation consumes no randomness, so parallel and sequential runs
/// produce identical vectors.
pub fn evaluate_population(
    population: &[Schedule],
    checker: &ConflictChecker,
    parallel: bool,
) -> Vec<f64> {
    if parallel {
        population.par_iter().map(|s| evaluate(s, checker)).collect()
    } else {
        population.iter().map(|s| evaluate(s, checker)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConstraintConfig;
    use crate::constraints::{ConstraintPolicy, Placement};
    use crate::models::{Session, SessionKind};

    fn checker() -> ConflictChecker {
        ConflictChecker::new(ConstraintPolicy::new(ConstraintConfig::default()))
    }

    #[test]
    fn test_empty_schedule_is_perfect() {
        let s = Schedule::new("t", &ConstraintConfig::default());
        assert!((evaluate(&s, &checker()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_clean_lab_block_is_perfect() {
        let c = checker();
        let mut s = Schedule::new("t", &ConstraintConfig::default());
        c.place(&mut s, &Placement::new("CS F213", "D101", "I1", 0, 0, SessionKind::Lab))
            .unwrap();
        c.place(&mut s, &Placement::new("MATH F111", "F102", "I2", 2, 3, SessionKind::Lecture))
            .unwrap();
        assert!((evaluate(&s, &c) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_conflicts_lower_fitness() {
        let c = checker();
        let mut s = Schedule::new("t", &ConstraintConfig::default());
        // Same course on adjacent days: one spacing conflict per cell.
        s.set_slot(0, 0, Some(Session::new("A", "F102", "I1", SessionKind::Lecture)))
            .unwrap();
        s.set_slot(1, 0, Some(Session::new("A", "F103", "I1", SessionKind::Lecture)))
            .unwrap();
        let expected = 1.0 - 2.0 / 45.0;
        assert!((evaluate(&s, &c) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_score_of_empty_grid() {
        assert_eq!(score(&ConflictBreakdown::default(), 0), 1.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let c = checker();
        let mut a = Schedule::new("a", &ConstraintConfig::default());
        a.set_slot(0, 4, Some(Session::new("A", "F102", "I1", SessionKind::Lecture)))
            .unwrap();
        let b = Schedule::new("b", &ConstraintConfig::default());
        let population = vec![a, b];

        assert_eq!(
            evaluate_population(&population, &c, true),
            evaluate_population(&population, &c, false)
        );
    }
}
