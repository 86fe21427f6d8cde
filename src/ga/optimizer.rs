//! Generational GA over complete schedules.
//!
//! # Algorithm
//!
//! 1. Generation 0: the allocator's schedule plus `population_size - 1`
//!    clones, each mutated once unconditionally.
//! 2. Each generation: carry the `elite_count` fittest individuals over
//!    unchanged (stable on ties), then fill the rest with tournament-selected
//!    crossover children, each mutated with probability `mutation_rate`.
//! 3. After every evolved generation, stop if the best fitness reaches the
//!    target or the generation cap is hit. Cancellation and the time limit
//!    are checked before each generation.
//!
//! The best individual of the final population (first on ties) is copied
//! into the caller's schedule.

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::fitness::evaluate_population;
use super::operators::{crossover, maybe_mutate, mutate, tournament_select};
use crate::config::GaConfig;
use crate::constraints::ConflictChecker;
use crate::engine::CancelToken;
use crate::models::Schedule;

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Best fitness reached `target_fitness`.
    TargetReached,
    /// `max_generations` generations were evolved.
    GenerationLimit,
    /// The wall-clock budget ran out.
    TimeLimit,
    /// The caller cancelled the run.
    Cancelled,
}

/// Outcome of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Fitness of the schedule written back to the caller.
    pub best_fitness: f64,
    /// Generations evolved (generation 0 excluded).
    pub generations: usize,
    pub termination: Termination,
}

/// Population-based schedule improver.
///
/// # Caveats
///
/// Crossover and mutation work cell by cell, so a child may drop, duplicate
/// or split a lab block. Fitness only counts lunch, instructor, room and
/// course spacing clashes, which score an orphaned lab tail as clean; such a
/// child can outrank its parents. A conflict-free base is never replaced:
/// it enters as the first individual and, with `elite_count() >= 1`, stays
/// the first elite of every generation.
#[derive(Debug, Clone)]
pub struct Optimizer {
    checker: ConflictChecker,
    config: GaConfig,
}

impl Optimizer {
    /// Creates an optimizer.
    pub fn new(checker: ConflictChecker, config: GaConfig) -> Self {
        Self { checker, config }
    }

    /// GA parameters.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Builds generation 0 from `base`.
    pub fn initial_population<R: Rng>(&self, base: &Schedule, rng: &mut R) -> Vec<Schedule> {
        let constraints = self.checker.policy().config();
        let size = self.config.population_size.max(1);
        let mut population = Vec::with_capacity(size);
        population.push(base.clone());
        for _ in 1..size {
            let mut individual = base.clone();
            mutate(&mut individual, &self.config, constraints, rng);
            population.push(individual);
        }
        population
    }

    /// Produces the next generation.
    ///
    /// `fitness[i]` must be the fitness of `population[i]`.
    pub fn evolve<R: Rng>(
        &self,
        population: &[Schedule],
        fitness: &[f64],
        rng: &mut R,
    ) -> Vec<Schedule> {
        let constraints = self.checker.policy().config();
        let size = population.len();
        let mut next = Vec::with_capacity(size);

        let mut ranked: Vec<usize> = (0..size).collect();
        ranked.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
        next.extend(
            ranked
                .iter()
                .take(self.config.elite_count().min(size))
                .map(|&i| population[i].clone()),
        );

        while next.len() < size {
            let a = tournament_select(fitness, self.config.tournament_size, rng);
            let b = tournament_select(fitness, self.config.tournament_size, rng);
            let mut child = crossover(&population[a], &population[b], rng);
            maybe_mutate(&mut child, &self.config, constraints, rng);
            next.push(child);
        }
        next
    }

    /// Improves `schedule` in place.
    ///
    /// The schedule's name is kept; only its grid is replaced.
    pub fn optimize<R: Rng>(
        &self,
        schedule: &mut Schedule,
        rng: &mut R,
        cancel: &CancelToken,
    ) -> OptimizationResult {
        let started = Instant::now();
        let deadline = self.config.time_limit_ms.map(Duration::from_millis);
        let parallel = self.config.parallel;

        let mut population = self.initial_population(schedule, rng);
        let mut fitness = evaluate_population(&population, &self.checker, parallel);
        let mut generations = 0;

        let termination = loop {
            if cancel.is_cancelled() {
                break Termination::Cancelled;
            }
            if deadline.is_some_and(|limit| started.elapsed() >= limit) {
                break Termination::TimeLimit;
            }
            if generations >= self.config.max_generations {
                break Termination::GenerationLimit;
            }

            population = self.evolve(&population, &fitness, rng);
            fitness = evaluate_population(&population, &self.checker, parallel);
            generations += 1;

            let (_, best) = best_of(&fitness);
            if generations % 50 == 0 {
                debug!(generation = generations, best_fitness = best, "generation evolved");
            }
            if best >= self.config.target_fitness {
                break Termination::TargetReached;
            }
        };

        let (best_idx, best_fitness) = best_of(&fitness);
        schedule.copy_grid_from(&population[best_idx]);
        info!(
            generations,
            best_fitness,
            ?termination,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "optimization finished"
        );

        OptimizationResult {
            best_fitness,
            generations,
            termination,
        }
    }
}

/// Index and value of the highest fitness (first on ties).
fn best_of(fitness: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, &f) in fitness.iter().enumerate() {
        if f > best.1 {
            best = (i, f);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConstraintConfig;
    use crate::constraints::{ConstraintPolicy, Placement};
    use crate::ga::fitness::evaluate;
    use crate::models::{Session, SessionKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn checker() -> ConflictChecker {
        ConflictChecker::new(ConstraintPolicy::new(ConstraintConfig::default()))
    }

    fn small_ga() -> GaConfig {
        GaConfig::default()
            .with_population_size(12)
            .with_max_generations(30)
            .with_parallel(false)
    }

    /// One course on adjacent days, plus an unrelated clean session.
    fn conflicted() -> Schedule {
        let mut s = Schedule::new("base", &ConstraintConfig::default());
        s.set_slot(0, 0, Some(Session::new("A", "F102", "I1", SessionKind::Lecture)))
            .unwrap();
        s.set_slot(1, 0, Some(Session::new("A", "F102", "I1", SessionKind::Lecture)))
            .unwrap();
        s.set_slot(3, 2, Some(Session::new("B", "F103", "I2", SessionKind::Lecture)))
            .unwrap();
        s
    }

    #[test]
    fn test_best_of_first_on_ties() {
        assert_eq!(best_of(&[0.2, 0.8, 0.8, 0.1]), (1, 0.8));
    }

    #[test]
    fn test_initial_population() {
        let opt = Optimizer::new(checker(), small_ga());
        let base = conflicted();
        let mut rng = StdRng::seed_from_u64(1);
        let population = opt.initial_population(&base, &mut rng);
        assert_eq!(population.len(), 12);
        assert_eq!(population[0], base);
        assert!(population.iter().all(|s| s.occupied_count() == 3));
    }

    #[test]
    fn test_elites_survive() {
        let opt = Optimizer::new(checker(), small_ga().with_population_size(10));
        let c = checker();
        let good = Schedule::new("good", &ConstraintConfig::default());
        let bad = conflicted();
        let mut population = vec![bad; 9];
        population.insert(4, good.clone());
        let fitness: Vec<f64> = population.iter().map(|s| evaluate(s, &c)).collect();

        let mut rng = StdRng::seed_from_u64(2);
        let next = opt.evolve(&population, &fitness, &mut rng);
        assert_eq!(next.len(), 10);
        // elite_count = floor(10 * 0.1) = 1
        assert_eq!(next[0], good);
    }

    #[test]
    fn test_optimize_never_worse_than_base() {
        let c = checker();
        let opt = Optimizer::new(c.clone(), small_ga());
        let mut schedule = conflicted();
        let before = evaluate(&schedule, &c);

        let mut rng = StdRng::seed_from_u64(3);
        let result = opt.optimize(&mut schedule, &mut rng, &CancelToken::new());

        assert!(result.best_fitness >= before);
        assert!((evaluate(&schedule, &c) - result.best_fitness).abs() < 1e-12);
        assert_eq!(schedule.name, "base");
        assert!(result.generations <= 30);
    }

    #[test]
    fn test_clean_base_with_lab_block_is_returned_unchanged() {
        let c = checker();
        let mut base = Schedule::new("base", &ConstraintConfig::default());
        c.place(&mut base, &Placement::new("CS F213", "D101", "I1", 0, 0, SessionKind::Lab))
            .unwrap();
        c.place(&mut base, &Placement::new("MATH F111", "F102", "I2", 2, 6, SessionKind::Lecture))
            .unwrap();
        assert!(c.count_conflicts(&base).is_clean());

        let opt = Optimizer::new(
            c.clone(),
            small_ga().with_max_generations(5).with_target_fitness(2.0),
        );
        let mut schedule = base.clone();
        let mut rng = StdRng::seed_from_u64(9);
        let result = opt.optimize(&mut schedule, &mut rng, &CancelToken::new());

        assert_eq!(result.generations, 5);
        assert_eq!(result.best_fitness, 1.0);
        assert_eq!(schedule, base);
    }

    #[test]
    fn test_target_reached_after_first_generation() {
        let opt = Optimizer::new(checker(), small_ga().with_target_fitness(0.0));
        let mut schedule = conflicted();
        let mut rng = StdRng::seed_from_u64(4);
        let result = opt.optimize(&mut schedule, &mut rng, &CancelToken::new());
        assert_eq!(result.termination, Termination::TargetReached);
        assert_eq!(result.generations, 1);
    }

    #[test]
    fn test_generation_limit() {
        let opt = Optimizer::new(
            checker(),
            small_ga().with_max_generations(3).with_target_fitness(2.0),
        );
        let mut schedule = conflicted();
        let mut rng = StdRng::seed_from_u64(5);
        let result = opt.optimize(&mut schedule, &mut rng, &CancelToken::new());
        assert_eq!(result.termination, Termination::GenerationLimit);
        assert_eq!(result.generations, 3);
    }

    #[test]
    fn test_cancelled_before_first_generation() {
        let c = checker();
        let opt = Optimizer::new(c.clone(), small_ga());
        let base = conflicted();
        let mut schedule = base.clone();
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut rng = StdRng::seed_from_u64(6);
        let result = opt.optimize(&mut schedule, &mut rng, &cancel);
        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.generations, 0);
        assert!(result.best_fitness >= evaluate(&base, &c));
    }

    #[test]
    fn test_zero_time_limit() {
        let opt = Optimizer::new(checker(), small_ga().with_time_limit_ms(0));
        let mut schedule = conflicted();
        let mut rng = StdRng::seed_from_u64(7);
        let result = opt.optimize(&mut schedule, &mut rng, &CancelToken::new());
        assert_eq!(result.termination, Termination::TimeLimit);
        assert_eq!(result.generations, 0);
    }

    #[test]
    fn test_seeded_runs_are_deterministic() {
        let opt = Optimizer::new(checker(), small_ga().with_parallel(true));
        let mut a = conflicted();
        let mut b = conflicted();
        let ra = opt.optimize(&mut a, &mut StdRng::seed_from_u64(8), &CancelToken::new());
        let rb = opt.optimize(&mut b, &mut StdRng::seed_from_u64(8), &CancelToken::new());
        assert_eq!(ra, rb);
        assert_eq!(a, b);
    }
}
