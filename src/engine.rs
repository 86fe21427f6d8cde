//! Scheduling run orchestration.
//!
//! The engine moves forward through a fixed sequence of phases:
//!
//! ```text
//! Init → AllocateLabs → AllocateLectures → AllocateTutorials → Optimize → Done
//! ```
//!
//! `Init` snapshots the instructors and validates the catalog; the three
//! allocation phases build a schedule; `Optimize` runs the GA over it. An
//! error in any phase stops the run and the partial schedule is returned.
//!
//! # Usage
//!
//! ```
//! use u_timetable::engine::Engine;
//! use u_timetable::config::{EngineConfig, GaConfig};
//! use u_timetable::models::{Catalog, Classroom, Course, Instructor};
//!
//! let catalog = Catalog::new()
//!     .with_course(
//!         Course::new("CS F213", "Object Oriented Programming")
//!             .with_lecture_hours(1)
//!             .with_lab_hours(2)
//!             .with_enrollment(40)
//!             .with_instructor("I1"),
//!     )
//!     .with_instructor(Instructor::new("I1", "Dr. Rao"))
//!     .with_classroom(Classroom::new("F102", 60))
//!     .with_classroom(Classroom::new("D101", 60));
//!
//! let engine = Engine::new(
//!     EngineConfig::default().with_ga(GaConfig::default().with_population_size(10)),
//! )
//! .unwrap();
//! let outcome = engine.run_seeded(&catalog, 42);
//! assert!(outcome.complete);
//! assert_eq!(outcome.schedule.course_allocations("CS F213").len(), 3);
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::constraints::{ConflictChecker, ConstraintPolicy};
use crate::error::{ConfigError, EngineError};
use crate::ga::{fitness, OptimizationResult, Optimizer, Termination};
use crate::models::{Catalog, Instructor, Schedule};
use crate::scheduler::{Allocator, ScheduleSummary, UnmetRequirement};
use crate::validation::{validate_catalog, ValidationErrorKind};

/// Cooperative cancellation flag shared across threads.
///
/// Cloning yields a handle to the same flag. A cancel stops the run in
/// flight, or the next run if none is active; the engine clears the flag
/// once a run has stopped on it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Clears a pending cancellation.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once cancellation was requested.
    pub fn check(&self) -> Result<(), EngineError> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Engine state machine phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnginePhase {
    Init,
    AllocateLabs,
    AllocateLectures,
    AllocateTutorials,
    Optimize,
    Done,
}

/// Result of one scheduling run.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutcome {
    /// Final (or partial) schedule.
    pub schedule: Schedule,
    /// Run-local instructor copies with updated load counters.
    pub instructors: BTreeMap<String, Instructor>,
    /// Requirements the allocator could not place.
    pub unmet: Vec<UnmetRequirement>,
    /// Last phase entered.
    pub phase: EnginePhase,
    /// Phase in which the run stopped early, if it did.
    pub aborted_in: Option<EnginePhase>,
    /// Whether every phase ran to completion.
    pub complete: bool,
    /// Error that stopped the run.
    pub error: Option<EngineError>,
    /// GA statistics, if the optimizer ran.
    pub optimization: Option<OptimizationResult>,
    /// Fitness of `schedule`.
    pub fitness: f64,
}

impl EngineOutcome {
    /// Whether every required session was placed.
    pub fn fully_allocated(&self) -> bool {
        self.unmet.is_empty()
    }
}

/// Timetabling engine.
///
/// Holds configuration and a cancellation token; every run works on its
/// own schedule and instructor copies, so one engine can serve many runs.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    checker: ConflictChecker,
    cancel: CancelToken,
}

impl Engine {
    /// Creates an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let checker = ConflictChecker::new(ConstraintPolicy::new(config.constraints.clone()));
        Ok(Self {
            config,
            checker,
            cancel: CancelToken::new(),
        })
    }

    /// Replaces the cancellation token.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that cancels this engine's runs.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The conflict checker runs are scored with.
    pub fn checker(&self) -> &ConflictChecker {
        &self.checker
    }

    /// Runs all phases with a deterministic RNG seeded by `seed`.
    pub fn run_seeded(&self, catalog: &Catalog, seed: u64) -> EngineOutcome {
        let mut rng = StdRng::seed_from_u64(seed);
        self.run(catalog, &mut rng)
    }

    /// Runs all phases. The catalog is never modified.
    pub fn run<R: Rng>(&self, catalog: &Catalog, rng: &mut R) -> EngineOutcome {
        let constraints = &self.config.constraints;

        info!(
            phase = ?EnginePhase::Init,
            courses = catalog.courses.len(),
            instructors = catalog.instructors.len(),
            rooms = catalog.classrooms.len(),
            "scheduling run started"
        );
        let mut instructors = catalog.instructors.clone();
        if !self.config.resume_loads {
            instructors.values_mut().for_each(Instructor::reset_load);
        }
        if let Err(findings) = validate_catalog(catalog, constraints) {
            // Loads were just reset, so carried-over assignments are moot.
            let findings = findings.iter().filter(|f| {
                self.config.resume_loads || f.kind != ValidationErrorKind::NonZeroLoad
            });
            for finding in findings {
                warn!(kind = ?finding.kind, "{}", finding.message);
            }
        }

        let mut run = Run {
            schedule: Schedule::new(self.config.schedule_name.clone(), constraints),
            instructors,
            unmet: Vec::new(),
            phase: EnginePhase::Init,
        };

        let allocator = Allocator::new(self.checker.clone(), self.config.allocator.clone());
        let phases = [
            EnginePhase::AllocateLabs,
            EnginePhase::AllocateLectures,
            EnginePhase::AllocateTutorials,
        ];
        for phase in phases {
            run.enter(phase);
            let result = match phase {
                EnginePhase::AllocateLabs => allocator.allocate_labs(
                    &mut run.schedule,
                    catalog,
                    &mut run.instructors,
                    rng,
                    &self.cancel,
                ),
                EnginePhase::AllocateLectures => allocator.allocate_lectures(
                    &mut run.schedule,
                    catalog,
                    &mut run.instructors,
                    rng,
                    &self.cancel,
                ),
                _ => allocator.allocate_tutorials(
                    &mut run.schedule,
                    catalog,
                    &mut run.instructors,
                    rng,
                    &self.cancel,
                ),
            };
            match result {
                Ok(unmet) => run.unmet.extend(unmet),
                Err(error) => return self.abort(run, error, None),
            }
        }

        run.enter(EnginePhase::Optimize);
        let optimizer = Optimizer::new(self.checker.clone(), self.config.ga.clone());
        let result = optimizer.optimize(&mut run.schedule, rng, &self.cancel);
        if result.termination == Termination::Cancelled {
            return self.abort(run, EngineError::Cancelled, Some(result));
        }

        run.enter(EnginePhase::Done);
        let fitness = fitness::evaluate(&run.schedule, &self.checker);
        info!(
            fitness,
            occupied = run.schedule.occupied_count(),
            unmet = run.unmet.len(),
            "scheduling run finished"
        );
        EngineOutcome {
            schedule: run.schedule,
            instructors: run.instructors,
            unmet: run.unmet,
            phase: run.phase,
            aborted_in: None,
            complete: true,
            error: None,
            optimization: Some(result),
            fitness,
        }
    }

    /// Summarizes a schedule under this engine's rules.
    pub fn summarize(&self, schedule: &Schedule) -> ScheduleSummary {
        ScheduleSummary::calculate(schedule, &self.checker)
    }

    fn abort(
        &self,
        run: Run,
        error: EngineError,
        optimization: Option<OptimizationResult>,
    ) -> EngineOutcome {
        warn!(phase = ?run.phase, %error, "scheduling run stopped");
        if error == EngineError::Cancelled {
            self.cancel.reset();
        }
        let fitness = fitness::evaluate(&run.schedule, &self.checker);
        EngineOutcome {
            schedule: run.schedule,
            instructors: run.instructors,
            unmet: run.unmet,
            phase: run.phase,
            aborted_in: Some(run.phase),
            complete: false,
            error: Some(error),
            optimization,
            fitness,
        }
    }
}

/// Mutable state of one run.
struct Run {
    schedule: Schedule,
    instructors: BTreeMap<String, Instructor>,
    unmet: Vec<UnmetRequirement>,
    phase: EnginePhase,
}

impl Run {
    fn enter(&mut self, phase: EnginePhase) {
        debug_assert!(phase > self.phase);
        info!(from = ?self.phase, to = ?phase, "phase transition");
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConstraintConfig, GaConfig};
    use crate::models::{Classroom, Course, SessionKind};
    use crate::scheduler::UnmetReason;
    use tracing_test::traced_test;

    fn fast_config() -> EngineConfig {
        EngineConfig::default()
            .with_schedule_name("Semester I")
            .with_ga(
                GaConfig::default()
                    .with_population_size(16)
                    .with_max_generations(20),
            )
    }

    fn campus() -> Catalog {
        Catalog::new()
            .with_course(
                Course::new("CS F213", "Object Oriented Programming")
                    .with_credits(4)
                    .with_lecture_hours(2)
                    .with_tutorial_hours(1)
                    .with_lab_hours(2)
                    .with_enrollment(60)
                    .with_instructor("I1")
                    .with_instructor("I2"),
            )
            .with_course(
                Course::new("MATH F111", "Mathematics I")
                    .with_credits(3)
                    .with_lecture_hours(3)
                    .with_tutorial_hours(1)
                    .with_enrollment(120)
                    .with_instructor("I3")
                    .with_instructor("I4")
                    .with_instructor("I5"),
            )
            .with_course(
                Course::new("CHEM F110", "Chemistry Laboratory")
                    .with_credits(1)
                    .with_lab_hours(2)
                    .with_enrollment(30)
                    .with_instructor("I2"),
            )
            .with_instructor(Instructor::new("I1", "Dr. Rao"))
            .with_instructor(Instructor::new("I2", "Dr. Iyer"))
            .with_instructor(Instructor::new("I3", "Dr. Menon"))
            .with_instructor(Instructor::new("I4", "Dr. Shah"))
            .with_instructor(Instructor::new("I5", "Dr. Gupta"))
            .with_classroom(Classroom::new("F102", 150))
            .with_classroom(Classroom::new("F105", 80))
            .with_classroom(Classroom::new("D101", 80))
            .with_classroom(Classroom::new("I014", 40))
    }

    fn engine() -> Engine {
        Engine::new(fast_config()).unwrap()
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = EngineConfig::default()
            .with_constraints(ConstraintConfig::default().with_lunch(8, 12));
        assert!(matches!(
            Engine::new(config),
            Err(ConfigError::InvalidLunchWindow { .. })
        ));
        let config = EngineConfig::default().with_ga(GaConfig::default().with_population_size(0));
        assert_eq!(Engine::new(config).unwrap_err(), ConfigError::EmptyPopulation);
    }

    #[test]
    fn test_full_run_completes() {
        let catalog = campus();
        let outcome = engine().run_seeded(&catalog, 11);

        assert!(outcome.complete);
        assert_eq!(outcome.phase, EnginePhase::Done);
        assert!(outcome.error.is_none());
        assert!(outcome.optimization.is_some());
        assert_eq!(outcome.schedule.name, "Semester I");
        assert!(outcome.fitness >= 0.95);
        // Snapshot counters never move
        assert!(catalog.instructors.values().all(|i| i.total_load() == 0));
    }

    #[test]
    fn test_final_schedule_properties() {
        let catalog = campus();
        let config = ConstraintConfig::default();
        for seed in 0..10 {
            let outcome = engine().run_seeded(&catalog, seed);
            let s = &outcome.schedule;

            for slot in s.occupied() {
                assert!(!config.is_lunch(slot.period), "seed {seed}: lunch occupied");
            }

            // No overlapping room or instructor bookings, no spacing clashes
            assert!(
                engine().checker().count_conflicts(s).is_clean(),
                "seed {seed}: conflicts in final schedule"
            );

            // Lab heads are followed by their continuation, same room and instructor
            for slot in s.occupied() {
                let session = slot.session.as_ref().unwrap();
                if session.kind == SessionKind::Lab && session.is_head() {
                    let next = &s[(slot.day, slot.period + 1)];
                    assert_eq!(next.course_code(), slot.course_code());
                    assert_eq!(next.room_id(), slot.room_id());
                    assert_eq!(next.instructor_id(), slot.instructor_id());
                    assert!(catalog.classrooms[&session.room_id].is_lab);
                }
            }

            // Course day spacing across every session of a course
            for code in catalog.courses.keys() {
                let mut days: Vec<usize> = s
                    .course_allocations(code)
                    .iter()
                    .filter(|x| x.session.as_ref().is_some_and(|x| x.part == 0))
                    .map(|x| x.day)
                    .collect();
                days.sort_unstable();
                for pair in days.windows(2) {
                    assert!(pair[1] - pair[0] > 1, "seed {seed}: {code} on days {pair:?}");
                }
            }

            // Load counters never exceed caps and match placements
            for instructor in outcome.instructors.values() {
                for kind in SessionKind::ALL {
                    assert!(instructor.count_for(kind) <= config.workload_cap(kind));
                }
            }
            assert!(outcome.fitness >= 0.95);
        }
    }

    #[test]
    fn test_seeded_runs_are_deterministic() {
        let catalog = campus();
        let a = engine().run_seeded(&catalog, 99);
        let b = engine().run_seeded(&catalog, 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cancel_before_start() {
        let engine = engine();
        engine.cancel_token().cancel();
        let outcome = engine.run_seeded(&campus(), 1);

        assert!(!outcome.complete);
        assert_eq!(outcome.error, Some(EngineError::Cancelled));
        assert_eq!(outcome.aborted_in, Some(EnginePhase::AllocateLabs));
        assert!(outcome.optimization.is_none());
        assert_eq!(outcome.schedule.occupied_count(), 0);
    }

    #[test]
    fn test_cancel_with_empty_catalog_stops_in_optimizer() {
        let token = CancelToken::new();
        let engine = engine().with_cancel_token(token.clone());
        token.cancel();
        let outcome = engine.run_seeded(&Catalog::new(), 1);

        assert!(!outcome.complete);
        assert_eq!(outcome.aborted_in, Some(EnginePhase::Optimize));
        assert_eq!(
            outcome.optimization.map(|o| o.termination),
            Some(Termination::Cancelled)
        );
    }

    #[test]
    fn test_cancel_applies_to_one_run() {
        let engine = engine();
        engine.cancel_token().cancel();
        let stopped = engine.run_seeded(&campus(), 1);
        assert_eq!(stopped.error, Some(EngineError::Cancelled));
        assert!(!engine.cancel_token().is_cancelled());

        let next = engine.run_seeded(&campus(), 1);
        assert!(next.complete);
        assert!(next.error.is_none());
        assert_eq!(next.phase, EnginePhase::Done);
    }

    #[test]
    fn test_resume_loads() {
        let mut busy = Instructor::new("I1", "Dr. Rao");
        busy.assign("EEE F111", SessionKind::Lab);
        let catalog = campus().with_instructor(busy);

        let fresh = engine().run_seeded(&catalog, 5);
        assert_eq!(fresh.instructors["I1"].labs_assigned, 1);
        assert!(fresh.instructors["I1"].assigned_courses.contains("CS F213"));

        // I1 arrives at the lab cap and I2 spends theirs on CHEM F110 first
        let resumed = Engine::new(fast_config().with_resume_loads(true))
            .unwrap()
            .run_seeded(&catalog, 5);
        assert_eq!(resumed.instructors["I1"].labs_assigned, 1);
        assert!(resumed
            .schedule
            .course_allocations("CS F213")
            .iter()
            .all(|s| s.session.as_ref().is_some_and(|x| x.kind != SessionKind::Lab)));
        assert!(resumed.unmet.iter().any(|u| u.course_code == "CS F213"
            && u.kind == SessionKind::Lab
            && u.reason == UnmetReason::NoEligibleInstructor));
    }

    #[test]
    fn test_unmet_requirements_reported() {
        let catalog = campus().with_course(
            Course::new("BIO F111", "General Biology")
                .with_lecture_hours(2)
                .with_enrollment(500)
                .with_instructor("I5"),
        );
        let outcome = engine().run_seeded(&catalog, 3);
        assert!(outcome.complete);
        assert!(!outcome.fully_allocated());
        assert!(outcome
            .unmet
            .iter()
            .any(|u| u.course_code == "BIO F111" && u.shortfall() == 2));
    }

    #[test]
    #[traced_test]
    fn test_validation_findings_logged() {
        let catalog = campus().with_course(Course::new("HSS F222", "Ethics").with_lecture_hours(1));
        let outcome = engine().run_seeded(&catalog, 2);
        assert!(outcome.complete);
        assert!(logs_contain("Course 'HSS F222' has no instructor"));
    }

    #[test]
    #[traced_test]
    fn test_reset_loads_skip_load_findings() {
        let mut busy = Instructor::new("I1", "Dr. Rao");
        busy.assign("EEE F111", SessionKind::Lab);
        let outcome = engine().run_seeded(&campus().with_instructor(busy), 2);
        assert!(outcome.complete);
        assert!(!logs_contain("already carries"));
    }

    #[test]
    #[traced_test]
    fn test_resumed_loads_log_load_findings() {
        let mut busy = Instructor::new("I1", "Dr. Rao");
        busy.assign("EEE F111", SessionKind::Lab);
        let engine = Engine::new(fast_config().with_resume_loads(true)).unwrap();
        engine.run_seeded(&campus().with_instructor(busy), 2);
        assert!(logs_contain("Instructor 'I1' already carries 1 assignments"));
    }

    #[test]
    fn test_summary_matches_outcome() {
        let engine = engine();
        let outcome = engine.run_seeded(&campus(), 4);
        let summary = engine.summarize(&outcome.schedule);
        assert!((summary.fitness - outcome.fitness).abs() < 1e-12);
        assert_eq!(summary.occupied_cells, outcome.schedule.occupied_count());
    }
}
