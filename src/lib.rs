//! Course timetabling engine.
//!
//! Builds a weekly timetable for a set of courses, instructors and rooms:
//! a randomized constructive pass places labs, lectures and tutorials under
//! hard institutional rules, then a genetic algorithm searches for a
//! schedule with fewer conflicts.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Course`, `Instructor`, `Classroom`,
//!   `Session`, `Slot`, `Schedule`, `Catalog`
//! - **`constraints`**: Rule predicates (`ConstraintPolicy`), the feasibility
//!   oracle (`ConflictChecker`) and structured `Violation`s
//! - **`scheduler`**: Constructive `Allocator` and `ScheduleSummary`
//! - **`ga`**: Fitness, genetic operators and the population `Optimizer`
//! - **`engine`**: Phase state machine tying it all together
//! - **`config`**: Tunables with serde-friendly defaults
//! - **`validation`**: Catalog integrity checks (dangling refs, unhostable courses)
//!
//! # Architecture
//!
//! All randomness flows from one caller-supplied `rand::Rng`, so a seeded
//! run is reproducible. The input `Catalog` is never mutated; each run
//! works on its own instructor copies and schedule.
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Schaerf (1999), "A Survey of Automated Timetabling"

pub mod config;
pub mod constraints;
pub mod engine;
pub mod error;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use config::EngineConfig;
pub use engine::{CancelToken, Engine, EngineOutcome, EnginePhase};
pub use error::{ConfigError, EngineError, ScheduleError};
