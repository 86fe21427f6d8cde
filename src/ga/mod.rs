//! GA-based schedule optimization.
//!
//! Improves a constructed schedule by evolving a population of whole-grid
//! copies. Individuals are complete [`Schedule`](crate::models::Schedule)
//! values; nothing is shared between them.
//!
//! # Encoding
//!
//! The grid itself is the chromosome: one gene per (day, period) cell,
//! holding an optional session and the lock flag. Fitness penalizes
//! conflicts rather than forbidding them, so operators never repair.
//!
//! # Submodules
//!
//! - [`fitness`]: conflict-based scoring, optionally parallel
//! - [`operators`]: tournament selection, single-point crossover, swap mutation
//!
//! # Reference
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod fitness;
pub mod operators;
mod optimizer;

pub use optimizer::{OptimizationResult, Optimizer, Termination};
