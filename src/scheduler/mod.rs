//! Constructive allocation and schedule reporting.
//!
//! # Algorithm
//!
//! `Allocator` fills an empty grid in three randomized phases (labs,
//! lectures, tutorials), asking the conflict checker before every write.
//! It is not optimal, but produces a conflict-free starting point for the
//! optimizer whenever the catalog allows one.
//!
//! # Report
//!
//! `ScheduleSummary` computes occupancy, per-resource load and the conflict
//! breakdown of a finished schedule.

mod allocator;
mod report;

pub use allocator::{eligible_instructors, suitable_rooms, Allocator, UnmetReason, UnmetRequirement};
pub use report::ScheduleSummary;
