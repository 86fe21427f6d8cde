//! Institutional rules and conflict detection.
//!
//! - [`ConstraintPolicy`]: stateless predicates over the rule constants,
//!   each with a boolean and a `validate_*` form.
//! - [`ConflictChecker`]: room, instructor, spacing and lunch checks against
//!   a [`Schedule`](crate::models::Schedule); the only feasibility oracle
//!   used by the allocator and the optimizer.
//! - [`Violation`]: structured reasons returned to interactive callers.

mod checker;
mod policy;
mod violation;

pub use checker::{ConflictBreakdown, ConflictChecker, Placement};
pub(crate) use checker::write_session;
pub use policy::ConstraintPolicy;
pub use violation::{day_name, Violation};
