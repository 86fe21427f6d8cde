//! Timetabling domain models.
//!
//! Provides the entity snapshot (courses, instructors, classrooms) and the
//! weekly grid the engine fills.
//!
//! # Domain Mappings
//!
//! | u-timetable | Generic scheduling |
//! |-------------|--------------------|
//! | Course | Task (demand for sessions) |
//! | Session | Activity placed on the grid |
//! | Instructor / Classroom | Resources |
//! | Schedule | Solution grid |

mod catalog;
mod classroom;
mod course;
mod instructor;
mod schedule;
mod session;

pub use catalog::Catalog;
pub use classroom::Classroom;
pub use course::Course;
pub use instructor::Instructor;
pub use schedule::{Schedule, Slot};
pub use session::{Session, SessionKind};
