//! Structured rule violations.
//!
//! Returned by the `validate_*` entry points so interactive callers can tell
//! the user why a placement was rejected. The allocator and optimizer only
//! use the boolean checks and never construct these.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::SessionKind;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Weekday name for a day index ("Unknown" past Sunday).
pub fn day_name(day: usize) -> &'static str {
    DAY_NAMES.get(day).copied().unwrap_or("Unknown")
}

fn weekday(day: &usize) -> &'static str {
    day_name(*day)
}

/// A broken institutional rule.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Violation {
    #[error("cannot schedule classes during lunch hours (period {period})")]
    LunchBreak { period: usize },

    #[error("lab sessions must span exactly the lab duration; got {actual} periods")]
    LabDuration { actual: usize },

    #[error("course {course_code} has sessions on nearby days: {} and {}", weekday(.day1), weekday(.day2))]
    ConsecutiveLecture {
        course_code: String,
        day1: usize,
        day2: usize,
    },

    #[error("faculty {instructor_id} has reached the maximum allowed {kind} assignments")]
    FacultyWorkloadExceeded {
        instructor_id: String,
        kind: SessionKind,
    },

    #[error("room {room_id} has insufficient capacity: {capacity}, but required: {required}")]
    RoomCapacityExceeded {
        room_id: String,
        capacity: u32,
        required: u32,
    },

    #[error("student {student_id} cannot exceed the credit limit: current {current}, attempted to add {attempted}")]
    CreditLimitExceeded {
        student_id: String,
        current: u32,
        attempted: u32,
    },

    #[error("slot {} period {period} is locked, occupied or outside the grid", weekday(.day))]
    SlotUnavailable { day: usize, period: usize },

    #[error("room {room_id} is already booked on {} at period {period}", weekday(.day))]
    RoomDoubleBooked {
        room_id: String,
        day: usize,
        period: usize,
    },

    #[error("instructor {instructor_id} is already teaching on {} at period {period}", weekday(.day))]
    InstructorDoubleBooked {
        instructor_id: String,
        day: usize,
        period: usize,
    },

    #[error("course {course_code} is incompatible with {other}")]
    IncompatibleCourses { course_code: String, other: String },
}
