//! Institutional rule predicates.
//!
//! Each rule has a boolean check for hot loops and a `validate_*` form that
//! names the broken rule. None of them touch the schedule.

use super::Violation;
use crate::config::ConstraintConfig;
use crate::models::{Classroom, Course, Instructor, SessionKind, Slot};

/// Stateless rule set parameterized by [`ConstraintConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintPolicy {
    config: ConstraintConfig,
}

impl ConstraintPolicy {
    /// Creates a policy over the given constants.
    pub fn new(config: ConstraintConfig) -> Self {
        Self { config }
    }

    /// The underlying constants.
    pub fn config(&self) -> &ConstraintConfig {
        &self.config
    }

    /// True iff `period` lies outside the lunch window.
    pub fn is_valid_lunch_break(&self, period: usize) -> bool {
        !self.config.is_lunch(period)
    }

    /// True unless the course has lab hours and `duration` differs from a lab block.
    pub fn lab_duration_ok(&self, course: &Course, duration: usize) -> bool {
        !course.needs_lab() || duration == self.config.lab_duration
    }

    /// True iff no existing allocation lies within the day gap of `new_day`.
    pub fn lecture_spacing_ok(&self, existing: &[&Slot], new_day: usize) -> bool {
        self.spacing_clash(existing, new_day).is_none()
    }

    /// True iff the instructor is below the cap for `kind`.
    pub fn faculty_workload_ok(&self, instructor: &Instructor, kind: SessionKind) -> bool {
        instructor.can_teach(kind, &self.config)
    }

    /// True iff the room seats the course's enrolment.
    pub fn room_capacity_ok(&self, room: &Classroom, course: &Course) -> bool {
        room.seats(course)
    }

    /// True iff the new credit total stays within the limit.
    pub fn credit_limit_ok(&self, current: u32, added: u32) -> bool {
        current.saturating_add(added) <= self.config.max_credits
    }

    /// True iff neither course lists the other as incompatible.
    pub fn courses_compatible(&self, a: &Course, b: &Course) -> bool {
        !a.conflicts_with(b)
    }

    pub fn validate_lunch_break(&self, period: usize) -> Result<(), Violation> {
        if self.is_valid_lunch_break(period) {
            Ok(())
        } else {
            Err(Violation::LunchBreak { period })
        }
    }

    pub fn validate_lab_duration(&self, course: &Course, duration: usize) -> Result<(), Violation> {
        if self.lab_duration_ok(course, duration) {
            Ok(())
        } else {
            Err(Violation::LabDuration { actual: duration })
        }
    }

    /// Reports the first existing allocation too close to `new_day`.
    pub fn validate_lecture_spacing(
        &self,
        course_code: &str,
        existing: &[&Slot],
        new_day: usize,
    ) -> Result<(), Violation> {
        match self.spacing_clash(existing, new_day) {
            None => Ok(()),
            Some(day) => Err(Violation::ConsecutiveLecture {
                course_code: course_code.to_string(),
                day1: day,
                day2: new_day,
            }),
        }
    }

    pub fn validate_faculty_workload(
        &self,
        instructor: &Instructor,
        kind: SessionKind,
    ) -> Result<(), Violation> {
        if self.faculty_workload_ok(instructor, kind) {
            Ok(())
        } else {
            Err(Violation::FacultyWorkloadExceeded {
                instructor_id: instructor.id.clone(),
                kind,
            })
        }
    }

    pub fn validate_room_capacity(&self, room: &Classroom, course: &Course) -> Result<(), Violation> {
        if self.room_capacity_ok(room, course) {
            Ok(())
        } else {
            Err(Violation::RoomCapacityExceeded {
                room_id: room.room_number.clone(),
                capacity: room.capacity,
                required: course.enrolled_students,
            })
        }
    }

    pub fn validate_credit_limit(
        &self,
        student_id: &str,
        current: u32,
        added: u32,
    ) -> Result<(), Violation> {
        if self.credit_limit_ok(current, added) {
            Ok(())
        } else {
            Err(Violation::CreditLimitExceeded {
                student_id: student_id.to_string(),
                current,
                attempted: added,
            })
        }
    }

    pub fn validate_compatibility(&self, a: &Course, b: &Course) -> Result<(), Violation> {
        if self.courses_compatible(a, b) {
            Ok(())
        } else {
            Err(Violation::IncompatibleCourses {
                course_code: a.code.clone(),
                other: b.code.clone(),
            })
        }
    }

    fn spacing_clash(&self, existing: &[&Slot], new_day: usize) -> Option<usize> {
        existing
            .iter()
            .map(|s| s.day)
            .find(|&day| day.abs_diff(new_day) <= self.config.lecture_gap_days)
    }
}
