//! Course model.
//!
//! A course is the unit of demand: it asks for a number of lecture,
//! tutorial and lab hours per week, taught by one of its listed
//! instructors in a room large enough for its enrolment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::SessionKind;

/// A course offering to be timetabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Course code (e.g. "CS F213").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Credit units.
    pub credits: u32,
    /// Lecture periods per week.
    pub lecture_hours: u32,
    /// Tutorial periods per week.
    pub tutorial_hours: u32,
    /// Lab periods per week.
    pub lab_hours: u32,
    /// Registered students.
    pub enrolled_students: u32,
    /// Eligible instructor ids, in preference order.
    pub instructors: Vec<String>,
    /// Codes of courses that may not be taken together with this one.
    pub incompatible_courses: BTreeSet<String>,
    /// Whether the course has a comprehensive examination.
    pub has_comprehensive: bool,
}

impl Course {
    /// Creates a course with no hours and no instructors.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            credits: 0,
            lecture_hours: 0,
            tutorial_hours: 0,
            lab_hours: 0,
            enrolled_students: 0,
            instructors: Vec::new(),
            incompatible_courses: BTreeSet::new(),
            has_comprehensive: false,
        }
    }

    /// Sets credit units.
    pub fn with_credits(mut self, credits: u32) -> Self {
        self.credits = credits;
        self
    }

    /// Sets weekly lecture hours.
    pub fn with_lecture_hours(mut self, hours: u32) -> Self {
        self.lecture_hours = hours;
        self
    }

    /// Sets weekly tutorial hours.
    pub fn with_tutorial_hours(mut self, hours: u32) -> Self {
        self.tutorial_hours = hours;
        self
    }

    /// Sets weekly lab hours.
    pub fn with_lab_hours(mut self, hours: u32) -> Self {
        self.lab_hours = hours;
        self
    }

    /// Sets enrolment.
    pub fn with_enrollment(mut self, students: u32) -> Self {
        self.enrolled_students = students;
        self
    }

    /// Adds an eligible instructor (ignored if already listed).
    pub fn with_instructor(mut self, instructor_id: impl Into<String>) -> Self {
        self.add_instructor(instructor_id);
        self
    }

    /// Marks another course as incompatible.
    pub fn with_incompatible(mut self, course_code: impl Into<String>) -> Self {
        self.incompatible_courses.insert(course_code.into());
        self
    }

    /// Sets the comprehensive-exam flag.
    pub fn with_comprehensive(mut self, has: bool) -> Self {
        self.has_comprehensive = has;
        self
    }

    /// Adds an eligible instructor, keeping list order and uniqueness.
    pub fn add_instructor(&mut self, instructor_id: impl Into<String>) {
        let id = instructor_id.into();
        if !self.instructors.contains(&id) {
            self.instructors.push(id);
        }
    }

    /// Required weekly hours for a session kind.
    pub fn hours_for(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Lecture => self.lecture_hours,
            SessionKind::Tutorial => self.tutorial_hours,
            SessionKind::Lab => self.lab_hours,
        }
    }

    /// Whether the course needs lab blocks.
    pub fn needs_lab(&self) -> bool {
        self.lab_hours > 0
    }

    /// Whether either course lists the other as incompatible.
    pub fn conflicts_with(&self, other: &Course) -> bool {
        self.incompatible_courses.contains(&other.code)
            || other.incompatible_courses.contains(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_builder() {
        let c = Course::new("CS F213", "Object Oriented Programming")
            .with_credits(4)
            .with_lecture_hours(3)
            .with_tutorial_hours(1)
            .with_lab_hours(2)
            .with_enrollment(120)
            .with_instructor("I1")
            .with_instructor("I2")
            .with_instructor("I1");

        assert_eq!(c.code, "CS F213");
        assert_eq!(c.credits, 4);
        assert_eq!(c.instructors, vec!["I1".to_string(), "I2".to_string()]);
        assert_eq!(c.hours_for(SessionKind::Lecture), 3);
        assert_eq!(c.hours_for(SessionKind::Tutorial), 1);
        assert_eq!(c.hours_for(SessionKind::Lab), 2);
        assert!(c.needs_lab());
    }

    #[test]
    fn test_conflicts_with_is_symmetric() {
        let a = Course::new("MATH F111", "Calculus").with_incompatible("MATH F112");
        let b = Course::new("MATH F112", "Linear Algebra");
        let c = Course::new("BIO F110", "Biology");

        assert!(a.conflicts_with(&b));
        assert!(b.conflicts_with(&a));
        assert!(!a.conflicts_with(&c));
    }
}
