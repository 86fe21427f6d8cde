//! Entity snapshot handed to the engine.
//!
//! Ordered maps keep iteration deterministic, which seeded runs rely on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Classroom, Course, Instructor};

/// Courses, instructors and rooms for one scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Course code → course.
    pub courses: BTreeMap<String, Course>,
    /// Instructor id → instructor.
    pub instructors: BTreeMap<String, Instructor>,
    /// Room number → classroom.
    pub classrooms: BTreeMap<String, Classroom>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course keyed by its code.
    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.insert(course.code.clone(), course);
        self
    }

    /// Adds an instructor keyed by id.
    pub fn with_instructor(mut self, instructor: Instructor) -> Self {
        self.instructors.insert(instructor.id.clone(), instructor);
        self
    }

    /// Adds a classroom keyed by room number.
    pub fn with_classroom(mut self, classroom: Classroom) -> Self {
        self.classrooms.insert(classroom.room_number.clone(), classroom);
        self
    }

    /// Looks up a course.
    pub fn course(&self, code: &str) -> Option<&Course> {
        self.courses.get(code)
    }

    /// Looks up an instructor.
    pub fn instructor(&self, id: &str) -> Option<&Instructor> {
        self.instructors.get(id)
    }

    /// Looks up a classroom.
    pub fn classroom(&self, room_number: &str) -> Option<&Classroom> {
        self.classrooms.get(room_number)
    }

    /// Zeroes every instructor's load counters.
    pub fn reset_instructor_loads(&mut self) {
        for instructor in self.instructors.values_mut() {
            instructor.reset_load();
        }
    }
}
