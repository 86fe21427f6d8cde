//! Instructor model.
//!
//! Instructors carry per-kind load counters that the allocator increments as
//! sessions are placed. The engine works on a per-run copy, so the caller's
//! snapshot is never mutated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::SessionKind;
use crate::config::ConstraintConfig;

/// A teaching staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    /// Unique instructor id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Lecture sessions assigned so far.
    pub lectures_assigned: u32,
    /// Tutorial sessions assigned so far.
    pub tutorials_assigned: u32,
    /// Lab sessions assigned so far.
    pub labs_assigned: u32,
    /// Courses this instructor has sessions in.
    pub assigned_courses: BTreeSet<String>,
}

impl Instructor {
    /// Creates an instructor with zero load.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lectures_assigned: 0,
            tutorials_assigned: 0,
            labs_assigned: 0,
            assigned_courses: BTreeSet::new(),
        }
    }

    /// Records one session of `kind` in `course_code`.
    pub fn assign(&mut self, course_code: impl Into<String>, kind: SessionKind) {
        self.assigned_courses.insert(course_code.into());
        match kind {
            SessionKind::Lecture => self.lectures_assigned += 1,
            SessionKind::Tutorial => self.tutorials_assigned += 1,
            SessionKind::Lab => self.labs_assigned += 1,
        }
    }

    /// Sessions of `kind` assigned so far.
    pub fn count_for(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Lecture => self.lectures_assigned,
            SessionKind::Tutorial => self.tutorials_assigned,
            SessionKind::Lab => self.labs_assigned,
        }
    }

    /// Whether another session of `kind` stays within the cap.
    pub fn can_teach(&self, kind: SessionKind, config: &ConstraintConfig) -> bool {
        self.count_for(kind) < config.workload_cap(kind)
    }

    /// Total sessions across all kinds.
    pub fn total_load(&self) -> u32 {
        self.lectures_assigned + self.tutorials_assigned + self.labs_assigned
    }

    /// Clears counters and course assignments.
    pub fn reset_load(&mut self) {
        self.lectures_assigned = 0;
        self.tutorials_assigned = 0;
        self.labs_assigned = 0;
        self.assigned_courses.clear();
    }
}
