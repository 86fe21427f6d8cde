//! Session kinds and placed sessions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ConstraintConfig;

/// Category of a teaching session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Single-period lecture.
    Lecture,
    /// Single-period tutorial.
    Tutorial,
    /// Multi-period lab block.
    Lab,
}

impl SessionKind {
    /// All kinds, in allocation order.
    pub const ALL: [SessionKind; 3] = [SessionKind::Lab, SessionKind::Lecture, SessionKind::Tutorial];

    /// Consecutive periods one session of this kind occupies.
    pub fn span(self, config: &ConstraintConfig) -> usize {
        match self {
            SessionKind::Lab => config.lab_duration,
            SessionKind::Lecture | SessionKind::Tutorial => 1,
        }
    }

    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Lecture => "lecture",
            SessionKind::Tutorial => "tutorial",
            SessionKind::Lab => "lab",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A course session occupying one grid cell.
///
/// Course, room and instructor are always moved together; a lab block is
/// stored as `span` cells sharing everything but `part`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    /// Course code.
    pub course_code: String,
    /// Room number.
    pub room_id: String,
    /// Instructor id.
    pub instructor_id: String,
    /// Session category.
    pub kind: SessionKind,
    /// Offset within a lab block (0 = first period).
    pub part: usize,
}

impl Session {
    /// Creates the head cell of a session.
    pub fn new(
        course_code: impl Into<String>,
        room_id: impl Into<String>,
        instructor_id: impl Into<String>,
        kind: SessionKind,
    ) -> Self {
        Self {
            course_code: course_code.into(),
            room_id: room_id.into(),
            instructor_id: instructor_id.into(),
            kind,
            part: 0,
        }
    }

    /// Copy of this session at block offset `part`.
    pub fn at_part(&self, part: usize) -> Self {
        Self {
            part,
            ..self.clone()
        }
    }

    /// Whether this cell starts its session.
    pub fn is_head(&self) -> bool {
        self.part == 0
    }

    /// Periods covered starting from this cell.
    ///
    /// A lab head covers the whole block; continuation cells and single-period
    /// sessions cover only their own period.
    pub fn coverage(&self, config: &ConstraintConfig) -> usize {
        if self.is_head() {
            self.kind.span(config)
        } else {
            1
        }
    }

    /// Whether `self` at `period` and `other` at `other_period` belong to the
    /// same lab block, assuming both cells lie on the same day.
    pub fn same_block(&self, period: usize, other: &Session, other_period: usize) -> bool {
        self.kind == SessionKind::Lab
            && other.kind == SessionKind::Lab
            && self.course_code == other.course_code
            && self.room_id == other.room_id
            && self.instructor_id == other.instructor_id
            && period.checked_sub(self.part) == other_period.checked_sub(other.part)
            && period.checked_sub(self.part).is_some()
    }
}
