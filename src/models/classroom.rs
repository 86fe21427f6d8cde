//! Classroom model.

use serde::{Deserialize, Serialize};

use super::{Course, SessionKind};

/// A room sessions can be held in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    /// Room number (unique).
    pub room_number: String,
    /// Seats.
    pub capacity: u32,
    /// Whether the room is a laboratory.
    pub is_lab: bool,
    /// Projector / audio equipment.
    pub has_av_equipment: bool,
    /// Number of workstations.
    pub computer_count: u32,
    /// Lab workbenches.
    pub has_workbenches: bool,
}

impl Classroom {
    /// Creates a room, inferring flags from campus room numbering:
    /// `D…` and `I0…` rooms are labs, `F…` rooms carry AV equipment.
    pub fn new(room_number: impl Into<String>, capacity: u32) -> Self {
        let room_number = room_number.into();
        let is_lab = room_number.starts_with('D') || room_number.starts_with("I0");
        let has_av_equipment = room_number.starts_with('F');
        Self {
            room_number,
            capacity,
            is_lab,
            has_av_equipment,
            computer_count: 0,
            has_workbenches: false,
        }
    }

    /// Overrides the lab flag.
    pub fn with_lab(mut self, is_lab: bool) -> Self {
        self.is_lab = is_lab;
        self
    }

    /// Overrides the AV flag.
    pub fn with_av(mut self, has_av: bool) -> Self {
        self.has_av_equipment = has_av;
        self
    }

    /// Sets the workstation count.
    pub fn with_computers(mut self, count: u32) -> Self {
        self.computer_count = count;
        self
    }

    /// Sets the workbench flag.
    pub fn with_workbenches(mut self, has: bool) -> Self {
        self.has_workbenches = has;
        self
    }

    /// Whether the room seats the course's enrolment.
    pub fn seats(&self, course: &Course) -> bool {
        self.capacity >= course.enrolled_students
    }

    /// Whether a `kind` session of `course` can be held here.
    ///
    /// Labs need a lab room; lectures and tutorials only need seats.
    pub fn can_host(&self, course: &Course, kind: SessionKind) -> bool {
        self.seats(course) && (kind != SessionKind::Lab || self.is_lab)
    }
}
