//! Feasibility oracle over a schedule.
//!
//! A session occupies the periods it covers: a lab head at `q` covers
//! `[q, q + lab_duration)`, every other occupied cell covers only its own
//! period. Two cells of the same lab block never conflict with each other.
//!
//! The allocator asks [`ConflictChecker::is_valid_allocation`] before every
//! write; the optimizer scores individuals with
//! [`ConflictChecker::count_conflicts`].

use serde::{Deserialize, Serialize};

use super::{ConstraintPolicy, Violation};
use crate::config::ConstraintConfig;
use crate::error::ScheduleError;
use crate::models::{Schedule, Session, SessionKind, Slot};

/// A candidate session placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub course_code: String,
    pub room_id: String,
    pub instructor_id: String,
    pub day: usize,
    /// First period of the session.
    pub period: usize,
    pub kind: SessionKind,
}

impl Placement {
    /// Creates a placement.
    pub fn new(
        course_code: impl Into<String>,
        room_id: impl Into<String>,
        instructor_id: impl Into<String>,
        day: usize,
        period: usize,
        kind: SessionKind,
    ) -> Self {
        Self {
            course_code: course_code.into(),
            room_id: room_id.into(),
            instructor_id: instructor_id.into(),
            day,
            period,
            kind,
        }
    }

    /// Head session written at `period`.
    pub fn session(&self) -> Session {
        Session::new(
            self.course_code.clone(),
            self.room_id.clone(),
            self.instructor_id.clone(),
            self.kind,
        )
    }
}

/// Per-category conflict counts for a whole schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictBreakdown {
    /// Occupied cells inside the lunch window.
    pub lunch: usize,
    /// Cells whose instructor is also busy in another overlapping cell.
    pub instructor: usize,
    /// Cells whose room is also booked in another overlapping cell.
    pub room: usize,
    /// Cells sharing a course with another cell on a nearby day.
    pub course_spacing: usize,
}

impl ConflictBreakdown {
    /// Sum over all categories.
    pub fn total(&self) -> usize {
        self.lunch + self.instructor + self.room + self.course_spacing
    }

    /// No conflicts of any kind.
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// Room, instructor, spacing and lunch checks against a schedule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictChecker {
    policy: ConstraintPolicy,
}

impl ConflictChecker {
    /// Creates a checker over a policy.
    pub fn new(policy: ConstraintPolicy) -> Self {
        Self { policy }
    }

    /// The rule set.
    pub fn policy(&self) -> &ConstraintPolicy {
        &self.policy
    }

    fn config(&self) -> &ConstraintConfig {
        self.policy.config()
    }

    fn covers(&self, slot: &Slot, period: usize) -> bool {
        match &slot.session {
            Some(session) => {
                slot.period <= period && period < slot.period + session.coverage(self.config())
            }
            None => false,
        }
    }

    /// Whether any allocation of `room_id` on `day` covers `period`.
    pub fn has_room_conflict(&self, schedule: &Schedule, room_id: &str, day: usize, period: usize) -> bool {
        schedule
            .room_allocations(room_id)
            .iter()
            .any(|s| s.day == day && self.covers(s, period))
    }

    /// Whether any allocation of `instructor_id` on `day` covers `period`.
    pub fn has_instructor_conflict(
        &self,
        schedule: &Schedule,
        instructor_id: &str,
        day: usize,
        period: usize,
    ) -> bool {
        schedule
            .instructor_allocations(instructor_id)
            .iter()
            .any(|s| s.day == day && self.covers(s, period))
    }

    /// Whether the course already meets on a day within the gap of `day`.
    pub fn has_course_conflict(&self, schedule: &Schedule, course_code: &str, day: usize) -> bool {
        !self
            .policy
            .lecture_spacing_ok(&schedule.course_allocations(course_code), day)
    }

    /// Whether `placement` can be written without breaking a hard rule.
    ///
    /// Every period of the session's span must be inside the day, outside
    /// lunch, free, and clear of room and instructor bookings.
    pub fn is_valid_allocation(&self, schedule: &Schedule, placement: &Placement) -> bool {
        let span = placement.kind.span(self.config());
        if placement.day >= schedule.days() || placement.period + span > schedule.periods_per_day() {
            return false;
        }
        (placement.period..placement.period + span).all(|p| {
            self.policy.is_valid_lunch_break(p)
                && schedule.is_free(placement.day, p)
                && !self.has_room_conflict(schedule, &placement.room_id, placement.day, p)
                && !self.has_instructor_conflict(schedule, &placement.instructor_id, placement.day, p)
        })
    }

    /// Explains why `placement` would be rejected, checking course spacing too.
    pub fn validate_placement(&self, schedule: &Schedule, placement: &Placement) -> Result<(), Violation> {
        let Placement { day, period, .. } = *placement;
        let span = placement.kind.span(self.config());

        if day >= schedule.days() || period >= schedule.periods_per_day() {
            return Err(Violation::SlotUnavailable { day, period });
        }
        if period + span > schedule.periods_per_day() {
            return Err(Violation::LabDuration {
                actual: schedule.periods_per_day() - period,
            });
        }
        for p in period..period + span {
            self.policy.validate_lunch_break(p)?;
            if !schedule.is_free(day, p) {
                return Err(Violation::SlotUnavailable { day, period: p });
            }
            if self.has_room_conflict(schedule, &placement.room_id, day, p) {
                return Err(Violation::RoomDoubleBooked {
                    room_id: placement.room_id.clone(),
                    day,
                    period: p,
                });
            }
            if self.has_instructor_conflict(schedule, &placement.instructor_id, day, p) {
                return Err(Violation::InstructorDoubleBooked {
                    instructor_id: placement.instructor_id.clone(),
                    day,
                    period: p,
                });
            }
        }
        self.policy.validate_lecture_spacing(
            &placement.course_code,
            &schedule.course_allocations(&placement.course_code),
            day,
        )
    }

    /// Validates, then writes every cell of the placement's span.
    pub fn place(&self, schedule: &mut Schedule, placement: &Placement) -> Result<(), Violation> {
        self.validate_placement(schedule, placement)?;
        write_session(schedule, placement, self.config()).map_err(|_| Violation::SlotUnavailable {
            day: placement.day,
            period: placement.period,
        })
    }

    /// Counts conflicts across all occupied cells.
    ///
    /// Each occupied cell contributes at most one count per category, so a
    /// single cell can add up to four.
    pub fn count_conflicts(&self, schedule: &Schedule) -> ConflictBreakdown {
        let config = self.config();
        let occupied: Vec<(&Slot, &Session)> = schedule
            .occupied()
            .filter_map(|s| s.session.as_ref().map(|sess| (s, sess)))
            .collect();

        let mut breakdown = ConflictBreakdown::default();
        for (i, &(slot, session)) in occupied.iter().enumerate() {
            if !self.policy.is_valid_lunch_break(slot.period) {
                breakdown.lunch += 1;
            }

            let mut instructor = false;
            let mut room = false;
            let mut spacing = false;
            for (j, &(other, other_session)) in occupied.iter().enumerate() {
                let same_block = other.day == slot.day
                    && session.same_block(slot.period, other_session, other.period);
                if i == j || same_block {
                    continue;
                }
                if other.day == slot.day {
                    let a_end = slot.period + session.coverage(config);
                    let b_end = other.period + other_session.coverage(config);
                    let overlap = slot.period < b_end && other.period < a_end;
                    if overlap {
                        instructor |= session.instructor_id == other_session.instructor_id;
                        room |= session.room_id == other_session.room_id;
                    }
                }
                if session.course_code == other_session.course_code
                    && slot.day.abs_diff(other.day) <= config.lecture_gap_days
                {
                    spacing = true;
                }
            }
            breakdown.instructor += usize::from(instructor);
            breakdown.room += usize::from(room);
            breakdown.course_spacing += usize::from(spacing);
        }
        breakdown
    }
}

/// Writes a placement's cells without validation. Locked cells are skipped.
pub(crate) fn write_session(
    schedule: &mut Schedule,
    placement: &Placement,
    config: &ConstraintConfig,
) -> Result<(), ScheduleError> {
    let head = placement.session();
    for offset in 0..placement.kind.span(config) {
        schedule
            .get_slot_mut(placement.day, placement.period + offset)?
            .allocate(head.at_part(offset));
    }
    Ok(())
}
