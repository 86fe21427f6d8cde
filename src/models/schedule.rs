//! Weekly schedule grid.
//!
//! A schedule is a fixed `days × periods_per_day` grid of slots stored as a
//! flat vector indexed by `day * periods_per_day + period`. Lunch cells are
//! locked at construction. Cloning copies every slot, so population members
//! never share state.
//!
//! Deserialization re-checks the grid shape, slot coordinates and lunch
//! locks, so a reloaded schedule upholds the same invariants as a built one.

use serde::{Deserialize, Serialize};
use std::ops::{Index, Range};

use super::Session;
use crate::config::ConstraintConfig;
use crate::error::ScheduleError;

/// One (day, period) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Day index.
    pub day: usize,
    /// Period index.
    pub period: usize,
    /// Cell may never be occupied or swapped.
    pub locked: bool,
    /// Occupying session, if any.
    pub session: Option<Session>,
}

impl Slot {
    /// Creates an empty, unlocked slot.
    pub fn new(day: usize, period: usize) -> Self {
        Self {
            day,
            period,
            locked: false,
            session: None,
        }
    }

    /// Not locked and unoccupied.
    pub fn is_free(&self) -> bool {
        !self.locked && self.session.is_none()
    }

    /// Whether a session occupies this cell.
    pub fn is_occupied(&self) -> bool {
        self.session.is_some()
    }

    /// Places `session` unless the slot is locked. Returns whether it was written.
    pub fn allocate(&mut self, session: Session) -> bool {
        if self.locked {
            return false;
        }
        self.session = Some(session);
        true
    }

    /// Removes and returns the occupying session.
    pub fn clear(&mut self) -> Option<Session> {
        self.session.take()
    }

    /// Course code of the occupying session.
    pub fn course_code(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.course_code.as_str())
    }

    /// Room of the occupying session.
    pub fn room_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.room_id.as_str())
    }

    /// Instructor of the occupying session.
    pub fn instructor_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.instructor_id.as_str())
    }

    /// Same course, room and instructor (ignores coordinates and lock).
    pub fn same_content(&self, other: &Slot) -> bool {
        self.session == other.session
    }
}

/// A weekly timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchedule")]
pub struct Schedule {
    /// Display name.
    pub name: String,
    days: usize,
    periods_per_day: usize,
    /// Periods locked on every day.
    lunch: Range<usize>,
    slots: Vec<Slot>,
}

/// Unchecked wire form of [`Schedule`].
#[derive(Deserialize)]
struct RawSchedule {
    name: String,
    days: usize,
    periods_per_day: usize,
    lunch: Range<usize>,
    slots: Vec<Slot>,
}

impl TryFrom<RawSchedule> for Schedule {
    type Error = ScheduleError;

    fn try_from(raw: RawSchedule) -> Result<Self, Self::Error> {
        let expected = raw.days.checked_mul(raw.periods_per_day).unwrap_or(usize::MAX);
        if raw.slots.len() != expected {
            return Err(ScheduleError::GridShape {
                days: raw.days,
                periods: raw.periods_per_day,
                expected,
                found: raw.slots.len(),
            });
        }
        for (index, slot) in raw.slots.iter().enumerate() {
            let (day, period) = (index / raw.periods_per_day, index % raw.periods_per_day);
            if (slot.day, slot.period) != (day, period) {
                return Err(ScheduleError::MisplacedSlot {
                    index,
                    day: slot.day,
                    period: slot.period,
                });
            }
            if raw.lunch.contains(&period) && !slot.locked {
                return Err(ScheduleError::UnlockedLunchSlot { day, period });
            }
        }
        Ok(Self {
            name: raw.name,
            days: raw.days,
            periods_per_day: raw.periods_per_day,
            lunch: raw.lunch,
            slots: raw.slots,
        })
    }
}

impl Schedule {
    /// Creates an empty grid shaped by `config`, with lunch cells locked.
    pub fn new(name: impl Into<String>, config: &ConstraintConfig) -> Self {
        Self::with_dimensions(
            name,
            config.days,
            config.periods_per_day,
            config.lunch_start..config.lunch_end,
        )
    }

    /// Creates an empty grid with explicit dimensions and locked range.
    pub fn with_dimensions(
        name: impl Into<String>,
        days: usize,
        periods_per_day: usize,
        locked_periods: Range<usize>,
    ) -> Self {
        let mut slots = Vec::with_capacity(days * periods_per_day);
        for day in 0..days {
            for period in 0..periods_per_day {
                let mut slot = Slot::new(day, period);
                slot.locked = locked_periods.contains(&period);
                slots.push(slot);
            }
        }
        Self {
            name: name.into(),
            days,
            periods_per_day,
            lunch: locked_periods,
            slots,
        }
    }

    /// Number of days.
    pub fn days(&self) -> usize {
        self.days
    }

    /// Number of periods per day.
    pub fn periods_per_day(&self) -> usize {
        self.periods_per_day
    }

    /// Periods locked on every day.
    pub fn lunch_periods(&self) -> Range<usize> {
        self.lunch.clone()
    }

    /// Total cells.
    pub fn cell_count(&self) -> usize {
        self.slots.len()
    }

    /// Flat index of (day, period).
    pub fn index_of(&self, day: usize, period: usize) -> Result<usize, ScheduleError> {
        if day >= self.days || period >= self.periods_per_day {
            return Err(ScheduleError::OutOfRange {
                day,
                period,
                days: self.days,
                periods: self.periods_per_day,
            });
        }
        Ok(day * self.periods_per_day + period)
    }

    /// Slot at (day, period).
    pub fn get_slot(&self, day: usize, period: usize) -> Result<&Slot, ScheduleError> {
        let idx = self.index_of(day, period)?;
        Ok(&self.slots[idx])
    }

    /// Mutable slot at (day, period).
    pub fn get_slot_mut(&mut self, day: usize, period: usize) -> Result<&mut Slot, ScheduleError> {
        let idx = self.index_of(day, period)?;
        Ok(&mut self.slots[idx])
    }

    /// Overwrites the occupant of (day, period). Does not consult `locked`.
    pub fn set_slot(
        &mut self,
        day: usize,
        period: usize,
        session: Option<Session>,
    ) -> Result<(), ScheduleError> {
        self.get_slot_mut(day, period)?.session = session;
        Ok(())
    }

    /// All slots in row-major (day, then period) order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Slots of one day.
    pub fn day_slots(&self, day: usize) -> Result<&[Slot], ScheduleError> {
        let start = self.index_of(day, 0)?;
        Ok(&self.slots[start..start + self.periods_per_day])
    }

    /// Whether (day, period) exists, is unlocked and unoccupied.
    pub fn is_free(&self, day: usize, period: usize) -> bool {
        self.get_slot(day, period).map(Slot::is_free).unwrap_or(false)
    }

    /// Occupied slots in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.is_occupied())
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }

    /// Occupied slots whose course code equals `course_code`.
    pub fn course_allocations(&self, course_code: &str) -> Vec<&Slot> {
        self.occupied()
            .filter(|s| s.course_code() == Some(course_code))
            .collect()
    }

    /// Occupied slots held in `room_id`.
    pub fn room_allocations(&self, room_id: &str) -> Vec<&Slot> {
        self.occupied()
            .filter(|s| s.room_id() == Some(room_id))
            .collect()
    }

    /// Occupied slots taught by `instructor_id`.
    pub fn instructor_allocations(&self, instructor_id: &str) -> Vec<&Slot> {
        self.occupied()
            .filter(|s| s.instructor_id() == Some(instructor_id))
            .collect()
    }

    /// Exchanges the sessions of two cells by flat index. Lock flags stay put.
    pub fn swap_sessions(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let taken = self.slots[a].session.take();
        self.slots[a].session = self.slots[b].session.take();
        self.slots[b].session = taken;
    }

    /// Replaces this grid's contents with a copy of `other`'s, keeping the name.
    pub fn copy_grid_from(&mut self, other: &Schedule) {
        self.days = other.days;
        self.periods_per_day = other.periods_per_day;
        self.lunch = other.lunch.clone();
        self.slots.clone_from(&other.slots);
    }

    /// Copies the cell at flat index `idx` (session and lock) from `source`.
    pub(crate) fn copy_cell_from(&mut self, idx: usize, source: &Schedule) {
        let src = &source.slots[idx];
        let dst = &mut self.slots[idx];
        dst.locked = src.locked;
        dst.session.clone_from(&src.session);
    }
}

/// Fail-fast access: panics on out-of-range coordinates.
impl Index<(usize, usize)> for Schedule {
    type Output = Slot;

    fn index(&self, (day, period): (usize, usize)) -> &Slot {
        match self.get_slot(day, period) {
            Ok(slot) => slot,
            Err(e) => panic!("{e}"),
        }
    }
}
