//! Randomized constructive allocator.
//!
//! # Algorithm
//!
//! 1. **Labs**: for each course with lab hours, sample a day and a start
//!    period whose block avoids lunch and fits the day; accept the first
//!    (instructor, lab room) pair the conflict checker approves.
//! 2. **Lectures**: for each course, sample single periods outside lunch on
//!    days that keep the course's day spacing; first feasible
//!    (instructor, non-lab room) pair wins.
//! 3. **Tutorials**: same as lectures, against the tutorial cap.
//!
//! Each course gets a bounded number of attempts. A requirement that cannot
//! be met is reported as an [`UnmetRequirement`], never as an error.
//!
//! # Complexity
//! O(c · a · i · r · n) where c=courses, a=attempts, i=instructors,
//! r=rooms, n=grid cells (allocation queries scan the grid).

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{AllocatorConfig, ConstraintConfig};
use crate::constraints::{write_session, ConflictChecker, Placement};
use crate::engine::CancelToken;
use crate::error::EngineError;
use crate::models::{Catalog, Classroom, Course, Instructor, Schedule, SessionKind};

/// Why a requirement was left open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnmetReason {
    /// No room of the right kind seats the course.
    NoSuitableRoom,
    /// None of the course's instructors is known and under the cap.
    NoEligibleInstructor,
    /// The attempt budget ran out.
    AttemptsExhausted,
}

/// A session requirement the allocator could not fully place.
///
/// Counts are in sessions: single periods for lectures and tutorials,
/// blocks for labs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmetRequirement {
    pub course_code: String,
    pub kind: SessionKind,
    pub required: u32,
    pub placed: u32,
    pub reason: UnmetReason,
}

impl UnmetRequirement {
    /// Sessions still missing.
    pub fn shortfall(&self) -> u32 {
        self.required.saturating_sub(self.placed)
    }
}

/// Builds an initial schedule phase by phase.
#[derive(Debug, Clone)]
pub struct Allocator {
    checker: ConflictChecker,
    config: AllocatorConfig,
}

impl Allocator {
    /// Creates an allocator.
    pub fn new(checker: ConflictChecker, config: AllocatorConfig) -> Self {
        Self { checker, config }
    }

    fn constraints(&self) -> &ConstraintConfig {
        self.checker.policy().config()
    }

    /// Runs all three phases in order.
    ///
    /// `instructors` is the run-local copy whose counters are incremented.
    pub fn allocate<R: Rng>(
        &self,
        schedule: &mut Schedule,
        catalog: &Catalog,
        instructors: &mut BTreeMap<String, Instructor>,
        rng: &mut R,
        cancel: &CancelToken,
    ) -> Result<Vec<UnmetRequirement>, EngineError> {
        let mut unmet = self.allocate_labs(schedule, catalog, instructors, rng, cancel)?;
        unmet.extend(self.allocate_lectures(schedule, catalog, instructors, rng, cancel)?);
        unmet.extend(self.allocate_tutorials(schedule, catalog, instructors, rng, cancel)?);
        Ok(unmet)
    }

    /// Places lab blocks for every course with lab hours.
    pub fn allocate_labs<R: Rng>(
        &self,
        schedule: &mut Schedule,
        catalog: &Catalog,
        instructors: &mut BTreeMap<String, Instructor>,
        rng: &mut R,
        cancel: &CancelToken,
    ) -> Result<Vec<UnmetRequirement>, EngineError> {
        let mut unmet = Vec::new();
        let starts = self.lab_start_periods();

        for course in catalog.courses.values().filter(|c| c.needs_lab()) {
            cancel.check()?;
            let duration = self.constraints().lab_duration as u32;
            let required = (course.lab_hours / duration).max(1);
            let rooms = suitable_rooms(catalog, course, SessionKind::Lab);

            let outcome = self.place_sessions(
                schedule,
                course,
                &rooms,
                instructors,
                SessionKind::Lab,
                required,
                self.config.lab_attempts,
                rng,
                |rng| {
                    if starts.is_empty() {
                        None
                    } else {
                        Some(starts[rng.random_range(0..starts.len())])
                    }
                },
            )?;
            if let Some(req) = outcome {
                unmet.push(req);
            }
        }
        Ok(unmet)
    }

    /// Places lecture periods for every course with lecture hours.
    pub fn allocate_lectures<R: Rng>(
        &self,
        schedule: &mut Schedule,
        catalog: &Catalog,
        instructors: &mut BTreeMap<String, Instructor>,
        rng: &mut R,
        cancel: &CancelToken,
    ) -> Result<Vec<UnmetRequirement>, EngineError> {
        self.allocate_single_period(
            schedule,
            catalog,
            instructors,
            rng,
            cancel,
            SessionKind::Lecture,
            self.config.lecture_attempts,
        )
    }

    /// Places tutorial periods for every course with tutorial hours.
    pub fn allocate_tutorials<R: Rng>(
        &self,
        schedule: &mut Schedule,
        catalog: &Catalog,
        instructors: &mut BTreeMap<String, Instructor>,
        rng: &mut R,
        cancel: &CancelToken,
    ) -> Result<Vec<UnmetRequirement>, EngineError> {
        self.allocate_single_period(
            schedule,
            catalog,
            instructors,
            rng,
            cancel,
            SessionKind::Tutorial,
            self.config.tutorial_attempts,
        )
    }

    /// Lab start periods whose block fits the day and avoids lunch.
    pub fn lab_start_periods(&self) -> Vec<usize> {
        let c = self.constraints();
        if c.lab_duration > c.periods_per_day {
            return Vec::new();
        }
        (0..=c.periods_per_day - c.lab_duration)
            .filter(|&p| (p..p + c.lab_duration).all(|q| !c.is_lunch(q)))
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn allocate_single_period<R: Rng>(
        &self,
        schedule: &mut Schedule,
        catalog: &Catalog,
        instructors: &mut BTreeMap<String, Instructor>,
        rng: &mut R,
        cancel: &CancelToken,
        kind: SessionKind,
        attempts: usize,
    ) -> Result<Vec<UnmetRequirement>, EngineError> {
        let mut unmet = Vec::new();
        let periods = self.constraints().periods_per_day;

        for course in catalog.courses.values() {
            let required = course.hours_for(kind);
            if required == 0 {
                continue;
            }
            cancel.check()?;
            let rooms = suitable_rooms(catalog, course, kind);

            let outcome = self.place_sessions(
                schedule,
                course,
                &rooms,
                instructors,
                kind,
                required,
                attempts,
                rng,
                |rng| Some(rng.random_range(0..periods)),
            )?;
            if let Some(req) = outcome {
                unmet.push(req);
            }
        }
        Ok(unmet)
    }

    /// Shared retry loop for one course and one session kind.
    ///
    /// Samples a day and a start period per attempt, skipping lunch starts
    /// and days that would break course spacing, then tries instructors
    /// (still under the cap) × rooms in order.
    #[allow(clippy::too_many_arguments)]
    fn place_sessions<R: Rng>(
        &self,
        schedule: &mut Schedule,
        course: &Course,
        rooms: &[&Classroom],
        instructors: &mut BTreeMap<String, Instructor>,
        kind: SessionKind,
        required: u32,
        attempts: usize,
        rng: &mut R,
        mut sample_period: impl FnMut(&mut R) -> Option<usize>,
    ) -> Result<Option<UnmetRequirement>, EngineError> {
        let constraints = self.constraints();
        let unmet = |placed: u32, reason: UnmetReason| {
            warn!(
                course = %course.code,
                %kind,
                required,
                placed,
                ?reason,
                "requirement left unmet"
            );
            UnmetRequirement {
                course_code: course.code.clone(),
                kind,
                required,
                placed,
                reason,
            }
        };

        if rooms.is_empty() {
            return Ok(Some(unmet(0, UnmetReason::NoSuitableRoom)));
        }
        let eligible = eligible_instructors(course, instructors, kind, constraints);
        if eligible.is_empty() {
            return Ok(Some(unmet(0, UnmetReason::NoEligibleInstructor)));
        }

        let mut placed = 0u32;
        let mut tries = 0usize;
        while placed < required && tries < attempts {
            tries += 1;
            let day = rng.random_range(0..constraints.days);
            let Some(period) = sample_period(rng) else {
                break;
            };
            if constraints.is_lunch(period) {
                continue;
            }
            if self.checker.has_course_conflict(schedule, &course.code, day) {
                continue;
            }

            let available: Vec<&String> = eligible
                .iter()
                .filter(|id| {
                    instructors
                        .get(id.as_str())
                        .is_some_and(|i| i.can_teach(kind, constraints))
                })
                .collect();
            if available.is_empty() {
                return Ok(Some(unmet(placed, UnmetReason::NoEligibleInstructor)));
            }

            let found = available.iter().find_map(|instructor_id| {
                rooms.iter().find_map(|room| {
                    let placement = Placement::new(
                        course.code.as_str(),
                        room.room_number.as_str(),
                        instructor_id.as_str(),
                        day,
                        period,
                        kind,
                    );
                    self.checker
                        .is_valid_allocation(schedule, &placement)
                        .then_some(placement)
                })
            });

            if let Some(placement) = found {
                write_session(schedule, &placement, constraints)?;
                if let Some(instructor) = instructors.get_mut(&placement.instructor_id) {
                    instructor.assign(course.code.as_str(), kind);
                }
                placed += 1;
                debug!(
                    course = %course.code,
                    %kind,
                    day,
                    period,
                    room = %placement.room_id,
                    instructor = %placement.instructor_id,
                    "session placed"
                );
            }
        }

        if placed < required {
            Ok(Some(unmet(placed, UnmetReason::AttemptsExhausted)))
        } else {
            Ok(None)
        }
    }
}

/// Rooms that can host `kind` sessions of `course`.
///
/// Labs go to lab rooms; lectures and tutorials go to non-lab rooms.
pub fn suitable_rooms<'a>(catalog: &'a Catalog, course: &Course, kind: SessionKind) -> Vec<&'a Classroom> {
    catalog
        .classrooms
        .values()
        .filter(|room| room.can_host(course, kind))
        .filter(|room| kind == SessionKind::Lab || !room.is_lab)
        .collect()
}

/// The course's instructors, in list order, known to `instructors` and
/// under the cap for `kind`.
pub fn eligible_instructors(
    course: &Course,
    instructors: &BTreeMap<String, Instructor>,
    kind: SessionKind,
    config: &ConstraintConfig,
) -> Vec<String> {
    course
        .instructors
        .iter()
        .filter(|id| {
            instructors
                .get(id.as_str())
                .is_some_and(|i| i.can_teach(kind, config))
        })
        .cloned()
        .collect()
}
