//! Schedule quality report.
//!
//! Summarizes a finished schedule for display or logging.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Occupied cells | Cells holding a session |
//! | Sessions by kind | Lectures, tutorials, lab blocks (heads only) |
//! | Utilization | occupied / unlocked cells |
//! | Load per instructor / room | Occupied cells per id |
//! | Conflicts | [`ConflictBreakdown`] |
//! | Fitness | `1 - conflicts / cells` |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constraints::{ConflictBreakdown, ConflictChecker};
use crate::ga::fitness::score;
use crate::models::{Schedule, SessionKind};

/// Schedule quality indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Cells holding a session.
    pub occupied_cells: usize,
    /// Lecture cells.
    pub lectures: usize,
    /// Tutorial cells.
    pub tutorials: usize,
    /// Lab blocks (counted by head cell).
    pub lab_blocks: usize,
    /// Occupied fraction of unlocked cells (0.0..1.0).
    pub utilization: f64,
    /// Occupied cells per instructor.
    pub instructor_load: BTreeMap<String, usize>,
    /// Occupied cells per room.
    pub room_usage: BTreeMap<String, usize>,
    /// Conflicts by category.
    pub conflicts: ConflictBreakdown,
    /// Same value the optimizer maximizes.
    pub fitness: f64,
}

impl ScheduleSummary {
    /// Computes the summary of `schedule` under `checker`'s rules.
    pub fn calculate(schedule: &Schedule, checker: &ConflictChecker) -> Self {
        let mut lectures = 0;
        let mut tutorials = 0;
        let mut lab_blocks = 0;
        let mut instructor_load: BTreeMap<String, usize> = BTreeMap::new();
        let mut room_usage: BTreeMap<String, usize> = BTreeMap::new();

        for session in schedule.occupied().filter_map(|s| s.session.as_ref()) {
            match session.kind {
                SessionKind::Lecture => lectures += 1,
                SessionKind::Tutorial => tutorials += 1,
                SessionKind::Lab if session.is_head() => lab_blocks += 1,
                SessionKind::Lab => {}
            }
            *instructor_load
                .entry(session.instructor_id.clone())
                .or_default() += 1;
            *room_usage.entry(session.room_id.clone()).or_default() += 1;
        }

        let occupied_cells = schedule.occupied_count();
        let open_cells = schedule.slots().iter().filter(|s| !s.locked).count();
        let utilization = if open_cells == 0 {
            0.0
        } else {
            occupied_cells as f64 / open_cells as f64
        };

        let conflicts = checker.count_conflicts(schedule);
        let fitness = score(&conflicts, schedule.cell_count());

        Self {
            occupied_cells,
            lectures,
            tutorials,
            lab_blocks,
            utilization,
            instructor_load,
            room_usage,
            conflicts,
            fitness,
        }
    }

    /// Whether the schedule has no conflicts.
    pub fn is_conflict_free(&self) -> bool {
        self.conflicts.is_clean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConstraintConfig;
    use crate::constraints::{ConstraintPolicy, Placement};
    use crate::models::Session;

    fn checker() -> ConflictChecker {
        ConflictChecker::new(ConstraintPolicy::new(ConstraintConfig::default()))
    }

    #[test]
    fn test_summary_counts() {
        let c = checker();
        let mut s = Schedule::new("t", &ConstraintConfig::default());
        c.place(&mut s, &Placement::new("CS F213", "D101", "I1", 0, 0, SessionKind::Lab))
            .unwrap();
        c.place(&mut s, &Placement::new("MATH F111", "F102", "I2", 2, 3, SessionKind::Lecture))
            .unwrap();
        c.place(&mut s, &Placement::new("CS F111", "F102", "I1", 4, 7, SessionKind::Tutorial))
            .unwrap();

        let summary = ScheduleSummary::calculate(&s, &c);
        assert_eq!(summary.occupied_cells, 4);
        assert_eq!(summary.lab_blocks, 1);
        assert_eq!(summary.lectures, 1);
        assert_eq!(summary.tutorials, 1);
        assert_eq!(summary.instructor_load["I1"], 3);
        assert_eq!(summary.room_usage["F102"], 2);
        // 45 cells, 10 lunch-locked
        assert!((summary.utilization - 4.0 / 35.0).abs() < 1e-12);
        assert!(summary.is_conflict_free());
        assert!((summary.fitness - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_reports_conflicts() {
        let c = checker();
        let mut s = Schedule::new("t", &ConstraintConfig::default());
        s.set_slot(0, 4, Some(Session::new("A", "F102", "I1", SessionKind::Lecture)))
            .unwrap();

        let summary = ScheduleSummary::calculate(&s, &c);
        assert_eq!(summary.conflicts.lunch, 1);
        assert!(!summary.is_conflict_free());
        assert!((summary.fitness - (1.0 - 1.0 / 45.0)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_summary() {
        let s = Schedule::new("t", &ConstraintConfig::default());
        let summary = ScheduleSummary::calculate(&s, &checker());
        assert_eq!(summary.occupied_cells, 0);
        assert_eq!(summary.utilization, 0.0);
        assert!(summary.instructor_load.is_empty());
    }
}
