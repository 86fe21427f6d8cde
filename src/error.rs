//! Error types.
//!
//! Domain rule violations live in [`crate::constraints::Violation`]; the
//! types here cover programming errors (bad coordinates), bad configuration
//! and aborted runs.

use thiserror::Error;

/// Grid access errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A (day, period) pair outside the grid.
    #[error("slot ({day}, {period}) is outside the {days}x{periods} grid")]
    OutOfRange {
        day: usize,
        period: usize,
        days: usize,
        periods: usize,
    },

    /// A reloaded grid whose slot count disagrees with its dimensions.
    #[error("{days}x{periods} grid needs {expected} slots, found {found}")]
    GridShape {
        days: usize,
        periods: usize,
        expected: usize,
        found: usize,
    },

    /// A reloaded slot whose coordinates disagree with its position.
    #[error("slot at index {index} claims position ({day}, {period})")]
    MisplacedSlot {
        index: usize,
        day: usize,
        period: usize,
    },

    /// A reloaded lunch cell that is not locked.
    #[error("lunch slot ({day}, {period}) is not locked")]
    UnlockedLunchSlot { day: usize, period: usize },
}

/// Invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid must have at least one day and one period (got {days}x{periods})")]
    EmptyGrid { days: usize, periods: usize },

    #[error("lunch window [{start}, {end}) does not fit a {periods}-period day")]
    InvalidLunchWindow {
        start: usize,
        end: usize,
        periods: usize,
    },

    #[error("lab duration {duration} must be between 1 and {periods}")]
    InvalidLabDuration { duration: usize, periods: usize },

    #[error("population size must be positive")]
    EmptyPopulation,

    #[error("tournament size must be positive")]
    EmptyTournament,

    #[error("{name} must lie in [0, 1] (got {value})")]
    RateOutOfRange { name: &'static str, value: f64 },

    #[error("mutation swap bounds inverted: min {min} > max {max}")]
    InvertedSwapBounds { min: usize, max: usize },
}

/// Reasons a scheduling run stops before completing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The caller cancelled the run.
    #[error("scheduling run cancelled")]
    Cancelled,

    /// A grid write fell outside the schedule.
    #[error(transparent)]
    Grid(#[from] ScheduleError),
}
