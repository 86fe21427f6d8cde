//! Engine configuration.
//!
//! All tunables are plain serde-derivable structs with `Default` values
//! matching the institutional rule set. Every field is `#[serde(default)]`,
//! so a partial override deserializes cleanly from any format the caller
//! prefers.
//!
//! # Example
//!
//! ```
//! use u_timetable::config::{EngineConfig, GaConfig};
//!
//! let config = EngineConfig::default()
//!     .with_ga(GaConfig::default().with_population_size(20).with_max_generations(50));
//! assert!(config.validate().is_ok());
//! assert_eq!(config.constraints.lunch_start, 4);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::SessionKind;

/// Named constraint constants and grid dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    /// Working days per week (grid rows).
    pub days: usize,
    /// Periods per day (grid columns).
    pub periods_per_day: usize,
    /// Maximum credits a student may register for.
    pub max_credits: u32,
    /// Lecture sessions an instructor may carry.
    pub max_lectures_per_faculty: u32,
    /// Tutorial sessions an instructor may carry.
    pub max_tutorials_per_faculty: u32,
    /// Lab sessions an instructor may carry.
    pub max_labs_per_faculty: u32,
    /// First lunch period (inclusive).
    pub lunch_start: usize,
    /// End of the lunch window (exclusive).
    pub lunch_end: usize,
    /// Consecutive periods occupied by one lab session.
    pub lab_duration: usize,
    /// Two sessions of one course must be more than this many days apart.
    pub lecture_gap_days: usize,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            days: 5,
            periods_per_day: 9,
            max_credits: 25,
            max_lectures_per_faculty: 1,
            max_tutorials_per_faculty: 2,
            max_labs_per_faculty: 1,
            lunch_start: 4,
            lunch_end: 6,
            lab_duration: 2,
            lecture_gap_days: 1,
        }
    }
}

impl ConstraintConfig {
    /// Sets grid dimensions.
    pub fn with_dimensions(mut self, days: usize, periods_per_day: usize) -> Self {
        self.days = days;
        self.periods_per_day = periods_per_day;
        self
    }

    /// Sets the lunch window `[start, end)`.
    pub fn with_lunch(mut self, start: usize, end: usize) -> Self {
        self.lunch_start = start;
        self.lunch_end = end;
        self
    }

    /// Sets the lab block length.
    pub fn with_lab_duration(mut self, periods: usize) -> Self {
        self.lab_duration = periods;
        self
    }

    /// Sets the per-instructor caps (lecture, tutorial, lab).
    pub fn with_workload_caps(mut self, lectures: u32, tutorials: u32, labs: u32) -> Self {
        self.max_lectures_per_faculty = lectures;
        self.max_tutorials_per_faculty = tutorials;
        self.max_labs_per_faculty = labs;
        self
    }

    /// Sets the minimum day gap between sessions of one course.
    pub fn with_lecture_gap_days(mut self, days: usize) -> Self {
        self.lecture_gap_days = days;
        self
    }

    /// Total number of grid cells.
    pub fn cell_count(&self) -> usize {
        self.days * self.periods_per_day
    }

    /// Whether `period` falls inside the lunch window.
    pub fn is_lunch(&self, period: usize) -> bool {
        period >= self.lunch_start && period < self.lunch_end
    }

    /// Per-instructor cap for a session kind.
    pub fn workload_cap(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Lecture => self.max_lectures_per_faculty,
            SessionKind::Tutorial => self.max_tutorials_per_faculty,
            SessionKind::Lab => self.max_labs_per_faculty,
        }
    }

    /// Checks that the constants describe a usable grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 || self.periods_per_day == 0 {
            return Err(ConfigError::EmptyGrid {
                days: self.days,
                periods: self.periods_per_day,
            });
        }
        if self.lunch_start > self.lunch_end || self.lunch_end > self.periods_per_day {
            return Err(ConfigError::InvalidLunchWindow {
                start: self.lunch_start,
                end: self.lunch_end,
                periods: self.periods_per_day,
            });
        }
        if self.lab_duration == 0 || self.lab_duration > self.periods_per_day {
            return Err(ConfigError::InvalidLabDuration {
                duration: self.lab_duration,
                periods: self.periods_per_day,
            });
        }
        Ok(())
    }
}

/// Attempt budgets for the constructive allocator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Random placement attempts per lab block.
    pub lab_attempts: usize,
    /// Random placement attempts per course in the lecture phase.
    pub lecture_attempts: usize,
    /// Random placement attempts per course in the tutorial phase.
    pub tutorial_attempts: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            lab_attempts: 50,
            lecture_attempts: 100,
            tutorial_attempts: 100,
        }
    }
}

impl AllocatorConfig {
    /// Sets all three budgets at once.
    pub fn with_attempts(mut self, labs: usize, lectures: usize, tutorials: usize) -> Self {
        self.lab_attempts = labs;
        self.lecture_attempts = lectures;
        self.tutorial_attempts = tutorials;
        self
    }
}

/// Genetic search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Probability that a crossover child is mutated.
    pub mutation_rate: f64,
    /// Individuals drawn per tournament.
    pub tournament_size: usize,
    /// Upper bound on evolved generations.
    pub max_generations: usize,
    /// Stop once the best fitness reaches this value.
    pub target_fitness: f64,
    /// Fraction of the population carried over unchanged.
    pub elite_fraction: f64,
    /// Minimum slot swaps per mutation.
    pub min_mutation_swaps: usize,
    /// Maximum slot swaps per mutation.
    pub max_mutation_swaps: usize,
    /// Evaluate fitness across individuals in parallel.
    pub parallel: bool,
    /// Wall-clock budget for the search, in milliseconds.
    pub time_limit_ms: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            mutation_rate: 0.02,
            tournament_size: 5,
            max_generations: 1000,
            target_fitness: 0.95,
            elite_fraction: 0.1,
            min_mutation_swaps: 1,
            max_mutation_swaps: 3,
            parallel: true,
            time_limit_ms: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation cap.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Sets the early-termination fitness.
    pub fn with_target_fitness(mut self, target: f64) -> Self {
        self.target_fitness = target;
        self
    }

    /// Enables or disables parallel fitness evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets a wall-clock budget.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Number of elites carried into each generation.
    pub fn elite_count(&self) -> usize {
        ((self.population_size as f64) * self.elite_fraction).floor() as usize
    }

    /// Checks the parameters for impossible values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::EmptyTournament);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::RateOutOfRange {
                name: "mutation_rate",
                value: self.mutation_rate,
            });
        }
        if !(0.0..=1.0).contains(&self.elite_fraction) {
            return Err(ConfigError::RateOutOfRange {
                name: "elite_fraction",
                value: self.elite_fraction,
            });
        }
        if self.min_mutation_swaps > self.max_mutation_swaps {
            return Err(ConfigError::InvertedSwapBounds {
                min: self.min_mutation_swaps,
                max: self.max_mutation_swaps,
            });
        }
        Ok(())
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Constraint constants and grid shape.
    pub constraints: ConstraintConfig,
    /// Allocator attempt budgets.
    pub allocator: AllocatorConfig,
    /// Genetic search parameters.
    pub ga: GaConfig,
    /// Keep instructor load counters from the snapshot instead of zeroing them.
    pub resume_loads: bool,
    /// Name given to generated schedules.
    pub schedule_name: String,
}

impl EngineConfig {
    /// Sets the constraint constants.
    pub fn with_constraints(mut self, constraints: ConstraintConfig) -> Self {
        self.constraints = constraints;
        self
    }

    /// Sets allocator budgets.
    pub fn with_allocator(mut self, allocator: AllocatorConfig) -> Self {
        self.allocator = allocator;
        self
    }

    /// Sets GA parameters.
    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    /// Keeps existing instructor loads at run start.
    pub fn with_resume_loads(mut self, resume: bool) -> Self {
        self.resume_loads = resume;
        self
    }

    /// Sets the generated schedule's name.
    pub fn with_schedule_name(mut self, name: impl Into<String>) -> Self {
        self.schedule_name = name.into();
        self
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.constraints.validate()?;
        self.ga.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_rule_set() {
        let c = ConstraintConfig::default();
        assert_eq!(c.days, 5);
        assert_eq!(c.periods_per_day, 9);
        assert_eq!(c.max_credits, 25);
        assert_eq!(c.lab_duration, 2);
        assert_eq!(c.cell_count(), 45);
        assert!(c.is_lunch(4));
        assert!(c.is_lunch(5));
        assert!(!c.is_lunch(6));

        let ga = GaConfig::default();
        assert_eq!(ga.population_size, 100);
        assert_eq!(ga.tournament_size, 5);
        assert_eq!(ga.elite_count(), 10);
    }

    #[test]
    fn test_partial_override_from_json() {
        let json = r#"{ "constraints": { "lunch_start": 3 }, "ga": { "population_size": 10 } }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.constraints.lunch_start, 3);
        assert_eq!(config.constraints.lunch_end, 6);
        assert_eq!(config.ga.population_size, 10);
        assert_eq!(config.ga.max_generations, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_lunch_outside_day() {
        let c = ConstraintConfig::default().with_lunch(7, 12);
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InvalidLunchWindow { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_lab_duration() {
        let c = ConstraintConfig::default().with_lab_duration(0);
        assert!(matches!(
            c.validate(),
            Err(ConfigError::InvalidLabDuration { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_ga_parameters() {
        assert!(GaConfig::default().with_population_size(0).validate().is_err());
        assert!(GaConfig::default().with_tournament_size(0).validate().is_err());
        assert!(GaConfig::default().with_mutation_rate(1.5).validate().is_err());

        let mut inverted = GaConfig::default();
        inverted.min_mutation_swaps = 4;
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvertedSwapBounds { min: 4, max: 3 })
        ));
    }
}
