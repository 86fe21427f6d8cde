//! Input validation for timetabling catalogs.
//!
//! Checks structural integrity of courses, instructors and rooms before
//! scheduling. Detects:
//! - Map keys that disagree with record ids
//! - References to unknown instructors or courses
//! - Courses nobody can teach or no room can host
//! - Lab hours that do not divide into whole lab blocks
//! - Instructors arriving with non-zero loads
//!
//! Findings are advisory: the engine logs them and schedules anyway, and
//! the allocator reports what it then fails to place.

use crate::config::ConstraintConfig;
use crate::models::{Catalog, Course, SessionKind};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A record is stored under a key other than its own id.
    KeyMismatch,
    /// A course lists an instructor that doesn't exist.
    InvalidInstructorReference,
    /// A course lists an incompatible course that doesn't exist.
    InvalidCourseReference,
    /// A course has hours but no instructors.
    NoInstructor,
    /// No room can host one of the course's session kinds.
    NoSuitableRoom,
    /// Lab hours are not a multiple of the lab block length.
    UnevenLabHours,
    /// An instructor already carries assignments.
    NonZeroLoad,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a catalog against the constraint constants.
///
/// Checks:
/// 1. Every map key equals its record's id
/// 2. Course instructor and incompatibility references resolve
/// 3. Every course with hours has at least one instructor
/// 4. Every required session kind has at least one hosting room
/// 5. Lab hours divide into whole blocks
/// 6. No instructor starts with assignments
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalog(catalog: &Catalog, config: &ConstraintConfig) -> ValidationResult {
    let mut errors = Vec::new();

    for (key, course) in &catalog.courses {
        if key != &course.code {
            errors.push(ValidationError::new(
                ValidationErrorKind::KeyMismatch,
                format!("Course stored under '{}' has code '{}'", key, course.code),
            ));
        }
    }
    for (key, instructor) in &catalog.instructors {
        if key != &instructor.id {
            errors.push(ValidationError::new(
                ValidationErrorKind::KeyMismatch,
                format!("Instructor stored under '{}' has id '{}'", key, instructor.id),
            ));
        }
    }
    for (key, room) in &catalog.classrooms {
        if key != &room.room_number {
            errors.push(ValidationError::new(
                ValidationErrorKind::KeyMismatch,
                format!("Classroom stored under '{}' has number '{}'", key, room.room_number),
            ));
        }
    }

    for course in catalog.courses.values() {
        check_references(catalog, course, &mut errors);
        check_coverage(catalog, course, config, &mut errors);
    }

    for instructor in catalog.instructors.values() {
        if instructor.total_load() > 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonZeroLoad,
                format!(
                    "Instructor '{}' already carries {} assignments",
                    instructor.id,
                    instructor.total_load()
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_references(catalog: &Catalog, course: &Course, errors: &mut Vec<ValidationError>) {
    for id in &course.instructors {
        if !catalog.instructors.contains_key(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInstructorReference,
                format!("Course '{}' references unknown instructor '{}'", course.code, id),
            ));
        }
    }
    for other in &course.incompatible_courses {
        if !catalog.courses.contains_key(other) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCourseReference,
                format!("Course '{}' lists unknown incompatible course '{}'", course.code, other),
            ));
        }
    }
}

fn check_coverage(
    catalog: &Catalog,
    course: &Course,
    config: &ConstraintConfig,
    errors: &mut Vec<ValidationError>,
) {
    let total_hours: u32 = SessionKind::ALL.iter().map(|&k| course.hours_for(k)).sum();
    if total_hours > 0 && course.instructors.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoInstructor,
            format!("Course '{}' has no instructor", course.code),
        ));
    }

    for kind in SessionKind::ALL {
        if course.hours_for(kind) == 0 {
            continue;
        }
        let hosted = catalog
            .classrooms
            .values()
            .any(|room| room.can_host(course, kind) && (kind == SessionKind::Lab || !room.is_lab));
        if !hosted {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoSuitableRoom,
                format!(
                    "No room can host {} sessions of '{}' ({} students)",
                    kind, course.code, course.enrolled_students
                ),
            ));
        }
    }

    let duration = config.lab_duration as u32;
    if course.lab_hours > 0 && duration > 0 && course.lab_hours % duration != 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnevenLabHours,
            format!(
                "Course '{}' has {} lab hours, not a multiple of the {}-period lab block",
                course.code, course.lab_hours, duration
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, Instructor};

    fn valid_catalog() -> Catalog {
        Catalog::new()
            .with_course(
                Course::new("CS F213", "OOP")
                    .with_lecture_hours(3)
                    .with_lab_hours(2)
                    .with_enrollment(40)
                    .with_instructor("I1"),
            )
            .with_instructor(Instructor::new("I1", "Dr. Rao"))
            .with_classroom(Classroom::new("F102", 60))
            .with_classroom(Classroom::new("D101", 60))
    }

    fn kinds(result: ValidationResult) -> Vec<ValidationErrorKind> {
        result.unwrap_err().into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_valid_catalog() {
        assert!(validate_catalog(&valid_catalog(), &ConstraintConfig::default()).is_ok());
    }

    #[test]
    fn test_key_mismatch() {
        let mut catalog = valid_catalog();
        let course = Course::new("CS F214", "Logic");
        catalog.courses.insert("CS F999".into(), course);
        let found = kinds(validate_catalog(&catalog, &ConstraintConfig::default()));
        assert_eq!(found, vec![ValidationErrorKind::KeyMismatch]);
    }

    #[test]
    fn test_unknown_references() {
        let catalog = valid_catalog().with_course(
            Course::new("BIO F110", "Biology")
                .with_lecture_hours(1)
                .with_instructor("GHOST")
                .with_incompatible("CHEM F999"),
        );
        let found = kinds(validate_catalog(&catalog, &ConstraintConfig::default()));
        assert!(found.contains(&ValidationErrorKind::InvalidInstructorReference));
        assert!(found.contains(&ValidationErrorKind::InvalidCourseReference));
    }

    #[test]
    fn test_no_instructor() {
        let catalog = valid_catalog().with_course(Course::new("HSS F222", "Ethics").with_lecture_hours(2));
        let found = kinds(validate_catalog(&catalog, &ConstraintConfig::default()));
        assert_eq!(found, vec![ValidationErrorKind::NoInstructor]);
    }

    #[test]
    fn test_no_suitable_room() {
        let catalog = Catalog::new()
            .with_course(
                Course::new("CS F213", "OOP")
                    .with_lecture_hours(1)
                    .with_lab_hours(2)
                    .with_enrollment(100)
                    .with_instructor("I1"),
            )
            .with_instructor(Instructor::new("I1", "Dr. Rao"))
            .with_classroom(Classroom::new("F102", 120))
            .with_classroom(Classroom::new("D101", 30));
        let errors = validate_catalog(&catalog, &ConstraintConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::NoSuitableRoom);
        assert!(errors[0].to_string().contains("lab sessions"));
    }

    #[test]
    fn test_uneven_lab_hours() {
        let catalog = valid_catalog().with_course(
            Course::new("PHY F110", "Physics Lab")
                .with_lab_hours(3)
                .with_instructor("I1"),
        );
        let found = kinds(validate_catalog(&catalog, &ConstraintConfig::default()));
        assert_eq!(found, vec![ValidationErrorKind::UnevenLabHours]);
    }

    #[test]
    fn test_non_zero_load() {
        let mut busy = Instructor::new("I2", "Dr. Iyer");
        busy.assign("CS F213", SessionKind::Tutorial);
        let catalog = valid_catalog().with_instructor(busy);
        let found = kinds(validate_catalog(&catalog, &ConstraintConfig::default()));
        assert_eq!(found, vec![ValidationErrorKind::NonZeroLoad]);
    }
}
