//! Step gating for multi-step wizards.

use formstate_path::FieldPath;

use crate::errors::ErrorTree;

/// Result of gating a forward navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    /// The navigation must be cancelled; `error_count` errors belong to the
    /// step being left.
    Blocked { error_count: usize },
}

/// True iff no path in `field_paths`, read as a prefix, has an error at or
/// below it in `errors`.
///
/// # Example
///
/// ```
/// use formstate::{is_step_valid, project, FieldPath};
/// use formstate_schema::ValidationIssue;
///
/// let step: [FieldPath; 1] = ["job.name".parse().unwrap()];
/// let errors = project(&[ValidationIssue::new("job.name".parse().unwrap(), "required")], None);
/// assert!(!is_step_valid(&step, &errors));
/// let errors = project(&[ValidationIssue::new("job.other".parse().unwrap(), "x")], None);
/// assert!(is_step_valid(&step, &errors));
/// ```
pub fn is_step_valid(field_paths: &[FieldPath], errors: &ErrorTree) -> bool {
    !field_paths.iter().any(|path| errors.has_errors_under(path))
}

/// Number of messages at or below any of `field_paths`, each counted once.
pub fn step_error_count(field_paths: &[FieldPath], errors: &ErrorTree) -> usize {
    errors
        .entries()
        .iter()
        .filter(|(path, _)| field_paths.iter().any(|prefix| path.starts_with(prefix)))
        .count()
}
