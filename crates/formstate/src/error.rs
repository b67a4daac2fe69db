use thiserror::Error;

use formstate_path::MalformedPathError;

use crate::submit::SubmitError;

#[derive(Debug, Error)]
pub enum FormError {
    /// A caller passed a path literal that does not parse. Fix the caller.
    #[error(transparent)]
    MalformedPath(#[from] MalformedPathError),
    #[error("form has {error_count} validation error(s)")]
    Invalid { error_count: usize },
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("no submission in flight")]
    NotSubmitting,
    #[error("submission failed: {0}")]
    Submission(#[from] SubmitError),
}
