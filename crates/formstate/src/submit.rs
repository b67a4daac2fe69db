//! Handing a validated document to the persistence collaborator.
//!
//! The engine never retries: a failed submission clears `submitting` and is
//! reported back to the caller, who decides what to show.

use serde_json::Value;
use thiserror::Error;

use formstate_schema::Schema;

use crate::engine::ValidationEngine;
use crate::error::FormError;

/// Why the collaborator rejected a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct SubmitError {
    pub reason: String,
}

impl SubmitError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Persists a document, e.g. by creating or updating a job.
pub trait Submitter {
    fn submit(&mut self, document: &Value) -> Result<(), SubmitError>;
}

impl<F> Submitter for F
where
    F: FnMut(&Value) -> Result<(), SubmitError>,
{
    fn submit(&mut self, document: &Value) -> Result<(), SubmitError> {
        self(document)
    }
}

impl<S: Schema> ValidationEngine<S> {
    /// Switch to validate-all and, if nothing is wrong, mark the form as
    /// submitting and return the document to send.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitting` while a previous submission is in flight;
    /// `Invalid` when errors remain (they are now all visible).
    pub fn begin_submit(&mut self) -> Result<Value, FormError> {
        if self.state().submitting {
            return Err(FormError::AlreadySubmitting);
        }
        self.set_validate_all(true);
        let error_count = self.current_errors().len();
        if error_count > 0 {
            tracing::warn!(error_count, "submission blocked by validation errors");
            return Err(FormError::Invalid { error_count });
        }
        self.set_submitting(true);
        Ok(self.document().clone())
    }

    /// Record the collaborator's outcome and clear `submitting`.
    pub fn finish_submit(&mut self, outcome: Result<(), SubmitError>) -> Result<(), FormError> {
        if !self.state().submitting {
            return Err(FormError::NotSubmitting);
        }
        self.set_submitting(false);
        match outcome {
            Ok(()) => {
                tracing::info!(revision = self.state().revision, "form submitted");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "submission failed");
                Err(error.into())
            }
        }
    }

    /// Validate, then call `submitter` once with the document.
    pub fn submit<T>(&mut self, submitter: &mut T) -> Result<(), FormError>
    where
        T: Submitter + ?Sized,
    {
        let document = self.begin_submit()?;
        let outcome = submitter.submit(&document);
        self.finish_submit(outcome)
    }
}
