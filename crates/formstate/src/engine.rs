//! The per-form validation state machine.
//!
//! A [`ValidationEngine`] owns one form session: the document being edited,
//! the touched tree and the validate-all / submitting flags. Errors are never
//! stored; [`ValidationEngine::current_errors`] recomputes them from the
//! current state on every call, so they cannot go stale.

use serde::Serialize;
use serde_json::Value;

use formstate_path::{tokenize_with, tree, FieldPath};
use formstate_schema::{Schema, ValidationIssue};

use crate::error::FormError;
use crate::errors::{project, ErrorTree};
use crate::options::FormOptions;
use crate::step::{is_step_valid, step_error_count, GateDecision};
use crate::touched::TouchedTree;

/// Whether a mutation merges a value in or deletes the entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModifyMethod {
    #[default]
    Set,
    Unset,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    pub document: Value,
    pub touched: TouchedTree,
    pub validate_all: bool,
    pub submitting: bool,
    /// Bumped by every mutation; compare revisions to detect change.
    pub revision: u64,
}

impl EngineState {
    fn initial(document: Value, options: &FormOptions) -> Self {
        Self {
            document,
            touched: TouchedTree::new(),
            validate_all: options.initial_validate_all,
            submitting: false,
            revision: 0,
        }
    }
}

/// A whole-state patch; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub document: Option<Value>,
    pub touched: Option<TouchedTree>,
    pub validate_all: Option<bool>,
    pub submitting: Option<bool>,
}

pub struct ValidationEngine<S> {
    schema: S,
    options: FormOptions,
    state: EngineState,
}

impl<S: Schema> ValidationEngine<S> {
    pub fn new(schema: S, initial: Value) -> Self {
        Self::with_options(schema, initial, FormOptions::default())
    }

    pub fn with_options(schema: S, initial: Value, options: FormOptions) -> Self {
        let state = EngineState::initial(initial, &options);
        Self {
            schema,
            options,
            state,
        }
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// An independent copy of the current state.
    pub fn snapshot(&self) -> EngineState {
        self.state.clone()
    }

    pub fn document(&self) -> &Value {
        &self.state.document
    }

    pub fn touched(&self) -> &TouchedTree {
        &self.state.touched
    }

    pub fn value(&self, path: &FieldPath) -> Option<&Value> {
        tree::read(&self.state.document, path)
    }

    /// Parse a path literal with this form's limits.
    pub fn path(&self, path: &str) -> Result<FieldPath, FormError> {
        Ok(tokenize_with(path, &self.options.path)?)
    }

    fn parse_all<'a, I>(&self, paths: I) -> Result<Vec<FieldPath>, FormError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        paths.into_iter().map(|path| self.path(path)).collect()
    }

    fn bump(&mut self) -> &EngineState {
        self.state.revision += 1;
        &self.state
    }

    /// Apply `patch` to the document left to right; each entry sees the
    /// writes before it. With [`ModifyMethod::Unset`] the values are ignored
    /// and each path is removed instead. Nothing is touched.
    pub fn set_fields<I>(&mut self, patch: I, method: ModifyMethod) -> &EngineState
    where
        I: IntoIterator<Item = (FieldPath, Value)>,
    {
        let mut count = 0usize;
        for (path, value) in patch {
            tracing::trace!(field = %path, ?method, "set field");
            match method {
                ModifyMethod::Set => tree::write_in_place(&mut self.state.document, &path, value),
                ModifyMethod::Unset => {
                    tree::remove_in_place(&mut self.state.document, &path);
                }
            }
            count += 1;
        }
        tracing::debug!(count, ?method, revision = self.state.revision + 1, "fields updated");
        self.bump()
    }

    /// [`set_fields`](Self::set_fields) with path literals. Every path is
    /// parsed before anything is written, so a malformed one changes nothing.
    pub fn set_fields_at<'a, I>(&mut self, patch: I, method: ModifyMethod) -> Result<&EngineState, FormError>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let parsed = patch
            .into_iter()
            .map(|(path, value)| Ok((self.path(path)?, value)))
            .collect::<Result<Vec<_>, FormError>>()?;
        Ok(self.set_fields(parsed, method))
    }

    pub fn set_field(&mut self, path: &str, value: Value) -> Result<&EngineState, FormError> {
        self.set_fields_at([(path, value)], ModifyMethod::Set)
    }

    pub fn unset_field(&mut self, path: &str) -> Result<&EngineState, FormError> {
        self.set_fields_at([(path, Value::Null)], ModifyMethod::Unset)
    }

    /// Mark (or with `Unset`, forget) `paths` as touched.
    pub fn touch_fields<'a, I>(&mut self, paths: I, method: ModifyMethod) -> &EngineState
    where
        I: IntoIterator<Item = &'a FieldPath>,
    {
        match method {
            ModifyMethod::Set => self.state.touched.touch(paths),
            ModifyMethod::Unset => self.state.touched.untouch(paths),
        }
        tracing::debug!(?method, revision = self.state.revision + 1, "touched fields updated");
        self.bump()
    }

    /// [`touch_fields`](Self::touch_fields) with path literals, all parsed
    /// up front.
    pub fn touch_fields_at<'a, I>(&mut self, paths: I, method: ModifyMethod) -> Result<&EngineState, FormError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let parsed = self.parse_all(paths)?;
        Ok(self.touch_fields(&parsed, method))
    }

    pub fn set_validate_all(&mut self, flag: bool) -> &EngineState {
        if self.state.validate_all != flag {
            tracing::debug!(validate_all = flag, "validation mode changed");
        }
        self.state.validate_all = flag;
        self.bump()
    }

    pub(crate) fn set_submitting(&mut self, flag: bool) -> &EngineState {
        self.state.submitting = flag;
        self.bump()
    }

    /// Replace whichever parts of the state `patch` carries.
    pub fn patch_state(&mut self, patch: StatePatch) -> &EngineState {
        let StatePatch {
            document,
            touched,
            validate_all,
            submitting,
        } = patch;
        if let Some(document) = document {
            self.state.document = document;
        }
        if let Some(touched) = touched {
            self.state.touched = touched;
        }
        if let Some(validate_all) = validate_all {
            self.state.validate_all = validate_all;
        }
        if let Some(submitting) = submitting {
            self.state.submitting = submitting;
        }
        self.bump()
    }

    /// Start over with a fresh initial document, as when the form is
    /// re-opened for a different record.
    pub fn reset(&mut self, initial: Value) -> &EngineState {
        let revision = self.state.revision + 1;
        self.state = EngineState::initial(initial, &self.options);
        self.state.revision = revision;
        tracing::debug!(revision, "form reset");
        &self.state
    }

    /// Run the schema over the current document.
    pub fn issues(&self) -> Vec<ValidationIssue> {
        self.schema.validate(&self.state.document)
    }

    /// Every current error, regardless of touched state.
    pub fn all_errors(&self) -> ErrorTree {
        project(&self.issues(), None)
    }

    /// The errors to display now: all of them in validate-all mode, only
    /// touched ones otherwise.
    pub fn current_errors(&self) -> ErrorTree {
        let issues = self.issues();
        let touched = (!self.state.validate_all).then_some(&self.state.touched);
        let errors = project(&issues, touched);
        tracing::debug!(
            issues = issues.len(),
            shown = errors.len(),
            validate_all = self.state.validate_all,
            "validated"
        );
        errors
    }

    /// The message currently shown for `path`, if any.
    pub fn error(&self, path: &FieldPath) -> Option<String> {
        self.current_errors().get(path).map(str::to_string)
    }

    pub fn is_valid(&self) -> bool {
        self.issues().is_empty()
    }

    /// Whether the step owning `fields` may be left.
    ///
    /// Checks every error, shown or not: a step with untouched required
    /// fields is not complete.
    pub fn is_step_valid(&self, fields: &[FieldPath]) -> bool {
        is_step_valid(fields, &self.all_errors())
    }

    /// Gate a forward navigation away from the step owning `fields`.
    ///
    /// When the step has errors, validate-all is switched on so they all
    /// show, and the caller must cancel the navigation. Otherwise
    /// validate-all is switched off again (per [`FormOptions`]) so the next
    /// step starts in touched-only mode.
    pub fn advance_step(&mut self, fields: &[FieldPath]) -> GateDecision {
        let errors = self.all_errors();
        if is_step_valid(fields, &errors) {
            if self.options.reset_validate_all_on_advance {
                self.set_validate_all(false);
            }
            GateDecision::Proceed
        } else {
            let error_count = step_error_count(fields, &errors);
            tracing::warn!(error_count, "step has errors, navigation cancelled");
            self.set_validate_all(true);
            GateDecision::Blocked { error_count }
        }
    }
}

impl<S> std::fmt::Debug for ValidationEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
