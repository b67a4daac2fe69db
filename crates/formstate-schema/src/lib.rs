//! Schema adapters for form documents.
//!
//! A [`Schema`] maps a candidate document to an ordered list of
//! [`ValidationIssue`]s. The form engine treats it as a pure function and
//! never looks inside it. Two implementations ship here:
//!
//! - [`RuleSchema`], a declarative table of per-field rules (`required`,
//!   length limits, regex patterns, numeric bounds) keyed by path patterns
//!   such as `labels[*].label`;
//! - [`JsonSchemaAdapter`], which runs a compiled JSON Schema.
//!
//! Any closure can be used through [`from_fn`].

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use formstate_path::{FieldPath, MalformedPathError};

pub mod json_schema;
pub mod rules;

pub use json_schema::JsonSchemaAdapter;
pub use rules::{FieldConfig, Messages, Rule, RuleSchema, RuleSchemaBuilder, RuleSpec, SchemaConfig};

/// One problem found in a document: where, and what to tell the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: FieldPath,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// A validation capability: document in, issues out.
///
/// Implementations must be total. An empty result means the document is
/// valid. Issue order must be stable for a fixed document.
pub trait Schema {
    fn validate(&self, document: &Value) -> Vec<ValidationIssue>;
}

impl<S: Schema + ?Sized> Schema for &S {
    fn validate(&self, document: &Value) -> Vec<ValidationIssue> {
        (**self).validate(document)
    }
}

impl<S: Schema + ?Sized> Schema for Box<S> {
    fn validate(&self, document: &Value) -> Vec<ValidationIssue> {
        (**self).validate(document)
    }
}

impl<S: Schema + ?Sized> Schema for Rc<S> {
    fn validate(&self, document: &Value) -> Vec<ValidationIssue> {
        (**self).validate(document)
    }
}

impl<S: Schema + ?Sized> Schema for Arc<S> {
    fn validate(&self, document: &Value) -> Vec<ValidationIssue> {
        (**self).validate(document)
    }
}

/// A [`Schema`] backed by a closure. See [`from_fn`].
#[derive(Clone)]
pub struct FnSchema<F>(F);

impl<F> Schema for FnSchema<F>
where
    F: Fn(&Value) -> Vec<ValidationIssue>,
{
    fn validate(&self, document: &Value) -> Vec<ValidationIssue> {
        (self.0)(document)
    }
}

impl<F> fmt::Debug for FnSchema<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnSchema")
    }
}

/// Wrap a closure as a [`Schema`].
///
/// # Example
///
/// ```
/// use formstate_schema::{from_fn, Schema, ValidationIssue};
/// use serde_json::json;
///
/// let schema = from_fn(|doc| {
///     if doc["name"].as_str().unwrap_or("").is_empty() {
///         vec![ValidationIssue::new("name".parse().unwrap(), "required")]
///     } else {
///         Vec::new()
///     }
/// });
/// assert_eq!(schema.validate(&json!({"name": ""})).len(), 1);
/// assert!(schema.validate(&json!({"name": "x"})).is_empty());
/// ```
pub fn from_fn<F>(f: F) -> FnSchema<F>
where
    F: Fn(&Value) -> Vec<ValidationIssue>,
{
    FnSchema(f)
}

/// A schema definition that cannot be built.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error(transparent)]
    MalformedPath(#[from] MalformedPathError),
    #[error("invalid pattern for field {field:?}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid schema config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid JSON Schema: {reason}")]
    JsonSchema { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct AlwaysOne;

    impl Schema for AlwaysOne {
        fn validate(&self, _document: &Value) -> Vec<ValidationIssue> {
            vec![ValidationIssue::new(FieldPath::root(), "nope")]
        }
    }

    #[test]
    fn test_schema_through_pointers() {
        let boxed: Box<dyn Schema> = Box::new(AlwaysOne);
        assert_eq!(boxed.validate(&json!({})).len(), 1);
        let shared: Arc<dyn Schema> = Arc::new(AlwaysOne);
        assert_eq!((&shared).validate(&json!({})).len(), 1);
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue::new("job.name".parse().unwrap(), "This field is required.");
        assert_eq!(issue.to_string(), "job.name: This field is required.");
        assert_eq!(ValidationIssue::new(FieldPath::root(), "bad").to_string(), "bad");
    }

    #[test]
    fn test_issue_serializes_path_as_string() {
        let issue = ValidationIssue::new("labels[0].label".parse().unwrap(), "x");
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            json!({"path": "labels[0].label", "message": "x"})
        );
    }
}
