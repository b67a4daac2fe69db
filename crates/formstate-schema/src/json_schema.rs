//! JSON Schema adapter.
//!
//! Runs a compiled `jsonschema` validator and converts each error's
//! instance location into a [`FieldPath`]. `required` errors are reported by
//! the validator on the parent object; they are moved onto the missing
//! property so that they behave like any other leaf issue.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError, Validator};
use serde_json::Value;

use formstate_path::{FieldPath, PathSegment};

use crate::{Messages, Schema, SchemaError, ValidationIssue};

pub struct JsonSchemaAdapter {
    validator: Validator,
    messages: Messages,
}

impl JsonSchemaAdapter {
    /// Compile `schema` (draft auto-detected from `$schema`).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::JsonSchema`] if the schema does not compile.
    pub fn new(schema: &Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::validator_for(schema).map_err(|e| SchemaError::JsonSchema {
            reason: e.to_string(),
        })?;
        Ok(Self {
            validator,
            messages: Messages::default(),
        })
    }

    /// Use `messages.required` for missing properties.
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    fn issue_from(&self, error: &ValidationError<'_>, document: &Value) -> ValidationIssue {
        let path = instance_field_path(&error.instance_path.to_string(), document);
        match &error.kind {
            ValidationErrorKind::Required { property } => {
                let key = property
                    .as_str()
                    .map_or_else(|| property.to_string(), str::to_string);
                ValidationIssue::new(path.child(PathSegment::Key(key)), self.messages.required.clone())
            }
            _ => ValidationIssue::new(path, error.to_string()),
        }
    }
}

/// Resolve an instance location, falling back to the root path.
fn instance_field_path(pointer: &str, document: &Value) -> FieldPath {
    FieldPath::from_json_pointer(pointer, document).unwrap_or_else(|error| {
        tracing::warn!(%pointer, %error, "unusable instance path, reporting at the root");
        FieldPath::root()
    })
}

impl std::fmt::Debug for JsonSchemaAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaAdapter").finish_non_exhaustive()
    }
}

impl Schema for JsonSchemaAdapter {
    fn validate(&self, document: &Value) -> Vec<ValidationIssue> {
        self.validator
            .iter_errors(document)
            .map(|error| self.issue_from(&error, document))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "minLength": 1},
                "labels": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {"label": {"type": "string", "maxLength": 3}},
                        "required": ["label"]
                    }
                }
            },
            "required": ["name"]
        })
    }

    #[test]
    fn test_valid_document() {
        let adapter = JsonSchemaAdapter::new(&job_schema()).unwrap();
        assert!(adapter.validate(&json!({"name": "job", "labels": [{"label": "cat"}]})).is_empty());
    }

    #[test]
    fn test_required_moves_to_property() {
        let adapter = JsonSchemaAdapter::new(&job_schema()).unwrap();
        let issues = adapter.validate(&json!({"labels": [{"label": "cat"}, {}]}));
        let paths: Vec<String> = issues.iter().map(|i| i.path.to_string()).collect();
        assert!(paths.contains(&"name".to_string()), "{paths:?}");
        assert!(paths.contains(&"labels[1].label".to_string()), "{paths:?}");
        assert!(issues.iter().all(|i| i.message == "This field is required."));
    }

    #[test]
    fn test_leaf_error_path() {
        let adapter = JsonSchemaAdapter::new(&job_schema()).unwrap();
        let issues = adapter.validate(&json!({"name": "job", "labels": [{"label": "long"}]}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path.to_string(), "labels[0].label");
    }

    #[test]
    fn test_instance_path_fallback() {
        let doc = json!({"labels": [{"label": "x"}]});
        assert_eq!(instance_field_path("/labels/0/label", &doc).to_string(), "labels[0].label");
        assert!(instance_field_path("labels/0", &doc).is_root());
    }

    #[test]
    fn test_invalid_schema() {
        let err = JsonSchemaAdapter::new(&json!({"type": "no-such-type"})).unwrap_err();
        assert!(matches!(err, SchemaError::JsonSchema { .. }));
    }
}
