//! Projection of validation issues into a document-shaped error tree.

use serde::Serialize;
use serde_json::{Map, Value};

use formstate_path::{tree, FieldPath, PathSegment};
use formstate_schema::ValidationIssue;

use crate::touched::TouchedTree;

/// Document-shaped tree whose leaves are error messages.
///
/// Sequence slots without an error are `null`. Absence at a path means no
/// surviving error at that path or below it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorTree(Value);

impl Default for ErrorTree {
    fn default() -> Self {
        ErrorTree(Value::Object(Map::new()))
    }
}

impl ErrorTree {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The message at exactly `path`, if any.
    pub fn get(&self, path: &[PathSegment]) -> Option<&str> {
        tree::read(&self.0, path)?.as_str()
    }

    /// Check if any message lives at `path` or below it.
    pub fn has_errors_under(&self, path: &[PathSegment]) -> bool {
        tree::read(&self.0, path).is_some_and(tree::has_string_leaf)
    }

    pub fn is_empty(&self) -> bool {
        !tree::has_string_leaf(&self.0)
    }

    /// Number of messages in the tree.
    pub fn len(&self) -> usize {
        let mut count = 0;
        tree::for_each_string_leaf(&self.0, &mut |_, _| count += 1);
        count
    }

    /// Every message with its path, in tree order.
    pub fn entries(&self) -> Vec<(FieldPath, String)> {
        let mut out = Vec::new();
        tree::for_each_string_leaf(&self.0, &mut |path, message| {
            out.push((FieldPath::new(path.to_vec()), message.to_string()));
        });
        out
    }
}

/// Fold `issues` into an error tree.
///
/// With `touched == None` (validate-all) every issue is kept. Otherwise an
/// issue survives only if its exact path is touched. When two surviving
/// issues target the same path, the later one wins.
///
/// # Example
///
/// ```
/// use formstate::{project, TouchedTree};
/// use formstate_schema::ValidationIssue;
/// use serde_json::json;
///
/// let issues = vec![
///     ValidationIssue::new("a".parse().unwrap(), "required"),
///     ValidationIssue::new("b.c".parse().unwrap(), "too long"),
/// ];
/// assert_eq!(
///     project(&issues, None).as_value(),
///     &json!({"a": "required", "b": {"c": "too long"}})
/// );
/// assert_eq!(project(&issues, Some(&TouchedTree::new())).as_value(), &json!({}));
/// ```
pub fn project(issues: &[ValidationIssue], touched: Option<&TouchedTree>) -> ErrorTree {
    let mut errors = Value::Object(Map::new());
    for issue in issues {
        if touched.map_or(true, |t| t.is_touched(&issue.path)) {
            tree::write_in_place(&mut errors, &issue.path, Value::String(issue.message.clone()));
        }
    }
    ErrorTree(errors)
}
