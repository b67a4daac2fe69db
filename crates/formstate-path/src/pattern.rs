//! Field paths with `[*]` wildcards, used to attach rules to every element
//! of a list.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::{scan, FieldPath, MalformedPathError, PathOptions, PathSegment, RawSegment};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternSegment {
    Key(String),
    Index(usize),
    AnyIndex,
}

/// A field path whose index segments may be `[*]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern(Vec<PatternSegment>);

impl PathPattern {
    /// Parse a pattern such as `labels[*].label`.
    ///
    /// # Example
    ///
    /// ```
    /// use formstate_path::PathPattern;
    ///
    /// let pattern = PathPattern::parse("labels[*].label").unwrap();
    /// assert!(!pattern.is_concrete());
    /// assert_eq!(pattern.to_string(), "labels[*].label");
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, MalformedPathError> {
        let segments = scan(pattern, &PathOptions::default(), true)?
            .into_iter()
            .map(|raw| match raw {
                RawSegment::Key(key) => PatternSegment::Key(key),
                RawSegment::Index(index) => PatternSegment::Index(index),
                RawSegment::Wildcard => PatternSegment::AnyIndex,
            })
            .collect();
        Ok(PathPattern(segments))
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.0
    }

    /// True when the pattern has no wildcard and names exactly one path.
    pub fn is_concrete(&self) -> bool {
        !self.0.contains(&PatternSegment::AnyIndex)
    }

    /// Expand the pattern into the concrete paths it addresses in `document`.
    ///
    /// A wildcard fans out over every index of the sequence found at its
    /// position and matches nothing where there is no sequence. Concrete
    /// segments are kept whether or not the document has a value there.
    ///
    /// # Example
    ///
    /// ```
    /// use formstate_path::PathPattern;
    /// use serde_json::json;
    ///
    /// let doc = json!({"labels": [{"label": "a"}, {"label": ""}]});
    /// let paths: Vec<String> = PathPattern::parse("labels[*].label")
    ///     .unwrap()
    ///     .expand(&doc)
    ///     .iter()
    ///     .map(ToString::to_string)
    ///     .collect();
    /// assert_eq!(paths, ["labels[0].label", "labels[1].label"]);
    /// ```
    pub fn expand(&self, document: &Value) -> Vec<FieldPath> {
        let mut matches: Vec<(FieldPath, Option<&Value>)> = vec![(FieldPath::root(), Some(document))];
        for segment in &self.0 {
            let mut next = Vec::with_capacity(matches.len());
            for (path, node) in matches {
                match segment {
                    PatternSegment::Key(key) => {
                        let child = node.and_then(|v| v.as_object()).and_then(|m| m.get(key));
                        next.push((path.child(PathSegment::Key(key.clone())), child));
                    }
                    PatternSegment::Index(index) => {
                        let child = node.and_then(|v| v.as_array()).and_then(|a| a.get(*index));
                        next.push((path.child(PathSegment::Index(*index)), child));
                    }
                    PatternSegment::AnyIndex => {
                        if let Some(items) = node.and_then(|v| v.as_array()) {
                            for (index, item) in items.iter().enumerate() {
                                next.push((path.child(PathSegment::Index(index)), Some(item)));
                            }
                        }
                    }
                }
            }
            matches = next;
        }
        matches.into_iter().map(|(path, _)| path).collect()
    }

    /// Check if `path` is one of the paths this pattern can address.
    pub fn matches(&self, path: &[PathSegment]) -> bool {
        self.0.len() == path.len()
            && self.0.iter().zip(path).all(|(pattern, segment)| match (pattern, segment) {
                (PatternSegment::Key(a), PathSegment::Key(b)) => a == b,
                (PatternSegment::Index(a), PathSegment::Index(b)) => a == b,
                (PatternSegment::AnyIndex, PathSegment::Index(_)) => true,
                _ => false,
            })
    }
}

impl From<&FieldPath> for PathPattern {
    fn from(path: &FieldPath) -> Self {
        PathPattern(
            path.iter()
                .map(|segment| match segment {
                    PathSegment::Key(key) => PatternSegment::Key(key.clone()),
                    PathSegment::Index(index) => PatternSegment::Index(*index),
                })
                .collect(),
        )
    }
}

impl FromStr for PathPattern {
    type Err = MalformedPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathPattern::parse(s)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PatternSegment::Key(key) if i == 0 => f.write_str(key)?,
                PatternSegment::Key(key) => write!(f, ".{key}")?,
                PatternSegment::Index(index) => write!(f, "[{index}]")?,
                PatternSegment::AnyIndex => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize;
    use serde_json::json;

    fn expand(pattern: &str, doc: &Value) -> Vec<String> {
        PathPattern::parse(pattern)
            .unwrap()
            .expand(doc)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_concrete_pattern_expands_to_itself() {
        assert_eq!(expand("job.name", &json!({})), vec!["job.name"]);
        assert_eq!(expand("a[2].b", &json!(null)), vec!["a[2].b"]);
    }

    #[test]
    fn test_wildcard_without_sequence_matches_nothing() {
        assert!(expand("labels[*].label", &json!({})).is_empty());
        assert!(expand("labels[*].label", &json!({"labels": {"0": {}}})).is_empty());
    }

    #[test]
    fn test_nested_wildcards() {
        let doc = json!({"rows": [{"cells": [1, 2]}, {"cells": []}, {"cells": [3]}]});
        assert_eq!(
            expand("rows[*].cells[*]", &doc),
            vec!["rows[0].cells[0]", "rows[0].cells[1]", "rows[2].cells[0]"]
        );
    }

    #[test]
    fn test_matches() {
        let pattern = PathPattern::parse("labels[*].label").unwrap();
        assert!(pattern.matches(&tokenize("labels[4].label").unwrap()));
        assert!(!pattern.matches(&tokenize("labels[4]").unwrap()));
        assert!(!pattern.matches(&tokenize("labels.x.label").unwrap()));
    }

    #[test]
    fn test_display_roundtrip() {
        for pattern in ["a", "a[*]", "[*].x", "a[0][*].b"] {
            assert_eq!(PathPattern::parse(pattern).unwrap().to_string(), pattern);
        }
    }
}
