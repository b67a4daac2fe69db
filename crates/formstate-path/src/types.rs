//! Type definitions for field paths.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{
    escape_component, is_valid_index, stringify, tokenize, unescape_component, MalformedPathError,
    PathErrorKind,
};

/// A step in a field path.
///
/// Keys address record fields, indices address positions in a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Key(_) => None,
            PathSegment::Index(index) => Some(*index),
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, PathSegment::Index(_))
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// An ordered sequence of segments addressing a location in a document.
///
/// The canonical string form dot-separates keys and bracket-suffixes
/// indices: `labels[0].label`. The empty path addresses the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        FieldPath(segments)
    }

    /// The path addressing the document root.
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn into_segments(self) -> Vec<PathSegment> {
        self.0
    }

    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut next = self.0.clone();
        next.push(segment.into());
        FieldPath(next)
    }

    /// Returns the parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(FieldPath(parent.to_vec()))
    }

    /// Check if `prefix` addresses this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &[PathSegment]) -> bool {
        self.0.starts_with(prefix)
    }

    /// Resolve an RFC 6901 JSON Pointer against `document`.
    ///
    /// A component becomes an index segment when the value it is applied to
    /// is a sequence and the component is a canonical array index; every
    /// other component is a key.
    ///
    /// # Errors
    ///
    /// Returns `PathErrorKind::NotAPointer` when a non-empty pointer does not
    /// start with `/`.
    pub fn from_json_pointer(pointer: &str, document: &Value) -> Result<Self, MalformedPathError> {
        if pointer.is_empty() {
            return Ok(FieldPath::root());
        }
        let Some(body) = pointer.strip_prefix('/') else {
            return Err(MalformedPathError::new(pointer, PathErrorKind::NotAPointer));
        };
        let mut node = Some(document);
        let mut segments = Vec::new();
        for component in body.split('/') {
            let component = unescape_component(component);
            match node {
                Some(Value::Array(items)) if is_valid_index(&component) => {
                    let index: usize = component
                        .parse()
                        .map_err(|_| MalformedPathError::new(pointer, PathErrorKind::InvalidIndex))?;
                    node = items.get(index);
                    segments.push(PathSegment::Index(index));
                }
                _ => {
                    node = node.and_then(|v| v.get(&component));
                    segments.push(PathSegment::Key(component));
                }
            }
        }
        Ok(FieldPath(segments))
    }

    /// Render this path as an RFC 6901 JSON Pointer.
    pub fn to_json_pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            out.push('/');
            match segment {
                PathSegment::Key(key) => out.push_str(&escape_component(key)),
                PathSegment::Index(index) => out.push_str(&index.to_string()),
            }
        }
        out
    }
}

impl Deref for FieldPath {
    type Target = [PathSegment];

    fn deref(&self) -> &[PathSegment] {
        &self.0
    }
}

impl From<Vec<PathSegment>> for FieldPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        FieldPath(segments)
    }
}

impl FromIterator<PathSegment> for FieldPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        FieldPath(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FieldPath {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify(&self.0))
    }
}

impl FromStr for FieldPath {
    type Err = MalformedPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        tokenize(s)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldPathVisitor;

        impl Visitor<'_> for FieldPathVisitor {
            type Value = FieldPath;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a field path such as `labels[0].label`")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldPath, E> {
                tokenize(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(FieldPathVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_child_and_parent() {
        let path = FieldPath::root().child("labels").child(1usize).child("label");
        assert_eq!(path.to_string(), "labels[1].label");
        assert_eq!(path.parent().unwrap().to_string(), "labels[1]");
        assert!(FieldPath::root().parent().is_none());
    }

    #[test]
    fn test_starts_with() {
        let path: FieldPath = "job.name".parse().unwrap();
        let prefix: FieldPath = "job".parse().unwrap();
        assert!(path.starts_with(&prefix));
        assert!(!prefix.starts_with(&path));
        assert!(path.starts_with(&FieldPath::root()));
    }

    #[test]
    fn test_from_json_pointer_resolves_indices() {
        let doc = json!({"labels": [{"label": ""}], "map": {"0": true}});
        let path = FieldPath::from_json_pointer("/labels/0/label", &doc).unwrap();
        assert_eq!(path.to_string(), "labels[0].label");

        // A numeric component on a record stays a key.
        let path = FieldPath::from_json_pointer("/map/0", &doc).unwrap();
        assert_eq!(path.segments(), &[PathSegment::from("map"), PathSegment::from("0")]);
    }

    #[test]
    fn test_segment_accessors() {
        let path: FieldPath = "labels[2]".parse().unwrap();
        assert_eq!(path[0].as_key(), Some("labels"));
        assert_eq!(path[0].as_index(), None);
        assert!(!path[0].is_index());
        assert_eq!(path[1].as_index(), Some(2));
        assert_eq!(path[1].as_key(), None);
        assert!(path[1].is_index());
    }

    #[test]
    fn test_from_json_pointer_unescapes() {
        let doc = json!({"a/b": {"c~d": 1}});
        let path = FieldPath::from_json_pointer("/a~1b/c~0d", &doc).unwrap();
        assert_eq!(path.segments(), &[PathSegment::from("a/b"), PathSegment::from("c~d")]);
        assert_eq!(path.to_json_pointer(), "/a~1b/c~0d");
    }

    #[test]
    fn test_from_json_pointer_rejects_relative() {
        let err = FieldPath::from_json_pointer("labels/0", &json!({})).unwrap_err();
        assert_eq!(err.kind, PathErrorKind::NotAPointer);
        assert_eq!(FieldPath::from_json_pointer("", &json!({})).unwrap(), FieldPath::root());
    }

    #[test]
    fn test_serde_as_string() {
        let path: FieldPath = serde_json::from_value(json!("labels[2].label")).unwrap();
        assert_eq!(path, FieldPath::root().child("labels").child(2usize).child("label"));
        assert_eq!(serde_json::to_value(&path).unwrap(), json!("labels[2].label"));
        assert!(serde_json::from_value::<FieldPath>(json!("labels[")).is_err());
    }
}
