//! Which fields the user has interacted with.
//!
//! The touched tree shadows the document: a leaf `true` at a path marks that
//! exact path as touched. Matching is leaf-exact, so touching `job` says
//! nothing about `job.name` and the other way round. Because a location
//! holds either a mark or children, touching a descendant replaces an
//! ancestor's own mark and vice versa.

use serde::Serialize;
use serde_json::{Map, Value};

use formstate_path::{tree, FieldPath, PathSegment};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TouchedTree(Value);

impl Default for TouchedTree {
    fn default() -> Self {
        TouchedTree(Value::Object(Map::new()))
    }
}

impl TouchedTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing shadow tree, e.g. one restored from a saved session.
    pub fn from_value(value: Value) -> Self {
        TouchedTree(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Mark every path in `paths` as touched.
    pub fn touch<'a, I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = &'a FieldPath>,
    {
        for path in paths {
            tree::write_in_place(&mut self.0, path, Value::Bool(true));
        }
    }

    /// Forget every path in `paths`; an untouched path is indistinguishable
    /// from one never visited.
    pub fn untouch<'a, I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = &'a FieldPath>,
    {
        for path in paths {
            tree::remove_in_place(&mut self.0, path);
        }
    }

    /// Copy-on-write variant of [`TouchedTree::touch`].
    pub fn with_touched<'a, I>(&self, paths: I) -> Self
    where
        I: IntoIterator<Item = &'a FieldPath>,
    {
        let mut next = self.clone();
        next.touch(paths);
        next
    }

    /// Copy-on-write variant of [`TouchedTree::untouch`].
    pub fn with_untouched<'a, I>(&self, paths: I) -> Self
    where
        I: IntoIterator<Item = &'a FieldPath>,
    {
        let mut next = self.clone();
        next.untouch(paths);
        next
    }

    pub fn is_touched(&self, path: &[PathSegment]) -> bool {
        matches!(tree::read(&self.0, path), Some(Value::Bool(true)))
    }

    /// All touched paths, in tree order.
    pub fn paths(&self) -> Vec<FieldPath> {
        fn walk(node: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<FieldPath>) {
            match node {
                Value::Bool(true) => out.push(FieldPath::new(path.clone())),
                Value::Array(items) => {
                    for (index, item) in items.iter().enumerate() {
                        path.push(PathSegment::Index(index));
                        walk(item, path, out);
                        path.pop();
                    }
                }
                Value::Object(map) => {
                    for (key, item) in map {
                        path.push(PathSegment::Key(key.clone()));
                        walk(item, path, out);
                        path.pop();
                    }
                }
                _ => {}
            }
        }
        let mut out = Vec::new();
        walk(&self.0, &mut Vec::new(), &mut out);
        out
    }
}
