//! Read, write and remove values at field paths.
//!
//! `read` never fails: a missing container, or one of the wrong kind for the
//! next segment, reads as absent. `write` materializes whatever containers the
//! path needs, replacing any value of the wrong kind on the way, so that
//! `read(&write(d, p, v), p) == Some(&v)` holds for every document.
//!
//! The `*_in_place` variants mutate an owned document; `write` and `removed`
//! leave the input untouched and return the next document.

use serde_json::{Map, Value};

use crate::PathSegment;

/// Get the value at `path`, or `None` when nothing is there.
///
/// # Example
///
/// ```
/// use formstate_path::{tokenize, tree};
/// use serde_json::json;
///
/// let doc = json!({"labels": [{"label": "Cat"}]});
/// assert_eq!(tree::read(&doc, &tokenize("labels[0].label").unwrap()), Some(&json!("Cat")));
/// assert_eq!(tree::read(&doc, &tokenize("labels[1].label").unwrap()), None);
/// // Index segments never address record fields.
/// assert_eq!(tree::read(&json!({"0": 1}), &tokenize("[0]").unwrap()), None);
/// ```
pub fn read<'a>(root: &'a Value, path: &[PathSegment]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, segment| match (node, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get(key),
        (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
        _ => None,
    })
}

/// Get a mutable reference to the value at `path`, if it exists.
pub fn read_mut<'a>(root: &'a mut Value, path: &[PathSegment]) -> Option<&'a mut Value> {
    let mut node = root;
    for segment in path {
        node = match (node, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map.get_mut(key)?,
            (Value::Array(items), PathSegment::Index(index)) => items.get_mut(*index)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Set `value` at `path`, creating intermediate containers.
///
/// A key segment needs a record and an index segment needs a sequence; a
/// missing or wrong-kind value in that position is replaced by an empty
/// container of the right kind. Sequences shorter than an index are padded
/// with `null`. The empty path replaces the root. A path holding an index of
/// `usize::MAX` cannot be materialized and leaves `root` as it was.
pub fn write_in_place(root: &mut Value, path: &[PathSegment], value: Value) {
    if path.iter().any(|segment| matches!(segment, PathSegment::Index(usize::MAX))) {
        return;
    }
    write_at(root, path, value);
}

fn write_at(root: &mut Value, path: &[PathSegment], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *root = value;
        return;
    };
    match head {
        PathSegment::Key(key) => {
            if !root.is_object() {
                *root = Value::Object(Map::new());
            }
            if let Value::Object(map) = root {
                let slot = map.entry(key.clone()).or_insert(Value::Null);
                write_at(slot, rest, value);
            }
        }
        PathSegment::Index(index) => {
            if !root.is_array() {
                *root = Value::Array(Vec::new());
            }
            if let Value::Array(items) = root {
                if items.len() <= *index {
                    items.resize(*index + 1, Value::Null);
                }
                write_at(&mut items[*index], rest, value);
            }
        }
    }
}

/// Copy-on-write variant of [`write_in_place`]: returns the next document.
///
/// # Example
///
/// ```
/// use formstate_path::{tokenize, tree};
/// use serde_json::json;
///
/// let doc = json!({"job": {"name": "a"}, "other": 1});
/// let next = tree::write(&doc, &tokenize("job.name").unwrap(), json!("b"));
/// assert_eq!(next, json!({"job": {"name": "b"}, "other": 1}));
/// assert_eq!(doc, json!({"job": {"name": "a"}, "other": 1}));
/// ```
pub fn write(root: &Value, path: &[PathSegment], value: Value) -> Value {
    let mut next = root.clone();
    write_in_place(&mut next, path, value);
    next
}

/// Remove the entry at `path` from its parent container.
///
/// Removing a sequence element splices it out, shifting later elements
/// down. Returns the removed value, or `None` (leaving the document as it
/// was) when nothing is at `path`. Removing the root resets it to `null`.
pub fn remove_in_place(root: &mut Value, path: &[PathSegment]) -> Option<Value> {
    let Some((last, parent_path)) = path.split_last() else {
        return Some(std::mem::take(root));
    };
    match (read_mut(root, parent_path)?, last) {
        (Value::Object(map), PathSegment::Key(key)) => map.remove(key),
        (Value::Array(items), PathSegment::Index(index)) if *index < items.len() => {
            Some(items.remove(*index))
        }
        _ => None,
    }
}

/// Copy-on-write variant of [`remove_in_place`]: returns the next document.
///
/// # Example
///
/// ```
/// use formstate_path::{tokenize, tree};
/// use serde_json::json;
///
/// let doc = json!({"xs": ["a", "b", "c"]});
/// let next = tree::removed(&doc, &tokenize("xs[1]").unwrap());
/// assert_eq!(next, json!({"xs": ["a", "c"]}));
/// ```
pub fn removed(root: &Value, path: &[PathSegment]) -> Value {
    let mut next = root.clone();
    remove_in_place(&mut next, path);
    next
}

/// Check if `node` holds a string leaf anywhere inside it.
pub fn has_string_leaf(node: &Value) -> bool {
    match node {
        Value::String(_) => true,
        Value::Array(items) => items.iter().any(has_string_leaf),
        Value::Object(map) => map.values().any(has_string_leaf),
        _ => false,
    }
}

/// Visit every string leaf in `node` together with its path.
pub fn for_each_string_leaf<F>(node: &Value, f: &mut F)
where
    F: FnMut(&[PathSegment], &str),
{
    fn walk<F>(node: &Value, path: &mut Vec<PathSegment>, f: &mut F)
    where
        F: FnMut(&[PathSegment], &str),
    {
        match node {
            Value::String(s) => f(path, s),
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    walk(item, path, f);
                    path.pop();
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    path.push(PathSegment::Key(key.clone()));
                    walk(item, path, f);
                    path.pop();
                }
            }
            _ => {}
        }
    }
    walk(node, &mut Vec::new(), f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize;
    use serde_json::json;

    fn p(path: &str) -> Vec<PathSegment> {
        tokenize(path).unwrap().into_segments()
    }

    #[test]
    fn test_write_unrepresentable_index_is_noop() {
        let doc = json!({"a": {"xs": [1]}});
        let path = vec![
            PathSegment::Key("a".into()),
            PathSegment::Key("ys".into()),
            PathSegment::Index(usize::MAX),
        ];
        assert_eq!(write(&doc, &path, json!(2)), doc);
    }

    #[test]
    fn test_read_scalar_root() {
        assert_eq!(read(&json!(123), &[]), Some(&json!(123)));
    }

    #[test]
    fn test_read_missing_intermediate() {
        let doc = json!({"a": 1});
        assert_eq!(read(&doc, &p("a.b.c")), None);
        assert_eq!(read(&doc, &p("x[0]")), None);
    }

    #[test]
    fn test_read_key_on_sequence() {
        let doc = json!({"xs": [1, 2]});
        assert_eq!(read(&doc, &p("xs.length")), None);
    }

    #[test]
    fn test_read_explicit_null() {
        let doc = json!({"a": null});
        assert_eq!(read(&doc, &p("a")), Some(&Value::Null));
    }

    #[test]
    fn test_write_creates_record_and_sequence() {
        let doc = write(&Value::Null, &p("a.b[1].c"), json!(true));
        assert_eq!(doc, json!({"a": {"b": [null, {"c": true}]}}));
    }

    #[test]
    fn test_write_keeps_siblings() {
        let doc = json!({"a": {"x": 1, "y": 2}, "b": [1, 2]});
        let next = write(&doc, &p("a.x"), json!(10));
        assert_eq!(next, json!({"a": {"x": 10, "y": 2}, "b": [1, 2]}));
    }

    #[test]
    fn test_write_extends_sequence() {
        let doc = json!({"xs": ["a"]});
        let next = write(&doc, &p("xs[3]"), json!("d"));
        assert_eq!(next, json!({"xs": ["a", null, null, "d"]}));
    }

    #[test]
    fn test_write_replaces_wrong_kind() {
        let doc = json!({"a": "scalar", "b": {"k": 1}});
        let next = write(&doc, &p("a.b"), json!(1));
        assert_eq!(next["a"], json!({"b": 1}));
        let next = write(&doc, &p("b[0]"), json!(1));
        assert_eq!(next["b"], json!([1]));
    }

    #[test]
    fn test_write_root() {
        assert_eq!(write(&json!({"a": 1}), &[], json!("x")), json!("x"));
    }

    #[test]
    fn test_remove_key() {
        let mut doc = json!({"a": 1, "b": 2});
        assert_eq!(remove_in_place(&mut doc, &p("a")), Some(json!(1)));
        assert_eq!(doc, json!({"b": 2}));
    }

    #[test]
    fn test_remove_splices_sequence() {
        let doc = json!({"xs": ["a", "b", "c"]});
        let next = removed(&doc, &p("xs[1]"));
        assert_eq!(next, json!({"xs": ["a", "c"]}));
        assert_eq!(next["xs"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let doc = json!({"xs": [1], "a": {"b": 1}});
        assert_eq!(removed(&doc, &p("xs[5]")), doc);
        assert_eq!(removed(&doc, &p("a.c")), doc);
        assert_eq!(removed(&doc, &p("q.r.s")), doc);
        assert_eq!(removed(&doc, &p("a[0]")), doc);
    }

    #[test]
    fn test_remove_root() {
        let mut doc = json!({"a": 1});
        assert_eq!(remove_in_place(&mut doc, &[]), Some(json!({"a": 1})));
        assert_eq!(doc, Value::Null);
    }

    #[test]
    fn test_has_string_leaf() {
        assert!(has_string_leaf(&json!({"a": [null, {"b": "x"}]})));
        assert!(!has_string_leaf(&json!({"a": [null, {}]})));
        assert!(!has_string_leaf(&Value::Null));
    }

    #[test]
    fn test_for_each_string_leaf() {
        let tree = json!({"a": "x", "b": [null, {"c": "y"}]});
        let mut seen = Vec::new();
        for_each_string_leaf(&tree, &mut |path, msg| {
            seen.push((crate::stringify(path), msg.to_string()));
        });
        seen.sort();
        assert_eq!(
            seen,
            vec![("a".to_string(), "x".to_string()), ("b[1].c".to_string(), "y".to_string())]
        );
    }
}
