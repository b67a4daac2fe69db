//! Field-path codec and tree operations for form documents.
//!
//! A field path addresses a location inside a nested JSON document using the
//! dotted/bracketed notation form libraries use (`labels[0].label`). This
//! crate parses and formats such paths and reads, writes and removes values
//! at them.
//!
//! # Example
//!
//! ```
//! use formstate_path::{tokenize, tree, FieldPath};
//! use serde_json::json;
//!
//! let path = tokenize("labels[1].label").unwrap();
//! assert_eq!(path.to_string(), "labels[1].label");
//!
//! let doc = tree::write(&json!({}), &path, json!("Dog"));
//! assert_eq!(doc, json!({"labels": [null, {"label": "Dog"}]}));
//! assert_eq!(tree::read(&doc, &path), Some(&json!("Dog")));
//! ```

use thiserror::Error;

pub mod pattern;
pub mod tree;
pub mod types;

pub use pattern::{PathPattern, PatternSegment};
pub use types::{FieldPath, PathSegment};

/// Maximum allowed path depth.
pub const MAX_PATH_DEPTH: usize = 256;

/// Largest index segment accepted by default. Writing pads a sequence up to
/// the index, so this also bounds what a single write can allocate.
pub const MAX_PATH_INDEX: usize = 100_000;

/// Limits applied when tokenizing a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct PathOptions {
    pub max_depth: usize,
    pub max_index: usize,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_PATH_DEPTH,
            max_index: MAX_PATH_INDEX,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PathErrorKind {
    #[error("empty key segment")]
    EmptyKey,
    #[error("unbalanced bracket")]
    UnbalancedBracket,
    #[error("invalid index")]
    InvalidIndex,
    #[error("unexpected character after index")]
    UnexpectedCharacter,
    #[error("path too deep")]
    TooDeep,
    #[error("wildcard not allowed")]
    WildcardNotAllowed,
    #[error("not a JSON pointer")]
    NotAPointer,
}

/// A caller supplied a path string that cannot be tokenized.
///
/// This is a programming error, not user input: the path literals come from
/// form code, never from what a user types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed field path {path:?}: {kind}")]
pub struct MalformedPathError {
    pub path: String,
    pub kind: PathErrorKind,
}

impl MalformedPathError {
    pub fn new(path: &str, kind: PathErrorKind) -> Self {
        Self {
            path: path.to_string(),
            kind,
        }
    }
}

/// A tokenized step, before deciding whether wildcards are acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawSegment {
    Key(String),
    Index(usize),
    Wildcard,
}

/// Check if a string represents a canonical non-negative array index.
///
/// # Example
///
/// ```
/// use formstate_path::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("123"));
/// assert!(!is_valid_index("01"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index(""));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    // First char can't be leading zero unless it's just "0"
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}

/// Unescapes a JSON Pointer component (`~1` to `/`, then `~0` to `~`).
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer component (`~` to `~0`, then `/` to `~1`).
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

pub(crate) fn scan(
    path: &str,
    opts: &PathOptions,
    allow_wildcard: bool,
) -> Result<Vec<RawSegment>, MalformedPathError> {
    let fail = |kind| MalformedPathError::new(path, kind);
    let bytes = path.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut i = 0;
    let mut need_key = false;

    while i < len {
        match bytes[i] {
            b'[' if !need_key => {
                let close = path[i + 1..]
                    .find(']')
                    .ok_or_else(|| fail(PathErrorKind::UnbalancedBracket))?;
                let inner = &path[i + 1..i + 1 + close];
                if inner.contains('[') {
                    return Err(fail(PathErrorKind::UnbalancedBracket));
                }
                if inner == "*" {
                    if !allow_wildcard {
                        return Err(fail(PathErrorKind::WildcardNotAllowed));
                    }
                    out.push(RawSegment::Wildcard);
                } else {
                    if !is_valid_index(inner) {
                        return Err(fail(PathErrorKind::InvalidIndex));
                    }
                    let index: usize = inner
                        .parse()
                        .map_err(|_| fail(PathErrorKind::InvalidIndex))?;
                    if index > opts.max_index {
                        return Err(fail(PathErrorKind::InvalidIndex));
                    }
                    out.push(RawSegment::Index(index));
                }
                i += close + 2;
            }
            b']' => return Err(fail(PathErrorKind::UnbalancedBracket)),
            _ => {
                let end = path[i..]
                    .find(['.', '[', ']'])
                    .map_or(len, |offset| i + offset);
                if end == i {
                    return Err(fail(PathErrorKind::EmptyKey));
                }
                out.push(RawSegment::Key(path[i..end].to_string()));
                i = end;
            }
        }
        need_key = false;

        if i < len {
            match bytes[i] {
                b'.' => {
                    i += 1;
                    need_key = true;
                }
                b'[' => {}
                b']' => return Err(fail(PathErrorKind::UnbalancedBracket)),
                _ => return Err(fail(PathErrorKind::UnexpectedCharacter)),
            }
        }
        if out.len() > opts.max_depth {
            return Err(fail(PathErrorKind::TooDeep));
        }
    }

    if need_key {
        return Err(fail(PathErrorKind::EmptyKey));
    }
    Ok(out)
}

/// Parse a field path string into segments.
///
/// Keys are separated by `.`, indices are written in brackets and must be
/// canonical decimal integers. The empty string is the root path.
///
/// # Errors
///
/// Returns [`MalformedPathError`] for unbalanced brackets, empty key
/// segments, non-numeric or zero-padded indices, or paths deeper than
/// [`MAX_PATH_DEPTH`].
///
/// # Example
///
/// ```
/// use formstate_path::{tokenize, PathSegment};
///
/// let path = tokenize("labels[0].label").unwrap();
/// assert_eq!(
///     path.segments(),
///     &[
///         PathSegment::Key("labels".into()),
///         PathSegment::Index(0),
///         PathSegment::Key("label".into()),
///     ]
/// );
/// assert!(tokenize("labels[0").is_err());
/// assert!(tokenize("job..name").is_err());
/// ```
pub fn tokenize(path: &str) -> Result<FieldPath, MalformedPathError> {
    tokenize_with(path, &PathOptions::default())
}

/// [`tokenize`] with explicit limits.
pub fn tokenize_with(path: &str, opts: &PathOptions) -> Result<FieldPath, MalformedPathError> {
    scan(path, opts, false)?
        .into_iter()
        .map(|raw| match raw {
            RawSegment::Key(key) => Ok(PathSegment::Key(key)),
            RawSegment::Index(index) => Ok(PathSegment::Index(index)),
            RawSegment::Wildcard => Err(MalformedPathError::new(
                path,
                PathErrorKind::WildcardNotAllowed,
            )),
        })
        .collect()
}

/// Format segments into the canonical string form.
///
/// # Example
///
/// ```
/// use formstate_path::{stringify, PathSegment};
///
/// assert_eq!(stringify(&[]), "");
/// assert_eq!(
///     stringify(&[PathSegment::Key("labels".into()), PathSegment::Index(2)]),
///     "labels[2]"
/// );
/// ```
pub fn stringify(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    out
}
