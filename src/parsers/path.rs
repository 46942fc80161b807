//! Path navigation over decoded JSON state.
//!
//! Two policies are offered and each call site picks one:
//!
//! - [`lookup`] / [`lookup_or`] are tolerant. Any step that cannot be taken
//!   (missing key, wrong container type, index past the end) ends navigation
//!   with `None` or the caller's default.
//! - [`lookup_strict`] follows dictionary-`get` semantics. A missing key at the
//!   last step yields `Ok(None)`, but stepping *through* anything that is not
//!   the expected container, or indexing past the end of a list, is a
//!   [`StructuralMismatch`].

use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for PathStep<'a> {
    fn from(key: &'a str) -> Self {
        PathStep::Key(key)
    }
}

impl From<usize> for PathStep<'_> {
    fn from(index: usize) -> Self {
        PathStep::Index(index)
    }
}

impl fmt::Display for PathStep<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => write!(f, ".{}", key),
            PathStep::Index(index) => write!(f, "[{}]", index),
        }
    }
}

impl PathStep<'_> {
    fn expected(&self) -> &'static str {
        match self {
            PathStep::Key(_) => "object",
            PathStep::Index(_) => "array",
        }
    }
}

/// Render a path as `$.a.b[0]`.
pub fn render_path(path: &[PathStep<'_>]) -> String {
    let mut rendered = String::from("$");
    for step in path {
        rendered.push_str(&step.to_string());
    }
    rendered
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} at {path}, found {found}")]
pub struct StructuralMismatch {
    pub path: String,
    pub expected: &'static str,
    pub found: String,
}

fn kind_of(value: Option<&Value>) -> &'static str {
    match value {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "bool",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

/// Tolerant navigation. Returns `None` as soon as a step cannot be taken.
pub fn lookup<'v>(root: &'v Value, path: &[PathStep<'_>]) -> Option<&'v Value> {
    path.iter().try_fold(root, |current, step| match (step, current) {
        (PathStep::Key(key), Value::Object(map)) => map.get(*key),
        (PathStep::Index(index), Value::Array(items)) => items.get(*index),
        _ => None,
    })
}

/// Tolerant navigation with an explicit fallback.
pub fn lookup_or<'v>(root: &'v Value, path: &[PathStep<'_>], default: &'v Value) -> &'v Value {
    lookup(root, path).unwrap_or(default)
}

/// Strict navigation. `Ok(None)` means the final key was absent or null.
pub fn lookup_strict<'v>(
    root: &'v Value,
    path: &[PathStep<'_>],
) -> Result<Option<&'v Value>, StructuralMismatch> {
    let mut current = Some(root);

    for (depth, step) in path.iter().enumerate() {
        current = match (step, current) {
            (PathStep::Key(key), Some(Value::Object(map))) => map.get(*key),
            (PathStep::Index(index), Some(Value::Array(items))) => match items.get(*index) {
                Some(item) => Some(item),
                None => {
                    return Err(StructuralMismatch {
                        path: render_path(&path[..=depth]),
                        expected: step.expected(),
                        found: format!("only {} items", items.len()),
                    })
                }
            },
            (_, other) => {
                return Err(StructuralMismatch {
                    path: render_path(&path[..=depth]),
                    expected: step.expected(),
                    found: kind_of(other).to_string(),
                })
            }
        };
    }

    Ok(current.filter(|value| !value.is_null()))
}

/// Scalar JSON values as text. Containers and null have no text form.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Loose truthiness as the retailer's client code treats availability flags.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
