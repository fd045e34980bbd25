//! Paths into values documents and context trees
//!
//! A [`ValuePath`] is an ordered list of object keys and array indices. It is
//! used both for locations inside the values document (form fields, edits) and
//! for the references written in `x-onyxia` expressions, which are parsed from
//! `user.idep`, `items[0].name` or `labels["app.kubernetes.io/name"]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{FormError, Result};

/// Segment of a value path
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Array index access: [0], [1], etc.
    Index(usize),
    /// Object key access: .fieldName or ["field.name"]
    Key(String),
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
            PathSegment::Index(idx) => Some(*idx),
            PathSegment::Key(_) => None,
        }
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
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// Location inside a JSON-like tree
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValuePath {
    segments: Vec<PathSegment>,
}

impl ValuePath {
    /// Create a root path (empty)
    pub fn root() -> Self {
        Self { segments: vec![] }
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Check if this is the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Push an object key segment
    pub fn push_key(&self, key: &str) -> Self {
        let mut new = self.clone();
        new.segments.push(PathSegment::Key(key.to_string()));
        new
    }

    /// Push an array index segment
    pub fn push_index(&self, idx: usize) -> Self {
        let mut new = self.clone();
        new.segments.push(PathSegment::Index(idx));
        new
    }

    /// Concatenate another path after this one
    pub fn join(&self, other: &ValuePath) -> Self {
        let mut new = self.clone();
        new.segments.extend(other.segments.iter().cloned());
        new
    }

    pub fn first(&self) -> Option<&PathSegment> {
        self.segments.first()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Get the parent path (without the last segment)
    pub fn parent(&self) -> Self {
        let mut new = self.clone();
        new.segments.pop();
        new
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn starts_with(&self, prefix: &ValuePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Longest path that prefixes both `self` and `other`
    pub fn common_prefix(&self, other: &ValuePath) -> Self {
        let segments = self
            .segments
            .iter()
            .zip(other.segments.iter())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.clone())
            .collect();
        Self { segments }
    }

    /// Parse a path expression into a ValuePath
    ///
    /// Accepts dotted keys, bracketed indices and bracketed quoted keys, which
    /// may contain dots: `a.b[0]["c.d"]['e']`. Parsing is lenient: an
    /// unquoted bracket content that is not a number is taken as a key.
    pub fn parse(s: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = s.trim().chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if !current.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut current)));
                    }
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut current)));
                    }
                    match chars.peek().copied() {
                        Some(quote @ ('"' | '\'')) => {
                            chars.next();
                            let mut key = String::new();
                            for c in chars.by_ref() {
                                if c == quote {
                                    break;
                                }
                                key.push(c);
                            }
                            // Skip up to and including the closing bracket
                            for c in chars.by_ref() {
                                if c == ']' {
                                    break;
                                }
                            }
                            segments.push(PathSegment::Key(key));
                        }
                        _ => {
                            let mut index_str = String::new();
                            for c in chars.by_ref() {
                                if c == ']' {
                                    break;
                                }
                                index_str.push(c);
                            }
                            let index_str = index_str.trim();
                            match index_str.parse::<usize>() {
                                Ok(idx) => segments.push(PathSegment::Index(idx)),
                                Err(_) if !index_str.is_empty() => {
                                    segments.push(PathSegment::Key(index_str.to_string()))
                                }
                                Err(_) => {}
                            }
                        }
                    }
                }
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            segments.push(PathSegment::Key(current));
        }

        Self { segments }
    }

    /// Look up the value at this path
    pub fn get<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| step(node, segment))
    }

    pub fn get_mut<'v>(&self, root: &'v mut Value) -> Option<&'v mut Value> {
        let mut node = root;
        for segment in &self.segments {
            node = match (node, segment) {
                (Value::Object(map), PathSegment::Key(key)) => map.get_mut(key)?,
                (Value::Array(arr), PathSegment::Index(idx)) => arr.get_mut(*idx)?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Assign `value` at this path
    ///
    /// The parent must exist. A missing key of an existing object is inserted
    /// and an index equal to the array length appends.
    pub fn set(&self, root: &mut Value, value: Value) -> Result<()> {
        let Some(last) = self.last() else {
            *root = value;
            return Ok(());
        };
        let not_found = || FormError::PathNotFound { path: self.clone() };
        let parent = self.parent().get_mut(root).ok_or_else(not_found)?;
        match (parent, last) {
            (Value::Object(map), PathSegment::Key(key)) => {
                map.insert(key.clone(), value);
                Ok(())
            }
            (Value::Array(arr), PathSegment::Index(idx)) if *idx < arr.len() => {
                arr[*idx] = value;
                Ok(())
            }
            (Value::Array(arr), PathSegment::Index(idx)) if *idx == arr.len() => {
                arr.push(value);
                Ok(())
            }
            _ => Err(not_found()),
        }
    }
}

fn step<'v>(node: &'v Value, segment: &PathSegment) -> Option<&'v Value> {
    match (node, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get(key),
        (Value::Array(arr), PathSegment::Index(idx)) => arr.get(*idx),
        // Context references may spell an index as a dotted segment: `list.0`
        (Value::Array(arr), PathSegment::Key(key)) => {
            key.parse::<usize>().ok().and_then(|idx| arr.get(idx))
        }
        _ => None,
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                PathSegment::Key(name) if needs_quoting(name) => write!(f, "[\"{}\"]", name)?,
                PathSegment::Key(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Key(name) => write!(f, ".{}", name)?,
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty() || key.contains(['.', '[', ']', '"', '\''])
}

impl<S: Into<PathSegment>> FromIterator<S> for ValuePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Build a [`ValuePath`] from a list of keys and indices
///
/// ```
/// use helm_form::value_path;
/// let path = value_path!["resources", "limits", "cpu"];
/// assert_eq!(path.to_string(), "resources.limits.cpu");
/// ```
#[macro_export]
macro_rules! value_path {
    () => { $crate::path::ValuePath::root() };
    ($($seg:expr),+ $(,)?) => {
        $crate::path::ValuePath::from_segments(vec![$($crate::path::PathSegment::from($seg)),+])
    };
}
