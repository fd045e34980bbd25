//! Scoped view over the ambient context
//!
//! The context is a read-only tree of facts (user, project, cluster...). Every
//! lookup goes through a [`ContextView`], which
//! - records each top-level key it dereferences in a shared [`AccessTracker`],
//!   so a compile run can report whether a given key was read at all;
//! - can be layered with override maps, so that while compiling one element of
//!   an array the element's own fields shadow the outer context.

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::BTreeSet;

use crate::path::{PathSegment, ValuePath};

/// Set of top-level context keys read during one operation
#[derive(Debug, Default)]
pub struct AccessTracker {
    touched: RefCell<BTreeSet<String>>,
}

impl AccessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, key: &str) {
        let mut touched = self.touched.borrow_mut();
        if !touched.contains(key) {
            tracing::trace!("context key '{}' read", key);
            touched.insert(key.to_string());
        }
    }

    /// Whether `key` was dereferenced at least once
    pub fn was_touched(&self, key: &str) -> bool {
        self.touched.borrow().contains(key)
    }

    pub fn touched_keys(&self) -> Vec<String> {
        self.touched.borrow().iter().cloned().collect()
    }
}

/// Layered, access-tracked lookup over the context tree
#[derive(Clone, Debug)]
pub struct ContextView<'a> {
    base: &'a Value,
    /// Innermost layer last
    layers: Vec<&'a Map<String, Value>>,
    tracker: &'a AccessTracker,
}

impl<'a> ContextView<'a> {
    pub fn new(base: &'a Value, tracker: &'a AccessTracker) -> Self {
        Self {
            base,
            layers: Vec::new(),
            tracker,
        }
    }

    /// A view where the keys of `overrides` shadow everything below
    pub fn with_overrides<'b>(&'b self, overrides: &'b Map<String, Value>) -> ContextView<'b>
    where
        'a: 'b,
    {
        let mut layers: Vec<&'b Map<String, Value>> = self.layers.clone();
        layers.push(overrides);
        ContextView {
            base: self.base,
            layers,
            tracker: self.tracker,
        }
    }

    pub fn tracker(&self) -> &'a AccessTracker {
        self.tracker
    }

    /// Look up one top-level key
    ///
    /// Only lookups that reach the base context are recorded; a key shadowed
    /// by an override layer is never read from the context.
    pub fn get_key(&self, key: &str) -> Option<&'a Value> {
        if let Some(shadowed) = self.layers.iter().rev().find_map(|layer| layer.get(key)) {
            return Some(shadowed);
        }
        self.tracker.record(key);
        self.base.get(key)
    }

    /// Resolve a path; the first segment must name a top-level key
    pub fn get(&self, path: &ValuePath) -> Option<&'a Value> {
        let (first, rest) = path.segments().split_first()?;
        let PathSegment::Key(key) = first else {
            return None;
        };
        let head = self.get_key(key)?;
        ValuePath::from_segments(rest.to_vec()).get(head)
    }
}
