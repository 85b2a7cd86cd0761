//! Value maps carried through the dispatch pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Route values keyed by route parameter name.
///
/// Ordered so that equality and `Debug` output are stable across runs.
pub type RouteValues = BTreeMap<String, String>;

/// Bound handler arguments keyed by declared parameter name.
///
/// An optional parameter that received no value is bound as `Value::Null`.
pub type BoundArguments = BTreeMap<String, Value>;

/// Per-field validation errors produced as a side effect of argument binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationState {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationState {
    /// Create an empty (fully valid) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error message against a field.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// True when no field carries an error.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors recorded for a field, empty if the field is valid.
    pub fn errors_for(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of all fields with at least one error.
    pub fn invalid_fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Borrow the underlying field → messages map.
    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }
}

impl<K, V, I> FromIterator<(K, I)> for ValidationState
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = V>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut state = Self::new();
        for (field, messages) in iter {
            let field = field.into();
            for message in messages {
                state.add_error(field.clone(), message);
            }
        }
        state
    }
}
