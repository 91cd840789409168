//! Scopes: immutable sets of equality filters identifying "the" record a
//! caller wants, plus the attribute patches applied to it.

pub mod patch;

pub use patch::AttributePatch;

use crate::core::Value;

/// A set of `(field, value)` equality constraints over one table.
///
/// Immutable once built; a scope resolves to at most one record.
#[derive(Debug, Clone)]
pub struct Scope {
    table: String,
    filters: Vec<(String, Value)>,
}

impl Scope {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
        }
    }

    /// Returns a new scope with an additional equality filter.
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &[(String, Value)] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
