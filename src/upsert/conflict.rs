use crate::core::StoreError;
use std::fmt;

/// Classification of a persist failure, as seen by the retry engine.
///
/// Deliberately a closed two-way split: uniqueness conflicts are the only
/// failures the engine ever recovers locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    UniquenessConflict,
    Other,
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::UniquenessConflict => "unique_constraint",
            Self::Other => "other",
        };
        write!(f, "{label}")
    }
}

/// Classifies a [`StoreError`] for the in-memory backend.
///
/// Structured variants are the primary signal. Message matching is kept only
/// for `ExecutionError`-wrapped failures from foreign backends that cannot
/// surface a typed code; it is a documented last resort.
pub fn classify_store_failure(err: &StoreError) -> FailureClass {
    match err {
        StoreError::UniqueViolation { .. } => FailureClass::UniquenessConflict,
        StoreError::ExecutionError(message) => {
            let lower = message.to_lowercase();
            if lower.contains("unique constraint violation")
                || lower.contains("unique index violation")
            {
                FailureClass::UniquenessConflict
            } else {
                FailureClass::Other
            }
        }
        _ => FailureClass::Other,
    }
}

/// Configuration for automatic retry after a uniqueness conflict.
#[derive(Debug, Clone)]
pub struct ConflictRetryPolicy {
    /// Maximum number of attempt restarts within one outer call.
    pub max_retries: usize,
    /// Base duration in milliseconds for backoff calculation.
    pub base_backoff_ms: u64,
    /// Maximum duration in milliseconds for backoff.
    pub max_backoff_ms: u64,
}

impl Default for ConflictRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff_ms: 5,
            max_backoff_ms: 100,
        }
    }
}

impl ConflictRetryPolicy {
    /// Policy that surfaces the first uniqueness conflict immediately.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Computes exponential retry backoff in milliseconds.
    pub fn backoff_ms(&self, attempt: usize) -> u64 {
        let base = self.base_backoff_ms;
        if base == 0 {
            return 0;
        }
        let cap = self.max_backoff_ms.max(base);
        let mut backoff = base;
        for _ in 1..attempt {
            backoff = backoff.saturating_mul(2).min(cap);
        }
        backoff
    }
}
