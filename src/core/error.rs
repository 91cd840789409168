use crate::core::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Unique constraint violation: column '{column}' already contains value {value}")]
    UniqueViolation { column: String, value: Value },

    #[error("Validation failed: {0}")]
    ValidationFailure(String),

    #[error("Transport error: {0}")]
    TransportFailure(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// True for failures raised by domain-level validation during persist.
    ///
    /// Boundary errors (`ColumnNotFound`, `TypeMismatch`) are excluded: they
    /// are raised before persist is ever attempted and always propagate.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailure(_))
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
