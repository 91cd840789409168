use crate::core::{Record, Result, StoreError};
use crate::scope::{AttributePatch, Scope};
use crate::upsert::FailureClass;

/// Transaction handle handed out by a [`ScopeStore`].
///
/// A handle that is dropped without `commit` or `rollback` must roll back,
/// so an early `?` return inside an attempt can never leak partial writes.
pub trait StoreTransaction {
    fn commit(self) -> Result<()>;
    fn rollback(self) -> Result<()>;
}

/// Storage collaborator trait - allows pluggable storage backends.
///
/// This is the full capability set the upsert engine consumes; everything
/// else (schema management, read-back helpers) is backend-specific surface.
pub trait ScopeStore: Send + Sync {
    type Tx: StoreTransaction;

    /// Opens a transaction scope.
    fn begin(&self) -> Result<Self::Tx>;

    /// Single-record lookup by scope. At most one match.
    fn resolve(&self, tx: &Self::Tx, scope: &Scope) -> Result<Option<Record>>;

    /// Builds a transient record: schema defaults, then the scope's filter
    /// values, then `attrs` (attrs win on overlap). Nothing is written.
    fn materialize(&self, scope: &Scope, attrs: &AttributePatch) -> Result<Record>;

    /// Applies a partial update to an in-memory record. Nothing is written.
    fn apply_patch(&self, record: &mut Record, attrs: &AttributePatch) -> Result<()>;

    /// Writes the record inside `tx`: insert when transient (assigning its
    /// identity), update when persistent.
    fn persist(&self, tx: &Self::Tx, record: &mut Record) -> Result<()>;

    /// Classifies a persist failure for the retry engine. Centralized per
    /// backend so dialect-specific signatures stay out of the core.
    fn classify_failure(&self, err: &StoreError) -> FailureClass;
}
