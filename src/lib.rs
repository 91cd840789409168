//! # scopedb
//!
//! Atomic find-or-create / create-or-update on scoped record collections.
//!
//! The naive "query, then insert if absent" pattern races under concurrency:
//! two callers can both observe "no match" and both insert. Here every
//! operation runs inside a transaction, and an insert that loses the race to
//! a uniqueness constraint is rolled back and re-entered from the lookup
//! step, bounded by a per-call retry budget. Storage is the final arbiter;
//! the caller never reasons about the race.
//!
//! A scope is a set of equality filters identifying "the" record:
//!
//! ```
//! use scopedb::{Column, DataType, MemoryStore, TableSchema, attrs};
//!
//! # fn main() -> scopedb::Result<()> {
//! let db = MemoryStore::new();
//! db.create_table(TableSchema::new(
//!     "options",
//!     vec![
//!         Column::new("name", DataType::Text).not_null().unique(),
//!         Column::new("value", DataType::Text),
//!     ],
//! ))?;
//!
//! // Inserts {name: "foo", value: "bar"} because nothing matches the scope.
//! let record = db
//!     .collection("options")
//!     .where_eq("name", "foo")
//!     .find_or_create(attrs! { "value" => "bar" })?;
//! assert!(record.is_persistent());
//!
//! // The match now exists, so it is returned untouched.
//! let again = db
//!     .collection("options")
//!     .where_eq("name", "foo")
//!     .find_or_create(attrs! { "value" => "ignored" })?;
//! assert_eq!(again.id(), record.id());
//! assert_eq!(again.get("value").unwrap().as_str(), Some("bar"));
//!
//! // create_or_update patches the existing match instead.
//! let updated = db
//!     .collection("options")
//!     .where_eq("name", "foo")
//!     .create_or_update(attrs! { "value" => "bar2" })?;
//! assert_eq!(updated.get("value").unwrap().as_str(), Some("bar2"));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod facade;
mod macros;
pub mod scope;
pub mod storage;
pub mod transaction;
pub mod upsert;

// Re-export main types for convenience
pub use crate::core::{
    Column, DataType, Record, RecordId, Result, Row, StoreError, TableSchema, Value,
};
pub use facade::{Collection, ScopedCollection};
pub use scope::{AttributePatch, Scope};
pub use storage::{MemoryStore, ScopeStore, StoreTransaction};
pub use transaction::MemoryTx;
pub use upsert::{
    ConflictRetryPolicy, FailureClass, HookOutcome, SaveMode, classify_store_failure,
};
