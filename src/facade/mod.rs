//! Caller surface: a [`Collection`] names a table, [`ScopedCollection`] adds
//! the equality filters and exposes the two operation families.

use crate::core::{Record, RecordId, Result, Value};
use crate::scope::{AttributePatch, Scope};
use crate::storage::MemoryStore;
use crate::storage::engine::{ScopeStore, StoreTransaction};
use crate::upsert::conflict::ConflictRetryPolicy;
use crate::upsert::engine::{self, Family, Hook};
use crate::upsert::{HookOutcome, SaveMode};

/// Handle on one table of a store.
pub struct Collection<'a, S: ScopeStore> {
    store: &'a S,
    table: String,
}

impl<'a, S: ScopeStore> Collection<'a, S> {
    pub fn new(store: &'a S, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.table
    }

    /// Narrows the collection to records matching an equality filter.
    pub fn where_eq(
        self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> ScopedCollection<'a, S> {
        ScopedCollection {
            store: self.store,
            scope: Scope::new(self.table).with_filter(field, value),
            retry: ConflictRetryPolicy::default(),
        }
    }
}

impl<'a> Collection<'a, MemoryStore> {
    pub fn count(&self) -> Result<usize> {
        self.store.row_count(&self.table)
    }

    pub fn find(&self, id: RecordId) -> Result<Option<Record>> {
        self.store.find_record(&self.table, id)
    }
}

/// A collection narrowed by equality filters: the scope identifying "the"
/// record, plus the operations that find, create, or update it atomically.
pub struct ScopedCollection<'a, S: ScopeStore> {
    store: &'a S,
    scope: Scope,
    retry: ConflictRetryPolicy,
}

impl<'a, S: ScopeStore> ScopedCollection<'a, S> {
    /// Adds another equality filter to the scope.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.scope = self.scope.with_filter(field, value);
        self
    }

    /// Overrides the uniqueness-conflict retry policy for this call chain.
    pub fn with_retry_policy(mut self, policy: ConflictRetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Plain scope lookup, no create and no update.
    pub fn resolve(&self) -> Result<Option<Record>> {
        let tx = self.store.begin()?;
        let found = self.store.resolve(&tx, &self.scope);
        tx.commit()?;
        found
    }

    // ------------------------------------------------------------------
    // Find-or-create family: an existing match is returned untouched.
    // ------------------------------------------------------------------

    /// Finds the scoped record or creates it from the scope plus `attrs`.
    /// Persist-validation failures are swallowed into the returned record.
    pub fn find_or_create(&self, attrs: AttributePatch) -> Result<Record> {
        self.run(Family::FindOrInitialize, SaveMode::Persist, &attrs, None)
    }

    /// Same as [`find_or_create`](Self::find_or_create), with a hook invoked
    /// on a newly built record before it is persisted.
    pub fn find_or_create_with<F>(&self, attrs: AttributePatch, mut hook: F) -> Result<Record>
    where
        F: FnMut(&mut Record) -> HookOutcome,
    {
        self.run(
            Family::FindOrInitialize,
            SaveMode::Persist,
            &attrs,
            Some(&mut hook),
        )
    }

    /// Same as [`find_or_create`](Self::find_or_create) but propagates any
    /// persist failure instead of swallowing validation errors.
    pub fn find_or_create_checked(&self, attrs: AttributePatch) -> Result<Record> {
        self.run(
            Family::FindOrInitialize,
            SaveMode::PersistOrFail,
            &attrs,
            None,
        )
    }

    pub fn find_or_create_checked_with<F>(
        &self,
        attrs: AttributePatch,
        mut hook: F,
    ) -> Result<Record>
    where
        F: FnMut(&mut Record) -> HookOutcome,
    {
        self.run(
            Family::FindOrInitialize,
            SaveMode::PersistOrFail,
            &attrs,
            Some(&mut hook),
        )
    }

    /// Finds the scoped record or builds it in memory without persisting.
    pub fn find_or_initialize(&self, attrs: AttributePatch) -> Result<Record> {
        self.run(Family::FindOrInitialize, SaveMode::NoPersist, &attrs, None)
    }

    pub fn find_or_initialize_with<F>(&self, attrs: AttributePatch, mut hook: F) -> Result<Record>
    where
        F: FnMut(&mut Record) -> HookOutcome,
    {
        self.run(
            Family::FindOrInitialize,
            SaveMode::NoPersist,
            &attrs,
            Some(&mut hook),
        )
    }

    // ------------------------------------------------------------------
    // Create-or-update family: an existing match IS patched and saved.
    // ------------------------------------------------------------------

    /// Creates the scoped record or updates the existing match with `attrs`.
    /// Persist-validation failures are swallowed into the returned record.
    pub fn create_or_update(&self, attrs: AttributePatch) -> Result<Record> {
        self.run(Family::CreateOrUpdate, SaveMode::Persist, &attrs, None)
    }

    /// Same as [`create_or_update`](Self::create_or_update), with a hook
    /// invoked on both new and existing targets before the save.
    pub fn create_or_update_with<F>(&self, attrs: AttributePatch, mut hook: F) -> Result<Record>
    where
        F: FnMut(&mut Record) -> HookOutcome,
    {
        self.run(
            Family::CreateOrUpdate,
            SaveMode::Persist,
            &attrs,
            Some(&mut hook),
        )
    }

    /// Same as [`create_or_update`](Self::create_or_update) but propagates
    /// any persist failure instead of swallowing validation errors.
    pub fn create_or_update_checked(&self, attrs: AttributePatch) -> Result<Record> {
        self.run(Family::CreateOrUpdate, SaveMode::PersistOrFail, &attrs, None)
    }

    pub fn create_or_update_checked_with<F>(
        &self,
        attrs: AttributePatch,
        mut hook: F,
    ) -> Result<Record>
    where
        F: FnMut(&mut Record) -> HookOutcome,
    {
        self.run(
            Family::CreateOrUpdate,
            SaveMode::PersistOrFail,
            &attrs,
            Some(&mut hook),
        )
    }

    /// Builds or patches the scoped record in memory without persisting.
    pub fn initialize_or_update(&self, attrs: AttributePatch) -> Result<Record> {
        self.run(Family::CreateOrUpdate, SaveMode::NoPersist, &attrs, None)
    }

    pub fn initialize_or_update_with<F>(&self, attrs: AttributePatch, mut hook: F) -> Result<Record>
    where
        F: FnMut(&mut Record) -> HookOutcome,
    {
        self.run(
            Family::CreateOrUpdate,
            SaveMode::NoPersist,
            &attrs,
            Some(&mut hook),
        )
    }

    fn run(
        &self,
        family: Family,
        mode: SaveMode,
        attrs: &AttributePatch,
        hook: Option<Hook<'_>>,
    ) -> Result<Record> {
        engine::run_scoped(self.store, &self.scope, &self.retry, family, mode, attrs, hook)
    }
}

impl<'a> ScopedCollection<'a, MemoryStore> {
    /// Number of rows matching the scope's filters.
    pub fn count(&self) -> Result<usize> {
        self.store.scope_count(&self.scope)
    }
}

impl MemoryStore {
    /// Handle on one table, entry point of the caller surface.
    pub fn collection(&self, table: impl Into<String>) -> Collection<'_, MemoryStore> {
        Collection::new(self, table)
    }
}
