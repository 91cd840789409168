use super::engine::ScopeStore;
use super::table::Table;
use crate::core::{Record, RecordId, Result, StoreError, TableSchema};
use crate::scope::{AttributePatch, Scope};
use crate::transaction::MemoryTx;
use crate::upsert::FailureClass;
use crate::upsert::conflict::classify_store_failure;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
pub(crate) struct StoreInner {
    pub(crate) tables: HashMap<String, Table>,
}

/// Shared in-memory reference backend. Cheap to clone; all clones see the
/// same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_table(&self, schema: TableSchema) -> Result<()> {
        let mut inner = self.inner.write()?;
        let name = schema.name().to_string();
        if inner.tables.contains_key(&name) {
            return Err(StoreError::TableExists(name));
        }
        inner.tables.insert(name, Table::new(schema));
        Ok(())
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.inner
            .read()
            .map(|inner| inner.tables.contains_key(name))
            .unwrap_or(false)
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|inner| inner.tables.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        let inner = self.inner.read()?;
        let table = Self::table(&inner, table)?;
        Ok(table.len())
    }

    pub fn schema(&self, table: &str) -> Result<Arc<TableSchema>> {
        let inner = self.inner.read()?;
        Ok(Self::table(&inner, table)?.schema().clone())
    }

    /// Looks a record up by identity.
    pub fn find_record(&self, table: &str, id: RecordId) -> Result<Option<Record>> {
        let inner = self.inner.read()?;
        let table = Self::table(&inner, table)?;
        Ok(table
            .get(id)
            .cloned()
            .map(|row| table.record_from_row(id, row)))
    }

    /// Scope lookup outside any transaction; read-back surface for callers.
    pub fn resolve_scope(&self, scope: &Scope) -> Result<Option<Record>> {
        let inner = self.inner.read()?;
        let table = Self::table(&inner, scope.table())?;
        Ok(table
            .resolve_filters(scope.filters())?
            .map(|(id, row)| table.record_from_row(id, row)))
    }

    pub(crate) fn scope_count(&self, scope: &Scope) -> Result<usize> {
        let inner = self.inner.read()?;
        Self::table(&inner, scope.table())?.count_matching(scope.filters())
    }

    fn table<'a>(inner: &'a StoreInner, name: &str) -> Result<&'a Table> {
        inner
            .tables
            .get(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }
}

impl ScopeStore for MemoryStore {
    type Tx = MemoryTx;

    fn begin(&self) -> Result<MemoryTx> {
        Ok(MemoryTx::new(self.inner.clone()))
    }

    fn resolve(&self, _tx: &MemoryTx, scope: &Scope) -> Result<Option<Record>> {
        self.resolve_scope(scope)
    }

    fn materialize(&self, scope: &Scope, attrs: &AttributePatch) -> Result<Record> {
        let schema = self.schema(scope.table())?;
        let mut record = Record::new_transient(schema);
        for (field, value) in scope.filters() {
            record.set(field, value.clone())?;
        }
        // Attrs win over scope values on overlap.
        for (field, value) in attrs.entries() {
            record.set(field, value.clone())?;
        }
        Ok(record)
    }

    fn apply_patch(&self, record: &mut Record, attrs: &AttributePatch) -> Result<()> {
        for (field, value) in attrs.entries() {
            record.set(field, value.clone())?;
        }
        Ok(())
    }

    fn persist(&self, tx: &MemoryTx, record: &mut Record) -> Result<()> {
        let table_name = record.schema().name().to_string();
        let mut inner = self.inner.write()?;
        let table = inner
            .tables
            .get_mut(&table_name)
            .ok_or_else(|| StoreError::TableNotFound(table_name.clone()))?;

        match record.id() {
            None => {
                let id = table.insert(record.values().clone())?;
                record.assign_id(id);
                tx.record_insert(&table_name, id)?;
                log::debug!("inserted row {} into '{}'", id, table_name);
            }
            Some(id) => {
                let previous = table.get(id).cloned().ok_or_else(|| {
                    StoreError::ExecutionError(format!(
                        "Row {} not found in table '{}'",
                        id, table_name
                    ))
                })?;
                table.update(id, record.values().clone())?;
                tx.record_update(&table_name, id, previous)?;
                log::debug!("updated row {} in '{}'", id, table_name);
            }
        }
        Ok(())
    }

    fn classify_failure(&self, err: &StoreError) -> FailureClass {
        classify_store_failure(err)
    }
}
