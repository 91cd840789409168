//! Undo-log transactions for the in-memory backend.
//!
//! Every write performed through a [`MemoryTx`] records its inverse; rollback
//! replays the inverses in reverse order. Dropping an unfinished handle rolls
//! back, which is what guarantees abort-on-panic and abort-on-early-return.

use crate::core::{RecordId, Result, Row};
use crate::storage::engine::StoreTransaction;
use crate::storage::memory::StoreInner;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

#[derive(Debug)]
pub(crate) enum UndoOp {
    Insert {
        table: String,
        id: RecordId,
    },
    Update {
        table: String,
        id: RecordId,
        previous: Row,
    },
}

pub struct MemoryTx {
    store: Arc<RwLock<StoreInner>>,
    undo: Mutex<Vec<UndoOp>>,
    finished: AtomicBool,
}

impl MemoryTx {
    pub(crate) fn new(store: Arc<RwLock<StoreInner>>) -> Self {
        Self {
            store,
            undo: Mutex::new(Vec::new()),
            finished: AtomicBool::new(false),
        }
    }

    pub(crate) fn record_insert(&self, table: &str, id: RecordId) -> Result<()> {
        self.undo.lock()?.push(UndoOp::Insert {
            table: table.to_string(),
            id,
        });
        Ok(())
    }

    pub(crate) fn record_update(&self, table: &str, id: RecordId, previous: Row) -> Result<()> {
        self.undo.lock()?.push(UndoOp::Update {
            table: table.to_string(),
            id,
            previous,
        });
        Ok(())
    }

    fn undo_all(&self) -> Result<()> {
        let mut ops = self.undo.lock()?;
        if ops.is_empty() {
            return Ok(());
        }
        let mut inner = self.store.write()?;
        for op in ops.drain(..).rev() {
            match op {
                UndoOp::Insert { table, id } => {
                    if let Some(table) = inner.tables.get_mut(&table) {
                        table.remove_row(id);
                    }
                }
                UndoOp::Update {
                    table,
                    id,
                    previous,
                } => {
                    if let Some(table) = inner.tables.get_mut(&table) {
                        table.put_row(id, previous);
                    }
                }
            }
        }
        Ok(())
    }
}

impl StoreTransaction for MemoryTx {
    fn commit(self) -> Result<()> {
        self.finished.store(true, Ordering::SeqCst);
        self.undo.lock()?.clear();
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.finished.store(true, Ordering::SeqCst);
        self.undo_all()
    }
}

impl Drop for MemoryTx {
    fn drop(&mut self) {
        if !self.finished.swap(true, Ordering::SeqCst) {
            log::warn!("rolling back transaction dropped without commit or rollback");
            if let Err(err) = self.undo_all() {
                log::warn!("rollback on drop failed: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType, TableSchema, Value};
    use crate::storage::MemoryStore;
    use crate::storage::engine::{ScopeStore, StoreTransaction};

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_table(TableSchema::new(
                "options",
                vec![
                    Column::new("name", DataType::Text).not_null().unique(),
                    Column::new("value", DataType::Text),
                ],
            ))
            .unwrap();
        store
    }

    fn insert_row(store: &MemoryStore, tx: &MemoryTx, name: &str) {
        let scope = crate::scope::Scope::new("options").with_filter("name", name);
        let mut record = store
            .materialize(&scope, &crate::scope::AttributePatch::new())
            .unwrap();
        store.persist(tx, &mut record).unwrap();
    }

    #[test]
    fn test_rollback_removes_inserts() {
        let store = store();
        let tx = store.begin().unwrap();
        insert_row(&store, &tx, "a");
        assert_eq!(store.row_count("options").unwrap(), 1);

        tx.rollback().unwrap();
        assert_eq!(store.row_count("options").unwrap(), 0);
    }

    #[test]
    fn test_commit_keeps_inserts() {
        let store = store();
        let tx = store.begin().unwrap();
        insert_row(&store, &tx, "a");
        tx.commit().unwrap();
        assert_eq!(store.row_count("options").unwrap(), 1);
    }

    #[test]
    fn test_drop_rolls_back() {
        let store = store();
        {
            let tx = store.begin().unwrap();
            insert_row(&store, &tx, "a");
            // Dropped without commit.
        }
        assert_eq!(store.row_count("options").unwrap(), 0);
    }

    #[test]
    fn test_rollback_restores_updated_row() {
        let store = store();
        let setup = store.begin().unwrap();
        insert_row(&store, &setup, "a");
        setup.commit().unwrap();

        let scope = crate::scope::Scope::new("options").with_filter("name", "a");
        let tx = store.begin().unwrap();
        let mut record = store.resolve(&tx, &scope).unwrap().unwrap();
        record.set("value", "changed").unwrap();
        store.persist(&tx, &mut record).unwrap();
        tx.rollback().unwrap();

        let read_back = store.resolve_scope(&scope).unwrap().unwrap();
        assert_eq!(read_back.get("value"), Some(&Value::Null));
    }
}
