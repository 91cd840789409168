use crate::core::{Record, RecordId, Result, Row, StoreError, TableSchema, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One relational table: schema, rows keyed by sequential identity, and the
/// NOT NULL / UNIQUE checks run on every write.
#[derive(Debug, Clone)]
pub struct Table {
    schema: Arc<TableSchema>,
    rows: BTreeMap<u64, Row>,
    next_row_id: u64,
}

impl Table {
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema: Arc::new(schema),
            rows: BTreeMap::new(),
            next_row_id: 1,
        }
    }

    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn insert(&mut self, row: Row) -> Result<RecordId> {
        self.validate_row(&row)?;
        self.check_uniqueness(&row, None)?;

        let id = self.next_row_id;
        self.next_row_id += 1;
        self.rows.insert(id, row);
        Ok(RecordId(id))
    }

    pub fn update(&mut self, id: RecordId, row: Row) -> Result<()> {
        if !self.rows.contains_key(&id.0) {
            return Err(StoreError::ExecutionError(format!(
                "Row {} not found in table '{}'",
                id,
                self.schema.name()
            )));
        }
        self.validate_row(&row)?;
        self.check_uniqueness(&row, Some(id))?;
        self.rows.insert(id.0, row);
        Ok(())
    }

    pub fn get(&self, id: RecordId) -> Option<&Row> {
        self.rows.get(&id.0)
    }

    /// Removes a row without touching the identity sequence. Undo path.
    pub(crate) fn remove_row(&mut self, id: RecordId) -> Option<Row> {
        self.rows.remove(&id.0)
    }

    /// Puts a previous row version back under its identity. Undo path.
    pub(crate) fn put_row(&mut self, id: RecordId, row: Row) {
        self.rows.insert(id.0, row);
    }

    /// Finds the first row (in identity order) matching every filter.
    pub fn resolve_filters(&self, filters: &[(String, Value)]) -> Result<Option<(RecordId, Row)>> {
        let indices = self.filter_indices(filters)?;
        for (id, row) in &self.rows {
            if indices
                .iter()
                .zip(filters)
                .all(|(idx, (_, value))| &row[*idx] == value)
            {
                return Ok(Some((RecordId(*id), row.clone())));
            }
        }
        Ok(None)
    }

    pub fn count_matching(&self, filters: &[(String, Value)]) -> Result<usize> {
        let indices = self.filter_indices(filters)?;
        let count = self
            .rows
            .values()
            .filter(|row| {
                indices
                    .iter()
                    .zip(filters)
                    .all(|(idx, (_, value))| &row[*idx] == value)
            })
            .count();
        Ok(count)
    }

    pub fn record_from_row(&self, id: RecordId, row: Row) -> Record {
        Record::from_row(self.schema.clone(), id, row)
    }

    fn filter_indices(&self, filters: &[(String, Value)]) -> Result<Vec<usize>> {
        filters
            .iter()
            .map(|(field, _)| {
                self.schema.find_column_index(field).ok_or_else(|| {
                    StoreError::ColumnNotFound(field.clone(), self.schema.name().to_string())
                })
            })
            .collect()
    }

    fn validate_row(&self, row: &Row) -> Result<()> {
        if row.len() != self.schema.column_count() {
            return Err(StoreError::ExecutionError(format!(
                "Row arity {} does not match table '{}' ({} columns)",
                row.len(),
                self.schema.name(),
                self.schema.column_count()
            )));
        }
        for (column, value) in self.schema.columns().iter().zip(row) {
            column.validate(value)?;
        }
        Ok(())
    }

    /// Rejects a write that would duplicate a value in any UNIQUE column.
    /// NULLs never conflict, standard SQL behavior.
    fn check_uniqueness(&self, row: &Row, ignore_id: Option<RecordId>) -> Result<()> {
        for (col_idx, column) in self.schema.columns().iter().enumerate() {
            if !column.unique {
                continue;
            }
            let value = &row[col_idx];
            if matches!(value, Value::Null) {
                continue;
            }
            for (id, existing) in &self.rows {
                if let Some(ignore) = ignore_id
                    && *id == ignore.0
                {
                    continue;
                }
                if &existing[col_idx] == value {
                    return Err(StoreError::UniqueViolation {
                        column: column.name.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
