use super::{Result, Row, StoreError, TableSchema, Value};
use std::fmt;
use std::sync::Arc;

/// Storage identity of a persisted record, assigned on first successful
/// insert. Sequential per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An in-memory row bound to its table schema.
///
/// A record is *transient* until its first successful insert assigns an
/// identity, *persistent* afterwards. Validation messages collected by a
/// swallowed persist failure are kept on the record for caller inspection.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<TableSchema>,
    id: Option<RecordId>,
    values: Row,
    errors: Vec<String>,
}

impl Record {
    /// Builds a transient record with every field set to `Null`.
    pub fn new_transient(schema: Arc<TableSchema>) -> Self {
        let values = vec![Value::Null; schema.column_count()];
        Self {
            schema,
            id: None,
            values,
            errors: Vec::new(),
        }
    }

    pub(crate) fn from_row(schema: Arc<TableSchema>, id: RecordId, values: Row) -> Self {
        Self {
            schema,
            id: Some(id),
            values,
            errors: Vec::new(),
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn is_persistent(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_transient(&self) -> bool {
        self.id.is_none()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.schema
            .find_column_index(field)
            .map(|idx| &self.values[idx])
    }

    /// Sets a field, validating the name and value type at the boundary.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        let idx = self.schema.find_column_index(field).ok_or_else(|| {
            StoreError::ColumnNotFound(field.to_string(), self.schema.name().to_string())
        })?;
        let value = value.into();
        let column = &self.schema.columns()[idx];
        if !value.is_null() && !column.data_type.is_compatible(&value) {
            return Err(StoreError::TypeMismatch(format!(
                "Column '{}' expects type {}, got {}",
                column.name,
                column.data_type,
                value.type_name()
            )));
        }
        self.values[idx] = value;
        Ok(())
    }

    pub fn values(&self) -> &Row {
        &self.values
    }

    pub(crate) fn assign_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    /// Validation messages from a swallowed persist failure.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// JSON snapshot of the record: identity plus named fields.
    pub fn to_json(&self) -> serde_json::Value {
        let mut fields = serde_json::Map::new();
        for (column, value) in self.schema.columns().iter().zip(&self.values) {
            let json = match value {
                Value::Null => serde_json::Value::Null,
                Value::Integer(i) => serde_json::Value::from(*i),
                Value::Float(f) => serde_json::Value::from(*f),
                Value::Text(s) => serde_json::Value::from(s.clone()),
                Value::Boolean(b) => serde_json::Value::from(*b),
            };
            fields.insert(column.name.clone(), json);
        }
        serde_json::json!({
            "id": self.id.map(|id| id.0),
            "fields": fields,
        })
    }
}
