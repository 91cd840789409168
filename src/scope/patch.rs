use crate::core::{Result, StoreError, Value};

/// An ordered `field -> value` partial update.
///
/// Entries are applied in insertion order, so a later entry for the same
/// field wins. An empty patch means "no changes requested" and is skipped
/// entirely by the create-or-update family.
#[derive(Debug, Clone, Default)]
pub struct AttributePatch {
    entries: Vec<(String, Value)>,
}

impl AttributePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the patch with one more entry appended.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    /// Builds a patch from a JSON object.
    ///
    /// Only scalar members are accepted; nested arrays and objects have no
    /// column representation and are rejected at this boundary.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let object = json.as_object().ok_or_else(|| {
            StoreError::TypeMismatch(format!(
                "Attribute patch requires a JSON object, got {}",
                json_type_name(json)
            ))
        })?;

        let mut patch = Self::new();
        for (field, member) in object {
            let value = match member {
                serde_json::Value::Null => Value::Null,
                serde_json::Value::Bool(b) => Value::Boolean(*b),
                serde_json::Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        Value::Integer(i)
                    } else if let Some(f) = n.as_f64() {
                        Value::Float(f)
                    } else {
                        return Err(StoreError::TypeMismatch(format!(
                            "Number {} does not fit a column type",
                            n
                        )));
                    }
                }
                serde_json::Value::String(s) => Value::Text(s.clone()),
                other => {
                    return Err(StoreError::TypeMismatch(format!(
                        "Field '{}' has unsupported JSON value of type {}",
                        field,
                        json_type_name(other)
                    )));
                }
            };
            patch = patch.set(field.clone(), value);
        }
        Ok(patch)
    }
}

fn json_type_name(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
