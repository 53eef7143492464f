use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Equality conditions selecting the rows an update, upsert or delete applies to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WriteFilters(Map<String, Value>);

impl WriteFilters {
    pub fn new(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) if map.is_empty() => {
                Err("Write filters cannot be an empty object".to_string())
            }
            Value::Object(map) => Ok(Self(map)),
            other => Err(format!("Write filters must be a JSON object, got {other}")),
        }
    }

    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        let mut map = Map::new();
        map.insert(column.to_string(), value.into());
        Self(map)
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| format!("Invalid JSON filters: {e}"))?;
        Self::new(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        Value::Object(self.0)
    }
}
