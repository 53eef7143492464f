use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field values of a queued write. Always a JSON object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WritePayload(Map<String, Value>);

impl WritePayload {
    pub fn new(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(format!("Write payload must be a JSON object, got {other}")),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| format!("Invalid JSON payload: {e}"))?;
        Self::new(value)
    }

    /// Tombstone written instead of a hard delete.
    pub fn tombstone(deleted_at: String) -> Self {
        let mut map = Map::new();
        map.insert("deleted_at".to_string(), Value::String(deleted_at));
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<WritePayload> for Value {
    fn from(payload: WritePayload) -> Self {
        payload.into_inner()
    }
}
