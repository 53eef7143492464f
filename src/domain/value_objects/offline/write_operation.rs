use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOperation {
    Insert,
    Update,
    Upsert,
    Delete,
}

impl WriteOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOperation::Insert => "insert",
            WriteOperation::Update => "update",
            WriteOperation::Upsert => "upsert",
            WriteOperation::Delete => "delete",
        }
    }

    /// Operations that must name their target rows.
    pub fn requires_filters(&self) -> bool {
        matches!(self, WriteOperation::Update | WriteOperation::Delete)
    }
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteOperation {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "insert" => Ok(WriteOperation::Insert),
            "update" => Ok(WriteOperation::Update),
            "upsert" => Ok(WriteOperation::Upsert),
            "delete" => Ok(WriteOperation::Delete),
            other => Err(format!("Unknown write operation: {other}")),
        }
    }
}
