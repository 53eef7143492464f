use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical entity class a write targets. Used verbatim as a REST path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName(String);

impl TableName {
    const MAX_LEN: usize = 63;

    pub fn new(value: String) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        Self::new(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), String> {
        if value.is_empty() {
            return Err("Table name cannot be empty".to_string());
        }
        if value.len() > Self::MAX_LEN {
            return Err(format!(
                "Table name exceeds {} characters: {value}",
                Self::MAX_LEN
            ));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            return Err(format!("Table name contains invalid characters: {value}"));
        }
        Ok(())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TableName> for String {
    fn from(table: TableName) -> Self {
        table.0
    }
}
