pub mod offline;

pub use offline::{TableName, WriteFilters, WriteId, WriteOperation, WritePayload};
