pub mod table_name;
pub mod write_filters;
pub mod write_id;
pub mod write_operation;
pub mod write_payload;

pub use table_name::TableName;
pub use write_filters::WriteFilters;
pub use write_id::WriteId;
pub use write_operation::WriteOperation;
pub use write_payload::WritePayload;
