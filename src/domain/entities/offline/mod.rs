pub mod dead_letter;
pub mod replay_report;
pub mod write_record;
pub mod write_request;

pub use dead_letter::DeadLetterRecord;
pub use replay_report::{RecordOutcome, RecordResult, ReplayReport};
pub use write_record::WriteRecord;
pub use write_request::WriteRequest;
