pub mod offline;

pub use offline::{
    DeadLetterRecord, RecordOutcome, RecordResult, ReplayReport, WriteRecord, WriteRequest,
};
