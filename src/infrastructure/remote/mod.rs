pub mod postgrest;

pub use postgrest::{PostgrestDataService, PostgrestRequest};
