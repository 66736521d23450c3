//! IO modules - external data in and out
//!
//! This module contains all external IO operations:
//! - `access_log` - reads the room access export and applies the room/date query
//! - `report` - writes consolidated visits as TSV or JSONL

pub mod access_log;
pub mod report;

// Re-export commonly used types
pub use access_log::{AccessLog, AccessQuery, AccessRecord, LoadStats};
pub use report::ReportWriter;
