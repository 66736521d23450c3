//! Services - business logic
//!
//! - `consolidator` - folds sorted access events into per-person, per-day visits

pub mod consolidator;

// Re-export commonly used types
pub use consolidator::{consolidate, consolidate_with_stats, ConsolidationStats, VisitConsolidator};
