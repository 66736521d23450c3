//! Domain models - access events and the visit model
//!
//! This module contains the canonical data types used throughout the system:
//! - `AccessEvent` - a badge-in or badge-out for one person
//! - `Direction` - classification of a badge event
//! - `PendingVisit` - visit accumulator used by the consolidator
//! - `Visit` - a sealed occupancy interval with derived duration

pub mod types;
pub mod visit;

// Re-export commonly used types at module level
pub use types::{AccessEvent, Direction};
pub use visit::{PendingVisit, Visit};
