//! Infrastructure - configuration and run summary
//!
//! This module contains infrastructure concerns:
//! - `config` - Application configuration (TOML loading, defaults)
//! - `summary` - Per-run counters, logged once at the end

pub mod config;
pub mod summary;

// Re-export commonly used types
pub use config::{Config, ReportFormat};
pub use summary::RunSummary;
