//! Run statistics for feature extraction.
//!
//! This module tracks what each extraction run consumed and produced, and
//! keeps cumulative totals across runs.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log, create_shared_log_with_persistence, ExtractionLog, ExtractionStats,
    PersistedStats, SharedExtractionLog,
};
