//! Touch Gesture Features - segmentation and feature extraction for touch logs.
//!
//! This library turns a recorded touch-and-motion sample log into one feature
//! row per complete gesture (press, slide, release), ready for a one-class
//! boundary model that tells the device owner's gestures apart from others.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Touch Gesture Features                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌──────────────┐  │
//! │  │  Stream  │──▶│ Segmenter │──▶│  Window  │──▶│   Features   │  │
//! │  │  (CSV)   │   │ (actions) │   │ (ranges) │   │ (74 values)  │  │
//! │  └──────────┘   └───────────┘   └──────────┘   └──────────────┘  │
//! │                                                        │         │
//! │                                                        ▼         │
//! │  ┌──────────┐                  ┌──────────┐   ┌──────────────┐   │
//! │  │  Report  │                  │  Scorer  │◀──│ FeatureTable │   │
//! │  │  (stats) │                  │ (model)  │   │ (csv / json) │   │
//! │  └──────────┘                  └──────────┘   └──────────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use touch_gesture_features::{core, report::ExtractionLog, stream};
//!
//! let stream = stream::read_stream("touch_log.csv".as_ref()).expect("readable log");
//! let log = ExtractionLog::new();
//! let options = core::ExtractOptions::default();
//!
//! match core::run(stream, &options, &log) {
//!     Ok(table) => println!("{} gestures", table.len()),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

pub mod config;
pub mod core;
pub mod model;
pub mod report;
pub mod stream;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{
    extract_features, feature_columns, table_header, ExtractOptions, FeatureRow, FeatureTable,
    GestureFeatures, GestureSegmenter, GestureWindow, OutputFormat, PipelineError,
    FEATURE_COUNT,
};
pub use model::{
    BoundaryModel, Label, ModelError, ScalerParams, ScoreReport, Scorer, Verdict,
};
pub use report::{ExtractionLog, ExtractionStats, SharedExtractionLog};
pub use stream::{EventKind, EventStream, RawSample, StreamError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
