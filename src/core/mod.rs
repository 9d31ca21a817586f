//! Core functionality for touch gesture feature extraction.
//!
//! This module contains:
//! - Gesture segmentation over the ordered sample stream
//! - Window extraction for each detected gesture
//! - Feature computation from gesture windows
//! - Feature table assembly and export
//! - The pipeline tying these together

pub mod features;
pub mod pipeline;
pub mod segmenter;
pub mod table;
pub mod window;

// Re-export commonly used types
pub use features::{Feature, GestureFeatures, SeriesStats, FEATURE_COUNT};
pub use pipeline::{extract_features, run, ExtractOptions, PipelineError};
pub use segmenter::{GestureSegment, GestureSegmenter, SegmentBounds, SegmenterState};
pub use table::{
    feature_columns, table_header, ExportMeta, FeatureRow, FeatureTable, OutputFormat, TableError,
};
pub use window::{extract_window, GestureWindow};
