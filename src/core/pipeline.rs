//! End-to-end extraction: stream → segments → windows → features → table.

use crate::core::features::GestureFeatures;
use crate::core::segmenter::GestureSegmenter;
use crate::core::table::{FeatureRow, FeatureTable, TableError};
use crate::core::window::extract_window;
use crate::report::ExtractionLog;
use crate::stream::EventStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options for one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Time tolerance in milliseconds widening the row pool and sensor context
    pub padding_ms: u32,
    /// Drop repeated samples before segmentation
    pub dedup_samples: bool,
}

/// Extraction failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No action in the log was complete; there is nothing to model.
    #[error("no complete touch gesture (press, slide, release) was found")]
    NoGestures,
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Run the full pipeline over a loaded stream.
pub fn run(
    stream: EventStream,
    options: &ExtractOptions,
    log: &ExtractionLog,
) -> Result<FeatureTable, PipelineError> {
    log.record_samples_read(stream.len() as u64);

    let stream = if options.dedup_samples {
        let (stream, dropped) = stream.dedup();
        if dropped > 0 {
            tracing::info!("Dropped {} duplicate samples", dropped);
        }
        log.record_duplicates_dropped(dropped as u64);
        stream
    } else {
        stream
    };

    extract_features(&stream, options.padding_ms, log)
}

/// Segment the stream and compute one feature row per surviving gesture.
///
/// Returns `PipelineError::NoGestures` when no row survives.
pub fn extract_features(
    stream: &EventStream,
    padding_ms: u32,
    log: &ExtractionLog,
) -> Result<FeatureTable, PipelineError> {
    let segments = GestureSegmenter::segment(stream);
    log.record_segments_detected(segments.len() as u64);

    let rows: Vec<FeatureRow> = segments
        .iter()
        .filter_map(|bounds| match extract_window(stream, bounds, padding_ms) {
            Some(window) => {
                let features = GestureFeatures::compute(stream, &window);
                log.record_row_emitted();
                Some(FeatureRow::new(&window, &features))
            }
            None => {
                log.record_gesture_discarded();
                None
            }
        })
        .collect();

    if rows.is_empty() {
        return Err(PipelineError::NoGestures);
    }

    tracing::info!(
        "Extracted {} gesture rows from {} detected actions",
        rows.len(),
        segments.len()
    );
    Ok(FeatureTable::assemble(rows)?)
}
