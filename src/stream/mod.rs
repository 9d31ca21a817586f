//! Raw sample input for the feature pipeline.
//!
//! This module provides the sample types, the immutable ordered buffer the
//! rest of the pipeline indexes into, and the CSV log reader.

pub mod buffer;
pub mod reader;
pub mod types;

// Re-export commonly used types
pub use buffer::EventStream;
pub use reader::{read_samples, read_stream, StreamError, INPUT_COLUMNS};
pub use types::{EventKind, RawSample, SensorChannel, Vec3};
