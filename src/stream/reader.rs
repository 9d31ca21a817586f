//! CSV reader for recorder logs.
//!
//! The log is a header row followed by one row per sample with 16 columns:
//! event kind, x, y, timestamp (ms), pressure, contact area, swipe direction,
//! accel x/y/z, gyro x/y/z, mag x/y/z. The whole file is validated before any
//! sample is handed on, so a malformed log never reaches segmentation.

use crate::stream::buffer::EventStream;
use crate::stream::types::{EventKind, RawSample, Vec3};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Input column names, in file order.
pub const INPUT_COLUMNS: [&str; 16] = [
    "event_kind",
    "x",
    "y",
    "timestamp_ms",
    "pressure",
    "contact_area",
    "swipe_direction",
    "accel_x",
    "accel_y",
    "accel_z",
    "gyro_x",
    "gyro_y",
    "gyro_z",
    "mag_x",
    "mag_y",
    "mag_z",
];

/// Errors raised while loading a sample log.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("cannot open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("input has no header row")]
    MissingHeader,
    #[error("row {row}: expected {expected} columns, found {found}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Read every sample from a CSV source.
pub fn read_samples<R: Read>(source: R) -> Result<Vec<RawSample>, StreamError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let header_len = reader.headers()?.len();
    if header_len == 0 {
        return Err(StreamError::MissingHeader);
    }
    if header_len != INPUT_COLUMNS.len() {
        return Err(StreamError::ColumnCount {
            row: 1,
            expected: INPUT_COLUMNS.len(),
            found: header_len,
        });
    }

    let mut samples = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // Row numbers are 1-based and count the header line.
        let row = index + 2;
        samples.push(parse_record(&record, row)?);
    }

    Ok(samples)
}

/// Load a log file into an `EventStream`.
pub fn read_stream(path: &Path) -> Result<EventStream, StreamError> {
    let file = std::fs::File::open(path).map_err(|source| StreamError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let samples = read_samples(std::io::BufReader::new(file))?;
    tracing::info!("Read {} samples from {:?}", samples.len(), path);
    Ok(EventStream::new(samples))
}

fn parse_record(record: &csv::StringRecord, row: usize) -> Result<RawSample, StreamError> {
    if record.len() != INPUT_COLUMNS.len() {
        return Err(StreamError::ColumnCount {
            row,
            expected: INPUT_COLUMNS.len(),
            found: record.len(),
        });
    }

    let float = |col: usize| -> Result<f64, StreamError> {
        let value = &record[col];
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| StreamError::InvalidValue {
                row,
                column: INPUT_COLUMNS[col],
                value: value.to_string(),
            })
    };

    Ok(RawSample {
        event_kind: EventKind::parse(&record[0]),
        x: float(1)?,
        y: float(2)?,
        timestamp_ms: parse_timestamp(&record[3], row)?,
        pressure: float(4)?,
        contact_area: float(5)?,
        swipe_direction: record[6].to_string(),
        accel: Vec3::new(float(7)?, float(8)?, float(9)?),
        gyro: Vec3::new(float(10)?, float(11)?, float(12)?),
        mag: Vec3::new(float(13)?, float(14)?, float(15)?),
    })
}

/// Timestamps are integers; a float with no fractional part is accepted.
fn parse_timestamp(value: &str, row: usize) -> Result<i64, StreamError> {
    if let Ok(ms) = value.parse::<i64>() {
        return Ok(ms);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        _ => Err(StreamError::InvalidValue {
            row,
            column: INPUT_COLUMNS[3],
            value: value.to_string(),
        }),
    }
}
