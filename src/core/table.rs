//! Feature table assembly and export.
//!
//! One row per gesture: `gesture_id`, `sample_count`, then the 74 feature
//! columns in block order. Missing values are written as empty CSV cells or
//! JSON `null`, never as not-a-number.

use crate::core::features::{Feature, GestureFeatures, FEATURE_COUNT};
use crate::core::window::GestureWindow;
use crate::stream::SensorChannel;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Leading identifier columns.
pub const ID_COLUMNS: [&str; 2] = ["gesture_id", "sample_count"];

/// Gesture-level column names, in table order.
const GESTURE_COLUMNS: [&str; 29] = [
    "start_x",
    "start_y",
    "end_x",
    "end_y",
    "displacement",
    "move_length",
    "displacement_ratio",
    "point_angle_mean",
    "point_angle_max",
    "point_angle_min",
    "point_angle_var",
    "step_angle_mean",
    "step_angle_max",
    "step_angle_min",
    "step_angle_var",
    "duration_ms",
    "speed_mean",
    "speed_max",
    "speed_min",
    "speed_var",
    "pressure_mean",
    "pressure_max",
    "pressure_min",
    "pressure_var",
    "area_mean",
    "area_max",
    "area_min",
    "area_var",
    "direction_angle",
];

/// Per-channel statistic suffixes, in table order.
const CHANNEL_STATS: [&str; 5] = ["mean", "min", "max", "var", "complexity"];

/// The 74 feature column names.
pub fn feature_columns() -> Vec<String> {
    let mut columns: Vec<String> = GESTURE_COLUMNS.iter().map(|c| c.to_string()).collect();
    for channel in SensorChannel::ALL {
        for stat in CHANNEL_STATS {
            columns.push(format!("{}_{}", channel.name(), stat));
        }
    }
    columns
}

/// Full header: id columns followed by feature columns.
pub fn table_header() -> Vec<String> {
    let mut header: Vec<String> = ID_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(feature_columns());
    header
}

/// Feature table errors.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("feature table has {actual} feature columns, expected {expected}")]
    WidthMismatch { expected: usize, actual: usize },
    #[error("gesture {gesture_id} has {actual} values for {expected} columns")]
    RowWidth {
        gesture_id: u32,
        expected: usize,
        actual: usize,
    },
    #[error("feature table is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
    #[error("unknown output format '{0}' (expected csv, json or jsonl)")]
    UnknownFormat(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export format for feature tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Jsonl,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" => Ok(OutputFormat::Jsonl),
            other => Err(TableError::UnknownFormat(other.to_string())),
        }
    }
}

/// One gesture's row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub gesture_id: u32,
    pub sample_count: usize,
    pub values: Vec<Feature>,
}

impl FeatureRow {
    pub fn new(window: &GestureWindow, features: &GestureFeatures) -> Self {
        Self {
            gesture_id: window.id,
            sample_count: window.sample_count,
            values: features.values(),
        }
    }
}

/// Producer metadata attached to JSON exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMeta {
    /// Name of the producing software
    pub producer: String,
    /// Version of the producing software
    pub version: String,
    /// Unique run identifier
    pub run_id: Uuid,
    /// When the table was written (RFC3339)
    pub computed_at_utc: String,
    /// Padding used for window extraction, in milliseconds
    pub padding_ms: u32,
}

impl ExportMeta {
    pub fn new(run_id: Uuid, padding_ms: u32) -> Self {
        Self {
            producer: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            run_id,
            computed_at_utc: Utc::now().to_rfc3339(),
            padding_ms,
        }
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    meta: &'a ExportMeta,
    columns: Vec<String>,
    rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Rows ordered by gesture id under a fixed column schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    /// Build a table with the standard columns, ordering rows by id.
    pub fn assemble(mut rows: Vec<FeatureRow>) -> Result<Self, TableError> {
        let columns = feature_columns();
        Self::validate_width(&columns)?;

        for row in &rows {
            if row.values.len() != columns.len() {
                return Err(TableError::RowWidth {
                    gesture_id: row.gesture_id,
                    expected: columns.len(),
                    actual: row.values.len(),
                });
            }
        }

        rows.sort_by_key(|r| r.gesture_id);
        Ok(Self { columns, rows })
    }

    /// Check a feature column list against the fixed width.
    pub fn validate_width(columns: &[String]) -> Result<(), TableError> {
        if columns.len() != FEATURE_COUNT {
            return Err(TableError::WidthMismatch {
                expected: FEATURE_COUNT,
                actual: columns.len(),
            });
        }
        Ok(())
    }

    /// Feature column names (without id columns).
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut writer = csv::Writer::from_writer(writer);

        let mut header: Vec<&str> = ID_COLUMNS.to_vec();
        header.extend(self.columns.iter().map(String::as_str));
        writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.gesture_id.to_string(), row.sample_count.to_string()];
            record.extend(
                row.values
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write as a single JSON document with producer metadata.
    pub fn write_json<W: Write>(&self, writer: W, meta: &ExportMeta) -> Result<(), TableError> {
        let export = JsonExport {
            meta,
            columns: self.columns.clone(),
            rows: self.rows.iter().map(|r| self.row_object(r)).collect(),
        };
        serde_json::to_writer_pretty(writer, &export)?;
        Ok(())
    }

    /// Write as JSON Lines, one object per gesture.
    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> Result<(), TableError> {
        for row in &self.rows {
            serde_json::to_writer(&mut writer, &self.row_object(row))?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Save to a file in the given format.
    pub fn save(&self, path: &Path, format: OutputFormat, meta: &ExportMeta) -> Result<(), TableError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = std::io::BufWriter::new(std::fs::File::create(path)?);
        match format {
            OutputFormat::Csv => self.write_csv(file),
            OutputFormat::Json => self.write_json(file, meta),
            OutputFormat::Jsonl => self.write_jsonl(file),
        }
    }

    /// Read a CSV feature table.
    ///
    /// A feature width other than 74 is logged and the file's own columns
    /// are kept, so values stay aligned with their headers.
    pub fn read_csv<R: Read>(source: R) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(source);

        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let id_index = header
            .iter()
            .position(|c| c == ID_COLUMNS[0])
            .ok_or(TableError::MissingColumn(ID_COLUMNS[0]))?;
        let count_index = header
            .iter()
            .position(|c| c == ID_COLUMNS[1])
            .ok_or(TableError::MissingColumn(ID_COLUMNS[1]))?;

        let feature_indices: Vec<usize> = (0..header.len())
            .filter(|&i| i != id_index && i != count_index)
            .collect();
        let columns: Vec<String> = feature_indices.iter().map(|&i| header[i].clone()).collect();

        if let Err(e) = Self::validate_width(&columns) {
            tracing::warn!("{e}; keeping the table's own columns");
        }

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let row = index + 2;

            let invalid = |col: usize| TableError::InvalidValue {
                row,
                column: header[col].clone(),
                value: record[col].to_string(),
            };

            let gesture_id = record[id_index].parse::<u32>().map_err(|_| invalid(id_index))?;
            let sample_count = record[count_index]
                .parse::<usize>()
                .map_err(|_| invalid(count_index))?;

            let mut values = Vec::with_capacity(feature_indices.len());
            for &col in &feature_indices {
                values.push(parse_feature(&record[col]).ok_or_else(|| invalid(col))?);
            }

            rows.push(FeatureRow {
                gesture_id,
                sample_count,
                values,
            });
        }

        Ok(Self { columns, rows })
    }

    /// Load a CSV feature table from disk.
    pub fn load_csv(path: &Path) -> Result<Self, TableError> {
        let file = std::fs::File::open(path)?;
        Self::read_csv(std::io::BufReader::new(file))
    }

    fn row_object(&self, row: &FeatureRow) -> serde_json::Map<String, serde_json::Value> {
        let mut object = serde_json::Map::new();
        object.insert(ID_COLUMNS[0].to_string(), row.gesture_id.into());
        object.insert(ID_COLUMNS[1].to_string(), row.sample_count.into());
        for (column, value) in self.columns.iter().zip(&row.values) {
            let value = value
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null);
            object.insert(column.clone(), value);
        }
        object
    }
}

/// Parse a feature cell: empty or NaN is missing, anything else must be a number.
fn parse_feature(cell: &str) -> Option<Feature> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Some(None);
    }
    cell.parse::<f64>().ok().map(|v| v.is_finite().then_some(v))
}
