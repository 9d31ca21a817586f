//! Extraction statistics log.
//!
//! Counters are atomic so per-gesture work can record into a shared log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Statistics for the current extraction run.
#[derive(Debug)]
pub struct ExtractionLog {
    /// Unique id of this run
    run_id: Uuid,
    /// Samples read from input logs
    samples_read: AtomicU64,
    /// Samples dropped as duplicates
    duplicates_dropped: AtomicU64,
    /// Complete actions found by the segmenter
    segments_detected: AtomicU64,
    /// Detected actions with no usable window
    gestures_discarded: AtomicU64,
    /// Feature rows produced
    rows_emitted: AtomicU64,
    /// Run start time
    run_start: DateTime<Utc>,
    /// Path for persisting cumulative totals
    persist_path: Option<PathBuf>,
    /// Totals from earlier runs, loaded from disk
    previous: PersistedStats,
}

impl ExtractionLog {
    /// Create a new log.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            samples_read: AtomicU64::new(0),
            duplicates_dropped: AtomicU64::new(0),
            segments_detected: AtomicU64::new(0),
            gestures_discarded: AtomicU64::new(0),
            rows_emitted: AtomicU64::new(0),
            run_start: Utc::now(),
            persist_path: None,
            previous: PersistedStats::default(),
        }
    }

    /// Create a log that adds this run to totals stored at `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        if let Err(e) = log.load() {
            tracing::warn!("Could not load previous extraction stats: {e}");
        }

        log
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn record_samples_read(&self, count: u64) {
        self.samples_read.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_duplicates_dropped(&self, count: u64) {
        self.duplicates_dropped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_segments_detected(&self, count: u64) {
        self.segments_detected.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_gesture_discarded(&self) {
        self.gestures_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_row_emitted(&self) {
        self.rows_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the statistics of this run.
    pub fn stats(&self) -> ExtractionStats {
        ExtractionStats {
            run_id: self.run_id,
            samples_read: self.samples_read.load(Ordering::Relaxed),
            duplicates_dropped: self.duplicates_dropped.load(Ordering::Relaxed),
            segments_detected: self.segments_detected.load(Ordering::Relaxed),
            gestures_discarded: self.gestures_discarded.load(Ordering::Relaxed),
            rows_emitted: self.rows_emitted.load(Ordering::Relaxed),
            run_start: self.run_start,
            run_duration_ms: (Utc::now() - self.run_start).num_milliseconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Extraction Statistics:\n\
             - Samples read: {}\n\
             - Duplicate samples dropped: {}\n\
             - Complete actions detected: {}\n\
             - Actions discarded: {}\n\
             - Feature rows written: {}\n\
             - Run duration: {} ms",
            stats.samples_read,
            stats.duplicates_dropped,
            stats.segments_detected,
            stats.gestures_discarded,
            stats.rows_emitted,
            stats.run_duration_ms
        )
    }

    /// Save cumulative totals to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                runs: self.previous.runs + 1,
                samples_read: self.previous.samples_read + stats.samples_read,
                duplicates_dropped: self.previous.duplicates_dropped + stats.duplicates_dropped,
                segments_detected: self.previous.segments_detected + stats.segments_detected,
                gestures_discarded: self.previous.gestures_discarded + stats.gestures_discarded,
                rows_emitted: self.previous.rows_emitted + stats.rows_emitted,
                last_run_id: Some(self.run_id),
                last_updated: Some(Utc::now()),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load totals from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                self.previous = serde_json::from_str(&content).map_err(std::io::Error::other)?;
            }
        }
        Ok(())
    }

    /// Reset the counters of this run.
    pub fn reset(&self) {
        self.samples_read.store(0, Ordering::Relaxed);
        self.duplicates_dropped.store(0, Ordering::Relaxed);
        self.segments_detected.store(0, Ordering::Relaxed);
        self.gestures_discarded.store(0, Ordering::Relaxed);
        self.rows_emitted.store(0, Ordering::Relaxed);
    }
}

impl Default for ExtractionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of one run's statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub run_id: Uuid,
    pub samples_read: u64,
    pub duplicates_dropped: u64,
    pub segments_detected: u64,
    pub gestures_discarded: u64,
    pub rows_emitted: u64,
    pub run_start: DateTime<Utc>,
    pub run_duration_ms: u64,
}

/// Cumulative totals format for persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedStats {
    pub runs: u64,
    pub samples_read: u64,
    #[serde(default)]
    pub duplicates_dropped: u64,
    pub segments_detected: u64,
    pub gestures_discarded: u64,
    pub rows_emitted: u64,
    pub last_run_id: Option<Uuid>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl PersistedStats {
    /// Read totals from a stats file.
    pub fn read(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(std::io::Error::other)
    }
}

/// Thread-safe shared extraction log.
pub type SharedExtractionLog = Arc<ExtractionLog>;

/// Create a new shared extraction log.
pub fn create_shared_log() -> SharedExtractionLog {
    Arc::new(ExtractionLog::new())
}

/// Create a new shared extraction log with persistence.
pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedExtractionLog {
    Arc::new(ExtractionLog::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_log_counting() {
        let log = ExtractionLog::new();

        log.record_samples_read(120);
        log.record_segments_detected(3);
        log.record_gesture_discarded();
        log.record_row_emitted();
        log.record_row_emitted();

        let stats = log.stats();
        assert_eq!(stats.samples_read, 120);
        assert_eq!(stats.segments_detected, 3);
        assert_eq!(stats.gestures_discarded, 1);
        assert_eq!(stats.rows_emitted, 2);
    }

    #[test]
    fn test_extraction_log_reset() {
        let log = ExtractionLog::new();

        log.record_samples_read(100);
        log.record_duplicates_dropped(5);
        log.reset();

        let stats = log.stats();
        assert_eq!(stats.samples_read, 0);
        assert_eq!(stats.duplicates_dropped, 0);
    }

    #[test]
    fn test_summary_format() {
        let log = ExtractionLog::new();
        let summary = log.summary();

        assert!(summary.contains("Samples read"));
        assert!(summary.contains("Feature rows written"));
    }

    #[test]
    fn test_persistence_accumulates_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        let first = ExtractionLog::with_persistence(path.clone());
        first.record_samples_read(10);
        first.record_duplicates_dropped(2);
        first.record_row_emitted();
        first.save().unwrap();

        let second = ExtractionLog::with_persistence(path.clone());
        second.record_samples_read(5);
        second.record_duplicates_dropped(1);
        second.save().unwrap();

        let totals = PersistedStats::read(&path).unwrap();
        assert_eq!(totals.runs, 2);
        assert_eq!(totals.samples_read, 15);
        assert_eq!(totals.duplicates_dropped, 3);
        assert_eq!(totals.rows_emitted, 1);
        assert_eq!(totals.last_run_id, Some(second.run_id()));
    }

    #[test]
    fn test_older_stats_file_without_duplicates() {
        let json = r#"{
            "runs": 1,
            "samples_read": 4,
            "segments_detected": 1,
            "gestures_discarded": 0,
            "rows_emitted": 1
        }"#;
        let totals: PersistedStats = serde_json::from_str(json).unwrap();
        assert_eq!(totals.duplicates_dropped, 0);
        assert_eq!(totals.samples_read, 4);
    }
}
