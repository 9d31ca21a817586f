//! End-to-end tests: touch log CSV in, feature table and scores out.

use std::io::Write;
use touch_gesture_features::core::{self, ExportMeta, ExtractOptions, OutputFormat};
use touch_gesture_features::model::{BoundaryModel, BoundaryParams, Label, ScalerParams, Scorer};
use touch_gesture_features::report::ExtractionLog;
use touch_gesture_features::stream::{self, StreamError, INPUT_COLUMNS};
use touch_gesture_features::{FeatureTable, PipelineError, Verdict, FEATURE_COUNT};

/// Column of `accel_x_mean` in the feature values.
const ACCEL_X_MEAN: usize = 29;

/// (label, timestamp, x, y, accel_x)
type Row<'a> = (&'a str, i64, f64, f64, f64);

fn log_csv(rows: &[Row]) -> String {
    let mut out = INPUT_COLUMNS.join(",");
    out.push('\n');
    for &(label, t, x, y, accel_x) in rows {
        out.push_str(&format!(
            "{label},{x},{y},{t},0.5,0.1,up,{accel_x},0,9.8,0,0,0,30,-12,4\n"
        ));
    }
    out
}

fn extract(rows: &[Row], padding_ms: u32) -> Result<FeatureTable, PipelineError> {
    let samples = stream::read_samples(log_csv(rows).as_bytes()).unwrap();
    let log = ExtractionLog::new();
    let options = ExtractOptions {
        padding_ms,
        dedup_samples: false,
    };
    core::run(samples.into(), &options, &log)
}

#[test]
fn test_single_gesture_end_to_end() {
    let table = extract(
        &[
            ("无触摸", 0, 0.0, 0.0, 0.0),
            ("按下", 10, 0.0, 0.0, 1.0),
            ("滑动中", 20, 3.0, 4.0, 2.0),
            ("抬起", 30, 6.0, 8.0, 3.0),
            ("无触摸", 40, 0.0, 0.0, 0.0),
        ],
        0,
    )
    .unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.columns().len(), FEATURE_COUNT);

    let row = &table.rows()[0];
    assert_eq!(row.gesture_id, 1);
    assert_eq!(row.sample_count, 3);
    assert_eq!(row.values.len(), FEATURE_COUNT);
    assert_eq!(&row.values[0..4], &[Some(0.0), Some(0.0), Some(6.0), Some(8.0)]);
    // displacement equals path length on a straight stroke
    assert_eq!(row.values[6], Some(1.0));
    assert_eq!(row.values[15], Some(20.0));
    assert_eq!(row.values[ACCEL_X_MEAN], Some(2.0));
}

#[test]
fn test_two_gestures_get_sequential_ids() {
    let table = extract(
        &[
            ("press", 10, 0.0, 0.0, 0.0),
            ("move", 20, 1.0, 0.0, 0.0),
            ("release", 30, 2.0, 0.0, 0.0),
            ("none", 40, 0.0, 0.0, 0.0),
            ("press", 100, 5.0, 5.0, 0.0),
            ("move", 110, 5.0, 7.0, 0.0),
            ("move", 120, 5.0, 9.0, 0.0),
            ("release", 130, 5.0, 11.0, 0.0),
            ("none", 140, 0.0, 0.0, 0.0),
        ],
        0,
    )
    .unwrap();

    let ids: Vec<u32> = table.rows().iter().map(|r| r.gesture_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(table.rows()[0].sample_count, 3);
    assert_eq!(table.rows()[1].sample_count, 4);
    assert_eq!(table.rows()[0].values[2], Some(2.0));
    assert_eq!(table.rows()[1].values[2], Some(5.0));
}

#[test]
fn test_missing_slide_yields_no_gestures() {
    let result = extract(
        &[
            ("press", 10, 0.0, 0.0, 0.0),
            ("release", 30, 0.0, 0.0, 0.0),
            ("none", 40, 0.0, 0.0, 0.0),
        ],
        0,
    );
    assert!(matches!(result, Err(PipelineError::NoGestures)));
}

#[test]
fn test_padding_ignores_non_touch_rows() {
    let rows = [
        ("none", 0, 0.0, 0.0, 100.0),
        ("press", 10, 0.0, 0.0, 1.0),
        ("move", 20, 3.0, 4.0, 2.0),
        ("release", 30, 6.0, 8.0, 3.0),
        ("none", 40, 0.0, 0.0, 100.0),
    ];

    // Non-touch rows never join a window, padded or not.
    let unpadded = extract(&rows, 0).unwrap();
    let padded = extract(&rows, 15).unwrap();
    assert_eq!(unpadded.rows()[0].values, padded.rows()[0].values);
    assert_eq!(padded.rows()[0].sample_count, 3);
}

#[test]
fn test_malformed_log_fails_before_segmentation() {
    let mut csv = log_csv(&[("press", 10, 0.0, 0.0, 0.0)]);
    csv.push_str("move,1,2,not-a-time,0,0,up,0,0,0,0,0,0,0,0,0\n");

    let err = stream::read_samples(csv.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        StreamError::InvalidValue {
            row: 3,
            column: "timestamp_ms",
            ..
        }
    ));

    let short = format!("{}\npress,1,2\n", INPUT_COLUMNS.join(","));
    assert!(matches!(
        stream::read_samples(short.as_bytes()),
        Err(StreamError::ColumnCount { row: 2, .. })
    ));
}

#[test]
fn test_table_file_round_trip_and_scoring() {
    let dir = tempfile::tempdir().unwrap();

    let log_path = dir.path().join("touch_log.csv");
    let mut file = std::fs::File::create(&log_path).unwrap();
    file.write_all(
        log_csv(&[
            ("press", 10, 0.0, 0.0, 1.0),
            ("move", 20, 3.0, 4.0, 2.0),
            ("release", 30, 6.0, 8.0, 3.0),
        ])
        .as_bytes(),
    )
    .unwrap();
    drop(file);

    let stream = stream::read_stream(&log_path).unwrap();
    let log = ExtractionLog::new();
    let table = core::run(stream, &ExtractOptions::default(), &log).unwrap();

    let table_path = dir.path().join("features.csv");
    let meta = ExportMeta::new(log.run_id(), 0);
    table.save(&table_path, OutputFormat::Csv, &meta).unwrap();

    let loaded = FeatureTable::load_csv(&table_path).unwrap();
    assert_eq!(loaded, table);

    // A model centred exactly on this gesture scores it as normal.
    let mean: Vec<f64> = table.rows()[0].values.iter().map(|v| v.unwrap_or(0.0)).collect();
    let scaler = ScalerParams {
        mean,
        scale: vec![1.0; FEATURE_COUNT],
    };
    let model = BoundaryModel::from_params(BoundaryParams {
        support_vectors: vec![vec![0.0; FEATURE_COUNT]],
        dual_coef: vec![vec![1.0]],
        gamma: 0.1,
        intercept: vec![-0.5],
        kernel: "rbf".to_string(),
        n_features: Some(FEATURE_COUNT),
        n_support_vectors: Some(1),
    })
    .unwrap();

    let scaler_path = dir.path().join("scaler_params.json");
    let model_path = dir.path().join("ocsvm_params.json");
    scaler.save(&scaler_path).unwrap();
    model.save(&model_path).unwrap();

    let scorer = Scorer::load(&scaler_path, &model_path).unwrap();
    let report = scorer.score_table(&loaded).unwrap();
    assert_eq!(report.scores.len(), 1);
    assert_eq!(report.scores[0].label, Label::Normal);
    assert!((report.scores[0].score - 0.5).abs() < 1e-9);
    assert_eq!(report.normal_count, 1);
    // One gesture is too few to decide who is holding the device.
    assert_eq!(report.verdict(), Verdict::Insufficient);
}

#[test]
fn test_json_export_has_null_for_missing() {
    // Samples sharing one timestamp leave no speed to measure.
    let table = extract(
        &[
            ("press", 10, 1.0, 1.0, 0.0),
            ("move", 10, 1.0, 1.0, 0.0),
            ("release", 10, 1.0, 1.0, 0.0),
        ],
        0,
    )
    .unwrap();

    let mut buf = Vec::new();
    table.write_jsonl(&mut buf).unwrap();
    let line: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(line["gesture_id"], 1);
    assert!(line["speed_mean"].is_null());
}
