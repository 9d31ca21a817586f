//! Scoring feature rows against a trained boundary model.

use crate::core::{FeatureRow, FeatureTable};
use crate::model::boundary::{BoundaryModel, Label};
use crate::model::error::ModelError;
use crate::model::scaler::ScalerParams;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Fewest scored gestures needed before an owner decision is made.
pub const MIN_GESTURES: usize = 3;

/// Scaler plus boundary model, checked to agree on dimensionality.
#[derive(Debug, Clone)]
pub struct Scorer {
    scaler: ScalerParams,
    model: BoundaryModel,
    min_gestures: usize,
}

impl Scorer {
    pub fn new(scaler: ScalerParams, model: BoundaryModel) -> Result<Self, ModelError> {
        if scaler.n_features() != model.n_features() {
            return Err(ModelError::DimensionMismatch {
                what: "scaler parameters",
                expected: model.n_features(),
                actual: scaler.n_features(),
            });
        }
        Ok(Self {
            scaler,
            model,
            min_gestures: MIN_GESTURES,
        })
    }

    /// Set how many gestures a verdict needs.
    pub fn with_min_gestures(mut self, min_gestures: usize) -> Self {
        self.min_gestures = min_gestures;
        self
    }

    /// Load both artifacts from disk.
    pub fn load(scaler_path: &Path, model_path: &Path) -> Result<Self, ModelError> {
        let scaler = ScalerParams::load(scaler_path)?;
        let model = BoundaryModel::load(model_path)?;
        tracing::debug!(
            "Loaded boundary model with {} features from {:?}",
            model.n_features(),
            model_path
        );
        Self::new(scaler, model)
    }

    pub fn n_features(&self) -> usize {
        self.model.n_features()
    }

    /// Score one feature row.
    pub fn score_row(&self, row: &FeatureRow) -> Result<ScoredGesture, ModelError> {
        let scaled = self.scaler.transform(&row.values).map_err(|e| ModelError::Row {
            gesture_id: row.gesture_id,
            source: Box::new(e),
        })?;
        let score = self.model.decision_function(&scaled)?;

        Ok(ScoredGesture {
            gesture_id: row.gesture_id,
            score,
            label: Label::from_score(score),
        })
    }

    /// Score every row of a table, in table order.
    pub fn score_table(&self, table: &FeatureTable) -> Result<ScoreReport, ModelError> {
        let scores = table
            .rows()
            .iter()
            .map(|row| self.score_row(row))
            .collect::<Result<Vec<_>, _>>()?;

        let report = ScoreReport::from_scores(scores, self.min_gestures);
        tracing::info!(
            "Scored {} gestures: {} normal, {} anomalous ({})",
            report.scores.len(),
            report.normal_count,
            report.anomalous_count,
            report.verdict().as_str()
        );
        Ok(report)
    }
}

/// Score and label for one gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredGesture {
    pub gesture_id: u32,
    pub score: f64,
    pub label: Label,
}

/// Owner decision over a batch of gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// More than half of the gestures are normal
    Owner,
    NotOwner,
    /// Too few gestures to decide
    Insufficient,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Owner => "owner",
            Verdict::NotOwner => "not owner",
            Verdict::Insufficient => "insufficient gestures",
        }
    }
}

/// Result of scoring a feature table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub scores: Vec<ScoredGesture>,
    pub normal_count: usize,
    pub anomalous_count: usize,
    /// Gestures required before a verdict is given
    pub min_gestures: usize,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a ScoreReport,
    verdict: Verdict,
}

impl ScoreReport {
    pub fn from_scores(scores: Vec<ScoredGesture>, min_gestures: usize) -> Self {
        let normal_count = scores.iter().filter(|s| s.label == Label::Normal).count();
        let anomalous_count = scores.len() - normal_count;
        Self {
            scores,
            normal_count,
            anomalous_count,
            min_gestures,
        }
    }

    /// Majority vote: owner when normal gestures exceed half of the batch
    /// (integer half, so 2 of 4 is not enough).
    pub fn verdict(&self) -> Verdict {
        let n = self.scores.len();
        if n == 0 || n < self.min_gestures {
            Verdict::Insufficient
        } else if self.normal_count > n / 2 {
            Verdict::Owner
        } else {
            Verdict::NotOwner
        }
    }

    /// Fraction of gestures labelled anomalous.
    pub fn anomaly_rate(&self) -> f64 {
        if self.scores.is_empty() {
            0.0
        } else {
            self.anomalous_count as f64 / self.scores.len() as f64
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Scoring Summary:\n\
             - Gestures scored: {}\n\
             - Normal: {}\n\
             - Anomalous: {} ({:.1}%)\n\
             - Verdict: {} (needs {} gestures)",
            self.scores.len(),
            self.normal_count,
            self.anomalous_count,
            self.anomaly_rate() * 100.0,
            self.verdict().as_str(),
            self.min_gestures
        )
    }

    /// Write `gesture_id,score,label` rows; label is 0 normal, 1 anomalous.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["gesture_id", "score", "label"])?;
        for s in &self.scores {
            wtr.write_record([
                s.gesture_id.to_string(),
                s.score.to_string(),
                s.label.as_u8().to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), serde_json::Error> {
        let export = JsonReport {
            report: self,
            verdict: self.verdict(),
        };
        serde_json::to_writer_pretty(writer, &export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::boundary::BoundaryParams;

    fn scorer() -> Scorer {
        let scaler = ScalerParams {
            mean: vec![1.0, 1.0],
            scale: vec![1.0, 2.0],
        };
        let model = BoundaryModel::from_params(BoundaryParams {
            support_vectors: vec![vec![0.0, 0.0]],
            dual_coef: vec![vec![1.0]],
            gamma: 0.5,
            intercept: vec![-0.5],
            kernel: "rbf".to_string(),
            n_features: None,
            n_support_vectors: None,
        })
        .unwrap();
        Scorer::new(scaler, model).unwrap()
    }

    fn row(id: u32, values: Vec<Option<f64>>) -> FeatureRow {
        FeatureRow {
            gesture_id: id,
            sample_count: 3,
            values,
        }
    }

    #[test]
    fn test_missing_values_score_as_mean() {
        let scored = scorer().score_row(&row(4, vec![None, None])).unwrap();
        assert_eq!(scored.gesture_id, 4);
        assert!((scored.score - 0.5).abs() < 1e-12);
        assert_eq!(scored.label, Label::Normal);
    }

    #[test]
    fn test_outlier_is_anomalous() {
        let scored = scorer()
            .score_row(&row(1, vec![Some(50.0), Some(-40.0)]))
            .unwrap();
        assert_eq!(scored.label, Label::Anomalous);
    }

    #[test]
    fn test_wrong_row_width_reports_gesture() {
        let err = scorer().score_row(&row(9, vec![Some(1.0)])).unwrap_err();
        assert!(matches!(err, ModelError::Row { gesture_id: 9, .. }));
    }

    #[test]
    fn test_scaler_model_mismatch() {
        let scaler = ScalerParams {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        let model = scorer().model;
        assert!(matches!(
            Scorer::new(scaler, model),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }

    fn labelled(labels: &[Label]) -> ScoreReport {
        let scores = labels
            .iter()
            .enumerate()
            .map(|(i, &label)| ScoredGesture {
                gesture_id: i as u32 + 1,
                score: if label == Label::Normal { 0.5 } else { -0.5 },
                label,
            })
            .collect();
        ScoreReport::from_scores(scores, MIN_GESTURES)
    }

    #[test]
    fn test_verdict_majority_vote() {
        use Label::{Anomalous, Normal};

        assert_eq!(labelled(&[Normal, Normal, Anomalous]).verdict(), Verdict::Owner);
        assert_eq!(
            labelled(&[Normal, Anomalous, Anomalous]).verdict(),
            Verdict::NotOwner
        );
        // exactly half is not a majority
        assert_eq!(
            labelled(&[Normal, Normal, Anomalous, Anomalous]).verdict(),
            Verdict::NotOwner
        );
        assert_eq!(
            labelled(&[Normal, Normal, Normal, Anomalous, Anomalous]).verdict(),
            Verdict::Owner
        );
    }

    #[test]
    fn test_verdict_needs_min_gestures() {
        use Label::Normal;

        assert_eq!(labelled(&[]).verdict(), Verdict::Insufficient);
        assert_eq!(labelled(&[Normal, Normal]).verdict(), Verdict::Insufficient);
        assert_eq!(labelled(&[Normal, Normal, Normal]).verdict(), Verdict::Owner);

        let lenient = ScoreReport::from_scores(labelled(&[Normal]).scores, 1);
        assert_eq!(lenient.verdict(), Verdict::Owner);
        assert!(labelled(&[Normal]).summary().contains("insufficient gestures"));
    }

    #[test]
    fn test_score_table_uses_min_gestures() {
        let csv = "gesture_id,sample_count,a,b\n1,3,,\n2,3,,\n";
        let table = FeatureTable::read_csv(csv.as_bytes()).unwrap();
        let report = scorer().score_table(&table).unwrap();
        assert_eq!(report.verdict(), Verdict::Insufficient);

        let report = scorer().with_min_gestures(2).score_table(&table).unwrap();
        assert_eq!(report.verdict(), Verdict::Owner);
    }

    #[test]
    fn test_json_report_includes_verdict() {
        let mut buf = Vec::new();
        labelled(&[Label::Normal]).write_json(&mut buf).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["verdict"], "insufficient");
        assert_eq!(json["min_gestures"], 3);
    }

    #[test]
    fn test_report_counts_and_csv() {
        let report = ScoreReport::from_scores(
            vec![
                ScoredGesture {
                    gesture_id: 1,
                    score: 0.25,
                    label: Label::Normal,
                },
                ScoredGesture {
                    gesture_id: 2,
                    score: -1.0,
                    label: Label::Anomalous,
                },
            ],
            MIN_GESTURES,
        );
        assert_eq!(report.normal_count, 1);
        assert_eq!(report.anomalous_count, 1);
        assert!((report.anomaly_rate() - 0.5).abs() < 1e-12);

        let mut buf = Vec::new();
        report.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "gesture_id,score,label\n1,0.25,0\n2,-1,1\n");
    }
}
