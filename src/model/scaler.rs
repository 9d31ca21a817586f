//! Per-feature normalization parameters.

use crate::core::Feature;
use crate::model::error::{read_artifact, write_artifact, ModelError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Mean and scale fitted on normal training rows.
///
/// Serialized as `{"mean": [...], "scale": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl ScalerParams {
    /// Parse and validate parameters.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let params: ScalerParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        Self::from_json(&read_artifact(path)?)
    }

    /// Save parameters as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        write_artifact(path, &serde_json::to_string_pretty(self)?)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Impute missing values with the feature mean, then standardize.
    ///
    /// A feature with zero scale standardizes to 0.
    pub fn transform(&self, row: &[Feature]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.n_features() {
            return Err(ModelError::DimensionMismatch {
                what: "feature row",
                expected: self.n_features(),
                actual: row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (&mean, &scale))| {
                if scale == 0.0 {
                    return 0.0;
                }
                (value.unwrap_or(mean) - mean) / scale
            })
            .collect())
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.mean.is_empty() {
            return Err(ModelError::Empty("scaler mean"));
        }
        if self.scale.len() != self.mean.len() {
            return Err(ModelError::DimensionMismatch {
                what: "scaler scale",
                expected: self.mean.len(),
                actual: self.scale.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_imputes_and_scales() {
        let scaler = ScalerParams {
            mean: vec![1.0, 10.0, 5.0],
            scale: vec![2.0, 5.0, 0.0],
        };
        let out = scaler.transform(&[Some(3.0), None, Some(7.0)]).unwrap();
        assert_eq!(out, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_zero_scale_feature_is_zero() {
        let scaler = ScalerParams {
            mean: vec![4.0, 4.0],
            scale: vec![0.0, 0.0],
        };
        let out = scaler.transform(&[Some(100.0), None]).unwrap();
        assert_eq!(out, vec![0.0, 0.0]);
    }

    #[test]
    fn test_transform_rejects_wrong_width() {
        let scaler = ScalerParams {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        assert!(matches!(
            scaler.transform(&[Some(1.0)]),
            Err(ModelError::DimensionMismatch {
                expected: 3,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_from_json_validates_lengths() {
        assert!(ScalerParams::from_json(r#"{"mean":[0.0,1.0],"scale":[1.0,1.0]}"#).is_ok());
        assert!(matches!(
            ScalerParams::from_json(r#"{"mean":[0.0,1.0],"scale":[1.0]}"#),
            Err(ModelError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            ScalerParams::from_json(r#"{"mean":[],"scale":[]}"#),
            Err(ModelError::Empty(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler_params.json");
        let scaler = ScalerParams {
            mean: vec![0.5, -2.0],
            scale: vec![1.5, 3.0],
        };
        scaler.save(&path).unwrap();
        assert_eq!(ScalerParams::load(&path).unwrap(), scaler);
    }
}
