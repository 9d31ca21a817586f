//! One-class boundary model evaluation.

use crate::model::error::{read_artifact, write_artifact, ModelError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fixed classification threshold on the decision score.
pub const DECISION_THRESHOLD: f64 = 0.0;

/// Kernel used by the boundary model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Rbf,
}

impl Kernel {
    pub fn parse(name: &str) -> Result<Self, ModelError> {
        match name.trim().to_lowercase().as_str() {
            "rbf" => Ok(Kernel::Rbf),
            other => Err(ModelError::UnsupportedKernel(other.to_string())),
        }
    }
}

/// Classification of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Normal,
    Anomalous,
}

impl Label {
    /// Score above the threshold is normal.
    pub fn from_score(score: f64) -> Self {
        if score > DECISION_THRESHOLD {
            Label::Normal
        } else {
            Label::Anomalous
        }
    }

    /// Numeric label: 0 normal, 1 anomalous.
    pub fn as_u8(self) -> u8 {
        match self {
            Label::Normal => 0,
            Label::Anomalous => 1,
        }
    }
}

/// Boundary-model record as exported by the training stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryParams {
    pub support_vectors: Vec<Vec<f64>>,
    /// One row of dual coefficients, one per support vector
    pub dual_coef: Vec<Vec<f64>>,
    pub gamma: f64,
    pub intercept: Vec<f64>,
    pub kernel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_support_vectors: Option<usize>,
}

/// A validated boundary model ready for scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryModel {
    kernel: Kernel,
    gamma: f64,
    intercept: f64,
    support_vectors: Vec<Vec<f64>>,
    coefficients: Vec<f64>,
}

impl BoundaryModel {
    /// Validate exported parameters.
    pub fn from_params(params: BoundaryParams) -> Result<Self, ModelError> {
        let kernel = Kernel::parse(&params.kernel)?;

        let n_features = match params.support_vectors.first() {
            Some(sv) if !sv.is_empty() => sv.len(),
            _ => return Err(ModelError::Empty("support vectors")),
        };
        for sv in &params.support_vectors {
            if sv.len() != n_features {
                return Err(ModelError::DimensionMismatch {
                    what: "support vector",
                    expected: n_features,
                    actual: sv.len(),
                });
            }
        }
        if let Some(declared) = params.n_features {
            if declared != n_features {
                return Err(ModelError::DimensionMismatch {
                    what: "n_features",
                    expected: declared,
                    actual: n_features,
                });
            }
        }
        if let Some(declared) = params.n_support_vectors {
            if declared != params.support_vectors.len() {
                return Err(ModelError::DimensionMismatch {
                    what: "n_support_vectors",
                    expected: declared,
                    actual: params.support_vectors.len(),
                });
            }
        }

        let coefficients = params
            .dual_coef
            .into_iter()
            .next()
            .ok_or(ModelError::Empty("dual coefficients"))?;
        if coefficients.len() != params.support_vectors.len() {
            return Err(ModelError::DimensionMismatch {
                what: "dual coefficients",
                expected: params.support_vectors.len(),
                actual: coefficients.len(),
            });
        }

        let intercept = *params
            .intercept
            .first()
            .ok_or(ModelError::Empty("intercept"))?;

        Ok(Self {
            kernel,
            gamma: params.gamma,
            intercept,
            support_vectors: params.support_vectors,
            coefficients,
        })
    }

    /// Parse and validate a JSON record.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Self::from_params(serde_json::from_str(json)?)
    }

    /// Load a JSON record from disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        Self::from_json(&read_artifact(path)?)
    }

    /// Export back to the plain record.
    pub fn to_params(&self) -> BoundaryParams {
        BoundaryParams {
            support_vectors: self.support_vectors.clone(),
            dual_coef: vec![self.coefficients.clone()],
            gamma: self.gamma,
            intercept: vec![self.intercept],
            kernel: "rbf".to_string(),
            n_features: Some(self.n_features()),
            n_support_vectors: Some(self.support_vectors.len()),
        }
    }

    /// Save as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        write_artifact(path, &serde_json::to_string_pretty(&self.to_params())?)
    }

    pub fn n_features(&self) -> usize {
        self.support_vectors[0].len()
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Signed distance-like score; positive inside the normal region.
    pub fn decision_function(&self, x: &[f64]) -> Result<f64, ModelError> {
        if x.len() != self.n_features() {
            return Err(ModelError::DimensionMismatch {
                what: "input vector",
                expected: self.n_features(),
                actual: x.len(),
            });
        }

        let sum: f64 = self
            .support_vectors
            .iter()
            .zip(&self.coefficients)
            .map(|(sv, &coef)| coef * self.kernel_value(sv, x))
            .sum();

        Ok(sum + self.intercept)
    }

    /// Label from the fixed threshold.
    pub fn predict(&self, x: &[f64]) -> Result<Label, ModelError> {
        self.decision_function(x).map(Label::from_score)
    }

    fn kernel_value(&self, sv: &[f64], x: &[f64]) -> f64 {
        match self.kernel {
            Kernel::Rbf => {
                let dist_sq: f64 = sv.iter().zip(x).map(|(a, b)| (a - b).powi(2)).sum();
                (-self.gamma * dist_sq).exp()
            }
        }
    }
}
