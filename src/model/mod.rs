//! Consumers of the persisted one-class boundary model.
//!
//! Training happens outside this crate. The training stage exports two
//! plain JSON records, normalization parameters and boundary-model
//! parameters, which this module loads to score feature tables:
//!
//! ```text
//! feature row ──▶ impute (feature mean) ──▶ standardize ──▶ RBF decision ──▶ label
//! ```
//!
//! A score above 0 is normal; 0 or below is anomalous, whatever threshold
//! the estimator used internally.

mod boundary;
mod error;
mod scaler;
mod scorer;

pub use boundary::{BoundaryModel, BoundaryParams, Kernel, Label, DECISION_THRESHOLD};
pub use error::ModelError;
pub use scaler::ScalerParams;
pub use scorer::{ScoreReport, ScoredGesture, Scorer, Verdict, MIN_GESTURES};
