//! Regression models behind the price predictor.
//!
//! The dashboard never trains anything: models arrive as artifacts and are
//! evaluated as pure functions of a fixed-order feature vector. Each model kind
//! lives in its own file; `Regressor` is the seam the predictor (and test fakes)
//! plug into.

pub mod forest;
pub mod linear;

pub use forest::*;
pub use linear::*;

use serde::{Deserialize, Serialize};

use crate::error::DashError;

/// A trained model evaluated on one feature vector.
pub trait Regressor: Send + Sync {
    /// Number of features the model was trained on.
    fn n_features(&self) -> usize;

    /// Evaluate the model on `features`.
    fn predict(&self, features: &[f64]) -> Result<f64, DashError>;
}

/// On-disk model artifact, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelArtifact {
    Forest(ForestModel),
    Linear(LinearModel),
}

impl ModelArtifact {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ModelArtifact::Forest(_) => "forest",
            ModelArtifact::Linear(_) => "linear",
        }
    }

    pub fn into_regressor(self) -> Box<dyn Regressor> {
        match self {
            ModelArtifact::Forest(m) => Box::new(m),
            ModelArtifact::Linear(m) => Box::new(m),
        }
    }
}

/// Reject vectors whose length differs from what the model was trained on.
pub(crate) fn check_shape(expected: usize, features: &[f64]) -> Result<(), DashError> {
    if features.len() != expected {
        return Err(DashError::ModelInvocation(format!(
            "expected {expected} features, got {}",
            features.len()
        )));
    }
    if let Some(idx) = features.iter().position(|v| !v.is_finite()) {
        let name = crate::domain::FEATURE_ORDER.get(idx).copied().unwrap_or("?");
        return Err(DashError::ModelInvocation(format!("feature {idx} ({name}) is not finite")));
    }
    Ok(())
}
