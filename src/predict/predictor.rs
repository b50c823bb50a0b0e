//! Price predictor: the single place that feeds feature records to the model.

use chrono::NaiveDate;

use crate::domain::{FeatureRecord, PricePrediction};
use crate::error::DashError;
use crate::models::Regressor;

pub struct PricePredictor {
    model: Box<dyn Regressor>,
}

impl PricePredictor {
    pub fn new(model: Box<dyn Regressor>) -> Self {
        Self { model }
    }

    pub fn n_features(&self) -> usize {
        self.model.n_features()
    }

    /// One deterministic model call for `record`.
    ///
    /// The model's output is returned as-is; only non-finite outputs are
    /// rejected. Display code decides how to show a negative price.
    pub fn predict(&self, record: &FeatureRecord) -> Result<f64, DashError> {
        let features = record.to_vector();
        let price = self.model.predict(&features)?;
        if !price.is_finite() {
            return Err(DashError::ModelInvocation(format!(
                "model returned non-finite price {price}"
            )));
        }
        if price < 0.0 {
            tracing::warn!(price, ?record, "model returned a negative price");
        }
        Ok(price)
    }

    pub fn predict_for(&self, record: &FeatureRecord, date: NaiveDate) -> Result<PricePrediction, DashError> {
        Ok(PricePrediction {
            date,
            price: self.predict(record)?,
        })
    }
}

impl std::fmt::Debug for PricePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PricePredictor")
            .field("n_features", &self.model.n_features())
            .finish()
    }
}
