//! Linear regression model: `y = intercept + coefficients · x`.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use super::{Regressor, check_shape};
use crate::error::DashError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub n_features: usize,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl Regressor for LinearModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<f64, DashError> {
        check_shape(self.n_features, features)?;
        if self.coefficients.len() != self.n_features {
            return Err(DashError::ModelInvocation(format!(
                "model declares {} features but has {} coefficients",
                self.n_features,
                self.coefficients.len()
            )));
        }

        let beta = DVector::from_column_slice(&self.coefficients);
        let x = DVector::from_column_slice(features);
        Ok(self.intercept + beta.dot(&x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_prediction_is_dot_product_plus_intercept() {
        let model = LinearModel {
            n_features: 3,
            intercept: 100.0,
            coefficients: vec![1.0, 10.0, -2.0],
        };
        let y = model.predict(&[1.0, 2.0, 3.0]).unwrap();
        assert!((y - 115.0).abs() < 1e-12);
    }

    #[test]
    fn coefficient_count_mismatch_is_rejected() {
        let model = LinearModel {
            n_features: 2,
            intercept: 0.0,
            coefficients: vec![1.0],
        };
        assert!(matches!(model.predict(&[1.0, 2.0]), Err(DashError::ModelInvocation(_))));
    }
}
