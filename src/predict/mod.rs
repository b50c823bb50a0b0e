//! Prediction path: selection -> feature record -> model -> day-over-day trend.

pub mod features;
pub mod predictor;
pub mod trend;

pub use features::*;
pub use predictor::*;
pub use trend::*;
