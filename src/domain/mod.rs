//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - categorical model inputs (`Field`, `Selection`, `FeatureRecord`)
//! - prediction outputs (`PricePrediction`, `TrendComparison`)
//! - map/trend aggregates (`ProvinceAggregate`, `NationalSeries`, `RegionPrice`)

pub mod types;

pub use types::*;
