//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - built fresh per user query (selections, feature records)
//! - rendered by both the CLI and the TUI
//! - exported to CSV/GeoJSON

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Number of numeric features the price model consumes.
pub const FEATURE_COUNT: usize = 7;

/// Feature names in the exact order the model expects them.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = [
    "Provinsi",
    "Kabupaten Kota",
    "Nama Pasar",
    "Nama Variant",
    "day",
    "month",
    "dayofweek",
];

/// Marker stored on map regions that have no aggregate price.
pub const NO_DATA_LABEL: &str = "Data tidak tersedia";

/// A categorical input of the price model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Province,
    City,
    Market,
    Commodity,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Province, Field::City, Field::Market, Field::Commodity];

    /// Key of this field in the encoder artifact and the price dataset header.
    pub fn artifact_key(self) -> &'static str {
        match self {
            Field::Province => "Provinsi",
            Field::City => "Kabupaten Kota",
            Field::Market => "Nama Pasar",
            Field::Commodity => "Nama Variant",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Field::Province => "Province",
            Field::City => "City",
            Field::Market => "Market",
            Field::Commodity => "Commodity",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.artifact_key())
    }
}

/// One user query on the prediction screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub province: String,
    pub city: String,
    pub market: String,
    pub commodity: String,
    pub date: NaiveDate,
}

impl Selection {
    pub fn label(&self, field: Field) -> &str {
        match field {
            Field::Province => &self.province,
            Field::City => &self.city,
            Field::Market => &self.market,
            Field::Commodity => &self.commodity,
        }
    }
}

/// Encoded model input for one (selection, date) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureRecord {
    pub province: u32,
    pub city: u32,
    pub market: u32,
    pub commodity: u32,
    /// Day of month, 1–31.
    pub day: u32,
    /// Month, 1–12.
    pub month: u32,
    /// Monday = 0 .. Sunday = 6.
    pub day_of_week: u32,
}

impl FeatureRecord {
    /// Numeric vector in `FEATURE_ORDER`.
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.province),
            f64::from(self.city),
            f64::from(self.market),
            f64::from(self.commodity),
            f64::from(self.day),
            f64::from(self.month),
            f64::from(self.day_of_week),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePrediction {
    pub date: NaiveDate,
    pub price: f64,
}

/// How per-province prices are reduced on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    Min,
    Max,
}

impl AggregationMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            AggregationMethod::Min => "Lowest price",
            AggregationMethod::Max => "Highest price",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            AggregationMethod::Min => AggregationMethod::Max,
            AggregationMethod::Max => AggregationMethod::Min,
        }
    }

    /// Combine an accumulated value with the next observation.
    pub fn reduce(self, acc: f64, value: f64) -> f64 {
        match self {
            AggregationMethod::Min => acc.min(value),
            AggregationMethod::Max => acc.max(value),
        }
    }
}

/// Summary price of one province on the most recent date column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceAggregate {
    /// Upper-cased, trimmed province name (the map join key).
    pub province: String,
    pub price: f64,
}

/// National mean for one date column; `None` when the column had no values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NationalPoint {
    pub date: NaiveDate,
    pub mean_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NationalSeries {
    pub points: Vec<NationalPoint>,
}

impl NationalSeries {
    /// Points that carry a mean, in chronological order.
    pub fn defined(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.mean_price.map(|v| (p.date, v)))
    }

    pub fn is_all_undefined(&self) -> bool {
        self.points.iter().all(|p| p.mean_price.is_none())
    }
}

/// Predicted movement from today to tomorrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Stable,
}

impl Direction {
    pub fn display_name(self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Stable => "Stable",
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
            Direction::Stable => "►",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendLabel {
    Today,
    Tomorrow,
}

impl TrendLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendLabel::Today => "today",
            TrendLabel::Tomorrow => "tomorrow",
        }
    }
}

/// Two-point comparison series plus its classified direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendComparison {
    pub direction: Direction,
    pub series: [(TrendLabel, f64); 2],
}

/// Price attached to a map region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionPrice {
    Available(f64),
    Unavailable,
}

impl RegionPrice {
    pub fn value(self) -> Option<f64> {
        match self {
            RegionPrice::Available(v) => Some(v),
            RegionPrice::Unavailable => None,
        }
    }

    /// GeoJSON property value: a number, or the no-data marker string.
    pub fn to_json(self) -> serde_json::Value {
        match self {
            RegionPrice::Available(v) => serde_json::Number::from_f64(v)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(NO_DATA_LABEL.to_string())),
            RegionPrice::Unavailable => serde_json::Value::String(NO_DATA_LABEL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_vector_follows_model_order() {
        let record = FeatureRecord {
            province: 1,
            city: 2,
            market: 3,
            commodity: 4,
            day: 15,
            month: 3,
            day_of_week: 4,
        };
        assert_eq!(record.to_vector(), [1.0, 2.0, 3.0, 4.0, 15.0, 3.0, 4.0]);
    }

    #[test]
    fn region_price_json_uses_marker_for_missing() {
        assert_eq!(RegionPrice::Available(12000.0).to_json(), serde_json::json!(12000.0));
        assert_eq!(RegionPrice::Unavailable.to_json(), serde_json::json!(NO_DATA_LABEL));
    }

    #[test]
    fn aggregation_reduce() {
        assert_eq!(AggregationMethod::Min.reduce(3.0, 2.0), 2.0);
        assert_eq!(AggregationMethod::Max.reduce(3.0, 2.0), 3.0);
        assert_eq!(AggregationMethod::Min.toggle(), AggregationMethod::Max);
    }
}
