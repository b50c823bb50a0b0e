//! Shared pipelines used by both CLI and TUI front-ends.
//!
//! Keeping these in one place avoids duplicating the core workflows:
//! - prediction: selection -> features (today, tomorrow) -> predictor -> trend
//! - map: price table -> aggregates -> region join
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::NaiveDate;

use crate::domain::{
    AggregationMethod, NationalSeries, PricePrediction, ProvinceAggregate, Selection, TrendComparison,
};
use crate::encoding::EncoderRegistry;
use crate::error::DashError;
use crate::io::table::PriceTable;
use crate::map::join::AnnotatedRegion;
use crate::map::regions::RegionCollection;
use crate::predict::{FeatureBuilder, PricePredictor};

/// Outputs of one day-over-day prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRun {
    pub selection: Selection,
    pub today: PricePrediction,
    pub tomorrow: PricePrediction,
    pub trend: TrendComparison,
}

/// Predict the selection's price on its date and the day after, then compare.
pub fn predict_day_over_day(
    registry: &EncoderRegistry,
    predictor: &PricePredictor,
    selection: &Selection,
) -> Result<PredictionRun, DashError> {
    let builder = FeatureBuilder::new(registry);
    let today_date = selection.date;
    let tomorrow_date = today_date.succ_opt().ok_or_else(|| DashError::DateParse {
        input: today_date.to_string(),
        reason: "no following calendar day".to_string(),
    })?;

    let today_record = builder.build(selection, today_date)?;
    let tomorrow_record = builder.build(selection, tomorrow_date)?;

    let today = predictor.predict_for(&today_record, today_date)?;
    let tomorrow = predictor.predict_for(&tomorrow_record, tomorrow_date)?;
    let trend = crate::predict::compare(today.price, tomorrow.price);

    tracing::debug!(
        commodity = %selection.commodity,
        market = %selection.market,
        today = today.price,
        tomorrow = tomorrow.price,
        direction = trend.direction.display_name(),
        "prediction run"
    );

    Ok(PredictionRun {
        selection: selection.clone(),
        today,
        tomorrow,
        trend,
    })
}

/// Outputs of one map refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRun {
    pub commodity: String,
    pub method: AggregationMethod,
    /// Most recent date column, if the table has any.
    pub latest_date: Option<NaiveDate>,
    pub aggregates: Vec<ProvinceAggregate>,
    pub national: NationalSeries,
    pub regions: Vec<AnnotatedRegion>,
}

impl MapRun {
    /// Number of regions that received a price.
    pub fn covered(&self) -> usize {
        self.regions.iter().filter(|r| r.price.value().is_some()).count()
    }
}

/// Aggregate `table` for `commodity` and join the result onto `regions`.
pub fn run_map(
    table: &PriceTable,
    regions: &RegionCollection,
    commodity: &str,
    method: AggregationMethod,
    name_key: &str,
) -> MapRun {
    let (aggregates, national) = crate::map::aggregate(table, commodity, method);
    let annotated = crate::map::join(&regions.features, &aggregates, name_key);

    let run = MapRun {
        commodity: commodity.to_string(),
        method,
        latest_date: table.latest_column().map(|idx| table.dates[idx]),
        aggregates,
        national,
        regions: annotated,
    };

    if run.aggregates.is_empty() {
        tracing::warn!(commodity, "no province has a price on the latest date");
    }
    tracing::debug!(
        commodity,
        provinces = run.aggregates.len(),
        regions = run.regions.len(),
        covered = run.covered(),
        "map run"
    );
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, RegionPrice};
    use crate::encoding::registry::tests::sample_registry;
    use crate::io::table::PriceRow;
    use crate::map::regions::{DEFAULT_NAME_KEY, Region};
    use crate::predict::predictor::tests::FakeModel;

    fn selection(date: NaiveDate) -> Selection {
        Selection {
            province: "ACEH".to_string(),
            city: "BANDA ACEH".to_string(),
            market: "Pasar Aceh".to_string(),
            commodity: "Gula Pasir".to_string(),
            date,
        }
    }

    #[test]
    fn friday_to_saturday_goes_up() {
        let registry = sample_registry();
        let predictor = PricePredictor::new(Box::new(FakeModel));
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let run = predict_day_over_day(&registry, &predictor, &selection(date)).unwrap();
        // Gula Pasir encodes to 2; Friday = 4, Saturday = 5.
        assert_eq!(run.today.price, 10_204.0);
        assert_eq!(run.tomorrow.price, 10_205.0);
        assert_eq!(run.tomorrow.date, NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        assert_eq!(run.trend.direction, Direction::Up);
    }

    #[test]
    fn sunday_to_monday_goes_down() {
        let registry = sample_registry();
        let predictor = PricePredictor::new(Box::new(FakeModel));
        let date = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();

        let run = predict_day_over_day(&registry, &predictor, &selection(date)).unwrap();
        assert_eq!(run.trend.direction, Direction::Down);
        assert_eq!(run.trend.series[0].1, run.today.price);
        assert_eq!(run.trend.series[1].1, run.tomorrow.price);
    }

    /// Price = -100 + day_of_week.
    struct BelowZeroModel;

    impl crate::models::Regressor for BelowZeroModel {
        fn n_features(&self) -> usize {
            crate::domain::FEATURE_COUNT
        }

        fn predict(&self, features: &[f64]) -> Result<f64, DashError> {
            crate::models::check_shape(crate::domain::FEATURE_COUNT, features)?;
            Ok(-100.0 + features[6])
        }
    }

    #[test]
    fn negative_outputs_are_compared_unchanged() {
        let registry = sample_registry();
        let predictor = PricePredictor::new(Box::new(BelowZeroModel));
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let run = predict_day_over_day(&registry, &predictor, &selection(date)).unwrap();
        assert_eq!(run.today.price, -96.0);
        assert_eq!(run.tomorrow.price, -95.0);
        assert_eq!(run.trend.direction, Direction::Up);
    }

    #[test]
    fn unknown_label_propagates() {
        let registry = sample_registry();
        let predictor = PricePredictor::new(Box::new(FakeModel));
        let mut sel = selection(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        sel.market = "Pasar Gaib".to_string();

        let err = predict_day_over_day(&registry, &predictor, &sel).unwrap_err();
        assert!(matches!(err, DashError::UnknownLabel { .. }));
    }

    #[test]
    fn map_run_marks_uncovered_regions() {
        let table = PriceTable {
            dates: vec![
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            ],
            date_headers: vec!["01/01/24".to_string(), "02/01/24".to_string()],
            rows: vec![
                PriceRow {
                    province: "aceh".to_string(),
                    city: String::new(),
                    market: String::new(),
                    commodity: "beras".to_string(),
                    prices: vec![Some(10_000.0), Some(12_000.0)],
                },
                PriceRow {
                    province: "ACEH ".to_string(),
                    city: String::new(),
                    market: String::new(),
                    commodity: "beras".to_string(),
                    prices: vec![Some(14_000.0), Some(12_000.0)],
                },
            ],
        };
        let square = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)];
        let regions = RegionCollection::new(vec![
            Region::polygon(DEFAULT_NAME_KEY, "Aceh", &square),
            Region::polygon(DEFAULT_NAME_KEY, "jawa barat", &square),
        ]);

        let run = run_map(&table, &regions, "beras", AggregationMethod::Min, DEFAULT_NAME_KEY);
        assert_eq!(run.latest_date, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(run.aggregates.len(), 1);
        assert_eq!(run.regions[0].price, RegionPrice::Available(12_000.0));
        assert_eq!(run.regions[1].price, RegionPrice::Unavailable);
        assert_eq!(run.covered(), 1);
        assert_eq!(run.national.points[0].mean_price, Some(12_000.0));
    }
}
