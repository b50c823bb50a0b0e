//! Export map aggregates to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use crate::domain::{AggregationMethod, NationalSeries, ProvinceAggregate};
use crate::error::AppError;

/// Write per-province aggregates to a CSV file.
pub fn write_aggregates_csv(
    path: &Path,
    aggregates: &[ProvinceAggregate],
    commodity: &str,
    method: AggregationMethod,
    date: &str,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["province", "commodity", "method", "date", "price"])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let method = format!("{method:?}").to_lowercase();
    for a in aggregates {
        let price = format!("{:.2}", a.price);
        writer
            .write_record([a.province.as_str(), commodity, method.as_str(), date, price.as_str()])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the national mean series to a CSV file; undefined points have an empty price.
pub fn write_national_csv(path: &Path, series: &NationalSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["date", "mean_price"])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
    for p in &series.points {
        let price = p.mean_price.map(|v| format!("{v:.2}")).unwrap_or_default();
        writer
            .write_record([p.date.to_string(), price])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
