//! Province and national price statistics for one commodity.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::domain::{AggregationMethod, NationalPoint, NationalSeries, ProvinceAggregate};
use crate::io::table::{PriceRow, PriceTable};

/// Join key for province names: trimmed and upper-cased.
pub fn normalize_province(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Aggregate `table` for `commodity`.
///
/// Returns per-province prices on the latest date column (sorted by province,
/// reduced with `method`) and the national mean for every date column.
/// A commodity with no rows yields no aggregates and an all-undefined series.
pub fn aggregate(
    table: &PriceTable,
    commodity: &str,
    method: AggregationMethod,
) -> (Vec<ProvinceAggregate>, NationalSeries) {
    let rows: Vec<&PriceRow> = table
        .rows
        .iter()
        .filter(|r| r.commodity == commodity)
        .collect();

    let aggregates = match table.latest_column() {
        Some(latest) => province_aggregates(&rows, latest, method),
        None => Vec::new(),
    };

    (aggregates, national_series(table, &rows))
}

fn province_aggregates(rows: &[&PriceRow], column: usize, method: AggregationMethod) -> Vec<ProvinceAggregate> {
    // Every group gets an entry so that all-missing groups can be dropped below.
    let mut groups: BTreeMap<String, Option<f64>> = BTreeMap::new();
    for row in rows {
        let slot = groups.entry(normalize_province(&row.province)).or_insert(None);
        if let Some(price) = row.price_at(column) {
            *slot = Some(match *slot {
                Some(acc) => method.reduce(acc, price),
                None => price,
            });
        }
    }

    groups
        .into_iter()
        .filter_map(|(province, price)| price.map(|price| ProvinceAggregate { province, price }))
        .collect()
}

fn national_series(table: &PriceTable, rows: &[&PriceRow]) -> NationalSeries {
    let points = table
        .dates
        .par_iter()
        .enumerate()
        .map(|(column, &date)| NationalPoint {
            date,
            mean_price: column_mean(rows, column),
        })
        .collect();

    NationalSeries { points }
}

fn column_mean(rows: &[&PriceRow], column: usize) -> Option<f64> {
    let (sum, n) = rows
        .iter()
        .filter_map(|r| r.price_at(column))
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}
