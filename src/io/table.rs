//! Wide price table ingest.
//!
//! The historical dataset is a CSV with a few descriptive columns followed by
//! one column per observation date (`DD/MM/YY` headers). This module turns it
//! into an explicit schema:
//!
//! - descriptive columns are resolved by name (case-insensitive, BOM-safe)
//! - every header containing `/` is a date column, parsed up front
//! - date columns must be strictly chronological, so the last one is the latest
//! - empty or non-numeric cells become missing values

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::Field;
use crate::error::{AppError, DashError};

/// One (province, city, market, commodity) row with its price history.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub province: String,
    pub city: String,
    pub market: String,
    pub commodity: String,
    /// One entry per date column, aligned with `PriceTable::dates`.
    pub prices: Vec<Option<f64>>,
}

impl PriceRow {
    pub fn price_at(&self, column: usize) -> Option<f64> {
        self.prices.get(column).copied().flatten()
    }
}

/// Read-only wide table of observed prices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    /// Parsed date columns, oldest first.
    pub dates: Vec<NaiveDate>,
    /// Original header text of each date column (used for display).
    pub date_headers: Vec<String>,
    pub rows: Vec<PriceRow>,
}

impl PriceTable {
    /// Index of the most recent date column.
    pub fn latest_column(&self) -> Option<usize> {
        self.dates.len().checked_sub(1)
    }

    pub fn latest_header(&self) -> Option<&str> {
        self.latest_column()
            .and_then(|idx| self.date_headers.get(idx))
            .map(String::as_str)
    }

    /// Distinct commodities in first-appearance order.
    pub fn commodities(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter(|r| seen.insert(r.commodity.as_str()))
            .map(|r| r.commodity.clone())
            .collect()
    }
}

/// Summary of what ingest skipped, for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub rows_read: usize,
    pub invalid_cells: usize,
}

/// Load the price table from a CSV file.
pub fn load_price_table(path: &Path) -> Result<PriceTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::from(DashError::MissingArtifact {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    })?;
    let (table, stats) = read_price_table(file)?;
    tracing::info!(
        path = %path.display(),
        rows = stats.rows_read,
        dates = table.dates.len(),
        invalid_cells = stats.invalid_cells,
        "loaded price table"
    );
    Ok(table)
}

/// Parse a price table from any CSV reader.
pub fn read_price_table<R: Read>(reader: R) -> Result<(PriceTable, IngestStats), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read price table headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let province_idx = required_column(&header_map, Field::Province)?;
    let commodity_idx = required_column(&header_map, Field::Commodity)?;
    let city_idx = header_map.get(&normalize_header_name(Field::City.artifact_key())).copied();
    let market_idx = header_map.get(&normalize_header_name(Field::Market.artifact_key())).copied();

    let (date_indices, date_headers, dates) = resolve_date_columns(&headers)?;

    let mut rows = Vec::new();
    let mut stats = IngestStats::default();

    for (idx, result) in reader.records().enumerate() {
        // +2: header line plus 1-based line numbers.
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::new(2, format!("Price table parse error on line {line}: {e}")))?;
        stats.rows_read += 1;

        let prices = date_indices
            .iter()
            .map(|&col| {
                let cell = record.get(col).unwrap_or("");
                let parsed = parse_price(cell);
                if parsed.is_none() && !is_blank(cell) {
                    stats.invalid_cells += 1;
                }
                parsed
            })
            .collect();

        rows.push(PriceRow {
            province: cell(&record, Some(province_idx)),
            city: cell(&record, city_idx),
            market: cell(&record, market_idx),
            commodity: cell(&record, Some(commodity_idx)),
            prices,
        });
    }

    Ok((
        PriceTable {
            dates,
            date_headers,
            rows,
        },
        stats,
    ))
}

/// Write a price table in the same wide layout `read_price_table` accepts.
pub fn write_price_table_csv(path: &Path, table: &PriceTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create price table '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header: Vec<&str> = Field::ALL.iter().map(|f| f.artifact_key()).collect();
    header.extend(table.date_headers.iter().map(String::as_str));
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write price table header: {e}")))?;

    for row in &table.rows {
        let mut record = vec![
            row.province.clone(),
            row.city.clone(),
            row.market.clone(),
            row.commodity.clone(),
        ];
        record.extend(row.prices.iter().map(|p| p.map(|v| v.to_string()).unwrap_or_default()));
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write price table row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush price table: {e}")))?;
    Ok(())
}

/// Parse a `DD/MM/YY` (or `DD/MM/YYYY`) date header.
pub fn parse_date_header(header: &str) -> Result<NaiveDate, DashError> {
    const FMTS: [&str; 2] = ["%d/%m/%y", "%d/%m/%Y"];
    let trimmed = header.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(d);
        }
    }
    Err(DashError::DateParse {
        input: header.to_string(),
        reason: "expected DD/MM/YY".to_string(),
    })
}

fn resolve_date_columns(headers: &StringRecord) -> Result<(Vec<usize>, Vec<String>, Vec<NaiveDate>), AppError> {
    let mut indices = Vec::new();
    let mut names = Vec::new();
    let mut dates: Vec<NaiveDate> = Vec::new();

    for (idx, name) in headers.iter().enumerate() {
        if !name.contains('/') {
            continue;
        }
        let date = parse_date_header(name)?;
        if let Some(prev) = dates.last() {
            if date <= *prev {
                return Err(DashError::DateParse {
                    input: name.to_string(),
                    reason: format!("date columns must be chronological (follows {prev})"),
                }
                .into());
            }
        }
        indices.push(idx);
        names.push(name.trim().to_string());
        dates.push(date);
    }

    Ok((indices, names, dates))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

fn required_column(header_map: &HashMap<String, usize>, field: Field) -> Result<usize, AppError> {
    header_map
        .get(&normalize_header_name(field.artifact_key()))
        .copied()
        .ok_or_else(|| {
            AppError::new(
                2,
                format!("Missing required column: `{}`", field.artifact_key()),
            )
        })
}

fn cell(record: &StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| record.get(i))
        .map(str::to_string)
        .unwrap_or_default()
}

fn is_blank(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s == "-"
}

fn parse_price(s: &str) -> Option<f64> {
    if is_blank(s) {
        return None;
    }
    let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    let v = cleaned.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
