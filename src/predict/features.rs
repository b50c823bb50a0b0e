//! Feature record construction.
//!
//! Categorical fields go through the encoder registry; calendar fields come
//! straight from the date (ISO weekday, Monday = 0).

use chrono::{Datelike, NaiveDate};

use crate::domain::{FeatureRecord, Field, Selection};
use crate::encoding::EncoderRegistry;
use crate::error::DashError;

pub struct FeatureBuilder<'a> {
    registry: &'a EncoderRegistry,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(registry: &'a EncoderRegistry) -> Self {
        Self { registry }
    }

    /// Encode `selection` for the given `date`.
    ///
    /// The selection's own date is ignored so the same labels can be encoded
    /// for both "today" and "tomorrow".
    pub fn build(&self, selection: &Selection, date: NaiveDate) -> Result<FeatureRecord, DashError> {
        Ok(FeatureRecord {
            province: self.registry.encode(Field::Province, &selection.province)?,
            city: self.registry.encode(Field::City, &selection.city)?,
            market: self.registry.encode(Field::Market, &selection.market)?,
            commodity: self.registry.encode(Field::Commodity, &selection.commodity)?,
            day: date.day(),
            month: date.month(),
            day_of_week: date.weekday().num_days_from_monday(),
        })
    }
}

/// Parse a user-entered query date: `YYYY-MM-DD`, or `DD/MM/YYYY` as in the dataset.
pub fn parse_query_date(input: &str) -> Result<NaiveDate, DashError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|e| DashError::DateParse {
            input: input.to_string(),
            reason: format!("expected YYYY-MM-DD ({e})"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::registry::tests::sample_registry;

    fn selection(date: NaiveDate) -> Selection {
        Selection {
            province: "BALI".to_string(),
            city: "DENPASAR".to_string(),
            market: "Pasar Badung".to_string(),
            commodity: "Cabai Merah".to_string(),
            date,
        }
    }

    #[test]
    fn friday_in_march() {
        let registry = sample_registry();
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let record = FeatureBuilder::new(&registry).build(&selection(date), date).unwrap();
        assert_eq!(record.day, 15);
        assert_eq!(record.month, 3);
        assert_eq!(record.day_of_week, 4);
        assert_eq!(
            (record.province, record.city, record.market, record.commodity),
            (1, 1, 1, 1)
        );
    }

    #[test]
    fn build_is_deterministic() {
        let registry = sample_registry();
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let builder = FeatureBuilder::new(&registry);
        let a = builder.build(&selection(date), date).unwrap();
        let b = builder.build(&selection(date), date).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_vector().map(f64::to_bits), b.to_vector().map(f64::to_bits));
    }

    #[test]
    fn calendar_fields_stay_in_range_for_a_full_year() {
        let registry = sample_registry();
        let builder = FeatureBuilder::new(&registry);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(); // Monday
        for offset in 0..366 {
            let date = start + chrono::Duration::days(offset);
            let r = builder.build(&selection(start), date).unwrap();
            assert!(r.day_of_week <= 6);
            assert_eq!(r.day_of_week as i64, offset % 7);
            assert!((1..=12).contains(&r.month));
            assert_eq!(r.day, date.day());
        }
    }

    #[test]
    fn unknown_label_propagates() {
        let registry = sample_registry();
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let mut sel = selection(date);
        sel.market = "Pasar Gelap".to_string();
        let err = FeatureBuilder::new(&registry).build(&sel, date).unwrap_err();
        assert!(matches!(err, DashError::UnknownLabel { field: Field::Market, .. }));
    }

    #[test]
    fn query_dates_accept_iso_and_dataset_style() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_query_date("2024-03-15").unwrap(), expected);
        assert_eq!(parse_query_date(" 15/03/2024 ").unwrap(), expected);
        assert!(matches!(parse_query_date("15 March"), Err(DashError::DateParse { .. })));
    }
}
