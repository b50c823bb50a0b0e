//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipelines stay free of presentation concerns
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::{MapRun, PredictionRun};
use crate::domain::{Direction, Field, TrendComparison};
use crate::report::ProvinceRankings;

/// `Rp 15,000.00`: two decimals, comma thousands separators.
pub fn format_rupiah(value: f64) -> String {
    if !value.is_finite() {
        return "Rp -".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}Rp {}.{frac}", group_thousands(int))
}

/// One-line description of the predicted movement.
pub fn direction_text(trend: &TrendComparison) -> String {
    let verb = match trend.direction {
        Direction::Up => "go up",
        Direction::Down => "go down",
        Direction::Stable => "stay stable",
    };
    format!("{} Price is predicted to {verb} tomorrow.", trend.direction.arrow())
}

/// Format a day-over-day prediction.
pub fn format_prediction(run: &PredictionRun) -> String {
    let mut out = String::new();

    out.push_str("=== pangan - next-day price prediction ===\n");
    for field in Field::ALL {
        out.push_str(&format!(
            "{:<10} {}\n",
            format!("{}:", field.display_name()),
            run.selection.label(field)
        ));
    }
    out.push('\n');

    out.push_str(&format!(
        "Today    ({}): {}\n",
        run.today.date,
        format_rupiah(run.today.price)
    ));
    out.push_str(&format!(
        "Tomorrow ({}): {}\n",
        run.tomorrow.date,
        format_rupiah(run.tomorrow.price)
    ));

    let change = run.tomorrow.price - run.today.price;
    let pct = if run.today.price != 0.0 {
        format!(" ({:+.2}%)", change / run.today.price * 100.0)
    } else {
        String::new()
    };
    out.push_str(&format!("Change: {}{pct}\n", signed_rupiah(change)));
    out.push_str(&direction_text(&run.trend));
    out.push('\n');

    out
}

/// Format the map summary header plus the per-province table.
pub fn format_map_summary(run: &MapRun) -> String {
    let mut out = String::new();

    out.push_str("=== pangan - provincial prices ===\n");
    out.push_str(&format!("Commodity: {}\n", run.commodity));
    out.push_str(&format!("Method: {}\n", run.method.display_name()));
    match run.latest_date {
        Some(date) => out.push_str(&format!("Latest date: {date}\n")),
        None => out.push_str("Latest date: -\n"),
    }
    out.push_str(&format!(
        "Provinces with data: {} | map regions: {} ({} without data)\n",
        run.aggregates.len(),
        run.regions.len(),
        run.regions.len() - run.covered(),
    ));
    out.push('\n');

    if run.aggregates.is_empty() {
        out.push_str("No prices available for this commodity.\n");
        return out;
    }

    out.push_str(&format_aggregate_table(run));
    out
}

/// Format the cheapest/priciest tables.
pub fn format_rankings(rankings: &ProvinceRankings) -> String {
    let mut out = String::new();

    out.push_str("Cheapest provinces:\n");
    for (idx, a) in rankings.cheapest.iter().enumerate() {
        out.push_str(&format!("{:>3}. {:<28} {:>18}\n", idx + 1, truncate(&a.province, 28), format_rupiah(a.price)));
    }
    out.push('\n');

    out.push_str("Priciest provinces:\n");
    for (idx, a) in rankings.priciest.iter().enumerate() {
        out.push_str(&format!("{:>3}. {:<28} {:>18}\n", idx + 1, truncate(&a.province, 28), format_rupiah(a.price)));
    }

    out
}

/// One label per line, prefixed with its code.
pub fn format_labels(field: Field, labels: &[String]) -> String {
    let mut out = format!("{} ({} labels):\n", field.artifact_key(), labels.len());
    for (code, label) in labels.iter().enumerate() {
        out.push_str(&format!("{code:>5}  {label}\n"));
    }
    out
}

fn format_aggregate_table(run: &MapRun) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<28} {:>18}\n", "province", "price").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<28} {:-<18}\n", "", "").trim_end());
    out.push('\n');

    for a in &run.aggregates {
        out.push_str(
            format!("{:<28} {:>18}\n", truncate(&a.province, 28), format_rupiah(a.price)).trim_end(),
        );
        out.push('\n');
    }
    out
}

fn signed_rupiah(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", format_rupiah(value))
    } else {
        format_rupiah(value)
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::{AggregationMethod, NationalSeries, PricePrediction, ProvinceAggregate, Selection};

    #[test]
    fn rupiah_grouping() {
        assert_eq!(format_rupiah(15_000.0), "Rp 15,000.00");
        assert_eq!(format_rupiah(999.5), "Rp 999.50");
        assert_eq!(format_rupiah(1_234_567.891), "Rp 1,234,567.89");
        assert_eq!(format_rupiah(0.0), "Rp 0.00");
        assert_eq!(format_rupiah(-2_500.0), "-Rp 2,500.00");
        assert_eq!(format_rupiah(f64::NAN), "Rp -");
    }

    #[test]
    fn prediction_report_mentions_both_days_and_direction() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
        let run = PredictionRun {
            selection: Selection {
                province: "ACEH".to_string(),
                city: "BANDA ACEH".to_string(),
                market: "Pasar Aceh".to_string(),
                commodity: "Gula Pasir".to_string(),
                date: today,
            },
            today: PricePrediction { date: today, price: 15_000.0 },
            tomorrow: PricePrediction { date: tomorrow, price: 15_000.0 },
            trend: crate::predict::compare(15_000.0, 15_000.0),
        };

        let txt = format_prediction(&run);
        assert!(txt.contains("Today    (2024-03-15): Rp 15,000.00"), "{txt}");
        assert!(txt.contains("Tomorrow (2024-03-16): Rp 15,000.00"), "{txt}");
        assert!(txt.contains("Change: Rp 0.00 (+0.00%)"), "{txt}");
        assert!(txt.contains("stay stable"), "{txt}");
        assert!(txt.contains("Market:    Pasar Aceh"), "{txt}");
    }

    #[test]
    fn map_summary_without_prices() {
        let run = MapRun {
            commodity: "beras".to_string(),
            method: AggregationMethod::Max,
            latest_date: None,
            aggregates: Vec::new(),
            national: NationalSeries::default(),
            regions: Vec::new(),
        };
        let txt = format_map_summary(&run);
        assert!(txt.contains("Highest price"));
        assert!(txt.contains("No prices available"));
    }

    #[test]
    fn map_summary_table() {
        let run = MapRun {
            commodity: "beras".to_string(),
            method: AggregationMethod::Min,
            latest_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            aggregates: vec![ProvinceAggregate {
                province: "ACEH".to_string(),
                price: 12_000.0,
            }],
            national: NationalSeries::default(),
            regions: Vec::new(),
        };
        let txt = format_map_summary(&run);
        assert!(txt.contains("Latest date: 2024-01-02"));
        assert!(txt.lines().any(|l| l.starts_with("ACEH") && l.ends_with("Rp 12,000.00")), "{txt}");
    }

    #[test]
    fn labels_listing_shows_codes() {
        let txt = format_labels(Field::Province, &["ACEH".to_string(), "BALI".to_string()]);
        assert_eq!(txt, "Provinsi (2 labels):\n    0  ACEH\n    1  BALI\n");
    }
}
