//! Command-line parsing for the commodity price dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the prediction/aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::context::{
    ArtifactPaths, DEFAULT_DATA_FILE, DEFAULT_ENCODER_FILE, DEFAULT_GEO_FILE, DEFAULT_MODEL_FILE,
};
use crate::domain::{AggregationMethod, Field};
use crate::map::regions::DEFAULT_NAME_KEY;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "pangan",
    version,
    about = "Commodity price dashboard: provincial price map and next-day prediction"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI (default when no subcommand is given).
    Tui(ArtifactArgs),
    /// Predict today's and tomorrow's price for one market and commodity.
    Predict(PredictArgs),
    /// Aggregate the latest prices per province and join them onto the map regions.
    Map(MapArgs),
    /// List the labels an encoder knows, in code order.
    Labels(LabelsArgs),
    /// Write a synthetic demo bundle (prices, encoders, model, boundaries).
    Sample(SampleArgs),
}

/// Artifact locations shared by every command that reads them.
#[derive(Debug, Args, Clone)]
pub struct ArtifactArgs {
    /// Model artifact (JSON).
    #[arg(long, value_name = "JSON", default_value = DEFAULT_MODEL_FILE)]
    pub model: PathBuf,

    /// Encoder artifact (JSON).
    #[arg(long, value_name = "JSON", default_value = DEFAULT_ENCODER_FILE)]
    pub encoders: PathBuf,

    /// Historical price table (wide CSV, one column per date).
    #[arg(long, value_name = "CSV", default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// Province boundaries (GeoJSON).
    #[arg(long, value_name = "GEOJSON", default_value = DEFAULT_GEO_FILE)]
    pub geo: PathBuf,

    /// GeoJSON property holding the province name.
    #[arg(long = "geo-key", default_value = DEFAULT_NAME_KEY)]
    pub geo_key: String,
}

impl ArtifactArgs {
    pub fn to_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.model.clone(),
            encoders: self.encoders.clone(),
            data: self.data.clone(),
            geo: self.geo.clone(),
            geo_key: self.geo_key.clone(),
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    /// Province label (as listed by `pangan labels --field province`).
    #[arg(short = 'p', long)]
    pub province: String,

    /// City/regency label.
    #[arg(short = 'c', long)]
    pub city: String,

    /// Market label.
    #[arg(short = 'm', long)]
    pub market: String,

    /// Commodity label.
    #[arg(short = 'k', long)]
    pub commodity: String,

    /// Prediction date (YYYY-MM-DD). Defaults to today.
    #[arg(short = 'd', long)]
    pub date: Option<String>,

    /// Render a today/tomorrow bar chart (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the bar chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Bar width (columns).
    #[arg(long, default_value_t = 50)]
    pub width: usize,
}

#[derive(Debug, Args, Clone)]
pub struct MapArgs {
    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    /// Commodity to aggregate. Defaults to the first commodity in the price table.
    #[arg(short = 'k', long)]
    pub commodity: Option<String>,

    /// Per-province reduction of the latest prices.
    #[arg(long, value_enum, default_value_t = AggregationMethod::Min)]
    pub method: AggregationMethod,

    /// Show top-N cheapest and priciest provinces.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Render the national trend and per-province bars in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export per-province aggregates to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the national mean series to CSV.
    #[arg(long = "export-national")]
    pub export_national: Option<PathBuf>,

    /// Export the regions annotated with `price` to GeoJSON.
    #[arg(long = "export-geojson")]
    pub export_geojson: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct LabelsArgs {
    /// Encoder artifact (JSON).
    #[arg(long, value_name = "JSON", default_value = DEFAULT_ENCODER_FILE)]
    pub encoders: PathBuf,

    /// Which field to list.
    #[arg(short = 'f', long, value_enum)]
    pub field: Field,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output directory.
    #[arg(short = 'o', long, default_value = ".")]
    pub out: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of daily date columns.
    #[arg(long, default_value_t = 60)]
    pub days: usize,

    /// Last date column (YYYY-MM-DD). Defaults to today.
    #[arg(long = "end-date")]
    pub end_date: Option<String>,

    /// Trees in the demo forest.
    #[arg(long, default_value_t = 25)]
    pub trees: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_args_parse_with_default_artifacts() {
        let cli = Cli::parse_from([
            "pangan", "predict", "-p", "ACEH", "-c", "BANDA ACEH", "-m", "Pasar Aceh", "-k", "Gula Pasir",
        ]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.commodity, "Gula Pasir");
        assert_eq!(args.date, None);
        assert_eq!(args.artifacts.to_paths(), ArtifactPaths::default());
    }

    #[test]
    fn map_args_accept_method_and_exports() {
        let cli = Cli::parse_from([
            "pangan",
            "map",
            "--method",
            "max",
            "--geo-key",
            "NAME_1",
            "--export-geojson",
            "out.geojson",
        ]);
        let Command::Map(args) = cli.command else {
            panic!("expected map");
        };
        assert_eq!(args.method, AggregationMethod::Max);
        assert_eq!(args.artifacts.geo_key, "NAME_1");
        assert_eq!(args.export_geojson, Some(PathBuf::from("out.geojson")));
        assert!(args.commodity.is_none());
    }

    #[test]
    fn labels_field_is_a_value_enum() {
        let cli = Cli::parse_from(["pangan", "labels", "--field", "commodity"]);
        let Command::Labels(args) = cli.command else {
            panic!("expected labels");
        };
        assert_eq!(args.field, Field::Commodity);
    }
}
