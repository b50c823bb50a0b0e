//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initializes logging
//! - loads artifacts through the shared context
//! - runs the prediction/map pipelines
//! - prints reports/plots and writes optional exports

use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::cli::{ArtifactArgs, Command, LabelsArgs, MapArgs, PredictArgs, SampleArgs};
use crate::domain::Selection;
use crate::error::AppError;
use crate::logging::LogTarget;

pub mod context;
pub mod pipeline;

use context::AppContext;

/// Entry point for the `pangan` binary.
pub fn run() -> Result<(), AppError> {
    // We want `pangan` and `pangan --data x.csv` to behave like `pangan tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let target = match cli.command {
        Command::Tui(_) => LogTarget::tui_file(),
        _ => LogTarget::Stderr,
    };
    crate::logging::init_logging(target)?;

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Predict(args) => handle_predict(args),
        Command::Map(args) => handle_map(args),
        Command::Labels(args) => handle_labels(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_tui(args: ArtifactArgs) -> Result<(), AppError> {
    let ctx = AppContext::from_env(args.to_paths());
    crate::tui::run(ctx)
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let ctx = AppContext::from_env(args.artifacts.to_paths());
    let date = resolve_date(args.date.as_deref())?;
    let selection = Selection {
        province: args.province.clone(),
        city: args.city.clone(),
        market: args.market.clone(),
        commodity: args.commodity.clone(),
        date,
    };

    let registry = ctx.registry()?;
    let predictor = ctx.predictor()?;
    let run = pipeline::predict_day_over_day(registry, predictor, &selection)?;

    println!("{}", crate::report::format_prediction(&run));

    if args.plot && !args.no_plot {
        let bars: Vec<(String, f64)> = run
            .trend
            .series
            .iter()
            .map(|(label, price)| (label.as_str().to_string(), *price))
            .collect();
        println!("{}", crate::plot::render_bar_chart(&bars, args.width));
    }

    Ok(())
}

fn handle_map(args: MapArgs) -> Result<(), AppError> {
    let ctx = AppContext::from_env(args.artifacts.to_paths());
    let table = ctx.table()?;
    let regions = ctx.regions()?;

    let commodity = match &args.commodity {
        Some(c) => c.clone(),
        None => table
            .commodities()
            .into_iter()
            .next()
            .ok_or_else(|| AppError::new(2, "Price table has no rows."))?,
    };

    let run = pipeline::run_map(table, regions, &commodity, args.method, &args.artifacts.geo_key);

    println!("{}", crate::report::format_map_summary(&run));
    if !run.aggregates.is_empty() {
        let rankings = crate::report::rank_provinces(&run.aggregates, args.top);
        println!("{}", crate::report::format_rankings(&rankings));
    }

    if args.plot && !args.no_plot {
        println!("National mean price:");
        println!(
            "{}",
            crate::plot::render_national_plot(&run.national, args.width, args.height)
        );
        let bars: Vec<(String, f64)> = run
            .aggregates
            .iter()
            .map(|a| (a.province.clone(), a.price))
            .collect();
        if !bars.is_empty() {
            println!("{}", crate::plot::render_bar_chart(&bars, args.width.saturating_sub(40).max(10)));
        }
    }

    // Optional exports.
    if let Some(path) = &args.export {
        let date = table.latest_header().unwrap_or("");
        crate::io::export::write_aggregates_csv(path, &run.aggregates, &commodity, args.method, date)?;
    }
    if let Some(path) = &args.export_national {
        crate::io::export::write_national_csv(path, &run.national)?;
    }
    if let Some(path) = &args.export_geojson {
        let collection = crate::map::to_collection(&run.regions);
        crate::io::geo::write_geojson(path, &collection)?;
    }

    Ok(())
}

fn handle_labels(args: LabelsArgs) -> Result<(), AppError> {
    let registry = crate::io::artifacts::read_encoders_json(&args.encoders)?;
    print!("{}", crate::report::format_labels(args.field, registry.labels(args.field)));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::data::DemoConfig {
        seed: args.seed,
        days: args.days,
        end_date: resolve_date(args.end_date.as_deref())?,
        trees: args.trees,
    };
    let bundle = crate::data::generate_demo(&config)?;
    let paths = crate::data::write_demo_bundle(&args.out, &bundle)?;

    println!("Wrote demo bundle:");
    println!("  prices   : {}", paths.data.display());
    println!("  encoders : {}", paths.encoders.display());
    println!("  model    : {}", paths.model.display());
    println!("  regions  : {}", paths.geo.display());
    Ok(())
}

/// Parse an optional user date, defaulting to today's local date.
fn resolve_date(input: Option<&str>) -> Result<NaiveDate, AppError> {
    match input {
        Some(s) => Ok(crate::predict::parse_query_date(s)?),
        None => Ok(Local::now().date_naive()),
    }
}

/// Rewrite argv so `pangan` defaults to `pangan tui`.
///
/// Rules:
/// - `pangan`                      -> `pangan tui`
/// - `pangan --data x.csv ...`     -> `pangan tui --data x.csv ...`
/// - `pangan --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "predict" | "map" | "labels" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
