//! `pangan-dash` library crate.
//!
//! The binary (`pangan`) is a thin wrapper around this library so that:
//!
//! - the prediction and map pipelines are testable without spawning processes
//! - the CLI and the TUI share one implementation of every computation
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod encoding;
pub mod error;
pub mod io;
pub mod logging;
pub mod map;
pub mod models;
pub mod plot;
pub mod predict;
pub mod report;
pub mod tui;
