//! Data sources.
//!
//! - `artifacts`: fetch-once download of model/encoder artifacts
//! - `sample`: deterministic synthetic demo bundle for offline use

pub mod artifacts;
pub mod sample;

pub use artifacts::{ArtifactFetcher, ArtifactUrls};
pub use sample::{DemoBundle, DemoConfig, generate_demo, write_demo_bundle};
