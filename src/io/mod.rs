//! Input/output helpers.
//!
//! - price table CSV ingest (`table`)
//! - encoder and model artifact JSON (`artifacts`)
//! - GeoJSON boundaries read/write (`geo`)
//! - aggregate exports (`export`)

pub mod artifacts;
pub mod export;
pub mod geo;
pub mod table;

pub use artifacts::*;
pub use export::*;
pub use geo::*;
pub use table::*;
