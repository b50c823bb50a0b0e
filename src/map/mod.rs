//! Visualization path: wide price table -> per-province aggregates -> map regions.
//!
//! - `aggregate`: latest-date min/max per province plus the national mean series
//! - `regions`: GeoJSON boundary types and polygon ring extraction
//! - `join`: attach aggregate prices to regions by normalized province name
//! - `style`: choropleth colors as a pure function of a region's price

pub mod aggregate;
pub mod join;
pub mod regions;
pub mod style;

pub use aggregate::*;
pub use join::*;
pub use regions::*;
pub use style::*;
