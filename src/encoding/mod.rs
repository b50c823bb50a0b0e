//! Categorical encoders: label <-> dense integer code, one table per model input.

pub mod registry;

pub use registry::*;
