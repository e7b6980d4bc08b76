//! Temporal trend analysis over ordered observations.

mod analyzer;

pub use analyzer::analyze;
