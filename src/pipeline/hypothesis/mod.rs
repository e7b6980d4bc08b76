//! Deterministic hypothesis scoring and risk flag assignment.

mod engine;

pub use engine::hypothesize;
