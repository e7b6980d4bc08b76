//! Culture-report trend interpretation pipeline.
//!
//! Takes 1-3 free-text microbial culture reports, strips identifying
//! information, extracts typed fields, computes a temporal trend and a
//! deterministic hypothesis, and assembles persona-specific outputs that
//! never contain diagnostic language. The pipeline is a pure, synchronous,
//! single pass per request: redact, extract, analyze, hypothesize, render.
//!
//! The only optional external collaborators are a local model server for
//! narrative generation and fallback field extraction; both sit behind
//! traits and the pipeline is fully functional without them.

pub mod config;
pub mod models;
pub mod pipeline;

pub use config::Rules;
pub use models::{
    ColonyTrend, Hypothesis, Observation, Persona, RawText, RedactedText, RiskFlag, SirClass,
    SpecimenType, Susceptibility, Trend,
};
pub use pipeline::{AnalysisReport, PipelineError, Processor};
