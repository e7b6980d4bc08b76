//! Field extraction: redacted report text -> typed [`Observation`].
//!
//! Primary strategy is anchored pattern matching per field, each with a
//! documented fallback scan. Extraction fails closed only when BOTH
//! load-bearing fields (organism, colony count) are unparseable; the caller
//! may then invoke the external fallback extractor through the
//! [`FallbackExtract`] seam.

pub mod colony;
pub mod date;
pub mod extractor;
pub mod fallback;
pub mod organism;
pub mod resistance;
pub mod specimen;
pub mod susceptibility;

pub use extractor::{extract, extract_with_fallback, Extracted};
pub use fallback::{FallbackExtract, FallbackFields, LlmFallbackExtractor};

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("could not parse organism or colony count from report text")]
    FieldsUnparseable,

    #[error("primary extraction failed and no fallback extractor is wired")]
    FallbackUnavailable,

    #[error("fallback extraction failed: {0}")]
    FallbackFailed(String),
}

/// A non-fatal normalization event: a non-load-bearing field was defaulted.
/// Collected and surfaced to the caller; never aborts the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationWarning {
    pub field: &'static str,
    pub message: String,
}

impl NormalizationWarning {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
