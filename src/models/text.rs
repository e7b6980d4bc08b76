//! Type-state pair separating un-redacted from redacted report text.
//!
//! `RawText` and `RedactedText` are disjoint types: the field extractor and
//! both external-capability seams accept only `RedactedText`, so forwarding
//! un-scrubbed text is a compile error rather than a tested behavior. The
//! only conversions are `redaction::redact` and the grep-able
//! [`RedactedText::assume_redacted`] escape hatch.

use serde::Serialize;

/// Report text as received from the upstream document parser.
///
/// Deliberately does NOT implement `Serialize` or `Display`: raw text must
/// not leak into payloads or logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText(String);

impl RawText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Accessor for the redactor. Nothing downstream of the redactor holds
    /// a `RawText`, so this never crosses the privacy boundary.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RawText {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for RawText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Report text that has passed the redactor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RedactedText(String);

impl RedactedText {
    /// Crate-internal constructor used by the redactor.
    pub(crate) fn from_scrubbed(text: String) -> Self {
        Self(text)
    }

    /// Explicit, auditable conversion for text that is already known to be
    /// free of identifying information (fixture corpora, pre-scrubbed
    /// exports). Callers take responsibility for that claim; grep for this
    /// name when auditing the privacy boundary.
    pub fn assume_redacted(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
