//! PII/PHI redaction layer.
//!
//! Every report passes through [`redact`] before any other component may see
//! it. Redaction is total (never fails) and idempotent: running the scrubber
//! over already-scrubbed text is a no-op. Matched values are never logged;
//! only the detected category set leaves this module.

mod patterns;
mod scrub;

pub use scrub::{redact, RedactionOutcome};
