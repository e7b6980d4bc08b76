//! Compiled redaction patterns.
//!
//! Label-anchored patterns replace only the value portion of a line with a
//! fixed `[REDACTED ...]` token, keeping the label and line structure intact
//! so downstream line-anchored extraction still works. Standalone patterns
//! (bare phone numbers, bare emails) replace the whole match.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::PiiCategory;

pub(super) struct RedactionRule {
    pub regex: Regex,
    pub replacement: &'static str,
    pub category: PiiCategory,
}

fn rule(pattern: &str, replacement: &'static str, category: PiiCategory) -> RedactionRule {
    RedactionRule {
        regex: Regex::new(pattern).expect("valid redaction regex"),
        replacement,
        category,
    }
}

/// Patterns applied unconditionally, in order. Ordering matters: labeled
/// patterns run before their standalone counterparts so a label line is
/// rewritten as one unit.
pub(super) static BASE_RULES: LazyLock<Vec<RedactionRule>> = LazyLock::new(|| {
    vec![
        // Patient names. Anchored to the label, stop at end of line to
        // avoid over-matching.
        rule(
            r"(?i)Patient\s*Name\s*[:\-]\s*[^\n]*",
            "Patient Name: [REDACTED NAME]",
            PiiCategory::Name,
        ),
        rule(
            r"(?im)^Patient\s*[:\-]\s*[^\n]*",
            "Patient: [REDACTED NAME]",
            PiiCategory::Name,
        ),
        rule(
            r"(?i)Pt\.?\s*Name\s*[:\-]\s*[^\n]*",
            "Pt Name: [REDACTED NAME]",
            PiiCategory::Name,
        ),
        rule(
            r"(?im)^Pt\.?\s*[:\-]\s*[^\n]*",
            "Pt: [REDACTED NAME]",
            PiiCategory::Name,
        ),
        // Standalone "Name:" lines only when followed by capitalized text,
        // so "Organism name: ..." style fields survive.
        rule(
            r"(?m)^Name\s*[:\-]\s*[A-Z][^\n]*",
            "Name: [REDACTED NAME]",
            PiiCategory::Name,
        ),
        // Dates of birth.
        rule(
            r"(?i)DOB\s*[:\-]\s*[^\n]*",
            "DOB: [REDACTED DOB]",
            PiiCategory::DateOfBirth,
        ),
        rule(
            r"(?i)Date\s+of\s+Birth\s*[:\-]\s*[^\n]*",
            "Date of Birth: [REDACTED DOB]",
            PiiCategory::DateOfBirth,
        ),
        rule(
            r"(?i)Birth\s*Date\s*[:\-]\s*[^\n]*",
            "Birth Date: [REDACTED DOB]",
            PiiCategory::DateOfBirth,
        ),
        rule(
            r"(?im)^Born\s*[:\-]\s*[^\n]*",
            "Born: [REDACTED DOB]",
            PiiCategory::DateOfBirth,
        ),
        // Record / account / identifier numbers.
        rule(
            r"(?i)MRN\s*[:\-#]?\s*[^\n]*",
            "MRN: [REDACTED ID]",
            PiiCategory::IdentifierNumber,
        ),
        rule(
            r"(?i)Medical\s+Record\s*(?:Number|No|#)?\s*[:\-]\s*[^\n]*",
            "Medical Record Number: [REDACTED ID]",
            PiiCategory::IdentifierNumber,
        ),
        rule(
            r"(?i)MR\s*#\s*[:\-]?\s*[^\n]*",
            "MR #: [REDACTED ID]",
            PiiCategory::IdentifierNumber,
        ),
        rule(
            r"(?i)Account\s*(?:Number|No|#)?\s*[:\-]\s*[^\n]*",
            "Account #: [REDACTED ID]",
            PiiCategory::IdentifierNumber,
        ),
        rule(
            r"(?i)Patient\s*ID\s*[:\-]\s*[^\n]*",
            "Patient ID: [REDACTED ID]",
            PiiCategory::IdentifierNumber,
        ),
        rule(
            r"(?i)Encounter\s*(?:Number|No|#)?\s*[:\-]\s*[^\n]*",
            "Encounter #: [REDACTED ID]",
            PiiCategory::IdentifierNumber,
        ),
        rule(
            r"(?i)Visit\s*(?:Number|No|#)?\s*[:\-]\s*[^\n]*",
            "Visit #: [REDACTED ID]",
            PiiCategory::IdentifierNumber,
        ),
        rule(
            r"(?i)SSN\s*[:\-]?\s*[^\n]*",
            "SSN: [REDACTED ID]",
            PiiCategory::IdentifierNumber,
        ),
        rule(
            r"(?i)Social\s+Security\s*(?:Number|No)?\s*[:\-]?\s*[^\n]*",
            "Social Security Number: [REDACTED ID]",
            PiiCategory::IdentifierNumber,
        ),
        // Phone numbers: labeled first, then bare formats.
        rule(
            r"(?i)(?:Phone|Tel|Telephone|Mobile|Cell|Fax)\s*[:\-]?\s*\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]?\d{4}",
            "[REDACTED PHONE]",
            PiiCategory::Phone,
        ),
        rule(
            r"\b\d{3}[.\-]\d{3}[.\-]\d{4}\b",
            "[REDACTED PHONE]",
            PiiCategory::Phone,
        ),
        rule(
            r"\(\d{3}\)\s*\d{3}[.\-]?\d{4}\b",
            "[REDACTED PHONE]",
            PiiCategory::Phone,
        ),
        // Emails: labeled lines first, then bare addresses.
        rule(
            r"(?i)(?:Email|E-mail)\s*[:\-]?\s*[^\n]*@[^\n]*",
            "Email: [REDACTED EMAIL]",
            PiiCategory::Email,
        ),
        rule(
            r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}",
            "[REDACTED EMAIL]",
            PiiCategory::Email,
        ),
        // Street addresses.
        rule(
            r"(?i)(?:Address|Street|Addr)\s*[:\-]\s*[^\n]*",
            "Address: [REDACTED ADDRESS]",
            PiiCategory::Address,
        ),
    ]
});

/// Provider-name patterns, applied only when the rule set asks for them.
pub(super) static PROVIDER_RULES: LazyLock<Vec<RedactionRule>> = LazyLock::new(|| {
    vec![
        rule(
            r"(?i)(?:Provider|Physician|Doctor|Ordering\s+Physician|Attending|Referring)\s*[:\-]\s*[^\n]*",
            "Provider: [REDACTED PROVIDER]",
            PiiCategory::Provider,
        ),
        rule(
            r"(?i)\bDr\.?\s*[:\-]\s*[^\n]*",
            "Dr.: [REDACTED PROVIDER]",
            PiiCategory::Provider,
        ),
        rule(
            r"(?i)Ordered\s+(?:by|from)\s*[:\-]?\s*[^\n]*",
            "Ordered by: [REDACTED PROVIDER]",
            PiiCategory::Provider,
        ),
    ]
});
