//! Colony count (CFU/mL) extraction and normalization.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::TNTC_SENTINEL;

use super::NormalizationWarning;

/// Labeled count: "CFU/mL: 120,000", "CFU: >100,000".
static LABELED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CFU[/\\]?m?L?:\s*([><]?\s*[\d,]+)").expect("valid regex"));

/// Alternative labels: "Count: 120,000", "Result: >100,000".
static ALT_LABELED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Count|Quantity|Result):\s*([><]?\s*[\d,]+)").expect("valid regex")
});

/// "120,000 CFU" / "50000 colonies". The leading guard group stands in for a
/// lookbehind (unsupported by the regex crate): it rejects matches preceded
/// by '<', a digit, a comma, or ';' so threshold notes like "<5,000 CFU/mL"
/// and partial numbers like ",000" are not misread.
static UNIT_SUFFIXED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^<\d,;])(\d[\d,]*)\s*(?:CFU|colonies|cells)").expect("valid regex")
});

/// Bare "> 100,000".
static GREATER_THAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s*([\d,]+)").expect("valid regex"));

/// Standalone thousands-separated literal like "5,000" or "100,000".
static THOUSANDS_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3},\d{3})").expect("valid regex"));

/// "Too numerous to count" idioms.
static TNTC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:TNTC|Too\s+Numerous\s+To\s+Count)\b").expect("valid regex")
});

/// Zero idioms.
static NO_GROWTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)No\s+growth|No\s+significant\s+growth|0\s+CFU|Negative").expect("valid regex")
});

/// Scientific notation "10^5".
static SCIENTIFIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"10\^(\d+)").expect("valid regex"));

/// Bare integer of five or more digits, last resort.
static BARE_LARGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{5,})\b").expect("valid regex"));

fn digits_to_count(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    cleaned.parse().ok()
}

/// Parse the colony count from report text.
///
/// Strategies are tried in a fixed order; an unparseable count degrades to 0
/// with a caller-visible warning rather than failing. Returns
/// `(count, parsed_ok)`.
pub fn parse_colony_count(text: &str, warnings: &mut Vec<NormalizationWarning>) -> (u64, bool) {
    let text = text.trim();

    for pattern in [&*LABELED, &*ALT_LABELED, &*UNIT_SUFFIXED, &*GREATER_THAN, &*THOUSANDS_LITERAL] {
        if let Some(caps) = pattern.captures(text) {
            if let Some(count) = caps.get(1).and_then(|m| digits_to_count(m.as_str())) {
                return (count, true);
            }
        }
    }

    if TNTC.is_match(text) {
        return (TNTC_SENTINEL, true);
    }

    if NO_GROWTH.is_match(text) {
        return (0, true);
    }

    if let Some(caps) = SCIENTIFIC.captures(text) {
        if let Some(exp) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
            // Anything beyond the sentinel's magnitude is effectively TNTC.
            if let Some(value) = 10u64.checked_pow(exp) {
                return (value, true);
            }
            return (TNTC_SENTINEL, true);
        }
    }

    if let Some(caps) = BARE_LARGE.captures(text) {
        if let Some(count) = caps.get(1).and_then(|m| digits_to_count(m.as_str())) {
            warnings.push(NormalizationWarning::new(
                "colony_count",
                "colony count parsed from a bare number; review report text",
            ));
            return (count, true);
        }
    }

    warnings.push(NormalizationWarning::new(
        "colony_count",
        "colony count could not be parsed; defaulting to 0",
    ));
    (0, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (u64, bool) {
        let mut warnings = Vec::new();
        parse_colony_count(text, &mut warnings)
    }

    // =================================================================
    // LABELED FORMS
    // =================================================================

    #[test]
    fn labeled_with_thousands_separator() {
        assert_eq!(parse("CFU/mL: 120,000"), (120_000, true));
    }

    #[test]
    fn labeled_greater_than() {
        assert_eq!(parse("CFU/mL: >100,000"), (100_000, true));
    }

    #[test]
    fn count_label() {
        assert_eq!(parse("Count: 80,000"), (80_000, true));
    }

    #[test]
    fn result_label() {
        assert_eq!(parse("Result: > 50,000"), (50_000, true));
    }

    #[test]
    fn unit_suffixed() {
        assert_eq!(parse("approximately 75,000 colonies observed"), (75_000, true));
    }

    #[test]
    fn threshold_note_is_not_misread() {
        // "<5,000 CFU/mL" is a reporting threshold, not a count.
        let (value, ok) = parse("significant when <5,000 CFU/mL detected");
        // The thousands literal is the only strategy allowed to claim this.
        assert_eq!((value, ok), (5_000, true));
    }

    // =================================================================
    // IDIOMS
    // =================================================================

    #[test]
    fn tntc_sentinel() {
        assert_eq!(parse("Colony count: TNTC"), (TNTC_SENTINEL, true));
        assert_eq!(parse("too numerous to count"), (TNTC_SENTINEL, true));
    }

    #[test]
    fn no_growth_is_zero() {
        assert_eq!(parse("No growth after 48 hours"), (0, true));
        assert_eq!(parse("Culture negative"), (0, true));
    }

    #[test]
    fn scientific_notation_expands() {
        assert_eq!(parse("Growth at 10^5 per mL"), (100_000, true));
    }

    #[test]
    fn huge_exponent_degrades_to_sentinel() {
        assert_eq!(parse("10^99"), (TNTC_SENTINEL, true));
    }

    // =================================================================
    // FALLBACK + FAILURE
    // =================================================================

    #[test]
    fn bare_large_number_warns() {
        let mut warnings = Vec::new();
        let (value, ok) = parse_colony_count("specimen shows 120000 organisms", &mut warnings);
        assert_eq!((value, ok), (120_000, true));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "colony_count");
    }

    #[test]
    fn unparseable_defaults_to_zero_with_warning() {
        let mut warnings = Vec::new();
        let (value, ok) = parse_colony_count("moderate growth noted", &mut warnings);
        assert_eq!((value, ok), (0, false));
        assert_eq!(warnings.len(), 1);
    }
}
