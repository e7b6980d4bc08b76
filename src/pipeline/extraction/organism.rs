//! Organism name extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::Rules;

/// Anchored organism patterns, tried in order. The value capture runs to end
/// of line; dots inside names like "E. coli" are preserved.
static ANCHORED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)Organism:\s*([^.\n][^\n]*?)\s*(?:\n|$)",
        r"(?i)Organism\s+identified:\s*([^.\n][^\n]*?)\s*(?:\n|$)",
        r"(?i)Isolated:\s*([^.\n][^\n]*?)\s*(?:\n|$)",
        r"(?i)Identification:\s*([^.\n][^\n]*?)\s*(?:\n|$)",
        r"(?i)Culture\s+results?:\s*([^.\n][^\n]*?)\s*(?:\n|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid organism regex"))
    .collect()
});

/// Sentence-ending punctuation inside a captured organism value. A period is
/// only a terminator when followed by whitespace and a capital (so "E. coli"
/// survives).
static VALUE_TERMINATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;!?]|\.\s+[A-Z]").expect("valid terminator regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Extract and normalize the organism name.
///
/// Anchored label patterns first; when every anchor misses, fall back to
/// scanning the whole text for any known alias, longest alias first.
pub fn parse_organism(text: &str, rules: &Rules) -> Option<String> {
    for pattern in ANCHORED.iter() {
        if let Some(caps) = pattern.captures(text) {
            let raw = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            if raw.is_empty() {
                continue;
            }
            let collapsed = WHITESPACE_RUN.replace_all(raw, " ").into_owned();
            let value = match VALUE_TERMINATOR.find(&collapsed) {
                Some(m) => collapsed[..m.start()].trim().to_string(),
                None => collapsed,
            };
            if !value.is_empty() {
                return Some(rules.normalize_organism(&value));
            }
        }
    }

    // Fallback: known alias anywhere in the text.
    let lower = text.to_lowercase();
    for alias in rules.alias_keys_longest_first() {
        if lower.contains(alias) {
            return Some(rules.normalize_organism(alias));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<String> {
        parse_organism(text, &Rules::standard())
    }

    // =================================================================
    // ANCHORED PATTERNS
    // =================================================================

    #[test]
    fn primary_label() {
        assert_eq!(parse("Organism: E. coli\nCFU/mL: 100,000").as_deref(), Some("Escherichia coli"));
    }

    #[test]
    fn uppercase_label() {
        assert_eq!(
            parse("ORGANISM: KLEBSIELLA PNEUMONIAE\n").as_deref(),
            Some("Klebsiella pneumoniae")
        );
    }

    #[test]
    fn isolated_label() {
        assert_eq!(
            parse("Isolated: Pseudomonas aeruginosa\n").as_deref(),
            Some("Pseudomonas aeruginosa")
        );
    }

    #[test]
    fn identification_label() {
        assert_eq!(
            parse("Identification: Proteus mirabilis").as_deref(),
            Some("Proteus mirabilis")
        );
    }

    #[test]
    fn culture_result_label() {
        assert_eq!(
            // Contamination phrasing stays lowercase through normalization.
            parse("Culture result: mixed flora noted").as_deref(),
            Some("mixed flora noted")
        );
    }

    #[test]
    fn dots_in_names_survive() {
        // "E. coli" must not be truncated at the first period.
        assert_eq!(parse("Organism: E. coli").as_deref(), Some("Escherichia coli"));
    }

    #[test]
    fn trailing_sentence_is_trimmed() {
        assert_eq!(
            parse("Organism: Enterococcus faecalis; heavy growth").as_deref(),
            Some("Enterococcus faecalis")
        );
    }

    // =================================================================
    // ALIAS SCAN FALLBACK
    // =================================================================

    #[test]
    fn alias_scan_when_no_label() {
        assert_eq!(
            parse("Heavy growth of e.coli observed in specimen").as_deref(),
            Some("Escherichia coli")
        );
    }

    #[test]
    fn alias_scan_prefers_longest_match() {
        assert_eq!(
            parse("growth of klebsiella pneumoniae noted").as_deref(),
            Some("Klebsiella pneumoniae")
        );
    }

    #[test]
    fn no_organism_anywhere() {
        assert_eq!(parse("Specimen: urine\nNo further detail"), None);
    }
}
