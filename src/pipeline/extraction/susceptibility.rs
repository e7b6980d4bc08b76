//! Antimicrobial susceptibility table parsing.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{SirClass, Susceptibility};

/// Markdown table row: | Antibiotic | MIC | S/I/R | breakpoints | notes |
static TABLE_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\|\s*([^|]+?)\s*\|\s*([^|]+?)\s*\|\s*(Sensitive|Intermediate|Resistant|S|I|R)\s*\|",
    )
    .expect("valid regex")
});

/// Inline format: "Antibiotic: Nitrofurantoin, MIC: 16 ug/mL, Interpretation: S".
static INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:Antibiotic|Antimicrobial|Agent)[\s:]+([^\n]+?)[\s,]+(?:MIC)?[\s:]*([\d<>.=\s]+(?:ug/mL|mcg/mL|mg/L)?)[\s,]+(?:Interpretation)?[\s:]*(Sensitive|Intermediate|Resistant|S|I|R)\b",
    )
    .expect("valid regex")
});

/// Plain line format: "Ciprofloxacin    <=0.25 ug/ml    S".
static PLAIN_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^\s*([A-Za-z][A-Za-z\s\-]+?)\s+([<>=\d.]+\s*(?:ug/ml|mcg/ml|mg/l)?)\s+(Sensitive|Intermediate|Resistant|S|I|R)\b",
    )
    .expect("valid regex")
});

/// Table header words and other non-antibiotic row labels.
const HEADER_WORDS: &[&str] = &["antibiotic", "agent", "drug", "name"];

fn classify(raw: &str) -> Option<SirClass> {
    match raw.to_uppercase().as_str() {
        "S" | "SENSITIVE" => Some(SirClass::Sensitive),
        "I" | "INTERMEDIATE" => Some(SirClass::Intermediate),
        "R" | "RESISTANT" => Some(SirClass::Resistant),
        _ => None,
    }
}

fn accept(antibiotic: &str, seen: &mut HashSet<String>) -> bool {
    let lower = antibiotic.to_lowercase();
    if antibiotic.len() < 3 || HEADER_WORDS.contains(&lower.as_str()) {
        return false;
    }
    seen.insert(lower)
}

/// Parse susceptibility rows from report text. Formats are tried in order
/// and results deduplicated by antibiotic name, first mention winning.
pub fn parse_susceptibility(text: &str) -> Vec<Susceptibility> {
    let mut profile = Vec::new();
    let mut seen = HashSet::new();

    for pattern in [&*TABLE_ROW, &*INLINE, &*PLAIN_LINE] {
        for caps in pattern.captures_iter(text) {
            let antibiotic = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            let mic = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            let Some(interpretation) = caps.get(3).and_then(|m| classify(m.as_str().trim())) else {
                continue;
            };
            if !accept(antibiotic, &mut seen) {
                continue;
            }
            profile.push(Susceptibility {
                antibiotic: antibiotic.to_string(),
                mic: mic.to_string(),
                interpretation,
            });
        }
    }

    profile
}
