//! Resistance marker detection with negation awareness.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Closed vocabulary of high-risk markers, exact word boundaries.
static MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(ESBL|CRE|MRSA|VRE|CRKP)\b").expect("valid regex"));

/// Phrases that negate a marker mention within the surrounding window.
const NEGATION_PHRASES: &[&str] = &[
    "no ",
    "not ",
    "none",
    "without",
    "negative for",
    "undetected",
    "ruled out",
];

/// How far around a marker mention to look for negating language.
const NEGATION_WINDOW: usize = 60;

/// Extract resistance markers present in the text, uppercase and
/// deduplicated. A mention inside a negation window is not a detection.
pub fn parse_resistance_markers(text: &str) -> BTreeSet<String> {
    let mut markers = BTreeSet::new();

    for m in MARKERS.find_iter(text) {
        let start = m.start().saturating_sub(NEGATION_WINDOW);
        let end = (m.end() + NEGATION_WINDOW).min(text.len());
        // Widen to char boundaries so slicing never panics on multibyte text.
        let start = floor_char_boundary(text, start);
        let end = ceil_char_boundary(text, end);

        let context = text[start..end].to_lowercase();
        if NEGATION_PHRASES.iter().any(|neg| context.contains(neg)) {
            continue;
        }
        markers.insert(m.as_str().to_uppercase());
    }

    markers
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
