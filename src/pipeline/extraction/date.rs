//! Collection date extraction and ISO normalization.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// "Collected: 2024-01-15" is the most reliable indicator and is tried first.
static COLLECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Collected:\s*(\d{4}-\d{2}-\d{2}|\d{2}/\d{2}/\d{4}|\d{2}-\d{2}-\d{4})")
        .expect("valid regex")
});

/// Other labeled date lines.
static LABELED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:Date|Reported|Specimen\s+Date|Collection\s+Date|Date\s+Collected|Date\s+Reported)[\s:]*[*_]*[\s:]+(\d{4}-\d{2}-\d{2}|\d{2}/\d{2}/\d{4}|\d{2}-\d{2}-\d{4})",
    )
    .expect("valid regex")
});

/// ISO date anywhere in the text.
static ISO_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").expect("valid regex"));

/// Slash-separated date anywhere.
static SLASH_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2}/\d{2}/\d{4})\b").expect("valid regex"));

/// Dash-separated MM-DD-YYYY anywhere.
static DASH_ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{2}-\d{2}-\d{4})\b").expect("valid regex"));

const BIRTH_LABEL: &str = "DATE OF BIRTH";
const BIRTH_PROXIMITY: usize = 50;

/// Extract the collection date. `None` means no valid date was found; the
/// report stays usable and keeps its input position during ordering.
pub fn parse_collection_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = COLLECTED.captures(text) {
        if let Some(date) = normalize(caps.get(1)?.as_str()) {
            return Some(date);
        }
    }

    if let Some(caps) = LABELED.captures(text) {
        if let Some(date) = normalize(caps.get(1)?.as_str()) {
            return Some(date);
        }
    }

    // Unlabeled ISO date, skipping any that sit next to a birth-date field.
    let upper = text.to_uppercase();
    let birth_pos = upper.find(BIRTH_LABEL);
    for m in ISO_ANYWHERE.find_iter(text) {
        if let Some(birth) = birth_pos {
            if m.start().abs_diff(birth) <= BIRTH_PROXIMITY {
                continue;
            }
        }
        if let Some(date) = normalize(m.as_str()) {
            return Some(date);
        }
    }

    for pattern in [&*SLASH_ANYWHERE, &*DASH_ANYWHERE] {
        if let Some(m) = pattern.find(text) {
            if let Some(birth) = birth_pos {
                if m.start().abs_diff(birth) <= BIRTH_PROXIMITY {
                    continue;
                }
            }
            if let Some(date) = normalize(m.as_str()) {
                return Some(date);
            }
        }
    }

    None
}

/// Normalize a raw date token. Separator-delimited dates default to
/// MM/DD/YYYY; a first component above 12 flips the reading to DD/MM/YYYY.
/// Calendar-invalid dates are rejected rather than guessed at.
fn normalize(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    let sep = if raw.contains('/') { '/' } else { '-' };
    let parts: Vec<&str> = raw.split(sep).collect();
    if parts.len() != 3 {
        return None;
    }
    let first: u32 = parts[0].parse().ok()?;
    let second: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;

    let (month, day) = if first > 12 { (second, first) } else { (first, second) };
    NaiveDate::from_ymd_opt(year, month, day)
}
