//! Specimen type detection.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::SpecimenType;

/// Markdown header or bold text: "## Urine Culture", "**Urine Culture**".
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)(?:^#{1,3}\s*|\*{2}|_{2})\s*(urine|stool)\s+culture\b").expect("valid regex")
});

/// Table cell format: "| Specimen Type | Urine |".
static TABLE_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\|\s*Specimen\s+(?:Type|Source)\s*\|\s*(urine|stool)\s*\|")
        .expect("valid regex")
});

/// Labeled line: "Specimen: urine", "Source: fecal".
static LABELED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Specimen|Sample|Source|Type)[\s:]+(urine|urinary|stool|fecal|faecal)")
        .expect("valid regex")
});

/// "urine culture" / "stool sample" phrasing.
static TYPE_THEN_NOUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(urine|stool)\s*(?:culture|specimen|sample|test)").expect("valid regex")
});

/// "culture type: urine" phrasing.
static NOUN_THEN_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:culture|specimen|sample|test)\s*(?:type)?[\s:]+(urine|stool)")
        .expect("valid regex")
});

static URINE_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:urine|urinary|bladder|catheter)\b").expect("valid regex"));

static STOOL_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:stool|fecal|faecal|feces)\b").expect("valid regex"));

fn classify(word: &str) -> SpecimenType {
    match word.to_lowercase().as_str() {
        "urine" | "urinary" => SpecimenType::Urine,
        "stool" | "fecal" | "faecal" => SpecimenType::Stool,
        _ => SpecimenType::Unknown,
    }
}

/// Detect the specimen type. Pattern attempts run from most to least
/// specific; keyword presence is the last resort before `Unknown`.
pub fn parse_specimen(text: &str) -> SpecimenType {
    for pattern in [&*HEADER, &*TABLE_CELL, &*LABELED, &*TYPE_THEN_NOUN, &*NOUN_THEN_TYPE] {
        if let Some(caps) = pattern.captures(text) {
            if let Some(m) = caps.get(1) {
                return classify(m.as_str());
            }
        }
    }

    if URINE_KEYWORD.is_match(text) {
        return SpecimenType::Urine;
    }
    if STOOL_KEYWORD.is_match(text) {
        return SpecimenType::Stool;
    }

    SpecimenType::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_header() {
        assert_eq!(parse_specimen("## Urine Culture\nOrganism: E. coli"), SpecimenType::Urine);
    }

    #[test]
    fn bold_header() {
        assert_eq!(parse_specimen("**Stool Culture** final"), SpecimenType::Stool);
    }

    #[test]
    fn table_cell() {
        assert_eq!(
            parse_specimen("| Specimen Type | Urine |\n| CFU/mL | 50,000 |"),
            SpecimenType::Urine
        );
    }

    #[test]
    fn labeled_line() {
        assert_eq!(parse_specimen("Specimen: urine, midstream"), SpecimenType::Urine);
    }

    #[test]
    fn fecal_normalizes_to_stool() {
        assert_eq!(parse_specimen("Source: fecal"), SpecimenType::Stool);
    }

    #[test]
    fn culture_phrase() {
        assert_eq!(parse_specimen("Routine urine culture performed"), SpecimenType::Urine);
    }

    #[test]
    fn keyword_fallback() {
        assert_eq!(parse_specimen("catheter collection, growth noted"), SpecimenType::Urine);
    }

    #[test]
    fn unknown_when_nothing_matches() {
        assert_eq!(parse_specimen("Organism: E. coli\nCFU/mL: 50,000"), SpecimenType::Unknown);
    }
}
