//! Banned diagnostic phrase scanning.

use crate::config::Rules;

/// One banned-phrase match in scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseHit {
    pub phrase: &'static str,
    pub offset: usize,
}

/// Case-insensitive substring scan against the banned-phrase list.
///
/// Returns every hit, not just the first, so logs can show the full extent
/// of a rejected response. An empty result means the text is compliant.
pub fn scan_banned_phrases(text: &str, rules: &Rules) -> Vec<PhraseHit> {
    let lower = text.to_lowercase();
    let mut hits = Vec::new();

    for phrase in rules.banned_phrases.iter().copied() {
        if let Some(offset) = lower.find(phrase) {
            hits.push(PhraseHit { phrase, offset });
        }
    }

    hits.sort_by_key(|hit| hit.offset);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Vec<PhraseHit> {
        scan_banned_phrases(text, &Rules::standard())
    }

    #[test]
    fn compliant_text_has_no_hits() {
        let text = "The pattern may suggest an improving response. \
                    Please discuss these findings with your doctor.";
        assert!(scan(text).is_empty());
    }

    #[test]
    fn direct_diagnosis_is_caught() {
        let hits = scan("Based on these results, you have a urinary tract infection.");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].phrase, "you have");
    }

    #[test]
    fn scan_is_case_insensitive() {
        assert!(!scan("You Have an infection").is_empty());
        assert!(!scan("THE DIAGNOSIS IS clear").is_empty());
    }

    #[test]
    fn substring_matches_inside_sentences() {
        assert!(!scan("we would normally prescribe antibiotics here").is_empty());
    }

    #[test]
    fn multiple_hits_are_ordered_by_offset() {
        let hits = scan("The diagnosis is certain and you should take amoxicillin.");
        assert_eq!(hits.len(), 2);
        assert!(hits[0].offset < hits[1].offset);
    }
}
