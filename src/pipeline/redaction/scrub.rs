use std::collections::BTreeSet;

use crate::config::Rules;
use crate::models::{PiiCategory, RawText, RedactedText};

use super::patterns::{RedactionRule, BASE_RULES, PROVIDER_RULES};

/// Result of one redaction pass: the scrubbed text plus the categories that
/// were detected. Matched values are discarded here and never surface.
#[derive(Debug, Clone)]
pub struct RedactionOutcome {
    pub text: RedactedText,
    pub categories: BTreeSet<PiiCategory>,
}

/// Scrub identifying information from report text.
///
/// Total and idempotent: every detected span is replaced with a fixed
/// category token that the same pattern rewrites to itself on a second pass.
pub fn redact(raw: &RawText, rules: &Rules) -> RedactionOutcome {
    let mut text = raw.as_str().to_string();
    let mut categories = BTreeSet::new();

    apply_rules(&mut text, &mut categories, &BASE_RULES);
    if rules.redact_provider_names {
        apply_rules(&mut text, &mut categories, &PROVIDER_RULES);
    }

    if !categories.is_empty() {
        tracing::debug!(
            categories = ?categories.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            "redacted identifying spans"
        );
    }

    RedactionOutcome {
        text: RedactedText::from_scrubbed(text),
        categories,
    }
}

fn apply_rules(
    text: &mut String,
    categories: &mut BTreeSet<PiiCategory>,
    rule_set: &[RedactionRule],
) {
    for rule in rule_set {
        if !rule.regex.is_match(text) {
            continue;
        }
        let replaced = rule.regex.replace_all(text, rule.replacement);
        // A rule that rewrites its own token counts as detection only when
        // the text actually changed.
        if replaced != *text {
            categories.insert(rule.category);
        }
        *text = replaced.into_owned();
    }
}
