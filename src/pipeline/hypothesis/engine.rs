//! Confidence scoring, risk flags, and the rule-generated interpretation.
//!
//! Everything here is a pure function of the [`Trend`]. The interpretation
//! string is forwarded to the narrative layer only as structured context
//! inside the JSON payload, never as a direct prompt.

use std::collections::BTreeSet;

use crate::config::Rules;
use crate::models::{ColonyTrend, Hypothesis, RiskFlag, Trend};

/// Signal adjustments applied to the base confidence, then clamped to
/// [0.0, max_confidence] and rounded to 4 decimals. The ceiling below 1.0
/// means no hypothesis is ever presented as certain.
fn score_confidence(trend: &Trend, report_count: usize, rules: &Rules) -> f64 {
    let mut confidence = rules.base_confidence;

    match trend.colony_trend {
        ColonyTrend::Cleared => confidence += 0.40,
        ColonyTrend::Decreasing => confidence += 0.30,
        ColonyTrend::Increasing => confidence += 0.20,
        ColonyTrend::Fluctuating => confidence -= 0.10,
        ColonyTrend::InsufficientData => {}
    }

    if trend.resistance_evolved {
        confidence -= 0.10;
    }
    if !trend.organism_persistent {
        confidence -= 0.05;
    }
    if trend.any_contamination {
        confidence -= 0.20;
    }
    if report_count < 2 {
        confidence -= 0.25;
    }

    let clamped = confidence.clamp(0.0, rules.max_confidence);
    (clamped * 10_000.0).round() / 10_000.0
}

fn assign_risk_flags(trend: &Trend, report_count: usize) -> BTreeSet<RiskFlag> {
    let mut flags = BTreeSet::new();

    if trend.resistance_evolved {
        flags.insert(RiskFlag::EmergingResistance);
    }
    if trend.any_contamination {
        flags.insert(RiskFlag::ContaminationSuspected);
    }
    if trend.colony_trend == ColonyTrend::Increasing {
        flags.insert(RiskFlag::NonResponsePattern);
    }
    if report_count < 2 {
        flags.insert(RiskFlag::InsufficientData);
    }
    if !trend.organism_persistent {
        flags.insert(RiskFlag::OrganismChange);
    }
    if trend.multi_drug_resistance {
        flags.insert(RiskFlag::MultiDrugResistance);
    }

    flags
}

fn build_interpretation(trend: &Trend) -> String {
    let mut parts: Vec<&str> = Vec::new();

    parts.push(match trend.colony_trend {
        ColonyTrend::Decreasing => "Pattern suggests improving infection response.",
        ColonyTrend::Cleared => "Pattern suggests possible resolution.",
        ColonyTrend::Increasing => "Pattern suggests possible non-response.",
        ColonyTrend::Fluctuating => "Pattern is variable and requires clinical context.",
        ColonyTrend::InsufficientData => "Insufficient longitudinal data for trend analysis.",
    });

    if trend.resistance_evolved {
        parts.push("Emerging resistance observed.");
    }

    // An organism change is irrelevant once the final report shows clearance.
    if !trend.organism_persistent && trend.colony_trend != ColonyTrend::Cleared {
        parts.push("Organism change may indicate reinfection.");
    }

    if trend.any_contamination {
        parts.push("Contamination suspected; interpret with caution.");
    }

    if trend.multi_drug_resistance {
        parts.push("Multi-drug resistance pattern detected.");
    }

    parts.join(" ")
}

/// Generate a deterministic [`Hypothesis`] from a computed [`Trend`].
///
/// `requires_review` is set unconditionally by the constructor; no input
/// can produce a hypothesis exempt from clinician review.
pub fn hypothesize(trend: &Trend, rules: &Rules) -> Hypothesis {
    let report_count = trend.colony_values.len();
    let confidence = score_confidence(trend, report_count, rules);
    let risk_flags = assign_risk_flags(trend, report_count);
    let interpretation = build_interpretation(trend);

    // A resolved infection needs no stewardship escalation even when earlier
    // reports showed marker acquisition.
    let stewardship_alert =
        trend.resistance_evolved && trend.colony_trend != ColonyTrend::Cleared;

    let hypothesis = Hypothesis::new(interpretation, confidence, risk_flags, stewardship_alert);

    tracing::debug!(
        confidence = hypothesis.confidence,
        stewardship_alert = hypothesis.stewardship_alert,
        flags = hypothesis.risk_flags.len(),
        "hypothesis generated"
    );

    hypothesis
}
