use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{ColonyTrend, Hypothesis, Persona, RiskFlag, Trend};

/// Constraints restated inside every payload, so the model sees them even if
/// a caller swaps the system prompt.
const SAFETY_CONSTRAINTS: &[&str] = &[
    "Frame every statement as a hypothesis, never a diagnosis.",
    "Do not recommend any treatment, medication, or antibiotic.",
    "Do not reproduce or request any report text.",
];

/// The only structure the narrative layer may receive.
///
/// Built exclusively from [`Trend`] and [`Hypothesis`] fields. Neither input
/// type can hold report text (`Observation::source_text` is skipped during
/// serialization and `Trend` never carries it), so raw-text leakage into the
/// model prompt is impossible by construction.
#[derive(Debug, Clone, Serialize)]
pub struct ReasoningPayload {
    pub persona: Persona,
    pub colony_trend: ColonyTrend,
    pub colony_values: Vec<u64>,
    pub colony_deltas: Vec<i64>,
    pub organism_persistent: bool,
    pub resistance_evolved: bool,
    pub resistance_timeline: Vec<BTreeSet<String>>,
    pub any_contamination: bool,
    pub report_dates: Vec<Option<NaiveDate>>,
    pub interpretation: String,
    pub confidence: f64,
    pub risk_flags: BTreeSet<RiskFlag>,
    pub stewardship_alert: bool,
    pub requires_review: bool,
    pub safety_constraints: Vec<&'static str>,
}

impl ReasoningPayload {
    pub fn build(trend: &Trend, hypothesis: &Hypothesis, persona: Persona) -> Self {
        Self {
            persona,
            colony_trend: trend.colony_trend,
            colony_values: trend.colony_values.clone(),
            colony_deltas: trend.colony_deltas.clone(),
            organism_persistent: trend.organism_persistent,
            resistance_evolved: trend.resistance_evolved,
            resistance_timeline: trend.resistance_timeline.clone(),
            any_contamination: trend.any_contamination,
            report_dates: trend.report_dates.clone(),
            interpretation: hypothesis.interpretation.clone(),
            confidence: hypothesis.confidence,
            risk_flags: hypothesis.risk_flags.clone(),
            stewardship_alert: hypothesis.stewardship_alert,
            requires_review: hypothesis.requires_review,
            safety_constraints: SAFETY_CONSTRAINTS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (Trend, Hypothesis) {
        let trend = Trend {
            colony_trend: ColonyTrend::Decreasing,
            colony_values: vec![120_000, 40_000, 5_000],
            colony_deltas: vec![-80_000, -35_000],
            organism_persistent: true,
            organism_sequence: vec!["Escherichia coli".into(); 3],
            resistance_evolved: false,
            resistance_timeline: vec![Default::default(); 3],
            report_dates: vec![None; 3],
            any_contamination: false,
            multi_drug_resistance: false,
        };
        let hypothesis = Hypothesis::new(
            "Pattern suggests improving infection response.".into(),
            0.80,
            Default::default(),
            false,
        );
        (trend, hypothesis)
    }

    #[test]
    fn payload_serializes_derived_fields_only() {
        let (trend, hypothesis) = fixtures();
        let payload = ReasoningPayload::build(&trend, &hypothesis, Persona::Clinician);
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"colony_trend\":\"decreasing\""));
        assert!(json.contains("\"confidence\":0.8"));
        assert!(!json.contains("source_text"));
        // Organism names stay out of the model-facing payload.
        assert!(!json.contains("Escherichia"));
    }

    #[test]
    fn payload_restates_safety_constraints() {
        let (trend, hypothesis) = fixtures();
        let payload = ReasoningPayload::build(&trend, &hypothesis, Persona::Patient);
        assert!(!payload.safety_constraints.is_empty());
        assert!(payload.requires_review);
    }
}
