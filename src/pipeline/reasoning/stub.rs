//! Templated narrative fallback.
//!
//! Active whenever no model server is reachable, and also the substitution
//! target when a generated narrative fails safety vetting. Deterministic by
//! construction, so it can never introduce banned language.

use crate::models::{ColonyTrend, Hypothesis, Persona, Trend};

use super::{Reason, ReasoningError, TextGenerate};

/// Deterministic template renderer. Always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateReasoner;

impl TemplateReasoner {
    pub fn patient_text(trend: &Trend) -> String {
        let trend_desc = match trend.colony_trend {
            ColonyTrend::Decreasing => "a downward trend in your lab values",
            ColonyTrend::Cleared => "that your lab values have returned to a normal range",
            ColonyTrend::Increasing => "an upward trend in your lab values",
            ColonyTrend::Fluctuating => "a variable pattern in your lab values",
            ColonyTrend::InsufficientData => "limited data, as only one result is available",
        };

        let flags_note = if trend.resistance_evolved {
            " Your doctor may want to discuss the latest results in detail."
        } else {
            ""
        };

        format!(
            "Your lab results show {trend_desc} over the time period reviewed. \
             This information has been summarised for your awareness.{flags_note} \
             Please discuss these findings with your doctor."
        )
    }

    pub fn clinician_text(trend: &Trend, hypothesis: &Hypothesis) -> String {
        let flags = if hypothesis.risk_flags.is_empty() {
            "None".to_string()
        } else {
            hypothesis
                .risk_flags
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let stewardship = if hypothesis.stewardship_alert {
            "ALERT: Antimicrobial stewardship review recommended.\n"
        } else {
            ""
        };

        format!(
            "Trajectory Hypothesis Summary\n\
             Colony Trend: {}\n\
             Organism Persistent: {}\n\
             Resistance Evolution: {}\n\
             Confidence: {:.2} ({:.0}%)\n\
             Risk Flags: {}\n\
             {}Interpretation: {}\n\
             Clinical interpretation requires full patient context.",
            trend.colony_trend,
            trend.organism_persistent,
            trend.resistance_evolved,
            hypothesis.confidence,
            hypothesis.confidence * 100.0,
            flags,
            stewardship,
            hypothesis.interpretation,
        )
    }
}

impl Reason for TemplateReasoner {
    fn narrate(
        &self,
        persona: Persona,
        trend: &Trend,
        hypothesis: &Hypothesis,
    ) -> Result<String, ReasoningError> {
        Ok(match persona {
            Persona::Patient => Self::patient_text(trend),
            Persona::Clinician => Self::clinician_text(trend, hypothesis),
        })
    }
}

/// Mock generation client for tests. Returns a configurable response.
pub struct MockGenerate {
    response: String,
}

impl MockGenerate {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl TextGenerate for MockGenerate {
    fn generate(&self, _system: &str, _prompt: &str) -> Result<String, ReasoningError> {
        Ok(self.response.clone())
    }
}
