//! Narrative generation seam.
//!
//! Everything downstream of the analysis engines is deterministic except the
//! optional narrative layer, which talks to a local model through the
//! [`TextGenerate`] trait. The model only ever sees the structured payload
//! built by the safety module, never report text, and its output goes back
//! through the banned-phrase vetting before anyone reads it.

pub mod ollama;
pub mod stub;

pub use ollama::OllamaClient;
pub use stub::{MockGenerate, TemplateReasoner};

use thiserror::Error;

use crate::models::{Hypothesis, Persona, Trend};
use crate::pipeline::safety::ReasoningPayload;

#[derive(Error, Debug)]
pub enum ReasoningError {
    #[error("cannot connect to model server at {0}")]
    Connection(String),

    #[error("model request timed out after {0}s")]
    Timeout(u64),

    #[error("model server returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("no suitable model available on the server")]
    NoModelAvailable,
}

/// Minimal text-generation surface. One system turn, one user turn, one
/// string back.
pub trait TextGenerate {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, ReasoningError>;
}

/// Produces a persona-appropriate narrative from derived analysis fields.
pub trait Reason {
    fn narrate(
        &self,
        persona: Persona,
        trend: &Trend,
        hypothesis: &Hypothesis,
    ) -> Result<String, ReasoningError>;
}

const PATIENT_SYSTEM_PROMPT: &str = "\
You are a compassionate medical communication assistant.
You are given STRUCTURED DATA only, not raw patient reports.
Your task: Generate a plain-language explanation of a lab result trend.

STRICT RULES:
1. NEVER diagnose. Never say \"you have X\".
2. NEVER recommend a treatment or medication.
3. Always end with: \"Please discuss these findings with your doctor.\"
4. Use empathetic, reassuring language.
5. Respond ONLY based on the structured data provided.
6. Do not reference specific bacteria names to the patient.";

const CLINICIAN_SYSTEM_PROMPT: &str = "\
You are a structured clinical decision support assistant.
You are given STRUCTURED TEMPORAL DATA from a rule-based analysis engine.
Your task: Generate a structured trajectory interpretation for a clinician.

STRICT RULES:
1. Frame all outputs as hypotheses, not diagnoses.
2. Always include confidence score in output.
3. Flag stewardship concerns explicitly if resistance evolution is true.
4. End with: \"Clinical interpretation requires full patient context.\"
5. Use clinical terminology appropriate for a physician audience.
6. Never recommend a specific antibiotic or treatment regimen.";

pub(crate) fn system_prompt(persona: Persona) -> &'static str {
    match persona {
        Persona::Patient => PATIENT_SYSTEM_PROMPT,
        Persona::Clinician => CLINICIAN_SYSTEM_PROMPT,
    }
}

/// Narrative layer backed by any [`TextGenerate`] client.
pub struct LlmReasoner<G> {
    generator: G,
}

impl<G: TextGenerate> LlmReasoner<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

impl<G: TextGenerate> Reason for LlmReasoner<G> {
    fn narrate(
        &self,
        persona: Persona,
        trend: &Trend,
        hypothesis: &Hypothesis,
    ) -> Result<String, ReasoningError> {
        let payload = ReasoningPayload::build(trend, hypothesis, persona);
        let prompt = serde_json::to_string_pretty(&payload)
            .map_err(|e| ReasoningError::MalformedResponse(e.to_string()))?;
        let response = self.generator.generate(system_prompt(persona), &prompt)?;
        Ok(response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColonyTrend, Hypothesis};

    fn fixtures() -> (Trend, Hypothesis) {
        let trend = Trend {
            colony_trend: ColonyTrend::Decreasing,
            colony_values: vec![120_000, 80_000, 20_000],
            colony_deltas: vec![-40_000, -60_000],
            organism_persistent: true,
            organism_sequence: vec!["Escherichia coli".into(); 3],
            resistance_evolved: false,
            resistance_timeline: vec![Default::default(); 3],
            report_dates: vec![None; 3],
            any_contamination: false,
            multi_drug_resistance: false,
        };
        let hypothesis = Hypothesis::new("Colony counts are falling.".into(), 0.80, Default::default(), false);
        (trend, hypothesis)
    }

    #[test]
    fn llm_reasoner_forwards_structured_payload_only() {
        struct CapturePrompt;
        impl TextGenerate for CapturePrompt {
            fn generate(&self, system: &str, prompt: &str) -> Result<String, ReasoningError> {
                assert!(system.contains("NEVER diagnose"));
                assert!(prompt.contains("\"colony_trend\""));
                assert!(!prompt.contains("source_text"));
                Ok("narrative".into())
            }
        }
        let (trend, hypothesis) = fixtures();
        let reasoner = LlmReasoner::new(CapturePrompt);
        let text = reasoner.narrate(Persona::Patient, &trend, &hypothesis).unwrap();
        assert_eq!(text, "narrative");
    }

    #[test]
    fn persona_selects_system_prompt() {
        assert!(system_prompt(Persona::Patient).contains("plain-language"));
        assert!(system_prompt(Persona::Clinician).contains("clinical decision support"));
    }
}
