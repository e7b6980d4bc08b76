//! Final per-persona output assembly.

use serde::Serialize;

use crate::config::Rules;
use crate::models::{ColonyTrend, Hypothesis, Persona, Trend};
use crate::pipeline::reasoning::TemplateReasoner;

use super::phrases::scan_banned_phrases;

pub const PATIENT_QUESTIONS: &[&str] = &[
    "Is this trend consistent with my symptoms improving?",
    "Do I need another follow-up culture test?",
    "Are there any signs of antibiotic resistance I should know about?",
];

pub const PATIENT_DISCLAIMER: &str =
    "IMPORTANT: This is an educational interpretation only. \
     It is NOT a medical diagnosis. \
     Please discuss all lab results with your healthcare provider.";

pub const CLINICIAN_DISCLAIMER: &str =
    "This output represents a structured hypothesis for clinical review. \
     It is NOT a diagnosis and does NOT replace clinical judgment. \
     All interpretations require full patient context and physician evaluation.";

/// Soft cap on the generated explanation shown to patients.
const PATIENT_WORD_LIMIT: usize = 150;

fn trend_phrase(trend: ColonyTrend) -> &'static str {
    match trend {
        ColonyTrend::Decreasing => "a downward trend in bacterial count",
        ColonyTrend::Cleared => "resolution of detectable bacteria",
        ColonyTrend::Increasing => "an upward trend in bacterial count",
        ColonyTrend::Fluctuating => "a variable pattern in bacterial count",
        ColonyTrend::InsufficientData => "only one data point available",
    }
}

/// Final persona-facing output. The disclaimer is set unconditionally at
/// construction and is always the last element of [`RenderedOutput::full_text`].
#[derive(Debug, Clone, Serialize)]
pub struct RenderedOutput {
    pub persona: Persona,
    pub trend_phrase: &'static str,
    pub narrative: String,
    pub confidence: f64,
    pub questions: Vec<&'static str>,
    pub resistance_detail: Option<String>,
    pub stewardship_alert: bool,
    /// True when the candidate narrative was rejected and the deterministic
    /// template substituted in its place.
    pub narrative_substituted: bool,
    pub disclaimer: &'static str,
}

impl RenderedOutput {
    /// Assemble the displayable text. Disclaimer last, always.
    pub fn full_text(&self) -> String {
        let mut sections = vec![self.narrative.clone()];
        if let Some(detail) = &self.resistance_detail {
            sections.push(detail.clone());
        }
        if !self.questions.is_empty() {
            let mut block = String::from("Questions you might ask your doctor:");
            for question in &self.questions {
                block.push_str("\n- ");
                block.push_str(question);
            }
            sections.push(block);
        }
        sections.push(self.disclaimer.to_string());
        sections.join("\n\n")
    }
}

/// Vet a candidate narrative. Empty or non-compliant text is replaced with
/// the deterministic template, which is safe by construction.
fn vet_narrative(
    candidate: &str,
    fallback: impl FnOnce() -> String,
    persona: Persona,
    rules: &Rules,
) -> (String, bool) {
    if candidate.trim().is_empty() {
        tracing::warn!(persona = %persona, "empty narrative, substituting template");
        return (fallback(), true);
    }
    let hits = scan_banned_phrases(candidate, rules);
    if !hits.is_empty() {
        tracing::warn!(
            persona = %persona,
            phrases = ?hits.iter().map(|h| h.phrase).collect::<Vec<_>>(),
            "narrative rejected by banned-phrase scan, substituting template"
        );
        return (fallback(), true);
    }
    (candidate.trim().to_string(), false)
}

fn cap_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return text.to_string();
    }
    let mut capped = words[..limit].join(" ");
    capped.push_str("...");
    capped
}

/// Assemble the patient-facing output from a candidate narrative.
pub fn render_patient(
    trend: &Trend,
    hypothesis: &Hypothesis,
    narrative: &str,
    rules: &Rules,
) -> RenderedOutput {
    let (vetted, substituted) = vet_narrative(
        narrative,
        || TemplateReasoner::patient_text(trend),
        Persona::Patient,
        rules,
    );
    let capped = cap_words(&vetted, PATIENT_WORD_LIMIT);
    let narrative = format!(
        "{capped}\n\nInterpretation confidence: {:.2}",
        hypothesis.confidence
    );

    RenderedOutput {
        persona: Persona::Patient,
        trend_phrase: trend_phrase(trend.colony_trend),
        narrative,
        confidence: hypothesis.confidence,
        questions: PATIENT_QUESTIONS.to_vec(),
        resistance_detail: None,
        stewardship_alert: hypothesis.stewardship_alert,
        narrative_substituted: substituted,
        disclaimer: PATIENT_DISCLAIMER,
    }
}

/// Assemble the clinician-facing output from a candidate narrative.
///
/// The resistance timeline is included only when at least one report carried
/// a marker.
pub fn render_clinician(
    trend: &Trend,
    hypothesis: &Hypothesis,
    narrative: &str,
    rules: &Rules,
) -> RenderedOutput {
    let (vetted, substituted) = vet_narrative(
        narrative,
        || TemplateReasoner::clinician_text(trend, hypothesis),
        Persona::Clinician,
        rules,
    );

    let resistance_detail = if trend.resistance_timeline.iter().any(|m| !m.is_empty()) {
        let mut lines = vec!["Resistance Timeline:".to_string()];
        for (date, markers) in trend.report_dates.iter().zip(&trend.resistance_timeline) {
            let date_str = date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "undated".to_string());
            let marker_str = if markers.is_empty() {
                "None".to_string()
            } else {
                markers.iter().cloned().collect::<Vec<_>>().join(", ")
            };
            lines.push(format!("  {date_str}: {marker_str}"));
        }
        Some(lines.join("\n"))
    } else {
        None
    };

    RenderedOutput {
        persona: Persona::Clinician,
        trend_phrase: trend_phrase(trend.colony_trend),
        narrative: vetted,
        confidence: hypothesis.confidence,
        questions: Vec::new(),
        resistance_detail,
        stewardship_alert: hypothesis.stewardship_alert,
        narrative_substituted: substituted,
        disclaimer: CLINICIAN_DISCLAIMER,
    }
}
