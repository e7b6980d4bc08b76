//! Analysis orchestrator.
//!
//! Single entry point that drives one report set through the full pipeline:
//! redact → extract → trend → hypothesis → render. Uses trait-based DI for
//! the two external seams (fallback extractor, narrative generation) so the
//! orchestrator stays fully testable without a model server.

use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use crate::config::{Rules, APP_VERSION};
use crate::models::{Hypothesis, Observation, Persona, PiiCategory, RawText, Trend};
use crate::pipeline::extraction::{
    extract_with_fallback, ExtractionError, FallbackExtract, NormalizationWarning,
};
use crate::pipeline::hypothesis::hypothesize;
use crate::pipeline::reasoning::{Reason, TemplateReasoner};
use crate::pipeline::redaction::redact;
use crate::pipeline::safety::{render_clinician, render_patient, RenderedOutput};
use crate::pipeline::trend::analyze;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("analysis requires at least one report")]
    NoReports,

    #[error("report {index} failed extraction: {source}")]
    Extraction {
        index: usize,
        #[source]
        source: ExtractionError,
    },
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Full output of one analysis run.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub observations: Vec<Observation>,
    pub trend: Trend,
    pub hypothesis: Hypothesis,
    pub patient_output: RenderedOutput,
    pub clinician_output: RenderedOutput,
    /// Categories scrubbed across all input reports, for audit logging.
    pub pii_categories: BTreeSet<PiiCategory>,
    pub warnings: Vec<NormalizationWarning>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Sort the dated observations ascending among themselves. Undated
/// observations keep their input positions; comparing them against dated
/// neighbours would not be a total order, so they never enter the sort.
fn sort_dated(observations: &mut [Observation]) {
    let slots: Vec<usize> = observations
        .iter()
        .enumerate()
        .filter_map(|(i, o)| o.date.is_some().then_some(i))
        .collect();

    let mut dated: Vec<Observation> =
        slots.iter().map(|&i| observations[i].clone()).collect();
    dated.sort_by_key(|o| o.date);

    for (slot, observation) in slots.into_iter().zip(dated) {
        observations[slot] = observation;
    }
}

/// Drives the full analysis for one set of 1-3 reports.
///
/// Both seams are optional: without a fallback extractor, unparseable
/// reports fail closed; without a reasoner, narratives come from the
/// deterministic templates.
pub struct Processor {
    rules: Rules,
    fallback: Option<Box<dyn FallbackExtract + Send + Sync>>,
    reasoner: Option<Box<dyn Reason + Send + Sync>>,
}

impl Processor {
    pub fn new(rules: Rules) -> Self {
        Self {
            rules,
            fallback: None,
            reasoner: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Box<dyn FallbackExtract + Send + Sync>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_reasoner(mut self, reasoner: Box<dyn Reason + Send + Sync>) -> Self {
        self.reasoner = Some(reasoner);
        self
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Analyze a chronologically-unordered set of raw reports.
    ///
    /// Dated observations are sorted ascending by collection date before
    /// trend analysis; undated reports keep their input position.
    pub fn analyze(&self, reports: &[RawText]) -> Result<AnalysisReport, PipelineError> {
        if reports.is_empty() {
            return Err(PipelineError::NoReports);
        }

        let analysis_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "analysis",
            id = %analysis_id,
            reports = reports.len(),
            version = APP_VERSION,
        );
        let _guard = span.enter();

        let mut observations = Vec::with_capacity(reports.len());
        let mut warnings = Vec::new();
        let mut pii_categories = BTreeSet::new();

        for (index, raw) in reports.iter().enumerate() {
            let outcome = redact(raw, &self.rules);
            pii_categories.extend(outcome.categories.iter().copied());

            let fallback = self.fallback.as_deref().map(|f| f as &dyn FallbackExtract);
            let extracted = extract_with_fallback(&outcome.text, &self.rules, fallback)
                .map_err(|source| PipelineError::Extraction { index, source })?;
            observations.push(extracted.observation);
            warnings.extend(extracted.warnings);
        }

        sort_dated(&mut observations);

        let trend = analyze(&observations, &self.rules);
        let hypothesis = hypothesize(&trend, &self.rules);

        let patient_narrative = self.narrate(Persona::Patient, &trend, &hypothesis);
        let clinician_narrative = self.narrate(Persona::Clinician, &trend, &hypothesis);

        let patient_output =
            render_patient(&trend, &hypothesis, &patient_narrative, &self.rules);
        let clinician_output =
            render_clinician(&trend, &hypothesis, &clinician_narrative, &self.rules);

        tracing::info!(
            colony_trend = %trend.colony_trend,
            confidence = hypothesis.confidence,
            stewardship_alert = hypothesis.stewardship_alert,
            "analysis complete"
        );

        Ok(AnalysisReport {
            analysis_id,
            observations,
            trend,
            hypothesis,
            patient_output,
            clinician_output,
            pii_categories,
            warnings,
        })
    }

    /// Produce a candidate narrative. A reasoner failure degrades to the
    /// template, never to an empty slot or a surfaced error.
    fn narrate(&self, persona: Persona, trend: &Trend, hypothesis: &Hypothesis) -> String {
        let Some(reasoner) = &self.reasoner else {
            return TemplateReasoner
                .narrate(persona, trend, hypothesis)
                .unwrap_or_default();
        };
        match reasoner.narrate(persona, trend, hypothesis) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(persona = %persona, error = %e, "narrative generation failed, using template");
                TemplateReasoner
                    .narrate(persona, trend, hypothesis)
                    .unwrap_or_default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColonyTrend;
    use crate::pipeline::reasoning::ReasoningError;

    fn raw(text: &str) -> RawText {
        RawText::new(text)
    }

    #[test]
    fn no_reports_is_an_error() {
        let err = Processor::new(Rules::standard()).analyze(&[]).unwrap_err();
        assert!(matches!(err, PipelineError::NoReports));
    }

    #[test]
    fn dated_reports_are_sorted_before_analysis() {
        // Given newest first, the trend must still read oldest to newest.
        let reports = [
            raw("Collected: 2024-02-01\nOrganism: E. coli\nCFU/mL: 20,000"),
            raw("Collected: 2024-01-01\nOrganism: E. coli\nCFU/mL: 120,000"),
        ];
        let report = Processor::new(Rules::standard()).analyze(&reports).unwrap();
        assert_eq!(report.trend.colony_values, vec![120_000, 20_000]);
        assert_eq!(report.trend.colony_trend, ColonyTrend::Decreasing);
    }

    #[test]
    fn undated_report_does_not_block_date_sorting() {
        // The dated pair arrives newest first with an undated report wedged
        // between them; the dated pair must still come out ascending.
        let reports = [
            raw("Collected: 2026-02-01\nOrganism: E. coli\nCFU/mL: 20,000"),
            raw("Organism: E. coli\nCFU/mL: 50,000"),
            raw("Collected: 2026-01-01\nOrganism: E. coli\nCFU/mL: 120,000"),
        ];
        let report = Processor::new(Rules::standard()).analyze(&reports).unwrap();
        assert_eq!(report.trend.colony_values, vec![120_000, 50_000, 20_000]);
        assert_eq!(report.observations[1].date, None);
    }

    #[test]
    fn pii_categories_are_aggregated_across_reports() {
        let reports = [
            raw("Patient Name: Jane Roe\nOrganism: E. coli\nCFU/mL: 120,000"),
            raw("Phone: (555) 123-4567\nOrganism: E. coli\nCFU/mL: 20,000"),
        ];
        let report = Processor::new(Rules::standard()).analyze(&reports).unwrap();
        assert!(report.pii_categories.contains(&PiiCategory::Name));
        assert!(report.pii_categories.contains(&PiiCategory::Phone));
    }

    #[test]
    fn unparseable_report_surfaces_its_index() {
        let reports = [
            raw("Organism: E. coli\nCFU/mL: 120,000"),
            raw("totally illegible"),
        ];
        let err = Processor::new(Rules::standard()).analyze(&reports).unwrap_err();
        match err {
            PipelineError::Extraction { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reasoner_failure_degrades_to_template() {
        struct AlwaysFails;
        impl Reason for AlwaysFails {
            fn narrate(
                &self,
                _persona: Persona,
                _trend: &Trend,
                _hypothesis: &Hypothesis,
            ) -> Result<String, ReasoningError> {
                Err(ReasoningError::Connection("http://localhost:11434".into()))
            }
        }
        let reports = [raw("Organism: E. coli\nCFU/mL: 120,000")];
        let report = Processor::new(Rules::standard())
            .with_reasoner(Box::new(AlwaysFails))
            .analyze(&reports)
            .unwrap();
        assert!(report
            .patient_output
            .narrative
            .contains("Please discuss these findings with your doctor."));
    }
}
