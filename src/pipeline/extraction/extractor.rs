//! Per-report extraction orchestration.

use crate::config::Rules;
use crate::models::{Observation, RedactedText};

use super::colony::parse_colony_count;
use super::date::parse_collection_date;
use super::fallback::FallbackExtract;
use super::organism::parse_organism;
use super::resistance::parse_resistance_markers;
use super::specimen::parse_specimen;
use super::susceptibility::parse_susceptibility;
use super::{ExtractionError, NormalizationWarning};

/// One extracted report plus any normalization events that occurred while
/// producing it.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub observation: Observation,
    pub warnings: Vec<NormalizationWarning>,
}

/// Parse a redacted report into a typed [`Observation`].
///
/// Fails only when both load-bearing fields (organism and colony count) are
/// unparseable; a missing organism alone degrades to a placeholder with a
/// warning, matching the colony-count degradation rules.
pub fn extract(text: &RedactedText, rules: &Rules) -> Result<Extracted, ExtractionError> {
    let mut warnings = Vec::new();

    let organism = parse_organism(text.as_str(), rules);
    let (colony_count, colony_ok) = parse_colony_count(text.as_str(), &mut warnings);

    if organism.is_none() && !colony_ok {
        return Err(ExtractionError::FieldsUnparseable);
    }

    let organism = organism.unwrap_or_else(|| {
        warnings.push(NormalizationWarning::new(
            "organism",
            "organism could not be parsed; using placeholder",
        ));
        "unknown".to_string()
    });

    let contamination_flag = rules.is_contamination(&organism);
    let observation = Observation {
        date: parse_collection_date(text.as_str()),
        organism,
        colony_count,
        specimen_type: parse_specimen(text.as_str()),
        resistance_markers: parse_resistance_markers(text.as_str()),
        susceptibility: parse_susceptibility(text.as_str()),
        contamination_flag,
        source_text: text.clone(),
    };

    tracing::debug!(
        organism = %observation.organism,
        colony_count = observation.colony_count,
        specimen = %observation.specimen_type,
        markers = observation.resistance_markers.len(),
        "extracted report fields"
    );

    Ok(Extracted { observation, warnings })
}

/// [`extract`] with an optional second chance: when pattern extraction fails
/// on both load-bearing fields, hand the redacted text to the fallback seam.
pub fn extract_with_fallback(
    text: &RedactedText,
    rules: &Rules,
    fallback: Option<&dyn FallbackExtract>,
) -> Result<Extracted, ExtractionError> {
    match extract(text, rules) {
        Ok(extracted) => Ok(extracted),
        Err(ExtractionError::FieldsUnparseable) => {
            let Some(fallback) = fallback else {
                return Err(ExtractionError::FallbackUnavailable);
            };
            tracing::warn!("pattern extraction failed on both organism and colony count, trying fallback extractor");
            let fields = fallback
                .extract_fields(text)
                .map_err(|e| ExtractionError::FallbackFailed(e.to_string()))?;
            let mut warnings = vec![NormalizationWarning::new(
                "report",
                "fields recovered by fallback extractor",
            )];
            let observation = fields.into_observation(rules, &mut warnings);
            Ok(Extracted { observation, warnings })
        }
        Err(other) => Err(other),
    }
}
