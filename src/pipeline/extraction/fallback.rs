//! Model-assisted fallback extraction.
//!
//! Used only when pattern extraction cannot recover either load-bearing
//! field. The model sees redacted text exclusively, and its output is
//! re-validated against the same closed vocabularies as the pattern path.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::config::Rules;
use crate::models::{Observation, RedactedText, SpecimenType};
use crate::pipeline::reasoning::{ReasoningError, TextGenerate};

use super::resistance::parse_resistance_markers;
use super::NormalizationWarning;

/// Seam for recovering report fields when pattern extraction fails.
pub trait FallbackExtract {
    fn extract_fields(&self, text: &RedactedText) -> Result<FallbackFields, ReasoningError>;
}

/// Loosely-typed field set returned by a fallback extractor, before
/// re-validation.
#[derive(Debug, Clone, Default)]
pub struct FallbackFields {
    pub organism: String,
    pub cfu: u64,
    pub date: Option<String>,
    pub specimen_type: String,
    pub resistance_markers: Vec<String>,
}

impl FallbackFields {
    /// Convert to a typed [`Observation`], re-validating every field.
    ///
    /// Markers outside the closed vocabulary are dropped, unparseable dates
    /// become `None`, and the source text is left empty so nothing the model
    /// emitted can masquerade as report text downstream.
    pub fn into_observation(
        self,
        rules: &Rules,
        warnings: &mut Vec<NormalizationWarning>,
    ) -> Observation {
        let organism = if self.organism.trim().is_empty() {
            "unknown".to_string()
        } else {
            rules.normalize_organism(self.organism.trim())
        };

        let date = self.date.as_deref().and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.eq_ignore_ascii_case("unknown") {
                return None;
            }
            let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();
            if parsed.is_none() {
                warnings.push(NormalizationWarning::new(
                    "date",
                    "fallback extractor returned a non-ISO date; dropped",
                ));
            }
            parsed
        });

        let mut markers = BTreeSet::new();
        for marker in &self.resistance_markers {
            let upper = marker.trim().to_uppercase();
            if rules.is_high_risk_marker(&upper) {
                markers.insert(upper);
            } else if !upper.is_empty() {
                warnings.push(NormalizationWarning::new(
                    "resistance_markers",
                    format!("fallback extractor returned unrecognized marker '{upper}'; dropped"),
                ));
            }
        }

        let specimen_type =
            SpecimenType::from_str(self.specimen_type.trim().to_lowercase().as_str())
                .unwrap_or(SpecimenType::Unknown);

        let contamination_flag = rules.is_contamination(&organism);
        Observation {
            date,
            organism,
            colony_count: self.cfu,
            specimen_type,
            resistance_markers: markers,
            susceptibility: Vec::new(),
            contamination_flag,
            source_text: RedactedText::default(),
        }
    }
}

/// Fenced code block wrapping, with or without a `json` tag.
static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid regex")
});

/// A bare object containing the organism key, anywhere in the response.
static BARE_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{[\s\S]*"organism"[\s\S]*\}"#).expect("valid regex"));

/// Last-resort per-key salvage when the object is not valid JSON.
static KEY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(\w+)"\s*:\s*(\[[^\]]*\]|"[^"]*"|[^,}\n]+)"#).expect("valid regex"));

const FALLBACK_PROMPT_LIMIT: usize = 2_000;

fn extraction_prompt(text: &str) -> String {
    let truncated: String = text.chars().take(FALLBACK_PROMPT_LIMIT).collect();
    format!(
        "Extract structured information from the following microbiology culture report.\n\
         \n\
         Return ONLY a valid JSON object with these exact fields:\n\
         - \"organism\": name of the identified organism. Use \"unknown\" if not found.\n\
         - \"cfu\": colony forming units per mL as an integer. Use 0 if not found or for no growth.\n\
         - \"date\": collection date in YYYY-MM-DD format. Use \"unknown\" if not found.\n\
         - \"specimen_type\": either \"urine\", \"stool\", or \"unknown\".\n\
         - \"resistance_markers\": list of resistance markers found, for example [\"ESBL\"]. Use [] if none.\n\
         \n\
         Culture Report Text:\n\
         ---\n\
         {truncated}\n\
         ---\n\
         \n\
         JSON Output:"
    )
}

const EXTRACTION_SYSTEM_PROMPT: &str =
    "You are a medical data extraction assistant. You respond with JSON only.";

/// Parse a model response into [`FallbackFields`], tolerating the usual
/// formatting slop. Order of attempts: fenced block, bare object, then
/// per-key salvage.
fn parse_response(response: &str) -> Result<FallbackFields, ReasoningError> {
    let candidate = FENCED_JSON
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .or_else(|| BARE_OBJECT.find(response).map(|m| m.as_str()))
        .unwrap_or(response);

    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Ok(fields_from_value(&value));
    }

    // Salvage pass over key/value fragments.
    let mut object = serde_json::Map::new();
    for caps in KEY_VALUE.captures_iter(candidate) {
        let key = caps[1].to_string();
        let raw = caps[2].trim();
        let value = serde_json::from_str::<Value>(raw)
            .unwrap_or_else(|_| Value::String(raw.trim_matches('"').to_string()));
        object.entry(key).or_insert(value);
    }
    if object.is_empty() {
        return Err(ReasoningError::MalformedResponse(
            "no JSON object found in extraction response".to_string(),
        ));
    }
    Ok(fields_from_value(&Value::Object(object)))
}

fn fields_from_value(value: &Value) -> FallbackFields {
    let organism = value
        .get("organism")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("unknown")
        .to_string();

    // Accept either a JSON number or a quoted digit string.
    let cfu = match value.get("cfu") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap_or(0),
        _ => 0,
    };

    let date = value
        .get("date")
        .and_then(Value::as_str)
        .map(str::to_string);

    let specimen_type = value
        .get("specimen_type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    let resistance_markers = match value.get("resistance_markers") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|m| m.trim().trim_matches('"').to_string())
            .filter(|m| !m.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    FallbackFields {
        organism,
        cfu,
        date,
        specimen_type,
        resistance_markers,
    }
}

/// Fallback extractor backed by any text-generation client.
pub struct LlmFallbackExtractor<G> {
    generator: G,
}

impl<G: TextGenerate> LlmFallbackExtractor<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

impl<G: TextGenerate> FallbackExtract for LlmFallbackExtractor<G> {
    fn extract_fields(&self, text: &RedactedText) -> Result<FallbackFields, ReasoningError> {
        let response = self
            .generator
            .generate(EXTRACTION_SYSTEM_PROMPT, &extraction_prompt(text.as_str()))?;
        let mut fields = parse_response(&response)?;
        // Belt and suspenders: re-scan whatever the model called markers
        // through the same negation-aware detector used on report text.
        let rescanned = parse_resistance_markers(&fields.resistance_markers.join(" "));
        fields.resistance_markers = rescanned.into_iter().collect();
        Ok(fields)
    }
}
