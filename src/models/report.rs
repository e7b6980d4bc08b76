//! Core structured values flowing through the pipeline.
//!
//! Each of these is constructed once per analysis and never mutated
//! afterwards; nothing here is persisted between invocations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::enums::{ColonyTrend, RiskFlag, SirClass, SpecimenType};
use super::text::RedactedText;

/// One antibiotic row from a susceptibility table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Susceptibility {
    /// Antimicrobial agent name as printed on the report.
    pub antibiotic: String,
    /// Minimum inhibitory concentration, verbatim (e.g. "<= 0.25").
    pub mic: String,
    pub interpretation: SirClass,
}

/// One parsed culture report.
///
/// Created by the field extractor (or its external fallback) and immutable
/// thereafter. `source_text` is opaque: it never appears in any serialized
/// or outward-facing payload.
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    /// Collection date, when one could be parsed.
    pub date: Option<NaiveDate>,
    /// Normalized organism name (alias table applied).
    pub organism: String,
    /// Colony count in CFU/mL. `TNTC_SENTINEL` stands in for
    /// "too numerous to count".
    pub colony_count: u64,
    pub specimen_type: SpecimenType,
    /// High-risk resistance markers, uppercase, closed vocabulary.
    pub resistance_markers: BTreeSet<String>,
    /// Antimicrobial susceptibility rows, when the report carries a table.
    pub susceptibility: Vec<Susceptibility>,
    /// Derived from the organism name; never user-supplied.
    pub contamination_flag: bool,
    /// The redacted text this observation was parsed from. Empty for
    /// fallback-extracted observations.
    #[serde(skip)]
    pub source_text: RedactedText,
}

/// Temporal analysis across an ordered report sequence.
#[derive(Debug, Clone, Serialize)]
pub struct Trend {
    pub colony_trend: ColonyTrend,
    /// One colony count per observation, in report order.
    pub colony_values: Vec<u64>,
    /// Pairwise consecutive differences; positive = worsening.
    pub colony_deltas: Vec<i64>,
    /// True when every report names the same organism after normalization.
    pub organism_persistent: bool,
    pub organism_sequence: Vec<String>,
    /// True when a marker absent from the first report appears later.
    pub resistance_evolved: bool,
    /// Marker set per report, in report order.
    pub resistance_timeline: Vec<BTreeSet<String>>,
    pub report_dates: Vec<Option<NaiveDate>>,
    pub any_contamination: bool,
    /// Any single report carries enough markers to suggest MDR.
    pub multi_drug_resistance: bool,
}

/// Deterministic, rule-generated hypothesis. Not a diagnosis.
#[derive(Debug, Clone, Serialize)]
pub struct Hypothesis {
    /// Rule-assembled pattern summary; template text, never learned.
    pub interpretation: String,
    /// Clamped to [0.0, 0.95]. The ceiling is a hard epistemic limit.
    pub confidence: f64,
    pub risk_flags: BTreeSet<RiskFlag>,
    pub stewardship_alert: bool,
    /// Always true. Set by the constructor, never computed.
    pub requires_review: bool,
}

impl Hypothesis {
    /// The only production constructor; `requires_review` is structural.
    pub fn new(
        interpretation: String,
        confidence: f64,
        risk_flags: BTreeSet<RiskFlag>,
        stewardship_alert: bool,
    ) -> Self {
        Self {
            interpretation,
            confidence,
            risk_flags,
            stewardship_alert,
            requires_review: true,
        }
    }
}
