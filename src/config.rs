//! Process-wide rule configuration.
//!
//! Thresholds, vocabularies, and the organism alias table are loaded once at
//! startup and shared by reference into every pipeline component. Nothing in
//! here is mutable after construction.

use std::collections::{BTreeSet, HashMap};

/// Crate version string for log banners.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter used by demos and tests.
pub fn default_log_filter() -> String {
    "culturetrend=info".to_string()
}

/// Sentinel colony count for "too numerous to count" reports.
pub const TNTC_SENTINEL: u64 = 999_999;

/// Immutable clinical rule set shared across the pipeline.
///
/// Constructed once via [`Rules::standard`] and passed by reference. The
/// alias table is total: every canonical organism name is also present as
/// its own key, so case-only variants of a canonical name normalize to
/// themselves instead of silently falling through the lookup.
#[derive(Debug, Clone)]
pub struct Rules {
    /// CFU/mL at or below this value is treated as effectively cleared.
    pub cleared_threshold: u64,
    /// Starting confidence before any signal adjustments.
    pub base_confidence: f64,
    /// Hard ceiling on confidence. Never 1.0.
    pub max_confidence: f64,
    /// Marker count in a single report that flags multi-drug resistance.
    pub multi_drug_threshold: usize,
    /// Whether the redactor also scrubs provider/clinician names.
    pub redact_provider_names: bool,
    /// Organism-name substrings indicating specimen contamination.
    pub contamination_terms: Vec<&'static str>,
    /// Closed vocabulary of high-risk resistance markers.
    pub high_risk_markers: BTreeSet<&'static str>,
    /// Diagnostic phrases that must never appear in rendered output.
    pub banned_phrases: Vec<&'static str>,
    aliases: HashMap<&'static str, &'static str>,
}

/// Alias entries: shorthand -> canonical (lowercase) organism name.
/// Canonical names get identity entries added at construction time.
const ALIAS_ENTRIES: &[(&str, &str)] = &[
    ("e. coli", "escherichia coli"),
    ("e.coli", "escherichia coli"),
    ("e coli", "escherichia coli"),
    ("klebsiella", "klebsiella pneumoniae"),
    ("staph aureus", "staphylococcus aureus"),
    ("s. aureus", "staphylococcus aureus"),
    ("mrsa", "staphylococcus aureus (mrsa)"),
    ("enterococcus", "enterococcus faecalis"),
    ("e. faecalis", "enterococcus faecalis"),
    ("pseudomonas", "pseudomonas aeruginosa"),
    ("p. aeruginosa", "pseudomonas aeruginosa"),
    ("proteus", "proteus mirabilis"),
    ("skin flora", "mixed flora"),
    ("normal flora", "mixed flora"),
    ("mixed growth", "mixed flora"),
    ("mixed flora", "mixed flora"),
    ("commensal", "commensal"),
];

impl Rules {
    /// The standard rule set used in production.
    pub fn standard() -> Self {
        let mut aliases: HashMap<&'static str, &'static str> = HashMap::new();
        for (key, canonical) in ALIAS_ENTRIES {
            aliases.insert(key, canonical);
            // Identity mapping keeps the table total over canonical names.
            aliases.insert(canonical, canonical);
        }

        Self {
            cleared_threshold: 1_000,
            base_confidence: 0.50,
            max_confidence: 0.95,
            multi_drug_threshold: 3,
            redact_provider_names: true,
            contamination_terms: vec![
                "mixed flora",
                "skin flora",
                "normal flora",
                "commensal",
                "contamination",
                "mixed growth",
            ],
            high_risk_markers: ["ESBL", "CRE", "MRSA", "VRE", "CRKP"].into_iter().collect(),
            banned_phrases: vec![
                "you have",
                "you are diagnosed",
                "the diagnosis is",
                "confirms infection",
                "you should take",
                "prescribe",
                "definitive diagnosis",
                "this is a urinary tract infection",
            ],
            aliases,
        }
    }

    /// Canonical lowercase organism name for comparison purposes.
    ///
    /// Unknown names fall back to their stripped lowercase form.
    pub fn canonical_organism(&self, raw: &str) -> String {
        let key = raw.trim().to_lowercase();
        match self.aliases.get(key.as_str()) {
            Some(canonical) => (*canonical).to_string(),
            None => key,
        }
    }

    /// Display form of an organism name: canonicalized, then first letter
    /// capitalized. Contamination terms stay lowercase.
    pub fn normalize_organism(&self, raw: &str) -> String {
        let canonical = self.canonical_organism(raw);
        if self.is_contamination(&canonical) {
            return canonical;
        }
        let mut chars = canonical.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => canonical,
        }
    }

    /// True if the organism name contains any contamination term.
    pub fn is_contamination(&self, organism: &str) -> bool {
        let lower = organism.to_lowercase();
        self.contamination_terms.iter().any(|term| lower.contains(term))
    }

    /// True if the marker (uppercased) belongs to the closed vocabulary.
    pub fn is_high_risk_marker(&self, marker: &str) -> bool {
        self.high_risk_markers.contains(marker.to_uppercase().as_str())
    }

    /// All alias keys, longest first. Used by the extractor's whole-text
    /// organism scan so that "klebsiella pneumoniae" wins over "klebsiella".
    pub fn alias_keys_longest_first(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self.aliases.keys().copied().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        keys
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::standard()
    }
}
