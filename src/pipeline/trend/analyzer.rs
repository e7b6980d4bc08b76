//! Pure trend computation. No IO, no model calls.

use std::collections::BTreeSet;

use crate::config::Rules;
use crate::models::{ColonyTrend, Observation, Trend};

/// Classify the colony-count trajectory.
///
/// Priority order: insufficient data, cleared, strictly decreasing, strictly
/// increasing, fluctuating. "Cleared" is decided by the final value alone and
/// overrides the monotonic labels. Any repeated adjacent value breaks strict
/// monotonicity and lands in "fluctuating".
fn classify_colony_trend(values: &[u64], rules: &Rules) -> ColonyTrend {
    if values.len() < 2 {
        return ColonyTrend::InsufficientData;
    }

    if *values.last().unwrap() <= rules.cleared_threshold {
        return ColonyTrend::Cleared;
    }

    if values.windows(2).all(|w| w[0] > w[1]) {
        return ColonyTrend::Decreasing;
    }
    if values.windows(2).all(|w| w[0] < w[1]) {
        return ColonyTrend::Increasing;
    }

    ColonyTrend::Fluctuating
}

/// Per-interval colony-count changes. Positive means worsening. Widened
/// through i128 so counts above `i64::MAX` saturate instead of wrapping.
fn compute_deltas(values: &[u64]) -> Vec<i64> {
    values
        .windows(2)
        .map(|w| {
            let delta = w[1] as i128 - w[0] as i128;
            delta.clamp(i64::MIN as i128, i64::MAX as i128) as i64
        })
        .collect()
}

/// True when every report names the same organism after canonicalization,
/// so "E. coli" and "Escherichia coli" count as persistent.
fn check_persistence(organisms: &[String], rules: &Rules) -> bool {
    let canonical: BTreeSet<String> = organisms
        .iter()
        .map(|o| rules.canonical_organism(o))
        .collect();
    canonical.len() == 1
}

/// True when any report after the first carries a marker absent from the
/// first report's baseline. Marker loss never counts as evolution.
fn check_resistance_evolution(timeline: &[BTreeSet<String>]) -> bool {
    let Some((baseline, later)) = timeline.split_first() else {
        return false;
    };
    later
        .iter()
        .flatten()
        .any(|marker| !baseline.contains(marker))
}

/// Compute a [`Trend`] from observations already sorted oldest first.
///
/// This function does not re-sort; ordering is the caller's contract.
pub fn analyze(observations: &[Observation], rules: &Rules) -> Trend {
    let colony_values: Vec<u64> = observations.iter().map(|o| o.colony_count).collect();
    let organism_sequence: Vec<String> =
        observations.iter().map(|o| o.organism.clone()).collect();
    let resistance_timeline: Vec<BTreeSet<String>> = observations
        .iter()
        .map(|o| o.resistance_markers.clone())
        .collect();

    let trend = Trend {
        colony_trend: classify_colony_trend(&colony_values, rules),
        colony_deltas: compute_deltas(&colony_values),
        organism_persistent: check_persistence(&organism_sequence, rules),
        resistance_evolved: check_resistance_evolution(&resistance_timeline),
        multi_drug_resistance: observations
            .iter()
            .any(|o| o.resistance_markers.len() >= rules.multi_drug_threshold),
        any_contamination: observations.iter().any(|o| o.contamination_flag),
        report_dates: observations.iter().map(|o| o.date).collect(),
        colony_values,
        organism_sequence,
        resistance_timeline,
    };

    tracing::debug!(
        colony_trend = %trend.colony_trend,
        organism_persistent = trend.organism_persistent,
        resistance_evolved = trend.resistance_evolved,
        reports = trend.colony_values.len(),
        "trend computed"
    );

    trend
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RedactedText, SpecimenType};

    fn observation(organism: &str, colony_count: u64, markers: &[&str]) -> Observation {
        Observation {
            date: None,
            organism: organism.to_string(),
            colony_count,
            specimen_type: SpecimenType::Urine,
            resistance_markers: markers.iter().map(|m| m.to_string()).collect(),
            susceptibility: Vec::new(),
            contamination_flag: false,
            source_text: RedactedText::default(),
        }
    }

    fn run(observations: &[Observation]) -> Trend {
        analyze(observations, &Rules::standard())
    }

    // =================================================================
    // TREND CLASSIFICATION
    // =================================================================

    #[test]
    fn strictly_decreasing() {
        let obs: Vec<_> = [120_000, 80_000, 20_000]
            .iter()
            .map(|&c| observation("Escherichia coli", c, &[]))
            .collect();
        let trend = run(&obs);
        assert_eq!(trend.colony_trend, ColonyTrend::Decreasing);
        assert_eq!(trend.colony_deltas, vec![-40_000, -60_000]);
    }

    #[test]
    fn strictly_increasing() {
        let obs: Vec<_> = [20_000, 80_000, 120_000]
            .iter()
            .map(|&c| observation("Escherichia coli", c, &[]))
            .collect();
        assert_eq!(run(&obs).colony_trend, ColonyTrend::Increasing);
    }

    #[test]
    fn repeated_value_is_fluctuating() {
        // A plateau breaks strict monotonicity.
        let obs: Vec<_> = [120_000, 120_000, 80_000]
            .iter()
            .map(|&c| observation("Escherichia coli", c, &[]))
            .collect();
        assert_eq!(run(&obs).colony_trend, ColonyTrend::Fluctuating);
    }

    #[test]
    fn cleared_overrides_rising_history() {
        // Only the final value matters for clearance.
        let obs: Vec<_> = [120_000, 500_000, 900]
            .iter()
            .map(|&c| observation("Escherichia coli", c, &[]))
            .collect();
        assert_eq!(run(&obs).colony_trend, ColonyTrend::Cleared);
    }

    #[test]
    fn clearance_boundary_is_inclusive() {
        let obs: Vec<_> = [50_000, 1_000]
            .iter()
            .map(|&c| observation("Escherichia coli", c, &[]))
            .collect();
        assert_eq!(run(&obs).colony_trend, ColonyTrend::Cleared);

        let obs: Vec<_> = [50_000, 1_001]
            .iter()
            .map(|&c| observation("Escherichia coli", c, &[]))
            .collect();
        assert_eq!(run(&obs).colony_trend, ColonyTrend::Decreasing);
    }

    #[test]
    fn extreme_counts_saturate_deltas() {
        let obs: Vec<_> = [u64::MAX, 0, u64::MAX]
            .iter()
            .map(|&c| observation("Escherichia coli", c, &[]))
            .collect();
        let trend = run(&obs);
        assert_eq!(trend.colony_deltas, vec![i64::MIN, i64::MAX]);
    }

    #[test]
    fn single_report_is_insufficient() {
        let trend = run(&[observation("Escherichia coli", 50_000, &[])]);
        assert_eq!(trend.colony_trend, ColonyTrend::InsufficientData);
        assert!(trend.colony_deltas.is_empty());
    }

    // =================================================================
    // ORGANISM PERSISTENCE
    // =================================================================

    #[test]
    fn alias_variants_count_as_persistent() {
        let obs = [
            observation("E. coli", 120_000, &[]),
            observation("Escherichia coli", 80_000, &[]),
            observation("e.coli", 20_000, &[]),
        ];
        assert!(run(&obs).organism_persistent);
    }

    #[test]
    fn organism_switch_breaks_persistence() {
        let obs = [
            observation("Escherichia coli", 120_000, &[]),
            observation("Klebsiella pneumoniae", 80_000, &[]),
        ];
        assert!(!run(&obs).organism_persistent);
    }

    // =================================================================
    // RESISTANCE SIGNALS
    // =================================================================

    #[test]
    fn new_marker_after_baseline_is_evolution() {
        let obs = [
            observation("Escherichia coli", 80_000, &[]),
            observation("Escherichia coli", 90_000, &["ESBL"]),
        ];
        assert!(run(&obs).resistance_evolved);
    }

    #[test]
    fn baseline_marker_persisting_is_not_evolution() {
        let obs = [
            observation("Escherichia coli", 80_000, &["ESBL"]),
            observation("Escherichia coli", 90_000, &["ESBL"]),
        ];
        assert!(!run(&obs).resistance_evolved);
    }

    #[test]
    fn marker_loss_is_not_evolution() {
        let obs = [
            observation("Escherichia coli", 80_000, &["ESBL"]),
            observation("Escherichia coli", 90_000, &[]),
        ];
        assert!(!run(&obs).resistance_evolved);
    }

    #[test]
    fn single_report_never_evolves() {
        assert!(!run(&[observation("Escherichia coli", 80_000, &["ESBL"])]).resistance_evolved);
    }

    #[test]
    fn three_markers_in_one_report_is_multi_drug() {
        let obs = [
            observation("Klebsiella pneumoniae", 80_000, &["ESBL", "CRE", "CRKP"]),
        ];
        assert!(run(&obs).multi_drug_resistance);
    }

    #[test]
    fn markers_spread_across_reports_are_not_multi_drug() {
        let obs = [
            observation("Klebsiella pneumoniae", 80_000, &["ESBL"]),
            observation("Klebsiella pneumoniae", 90_000, &["CRE", "CRKP"]),
        ];
        assert!(!run(&obs).multi_drug_resistance);
    }
}
