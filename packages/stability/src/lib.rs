#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Multi-horizon stability and robustness analysis.
//!
//! Given per-horizon results, derives a customer-facing recommendation
//! (the minimum drive time at which the site clears each decision
//! threshold) and a robustness classification of the designated core
//! horizon pair, based on the score swing between its endpoints.
//!
//! Robustness uses the strict rule: VERY ROBUST requires both core
//! endpoints at GO in addition to the tight swing band; ROBUST requires
//! both endpoints at least CHECK within the wide band; everything else
//! is INSTABLE. Degraded horizons participate with score 0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use siteline_models::{Decision, HorizonResult, Robustness, Thresholds};

/// Stability assessment over a multi-horizon evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilityAssessment {
    /// Robustness of the core horizon pair.
    pub robustness: Robustness,
    /// Narrative for the core window: decision at each endpoint, swing,
    /// and opportunistic competition/demand notes.
    pub summary: String,
    /// Heading for the recommendation block.
    pub recommendation_title: String,
    /// Narrative naming the minimum viable drive time and flagging
    /// weaker horizons below it.
    pub recommendation_text: String,
    /// Present when the smallest tested horizon is NO-GO while a larger
    /// one reaches at least CHECK.
    pub early_warning: Option<String>,
    /// Core pair near endpoint actually used (after fallback).
    pub baseline_minutes: u32,
    /// Core pair far endpoint actually used (after fallback).
    pub far_minutes: u32,
}

/// Analyzes score stability across drive-time horizons.
///
/// Returns `None` when fewer than two horizons are available; a
/// stability statement over a single sample would be meaningless.
/// `core_near`/`core_far` name the target core pair; if a target minute
/// was not evaluated, the nearest available horizon stands in (ties
/// resolve toward the smaller minute).
#[must_use]
pub fn analyze_stability(
    results: &[HorizonResult],
    core_near: u32,
    core_far: u32,
    thresholds: &Thresholds,
) -> Option<StabilityAssessment> {
    if results.len() < 2 {
        return None;
    }

    // Missing scores were already coerced to 0 in the degraded records,
    // so every horizon participates in the threshold comparisons.
    let mut scores: BTreeMap<u32, u8> = BTreeMap::new();
    let mut stations: BTreeMap<u32, Option<u32>> = BTreeMap::new();
    let mut populations: BTreeMap<u32, u64> = BTreeMap::new();
    for result in results {
        scores.insert(result.minutes, result.score);
        stations.insert(result.minutes, result.stations);
        populations.insert(result.minutes, result.population.unwrap_or(0));
    }

    let minutes: Vec<u32> = scores.keys().copied().collect();

    let base_m = best_available_minute(core_near, &minutes);
    let far_m = best_available_minute(core_far, &minutes);
    let base_score = scores.get(&base_m).copied().unwrap_or(0);
    let far_score = scores.get(&far_m).copied().unwrap_or(0);

    let recommendation_text = recommendation(&minutes, &scores, thresholds);

    let swing = base_score.abs_diff(far_score);
    let core_ok = base_score >= thresholds.check_score && far_score >= thresholds.check_score;
    let core_is_go = base_score >= thresholds.go_score && far_score >= thresholds.go_score;
    let robustness = classify(core_ok, core_is_go, swing, thresholds);

    let change = if swing <= thresholds.very_robust_swing {
        "The score stays very stable"
    } else if swing <= thresholds.robust_swing {
        "The score shifts moderately"
    } else {
        "The score shifts sharply"
    };

    // Informational only; does not affect the classification.
    let mut notes = Vec::new();
    if let (Some(Some(near)), Some(Some(far))) = (stations.get(&base_m), stations.get(&far_m)) {
        if far > near {
            notes.push("despite growing competition");
        }
    }
    if populations.get(&far_m).copied().unwrap_or(0) > populations.get(&base_m).copied().unwrap_or(0)
    {
        notes.push("with demand rising at the same time");
    }
    let notes = if notes.is_empty() {
        String::new()
    } else {
        format!(" {}", notes.join(" "))
    };

    let far_decision = Decision::from_score(far_score, thresholds);
    let summary = format!(
        "Across the core window ({base_m}\u{2192}{far_m} min) the decision stays {far_decision} \
         ({base_score}\u{2192}{far_score}/100). {change}{notes}."
    );

    let early_warning = early_warning(&minutes, &scores, thresholds);

    Some(StabilityAssessment {
        robustness,
        summary,
        recommendation_title: "Catchment recommendation".to_string(),
        recommendation_text,
        early_warning,
        baseline_minutes: base_m,
        far_minutes: far_m,
    })
}

/// Picks the evaluated minute closest to the target.
///
/// Exact matches win; otherwise smallest absolute distance, with ties
/// broken toward the smaller minute.
fn best_available_minute(target: u32, available: &[u32]) -> u32 {
    if available.contains(&target) || available.is_empty() {
        return target;
    }
    available
        .iter()
        .copied()
        .min_by_key(|m| (m.abs_diff(target), *m))
        .unwrap_or(target)
}

/// Strict robustness rule over the core pair.
const fn classify(core_ok: bool, core_is_go: bool, swing: u8, thresholds: &Thresholds) -> Robustness {
    if !core_ok {
        return Robustness::Unstable;
    }
    if core_is_go && swing <= thresholds.very_robust_swing {
        return Robustness::VeryRobust;
    }
    if swing <= thresholds.robust_swing {
        return Robustness::Robust;
    }
    Robustness::Unstable
}

/// Builds the recommendation narrative from the partitioned horizons.
fn recommendation(minutes: &[u32], scores: &BTreeMap<u32, u8>, thresholds: &Thresholds) -> String {
    let decision_at =
        |m: u32| Decision::from_score(scores.get(&m).copied().unwrap_or(0), thresholds);

    let go: Vec<u32> = minutes
        .iter()
        .copied()
        .filter(|m| decision_at(*m) == Decision::Go)
        .collect();
    let check: Vec<u32> = minutes
        .iter()
        .copied()
        .filter(|m| decision_at(*m) == Decision::Check)
        .collect();
    let no_go: Vec<u32> = minutes
        .iter()
        .copied()
        .filter(|m| decision_at(*m) == Decision::NoGo)
        .collect();

    let mut parts: Vec<String> = Vec::new();

    if let (Some(&min_go), Some(&max_go)) = (go.first(), go.last()) {
        if min_go == max_go {
            parts.push(format!(
                "The site is clearly economically attractive at {min_go} minutes of drive time (GO)."
            ));
        } else {
            parts.push(format!(
                "The site is clearly economically attractive from {min_go} minutes of drive time (GO)."
            ));
        }

        // A CHECK below the GO horizon is not a recommendation.
        if let Some(&min_check) = check.iter().find(|m| **m < min_go) {
            parts.push(format!(
                "At {min_check} minutes the result is only CHECK \u{2014} borderline, and \
                 acceptable only with additional diligence (grid connection, site factors)."
            ));
        }

        if let Some(&min_no_go) = no_go.iter().find(|m| **m < min_go) {
            parts.push(format!(
                "At {min_no_go} minutes the result tips to NO-GO (the catchment is too small, \
                 with too little demand in the immediate surroundings)."
            ));
        }
    } else if let (Some(&min_check), Some(&max_check)) = (check.first(), check.last()) {
        if min_check == max_check {
            parts.push(format!(
                "The site only reaches CHECK at {min_check} minutes (economically plausible, but fragile)."
            ));
        } else {
            parts.push(format!(
                "The site reaches at least CHECK from {min_check} minutes (economically plausible, but fragile)."
            ));
        }

        if let Some(&min_no_go) = no_go.iter().find(|m| **m < min_check) {
            parts.push(format!(
                "Below that (e.g. {min_no_go} minutes) it sits at NO-GO (catchment too small)."
            ));
        }
    } else {
        parts.push(
            "The site stays below the CHECK threshold at every tested drive time \
             (currently not recommendable)."
                .to_string(),
        );
    }

    parts.join(" ")
}

/// Warns when only the shortest drive time fails: the catchment is
/// undersized at short horizons but viable beyond them.
fn early_warning(
    minutes: &[u32],
    scores: &BTreeMap<u32, u8>,
    thresholds: &Thresholds,
) -> Option<String> {
    let smallest = *minutes.first()?;
    let smallest_score = scores.get(&smallest).copied().unwrap_or(0);
    if smallest_score >= thresholds.check_score {
        return None;
    }
    let recovers = minutes[1..]
        .iter()
        .any(|m| scores.get(m).copied().unwrap_or(0) >= thresholds.check_score);
    recovers.then(|| {
        format!(
            "Note: at {smallest} minutes the catchment is too small (NO-GO). The CHECK \
             threshold is only reached at longer drive times."
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizon(minutes: u32, score: u8) -> HorizonResult {
        HorizonResult {
            minutes,
            population: Some(u64::from(score) * 1_000),
            stations: Some(5),
            density: None,
            score,
            error: None,
        }
    }

    fn analyze(results: &[HorizonResult]) -> Option<StabilityAssessment> {
        analyze_stability(results, 15, 20, &Thresholds::default())
    }

    #[test]
    fn requires_two_horizons() {
        assert!(analyze(&[]).is_none());
        assert!(analyze(&[horizon(15, 80)]).is_none());
    }

    #[test]
    fn names_minimum_go_horizon_and_flags_no_go_below() {
        let results = [horizon(10, 40), horizon(15, 75), horizon(20, 78)];
        let assessment = analyze(&results).unwrap();

        assert!(
            assessment
                .recommendation_text
                .contains("from 15 minutes of drive time (GO)")
        );
        // 10 minutes is NO-GO, not CHECK; only the NO-GO flag appears.
        assert!(!assessment.recommendation_text.contains("only CHECK"));
        assert!(assessment.recommendation_text.contains("At 10 minutes"));
        assert!(assessment.recommendation_text.contains("NO-GO"));
    }

    #[test]
    fn core_swing_of_three_go_endpoints_is_very_robust() {
        let results = [horizon(10, 40), horizon(15, 75), horizon(20, 78)];
        let assessment = analyze(&results).unwrap();

        assert_eq!(assessment.baseline_minutes, 15);
        assert_eq!(assessment.far_minutes, 20);
        assert_eq!(assessment.robustness, Robustness::VeryRobust);
        assert!(assessment.summary.contains("75\u{2192}78/100"));
    }

    #[test]
    fn tight_swing_without_go_endpoints_is_only_robust() {
        // Both endpoints clear CHECK, swing 2, but 68 is not GO: the
        // strict rule withholds the top tier.
        let results = [horizon(15, 68), horizon(20, 70)];
        let assessment = analyze(&results).unwrap();
        assert_eq!(assessment.robustness, Robustness::Robust);
    }

    #[test]
    fn core_endpoint_below_check_is_unstable() {
        let results = [horizon(15, 45), horizon(20, 72)];
        let assessment = analyze(&results).unwrap();
        assert_eq!(assessment.robustness, Robustness::Unstable);
    }

    #[test]
    fn wide_swing_is_unstable() {
        let results = [horizon(15, 55), horizon(20, 75)];
        let assessment = analyze(&results).unwrap();
        assert_eq!(assessment.robustness, Robustness::Unstable);
    }

    #[test]
    fn early_warning_when_only_shortest_horizon_fails() {
        let results = [horizon(10, 30), horizon(20, 60)];
        let assessment = analyze(&results).unwrap();
        let warning = assessment.early_warning.unwrap();
        assert!(warning.contains("10 minutes"));
    }

    #[test]
    fn no_early_warning_when_shortest_horizon_passes() {
        let results = [horizon(10, 55), horizon(20, 75)];
        let assessment = analyze(&results).unwrap();
        assert!(assessment.early_warning.is_none());
    }

    #[test]
    fn core_pair_falls_back_to_nearest_minute_ties_toward_smaller() {
        // Neither 15 nor 20 was evaluated. 12 and 18 are equidistant
        // from 15, so the smaller one wins; 18 is nearest to 20.
        let results = [horizon(12, 60), horizon(18, 62)];
        let assessment = analyze(&results).unwrap();
        assert_eq!(assessment.baseline_minutes, 12);
        assert_eq!(assessment.far_minutes, 18);
    }

    #[test]
    fn degraded_horizon_counts_as_zero() {
        let failed = HorizonResult::failed(10, "isochrone provider unreachable".to_string());
        let results = [failed, horizon(15, 72), horizon(20, 74)];
        let assessment = analyze(&results).unwrap();

        assert_eq!(assessment.robustness, Robustness::VeryRobust);
        assert!(assessment.early_warning.is_some());
        assert!(assessment.recommendation_text.contains("NO-GO"));
    }

    #[test]
    fn all_horizons_below_check() {
        let results = [horizon(10, 20), horizon(15, 30), horizon(20, 40)];
        let assessment = analyze(&results).unwrap();
        assert!(
            assessment
                .recommendation_text
                .contains("stays below the CHECK threshold")
        );
        assert_eq!(assessment.robustness, Robustness::Unstable);
        assert!(assessment.early_warning.is_none());
    }

    #[test]
    fn competition_and_demand_notes_are_informational() {
        let mut near = horizon(15, 74);
        near.stations = Some(3);
        near.population = Some(100_000);
        let mut far = horizon(20, 76);
        far.stations = Some(9);
        far.population = Some(140_000);

        let assessment = analyze(&[near, far]).unwrap();
        assert_eq!(assessment.robustness, Robustness::VeryRobust);
        assert!(assessment.summary.contains("despite growing competition"));
        assert!(assessment.summary.contains("demand rising"));
    }
}
