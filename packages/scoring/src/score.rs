//! Combines the population and competition signals into a 0-100 score.

use siteline_models::{CompetitionSignal, Thresholds};

/// Competition sub-score bands: up to N competitors maps to the paired
/// sub-score; beyond the last band [`OVERCROWDED_SCORE`] applies.
const COMPETITION_BANDS: &[(u32, f64)] = &[(5, 0.9), (15, 0.75), (30, 0.6)];

/// Competition sub-score when the catchment is saturated with competitors.
const OVERCROWDED_SCORE: f64 = 0.45;

/// Scores a site from its population and competition signals.
///
/// The population sub-score saturates at the configured reference
/// population; the competition sub-score decreases in bands with the
/// competitor count, and an unknown count takes a fixed moderate
/// penalty rather than failing. The two are combined with the
/// configured convex weights and rounded to an integer in 0-100.
#[must_use]
pub fn score_location(
    population: u64,
    competition: &CompetitionSignal,
    thresholds: &Thresholds,
) -> u8 {
    #[allow(clippy::cast_precision_loss)]
    let pop_score = (population as f64 / thresholds.reference_population).min(1.0);

    let comp_score = competition.stations().map_or(
        thresholds.unknown_competition_score,
        |stations| {
            COMPETITION_BANDS
                .iter()
                .find(|(limit, _)| stations <= *limit)
                .map_or(OVERCROWDED_SCORE, |(_, score)| *score)
        },
    );

    let combined = thresholds
        .population_weight
        .mul_add(pop_score, thresholds.competition_weight * comp_score)
        * 100.0;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        combined.round().clamp(0.0, 100.0) as u8
    }
}
