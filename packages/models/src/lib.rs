#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shared domain types for the site evaluation pipeline.
//!
//! This crate defines the decision taxonomy (GO/CHECK/NO-GO), the
//! competition signal sum type, per-horizon result records, and the
//! centralized [`Thresholds`] configuration consumed by the scoring,
//! confidence, and stability crates. Keeping all decision bands in one
//! structure prevents the components from drifting apart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Three-tier decision band derived from the numeric score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Decision {
    /// Score at or above the GO threshold: recommended.
    #[serde(rename = "GO")]
    #[strum(serialize = "GO")]
    Go,
    /// Score between the CHECK and GO thresholds: viable but fragile.
    #[serde(rename = "CHECK")]
    #[strum(serialize = "CHECK")]
    Check,
    /// Score below the CHECK threshold: not recommended.
    #[serde(rename = "NO-GO")]
    #[strum(serialize = "NO-GO")]
    NoGo,
}

impl Decision {
    /// Classifies a 0-100 score into a decision band.
    #[must_use]
    pub const fn from_score(score: u8, thresholds: &Thresholds) -> Self {
        if score >= thresholds.go_score {
            Self::Go
        } else if score >= thresholds.check_score {
            Self::Check
        } else {
            Self::NoGo
        }
    }
}

/// Trustworthiness rating of a single-horizon result.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    /// All signals present and plausible.
    High,
    /// A soft flag was raised (geocode fallback, implausible bounds).
    Medium,
    /// A required signal is missing or invalid.
    Low,
}

/// Ordinal classification of competitor concentration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Density {
    /// Fewer competitors than the medium band threshold.
    Low,
    /// Between the medium and high band thresholds.
    Medium,
    /// At or above the high band threshold.
    High,
}

impl Density {
    /// Buckets a competitor count using the configured band edges.
    #[must_use]
    pub const fn from_count(count: u32, thresholds: &Thresholds) -> Self {
        if count < thresholds.density_medium_from {
            Self::Low
        } else if count < thresholds.density_high_from {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Robustness classification of the core horizon pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Robustness {
    /// Both core endpoints GO and the score swing within the tight band.
    VeryRobust,
    /// Both core endpoints at least CHECK and the swing within the wide band.
    Robust,
    /// A core endpoint drops below CHECK, or the swing exceeds the wide band.
    Unstable,
}

impl Robustness {
    /// Customer-facing label for this classification.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryRobust => "VERY ROBUST",
            Self::Robust => "ROBUST",
            Self::Unstable => "INSTABLE",
        }
    }

    /// Traffic-light hex color used when rendering this classification.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::VeryRobust => "#1B5E20",
            Self::Robust => "#8D6E63",
            Self::Unstable => "#B71C1C",
        }
    }
}

/// Competition signal for a catchment polygon.
///
/// The degraded path (upstream unreachable, malformed payload) is a
/// first-class variant so every consumer has to handle it explicitly,
/// rather than special-casing a sentinel count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompetitionSignal {
    /// Competitor data was fetched and filtered successfully.
    Known {
        /// Publicly accessible competitors inside the catchment.
        stations: u32,
        /// Density bucket for `stations`.
        density: Density,
        /// Upstream data snapshot identifier (OSM base timestamp).
        osm_base: Option<String>,
        /// When the upstream source was queried (UTC).
        queried_at: DateTime<Utc>,
    },
    /// The upstream source failed; the pipeline degrades gracefully.
    Unknown {
        /// Description of the upstream failure, for diagnostics.
        error: String,
    },
}

impl CompetitionSignal {
    /// Returns the competitor count, or `None` for the degraded variant.
    #[must_use]
    pub const fn stations(&self) -> Option<u32> {
        match self {
            Self::Known { stations, .. } => Some(*stations),
            Self::Unknown { .. } => None,
        }
    }

    /// Returns the density bucket, or `None` for the degraded variant.
    #[must_use]
    pub const fn density(&self) -> Option<Density> {
        match self {
            Self::Known { density, .. } => Some(*density),
            Self::Unknown { .. } => None,
        }
    }
}

/// Result of evaluating one drive-time horizon.
///
/// A failed horizon is recorded as a degraded result (no population,
/// score 0, error message) instead of aborting sibling horizons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizonResult {
    /// Drive-time budget in minutes.
    pub minutes: u32,
    /// Estimated population inside the catchment, if the horizon succeeded.
    pub population: Option<u64>,
    /// Competitor count, if the competition signal was available.
    pub stations: Option<u32>,
    /// Density bucket, if the competition signal was available.
    pub density: Option<Density>,
    /// Attractiveness score in 0-100 (0 for failed horizons).
    pub score: u8,
    /// Why this horizon is degraded, if it is.
    pub error: Option<String>,
}

impl HorizonResult {
    /// Builds the degraded record for a horizon that failed entirely.
    #[must_use]
    pub const fn failed(minutes: u32, error: String) -> Self {
        Self {
            minutes,
            population: None,
            stations: None,
            density: None,
            score: 0,
            error: Some(error),
        }
    }
}

/// Metadata about how an address was resolved to coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeMeta {
    /// The query string that produced the match, if any.
    pub matched_query: Option<String>,
    /// Whether a simplified fallback query was needed for the match.
    pub fallback_used: Option<bool>,
}

/// Centralized decision bands and scoring constants.
///
/// Shared by the score aggregator, the confidence rater, and the
/// stability analyzer so the thresholds cannot drift between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum score for a GO decision.
    pub go_score: u8,
    /// Minimum score for a CHECK decision.
    pub check_score: u8,
    /// Maximum core-pair score swing for VERY ROBUST.
    pub very_robust_swing: u8,
    /// Maximum core-pair score swing for ROBUST.
    pub robust_swing: u8,
    /// Competitor count at which density becomes `medium`.
    pub density_medium_from: u32,
    /// Competitor count at which density becomes `high`.
    pub density_high_from: u32,
    /// Population at which the population score saturates at 1.0.
    pub reference_population: f64,
    /// Weight of the population score in the final combination.
    pub population_weight: f64,
    /// Weight of the competition score in the final combination.
    pub competition_weight: f64,
    /// Competition sub-score when the competitor count is unknown.
    pub unknown_competition_score: f64,
    /// Plausible population density band (persons per km²), inclusive ends.
    pub plausible_density: (f64, f64),
    /// Plausible catchment area band (km²), inclusive ends.
    pub plausible_area_km2: (f64, f64),
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            go_score: 70,
            check_score: 50,
            very_robust_swing: 5,
            robust_swing: 15,
            density_medium_from: 10,
            density_high_from: 30,
            reference_population: 150_000.0,
            population_weight: 0.6,
            competition_weight: 0.4,
            unknown_competition_score: 0.5,
            plausible_density: (300.0, 6000.0),
            plausible_area_km2: (1.0, 2000.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_bands() {
        let t = Thresholds::default();
        assert_eq!(Decision::from_score(70, &t), Decision::Go);
        assert_eq!(Decision::from_score(100, &t), Decision::Go);
        assert_eq!(Decision::from_score(69, &t), Decision::Check);
        assert_eq!(Decision::from_score(50, &t), Decision::Check);
        assert_eq!(Decision::from_score(49, &t), Decision::NoGo);
        assert_eq!(Decision::from_score(0, &t), Decision::NoGo);
    }

    #[test]
    fn density_buckets() {
        let t = Thresholds::default();
        assert_eq!(Density::from_count(0, &t), Density::Low);
        assert_eq!(Density::from_count(9, &t), Density::Low);
        assert_eq!(Density::from_count(10, &t), Density::Medium);
        assert_eq!(Density::from_count(29, &t), Density::Medium);
        assert_eq!(Density::from_count(30, &t), Density::High);
    }

    #[test]
    fn decision_display() {
        assert_eq!(Decision::Go.to_string(), "GO");
        assert_eq!(Decision::NoGo.to_string(), "NO-GO");
        assert_eq!("CHECK".parse::<Decision>().unwrap(), Decision::Check);
    }

    #[test]
    fn unknown_signal_has_no_count() {
        let signal = CompetitionSignal::Unknown {
            error: "all mirrors failed".to_string(),
        };
        assert_eq!(signal.stations(), None);
        assert_eq!(signal.density(), None);
    }
}
