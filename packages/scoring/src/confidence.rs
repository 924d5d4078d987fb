//! Conservative, order-sensitive confidence classification.
//!
//! Any single red flag downgrades the rating; only the complete
//! absence of flags yields HIGH.

use siteline_models::{CompetitionSignal, Confidence, GeocodeMeta, Thresholds};

/// Rates the trustworthiness of a single-horizon result.
///
/// Decision order, first match wins:
/// 1. LOW — competitor count unknown, area missing or non-positive,
///    or population density missing.
/// 2. MEDIUM — the address was resolved through a fallback query.
/// 3. MEDIUM — density or area falls outside the plausible band.
/// 4. HIGH — otherwise.
#[must_use]
pub fn rate_confidence(
    area_km2: Option<f64>,
    density_per_km2: Option<f64>,
    competition: &CompetitionSignal,
    geocode_meta: &GeocodeMeta,
    thresholds: &Thresholds,
) -> Confidence {
    // Hard failures / missing signals.
    if competition.stations().is_none() {
        return Confidence::Low;
    }
    let Some(area) = area_km2.filter(|a| *a > 0.0) else {
        return Confidence::Low;
    };
    let Some(density) = density_per_km2 else {
        return Confidence::Low;
    };

    // Conservative downgrade when a fallback match was needed.
    if geocode_meta.fallback_used == Some(true) {
        return Confidence::Medium;
    }

    // Plausibility guards, deliberately broad.
    let (density_min, density_max) = thresholds.plausible_density;
    if density < density_min || density > density_max {
        return Confidence::Medium;
    }
    let (area_min, area_max) = thresholds.plausible_area_km2;
    if area < area_min || area > area_max {
        return Confidence::Medium;
    }

    Confidence::High
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use siteline_models::Density;

    fn known(stations: u32) -> CompetitionSignal {
        CompetitionSignal::Known {
            stations,
            density: Density::from_count(stations, &Thresholds::default()),
            osm_base: None,
            queried_at: Utc::now(),
        }
    }

    fn rate(
        area: Option<f64>,
        density: Option<f64>,
        competition: &CompetitionSignal,
        meta: &GeocodeMeta,
    ) -> Confidence {
        rate_confidence(area, density, competition, meta, &Thresholds::default())
    }

    #[test]
    fn unknown_competition_is_always_low() {
        let unknown = CompetitionSignal::Unknown {
            error: "timeout".to_string(),
        };
        // Otherwise-perfect inputs still rate LOW.
        let rating = rate(
            Some(120.0),
            Some(1_500.0),
            &unknown,
            &GeocodeMeta::default(),
        );
        assert_eq!(rating, Confidence::Low);
    }

    #[test]
    fn missing_or_degenerate_area_is_low() {
        let meta = GeocodeMeta::default();
        assert_eq!(rate(None, Some(1_000.0), &known(4), &meta), Confidence::Low);
        assert_eq!(
            rate(Some(0.0), Some(1_000.0), &known(4), &meta),
            Confidence::Low
        );
        assert_eq!(rate(Some(120.0), None, &known(4), &meta), Confidence::Low);
    }

    #[test]
    fn geocode_fallback_downgrades_to_medium() {
        let meta = GeocodeMeta {
            matched_query: Some("simplified query".to_string()),
            fallback_used: Some(true),
        };
        assert_eq!(
            rate(Some(120.0), Some(1_500.0), &known(4), &meta),
            Confidence::Medium
        );
    }

    #[test]
    fn implausible_density_or_area_is_medium() {
        let meta = GeocodeMeta::default();
        assert_eq!(
            rate(Some(120.0), Some(150.0), &known(4), &meta),
            Confidence::Medium
        );
        assert_eq!(
            rate(Some(120.0), Some(9_000.0), &known(4), &meta),
            Confidence::Medium
        );
        assert_eq!(
            rate(Some(0.5), Some(1_500.0), &known(4), &meta),
            Confidence::Medium
        );
        assert_eq!(
            rate(Some(5_000.0), Some(1_500.0), &known(4), &meta),
            Confidence::Medium
        );
    }

    #[test]
    fn consistent_inputs_are_high() {
        let rating = rate(
            Some(120.0),
            Some(1_500.0),
            &known(4),
            &GeocodeMeta::default(),
        );
        assert_eq!(rating, Confidence::High);
    }
}
