//! Human-readable explanation of a single-horizon result.

use siteline_models::{CompetitionSignal, Decision, Thresholds};

/// Renders the customer-facing explanation for a scored site: the
/// population potential, an honest competitor line, the data-freshness
/// line, the decision sentence, and the next-steps checklist.
#[must_use]
pub fn interpret_score(
    score: u8,
    population: u64,
    competition: &CompetitionSignal,
    minutes: u32,
    thresholds: &Thresholds,
) -> String {
    let competitor_line = match competition {
        CompetitionSignal::Known { stations, .. } => format!(
            "{stations} publicly accessible charging points (OpenStreetMap, within the \
             isochrone) were identified in the {minutes}-minute catchment."
        ),
        CompetitionSignal::Unknown { .. } => {
            "The competition data (OSM charging points) could not be retrieved reliably; \
             the score was therefore computed without a dependable competitor count."
                .to_string()
        }
    };

    let freshness_line = match competition {
        CompetitionSignal::Known {
            osm_base,
            queried_at,
            ..
        } => format!(
            "OSM data snapshot (Overpass osm_base): {} | queried at (UTC): {}",
            osm_base.as_deref().unwrap_or("unknown"),
            queried_at.to_rfc3339(),
        ),
        CompetitionSignal::Unknown { .. } => {
            "OSM data snapshot (Overpass osm_base): unknown | queried at (UTC): unknown"
                .to_string()
        }
    };

    let decision_line = match Decision::from_score(score, thresholds) {
        Decision::Go => "The site is fundamentally recommended (GO).",
        Decision::Check => {
            "The site looks fundamentally interesting but should be examined in depth (CHECK)."
        }
        Decision::NoGo => "The site is currently not recommended (NO-GO).",
    };

    format!(
        "The examined site shows a user potential of approx. {} people in the \
         {minutes}-minute catchment (WorldPop, 2020).\n\
         {competitor_line}\n\
         {freshness_line}\n\
         \n\
         {decision_line}\n\
         Next steps:\n\
         - Grid connection and power capacity check\n\
         - Land availability\n\
         - Permits\n\
         - Operator/partner check\n",
        format_thousands(population),
    )
}

/// Formats an integer with dot thousands separators (12.345.678).
fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use siteline_models::Density;

    #[test]
    fn formats_population_with_separators() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1.000");
        assert_eq!(format_thousands(87_654_321), "87.654.321");
    }

    #[test]
    fn known_competition_names_the_count() {
        let signal = CompetitionSignal::Known {
            stations: 7,
            density: Density::Low,
            osm_base: Some("2026-08-01T10:00:00Z".to_string()),
            queried_at: Utc::now(),
        };
        let text = interpret_score(82, 120_000, &signal, 15, &Thresholds::default());
        assert!(text.contains("120.000 people"));
        assert!(text.contains("7 publicly accessible charging points"));
        assert!(text.contains("2026-08-01T10:00:00Z"));
        assert!(text.contains("(GO)"));
    }

    #[test]
    fn unknown_competition_is_stated_honestly() {
        let signal = CompetitionSignal::Unknown {
            error: "mirrors down".to_string(),
        };
        let text = interpret_score(20, 0, &signal, 15, &Thresholds::default());
        assert!(text.contains("could not be retrieved reliably"));
        assert!(text.contains("(NO-GO)"));
    }
}
