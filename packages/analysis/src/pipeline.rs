//! The single- and multi-horizon evaluation pipelines.

use serde::Serialize;
use siteline_competition::fetch_competition;
use siteline_geocoder::geocode;
use siteline_isochrone::{ORS_API_KEY_ENV, build_isochrone};
use siteline_models::{
    CompetitionSignal, Confidence, Decision, GeocodeMeta, HorizonResult, Thresholds,
};
use siteline_population::shared_grid;
use siteline_scoring::{rate_confidence, score_location};
use siteline_stability::{StabilityAssessment, analyze_stability};

use crate::AnalysisError;
use crate::interpretation::interpret_score;
use crate::verticals::{Plan, Profile, VerticalConfig, get_vertical};

/// Drive-time horizons evaluated in multi-horizon mode, in minutes.
pub const MULTI_HORIZONS: [u32; 3] = [10, 15, 20];

/// Near endpoint of the core horizon pair.
pub const CORE_NEAR_MINUTES: u32 = 15;

/// Far endpoint of the core horizon pair.
pub const CORE_FAR_MINUTES: u32 = 20;

/// Drive time applied when a request names neither minutes nor a
/// profile.
pub const DEFAULT_MINUTES: u32 = 15;

/// One site evaluation request.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Free-form address of the candidate site.
    pub address: String,
    /// Vertical key; unknown keys fall back to the default vertical.
    pub vertical: String,
    /// Explicit drive-time budget, takes precedence over the profile.
    pub minutes: Option<u32>,
    /// Drive-time profile shorthand.
    pub profile: Option<Profile>,
    /// Whether multi-horizon analysis was requested.
    pub multi_time: bool,
    /// Purchased plan tier.
    pub plan: Plan,
}

impl AnalysisRequest {
    /// Resolves the drive-time budget: explicit minutes win, then the
    /// profile, then [`DEFAULT_MINUTES`].
    #[must_use]
    pub fn resolved_minutes(&self) -> u32 {
        self.minutes
            .or_else(|| self.profile.map(Profile::minutes))
            .unwrap_or(DEFAULT_MINUTES)
    }

    /// Whether multi-horizon analysis actually runs: it must be
    /// requested and the plan must allow it in this vertical.
    #[must_use]
    pub fn effective_multi_time(&self, vertical: &VerticalConfig) -> bool {
        self.multi_time && vertical.allows_multi_time(self.plan)
    }
}

/// The full result bundle for one evaluated site.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// The address as given by the caller.
    pub address: String,
    /// The vertical the analysis ran under.
    pub vertical: VerticalConfig,
    /// Drive-time budget of the primary horizon.
    pub minutes: u32,
    /// How the address was resolved.
    pub geocode_meta: GeocodeMeta,
    /// Catchment area in km².
    pub area_km2: f64,
    /// Estimated population inside the catchment.
    pub population: u64,
    /// Population density in persons per km², if the area is positive.
    pub density_per_km2: Option<f64>,
    /// Competition signal (possibly degraded).
    pub competition: CompetitionSignal,
    /// Confidence rating for this result.
    pub confidence: Confidence,
    /// Attractiveness score in 0-100.
    pub score: u8,
    /// Decision band for the score.
    pub decision: Decision,
    /// Customer-facing explanation text.
    pub explanation: String,
    /// Per-horizon results, present in multi-horizon mode.
    pub horizons: Option<Vec<HorizonResult>>,
    /// Stability assessment, present when at least two horizons were
    /// evaluated.
    pub stability: Option<StabilityAssessment>,
}

/// A compare-mode entry: one address with either its report or the
/// error that prevented one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSite {
    /// The address as given by the caller.
    pub address: String,
    /// The report, when the analysis succeeded.
    pub report: Option<AnalysisReport>,
    /// Why the analysis failed, otherwise.
    pub error: Option<String>,
}

impl RankedSite {
    /// Score used for ranking; missing scores coerce to 0.
    #[must_use]
    pub fn ranking_score(&self) -> u8 {
        self.report.as_ref().map_or(0, |report| report.score)
    }
}

/// Sorts compare-mode entries by descending score, failed analyses
/// last (score 0). The sort is stable, so equal scores keep their
/// request order.
pub fn rank_sites(sites: &mut [RankedSite]) {
    sites.sort_by_key(|site| std::cmp::Reverse(site.ranking_score()));
}

/// Runs site evaluations against the external collaborators.
pub struct Analyzer {
    client: reqwest::Client,
    ors_api_key: String,
    thresholds: Thresholds,
}

impl Analyzer {
    /// Creates an analyzer with the given API key and thresholds.
    ///
    /// # Errors
    ///
    /// Returns an error if the shared HTTP client cannot be built.
    pub fn new(ors_api_key: String, thresholds: Thresholds) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .user_agent("siteline/1.0 (site evaluation)")
            .build()?;
        Ok(Self {
            client,
            ors_api_key,
            thresholds,
        })
    }

    /// Creates an analyzer from the environment with default
    /// thresholds.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `ORS_API_KEY` is not set.
    pub fn from_env() -> Result<Self, AnalysisError> {
        let ors_api_key = std::env::var(ORS_API_KEY_ENV)
            .map_err(|_| siteline_isochrone::IsochroneError::MissingApiKey)?;
        Self::new(ors_api_key, Thresholds::default())
    }

    /// The thresholds this analyzer evaluates against.
    #[must_use]
    pub const fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Runs the full pipeline for one request.
    ///
    /// # Errors
    ///
    /// Returns an [`AnalysisError`] when geocoding, the primary
    /// catchment, or the population grid fails. Competition failures
    /// and multi-horizon sub-failures degrade instead of erroring.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        let vertical = get_vertical(&request.vertical);
        let multi_time = request.effective_multi_time(&vertical);
        let minutes = request.resolved_minutes();

        let resolved = geocode(&self.client, &request.address).await?;
        let catchment = build_isochrone(
            &self.client,
            &self.ors_api_key,
            resolved.longitude,
            resolved.latitude,
            minutes,
        )
        .await?;

        let area_km2 = catchment.area_km2();
        let population = shared_grid()?.estimate_population(&catchment.polygon);
        #[allow(clippy::cast_precision_loss)]
        let density_per_km2 = (area_km2 > 0.0).then(|| population as f64 / area_km2);

        let competition =
            fetch_competition(&self.client, &catchment.polygon, &self.thresholds).await;

        let confidence = rate_confidence(
            Some(area_km2),
            density_per_km2,
            &competition,
            &resolved.meta,
            &self.thresholds,
        );
        let score = score_location(population, &competition, &self.thresholds);
        let explanation =
            interpret_score(score, population, &competition, minutes, &self.thresholds);

        let (horizons, stability) = if multi_time {
            let results = self
                .evaluate_horizons(resolved.longitude, resolved.latitude)
                .await;
            let stability = analyze_stability(
                &results,
                CORE_NEAR_MINUTES,
                CORE_FAR_MINUTES,
                &self.thresholds,
            );
            (Some(results), stability)
        } else {
            (None, None)
        };

        Ok(AnalysisReport {
            address: request.address.clone(),
            vertical,
            minutes,
            geocode_meta: resolved.meta,
            area_km2,
            population,
            density_per_km2,
            competition,
            confidence,
            score,
            decision: Decision::from_score(score, &self.thresholds),
            explanation,
            horizons,
            stability,
        })
    }

    /// Evaluates every configured horizon, isolating failures: a
    /// failed horizon becomes a zero-score degraded record and its
    /// siblings still run.
    async fn evaluate_horizons(&self, longitude: f64, latitude: f64) -> Vec<HorizonResult> {
        let mut results = Vec::with_capacity(MULTI_HORIZONS.len());
        for minutes in MULTI_HORIZONS {
            match self.evaluate_horizon(longitude, latitude, minutes).await {
                Ok(result) => results.push(result),
                Err(err) => {
                    log::warn!("Horizon {minutes}min failed: {err}");
                    results.push(HorizonResult::failed(
                        minutes,
                        format!("multi-time failed for {minutes}min: {err}"),
                    ));
                }
            }
        }
        results
    }

    /// Runs the single-horizon sub-pipeline for the multi-horizon loop.
    async fn evaluate_horizon(
        &self,
        longitude: f64,
        latitude: f64,
        minutes: u32,
    ) -> Result<HorizonResult, AnalysisError> {
        let catchment =
            build_isochrone(&self.client, &self.ors_api_key, longitude, latitude, minutes).await?;
        let population = shared_grid()?.estimate_population(&catchment.polygon);
        let competition =
            fetch_competition(&self.client, &catchment.polygon, &self.thresholds).await;
        let score = score_location(population, &competition, &self.thresholds);

        let error = match &competition {
            CompetitionSignal::Unknown { error } => Some(error.clone()),
            CompetitionSignal::Known { .. } => None,
        };

        Ok(HorizonResult {
            minutes,
            population: Some(population),
            stations: competition.stations(),
            density: competition.density(),
            score,
            error,
        })
    }

    /// Evaluates several addresses under the same settings and ranks
    /// them by descending score. One address failing does not abort
    /// the others.
    pub async fn compare(
        &self,
        addresses: &[String],
        template: &AnalysisRequest,
    ) -> Vec<RankedSite> {
        let mut sites = Vec::with_capacity(addresses.len());

        for address in addresses {
            let request = AnalysisRequest {
                address: address.clone(),
                ..template.clone()
            };
            match self.run(&request).await {
                Ok(report) => sites.push(RankedSite {
                    address: address.clone(),
                    report: Some(report),
                    error: None,
                }),
                Err(err) => {
                    log::warn!("Compare analysis failed for '{address}': {err}");
                    sites.push(RankedSite {
                        address: address.clone(),
                        report: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        rank_sites(&mut sites);
        sites
    }
}
