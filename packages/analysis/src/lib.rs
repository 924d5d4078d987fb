#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Site evaluation pipeline orchestration.
//!
//! Wires the collaborators together for one request: address
//! resolution, catchment acquisition, population estimation,
//! competition lookup, scoring, confidence rating, and (for plans that
//! allow it) the multi-horizon loop feeding the stability analyzer.
//!
//! Failure policy follows the error taxonomy: configuration problems
//! (missing grid, missing API key) abort the request with a
//! diagnostic; upstream competition failures degrade the signal; a
//! failed horizon inside the multi-horizon loop becomes a zero-score
//! degraded record without aborting its siblings.

pub mod interpretation;
pub mod pipeline;
pub mod verticals;

use thiserror::Error;

pub use interpretation::interpret_score;
pub use pipeline::{
    AnalysisReport, AnalysisRequest, Analyzer, CORE_FAR_MINUTES, CORE_NEAR_MINUTES,
    DEFAULT_MINUTES, MULTI_HORIZONS, RankedSite, rank_sites,
};
pub use verticals::{Plan, Profile, VerticalConfig, get_vertical};

/// Errors that abort a whole analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The address could not be resolved to coordinates.
    #[error("Geocoding failed: {0}")]
    Geocode(#[from] siteline_geocoder::GeocodeError),

    /// The catchment polygon could not be acquired for the primary
    /// horizon.
    #[error("Catchment acquisition failed: {0}")]
    Isochrone(#[from] siteline_isochrone::IsochroneError),

    /// The population grid is missing or malformed (configuration
    /// error).
    #[error("Population grid unavailable: {0}")]
    Population(#[from] siteline_population::PopulationError),

    /// The shared HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
