#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Competitor data fetching and competition signal building.
//!
//! Raw charging-station features are fetched from Overpass by bounding
//! box (stable), then filtered strictly against the catchment polygon
//! (accurate). Upstream failures never surface as errors: the public
//! entry point collapses them into [`CompetitionSignal::Unknown`] so
//! the rest of the pipeline can degrade gracefully.

pub mod overpass;
pub mod signal;

use thiserror::Error;

pub use overpass::fetch_competition;
pub use signal::build_signal;
use siteline_models::CompetitionSignal;

/// Errors from the Overpass fetch path.
///
/// These stay internal to this crate: the public API absorbs them into
/// the degraded [`CompetitionSignal::Unknown`] variant.
#[derive(Debug, Error)]
pub enum CompetitionError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The mirror answered with something other than JSON
    /// (rate limiting and maintenance pages come back as HTML).
    #[error("Overpass non-JSON response: {content_type}")]
    NonJson {
        /// The content type the mirror returned.
        content_type: String,
    },

    /// Response body parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The catchment polygon has no bounding box to query with.
    #[error("Catchment polygon is empty")]
    EmptyCatchment,
}

impl From<CompetitionError> for CompetitionSignal {
    fn from(err: CompetitionError) -> Self {
        Self::Unknown {
            error: err.to_string(),
        }
    }
}
