#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the siteline server.
//!
//! These types are serialized to JSON for the REST API. They are
//! separate from the pipeline types to allow independent evolution of
//! the API contract.

use serde::{Deserialize, Serialize};
use siteline_analysis::{AnalysisRequest, Plan, Profile};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server considers itself healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeParams {
    /// Free-form address of the candidate site.
    pub address: String,
    /// Vertical key; unknown keys fall back to the default vertical.
    #[serde(default = "default_vertical")]
    pub vertical: String,
    /// Explicit drive-time budget in minutes.
    pub minutes: Option<u32>,
    /// Drive-time profile shorthand.
    pub profile: Option<Profile>,
    /// Whether to run the multi-horizon analysis (plan permitting).
    #[serde(default)]
    pub multi_time: bool,
    /// Purchased plan tier.
    #[serde(default = "default_plan")]
    pub plan: Plan,
}

impl AnalyzeParams {
    /// Converts the API request into a pipeline request.
    #[must_use]
    pub fn into_request(self) -> AnalysisRequest {
        AnalysisRequest {
            address: self.address,
            vertical: self.vertical,
            minutes: self.minutes,
            profile: self.profile,
            multi_time: self.multi_time,
            plan: self.plan,
        }
    }
}

/// Body of `POST /api/compare`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareParams {
    /// Candidate addresses to evaluate and rank.
    pub addresses: Vec<String>,
    /// Vertical key; unknown keys fall back to the default vertical.
    #[serde(default = "default_vertical")]
    pub vertical: String,
    /// Explicit drive-time budget in minutes.
    pub minutes: Option<u32>,
    /// Drive-time profile shorthand.
    pub profile: Option<Profile>,
    /// Whether to run the multi-horizon analysis (plan permitting).
    #[serde(default)]
    pub multi_time: bool,
    /// Purchased plan tier.
    #[serde(default = "default_plan")]
    pub plan: Plan,
}

impl CompareParams {
    /// Builds the shared pipeline request template (address filled in
    /// per candidate).
    #[must_use]
    pub fn request_template(&self) -> AnalysisRequest {
        AnalysisRequest {
            address: String::new(),
            vertical: self.vertical.clone(),
            minutes: self.minutes,
            profile: self.profile,
            multi_time: self.multi_time,
            plan: self.plan,
        }
    }
}

fn default_vertical() -> String {
    siteline_analysis::verticals::DEFAULT_VERTICAL.to_string()
}

const fn default_plan() -> Plan {
    Plan::Standard
}
