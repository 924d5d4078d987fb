//! Compile-time registry of analysis verticals.
//!
//! Each vertical defines the customer-facing labels and which plans may
//! run the multi-horizon analysis. Entries are TOML files embedded via
//! `include_str!`; adding a vertical means adding a file under
//! `verticals/` and an entry here.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of registered verticals. Updated when new verticals are
/// added. Enforced by a test.
#[cfg(test)]
const EXPECTED_VERTICAL_COUNT: usize = 1;

/// Embedded TOML vertical definitions.
const VERTICAL_TOMLS: &[(&str, &str)] = &[(
    "ev_charging",
    include_str!("../verticals/ev_charging.toml"),
)];

/// The vertical every unknown key falls back to.
pub const DEFAULT_VERTICAL: &str = "ev_charging";

/// Purchasable plan tier.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Plan {
    /// Base report.
    Standard,
    /// Faster turnaround, same analysis.
    Express,
    /// Full analysis including multi-horizon stability.
    Pro,
}

/// Drive-time profile shorthand.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Profile {
    /// Dense city locations.
    Urban,
    /// Everyday errand locations.
    Daily,
    /// Destination charging (retail, leisure).
    Destination,
    /// Sparse rural locations.
    Rural,
}

impl Profile {
    /// Drive-time budget for this profile, in minutes.
    #[must_use]
    pub const fn minutes(self) -> u32 {
        match self {
            Self::Urban => 8,
            Self::Daily => 15,
            Self::Destination => 25,
            Self::Rural => 30,
        }
    }
}

/// An analysis vertical, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerticalConfig {
    /// Unique vertical identifier (e.g. `"ev_charging"`).
    pub key: String,
    /// Human-readable name.
    pub label: String,
    /// Title for rendered reports.
    pub report_title: String,
    /// Subtitle for rendered reports.
    pub report_subtitle: String,
    /// Profile applied when the request names neither minutes nor a
    /// profile.
    pub default_profile: Profile,
    /// Plans allowed to run the multi-horizon analysis.
    pub multi_time_plans: Vec<Plan>,
}

impl VerticalConfig {
    /// Whether the given plan may run multi-horizon analysis in this
    /// vertical.
    #[must_use]
    pub fn allows_multi_time(&self, plan: Plan) -> bool {
        self.multi_time_plans.contains(&plan)
    }
}

/// Returns all registered verticals.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught during CI.
#[must_use]
pub fn all_verticals() -> Vec<VerticalConfig> {
    VERTICAL_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse vertical '{name}': {e}"))
        })
        .collect()
}

/// Looks up a vertical by key, falling back to [`DEFAULT_VERTICAL`] for
/// unknown keys.
#[must_use]
pub fn get_vertical(key: &str) -> VerticalConfig {
    let mut verticals = all_verticals();
    if let Some(index) = verticals.iter().position(|v| v.key == key) {
        return verticals.swap_remove(index);
    }
    verticals
        .into_iter()
        .find(|v| v.key == DEFAULT_VERTICAL)
        .expect("default vertical must be registered")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_verticals() {
        let verticals = all_verticals();
        assert_eq!(
            verticals.len(),
            EXPECTED_VERTICAL_COUNT,
            "Expected {EXPECTED_VERTICAL_COUNT} verticals, found {}. \
             Update EXPECTED_VERTICAL_COUNT after adding/removing verticals.",
            verticals.len()
        );
    }

    #[test]
    fn unknown_key_falls_back_to_default() {
        let vertical = get_vertical("parcel_lockers");
        assert_eq!(vertical.key, DEFAULT_VERTICAL);
    }

    #[test]
    fn ev_charging_gates_multi_time_to_pro() {
        let vertical = get_vertical("ev_charging");
        assert!(vertical.allows_multi_time(Plan::Pro));
        assert!(!vertical.allows_multi_time(Plan::Standard));
        assert!(!vertical.allows_multi_time(Plan::Express));
    }

    #[test]
    fn profile_minutes() {
        assert_eq!(Profile::Urban.minutes(), 8);
        assert_eq!(Profile::Daily.minutes(), 15);
        assert_eq!(Profile::Destination.minutes(), 25);
        assert_eq!(Profile::Rural.minutes(), 30);
    }
}
