//! Builds a [`CompetitionSignal`] from raw competitor features.
//!
//! Filtering rules, in order: deduplicate by provider identity
//! (type + id, first occurrence wins), drop features tagged
//! `access=private` or `access=no`, resolve each feature to a
//! coordinate (own position for nodes, provided center for ways and
//! relations), and keep only coordinates inside or on the boundary of
//! the catchment polygon.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use geo::{Intersects, MultiPolygon, Point};
use serde::Deserialize;
use siteline_models::{CompetitionSignal, Density, Thresholds};

/// A raw competitor feature as returned by the upstream source.
#[derive(Debug, Clone, Deserialize)]
pub struct RawElement {
    /// Provider element kind (`node`, `way`, `relation`).
    #[serde(rename = "type")]
    pub element_type: String,
    /// Provider-assigned element id.
    pub id: i64,
    /// Latitude, present for point features.
    pub lat: Option<f64>,
    /// Longitude, present for point features.
    pub lon: Option<f64>,
    /// Centroid, present for aggregate (way/relation) features.
    pub center: Option<Center>,
    /// Raw feature tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Centroid of an aggregate feature.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Center {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

impl RawElement {
    /// Resolves the feature to a point: its own coordinate if present,
    /// else the provided center.
    #[must_use]
    pub fn point(&self) -> Option<Point<f64>> {
        match (self.lon, self.lat) {
            (Some(lon), Some(lat)) => Some(Point::new(lon, lat)),
            _ => self.center.map(|c| Point::new(c.lon, c.lat)),
        }
    }

    /// Whether the feature is tagged as not publicly accessible.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        self.tags
            .get("access")
            .is_some_and(|access| matches!(access.to_lowercase().as_str(), "private" | "no"))
    }
}

/// Counts publicly accessible competitors inside the catchment and
/// classifies their density.
#[must_use]
pub fn build_signal(
    catchment: &MultiPolygon<f64>,
    elements: &[RawElement],
    osm_base: Option<String>,
    queried_at: DateTime<Utc>,
    thresholds: &Thresholds,
) -> CompetitionSignal {
    let mut seen = BTreeSet::new();
    let mut stations = 0_u32;

    for element in elements {
        if !seen.insert((element.element_type.clone(), element.id)) {
            continue;
        }
        if element.is_restricted() {
            continue;
        }
        let Some(point) = element.point() else {
            continue;
        };
        // Boundary-inclusive: a station exactly on the catchment edge counts.
        if !catchment.intersects(&point) {
            continue;
        }
        stations += 1;
    }

    CompetitionSignal::Known {
        stations,
        density: Density::from_count(stations, thresholds),
        osm_base,
        queried_at,
    }
}
