#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Drive-time catchment polygon client (openrouteservice isochrones).
//!
//! Produces the catchment polygon for an origin point and a drive-time
//! budget. A failure here aborts analysis for the requesting horizon
//! only; multi-horizon evaluation records it as a degraded result and
//! keeps going.

use geo::{GeodesicArea, MultiPolygon};
use geojson::GeoJson;
use thiserror::Error;

/// Isochrone endpoint for the driving-car profile.
pub const ORS_URL: &str = "https://api.openrouteservice.org/v2/isochrones/driving-car";

/// Environment variable holding the openrouteservice API key.
pub const ORS_API_KEY_ENV: &str = "ORS_API_KEY";

/// A drive-time catchment polygon in geodetic (WGS84) coordinates.
///
/// Immutable once produced; the producer is responsible for returning
/// a non-empty, non-self-intersecting polygon.
#[derive(Debug, Clone)]
pub struct Catchment {
    /// The reachable area within the drive-time budget.
    pub polygon: MultiPolygon<f64>,
}

impl Catchment {
    /// Catchment area in km², measured geodesically on the WGS84
    /// ellipsoid.
    #[must_use]
    pub fn area_km2(&self) -> f64 {
        self.polygon.geodesic_area_unsigned() / 1_000_000.0
    }
}

/// Errors from catchment polygon acquisition.
#[derive(Debug, Error)]
pub enum IsochroneError {
    /// The API key is not configured. This is a deployment error, not a
    /// per-request condition.
    #[error("Missing {ORS_API_KEY_ENV} env var. Set it before starting the server.")]
    MissingApiKey,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// Fetches the catchment polygon reachable within `minutes` of driving
/// from the origin point.
///
/// # Errors
///
/// Returns an [`IsochroneError`] if the request fails or the response
/// carries no polygon. The caller treats this as a per-horizon failure.
pub async fn build_isochrone(
    client: &reqwest::Client,
    api_key: &str,
    longitude: f64,
    latitude: f64,
    minutes: u32,
) -> Result<Catchment, IsochroneError> {
    let body = serde_json::json!({
        "locations": [[longitude, latitude]],
        "range": [minutes * 60],
        "attributes": ["area"],
    });

    let resp = client
        .post(ORS_URL)
        .header("Authorization", api_key)
        .json(&body)
        .send()
        .await?
        .error_for_status()?;

    let payload: serde_json::Value = resp.json().await?;
    let polygon = parse_feature_collection(&payload)?;
    log::debug!("Built {minutes}-minute isochrone around ({longitude}, {latitude})");
    Ok(Catchment { polygon })
}

/// Extracts the first feature's polygon from an isochrone response.
fn parse_feature_collection(payload: &serde_json::Value) -> Result<MultiPolygon<f64>, IsochroneError> {
    let geojson: GeoJson =
        serde_json::from_value(payload.clone()).map_err(|e| IsochroneError::Parse {
            message: format!("Invalid GeoJSON: {e}"),
        })?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(IsochroneError::Parse {
            message: "Isochrone response is not a FeatureCollection".to_string(),
        });
    };

    let feature = collection
        .features
        .into_iter()
        .next()
        .ok_or_else(|| IsochroneError::Parse {
            message: "Isochrone response has no features".to_string(),
        })?;

    let geometry = feature.geometry.ok_or_else(|| IsochroneError::Parse {
        message: "Isochrone feature has no geometry".to_string(),
    })?;

    let geo_geom: geo::Geometry<f64> =
        geometry.try_into().map_err(|e| IsochroneError::Parse {
            message: format!("Unsupported isochrone geometry: {e}"),
        })?;

    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Ok(mp),
        geo::Geometry::Polygon(p) => Ok(MultiPolygon(vec![p])),
        _ => Err(IsochroneError::Parse {
            message: "Isochrone geometry is not a polygon".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_isochrone_polygon() {
        let payload = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "value": 900.0 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[11.0, 48.0], [11.2, 48.0], [11.2, 48.2], [11.0, 48.2], [11.0, 48.0]]]
                }
            }]
        });
        let polygon = parse_feature_collection(&payload).unwrap();
        assert_eq!(polygon.0.len(), 1);
    }

    #[test]
    fn empty_feature_collection_is_an_error() {
        let payload = serde_json::json!({ "type": "FeatureCollection", "features": [] });
        assert!(matches!(
            parse_feature_collection(&payload),
            Err(IsochroneError::Parse { .. })
        ));
    }

    #[test]
    fn area_of_a_degree_square_is_plausible() {
        let payload = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[11.0, 48.0], [12.0, 48.0], [12.0, 49.0], [11.0, 49.0], [11.0, 48.0]]]
                }
            }]
        });
        let catchment = Catchment {
            polygon: parse_feature_collection(&payload).unwrap(),
        };
        // A 1°x1° cell at ~48°N is roughly 8200 km².
        let area = catchment.area_km2();
        assert!(area > 7_000.0 && area < 9_500.0, "area was {area}");
    }
}
