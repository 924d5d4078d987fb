#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Nominatim / OpenStreetMap address resolution.
//!
//! Resolves free-form addresses to coordinates with a fallback-candidate
//! strategy tuned for highway service areas: the original address is
//! tried first (scoped to Germany), then a simplified variant with
//! autobahn vocabulary stripped. Which query produced the match is
//! reported in [`GeocodeMeta`] so the confidence rater can downgrade
//! fallback matches.
//!
//! Nominatim has strict rate limits (1 request per second on the public
//! instance); the caller is responsible for pacing.

pub mod candidates;

use siteline_models::GeocodeMeta;
use thiserror::Error;

pub use candidates::query_candidates;

/// Nominatim search endpoint.
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

/// A resolved address with coordinates and match metadata.
#[derive(Debug, Clone)]
pub struct ResolvedAddress {
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Which query matched and whether it was a fallback.
    pub meta: GeocodeMeta,
}

/// Errors from address resolution.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// No candidate query produced a match.
    #[error("Geocoding failed for address: {address}")]
    NoMatch {
        /// The address as given by the caller.
        address: String,
    },
}

/// Resolves an address to coordinates, trying fallback candidates in
/// order until one matches.
///
/// # Errors
///
/// Returns [`GeocodeError::NoMatch`] when every candidate comes back
/// empty, or an HTTP/parse error if a request itself fails.
pub async fn geocode(
    client: &reqwest::Client,
    address: &str,
) -> Result<ResolvedAddress, GeocodeError> {
    let candidates = query_candidates(address);
    let primary = candidates.first().cloned().unwrap_or_default();

    for query in &candidates {
        log::debug!("Geocoding attempt: {query}");
        let Some((longitude, latitude)) = search(client, query).await? else {
            continue;
        };

        let fallback_used = *query != primary;
        if fallback_used {
            log::warn!("Address '{address}' only matched via fallback query '{query}'");
        }

        return Ok(ResolvedAddress {
            longitude,
            latitude,
            meta: GeocodeMeta {
                matched_query: Some(query.clone()),
                fallback_used: Some(fallback_used),
            },
        });
    }

    Err(GeocodeError::NoMatch {
        address: address.to_string(),
    })
}

/// Runs a single Nominatim search query.
async fn search(
    client: &reqwest::Client,
    query: &str,
) -> Result<Option<(f64, f64)>, GeocodeError> {
    let resp = client
        .get(NOMINATIM_URL)
        .query(&[
            ("q", query),
            ("format", "json"),
            ("limit", "1"),
            ("countrycodes", "de"),
        ])
        .send()
        .await?
        .error_for_status()?;

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses a Nominatim JSON response into a lon/lat pair.
fn parse_response(body: &serde_json::Value) -> Result<Option<(f64, f64)>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    Ok(Some((lon, lat)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nominatim_result() {
        let body = serde_json::json!([{
            "lat": "48.1371",
            "lon": "11.5754",
            "display_name": "Marienplatz, München, Bayern, Deutschland"
        }]);
        let (lon, lat) = parse_response(&body).unwrap().unwrap();
        assert!((lat - 48.1371).abs() < 1e-4);
        assert!((lon - 11.5754).abs() < 1e-4);
    }

    #[test]
    fn parses_nominatim_empty() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_non_array_response() {
        let body = serde_json::json!({ "error": "rate limited" });
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }
}
