//! Overpass API client for charging-station lookups.
//!
//! Queries by bounding box (stable against Overpass quirks) and leaves
//! the accurate polygon filtering to [`crate::signal`]. Several public
//! mirrors are tried in order; when all of them fail the caller gets
//! the degraded [`CompetitionSignal::Unknown`] variant, never an error.

use chrono::Utc;
use geo::{BoundingRect, MultiPolygon};
use serde::Deserialize;
use siteline_models::{CompetitionSignal, Thresholds};

use crate::{CompetitionError, signal};
use crate::signal::RawElement;

/// Public Overpass mirrors, tried in order.
pub const OVERPASS_URLS: &[&str] = &[
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
];

/// Overpass response envelope.
#[derive(Debug, Deserialize)]
struct OverpassResponse {
    osm3s: Option<Osm3s>,
    /// Older mirrors put the snapshot timestamp at the top level.
    osm_base: Option<String>,
    #[serde(default)]
    elements: Vec<RawElement>,
}

#[derive(Debug, Deserialize)]
struct Osm3s {
    timestamp_osm_base: Option<String>,
}

/// Fetches charging-station competitors for a catchment polygon.
///
/// Tries each configured mirror in order and converts any failure into
/// [`CompetitionSignal::Unknown`] with the last error attached, so the
/// pipeline continues with a penalized-but-valid score.
pub async fn fetch_competition(
    client: &reqwest::Client,
    catchment: &MultiPolygon<f64>,
    thresholds: &Thresholds,
) -> CompetitionSignal {
    let query = match bbox_query(catchment) {
        Ok(query) => query,
        Err(err) => return err.into(),
    };

    let mut last_err = None;

    for url in OVERPASS_URLS {
        match fetch_from(client, url, &query).await {
            Ok((elements, osm_base)) => {
                return signal::build_signal(
                    catchment,
                    &elements,
                    osm_base,
                    Utc::now(),
                    thresholds,
                );
            }
            Err(err) => {
                log::warn!("Overpass mirror {url} failed: {err}");
                last_err = Some(format!("{url}: {err}"));
            }
        }
    }

    let error = last_err.unwrap_or_else(|| "no Overpass mirrors configured".to_string());
    log::warn!("All Overpass mirrors failed, returning unknown competition: {error}");
    CompetitionSignal::Unknown { error }
}

/// Builds the Overpass QL query for the catchment's bounding box.
fn bbox_query(catchment: &MultiPolygon<f64>) -> Result<String, CompetitionError> {
    let rect = catchment
        .bounding_rect()
        .ok_or(CompetitionError::EmptyCatchment)?;
    let (south, west, north, east) = (
        rect.min().y,
        rect.min().x,
        rect.max().y,
        rect.max().x,
    );

    Ok(format!(
        "[out:json][timeout:40];\n\
         (\n\
           node[\"amenity\"=\"charging_station\"]({south},{west},{north},{east});\n\
           way[\"amenity\"=\"charging_station\"]({south},{west},{north},{east});\n\
           relation[\"amenity\"=\"charging_station\"]({south},{west},{north},{east});\n\
         );\n\
         out center tags;"
    ))
}

/// Runs the query against one mirror and parses the payload.
async fn fetch_from(
    client: &reqwest::Client,
    url: &str,
    query: &str,
) -> Result<(Vec<RawElement>, Option<String>), CompetitionError> {
    let resp = client
        .post(url)
        .body(query.to_string())
        .send()
        .await?
        .error_for_status()?;

    // Overpass serves HTML when rate-limited or under maintenance.
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();
    if !content_type.contains("json") {
        return Err(CompetitionError::NonJson { content_type });
    }

    let body: serde_json::Value = resp.json().await?;
    parse_payload(body)
}

/// Extracts the elements and snapshot timestamp from a response body.
fn parse_payload(
    body: serde_json::Value,
) -> Result<(Vec<RawElement>, Option<String>), CompetitionError> {
    let response: OverpassResponse =
        serde_json::from_value(body).map_err(|e| CompetitionError::Parse {
            message: format!("Malformed Overpass payload: {e}"),
        })?;

    let osm_base = response
        .osm3s
        .and_then(|o| o.timestamp_osm_base)
        .or(response.osm_base);

    Ok((response.elements, osm_base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn parses_payload_with_osm3s_timestamp() {
        let body = serde_json::json!({
            "osm3s": { "timestamp_osm_base": "2026-08-01T10:00:00Z" },
            "elements": [
                { "type": "node", "id": 1, "lat": 48.1, "lon": 11.5, "tags": {} },
                { "type": "way", "id": 2, "center": { "lat": 48.2, "lon": 11.6 } }
            ]
        });
        let (elements, osm_base) = parse_payload(body).unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(osm_base.as_deref(), Some("2026-08-01T10:00:00Z"));
    }

    #[test]
    fn falls_back_to_top_level_osm_base() {
        let body = serde_json::json!({
            "osm_base": "2026-07-01T00:00:00Z",
            "elements": []
        });
        let (_, osm_base) = parse_payload(body).unwrap();
        assert_eq!(osm_base.as_deref(), Some("2026-07-01T00:00:00Z"));
    }

    #[test]
    fn malformed_payload_is_a_parse_error() {
        let body = serde_json::json!({ "elements": "not-a-list" });
        let err = parse_payload(body).unwrap_err();
        assert!(matches!(err, CompetitionError::Parse { .. }));

        let signal: CompetitionSignal = err.into();
        assert!(matches!(signal, CompetitionSignal::Unknown { .. }));
    }

    #[test]
    fn bbox_query_covers_catchment_bounds() {
        let catchment = MultiPolygon(vec![polygon![
            (x: 11.0, y: 48.0),
            (x: 12.0, y: 48.0),
            (x: 12.0, y: 49.0),
            (x: 11.0, y: 49.0),
        ]]);
        let query = bbox_query(&catchment).unwrap();
        assert!(query.contains("(48,11,49,12)"));
        assert!(query.contains("charging_station"));
    }

    #[test]
    fn empty_catchment_cannot_be_queried() {
        let catchment = MultiPolygon::<f64>(vec![]);
        assert!(matches!(
            bbox_query(&catchment),
            Err(CompetitionError::EmptyCatchment)
        ));
    }
}
