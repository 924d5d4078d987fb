//! HTTP handler functions for the siteline API.

use actix_web::{HttpResponse, web};
use siteline_analysis::AnalysisError;
use siteline_server_models::{AnalyzeParams, ApiHealth, CompareParams};

use crate::AppState;

/// Minimum number of addresses for a comparison.
const MIN_COMPARE_ADDRESSES: usize = 2;

/// Maximum number of addresses per comparison.
const MAX_COMPARE_ADDRESSES: usize = 50;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/analyze`
///
/// Evaluates a single candidate address.
pub async fn analyze(state: web::Data<AppState>, params: web::Json<AnalyzeParams>) -> HttpResponse {
    let request = params.into_inner().into_request();

    match state.analyzer.run(&request).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(err) => error_response(&err),
    }
}

/// `POST /api/compare`
///
/// Evaluates several candidate addresses under identical settings and
/// returns them ranked by descending score.
pub async fn compare(state: web::Data<AppState>, params: web::Json<CompareParams>) -> HttpResponse {
    let params = params.into_inner();

    let addresses: Vec<String> = params
        .addresses
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();

    if addresses.len() < MIN_COMPARE_ADDRESSES {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Please provide at least 2 addresses"
        }));
    }
    if addresses.len() > MAX_COMPARE_ADDRESSES {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "At most 50 addresses per comparison"
        }));
    }

    let template = params.request_template();
    let ranked = state.analyzer.compare(&addresses, &template).await;
    HttpResponse::Ok().json(ranked)
}

/// Maps pipeline errors onto HTTP responses: unresolvable input is the
/// caller's problem, everything else is ours.
fn error_response(err: &AnalysisError) -> HttpResponse {
    match err {
        AnalysisError::Geocode(_) => {
            log::warn!("Analysis rejected: {err}");
            HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "error": err.to_string()
            }))
        }
        AnalysisError::Isochrone(_) | AnalysisError::Population(_) | AnalysisError::Http(_) => {
            log::error!("Analysis failed: {err}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Analysis failed"
            }))
        }
    }
}
