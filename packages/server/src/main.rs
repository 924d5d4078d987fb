#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the siteline application.
//!
//! Serves the site evaluation endpoints: single-address analysis,
//! multi-address comparison, and a health check.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use siteline_analysis::Analyzer;

/// Shared application state.
pub struct AppState {
    /// The configured evaluation pipeline.
    pub analyzer: Analyzer,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    // Warm the grid eagerly so a missing or malformed grid file fails
    // the process at startup instead of the first request.
    log::info!("Loading population grid...");
    let grid = siteline_population::shared_grid().expect("Failed to load population grid");
    log::info!("Population grid ready ({} cells)", grid.len());

    let analyzer = Analyzer::from_env().expect("Failed to configure analyzer");
    let state = web::Data::new(AppState { analyzer });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/analyze", web::post().to(handlers::analyze))
                    .route("/compare", web::post().to(handlers::compare)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
