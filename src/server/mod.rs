mod handlers;
mod static_files;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::app::{self, AppState};
use crate::config::Config;
use crate::map::ClusterReady;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/status", get(handlers::status))
        .route("/api/stations", get(handlers::stations))
        .route("/api/map", get(handlers::map_view))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/style.css", get(handlers::style))
        .route("/app.js", get(handlers::script))
        .merge(api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the map, load stations in the background, and tear the map down on Ctrl+C.
pub async fn run(config: Config) -> std::io::Result<()> {
    let state = Arc::new(AppState::new(&config));

    // Clustering readiness
    let ready = ClusterReady::prepare(config.cluster);
    let ready_state = Arc::clone(&state);
    tokio::spawn(async move {
        match ready.wait().await {
            Some(engine) => ready_state.mark_ready(engine),
            None => warn!("marker clustering never became ready"),
        }
    });

    // One-shot station load, blocking and sequential
    let loader = app::build_loader(&config);
    let load_state = Arc::clone(&state);
    tokio::task::spawn_blocking(move || app::run_load(&load_state, &loader));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("EV map server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    let shutdown_state = Arc::clone(&state);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown_state.teardown();
            info!("shutting down");
        })
        .await
}
