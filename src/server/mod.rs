pub mod routes;
pub mod ws;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

/// REST + WS routes, with the form page served as the fallback.
pub fn router(state: Arc<AppState>) -> Router {
    let dashboard = state.config.dashboard_dir.clone();

    Router::new()
        .route("/api/kelly/annual", post(routes::post_annual))
        .route("/api/kelly/fraction", post(routes::post_fraction))
        .route("/api/kelly/default", get(routes::get_default))
        .route("/api/counters", get(routes::get_counters))
        .route("/ws", get(ws::ws_handler))
        .fallback_service(
            ServeDir::new(&dashboard).fallback(ServeFile::new(dashboard.join("index.html"))),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
