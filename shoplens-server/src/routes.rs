use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::{assets, health, pages, status};
use crate::infra::app_state::AppState;

/// Assemble all routes. Static paths are registered alongside the
/// `/{domain}` catch-all; the router prefers the more specific match.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::landing).post(pages::submit))
        .route("/health", get(health::health))
        .route("/favicon.ico", get(assets::favicon))
        .route("/status/{domain}", get(status::status))
        .route("/{domain}", get(pages::subject_page))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
