use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::infra::app_state::AppState;

pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<Value>, StatusCode> {
    let mut health_status = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });

    match state.store.count().await {
        Ok(total_events) => {
            health_status["checks"]["database"] = json!({
                "status": "healthy",
                "total_events": total_events,
            });
            Ok(Json(health_status))
        }
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
