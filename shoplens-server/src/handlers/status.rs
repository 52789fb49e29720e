//! JSON status endpoint backing the polling page and the browser
//! extension.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;

use shoplens_model::{EventKind, Hostname, StatusReport, StoredEvent};

use crate::errors::AppResult;
use crate::infra::app_state::AppState;

/// Map a stored event to the wire-level report. Reasons come from the
/// payload (`reason` on success, `error` on failure); a payload that does
/// not parse simply yields no reason.
pub fn report_from_event(event: &StoredEvent) -> StatusReport {
    match event.kind() {
        Some(EventKind::AnalysisSucceeded) => {
            StatusReport::succeeded(payload_field(event, "reason"))
        }
        Some(EventKind::AnalysisFailed) => {
            StatusReport::failed(payload_field(event, "error"))
        }
        // Started and anything unrecognized read as still running.
        _ => StatusReport::in_progress(),
    }
}

fn payload_field(event: &StoredEvent, key: &str) -> Option<String> {
    let raw = event.payload.as_deref()?;
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    value.get(key)?.as_str().map(str::to_owned)
}

pub async fn status(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> AppResult<Json<StatusReport>> {
    let host = Hostname::parse(&raw)?;

    match state.store.latest(host.as_str()).await? {
        None => {
            info!(domain = %host, "status poll for unseen subject, starting check");
            state.spawn_check(host.as_str());
            Ok(Json(StatusReport::in_progress()))
        }
        Some(event) => Ok(Json(report_from_event(&event))),
    }
}
