//! HTML-facing handlers: the landing form and the per-subject page.

use axum::{
    Form,
    extract::{Path, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tracing::info;

use shoplens_model::Hostname;

use crate::errors::{AppError, AppResult};
use crate::handlers::status::report_from_event;
use crate::infra::app_state::AppState;
use crate::web::templates;

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub url: String,
}

pub async fn landing() -> Html<String> {
    Html(templates::landing_page())
}

/// Validate the submission and bounce the browser to the subject page.
pub async fn submit(
    Form(form): Form<SubmitForm>,
) -> AppResult<Redirect> {
    let raw = form.url.trim();
    if raw.is_empty() {
        return Err(AppError::bad_request("URL is required"));
    }

    let host = Hostname::parse(raw)?;
    info!(domain = %host, "submission accepted");
    Ok(Redirect::to(&format!("/{host}")))
}

/// Per-subject page: kicks off a check for a never-seen subject and shows
/// the polling view until a terminal event exists, then the result.
pub async fn subject_page(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> AppResult<Html<String>> {
    let host = Hostname::parse(&raw)?;

    let latest = state.store.latest(host.as_str()).await?;
    match latest {
        None => {
            info!(domain = %host, "no check on record, starting one");
            state.spawn_check(host.as_str());
            Ok(Html(templates::polling_page(host.as_str())))
        }
        Some(event) if !event.kind().is_some_and(|kind| kind.is_terminal()) => {
            // Started (or unrecognized) means a run is still in flight;
            // keep polling rather than rendering a premature verdict.
            Ok(Html(templates::polling_page(host.as_str())))
        }
        Some(event) => {
            let report = report_from_event(&event);
            Ok(Html(templates::result_page(
                host.as_str(),
                report.is_shopify,
                report.reason.as_deref(),
            )))
        }
    }
}
