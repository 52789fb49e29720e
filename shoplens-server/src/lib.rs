//! Web front for the Shoplens storefront checker.
//!
//! Accepts a domain or URL, redirects to a per-subject page, and serves
//! that page either as a polling view (while a check runs in the
//! background) or as the rendered latest result from the event store.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;
pub mod web;

pub use infra::app_state::AppState;

/// Assemble the application router.
pub fn create_app(state: AppState) -> axum::Router {
    routes::create_router(state)
}
