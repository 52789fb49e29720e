//! Router-level tests: drive the app with in-memory state and a stubbed
//! transport, no network or real listener involved.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use shoplens_core::detect::transport::{
    FetchPolicy, ProbeResponse, ProbeTransport, TransportError,
};
use shoplens_core::{Detector, DetectorSettings, EventStore};
use shoplens_model::EventKind;
use shoplens_server::infra::config::Config;
use shoplens_server::{AppState, create_app};

/// Transport whose probes always fail; checks spawned during tests
/// terminate quickly with a failure event.
struct UnreachableTransport;

#[async_trait]
impl ProbeTransport for UnreachableTransport {
    async fn fetch(
        &self,
        _url: &str,
        _policy: &FetchPolicy,
    ) -> Result<ProbeResponse, TransportError> {
        Err(TransportError::Request("stubbed: no network".into()))
    }
}

async fn test_state() -> AppState {
    let store = EventStore::in_memory().await.unwrap();
    let detector = Arc::new(Detector::new(
        store.clone(),
        Arc::new(UnreachableTransport),
        DetectorSettings::default(),
    ));
    AppState::new(store, detector, Arc::new(Config::default()))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

#[tokio::test]
async fn landing_page_renders_the_form() {
    let app = create_app(test_state().await);
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("<form"));
    assert!(body.contains("name=\"url\""));
}

#[tokio::test]
async fn submission_redirects_to_subject_page() {
    let app = create_app(test_state().await);
    let request = Request::post("/")
        .header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(Body::from("url=HTTPS%3A%2F%2FWWW.Shop.Example%2Fcart"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/shop.example"
    );
}

#[tokio::test]
async fn empty_submission_is_rejected() {
    let app = create_app(test_state().await);
    let request = Request::post("/")
        .header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(Body::from("url="))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_domain_submission_is_rejected() {
    let app = create_app(test_state().await);
    let request = Request::post("/")
        .header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(Body::from("url=not%20a%20domain"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_for_unseen_subject_reports_in_progress() {
    let app = create_app(test_state().await);
    let response = app
        .oneshot(
            Request::get("/status/fresh.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "in_progress");
    assert_eq!(body["is_shopify"], false);
}

#[tokio::test]
async fn status_reflects_a_recorded_success() {
    let state = test_state().await;
    state
        .store
        .append(
            "shop.example",
            EventKind::AnalysisSucceeded,
            Some(json!({"reason": "Found 'myshopify' in page content"})),
        )
        .await
        .unwrap();

    let app = create_app(state);
    let response = app
        .oneshot(
            Request::get("/status/shop.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["status"], "succeeded");
    assert_eq!(body["is_shopify"], true);
    assert_eq!(body["reason"], "Found 'myshopify' in page content");
}

#[tokio::test]
async fn status_reflects_a_recorded_failure() {
    let state = test_state().await;
    state
        .store
        .append(
            "shop.example",
            EventKind::AnalysisFailed,
            Some(json!({"error": "HTTP status code not 200: 503"})),
        )
        .await
        .unwrap();

    let app = create_app(state);
    let response = app
        .oneshot(
            Request::get("/status/shop.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["status"], "failed");
    assert_eq!(body["is_shopify"], false);
    assert_eq!(body["reason"], "HTTP status code not 200: 503");
}

#[tokio::test]
async fn subject_page_shows_polling_view_while_check_is_running() {
    let state = test_state().await;
    state
        .store
        .append("shop.example", EventKind::AnalysisStarted, None)
        .await
        .unwrap();

    let app = create_app(state);
    let response = app
        .oneshot(
            Request::get("/shop.example").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("/status/shop.example"));
}

#[tokio::test]
async fn subject_page_renders_a_terminal_result() {
    let state = test_state().await;
    state
        .store
        .append(
            "shop.example",
            EventKind::AnalysisSucceeded,
            Some(json!({"reason": "Found 'cdn.shopify.com' in page content"})),
        )
        .await
        .unwrap();

    let app = create_app(state);
    let response = app
        .oneshot(
            Request::get("/shop.example").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("is a Shopify store"));
    assert!(body.contains("cdn.shopify.com"));
}

#[tokio::test]
async fn subject_page_for_unseen_subject_records_a_check() {
    let state = test_state().await;
    let app = create_app(state.clone());

    let response = app
        .oneshot(
            Request::get("/fresh.example").body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The spawned check runs against the stubbed transport and settles as
    // a failure; wait for it to land rather than sleeping.
    let mut latest = None;
    for _ in 0..50 {
        latest = state.store.latest("fresh.example").await.unwrap();
        if latest
            .as_ref()
            .and_then(|event| event.kind())
            .is_some_and(|kind| kind.is_terminal())
        {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    let latest = latest.expect("spawned check should have recorded events");
    assert_eq!(latest.kind(), Some(EventKind::AnalysisFailed));
}

#[tokio::test]
async fn subject_page_rejects_garbage_paths() {
    let app = create_app(test_state().await);
    let response = app
        .oneshot(Request::get("/%20").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_database_state() {
    let app = create_app(test_state().await);
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn favicon_is_served_as_png() {
    let app = create_app(test_state().await);
    let response = app
        .oneshot(Request::get("/favicon.ico").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
}
