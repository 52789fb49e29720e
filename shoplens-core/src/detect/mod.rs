//! The detection routine: a single-shot, best-effort probe of a site for
//! Shopify markers, with every outcome recorded in the event store.
//!
//! A run appends `analysis_started` and then exactly one terminal event.
//! There is no retry and no deduplication of concurrent runs for the same
//! subject; callers fire and forget.

pub mod markers;
pub mod transport;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};

use shoplens_model::{EventKind, Hostname};

use crate::store::EventStore;
use markers::CheckoutMarker;
use transport::{FetchPolicy, ProbeTransport, ReqwestTransport};

/// Tunables for one detector instance.
#[derive(Debug, Clone)]
pub struct DetectorSettings {
    pub page_timeout: Duration,
    pub checkout_timeout: Duration,
    pub page_max_redirects: usize,
    pub checkout_max_redirects: usize,
    pub user_agent: String,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(15),
            checkout_timeout: Duration::from_secs(10),
            page_max_redirects: 3,
            checkout_max_redirects: 2,
            user_agent: format!("shoplens/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

pub struct Detector {
    store: EventStore,
    transport: Arc<dyn ProbeTransport>,
    settings: DetectorSettings,
}

impl fmt::Debug for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detector")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Detector {
    pub fn new(
        store: EventStore,
        transport: Arc<dyn ProbeTransport>,
        settings: DetectorSettings,
    ) -> Self {
        Self {
            store,
            transport,
            settings,
        }
    }

    /// Detector with the reqwest transport and default settings.
    pub fn with_defaults(store: EventStore) -> Self {
        let settings = DetectorSettings::default();
        let transport = Arc::new(ReqwestTransport::new(&settings.user_agent));
        Self::new(store, transport, settings)
    }

    /// Run one check against a raw subject string.
    ///
    /// Never returns an error: every outcome, including the inability to
    /// normalize the input, ends up in the event store, and append
    /// failures are logged and swallowed since no caller is waiting.
    pub async fn run(&self, input: &str) {
        info!(input, "starting storefront check");

        let host = match Hostname::parse(input) {
            Ok(host) => host,
            Err(err) => {
                warn!(input, error = %err, "could not normalize submission");
                self.record_failure(input, format!("Invalid domain: {input}"))
                    .await;
                return;
            }
        };

        if let Err(err) = self
            .store
            .append(host.as_str(), EventKind::AnalysisStarted, None)
            .await
        {
            warn!(domain = %host, error = %err, "failed to record check start");
            return;
        }

        let page_url = format!("https://{host}");
        let page_policy = FetchPolicy {
            max_redirects: self.settings.page_max_redirects,
            timeout: self.settings.page_timeout,
        };
        let response = match self.transport.fetch(&page_url, &page_policy).await
        {
            Ok(response) => response,
            Err(err) => {
                self.record_failure(host.as_str(), err.to_string()).await;
                return;
            }
        };

        if response.status != reqwest::StatusCode::OK {
            self.record_failure(
                host.as_str(),
                format!("HTTP status code not 200: {}", response.status),
            )
            .await;
            return;
        }

        if let Some(marker) = markers::scan_page(&response.body) {
            self.record_success(host.as_str(), marker.reason(), None).await;
            return;
        }

        // Nothing on the landing page; the checkout edge is the second and
        // last chance to identify the platform.
        let checkout_url = format!("https://checkout.{host}/checkout/cn");
        let checkout_policy = FetchPolicy {
            max_redirects: self.settings.checkout_max_redirects,
            timeout: self.settings.checkout_timeout,
        };
        let checkout = match self
            .transport
            .fetch(&checkout_url, &checkout_policy)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(domain = %host, error = %err, "checkout probe failed");
                self.record_failure(
                    host.as_str(),
                    "No Shopify indicators found in page content and \
                     checkout check failed",
                )
                .await;
                return;
            }
        };

        match markers::scan_checkout(&checkout.headers) {
            Some(marker) => {
                let shop_id = match &marker {
                    CheckoutMarker::ShopId(id) => Some(id.clone()),
                    CheckoutMarker::ServerHeader => None,
                };
                self.record_success(host.as_str(), marker.reason(), shop_id)
                    .await;
            }
            None => {
                self.record_failure(
                    host.as_str(),
                    "No Shopify indicators found in page content or \
                     checkout page",
                )
                .await;
            }
        }
    }

    async fn record_success(
        &self,
        domain: &str,
        reason: &str,
        shop_id: Option<String>,
    ) {
        info!(domain, reason, "storefront check succeeded");
        let mut payload = json!({ "reason": reason });
        if let Some(shop_id) = shop_id {
            payload["shopify_id"] = json!(shop_id);
        }
        if let Err(err) = self
            .store
            .append(domain, EventKind::AnalysisSucceeded, Some(payload))
            .await
        {
            warn!(domain, error = %err, "failed to record success event");
        }
    }

    async fn record_failure(&self, domain: &str, error: impl Into<String>) {
        let error = error.into();
        info!(domain, error = %error, "storefront check failed");
        if let Err(err) = self
            .store
            .append(
                domain,
                EventKind::AnalysisFailed,
                Some(json!({ "error": error })),
            )
            .await
        {
            warn!(domain, error = %err, "failed to record failure event");
        }
    }
}
