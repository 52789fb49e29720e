//! HTTP seam for the detector.
//!
//! The detector only ever needs "GET this URL under this policy and give
//! me status/headers/body", so that is the whole trait. Production wraps
//! reqwest; tests substitute a mock.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use reqwest::redirect;
use thiserror::Error;

/// Redirect and timeout budget for a single probe.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub max_redirects: usize,
    pub timeout: Duration,
}

/// Final response of a probe after any followed redirects.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Failed to make HTTP request: {0}")]
    Request(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        policy: &FetchPolicy,
    ) -> std::result::Result<ProbeResponse, TransportError>;
}

/// reqwest-backed transport. A client is built per probe because the
/// redirect cap differs between the landing-page and checkout requests.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    user_agent: String,
}

impl ReqwestTransport {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl ProbeTransport for ReqwestTransport {
    async fn fetch(
        &self,
        url: &str,
        policy: &FetchPolicy,
    ) -> std::result::Result<ProbeResponse, TransportError> {
        let max_redirects = policy.max_redirects;
        // Stop at the cap and hand back the last response instead of
        // erroring, so a redirect loop still yields inspectable headers.
        let redirect_policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= max_redirects {
                attempt.stop()
            } else {
                attempt.follow()
            }
        });
        let client = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .redirect(redirect_policy)
            .timeout(policy.timeout)
            .build()
            .map_err(|err| TransportError::Request(err.to_string()))?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::Body(err.to_string()))?;

        Ok(ProbeResponse {
            status,
            headers,
            body,
        })
    }
}
