//! Request dispatch.
//!
//! # Responsibilities
//! - Resolve the target service and rewrite the path
//! - Forward through one pooled upstream client
//! - Normalize the response or classify the failure
//!
//! # Design Decisions
//! - Redirects are relayed to the caller, not followed
//! - Timeouts live on the client, so a slow upstream surfaces as
//!   `UpstreamUnavailable` like any other transport failure
//! - A dropped handler future cancels the upstream call

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, Method};
use reqwest::redirect::Policy;

use crate::config::TimeoutConfig;
use crate::error::DispatchError;
use crate::http::response::NormalizedResponse;
use crate::observability::metrics;
use crate::proxy::forwarder::{ForwardedRequest, RequestPayload};
use crate::routing::{RouteTable, ServiceIdentifier};

/// Forwards inbound calls to backend services.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    routes: Arc<RouteTable>,
    client: reqwest::Client,
}

impl Dispatcher {
    /// Create a dispatcher with a pooled client honoring `timeouts`.
    pub fn new(routes: Arc<RouteTable>, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()?;

        Ok(Self { routes, client })
    }

    /// Forward one request to `service`.
    ///
    /// `path` is the remainder after `/api/v1/{service}`, with or without a
    /// leading slash.
    pub async fn dispatch(
        &self,
        service: ServiceIdentifier,
        method: Method,
        path: &str,
        headers: &HeaderMap,
        payload: RequestPayload,
    ) -> Result<NormalizedResponse, DispatchError> {
        let start = Instant::now();

        let result = self.forward(service, &method, path, headers, payload).await;

        let status = match &result {
            Ok(response) => response.status,
            Err(e) => {
                metrics::record_upstream_error(service.as_str(), e.kind());
                e.status_code()
            }
        };
        metrics::record_request(service.as_str(), method.as_str(), status.as_u16(), start);

        result
    }

    async fn forward(
        &self,
        service: ServiceIdentifier,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        payload: RequestPayload,
    ) -> Result<NormalizedResponse, DispatchError> {
        let route = self.routes.resolve(service)?;
        let target_url = route.target_url(path);

        let request = ForwardedRequest::build(method, target_url, headers, payload)?;

        tracing::info!(
            service = %service,
            method = %method,
            upstream = %request.url,
            "Forwarding request"
        );

        let response = request
            .send(&self.client)
            .await
            .map_err(|e| classify(service, e))?;

        let status = response.status();
        let normalized = NormalizedResponse::from_upstream(response)
            .await
            .map_err(|e| classify(service, e))?;

        tracing::debug!(service = %service, status = %status, "Upstream responded");

        Ok(normalized)
    }
}

/// Map a client error onto the dispatch taxonomy.
fn classify(service: ServiceIdentifier, error: reqwest::Error) -> DispatchError {
    if error.is_builder() {
        return DispatchError::Internal(format!("failed to build upstream request: {error}"));
    }
    if error.is_timeout() {
        tracing::warn!(service = %service, "Upstream timed out");
    }
    DispatchError::UpstreamUnavailable {
        service,
        source: error,
    }
}
