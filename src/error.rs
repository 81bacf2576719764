//! Dispatch error taxonomy.
//!
//! Every variant renders as a JSON body carrying at least a `detail` string,
//! so no failure path reaches the client as an unstructured response.

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::routing::ServiceIdentifier;

/// Errors produced while dispatching one request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Unknown path segment, or a known service with no configured route.
    #[error("Service {0} not found")]
    ServiceNotFound(String),

    /// The dispatcher does not forward this verb.
    #[error("Method {0} not allowed")]
    MethodNotAllowed(Method),

    /// Connection, timeout or transport failure talking to the backend.
    #[error("Service {service} unavailable")]
    UpstreamUnavailable {
        service: ServiceIdentifier,
        #[source]
        source: reqwest::Error,
    },

    /// Anything unanticipated. The message is logged, never sent to the client.
    #[error("Internal gateway error")]
    Internal(String),
}

impl DispatchError {
    /// HTTP status the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::ServiceNotFound(_) => StatusCode::NOT_FOUND,
            DispatchError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::ServiceNotFound(_) => "service_not_found",
            DispatchError::MethodNotAllowed(_) => "method_not_allowed",
            DispatchError::UpstreamUnavailable { source, .. } if source.is_timeout() => "timeout",
            DispatchError::UpstreamUnavailable { .. } => "unavailable",
            DispatchError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        match &self {
            DispatchError::UpstreamUnavailable { service, source } => {
                tracing::error!(service = %service, error = %source, "Upstream unavailable");
            }
            DispatchError::Internal(cause) => {
                tracing::error!(cause = %cause, "Internal dispatch error");
            }
            _ => {}
        }
        detail_response(self.status_code(), self.to_string())
    }
}

/// JSON `{"detail": ...}` response for failures outside the dispatch taxonomy,
/// such as extractor rejections.
pub fn detail_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": detail.into() }))).into_response()
}
