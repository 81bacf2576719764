//! Gateway route handlers.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{detail_response, DispatchError};
use crate::health::state::unix_now;
use crate::http::request::extract_inbound;
use crate::http::server::AppState;
use crate::routing::{ServiceIdentifier, UnknownService};

pub const GATEWAY_NAME: &str = "ESG Platform API Gateway";

#[derive(Debug, Deserialize)]
pub struct ProxyPath {
    service: String,
    #[serde(default)]
    path: String,
}

/// `/api/v1/{service}/{*path}`
pub async fn proxy_handler(
    State(state): State<AppState>,
    params: Result<Path<ProxyPath>, PathRejection>,
    request: Request,
) -> Response {
    let Path(params) = match params {
        Ok(params) => params,
        Err(rejection) => return detail_response(rejection.status(), rejection.body_text()),
    };

    let service = match params.service.parse::<ServiceIdentifier>() {
        Ok(service) => service,
        Err(UnknownService(name)) => {
            tracing::warn!(service = %name, "Request for unknown service");
            return DispatchError::ServiceNotFound(name).into_response();
        }
    };

    let inbound = match extract_inbound(request).await {
        Ok(inbound) => inbound,
        Err(rejection) => return rejection,
    };

    state
        .dispatcher
        .dispatch(
            service,
            inbound.method,
            &params.path,
            &inbound.headers,
            inbound.payload,
        )
        .await
        .into_response()
}

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": GATEWAY_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "services": "/services",
            "register": "/register",
            "stats": "/stats",
            "proxy": "/api/v1/{service}/{path}",
        },
    }))
}

/// `GET /health` and `GET /api/v1/health`
pub async fn gateway_health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "gateway": GATEWAY_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.environment,
        "timestamp": unix_now(),
    }))
}

/// Fallback for unmatched routes.
pub async fn not_found() -> Response {
    detail_response(StatusCode::NOT_FOUND, "Requested resource not found")
}
