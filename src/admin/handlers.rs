//! Registry endpoints.

use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::detail_response;
use crate::health::state::unix_now;
use crate::health::{RegistryStats, ServiceEntry};
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub url: String,
    pub health_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ServiceListing {
    pub services: BTreeMap<String, ServiceEntry>,
    pub stats: RegistryStats,
}

#[derive(Debug, Serialize)]
pub struct GatewayStats {
    pub total_services: usize,
    pub healthy_services: usize,
    pub unhealthy_services: usize,
    pub uptime_secs: u64,
    pub timestamp: u64,
}

/// `POST /register`
pub async fn register_service(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        // Oversized bodies keep their 413; every other rejection is a bad request.
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return detail_response(rejection.status(), rejection.body_text());
        }
        Err(rejection) => return detail_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match state
        .registry
        .register(&request.name, &request.url, request.health_url.as_deref())
    {
        Ok(entry) => Json(json!({
            "message": format!("Service {} registered successfully", entry.name),
            "service_name": entry.name,
            "status": "registered",
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!(name = %request.name, error = %e, "Rejected service registration");
            e.into_response()
        }
    }
}

/// `GET /services`
pub async fn list_services(State(state): State<AppState>) -> Json<ServiceListing> {
    let services = state
        .registry
        .snapshot()
        .into_iter()
        .map(|entry| (entry.name.clone(), entry))
        .collect();

    Json(ServiceListing {
        services,
        stats: state.registry.stats(),
    })
}

/// `GET /health/{service_name}`
pub async fn check_service(
    State(state): State<AppState>,
    service_name: Result<Path<String>, PathRejection>,
) -> Response {
    let Path(service_name) = match service_name {
        Ok(name) => name,
        Err(rejection) => return detail_response(rejection.status(), rejection.body_text()),
    };

    match state.registry.check(&service_name).await {
        Some(healthy) => Json(json!({
            "service": service_name,
            "healthy": healthy,
            "timestamp": unix_now(),
        }))
        .into_response(),
        None => detail_response(
            StatusCode::NOT_FOUND,
            format!("Service {service_name} not found"),
        ),
    }
}

/// `GET /stats`
pub async fn gateway_stats(State(state): State<AppState>) -> Json<GatewayStats> {
    let stats = state.registry.stats();
    Json(GatewayStats {
        total_services: stats.total,
        healthy_services: stats.healthy,
        unhealthy_services: stats.unhealthy,
        uptime_secs: state.started_at.elapsed().as_secs(),
        timestamp: unix_now(),
    })
}
