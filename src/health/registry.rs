//! Runtime service registry.
//!
//! # Responsibilities
//! - Hold name → service entry for runtime-registered services
//! - Check a service's health URL on demand and record the outcome
//!
//! # Design Decisions
//! - Sharded concurrent map; handlers and the monitor never block each other
//! - No map guard is held across a check
//! - Registering an existing name replaces the entry and resets its state

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::config::validation::check_base_url;
use crate::health::state::{unix_now, HealthStatus};
use crate::observability::metrics;
use crate::routing::RouteTable;

/// One registered service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEntry {
    pub name: String,
    pub url: String,
    pub health_url: String,
    pub status: HealthStatus,
    /// Unix seconds of the last check.
    pub last_check: Option<u64>,
    /// Unix seconds.
    pub registered_at: u64,
}

/// Registry-wide counts. Anything not healthy counts as unhealthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub total: usize,
    pub healthy: usize,
    pub unhealthy: usize,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Service name must not be empty")]
    EmptyName,

    #[error("Invalid {field}: {message}")]
    InvalidUrl { field: &'static str, message: String },
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

pub struct ServiceRegistry {
    services: DashMap<String, ServiceEntry>,
    client: reqwest::Client,
}

impl ServiceRegistry {
    /// Create an empty registry whose checks give up after `check_timeout`.
    pub fn new(check_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(check_timeout).build()?;
        Ok(Self {
            services: DashMap::new(),
            client,
        })
    }

    /// Register every configured route under its service name.
    pub fn seed_from_routes(&self, routes: &RouteTable) {
        for route in routes.iter() {
            let entry = new_entry(route.service.as_str(), &route.base_url, None);
            self.services.insert(entry.name.clone(), entry);
        }
        tracing::info!(count = self.services.len(), "Registry seeded from route table");
    }

    /// Register or replace a service.
    pub fn register(
        &self,
        name: &str,
        url: &str,
        health_url: Option<&str>,
    ) -> Result<ServiceEntry, RegistrationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        check_base_url(url).map_err(|message| RegistrationError::InvalidUrl {
            field: "url",
            message,
        })?;
        if let Some(health_url) = health_url {
            check_base_url(health_url).map_err(|message| RegistrationError::InvalidUrl {
                field: "health_url",
                message,
            })?;
        }

        let entry = new_entry(name, url, health_url);
        self.services.insert(entry.name.clone(), entry.clone());
        tracing::info!(service = %entry.name, url = %entry.url, "Registered service");
        Ok(entry)
    }

    pub fn get(&self, name: &str) -> Option<ServiceEntry> {
        self.services.get(name).map(|entry| entry.clone())
    }

    /// All entries, sorted by name.
    pub fn snapshot(&self) -> Vec<ServiceEntry> {
        let mut entries: Vec<_> = self.services.iter().map(|e| e.value().clone()).collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Counted in one pass; `healthy` never exceeds `total`.
    pub fn stats(&self) -> RegistryStats {
        let (total, healthy) = self.services.iter().fold((0, 0), |(total, healthy), e| {
            (total + 1, healthy + usize::from(e.status.is_healthy()))
        });
        RegistryStats {
            total,
            healthy,
            unhealthy: total - healthy,
        }
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Check one service now. `None` when the name is not registered.
    pub async fn check(&self, name: &str) -> Option<bool> {
        let health_url = self.services.get(name)?.health_url.clone();

        let healthy = match self.client.get(&health_url).send().await {
            Ok(response) if response.status() == StatusCode::OK => true,
            Ok(response) => {
                tracing::debug!(service = %name, status = %response.status(), "Health check failed: non-200 status");
                false
            }
            Err(e) => {
                tracing::debug!(service = %name, error = %e, "Health check failed");
                false
            }
        };

        // The entry may have been replaced or re-registered meanwhile; record
        // against whatever is there now.
        if let Some(mut entry) = self.services.get_mut(name) {
            let status = HealthStatus::from_check(healthy);
            if entry.status != status {
                tracing::info!(service = %name, from = ?entry.status, to = ?status, "Service health changed");
            }
            entry.status = status;
            entry.last_check = Some(unix_now());
        }
        metrics::record_service_health(name, healthy);

        Some(healthy)
    }

    /// Check every registered service sequentially.
    pub async fn check_all(&self) {
        let names: Vec<String> = self.services.iter().map(|e| e.key().clone()).collect();
        for name in names {
            self.check(&name).await;
        }
    }
}

fn new_entry(name: &str, url: &str, health_url: Option<&str>) -> ServiceEntry {
    let url = url.trim_end_matches('/').to_string();
    let health_url = health_url
        .map(str::to_string)
        .unwrap_or_else(|| format!("{url}/health"));
    ServiceEntry {
        name: name.to_string(),
        url,
        health_url,
        status: HealthStatus::Unknown,
        last_check: None,
        registered_at: unix_now(),
    }
}
