//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::routing::ServiceIdentifier;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Deployment environment; selects default URLs and CORS origins.
    pub environment: Environment,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Per-service overrides keyed by service name.
    pub services: BTreeMap<ServiceIdentifier, ServiceOverride>,

    /// Upstream timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Cross-origin settings.
    pub cors: CorsConfig,

    /// Runtime service registry settings.
    pub registry: RegistryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request limits.
    pub security: SecurityConfig,
}

/// Where the gateway is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Deployed,
}

impl Environment {
    /// Parse the values accepted in `GATEWAY_ENV`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "development" | "dev" => Some(Environment::Local),
            "deployed" | "production" | "prod" => Some(Environment::Deployed),
            _ => None,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Override for a single backend service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceOverride {
    /// Base URL; the `<SERVICE>_SERVICE_URL` env var still wins.
    pub url: Option<String>,

    /// Upstream prefix; empty string forwards paths verbatim.
    pub prefix: Option<String>,

    /// Disabled services are absent from the route table.
    pub enabled: bool,
}

impl Default for ServiceOverride {
    fn default() -> Self {
        Self {
            url: None,
            prefix: None,
            enabled: true,
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. Empty means the environment's default list.
    pub allowed_origins: Vec<String>,
}

/// Service registry and health monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Register every configured route at startup.
    pub seed_from_routes: bool,

    /// Enable periodic health checks.
    pub health_check_enabled: bool,

    /// Check interval in seconds.
    pub interval_secs: u64,

    /// Check timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            seed_from_routes: true,
            health_check_enabled: true,
            interval_secs: 30,
            timeout_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB, spreadsheet uploads
        }
    }
}
