//! Service resolution.
//!
//! # Responsibilities
//! - Build the immutable `RouteTable` from configuration at startup
//! - Resolve a `ServiceIdentifier` to its base URL and upstream prefix
//!
//! # Design Decisions
//! - Base URL order: `<SERVICE>_SERVICE_URL` env var, then config file, then
//!   the hardcoded default for the active environment
//! - Table indexed by the enum, no hashing on the hot path
//! - A disabled service has no entry; resolving it fails before any I/O

use crate::config::GatewayConfig;
use crate::error::DispatchError;
use crate::routing::rewrite::rewrite;
use crate::routing::ServiceIdentifier;

/// Where one service lives upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRoute {
    pub service: ServiceIdentifier,
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Upstream mount prefix; empty when paths are forwarded verbatim.
    pub prefix: String,
}

impl ServiceRoute {
    pub fn new(service: ServiceIdentifier, base_url: &str, prefix: &str) -> Self {
        Self {
            service,
            base_url: base_url.trim_end_matches('/').to_string(),
            prefix: prefix.to_string(),
        }
    }

    /// Upstream path for an inbound remainder path.
    pub fn upstream_path(&self, raw_path: &str) -> String {
        rewrite(&self.prefix, raw_path)
    }

    /// Full upstream URL, without query string.
    pub fn target_url(&self, raw_path: &str) -> String {
        format!("{}{}", self.base_url, self.upstream_path(raw_path))
    }
}

/// Process-wide service table. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: [Option<ServiceRoute>; ServiceIdentifier::ALL.len()],
}

impl RouteTable {
    /// Build from configuration using the process environment for overrides.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::from_config_with_env(config, |key| std::env::var(key).ok())
    }

    /// Build from configuration with an injectable environment lookup.
    pub fn from_config_with_env<F>(config: &GatewayConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut table = Self::default();

        for service in ServiceIdentifier::ALL {
            let overrides = config.services.get(&service);

            if overrides.is_some_and(|o| !o.enabled) {
                tracing::info!(service = %service, "Service disabled by configuration");
                continue;
            }

            let base_url = env(service.env_var())
                .filter(|url| !url.trim().is_empty())
                .or_else(|| overrides.and_then(|o| o.url.clone()))
                .unwrap_or_else(|| service.default_base_url(config.environment));

            let prefix = overrides
                .and_then(|o| o.prefix.as_deref())
                .unwrap_or(service.default_prefix());

            table.insert(ServiceRoute::new(service, base_url.trim(), prefix));
        }

        table
    }

    /// Add or replace the route for its service.
    pub fn insert(&mut self, route: ServiceRoute) {
        let index = route.service.index();
        self.routes[index] = Some(route);
    }

    /// Look up the route for a service.
    pub fn resolve(&self, service: ServiceIdentifier) -> Result<&ServiceRoute, DispatchError> {
        self.routes[service.index()]
            .as_ref()
            .ok_or_else(|| DispatchError::ServiceNotFound(service.to_string()))
    }

    /// Configured routes in table order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceRoute> {
        self.routes.iter().flatten()
    }
}
