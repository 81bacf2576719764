//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, bind address parses)
//! - Validate service URL overrides and prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;
use crate::routing::RouteTable;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check that a base URL is an absolute http(s) URL.
pub fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid URL '{}': {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }
    if url.host_str().is_none() {
        return Err(format!("URL '{}' has no host", raw));
    }
    Ok(())
}

/// Validate a loaded configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }

    for (service, overrides) in &config.services {
        if let Some(url) = &overrides.url {
            if let Err(message) = check_base_url(url) {
                errors.push(ValidationError::new(format!("services.{service}.url"), message));
            }
        }
        if let Some(prefix) = &overrides.prefix {
            if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
                errors.push(ValidationError::new(
                    format!("services.{service}.prefix"),
                    "must start with '/' and not end with '/'",
                ));
            }
        }
    }

    if config.registry.health_check_enabled {
        if config.registry.interval_secs == 0 {
            errors.push(ValidationError::new("registry.interval_secs", "must be greater than 0"));
        }
        if config.registry.timeout_secs == 0 {
            errors.push(ValidationError::new("registry.timeout_secs", "must be greater than 0"));
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the resolved route table, which includes env var URLs.
pub fn validate_routes(table: &RouteTable) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<_> = table
        .iter()
        .filter_map(|route| {
            check_base_url(&route.base_url).err().map(|message| {
                ValidationError::new(format!("{} base URL", route.service), message)
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceOverride;
    use crate::routing::{ServiceIdentifier, ServiceRoute};

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.services.insert(
            ServiceIdentifier::Tcfd,
            ServiceOverride {
                url: Some("ftp://tcfd".into()),
                prefix: Some("v1/tcfd/".into()),
                enabled: true,
            },
        );

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "timeouts.request_secs",
                "services.tcfd.url",
                "services.tcfd.prefix",
            ]
        );
    }

    #[test]
    fn empty_prefix_is_allowed() {
        let mut config = GatewayConfig::default();
        config.services.insert(
            ServiceIdentifier::Auth,
            ServiceOverride {
                prefix: Some(String::new()),
                ..Default::default()
            },
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn route_table_urls_are_checked() {
        let mut table = RouteTable::default();
        table.insert(ServiceRoute::new(ServiceIdentifier::Auth, "auth-service:8008", "/v1/auth"));
        table.insert(ServiceRoute::new(ServiceIdentifier::Gri, "http://gri:8004", "/v1/gri"));
        let errors = validate_routes(&table).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "auth base URL");
    }
}
