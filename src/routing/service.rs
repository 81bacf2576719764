//! Closed set of backend services the gateway can dispatch to.
//!
//! Every per-service constant (upstream prefix, environment variable, default
//! address) lives in an exhaustive `match` so adding a variant fails to compile
//! until all of them are filled in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::Environment;

/// Logical name of a backend microservice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceIdentifier {
    Auth,
    Chatbot,
    Gri,
    Materiality,
    Tcfd,
    Grireport,
    Tcfdreport,
}

impl ServiceIdentifier {
    /// All services, in table order.
    pub const ALL: [ServiceIdentifier; 7] = [
        ServiceIdentifier::Auth,
        ServiceIdentifier::Chatbot,
        ServiceIdentifier::Gri,
        ServiceIdentifier::Materiality,
        ServiceIdentifier::Tcfd,
        ServiceIdentifier::Grireport,
        ServiceIdentifier::Tcfdreport,
    ];

    /// Path segment used in inbound URLs and in log/metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceIdentifier::Auth => "auth",
            ServiceIdentifier::Chatbot => "chatbot",
            ServiceIdentifier::Gri => "gri",
            ServiceIdentifier::Materiality => "materiality",
            ServiceIdentifier::Tcfd => "tcfd",
            ServiceIdentifier::Grireport => "grireport",
            ServiceIdentifier::Tcfdreport => "tcfdreport",
        }
    }

    /// Upstream mount prefix every backend serves its API under.
    pub fn default_prefix(&self) -> &'static str {
        match self {
            ServiceIdentifier::Auth => "/v1/auth",
            ServiceIdentifier::Chatbot => "/v1/chatbot",
            ServiceIdentifier::Gri => "/v1/gri",
            ServiceIdentifier::Materiality => "/v1/materiality",
            ServiceIdentifier::Tcfd => "/v1/tcfd",
            ServiceIdentifier::Grireport => "/v1/grireport",
            ServiceIdentifier::Tcfdreport => "/v1/tcfdreport",
        }
    }

    /// Environment variable that overrides the base URL.
    pub fn env_var(&self) -> &'static str {
        match self {
            ServiceIdentifier::Auth => "AUTH_SERVICE_URL",
            ServiceIdentifier::Chatbot => "CHATBOT_SERVICE_URL",
            ServiceIdentifier::Gri => "GRI_SERVICE_URL",
            ServiceIdentifier::Materiality => "MATERIALITY_SERVICE_URL",
            ServiceIdentifier::Tcfd => "TCFD_SERVICE_URL",
            ServiceIdentifier::Grireport => "GRIREPORT_SERVICE_URL",
            ServiceIdentifier::Tcfdreport => "TCFDREPORT_SERVICE_URL",
        }
    }

    fn default_port(&self) -> u16 {
        match self {
            ServiceIdentifier::Auth => 8008,
            ServiceIdentifier::Chatbot => 8003,
            ServiceIdentifier::Gri => 8004,
            ServiceIdentifier::Materiality => 8005,
            ServiceIdentifier::Grireport => 8006,
            ServiceIdentifier::Tcfd => 8007,
            ServiceIdentifier::Tcfdreport => 8009,
        }
    }

    /// Hardcoded fallback base URL.
    ///
    /// Locally every service listens on its own localhost port; when deployed
    /// the services are reached by container hostname (`<name>-service`).
    pub fn default_base_url(&self, environment: Environment) -> String {
        match environment {
            Environment::Local => format!("http://localhost:{}", self.default_port()),
            Environment::Deployed => {
                format!("http://{}-service:{}", self.as_str(), self.default_port())
            }
        }
    }

    /// Index into per-service tables.
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ServiceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a path segment names no known service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownService(pub String);

impl fmt::Display for UnknownService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service {} not found", self.0)
    }
}

impl std::error::Error for UnknownService {}

impl FromStr for ServiceIdentifier {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceIdentifier::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownService(s.to_string()))
    }
}
