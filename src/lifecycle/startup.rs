//! Startup orchestration.
//!
//! # Order
//! config → logging → metrics → route table → server (registry + monitor)
//! → listener
//!
//! Any startup error is fatal. The listener binds last so traffic only
//! arrives once every subsystem is ready.

use std::fmt;
use std::path::Path;

use tokio::net::TcpListener;

use crate::config::validation::{validate_routes, ValidationError};
use crate::config::{load_config, ConfigError, GatewayConfig};
use crate::http::GatewayServer;
use crate::lifecycle::signals::wait_for_signal;
use crate::lifecycle::Shutdown;
use crate::observability::{logging, metrics};
use crate::routing::RouteTable;

/// Fatal startup failure.
#[derive(Debug)]
pub enum GatewayError {
    Config(ConfigError),
    Routes(Vec<ValidationError>),
    Logging(tracing_subscriber::util::TryInitError),
    Client(reqwest::Error),
    Io(std::io::Error),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Config(e) => write!(f, "configuration error: {}", e),
            GatewayError::Routes(errors) => {
                write!(f, "invalid service routes: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            GatewayError::Logging(e) => write!(f, "failed to initialize logging: {}", e),
            GatewayError::Client(e) => write!(f, "failed to build HTTP client: {}", e),
            GatewayError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Config(e) => Some(e),
            GatewayError::Routes(_) => None,
            GatewayError::Logging(e) => Some(e),
            GatewayError::Client(e) => Some(e),
            GatewayError::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(e: std::io::Error) -> Self {
        GatewayError::Io(e)
    }
}

/// Resolve and validate the route table.
pub fn build_routes(config: &GatewayConfig) -> Result<RouteTable, GatewayError> {
    let routes = RouteTable::from_config(config);
    validate_routes(&routes).map_err(GatewayError::Routes)?;

    for route in routes.iter() {
        tracing::info!(
            service = %route.service,
            base_url = %route.base_url,
            prefix = %route.prefix,
            "Route configured"
        );
    }
    Ok(routes)
}

/// Start the gateway and block until it shuts down.
pub async fn launch(config_path: Option<&Path>) -> Result<(), GatewayError> {
    let config = load_config(config_path).map_err(GatewayError::Config)?;

    logging::init_logging(&config.observability).map_err(GatewayError::Logging)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        "esg-gateway starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let routes = build_routes(&config)?;
    let server = GatewayServer::new(&config, routes)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
