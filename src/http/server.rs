//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with gateway, registry and proxy routes
//! - Wire up middleware (request ID, tracing, CORS, body limit)
//! - Start the health monitor alongside the listener
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::routing::{any, get};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::admin::registry_router;
use crate::config::{Environment, GatewayConfig, RegistryConfig};
use crate::health::{HealthMonitor, ServiceRegistry};
use crate::http::handlers::{gateway_health, not_found, proxy_handler, root};
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::lifecycle::startup::GatewayError;
use crate::lifecycle::Shutdown;
use crate::proxy::Dispatcher;
use crate::routing::RouteTable;
use crate::security::cors::cors_layer;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub registry: Arc<ServiceRegistry>,
    pub environment: Environment,
    pub started_at: Instant,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    registry: Arc<ServiceRegistry>,
    registry_config: RegistryConfig,
}

impl GatewayServer {
    /// Create a server over an already resolved route table.
    pub fn new(config: &GatewayConfig, routes: RouteTable) -> Result<Self, GatewayError> {
        let routes = Arc::new(routes);
        let dispatcher =
            Dispatcher::new(routes.clone(), &config.timeouts).map_err(GatewayError::Client)?;

        let registry = Arc::new(
            ServiceRegistry::new(Duration::from_secs(config.registry.timeout_secs))
                .map_err(GatewayError::Client)?,
        );
        if config.registry.seed_from_routes {
            registry.seed_from_routes(&routes);
        }

        let state = AppState {
            dispatcher,
            registry: registry.clone(),
            environment: config.environment,
            started_at: Instant::now(),
        };

        Ok(Self {
            router: Self::build_router(config, state),
            registry,
            registry_config: config.registry.clone(),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(root))
            .route("/health", get(gateway_health))
            .route("/api/v1/health", get(gateway_health))
            .route("/api/v1/{service}", any(proxy_handler))
            .route("/api/v1/{service}/{*path}", any(proxy_handler))
            .merge(registry_router())
            .fallback(not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get(&X_REQUEST_ID)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("-");
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id,
                        )
                    }))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
                    .layer(cors_layer(&config.cors, config.environment)),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.registry_config.health_check_enabled {
            let monitor = HealthMonitor::new(
                self.registry.clone(),
                Duration::from_secs(self.registry_config.interval_secs),
            );
            tokio::spawn(monitor.run(shutdown.subscribe()));
        } else {
            tracing::info!("Active health checks disabled");
        }

        let mut stop = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
