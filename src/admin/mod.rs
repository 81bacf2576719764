//! Service registry management API.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use self::handlers::*;
use crate::http::server::AppState;

pub fn registry_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_service))
        .route("/services", get(list_services))
        .route("/health/{service_name}", get(check_service))
        .route("/stats", get(gateway_stats))
}
