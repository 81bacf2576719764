//! ESG Platform API Gateway Library

pub mod admin;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod security;

pub use config::schema::GatewayConfig;
pub use error::DispatchError;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use proxy::Dispatcher;
pub use routing::{RouteTable, ServiceIdentifier};
