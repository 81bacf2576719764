//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply env overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → RouteTable built once, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults so the gateway runs with no file at all
//! - `<SERVICE>_SERVICE_URL` variables always win over the file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CorsConfig, Environment, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    RegistryConfig, SecurityConfig, ServiceOverride, TimeoutConfig,
};
