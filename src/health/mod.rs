//! Service registry and health checking.
//!
//! # Data Flow
//! ```text
//! Startup / POST /register
//!     → registry.rs (name → entry, status unknown)
//!
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Check each registered health URL
//!     → Update state.rs status + metrics gauge
//!
//! On-demand checks:
//!     GET /health/{service_name} → registry.rs check
//! ```
//!
//! # Design Decisions
//! - The registry is informational; proxy dispatch uses the route table
//! - Health state is per registered name

pub mod active;
pub mod registry;
pub mod state;

pub use active::HealthMonitor;
pub use registry::{RegistrationError, RegistryStats, ServiceEntry, ServiceRegistry};
pub use state::HealthStatus;
