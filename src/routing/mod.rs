//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound /api/v1/{service}/{*path}
//!     → service.rs (parse path segment into ServiceIdentifier)
//!     → resolver.rs (RouteTable lookup: base URL + prefix)
//!     → rewrite.rs (remainder path → upstream path)
//!     → Return: target URL or ServiceNotFound
//!
//! Table Construction (at startup):
//!     GatewayConfig + process environment
//!     → one ServiceRoute per enabled service
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Closed service set; unknown names rejected before dispatch
//! - Table built once, shared read-only via Arc
//! - Rewriting is pure string manipulation, no regex

pub mod resolver;
pub mod rewrite;
pub mod service;

pub use resolver::{RouteTable, ServiceRoute};
pub use service::{ServiceIdentifier, UnknownService};
