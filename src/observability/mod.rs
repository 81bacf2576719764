//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated strings, for machine parsing
//! - Request ID flows from the inbound request to the upstream call
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
