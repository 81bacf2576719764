//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (origin allow-list, preflight)
//!     → body limit (server layer)
//!     → headers.rs (drop Host, inject content defaults)
//!     → Forward upstream
//!
//! Upstream response:
//!     → headers.rs (strip hop-by-hop headers)
//!     → Client
//! ```
//!
//! # Design Decisions
//! - Fail closed: an unlisted origin gets no CORS headers
//! - Never relay the gateway's own Host upstream

pub mod cors;
pub mod headers;
