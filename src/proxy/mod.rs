//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Handler (service, method, path, headers, payload)
//!     → dispatcher.rs (resolve route, rewrite path)
//!     → forwarder.rs (select body mode, sanitize headers)
//!     → reqwest client (pooled, timeout-bound)
//!     → http::response (normalize)
//!     → Handler
//! ```

pub mod dispatcher;
pub mod forwarder;

pub use dispatcher::Dispatcher;
pub use forwarder::{ForwardedRequest, RequestPayload, StructuredBody, UploadPart};
