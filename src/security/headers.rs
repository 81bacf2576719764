//! Header manipulation for both legs of a proxied call.
//!
//! # Responsibilities
//! - Drop the inbound `Host` and transport headers before forwarding
//! - Inject default `Content-Type`/`Accept` without overriding the caller
//! - Strip hop-by-hop and transport-computed headers from upstream responses

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Request headers never forwarded upstream.
///
/// `host` would leak the gateway's own authority. The rest describe the
/// inbound transport leg and are recomputed by the upstream client.
/// `accept-encoding` is dropped so upstream bodies arrive uncompressed; the
/// response leg removes `content-encoding` and re-serializes.
const STRIPPED_REQUEST_HEADERS: &[HeaderName] = &[
    header::HOST,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
    header::ACCEPT_ENCODING,
];

/// Upstream response headers not relayed to the client.
pub const STRIPPED_RESPONSE_HEADERS: &[HeaderName] = &[
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONTENT_ENCODING,
    header::CONNECTION,
    header::DATE,
    header::SERVER,
];

/// Build the outbound header set from the inbound one.
pub fn sanitize_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 2);
    for (name, value) in inbound {
        if STRIPPED_REQUEST_HEADERS.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers
        .entry(header::CONTENT_TYPE)
        .or_insert(HeaderValue::from_static("application/json"));
    headers
        .entry(header::ACCEPT)
        .or_insert(HeaderValue::from_static("application/json"));

    headers
}

/// Copy upstream response headers minus the stripped set.
pub fn filter_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if STRIPPED_RESPONSE_HEADERS.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}
