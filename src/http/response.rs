//! Response normalization.
//!
//! # Responsibilities
//! - Transform the upstream response for the client
//! - Strip hop-by-hop and transport-computed headers
//! - Classify the body once by `Content-Type`
//!
//! # Design Decisions
//! - Declared JSON is parsed and re-emitted; anything else is relayed
//!   byte-exact so binary exports survive
//! - Declared JSON that fails to parse is wrapped as `{"detail": <text>}`
//!   with the upstream status instead of surfacing an error
//! - An empty body is relayed as empty bytes whatever its declared type
//! - JSON values keep key order and exact numbers through re-emission

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::security::headers::filter_response_headers;

/// Body of an upstream response after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    /// Declared and parsed JSON.
    Json(Value),
    /// Opaque payload relayed as-is.
    Bytes {
        content: Bytes,
        media_type: Option<HeaderValue>,
    },
    /// Declared JSON that did not parse.
    TextFallback(String),
}

/// Client-facing response built from an upstream one.
#[derive(Debug, Clone)]
pub struct NormalizedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: UpstreamBody,
}

/// Classify and filter an upstream response.
pub fn normalize(status: StatusCode, headers: &HeaderMap, body: Bytes) -> NormalizedResponse {
    let media_type = headers.get(header::CONTENT_TYPE).cloned();
    let declares_json = media_type
        .as_ref()
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().starts_with("application/json"));

    let body = if declares_json && !body.is_empty() {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => UpstreamBody::Json(value),
            Err(e) => {
                tracing::warn!(status = %status, error = %e, "Upstream declared JSON but body did not parse");
                UpstreamBody::TextFallback(String::from_utf8_lossy(&body).into_owned())
            }
        }
    } else {
        UpstreamBody::Bytes {
            content: body,
            media_type,
        }
    };

    NormalizedResponse {
        status,
        headers: filter_response_headers(headers),
        body,
    }
}

impl NormalizedResponse {
    /// Read and normalize a `reqwest` response.
    pub async fn from_upstream(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(normalize(status, &headers, body))
    }
}

impl IntoResponse for NormalizedResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            UpstreamBody::Json(value) => Json(value).into_response(),
            UpstreamBody::TextFallback(text) => Json(json!({ "detail": text })).into_response(),
            UpstreamBody::Bytes {
                content,
                media_type,
            } => {
                let mut response = Response::new(Body::from(content));
                if let Some(media_type) = media_type {
                    response
                        .headers_mut()
                        .insert(header::CONTENT_TYPE, media_type);
                }
                response
            }
        };

        *response.status_mut() = self.status;
        // Upstream values replace what the JSON encoder set, key by key.
        response.headers_mut().extend(self.headers);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn json_body_is_parsed() {
        let normalized = normalize(
            StatusCode::CREATED,
            &headers(&[("content-type", "application/json"), ("content-length", "7")]),
            Bytes::from_static(br#"{"a":1}"#),
        );
        assert_eq!(normalized.status, StatusCode::CREATED);
        assert_eq!(normalized.body, UpstreamBody::Json(json!({ "a": 1 })));
        assert!(!normalized.headers.contains_key(header::CONTENT_LENGTH));
    }

    #[test]
    fn json_with_charset_is_still_json() {
        let normalized = normalize(
            StatusCode::OK,
            &headers(&[("content-type", "application/json; charset=utf-8")]),
            Bytes::from_static(b"[1,2]"),
        );
        assert_eq!(normalized.body, UpstreamBody::Json(json!([1, 2])));
    }

    #[test]
    fn malformed_json_falls_back_to_text() {
        let normalized = normalize(
            StatusCode::BAD_GATEWAY,
            &headers(&[("content-type", "application/json")]),
            Bytes::from_static(b"not-json"),
        );
        assert_eq!(normalized.status, StatusCode::BAD_GATEWAY);
        assert_eq!(normalized.body, UpstreamBody::TextFallback("not-json".into()));
    }

    #[test]
    fn binary_body_is_untouched() {
        let pdf: &'static [u8] = b"%PDF-1.7\x00\xff\xfe binary";
        let normalized = normalize(
            StatusCode::OK,
            &headers(&[("content-type", "application/pdf")]),
            Bytes::from_static(pdf),
        );
        match normalized.body {
            UpstreamBody::Bytes {
                content,
                media_type,
            } => {
                assert_eq!(&content[..], pdf);
                assert_eq!(media_type.unwrap(), "application/pdf");
            }
            other => panic!("expected bytes, got {other:?}"),
        }
    }

    #[test]
    fn missing_content_type_is_bytes() {
        let normalized = normalize(StatusCode::OK, &HeaderMap::new(), Bytes::from_static(b"hi"));
        assert!(matches!(
            normalized.body,
            UpstreamBody::Bytes { media_type: None, .. }
        ));
    }

    #[tokio::test]
    async fn json_reemission_keeps_order_and_precision() {
        let raw: &'static [u8] =
            br#"{"zeta":1,"id":12345678901234567890123,"amount":0.10000000000000000001}"#;
        let response = normalize(
            StatusCode::OK,
            &headers(&[("content-type", "application/json")]),
            Bytes::from_static(raw),
        )
        .into_response();

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], raw);
    }

    #[tokio::test]
    async fn empty_json_body_is_not_wrapped() {
        let normalized = normalize(
            StatusCode::NO_CONTENT,
            &headers(&[("content-type", "application/json")]),
            Bytes::new(),
        );
        assert!(matches!(
            &normalized.body,
            UpstreamBody::Bytes { content, .. } if content.is_empty()
        ));

        let response = normalized.into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn fallback_renders_detail_envelope() {
        let response = normalize(
            StatusCode::INTERNAL_SERVER_ERROR,
            &headers(&[("content-type", "application/json"), ("server", "uvicorn")]),
            Bytes::from_static(b"Internal Server Error"),
        )
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response.headers().contains_key(header::SERVER));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "detail": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn bytes_render_with_upstream_media_type() {
        let response = normalize(
            StatusCode::OK,
            &headers(&[("content-type", "image/png"), ("x-export-id", "42")]),
            Bytes::from_static(b"\x89PNG"),
        )
        .into_response();

        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(response.headers()["x-export-id"], "42");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"\x89PNG");
    }
}
