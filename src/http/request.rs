//! Inbound request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every call
//! - Extract the forwardable payload: query, raw body, uploads, form pairs
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing, and forwarded
//!   upstream with the other headers
//! - Only POST bodies are pre-parsed; other verbs keep raw bytes
//! - Size limits come from `DefaultBodyLimit`, so every extractor here
//!   rejects oversized bodies with 413
//! - Rejections are rendered as JSON `detail` bodies, never plain text

use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use axum::response::Response;
use axum::Form;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::detail_response;
use crate::proxy::{RequestPayload, StructuredBody, UploadPart};

/// Header carrying the request ID.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Inbound request split into what the dispatcher needs.
#[derive(Debug)]
pub struct InboundRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub payload: RequestPayload,
}

/// Consume a request and extract its payload.
///
/// Rejections (malformed multipart, oversized body) are returned as ready
/// responses.
pub async fn extract_inbound(request: Request) -> Result<InboundRequest, Response> {
    let method = request.method().clone();
    let headers = request.headers().clone();
    let query = request.uri().query().map(str::to_string);

    let mut payload = RequestPayload {
        query,
        ..Default::default()
    };

    if method == Method::POST {
        match post_body_kind(&headers) {
            PostBodyKind::Multipart => {
                payload.files = read_multipart(request).await?;
            }
            PostBodyKind::UrlEncoded => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, &())
                    .await
                    .map_err(|r| detail_response(r.status(), r.body_text()))?;
                payload.structured = Some(StructuredBody::Form(pairs));
            }
            PostBodyKind::Other => {
                payload.body = Some(read_bytes(request).await?);
            }
        }
    } else if matches!(method, Method::PUT | Method::PATCH) {
        payload.body = Some(read_bytes(request).await?);
    }

    Ok(InboundRequest {
        method,
        headers,
        payload,
    })
}

#[derive(Debug, PartialEq, Eq)]
enum PostBodyKind {
    Multipart,
    UrlEncoded,
    Other,
}

fn post_body_kind(headers: &HeaderMap) -> PostBodyKind {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase())
        .unwrap_or_default();

    if content_type.starts_with("multipart/form-data") {
        PostBodyKind::Multipart
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        PostBodyKind::UrlEncoded
    } else {
        PostBodyKind::Other
    }
}

async fn read_bytes(request: Request) -> Result<Bytes, Response> {
    Bytes::from_request(request, &())
        .await
        .map_err(|r| detail_response(r.status(), r.body_text()))
}

async fn read_multipart(request: Request<Body>) -> Result<Vec<UploadPart>, Response> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|r| detail_response(r.status(), r.body_text()))?;

    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| detail_response(e.status(), e.body_text()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| detail_response(e.status(), e.body_text()))?;

        parts.push(UploadPart {
            field_name,
            file_name,
            content_type,
            data,
        });
    }

    Ok(parts)
}
