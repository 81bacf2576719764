//! Request forwarding.
//!
//! # Responsibilities
//! - Turn an inbound call into a `ForwardedRequest` (URL, headers, body mode)
//! - Send it through the shared upstream client
//!
//! # Body modes by method
//! ```text
//! GET, DELETE  → no body
//! POST         → multipart if files present
//!                else structured form/JSON if pre-parsed
//!                else raw bytes, sent as JSON when they decode as UTF-8 JSON
//! PUT, PATCH   → raw bytes as-is
//! other        → MethodNotAllowed
//! ```
//! The query string is forwarded verbatim for every method.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};

use crate::error::DispatchError;
use crate::security::headers::sanitize_request_headers;

/// One part of an inbound `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPart {
    pub field_name: String,
    /// Set for file parts; text fields have none.
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadPart {
    fn is_text_field(&self) -> bool {
        self.file_name.is_none() && self.content_type.is_none()
    }
}

/// Body already parsed by the routing layer.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredBody {
    /// URL-encoded form pairs, in inbound order.
    Form(Vec<(String, String)>),
    Json(Value),
}

/// Everything the routing layer extracted besides method, path and headers.
#[derive(Debug, Clone, Default)]
pub struct RequestPayload {
    pub body: Option<Bytes>,
    pub files: Vec<UploadPart>,
    pub structured: Option<StructuredBody>,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
}

/// Outbound body, one mode per request.
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardBody {
    Empty,
    Raw(Bytes),
    Json(Value),
    Form(Vec<(String, String)>),
    Multipart(Vec<UploadPart>),
}

/// A fully prepared upstream request.
#[derive(Debug, Clone)]
pub struct ForwardedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: ForwardBody,
}

impl ForwardedRequest {
    /// Prepare an upstream request. Fails before any I/O on unsupported verbs.
    pub fn build(
        method: &Method,
        target_url: String,
        inbound_headers: &HeaderMap,
        payload: RequestPayload,
    ) -> Result<Self, DispatchError> {
        let url = match payload.query.as_deref() {
            Some(query) if !query.is_empty() => format!("{target_url}?{query}"),
            _ => target_url,
        };

        let body = select_body(method, payload)?;

        let mut headers = sanitize_request_headers(inbound_headers);
        if matches!(body, ForwardBody::Multipart(_)) {
            // The multipart encoder writes its own boundary.
            headers.remove(header::CONTENT_TYPE);
        }

        Ok(Self {
            method: method.clone(),
            url,
            headers,
            body,
        })
    }

    /// Send through the shared client. The client carries the timeout.
    pub async fn send(self, client: &reqwest::Client) -> Result<reqwest::Response, reqwest::Error> {
        let builder = client
            .request(self.method, &self.url)
            .headers(self.headers);

        let builder = match self.body {
            ForwardBody::Empty => builder,
            ForwardBody::Raw(bytes) => builder.body(bytes),
            ForwardBody::Json(value) => builder.json(&value),
            ForwardBody::Form(pairs) => builder.form(&pairs),
            ForwardBody::Multipart(parts) => builder.multipart(multipart_form(parts)),
        };

        builder.send().await
    }
}

/// Pick the body mode for a method.
pub fn select_body(method: &Method, payload: RequestPayload) -> Result<ForwardBody, DispatchError> {
    match *method {
        Method::GET | Method::DELETE => Ok(ForwardBody::Empty),
        Method::POST => Ok(select_post_body(payload)),
        Method::PUT | Method::PATCH => Ok(ForwardBody::Raw(payload.body.unwrap_or_default())),
        _ => Err(DispatchError::MethodNotAllowed(method.clone())),
    }
}

fn select_post_body(payload: RequestPayload) -> ForwardBody {
    if !payload.files.is_empty() {
        return ForwardBody::Multipart(payload.files);
    }

    match payload.structured {
        Some(StructuredBody::Form(pairs)) => return ForwardBody::Form(pairs),
        Some(StructuredBody::Json(value)) => return ForwardBody::Json(value),
        None => {}
    }

    let bytes = match payload.body {
        Some(bytes) if !bytes.is_empty() => bytes,
        // Empty POST bodies go out as an empty JSON object.
        _ => return ForwardBody::Json(json!({})),
    };

    match std::str::from_utf8(&bytes)
        .ok()
        .and_then(|text| serde_json::from_str::<Value>(text).ok())
    {
        Some(value) => ForwardBody::Json(value),
        None => ForwardBody::Raw(bytes),
    }
}

fn multipart_form(parts: Vec<UploadPart>) -> Form {
    parts.into_iter().fold(Form::new(), |form, part| {
        if part.is_text_field() {
            let value = String::from_utf8_lossy(&part.data).into_owned();
            return form.text(part.field_name, value);
        }

        let data = part.data.to_vec();
        let mut body = match part.content_type.as_deref() {
            Some(content_type) => Part::bytes(data.clone())
                .mime_str(content_type)
                .unwrap_or_else(|_| {
                    tracing::debug!(content_type = %content_type, "Dropping unparsable part content type");
                    Part::bytes(data)
                }),
            None => Part::bytes(data),
        };
        if let Some(file_name) = part.file_name {
            body = body.file_name(file_name);
        }
        form.part(part.field_name, body)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn raw(body: &'static [u8]) -> RequestPayload {
        RequestPayload {
            body: Some(Bytes::from_static(body)),
            ..Default::default()
        }
    }

    fn file_part() -> UploadPart {
        UploadPart {
            field_name: "file".into(),
            file_name: Some("report.xlsx".into()),
            content_type: Some("application/vnd.ms-excel".into()),
            data: Bytes::from_static(b"sheet"),
        }
    }

    #[test]
    fn get_and_delete_send_no_body() {
        for method in [Method::GET, Method::DELETE] {
            assert_eq!(select_body(&method, raw(b"{}")).unwrap(), ForwardBody::Empty);
        }
    }

    #[test]
    fn post_prefers_files_then_structured_then_raw() {
        let payload = RequestPayload {
            body: Some(Bytes::from_static(b"{\"ignored\":true}")),
            files: vec![file_part()],
            structured: Some(StructuredBody::Form(vec![("a".into(), "1".into())])),
            query: None,
        };
        assert!(matches!(
            select_body(&Method::POST, payload).unwrap(),
            ForwardBody::Multipart(parts) if parts.len() == 1
        ));

        let payload = RequestPayload {
            body: Some(Bytes::from_static(b"{\"ignored\":true}")),
            structured: Some(StructuredBody::Form(vec![("a".into(), "1".into())])),
            ..Default::default()
        };
        assert_eq!(
            select_body(&Method::POST, payload).unwrap(),
            ForwardBody::Form(vec![("a".into(), "1".into())])
        );
    }

    #[test]
    fn post_raw_json_is_sent_structured() {
        assert_eq!(
            select_body(&Method::POST, raw(br#"{"auth_id":"kim"}"#)).unwrap(),
            ForwardBody::Json(json!({ "auth_id": "kim" }))
        );
    }

    #[test]
    fn post_raw_json_keeps_order_and_large_numbers() {
        let text = r#"{"zeta":1,"id":12345678901234567890123,"amount":0.10000000000000000001}"#;
        match select_body(&Method::POST, raw(text.as_bytes())).unwrap() {
            ForwardBody::Json(value) => assert_eq!(serde_json::to_string(&value).unwrap(), text),
            other => panic!("expected JSON, got {other:?}"),
        }
    }

    #[test]
    fn post_prefers_structured_json_over_raw() {
        let payload = RequestPayload {
            body: Some(Bytes::from_static(b"ignored")),
            structured: Some(StructuredBody::Json(json!({ "year": 2024 }))),
            ..Default::default()
        };
        assert_eq!(
            select_body(&Method::POST, payload).unwrap(),
            ForwardBody::Json(json!({ "year": 2024 }))
        );
    }

    #[test]
    fn post_non_json_stays_opaque() {
        assert_eq!(
            select_body(&Method::POST, raw(b"plain words")).unwrap(),
            ForwardBody::Raw(Bytes::from_static(b"plain words"))
        );
        assert_eq!(
            select_body(&Method::POST, raw(b"\xff\xfe{}")).unwrap(),
            ForwardBody::Raw(Bytes::from_static(b"\xff\xfe{}"))
        );
    }

    #[test]
    fn empty_post_becomes_empty_object() {
        assert_eq!(
            select_body(&Method::POST, RequestPayload::default()).unwrap(),
            ForwardBody::Json(json!({}))
        );
    }

    #[test]
    fn put_and_patch_keep_raw_bytes() {
        for method in [Method::PUT, Method::PATCH] {
            assert_eq!(
                select_body(&method, raw(br#"{"a":1}"#)).unwrap(),
                ForwardBody::Raw(Bytes::from_static(br#"{"a":1}"#))
            );
        }
    }

    #[test]
    fn other_methods_are_rejected() {
        let err = select_body(&Method::OPTIONS, RequestPayload::default()).unwrap_err();
        assert!(matches!(err, DispatchError::MethodNotAllowed(m) if m == Method::OPTIONS));
    }

    #[test]
    fn build_appends_query_verbatim() {
        let payload = RequestPayload {
            query: Some("sheet_name=a&sheet_name=b%20c".into()),
            ..Default::default()
        };
        let request = ForwardedRequest::build(
            &Method::GET,
            "http://gri:8004/v1/gri/upload".into(),
            &HeaderMap::new(),
            payload,
        )
        .unwrap();
        assert_eq!(
            request.url,
            "http://gri:8004/v1/gri/upload?sheet_name=a&sheet_name=b%20c"
        );
    }

    #[test]
    fn build_sanitizes_headers() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("gateway:8080"));
        inbound.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let request = ForwardedRequest::build(
            &Method::PUT,
            "http://auth:8008/v1/auth/me".into(),
            &inbound,
            raw(b"hello"),
        )
        .unwrap();
        assert!(!request.headers.contains_key(header::HOST));
        assert_eq!(request.headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(request.headers[header::ACCEPT], "application/json");
    }

    #[test]
    fn multipart_drops_inbound_content_type() {
        let mut inbound = HeaderMap::new();
        inbound.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=inbound"),
        );
        let payload = RequestPayload {
            files: vec![file_part()],
            ..Default::default()
        };
        let request = ForwardedRequest::build(
            &Method::POST,
            "http://gri:8004/v1/gri/upload".into(),
            &inbound,
            payload,
        )
        .unwrap();
        assert!(!request.headers.contains_key(header::CONTENT_TYPE));
    }
}
