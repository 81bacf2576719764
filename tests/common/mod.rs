//! Shared utilities for integration and load testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use esg_gateway::config::GatewayConfig;
use esg_gateway::http::GatewayServer;
use esg_gateway::lifecycle::Shutdown;
use esg_gateway::routing::{RouteTable, ServiceIdentifier, ServiceRoute};

pub const PDF_BYTES: &[u8] = b"%PDF-1.7\n\x00\xff\xfe\x80 binary export\n%%EOF";

/// Echo the received request back as JSON.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let headers: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            )
        })
        .collect();

    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn pdf_export() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"tcfd.pdf\""),
        ],
        PDF_BYTES,
    )
}

async fn broken_json() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "application/json")],
        "not-json",
    )
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({ "late": true }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Start a mock upstream on an ephemeral port.
///
/// - `/health` answers 200
/// - `/v1/tcfdreport/export` returns PDF bytes
/// - `/v1/chatbot/broken` declares JSON but sends plain text with a 500
/// - `/v1/gri/slow` answers after 3 seconds
/// - everything else echoes the request as JSON
pub async fn start_mock_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/health", get(health))
        .route("/v1/tcfdreport/export", get(pdf_export))
        .route("/v1/chatbot/broken", get(broken_json))
        .route("/v1/gri/slow", get(slow))
        .fallback(echo);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Every service routed to `addr` with its default prefix.
pub fn routes_to(addr: SocketAddr) -> RouteTable {
    let mut table = RouteTable::default();
    for service in ServiceIdentifier::ALL {
        table.insert(ServiceRoute::new(
            service,
            &format!("http://{addr}"),
            service.default_prefix(),
        ));
    }
    table
}

/// Defaults with the background monitor off.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.registry.health_check_enabled = false;
    config
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig, routes: RouteTable) -> (String, Shutdown) {
    let server = GatewayServer::new(&config, routes).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (format!("http://{addr}"), shutdown)
}

/// Upstream echo plus gateway, ready for requests.
pub async fn start_stack() -> (String, SocketAddr, Shutdown) {
    let upstream = start_mock_upstream().await;
    let (gateway, shutdown) = start_gateway(test_config(), routes_to(upstream)).await;
    (gateway, upstream, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// GET `path` over a bare HTTP/1.1 connection, sending only `Host`.
///
/// Returns the status code and the response body.
pub async fn raw_get(gateway: &str, path: &str) -> (u16, String) {
    let authority = gateway.trim_start_matches("http://");
    let mut socket = TcpStream::connect(authority).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: {authority}\r\nConnection: close\r\n\r\n");
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    socket.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8_lossy(&raw).into_owned();

    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    (status, body.to_string())
}
