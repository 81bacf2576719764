//! Failure injection tests for the gateway.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde_json::Value;

use esg_gateway::routing::{RouteTable, ServiceIdentifier, ServiceRoute};

mod common;

#[tokio::test]
async fn closed_upstream_is_503() {
    let dead = common::closed_port().await;
    let mut routes = RouteTable::default();
    routes.insert(ServiceRoute::new(
        ServiceIdentifier::Gri,
        &format!("http://{dead}"),
        "/v1/gri",
    ));
    let (gateway, _shutdown) = common::start_gateway(common::test_config(), routes).await;

    let res = common::client()
        .get(format!("{gateway}/api/v1/gri/companies"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Service gri unavailable");
}

#[tokio::test]
async fn slow_upstream_times_out_as_503() {
    let upstream = common::start_mock_upstream().await;
    let mut config = common::test_config();
    config.timeouts.request_secs = 1;
    let (gateway, _shutdown) = common::start_gateway(config, common::routes_to(upstream)).await;

    let start = Instant::now();
    let res = common::client()
        .get(format!("{gateway}/api/v1/gri/slow"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(start.elapsed() < Duration::from_millis(2900));
}

#[tokio::test]
async fn upstream_errors_are_relayed_not_retried() {
    let (gateway, _upstream, _shutdown) = common::start_stack().await;

    let res = common::client()
        .get(format!("{gateway}/api/v1/chatbot/broken"))
        .send()
        .await
        .unwrap();

    // 500 from the backend is the backend's answer, not a gateway failure.
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn shutdown_stops_accepting() {
    let (gateway, _upstream, shutdown) = common::start_stack().await;
    let client = common::client();

    let res = client.get(format!("{gateway}/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let fresh = reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap();
    assert!(fresh.get(format!("{gateway}/health")).send().await.is_err());
}
