//! HTTP tests for the status API, served over a real socket.

use pingboard_reporter::{create_axum_router, MemoryStatusStore, StatusStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

// =============================================================================
// Test Helpers
// =============================================================================

/// Start the router on a random port and return its base URL with the store.
async fn start_test_server() -> (String, Arc<MemoryStatusStore>) {
    let store = Arc::new(MemoryStatusStore::new());
    let router = create_axum_router(store.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), store)
}

async fn get_statuses(client: &reqwest::Client, base_url: &str) -> Vec<Value> {
    let resp = client
        .get(format!("{}/status", base_url))
        .send()
        .await
        .expect("Failed to fetch statuses");
    assert_eq!(resp.status(), 200);
    resp.json().await.expect("Failed to parse statuses")
}

// =============================================================================
// Status API Tests
// =============================================================================

#[tokio::test]
async fn test_empty_store_returns_empty_array() {
    let (base_url, _store) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/status", base_url))
        .send()
        .await
        .expect("Failed to fetch statuses");
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_report_then_overwrite() {
    let (base_url, _store) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/status", base_url))
        .json(&json!({"ip": "10.0.0.1", "ping_time": 12, "last_success": "2024-01-01T00:00:00Z"}))
        .send()
        .await
        .expect("Failed to post status");
    assert_eq!(resp.status(), 201);

    let statuses = get_statuses(&client, &base_url).await;
    assert_eq!(
        statuses,
        vec![json!({"ip": "10.0.0.1", "ping_time": 12, "last_success": "2024-01-01T00:00:00Z"})]
    );

    let resp = client
        .post(format!("{}/status", base_url))
        .json(&json!({"ip": "10.0.0.1", "ping_time": 99, "last_success": "2024-01-01T00:00:00Z"}))
        .send()
        .await
        .expect("Failed to post status");
    assert_eq!(resp.status(), 201);

    let statuses = get_statuses(&client, &base_url).await;
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0]["ip"], "10.0.0.1");
    assert_eq!(statuses[0]["ping_time"], 99);
}

#[tokio::test]
async fn test_reports_for_other_hosts_do_not_interfere() {
    let (base_url, _store) = start_test_server().await;
    let client = reqwest::Client::new();

    for (ip, ping_time) in [("10.0.0.1", 5), ("10.0.0.2", 7), ("10.0.0.1", 6)] {
        let resp = client
            .post(format!("{}/status", base_url))
            .json(&json!({"ip": ip, "ping_time": ping_time, "last_success": "2024-05-01T10:00:00Z"}))
            .send()
            .await
            .expect("Failed to post status");
        assert_eq!(resp.status(), 201);
    }

    let mut statuses = get_statuses(&client, &base_url).await;
    statuses.sort_by(|a, b| a["ip"].as_str().cmp(&b["ip"].as_str()));
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0]["ping_time"], 6);
    assert_eq!(statuses[1]["ip"], "10.0.0.2");
    assert_eq!(statuses[1]["ping_time"], 7);
}

#[tokio::test]
async fn test_malformed_reports_are_rejected() {
    let (base_url, store) = start_test_server().await;
    let client = reqwest::Client::new();

    let bad_bodies = [
        r#"{"ip": "10.0.0.1", "ping_time": 12"#,
        r#"{"ip": "10.0.0.1", "ping_time": 12}"#,
        r#"{"ip": "10.0.0.1", "ping_time": "12ms", "last_success": "2024-01-01T00:00:00Z"}"#,
        r#"{"ip": "10.0.0.1", "ping_time": 12, "last_success": "yesterday"}"#,
        r#"[]"#,
    ];

    for body in bad_bodies {
        let resp = client
            .post(format!("{}/status", base_url))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to post status");
        assert_eq!(resp.status(), 400, "body {body} should be rejected");
        let error: Value = resp.json().await.unwrap();
        assert!(error["error"].is_string());
    }

    assert!(store.list_statuses().await.unwrap().is_empty());
    assert!(get_statuses(&client, &base_url).await.is_empty());
}

#[tokio::test]
async fn test_report_is_accepted_without_json_content_type() {
    let (base_url, store) = start_test_server().await;
    let client = reqwest::Client::new();
    let body = r#"{"ip": "10.0.0.1", "ping_time": 12, "last_success": "2024-01-01T00:00:00Z"}"#;

    let resp = client
        .post(format!("{}/status", base_url))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .expect("Failed to post status");
    assert_eq!(resp.status(), 201);

    let resp = client
        .post(format!("{}/status", base_url))
        .body(body.replace("12", "15"))
        .send()
        .await
        .expect("Failed to post status");
    assert_eq!(resp.status(), 201);

    let statuses = store.list_statuses().await.unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].latency_millis, 15);
}

#[tokio::test]
async fn test_health_and_cors() {
    let (base_url, _store) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .expect("Failed to send health request");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");

    let resp = client
        .get(format!("{}/status", base_url))
        .header("origin", "http://dashboard.local")
        .send()
        .await
        .expect("Failed to fetch statuses");
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
