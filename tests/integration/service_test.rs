//! Integration tests for service info, diagnostics and unmatched routes.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{Call, PASSWORD, TestApp};

#[tokio::test]
async fn test_service_info_at_root() {
    let app = TestApp::with_config(|config| {
        config.server.docs_url = Some("https://docs.example.com/bazaar".to_string());
    })
    .await;

    let response = app.send(Call::new("GET", "/")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "operational");
    assert_eq!(response.data()["environment"], "test");
    assert_eq!(response.data()["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(response.data()["documentation"], "https://docs.example.com/bazaar");
}

#[tokio::test]
async fn test_health_and_version_report_build() {
    let app = TestApp::new().await;

    let health = app.send(Call::new("GET", "/health")).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.data()["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(health.data()["environment"], "test");
    let timestamp = health.data()["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());

    let version = app.send(Call::new("GET", "/version")).await;
    assert_eq!(version.data()["name"], "bazaar");
    assert_eq!(version.data()["environment"], "test");
}

#[tokio::test]
async fn test_rate_limit_metrics_show_live_windows() {
    let app = TestApp::new().await;
    for _ in 0..2 {
        app.send(Call::new("POST", "/api/login").json(json!({
            "email": "nobody@x.com",
            "password": PASSWORD,
        })))
        .await;
    }

    let response = app.send(Call::new("GET", "/metrics/rate-limits")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["enabled"], true);

    let classes = response.data()["classes"].as_array().unwrap();
    let names: Vec<&str> = classes.iter().map(|c| c["class"].as_str().unwrap()).collect();
    assert_eq!(names, ["register", "login", "api"]);

    let login = &classes[1];
    assert_eq!(login["limit"], 1_000);
    assert_eq!(login["windowSeconds"], 60);
    assert_eq!(login["clients"][0]["count"], 2);
    assert!(login["clients"][0]["resetsInSeconds"].as_u64().unwrap() <= 60);
}

#[tokio::test]
async fn test_rate_limit_metrics_hidden_in_production() {
    let app = TestApp::with_config(|config| config.environment = "production".to_string()).await;

    let response = app.send(Call::new("GET", "/metrics/rate-limits")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
    assert!(response.body.get("details").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_json_not_found() {
    let app = TestApp::new().await;

    for path in ["/nope", "/api/nope"] {
        let response = app.send(Call::new("GET", path)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(response.body["success"], false);
        assert_eq!(response.body["error"], "NOT_FOUND");
        assert_eq!(response.body["message"], "Route not found");
        assert!(response.body["requestId"].is_string());
    }
}

#[tokio::test]
async fn test_wrong_method_is_json_error() {
    let app = TestApp::new().await;

    let response = app.send(Call::new("GET", "/api/login")).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.body["error"], "METHOD_NOT_ALLOWED");
    assert!(response.body["requestId"].is_string());
}
