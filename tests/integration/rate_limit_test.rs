//! Integration tests for per-class request limiting.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use bazaar_core::config::rate_limit::WindowConfig;
use serde_json::json;

use helpers::{Call, PASSWORD, TestApp};

fn window(max_requests: u64, window_seconds: u64) -> WindowConfig {
    WindowConfig {
        max_requests,
        window_seconds,
    }
}

fn login_call() -> Call {
    Call::new("POST", "/api/login").json(json!({
        "email": "nobody@x.com",
        "password": PASSWORD,
    }))
}

#[tokio::test]
async fn test_login_cap_rejects_before_credentials_are_checked() {
    let app = TestApp::with_config(|c| c.rate_limit.login = window(3, 360)).await;

    for expected_remaining in ["2", "1", "0"] {
        let response = app.send(login_call()).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.header("ratelimit-limit"), Some("3"));
        assert_eq!(response.header("ratelimit-remaining"), Some(expected_remaining));
    }

    let limited = app.send(login_call()).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.body["error"], "RATE_LIMITED");
    assert_eq!(limited.body["message"], "Too many attempts");
    let retry_after: u64 = limited.header("retry-after").unwrap().parse().unwrap();
    assert!((1..=360).contains(&retry_after));
    assert_eq!(limited.header("ratelimit-remaining"), Some("0"));
}

#[tokio::test]
async fn test_classes_are_counted_separately() {
    let app = TestApp::with_config(|c| c.rate_limit.login = window(1, 360)).await;

    app.send(login_call()).await;
    assert_eq!(app.send(login_call()).await.status, StatusCode::TOO_MANY_REQUESTS);

    let catalog = app.send(Call::new("GET", "/api/products")).await;
    assert_eq!(catalog.status, StatusCode::OK);

    let health = app.send(Call::new("GET", "/health")).await;
    assert_eq!(health.status, StatusCode::OK);
    assert!(health.header("ratelimit-limit").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_api_window_resets() {
    let app = TestApp::with_config(|c| c.rate_limit.api = window(2, 60)).await;

    for _ in 0..2 {
        let ok = app.send(Call::new("GET", "/api/products")).await;
        assert_eq!(ok.status, StatusCode::OK);
    }
    let limited = app.send(Call::new("GET", "/api/products")).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.body["message"], "Too many requests. Try again later.");

    tokio::time::advance(Duration::from_secs(61)).await;

    let fresh = app.send(Call::new("GET", "/api/products")).await;
    assert_eq!(fresh.status, StatusCode::OK);
    assert_eq!(fresh.header("ratelimit-remaining"), Some("1"));
}

#[tokio::test]
async fn test_forwarded_clients_have_their_own_budget() {
    let app = TestApp::with_config(|c| {
        c.rate_limit.api = window(1, 60);
        c.server.trust_forwarded_for = true;
    })
    .await;

    let first = app
        .send(Call::new("GET", "/api/products").forwarded_for("203.0.113.7"))
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let again = app
        .send(Call::new("GET", "/api/products").forwarded_for("203.0.113.7"))
        .await;
    assert_eq!(again.status, StatusCode::TOO_MANY_REQUESTS);

    let other = app
        .send(Call::new("GET", "/api/products").forwarded_for("198.51.100.4, 10.0.0.1"))
        .await;
    assert_eq!(other.status, StatusCode::OK);
}

#[tokio::test]
async fn test_disabled_limiter_admits_everything() {
    let app = TestApp::with_config(|c| {
        c.rate_limit.enabled = false;
        c.rate_limit.api = window(1, 60);
    })
    .await;

    for _ in 0..5 {
        let response = app.send(Call::new("GET", "/api/products")).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.header("ratelimit-limit").is_none());
    }
}
