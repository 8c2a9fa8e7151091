//! Integration tests for registration, login, and session binding.

mod helpers;

use axum::http::StatusCode;
use futures::future::join_all;
use serde_json::json;

use helpers::{Call, PASSWORD, TestApp};

#[tokio::test]
async fn test_register_login_and_device_binding() {
    let app = TestApp::new().await;

    let registered = app
        .send(Call::new("POST", "/api/register").json(json!({
            "email": "a@x.com",
            "password": PASSWORD,
        })))
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert!(registered.data()["userId"].is_string());

    let login = app
        .send(Call::new("POST", "/api/login").json(json!({
            "email": "A@X.com ",
            "password": PASSWORD,
        })))
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.data()["tokenType"], "Bearer");
    assert_eq!(login.data()["user"]["role"], "BUYER");
    let token = login.data()["accessToken"].as_str().unwrap().to_string();

    let stolen = app
        .send(
            Call::new("GET", "/api/me")
                .token(&token)
                .user_agent("curl/8.5.0"),
        )
        .await;
    assert_eq!(stolen.status, StatusCode::UNAUTHORIZED);
    assert_eq!(stolen.body["message"], "Session context mismatch");

    let me = app.send(Call::new("GET", "/api/me").token(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["email"], "a@x.com");
    assert!(me.data().get("passwordHash").is_none());
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = TestApp::new().await;
    app.register("dup@x.com", "BUYER").await;

    let again = app
        .send(Call::new("POST", "/api/register").json(json!({
            "email": "DUP@x.com",
            "password": PASSWORD,
        })))
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_concurrent_registrations_create_one_account() {
    let app = TestApp::new().await;

    let attempts = (0..4).map(|_| {
        app.send(Call::new("POST", "/api/register").json(json!({
            "email": "race@x.com",
            "password": PASSWORD,
        })))
    });
    let statuses: Vec<StatusCode> = join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.status)
        .collect();

    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CREATED).count(),
        1,
        "{statuses:?}"
    );
    assert!(
        statuses
            .iter()
            .all(|s| *s == StatusCode::CREATED || *s == StatusCode::CONFLICT)
    );
}

#[tokio::test]
async fn test_register_rejects_weak_password_and_admin_role() {
    let app = TestApp::new().await;

    let weak = app
        .send(Call::new("POST", "/api/register").json(json!({
            "email": "weak@x.com",
            "password": "password",
        })))
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);
    assert!(weak.body["details"]["fields"]["password"].is_array());

    let admin = app
        .send(Call::new("POST", "/api/register").json(json!({
            "email": "boss@x.com",
            "password": PASSWORD,
            "role": "ADMIN",
        })))
        .await;
    assert_eq!(admin.status, StatusCode::BAD_REQUEST);
    assert!(admin.body["details"]["fields"]["role"].is_array());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new().await;
    app.register("known@x.com", "BUYER").await;

    let unknown = app
        .send(Call::new("POST", "/api/login").json(json!({
            "email": "nobody@x.com",
            "password": PASSWORD,
        })))
        .await;
    let wrong = app
        .send(Call::new("POST", "/api/login").json(json!({
            "email": "known@x.com",
            "password": "Wr0ng!Password",
        })))
        .await;

    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body["message"], wrong.body["message"]);
    assert_eq!(unknown.body["error"], wrong.body["error"]);
}

#[tokio::test]
async fn test_repeated_failures_lock_the_account() {
    let app = TestApp::with_config(|c| c.auth.max_failed_attempts = 2).await;
    app.register("locked@x.com", "BUYER").await;

    for _ in 0..2 {
        let failed = app
            .send(Call::new("POST", "/api/login").json(json!({
                "email": "locked@x.com",
                "password": "Wr0ng!Password",
            })))
            .await;
        assert_eq!(failed.status, StatusCode::UNAUTHORIZED);
    }

    let locked = app
        .send(Call::new("POST", "/api/login").json(json!({
            "email": "locked@x.com",
            "password": PASSWORD,
        })))
        .await;
    assert_eq!(locked.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(locked.header("retry-after").is_some());
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.send(Call::new("GET", "/api/me")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
    assert!(response.body["requestId"].is_string());
}

#[tokio::test]
async fn test_refresh_rotates_and_reuse_ends_the_session() {
    let app = TestApp::new().await;
    app.register("r@x.com", "BUYER").await;

    let login = app
        .send(Call::new("POST", "/api/login").json(json!({
            "email": "r@x.com",
            "password": PASSWORD,
        })))
        .await;
    let refresh_token = login.data()["refreshToken"].as_str().unwrap().to_string();

    let rotated = app
        .send(Call::new("POST", "/api/refresh").json(json!({ "refreshToken": refresh_token })))
        .await;
    assert_eq!(rotated.status, StatusCode::OK);
    let access = rotated.data()["accessToken"].as_str().unwrap().to_string();
    let me = app.send(Call::new("GET", "/api/me").token(&access)).await;
    assert_eq!(me.status, StatusCode::OK);

    let replayed = app
        .send(Call::new("POST", "/api/refresh").json(json!({ "refreshToken": refresh_token })))
        .await;
    assert_eq!(replayed.status, StatusCode::UNAUTHORIZED);

    let after = app.send(Call::new("GET", "/api/me").token(&access)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.body["message"], "Session has been revoked");
}

#[tokio::test]
async fn test_logout_revokes_every_token_of_the_session() {
    let app = TestApp::new().await;
    app.register("l@x.com", "BUYER").await;

    let login = app
        .send(Call::new("POST", "/api/login").json(json!({
            "email": "l@x.com",
            "password": PASSWORD,
        })))
        .await;
    let first_access = login.data()["accessToken"].as_str().unwrap().to_string();
    let refresh_token = login.data()["refreshToken"].as_str().unwrap().to_string();

    let rotated = app
        .send(Call::new("POST", "/api/refresh").json(json!({ "refreshToken": refresh_token })))
        .await;
    let access = rotated.data()["accessToken"].as_str().unwrap().to_string();
    let second_refresh = rotated.data()["refreshToken"].as_str().unwrap().to_string();

    let logout = app.send(Call::new("POST", "/api/logout").token(&access)).await;
    assert_eq!(logout.status, StatusCode::OK);

    let after = app.send(Call::new("GET", "/api/me").token(&access)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);

    let earlier = app.send(Call::new("GET", "/api/me").token(&first_access)).await;
    assert_eq!(earlier.status, StatusCode::UNAUTHORIZED);
    assert_eq!(earlier.body["message"], "Session has been revoked");

    let refreshed = app
        .send(Call::new("POST", "/api/refresh").json(json!({ "refreshToken": second_refresh })))
        .await;
    assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);

    let again = app.login("l@x.com").await;
    let me = app.send(Call::new("GET", "/api/me").token(&again)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_changes_roles_and_reads_audit_log() {
    let app = TestApp::new().await;
    let (buyer_id, buyer_token) = app.sign_up("buyer@x.com", "BUYER").await;
    let (_, admin_token) = app.admin("root@x.com").await;

    let denied = app
        .send(Call::new("GET", "/api/admin/users").token(&buyer_token))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let users = app
        .send(Call::new("GET", "/api/admin/users?role=BUYER").token(&admin_token))
        .await;
    assert_eq!(users.status, StatusCode::OK);
    assert_eq!(users.data()["totalItems"], 1);

    let promoted = app
        .send(
            Call::new("PUT", format!("/api/admin/users/{buyer_id}/role"))
                .token(&admin_token)
                .json(json!({ "role": "SELLER" })),
        )
        .await;
    assert_eq!(promoted.status, StatusCode::OK);
    assert_eq!(promoted.data()["role"], "SELLER");

    let audit = app
        .send(
            Call::new("GET", format!("/api/admin/audit?userId={buyer_id}&event=user.role_changed"))
                .token(&admin_token),
        )
        .await;
    assert_eq!(audit.status, StatusCode::OK);
    assert_eq!(audit.data()["totalItems"], 1);
}

#[tokio::test]
async fn test_demoted_admin_loses_access_immediately() {
    let app = TestApp::new().await;
    let (demoted_id, demoted_token) = app.admin("first@x.com").await;
    let (_, other_token) = app.admin("second@x.com").await;

    let before = app
        .send(Call::new("GET", "/api/admin/users").token(&demoted_token))
        .await;
    assert_eq!(before.status, StatusCode::OK);

    let demoted = app
        .send(
            Call::new("PUT", format!("/api/admin/users/{demoted_id}/role"))
                .token(&other_token)
                .json(json!({ "role": "BUYER" })),
        )
        .await;
    assert_eq!(demoted.status, StatusCode::OK);

    let stale = app
        .send(Call::new("GET", "/api/admin/users").token(&demoted_token))
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);
    assert_eq!(stale.body["message"], "Session has been revoked");

    let fresh = app.login("first@x.com").await;
    let me = app.send(Call::new("GET", "/api/me").token(&fresh)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["role"], "BUYER");
    let forbidden = app
        .send(Call::new("GET", "/api/admin/users").token(&fresh))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health_reports_components() {
    let app = TestApp::new().await;

    let response = app.send(Call::new("GET", "/health")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"]["provider"], "memory");
}
