//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use bazaar_api::{AppState, build_app};
use bazaar_cache::CacheManager;
use bazaar_core::config::AppConfig;
use bazaar_core::config::rate_limit::WindowConfig;
use bazaar_core::result::AppResult;
use bazaar_core::traits::payment::{CheckoutSession, LineItem, PaymentGateway};
use bazaar_database::Database;
use bazaar_entity::user::UserRole;
use bazaar_storage::LocalStorageProvider;

/// Browser user agent used by default.
pub const UA: &str = "Mozilla/5.0 (X11; Linux x86_64) BazaarTest/1.0";

/// Strong password accepted by the default policy.
pub const PASSWORD: &str = "Str0ng!Pw";

/// Records checkout requests and answers with a fixed session.
#[derive(Debug, Default)]
pub struct FakeGateway {
    pub calls: Mutex<Vec<Vec<LineItem>>>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    fn provider_type(&self) -> &str {
        "fake"
    }

    async fn create_checkout_session(
        &self,
        items: &[LineItem],
        _customer_reference: Option<&str>,
    ) -> AppResult<CheckoutSession> {
        self.calls.lock().await.push(items.to_vec());
        Ok(CheckoutSession {
            id: "cs_test_42".to_string(),
            url: "https://pay.test/cs_test_42".to_string(),
        })
    }
}

/// Parsed response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `data` of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// One request to send.
#[derive(Debug)]
pub struct Call {
    method: &'static str,
    path: String,
    json: Option<Value>,
    multipart: Option<(String, Vec<u8>)>,
    token: Option<String>,
    user_agent: String,
    forwarded_for: Option<String>,
}

impl Call {
    pub fn new(method: &'static str, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            json: None,
            multipart: None,
            token: None,
            user_agent: UA.to_string(),
            forwarded_for: None,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn forwarded_for(mut self, ip: &str) -> Self {
        self.forwarded_for = Some(ip.to_string());
        self
    }

    /// Multipart form; `files` are sent under the field name `image`.
    pub fn form(mut self, fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Self {
        let boundary = "bazaar-test-boundary".to_string();
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (file_name, content_type, data) in files {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        self.multipart = Some((boundary, body));
        self
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The wired state, for direct store access
    pub state: AppState,
    /// Fake payment provider
    pub gateway: Arc<FakeGateway>,
    _uploads: TempDir,
}

/// Configuration shared by every test app.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.environment = "test".to_string();
    config.database.provider = "memory".to_string();
    config.auth.access_secret = "test-access-secret-0123456789-abcdefghij".to_string();
    config.auth.refresh_secret = "test-refresh-secret-0123456789-abcdefghij".to_string();
    config.auth.hash_memory_kib = 1024;
    config.auth.hash_iterations = 1;
    config.rate_limit.enabled = true;
    let roomy = WindowConfig {
        max_requests: 1_000,
        window_seconds: 60,
    };
    config.rate_limit.register = roomy;
    config.rate_limit.login = roomy;
    config.rate_limit.api = roomy;
    config
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application with adjusted configuration
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let uploads = TempDir::new().expect("temp dir");
        let mut config = test_config();
        config.storage.local.root_path = uploads.path().to_string_lossy().to_string();
        adjust(&mut config);

        let storage = LocalStorageProvider::new(uploads.path(), &config.storage.local.public_base_url)
            .await
            .expect("local storage");
        let gateway = Arc::new(FakeGateway::default());
        let state = AppState::build(
            config,
            Database::in_memory(),
            CacheManager::in_memory(),
            Arc::new(storage),
            gateway.clone(),
        )
        .expect("state");

        Self {
            router: build_app(state.clone()),
            state,
            gateway,
            _uploads: uploads,
        }
    }

    /// Send a request through the full middleware stack.
    pub async fn send(&self, call: Call) -> TestResponse {
        let mut builder = Request::builder()
            .method(call.method)
            .uri(&call.path)
            .header("user-agent", &call.user_agent);
        if let Some(token) = &call.token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        if let Some(ip) = &call.forwarded_for {
            builder = builder.header("x-forwarded-for", ip);
        }

        let body = if let Some((boundary, bytes)) = call.multipart {
            builder = builder.header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            );
            Body::from(bytes)
        } else if let Some(json) = &call.json {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        } else {
            Body::empty()
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Register an account and return its id.
    pub async fn register(&self, email: &str, role: &str) -> Uuid {
        let response = self
            .send(Call::new("POST", "/api/register").json(serde_json::json!({
                "email": email,
                "password": PASSWORD,
                "role": role,
            })))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data()["userId"]
            .as_str()
            .and_then(|id| id.parse().ok())
            .expect("userId")
    }

    /// Log in with the default user agent and return the access token.
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .send(Call::new("POST", "/api/login").json(serde_json::json!({
                "email": email,
                "password": PASSWORD,
            })))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.data()["accessToken"]
            .as_str()
            .expect("accessToken")
            .to_string()
    }

    /// Register, log in, and return `(user id, access token)`.
    pub async fn sign_up(&self, email: &str, role: &str) -> (Uuid, String) {
        let id = self.register(email, role).await;
        (id, self.login(email).await)
    }

    /// Create an administrator directly in the store and log in.
    pub async fn admin(&self, email: &str) -> (Uuid, String) {
        let id = self.register(email, "BUYER").await;
        self.state
            .db
            .users
            .update_role(id, UserRole::Admin)
            .await
            .expect("promote");
        (id, self.login(email).await)
    }
}
