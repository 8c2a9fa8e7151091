//! Maps domain `AppError` to HTTP responses.
//!
//! Every failure leaves the API as the same JSON envelope. The request id
//! and the debug source chain are filled in afterwards by
//! [`crate::middleware::envelope`], which reads the [`ErrorReport`] this
//! module attaches to the response.

use axum::Json;
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use bazaar_core::error::{AppError, ErrorKind};

/// Handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP-facing wrapper around [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Field errors and, outside production, the debug chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Correlates the response with server logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Attached to error responses for the envelope middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// The body as rendered.
    pub body: ApiErrorResponse,
    /// Message plus source chain of the original error.
    pub chain: Vec<String>,
}

/// Status and error code for an error kind.
pub fn classify(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        ErrorKind::Authorization => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
        ErrorKind::RateLimit => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
        ErrorKind::ServiceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        ErrorKind::Database | ErrorKind::Cache | ErrorKind::Storage | ErrorKind::ExternalService => {
            (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR")
        }
        ErrorKind::Internal | ErrorKind::Configuration | ErrorKind::Serialization => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

/// Whole seconds, rounded up, never below one.
pub fn retry_after_seconds(wait: std::time::Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, code) = classify(err.kind);

        let (message, details) = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(kind = %err.kind, error = %err, chain = ?err.chain(), "Request failed");
            let masked = if err.kind.is_upstream() {
                "A backing service failed while handling the request"
            } else {
                "An unexpected error occurred"
            };
            (masked.to_string(), None)
        } else {
            (err.message.clone(), err.details.clone())
        };

        let body = ApiErrorResponse {
            success: false,
            error: code.to_string(),
            message,
            details,
            request_id: None,
        };

        let mut response = (status, Json(body.clone())).into_response();
        if status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(wait) = err.retry_after {
                response
                    .headers_mut()
                    .insert(RETRY_AFTER, HeaderValue::from(retry_after_seconds(wait)));
            }
        }
        response.extensions_mut().insert(ErrorReport {
            body,
            chain: err.chain(),
        });
        response
    }
}
