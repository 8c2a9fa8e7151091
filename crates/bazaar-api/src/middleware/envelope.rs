//! Completes error envelopes with the request id and, outside production,
//! the error's source chain.
//!
//! Error responses that did not come from an [`ApiError`](crate::error::ApiError)
//! (timeouts, unmatched methods, body limits) are replaced by an envelope
//! built from their status.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::error::{ApiErrorResponse, ErrorReport};
use crate::state::AppState;

/// Request id header set by the request-id layer.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Rewrite error bodies produced further down the stack.
pub async fn error_envelope(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = request_id(&request);
    let response = next.run(request).await;
    complete(response, request_id, state.config.is_production())
}

fn request_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

fn complete(mut response: Response, request_id: Option<String>, production: bool) -> Response {
    let report = match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => report,
        None if is_bare_error(&response) => bare_report(response.status()),
        None => return response,
    };

    let mut body = report.body;
    body.request_id = request_id;
    if !production {
        body.details = Some(with_debug(body.details.take(), report.chain));
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    parts.headers.remove(CONTENT_TYPE);
    let rendered = Json(body).into_response();
    if let Some(content_type) = rendered.headers().get(CONTENT_TYPE) {
        parts.headers.insert(CONTENT_TYPE, content_type.clone());
    }
    Response::from_parts(parts, rendered.into_body())
}

fn is_bare_error(response: &Response) -> bool {
    let status = response.status();
    (status.is_client_error() || status.is_server_error())
        && !response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"))
}

fn bare_report(status: StatusCode) -> ErrorReport {
    let code = match status {
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::REQUEST_TIMEOUT => "REQUEST_TIMEOUT",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        s if s.is_client_error() => "BAD_REQUEST",
        _ => "INTERNAL_ERROR",
    };
    let message = status.canonical_reason().unwrap_or("Request failed").to_string();
    ErrorReport {
        chain: vec![format!("{} {message}", status.as_u16())],
        body: ApiErrorResponse {
            success: false,
            error: code.to_string(),
            message,
            details: None,
            request_id: None,
        },
    }
}

fn with_debug(details: Option<Value>, chain: Vec<String>) -> Value {
    match details {
        Some(Value::Object(mut map)) => {
            map.insert("debug".to_string(), json!(chain));
            Value::Object(map)
        }
        Some(other) => json!({ "value": other, "debug": chain }),
        None => json!({ "debug": chain }),
    }
}
