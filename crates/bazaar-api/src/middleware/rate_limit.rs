//! Fixed-window rate limiting per route class.
//!
//! Runs before the handler, so a rejected request never reaches
//! validation, the stores, or the password hasher.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use bazaar_auth::{RateLimitDecision, RouteClass};
use bazaar_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::client_ip;
use crate::state::AppState;

/// `RateLimit-Limit`.
pub const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
/// `RateLimit-Remaining`.
pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
/// `RateLimit-Reset`.
pub const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Middleware state: the app plus the class this route group belongs to.
pub type LimitState = (AppState, RouteClass);

/// Count the request against its class and reject it once over the cap.
pub async fn rate_limit(
    State((state, class)): State<LimitState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.limiter.enabled() {
        return next.run(request).await;
    }

    let client = client_ip(
        request.headers(),
        request.extensions(),
        state.config.server.trust_forwarded_for,
    );
    let decision = match state.limiter.check(class, &client).await {
        Ok(decision) => decision,
        Err(e) => return ApiError(e).into_response(),
    };

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        warn!(class = %class, client = %client, limit = decision.limit, "Rate limit exceeded");
        ApiError(AppError::rate_limited(
            rejection_message(class),
            decision.reset_after,
        ))
        .into_response()
    };
    apply_headers(response.headers_mut(), &decision);
    response
}

fn rejection_message(class: RouteClass) -> &'static str {
    match class {
        RouteClass::Register | RouteClass::Login => "Too many attempts",
        RouteClass::Api => "Too many requests. Try again later.",
    }
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(RATE_LIMIT_RESET, HeaderValue::from(decision.reset_seconds()));
}
