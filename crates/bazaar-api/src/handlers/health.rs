//! Service info, health, version and limiter diagnostics.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use tracing::warn;

use bazaar_core::error::AppError;
use bazaar_core::traits::cache::CacheProvider;

use crate::dto::response::{
    ApiResponse, ComponentHealth, HealthResponse, RateLimitMetricsResponse, ServiceInfoResponse,
    VersionResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const SERVICE_NAME: &str = "bazaar";

/// GET /
pub async fn service_info(State(state): State<AppState>) -> Json<ApiResponse<ServiceInfoResponse>> {
    Json(ApiResponse::ok(ServiceInfoResponse {
        service: "Bazaar Marketplace API".to_string(),
        status: "operational".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        documentation: state.config.server.docs_url.clone(),
    }))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database = match state.db.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    };
    let cache = match state.cache.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            warn!(error = %e, "Cache health check failed");
            false
        }
    };

    let healthy = database && cache;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        timestamp: Utc::now(),
        database: ComponentHealth {
            provider: state.db.provider_type().to_string(),
            healthy: database,
        },
        cache: ComponentHealth {
            provider: state.cache.provider_type().to_string(),
            healthy: cache,
        },
    };
    (
        status,
        Json(ApiResponse {
            success: healthy,
            data: body,
        }),
    )
}

/// GET /version
pub async fn version(State(state): State<AppState>) -> Json<ApiResponse<VersionResponse>> {
    Json(ApiResponse::ok(VersionResponse {
        name: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
    }))
}

/// GET /metrics/rate-limits
///
/// Limiter configuration and every open window. Hidden in production,
/// where it answers like an unknown route.
pub async fn rate_limit_metrics(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<RateLimitMetricsResponse>>> {
    if state.config.is_production() {
        return Err(route_not_found_error());
    }
    let usage = state.limiter.usage().await?;
    Ok(Json(ApiResponse::ok(RateLimitMetricsResponse {
        enabled: state.limiter.enabled(),
        classes: usage.into_iter().map(Into::into).collect(),
    })))
}

/// Fallback for unmatched paths.
pub async fn route_not_found() -> ApiError {
    route_not_found_error()
}

fn route_not_found_error() -> ApiError {
    ApiError(AppError::not_found("Route not found"))
}
