//! Auth handlers: register, login, refresh, logout, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use bazaar_service::{LoginInput, RegisterInput};

use crate::dto::request::RefreshRequest;
use crate::dto::response::{
    ApiResponse, LoginResponse, MessageResponse, RegisterResponse, UserResponse,
};
use crate::error::ApiResult;
use crate::extractors::{ApiJson, AuthUser, ClientContext};
use crate::state::AppState;

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    ClientContext(client): ClientContext,
    ApiJson(req): ApiJson<RegisterInput>,
) -> ApiResult<(StatusCode, Json<ApiResponse<RegisterResponse>>)> {
    let user = state.auth.register(req, &client).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(RegisterResponse { user_id: user.id })),
    ))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ClientContext(client): ClientContext,
    ApiJson(req): ApiJson<LoginInput>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    let outcome = state.auth.login(req, &client).await?;
    Ok(Json(ApiResponse::ok(outcome.into())))
}

/// POST /api/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ClientContext(client): ClientContext,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    let outcome = state.auth.refresh(&req.refresh_token, &client).await?;
    Ok(Json(ApiResponse::ok(outcome.into())))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.auth.logout(&auth.claims, &auth.ctx.client).await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Logged out".to_string(),
    })))
}

/// GET /api/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = state.users.me(&auth).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}
