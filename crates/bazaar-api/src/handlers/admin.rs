//! Admin-only handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use bazaar_core::types::pagination::PageResponse;
use bazaar_entity::audit::{AuditEventType, AuditLogEntry};
use bazaar_entity::user::UserRole;

use crate::dto::request::{AuditQuery, RoleChangeRequest, UserQuery};
use crate::dto::response::{ApiResponse, UserResponse};
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiQuery, AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<UserResponse>>>> {
    let role = query.role.as_deref().map(str::parse::<UserRole>).transpose()?;
    let page = state
        .admin
        .list_users(Some(&auth), role, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page.map(UserResponse::from))))
}

/// PUT /api/admin/users/{id}/role
pub async fn set_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    ApiJson(req): ApiJson<RoleChangeRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let role: UserRole = req.role.parse()?;
    let user = state.admin.set_role(Some(&auth), user_id, role).await?;
    Ok(Json(ApiResponse::ok(user.into())))
}

/// GET /api/admin/audit
pub async fn list_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
    ApiQuery(query): ApiQuery<AuditQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<AuditLogEntry>>>> {
    auth.require_role(&[UserRole::Admin])?;
    let event = query
        .event
        .as_deref()
        .map(str::parse::<AuditEventType>)
        .transpose()?;
    let page = state
        .audit
        .list(query.user_id, event, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
