//! Product review handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use bazaar_core::types::pagination::PageResponse;
use bazaar_entity::review::Review;
use bazaar_service::NewReview;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiJson, ApiQuery, AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/products/{id}/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Review>>>> {
    let page = state
        .reviews
        .list(product_id, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/products/{id}/reviews
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<Uuid>,
    ApiJson(req): ApiJson<NewReview>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let review = state.reviews.create(&auth, product_id, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(review))))
}
