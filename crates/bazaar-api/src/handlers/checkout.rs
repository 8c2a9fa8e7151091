//! Checkout handler.

use axum::Json;
use axum::extract::State;

use crate::dto::request::CheckoutRequest;
use crate::dto::response::{ApiResponse, CheckoutResponse};
use crate::error::ApiResult;
use crate::extractors::{ApiJson, AuthUser};
use crate::state::AppState;

/// POST /api/checkout
///
/// Open to guests; a signed-in buyer is passed on as the customer reference.
pub async fn checkout(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    ApiJson(req): ApiJson<CheckoutRequest>,
) -> ApiResult<Json<ApiResponse<CheckoutResponse>>> {
    let session = state
        .checkout
        .checkout(auth.as_ref().map(AuthUser::context), &req.cart)
        .await?;
    Ok(Json(ApiResponse::ok(CheckoutResponse {
        redirect_url: session.url,
        session_id: session.id,
    })))
}
