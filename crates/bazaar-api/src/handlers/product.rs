//! Catalog and seller listing handlers.

use axum::Json;
use axum::extract::multipart::{Field, Multipart, MultipartError, MultipartRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::PageResponse;
use bazaar_entity::product::ProductFilter;
use bazaar_service::{ImageUpload, NewListing};

use crate::dto::request::ProductQuery;
use crate::dto::response::{ApiResponse, MessageResponse, ProductResponse};
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<ProductResponse>>>> {
    let filter = ProductFilter {
        country: non_blank(query.country),
        category: non_blank(query.category),
        seller_id: None,
    };
    let page = state
        .products
        .list(&filter, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page.map(ProductResponse::from))))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<ProductResponse>>> {
    let product = state.products.get(id).await?;
    Ok(Json(ApiResponse::ok(product.into())))
}

/// GET /api/my-products
pub async fn my_products(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ProductResponse>>>> {
    let page = state
        .products
        .list_mine(&auth, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page.map(ProductResponse::from))))
}

/// POST /api/add-product (multipart)
pub async fn add_product(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ProductResponse>>)> {
    let mut multipart = multipart
        .map_err(|e| AppError::validation(format!("Expected a multipart form: {}", e.body_text())))?;
    let listing = read_listing(&mut multipart).await?;
    let product = state.products.create(&auth, listing).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(product.into()))))
}

/// DELETE /api/products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.products.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Product deleted".to_string(),
    })))
}

/// Collect the listing form. Unknown fields are ignored.
async fn read_listing(multipart: &mut Multipart) -> AppResult<NewListing> {
    let mut listing = NewListing::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" | "images" => {
                let file_name = field.file_name().map(String::from);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(malformed)?;
                listing.images.push(ImageUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            "title" => listing.title = Some(text(field).await?),
            "description" => listing.description = Some(text(field).await?),
            "price" => listing.price = Some(text(field).await?),
            "country" => listing.country = Some(text(field).await?),
            "stock" => listing.stock = non_blank(Some(text(field).await?)),
            "categories" | "categories[]" => listing.categories.push(text(field).await?),
            _ => {}
        }
    }

    Ok(listing)
}

async fn text(field: Field<'_>) -> AppResult<String> {
    field.text().await.map_err(malformed)
}

fn malformed(err: MultipartError) -> AppError {
    AppError::validation(format!("Malformed multipart body: {}", err.body_text()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
