//! Product repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_core::error::{AppError, ErrorKind};
use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::{PageRequest, PageResponse};
use bazaar_entity::product::{CreateProduct, Product, ProductFilter};

use crate::store::ProductStore;

/// Shared `WHERE` clause; `$1` country, `$2` category, `$3` seller.
const FILTER_CLAUSE: &str = r#"($1::text IS NULL OR LOWER(country) = LOWER($1))
    AND ($2::text IS NULL OR EXISTS (
        SELECT 1 FROM unnest(categories) AS c WHERE LOWER(c) = LOWER($2)))
    AND ($3::uuid IS NULL OR seller_id = $3)"#;

/// Repository for the product catalog.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn create(&self, data: &CreateProduct) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(
            r#"INSERT INTO products
                   (id, title, description, price_cents, images, country, categories, stock, seller_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING *"#,
        )
        .bind(Uuid::now_v7())
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.price_cents)
        .bind(&data.images)
        .bind(&data.country)
        .bind(&data.categories)
        .bind(data.stock)
        .bind(data.seller_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create product", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find product", e))
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load products", e))
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Product>> {
        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products WHERE {FILTER_CLAUSE}"))
                .bind(&filter.country)
                .bind(&filter.category)
                .bind(filter.seller_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count products", e)
                })?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT * FROM products WHERE {FILTER_CLAUSE} \
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        ))
        .bind(&filter.country)
        .bind(&filter.category)
        .bind(filter.seller_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list products", e))?;

        Ok(PageResponse::new(
            products,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete product", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_missing_country(&self) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            r#"SELECT id FROM products
               WHERE country IS NULL OR BTRIM(country) = ''
               ORDER BY created_at ASC, id ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find products without country", e)
        })
    }

    async fn assign_countries(&self, assignments: &[(Uuid, String)]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut updated = 0u64;
        for (id, country) in assignments {
            let result = sqlx::query("UPDATE products SET country = $2 WHERE id = $1")
                .bind(id)
                .bind(country)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to assign country", e)
                })?;
            updated += result.rows_affected();
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit country batch", e)
        })?;

        Ok(updated)
    }
}
