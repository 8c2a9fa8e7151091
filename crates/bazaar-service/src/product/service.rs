//! Product listing service.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use bazaar_core::config::storage::StorageConfig;
use bazaar_core::error::{AppError, FieldErrors};
use bazaar_core::result::AppResult;
use bazaar_core::traits::storage::ObjectStorage;
use bazaar_core::types::pagination::{PageRequest, PageResponse};
use bazaar_database::store::{ProductStore, UserStore};
use bazaar_entity::product::{CreateProduct, Product, ProductFilter, parse_price};
use bazaar_entity::user::UserRole;

use super::image::ImageUpload;
use crate::context::RequestContext;

/// Storage folder for product images.
pub const IMAGE_FOLDER: &str = "products";

const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 5000;
const MAX_IMAGES: usize = 10;
const PRICE_FORMAT: &str = "Price must be a positive decimal with at most 2 decimals";

/// A listing as submitted by a seller, before validation.
#[derive(Debug, Clone, Default)]
pub struct NewListing {
    /// Product title.
    pub title: Option<String>,
    /// Product description.
    pub description: Option<String>,
    /// Decimal price, e.g. `"19.99"`.
    pub price: Option<String>,
    /// Country of origin.
    pub country: Option<String>,
    /// Units available; 1 when absent.
    pub stock: Option<String>,
    /// Category labels.
    pub categories: Vec<String>,
    /// Attached images.
    pub images: Vec<ImageUpload>,
}

/// Catalog reads and seller listing management.
#[derive(Debug, Clone)]
pub struct ProductService {
    products: Arc<dyn ProductStore>,
    users: Arc<dyn UserStore>,
    storage: Arc<dyn ObjectStorage>,
    max_image_bytes: usize,
    upload_timeout: Duration,
}

impl ProductService {
    /// Creates a new product service.
    pub fn new(
        products: Arc<dyn ProductStore>,
        users: Arc<dyn UserStore>,
        storage: Arc<dyn ObjectStorage>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            products,
            users,
            storage,
            max_image_bytes: config.max_image_bytes,
            upload_timeout: Duration::from_secs(config.upload_timeout_seconds),
        }
    }

    /// Paged catalog, newest first.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Product>> {
        self.products.list(filter, page).await
    }

    /// One product.
    pub async fn get(&self, id: Uuid) -> AppResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Product not found"))
    }

    /// The calling seller's own products.
    pub async fn list_mine(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Product>> {
        ctx.require_role(&[UserRole::Seller])?;
        let filter = ProductFilter {
            seller_id: Some(ctx.user_id),
            ..ProductFilter::default()
        };
        self.products.list(&filter, page).await
    }

    /// Validate a listing, upload its images, and store it.
    pub async fn create(&self, ctx: &RequestContext, listing: NewListing) -> AppResult<Product> {
        ctx.require_role(&[UserRole::Seller])?;

        // The token role may be stale; the store is authoritative.
        let seller = self
            .users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::authentication("User no longer exists"))?;
        if seller.role != UserRole::Seller {
            return Err(AppError::authorization("This action requires role SELLER"));
        }

        let draft = self.validate(listing)?;
        let urls = self.upload_images(&draft.images).await?;

        let data = CreateProduct {
            seller_id: seller.id,
            title: draft.title,
            description: draft.description,
            price_cents: draft.price_cents,
            images: urls.clone(),
            country: draft.country,
            categories: draft.categories,
            stock: draft.stock,
        };
        match self.products.create(&data).await {
            Ok(product) => {
                info!(
                    product_id = %product.id,
                    seller_id = %seller.id,
                    images = product.images.len(),
                    "Product listed"
                );
                Ok(product)
            }
            Err(e) => {
                self.remove_images(&urls).await;
                Err(e)
            }
        }
    }

    /// Delete a product. Only its seller or an admin may do so.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let product = self.get(id).await?;
        let owner = ctx.role == UserRole::Seller && product.is_owned_by(ctx.user_id);
        if !(owner || ctx.is_admin()) {
            return Err(AppError::authorization(
                "Only the seller or an administrator can delete this product",
            ));
        }

        if !self.products.delete(id).await? {
            return Err(AppError::not_found("Product not found"));
        }
        self.remove_images(&product.images).await;
        info!(product_id = %id, deleted_by = %ctx.user_id, "Product deleted");
        Ok(())
    }

    fn validate(&self, listing: NewListing) -> AppResult<Draft> {
        let mut fields = FieldErrors::new();
        let mut fail = |field: &str, message: String| {
            fields.entry(field.to_string()).or_default().push(message);
        };

        let title = required(listing.title);
        let description = required(listing.description);
        let price = required(listing.price);
        let country = required(listing.country);

        match &title {
            None => fail("title", "Title is required".to_string()),
            Some(t) if t.chars().count() > MAX_TITLE_LEN => {
                fail("title", format!("Title must be at most {MAX_TITLE_LEN} characters"))
            }
            Some(_) => {}
        }
        match &description {
            None => fail("description", "Description is required".to_string()),
            Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => fail(
                "description",
                format!("Description must be at most {MAX_DESCRIPTION_LEN} characters"),
            ),
            Some(_) => {}
        }
        if country.is_none() {
            fail("country", "Country is required".to_string());
        }

        let price_cents = match price.as_deref().map(parse_price) {
            None => {
                fail("price", "Price is required".to_string());
                None
            }
            Some(Ok(cents)) => Some(cents),
            Some(Err(_)) => {
                fail("price", PRICE_FORMAT.to_string());
                None
            }
        };

        let stock = match required(listing.stock) {
            None => Some(1),
            Some(raw) => match raw.parse::<i32>() {
                Ok(n) if n >= 0 => Some(n),
                _ => {
                    fail("stock", "Stock must be a non-negative whole number".to_string());
                    None
                }
            },
        };

        if listing.images.len() > MAX_IMAGES {
            fail("image", format!("At most {MAX_IMAGES} images are allowed"));
        }
        for image in &listing.images {
            if let Some(problem) = image.check(self.max_image_bytes) {
                fail("image", problem);
            }
        }

        let categories = normalize_categories(&listing.categories);

        match (title, description, price_cents, country, stock) {
            (Some(title), Some(description), Some(price_cents), Some(country), Some(stock))
                if fields.is_empty() =>
            {
                Ok(Draft {
                    title,
                    description,
                    price_cents,
                    country,
                    stock,
                    categories,
                    images: listing.images,
                })
            }
            _ => Err(AppError::validation_fields(fields)),
        }
    }

    async fn upload_images(&self, images: &[ImageUpload]) -> AppResult<Vec<String>> {
        let mut urls = Vec::with_capacity(images.len());
        for image in images {
            let name = image.object_name();
            let upload = self.storage.put(
                IMAGE_FOLDER,
                &name,
                &image.content_type,
                image.data.clone(),
            );
            let result = match tokio::time::timeout(self.upload_timeout, upload).await {
                Ok(result) => result,
                Err(_) => Err(AppError::storage("Image upload timed out")),
            };
            match result {
                Ok(url) => urls.push(url),
                Err(e) => {
                    warn!(error = %e, uploaded = urls.len(), "Image upload failed, rolling back");
                    self.remove_images(&urls).await;
                    return Err(e);
                }
            }
        }
        Ok(urls)
    }

    async fn remove_images(&self, urls: &[String]) {
        for url in urls {
            if let Err(e) = self.storage.remove(url).await {
                warn!(url = %url, error = %e, "Failed to remove product image");
            }
        }
    }
}

/// A listing that passed validation.
struct Draft {
    title: String,
    description: String,
    price_cents: i64,
    country: String,
    stock: i32,
    categories: Vec<String>,
    images: Vec<ImageUpload>,
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim, split comma lists, and drop blanks and case-insensitive duplicates.
fn normalize_categories(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in raw.iter().flat_map(|r| r.split(',')).map(str::trim) {
        if !label.is_empty() && !out.iter().any(|c| c.eq_ignore_ascii_case(label)) {
            out.push(label.to_string());
        }
    }
    out
}
