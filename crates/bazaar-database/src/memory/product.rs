//! In-memory product store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_core::types::pagination::{PageRequest, PageResponse};
use bazaar_entity::product::{CreateProduct, Product, ProductFilter};

use super::paginate;
use crate::store::ProductStore;

/// Process-local product catalog.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    inner: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryProductStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed row, e.g. a legacy product without a country.
    pub async fn insert_raw(&self, product: Product) {
        self.inner.write().await.insert(product.id, product);
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn create(&self, data: &CreateProduct) -> AppResult<Product> {
        let product = Product {
            id: Uuid::now_v7(),
            title: data.title.clone(),
            description: data.description.clone(),
            price_cents: data.price_cents,
            images: data.images.clone(),
            country: Some(data.country.clone()),
            categories: data.categories.clone(),
            stock: data.stock,
            seller_id: data.seller_id,
            created_at: Utc::now(),
        };
        self.inner.write().await.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.inner.read().await.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        let products = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Product>> {
        let products = self.inner.read().await;
        let mut matching: Vec<Product> = products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(&matching, page))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.inner.write().await.remove(&id).is_some())
    }

    async fn find_missing_country(&self) -> AppResult<Vec<Uuid>> {
        let products = self.inner.read().await;
        let mut missing: Vec<&Product> = products
            .values()
            .filter(|p| p.is_missing_country())
            .collect();
        missing.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(missing.into_iter().map(|p| p.id).collect())
    }

    async fn assign_countries(&self, assignments: &[(Uuid, String)]) -> AppResult<u64> {
        let mut products = self.inner.write().await;
        if let Some((id, _)) = assignments.iter().find(|(id, _)| !products.contains_key(id)) {
            return Err(AppError::not_found(format!("Product {id} not found")));
        }
        for (id, country) in assignments {
            if let Some(product) = products.get_mut(id) {
                product.country = Some(country.clone());
            }
        }
        Ok(assignments.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(seller_id: Uuid, country: &str) -> CreateProduct {
        CreateProduct {
            seller_id,
            title: "Rug".to_string(),
            description: "Hand woven".to_string(),
            price_cents: 12000,
            images: vec![],
            country: country.to_string(),
            categories: vec!["Textiles".to_string()],
            stock: 2,
        }
    }

    #[tokio::test]
    async fn test_list_newest_first_with_filter() {
        let store = MemoryProductStore::new();
        let seller = Uuid::new_v4();
        let first = store.create(&listing(seller, "Oman")).await.unwrap();
        let second = store.create(&listing(seller, "Qatar")).await.unwrap();

        let all = store
            .list(&ProductFilter::default(), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.items[0].id, second.id);
        assert_eq!(all.items[1].id, first.id);

        let oman = ProductFilter {
            country: Some("oman".to_string()),
            ..Default::default()
        };
        let page = store.list(&oman, &PageRequest::default()).await.unwrap();
        assert_eq!(page.total_items, 1);
    }

    #[tokio::test]
    async fn test_assign_countries_all_or_nothing() {
        let store = MemoryProductStore::new();
        let mut legacy = store.create(&listing(Uuid::new_v4(), "Oman")).await.unwrap();
        legacy.country = None;
        store.insert_raw(legacy.clone()).await;
        assert_eq!(store.find_missing_country().await.unwrap(), vec![legacy.id]);

        let bad = vec![
            (legacy.id, "Egypt".to_string()),
            (Uuid::new_v4(), "Egypt".to_string()),
        ];
        assert!(store.assign_countries(&bad).await.is_err());
        assert!(store.find_by_id(legacy.id).await.unwrap().unwrap().country.is_none());

        let good = vec![(legacy.id, "Egypt".to_string())];
        assert_eq!(store.assign_countries(&good).await.unwrap(), 1);
        assert!(store.find_missing_country().await.unwrap().is_empty());
    }
}
