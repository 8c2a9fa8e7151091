//! Assign a country to products that have none.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use bazaar_core::config::backfill::BackfillConfig;
use bazaar_core::config::validate_country_list;
use bazaar_core::error::AppError;
use bazaar_core::result::AppResult;
use bazaar_database::store::ProductStore;

use super::retry::retry_with_delay;

/// Outcome of a backfill run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    /// Nothing was written.
    pub dry_run: bool,
    /// Products found without a country.
    pub candidates: usize,
    /// Rows actually updated.
    pub updated: u64,
    /// Batches written (or planned, in a dry run).
    pub batches: usize,
    /// Products assigned per country.
    pub distribution: BTreeMap<String, u64>,
}

/// Random country backfill over the product catalog.
#[derive(Debug, Clone)]
pub struct CountryBackfill {
    products: Arc<dyn ProductStore>,
    config: BackfillConfig,
}

impl CountryBackfill {
    /// Creates a backfill job.
    pub fn new(products: Arc<dyn ProductStore>, config: BackfillConfig) -> Self {
        Self { products, config }
    }

    /// Override the configured batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Run the backfill. Each batch is its own transaction; a batch that
    /// still fails after the configured retries aborts the run, leaving
    /// earlier batches committed.
    pub async fn run(&self, dry_run: bool) -> AppResult<BackfillReport> {
        validate_country_list(&self.config.countries)?;
        if self.config.batch_size == 0 {
            return Err(AppError::configuration("backfill.batch_size must be positive"));
        }

        let ids = self.products.find_missing_country().await?;
        let plan = assign_random(&ids, &self.config.countries)?;

        let mut distribution = BTreeMap::new();
        for (_, country) in &plan {
            *distribution.entry(country.clone()).or_insert(0u64) += 1;
        }

        let batches: Vec<&[(Uuid, String)]> = plan.chunks(self.config.batch_size).collect();
        info!(
            candidates = plan.len(),
            batches = batches.len(),
            dry_run,
            "Country backfill planned"
        );

        let mut updated = 0u64;
        if !dry_run {
            let delay = Duration::from_millis(self.config.retry_delay_ms);
            for (index, batch) in batches.iter().enumerate() {
                let written = retry_with_delay(
                    "assign_countries",
                    self.config.max_retries,
                    delay,
                    || self.products.assign_countries(batch),
                )
                .await?;
                updated += written;
                info!(
                    batch = index + 1,
                    of = batches.len(),
                    written,
                    "Country batch committed"
                );
            }
        }

        Ok(BackfillReport {
            dry_run,
            candidates: plan.len(),
            updated,
            batches: batches.len(),
            distribution,
        })
    }
}

fn assign_random(ids: &[Uuid], countries: &[String]) -> AppResult<Vec<(Uuid, String)>> {
    let mut rng = rand::rng();
    ids.iter()
        .map(|id| {
            countries
                .choose(&mut rng)
                .map(|country| (*id, country.trim().to_string()))
                .ok_or_else(|| AppError::configuration("backfill.countries must not be empty"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use bazaar_core::error::ErrorKind;
    use bazaar_core::types::pagination::{PageRequest, PageResponse};
    use bazaar_database::memory::MemoryProductStore;
    use bazaar_entity::product::{CreateProduct, Product, ProductFilter};
    use chrono::Utc;

    use super::*;

    /// Fails the first `failures` batch writes.
    #[derive(Debug)]
    struct FlakyStore {
        inner: MemoryProductStore,
        failures: AtomicU32,
    }

    #[async_trait]
    impl ProductStore for FlakyStore {
        async fn create(&self, data: &CreateProduct) -> AppResult<Product> {
            self.inner.create(data).await
        }

        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
            self.inner.find_by_id(id).await
        }

        async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
            self.inner.find_many(ids).await
        }

        async fn list(
            &self,
            filter: &ProductFilter,
            page: &PageRequest,
        ) -> AppResult<PageResponse<Product>> {
            self.inner.list(filter, page).await
        }

        async fn delete(&self, id: Uuid) -> AppResult<bool> {
            self.inner.delete(id).await
        }

        async fn find_missing_country(&self) -> AppResult<Vec<Uuid>> {
            self.inner.find_missing_country().await
        }

        async fn assign_countries(&self, assignments: &[(Uuid, String)]) -> AppResult<u64> {
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(AppError::database("serialization failure"));
            }
            self.inner.assign_countries(assignments).await
        }
    }

    fn legacy(country: Option<&str>) -> Product {
        Product {
            id: Uuid::new_v4(),
            title: "Old listing".to_string(),
            description: "Imported".to_string(),
            price_cents: 1_000,
            images: vec![],
            country: country.map(String::from),
            categories: vec![],
            stock: 1,
            seller_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    async fn store(missing: usize, failures: u32) -> Arc<FlakyStore> {
        let inner = MemoryProductStore::new();
        for i in 0..missing {
            let country = if i % 2 == 0 { None } else { Some("  ") };
            inner.insert_raw(legacy(country)).await;
        }
        inner.insert_raw(legacy(Some("Qatar"))).await;
        Arc::new(FlakyStore {
            inner,
            failures: AtomicU32::new(failures),
        })
    }

    fn config(countries: &[&str]) -> BackfillConfig {
        BackfillConfig {
            countries: countries.iter().map(|c| c.to_string()).collect(),
            batch_size: 2,
            max_retries: 3,
            retry_delay_ms: 2000,
        }
    }

    #[tokio::test]
    async fn test_fills_every_missing_country() {
        let store = store(5, 0).await;
        let job = CountryBackfill::new(store.clone(), config(&["Egypt", "Jordan"]));

        let report = job.run(false).await.unwrap();
        assert_eq!(report.candidates, 5);
        assert_eq!(report.updated, 5);
        assert_eq!(report.batches, 3);
        assert_eq!(report.distribution.values().sum::<u64>(), 5);
        assert!(report
            .distribution
            .keys()
            .all(|c| c == "Egypt" || c == "Jordan"));

        assert!(store.find_missing_country().await.unwrap().is_empty());
        let again = job.run(false).await.unwrap();
        assert_eq!(again.candidates, 0);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let store = store(3, 0).await;
        let report = CountryBackfill::new(store.clone(), config(&["Libya"]))
            .run(true)
            .await
            .unwrap();
        assert!(report.dry_run);
        assert_eq!(report.candidates, 3);
        assert_eq!(report.updated, 0);
        assert_eq!(report.distribution.get("Libya"), Some(&3));
        assert_eq!(store.find_missing_country().await.unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_batch_failures_are_retried() {
        let store = store(2, 2).await;
        let report = CountryBackfill::new(store.clone(), config(&["Oman"]))
            .run(false)
            .await
            .unwrap();
        assert_eq!(report.updated, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_fail_the_run() {
        let store = store(2, 10).await;
        let err = CountryBackfill::new(store.clone(), config(&["Oman"]))
            .run(false)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        assert_eq!(store.find_missing_country().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rejects_bad_country_list() {
        let store = store(1, 0).await;
        for countries in [&[][..], &["Iraq", "iraq"][..]] {
            let err = CountryBackfill::new(store.clone(), config(countries))
                .run(true)
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Configuration);
        }
    }

    #[tokio::test]
    async fn test_batch_size_override() {
        let store = store(4, 0).await;
        let report = CountryBackfill::new(store, config(&["Syria"]))
            .with_batch_size(10)
            .run(true)
            .await
            .unwrap();
        assert_eq!(report.batches, 1);
    }
}
