use crate::core::{all_test_names, test_names_by_category, Matcher};
use crate::models::{AvailableTestsResponse, MatchResult, Recommendation};
use crate::services::cache::{CatalogCache, CatalogSnapshot};
use crate::services::catalog::{CatalogClient, CatalogError};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while mapping a batch
#[derive(Debug, Error)]
pub enum MappingError {
    /// The catalog could not be fetched; no partial matching is attempted
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(#[from] Arc<CatalogError>),

    #[error("Matching task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Matched batch plus the counts the client displays
#[derive(Debug, Clone)]
pub struct MappingOutcome {
    pub results: Vec<MatchResult>,
    pub total_recommendations: usize,
    pub mapped_count: usize,
}

impl MappingOutcome {
    pub fn new(results: Vec<MatchResult>) -> Self {
        let mapped_count = results.iter().filter(|r| r.is_matched()).count();
        Self {
            total_recommendations: results.len(),
            mapped_count,
            results,
        }
    }
}

/// Glue between the catalog provider and the pure matcher
#[derive(Clone)]
pub struct MappingService {
    catalog: Arc<CatalogClient>,
    cache: CatalogCache,
    matcher: Arc<Matcher>,
}

impl MappingService {
    pub fn new(catalog: Arc<CatalogClient>, cache: CatalogCache, matcher: Matcher) -> Self {
        Self {
            catalog,
            cache,
            matcher: Arc::new(matcher),
        }
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    /// Current catalog snapshot, fetched through the cache
    pub async fn catalog(&self) -> Result<CatalogSnapshot, MappingError> {
        let snapshot = self
            .cache
            .get_or_fetch(|| self.catalog.fetch_available_products())
            .await
            .map_err(|e| {
                tracing::error!("Failed to load catalog: {}", e);
                MappingError::from(e)
            })?;

        Ok(snapshot)
    }

    /// Map a whole batch; fails as a unit when the catalog is unavailable
    pub async fn map_recommendations(
        &self,
        recommendations: Vec<Recommendation>,
    ) -> Result<MappingOutcome, MappingError> {
        let catalog = self.catalog().await?;
        let matcher = Arc::clone(&self.matcher);

        // CPU-bound; keep it off the async workers
        let results = tokio::task::spawn_blocking(move || {
            matcher.map_recommendations_to_products(&recommendations, &catalog)
        })
        .await?;

        Ok(MappingOutcome::new(results))
    }

    /// Match a single recommendation against the current catalog
    pub async fn match_one(&self, recommendation: Recommendation) -> Result<MatchResult, MappingError> {
        let catalog = self.catalog().await?;
        let matcher = Arc::clone(&self.matcher);

        let result =
            tokio::task::spawn_blocking(move || matcher.match_one(&recommendation, &catalog)).await?;

        Ok(result)
    }

    /// Flat and grouped listing of the test names currently for sale
    pub async fn available_tests(&self) -> Result<AvailableTestsResponse, MappingError> {
        let catalog = self.catalog().await?;
        let all_test_names = all_test_names(&catalog);

        Ok(AvailableTestsResponse {
            test_names_by_category: test_names_by_category(&catalog),
            total_tests: all_test_names.len(),
            all_test_names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogProduct;

    fn service() -> MappingService {
        let client = CatalogClient::new(
            "http://127.0.0.1:9".to_string(),
            "key".to_string(),
            "products".to_string(),
            1,
        )
        .unwrap();
        MappingService::new(Arc::new(client), CatalogCache::new(60), Matcher::default())
    }

    #[tokio::test]
    async fn test_maps_against_cached_catalog() {
        let service = service();
        service
            .cache()
            .set(vec![CatalogProduct::new(1, "Lipid Panel", "Cholesterol")])
            .await;

        let outcome = service
            .map_recommendations(vec![Recommendation::named("Lipid Panel"), Recommendation::named("Zinc")])
            .await
            .unwrap();

        assert_eq!(outcome.total_recommendations, 2);
        assert_eq!(outcome.mapped_count, 1);
        assert_eq!(outcome.results[0].score, 1.0);
        assert!(!outcome.results[1].is_matched());
    }

    #[tokio::test]
    async fn test_match_one_against_cached_catalog() {
        let service = service();
        service
            .cache()
            .set(vec![
                CatalogProduct::new(1, "Stress Profile", "Saliva sample"),
                CatalogProduct::new(2, "Cortisol Test", "Morning cortisol"),
            ])
            .await;

        let result = service.match_one(Recommendation::named("Cortisol")).await.unwrap();

        assert_eq!(result.matched_product.unwrap().id, 2);
        assert_eq!(result.recommendation.name, "Cortisol");
    }

    #[tokio::test]
    async fn test_unreachable_catalog_fails_whole_batch() {
        let service = service();
        let result = service
            .map_recommendations(vec![Recommendation::named("Lipid Panel")])
            .await;

        assert!(matches!(result, Err(MappingError::CatalogUnavailable(_))));
    }
}
