use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::core::category::ProductCategory;
use crate::models::domain::MatchResult;

/// Response for the batch mapping endpoint
#[derive(Debug, Clone, Serialize)]
pub struct MapRecommendationsResponse {
    #[serde(rename = "mappedRecommendations")]
    pub mapped_recommendations: Vec<MatchResult>,
    #[serde(rename = "totalRecommendations")]
    pub total_recommendations: usize,
    #[serde(rename = "mappedCount")]
    pub mapped_count: usize,
}

/// Catalog test names, flat and grouped by category
#[derive(Debug, Clone, Serialize)]
pub struct AvailableTestsResponse {
    #[serde(rename = "testNamesByCategory")]
    pub test_names_by_category: BTreeMap<ProductCategory, Vec<String>>,
    #[serde(rename = "allTestNames")]
    pub all_test_names: Vec<String>,
    #[serde(rename = "totalTests")]
    pub total_tests: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(rename = "cachedProducts")]
    pub cached_products: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
