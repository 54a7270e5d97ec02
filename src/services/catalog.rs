use crate::models::CatalogProduct;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when fetching the product catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Catalog API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid catalog API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// REST client for the product catalog (PostgREST / Supabase style)
///
/// Only available products are requested, and rows flagged unavailable
/// are dropped again client side before the catalog reaches the matcher.
pub struct CatalogClient {
    base_url: String,
    api_key: String,
    products_table: String,
    client: Client,
}

impl CatalogClient {
    /// Create a new catalog client
    pub fn new(
        base_url: String,
        api_key: String,
        products_table: String,
        timeout_secs: u64,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            products_table,
            client,
        })
    }

    fn products_url(&self) -> String {
        format!(
            "{}/rest/v1/{}?select=*&available=eq.true",
            self.base_url.trim_end_matches('/'),
            self.products_table
        )
    }

    /// Fetch every available product
    pub async fn fetch_available_products(&self) -> Result<Vec<CatalogProduct>, CatalogError> {
        let url = self.products_url();

        tracing::debug!("Fetching catalog from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CatalogError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Catalog request failed: {} - {}", status, body);
            return Err(CatalogError::ApiError(format!("Failed to fetch products: {}", status)));
        }

        let json: Value = response.json().await?;
        let products = parse_products(json)?;

        tracing::debug!("Fetched {} available products", products.len());

        Ok(products)
    }
}

/// Turn a catalog response body into products
///
/// Accepts a bare array or a `{ "data": [...] }` envelope. Rows that fail to
/// deserialize are skipped with a warning instead of failing the catalog.
pub fn parse_products(json: Value) -> Result<Vec<CatalogProduct>, CatalogError> {
    let rows = match json {
        Value::Array(rows) => rows,
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => return Err(CatalogError::InvalidResponse("Missing products array".into())),
        },
        _ => return Err(CatalogError::InvalidResponse("Expected a JSON array of products".into())),
    };

    let products = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<CatalogProduct>(row) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::warn!("Skipping malformed catalog row: {}", e);
                None
            }
        })
        .filter(CatalogProduct::is_available)
        .collect();

    Ok(products)
}
