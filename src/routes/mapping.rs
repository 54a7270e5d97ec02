use actix_web::{web, HttpResponse, Responder};
use crate::models::{
    ErrorResponse, HealthResponse, MapRecommendationsRequest, MapRecommendationsResponse, MatchOneRequest,
};
use crate::services::{MappingError, MappingService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub mapping: MappingService,
    pub max_batch_size: usize,
}

/// Configure all mapping-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations/map", web::post().to(map_recommendations))
        .route("/recommendations/match", web::post().to(match_recommendation))
        .route("/catalog/tests", web::get().to(available_tests))
        .route("/catalog/refresh", web::post().to(refresh_catalog));
}

fn catalog_failure(context: &str, err: &MappingError) -> HttpResponse {
    match err {
        MappingError::CatalogUnavailable(_) => HttpResponse::BadGateway().json(ErrorResponse {
            error: "Catalog unavailable".to_string(),
            message: format!("{}: {}", context, err),
            status_code: 502,
        }),
        MappingError::TaskFailed(_) => HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Internal error".to_string(),
            message: format!("{}: {}", context, err),
            status_code: 500,
        }),
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let stats = state.mapping.cache().stats().await;

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cached_products: stats.cached_products,
        timestamp: chrono::Utc::now(),
    })
}

/// Map screening recommendations to catalog products
///
/// POST /api/v1/recommendations/map
///
/// Request body:
/// ```json
/// {
///   "recommendations": [
///     { "name": "HbA1c", "explanation": "string", "timeframe": "string", "status": "URGENT" }
///   ]
/// }
/// ```
async fn map_recommendations(
    state: web::Data<AppState>,
    req: web::Json<MapRecommendationsRequest>,
) -> impl Responder {
    let total = req.recommendations.len();
    if total > state.max_batch_size {
        tracing::info!("Rejecting batch of {} recommendations (max {})", total, state.max_batch_size);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: format!("At most {} recommendations per request", state.max_batch_size),
            status_code: 400,
        });
    }

    tracing::info!("Mapping {} recommendations to catalog products", total);

    match state.mapping.map_recommendations(req.into_inner().recommendations).await {
        Ok(outcome) => {
            tracing::info!(
                "Mapped {}/{} recommendations to products",
                outcome.mapped_count,
                outcome.total_recommendations
            );

            HttpResponse::Ok().json(MapRecommendationsResponse {
                mapped_recommendations: outcome.results,
                total_recommendations: outcome.total_recommendations,
                mapped_count: outcome.mapped_count,
            })
        }
        Err(e) => {
            tracing::error!("Failed to map recommendations: {}", e);
            catalog_failure("Failed to map recommendations", &e)
        }
    }
}

/// Match a single recommendation
///
/// POST /api/v1/recommendations/match
async fn match_recommendation(
    state: web::Data<AppState>,
    req: web::Json<MatchOneRequest>,
) -> impl Responder {
    let recommendation = req.into_inner().recommendation;
    let name = recommendation.name.clone();

    match state.mapping.match_one(recommendation).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            tracing::error!("Failed to match '{}': {}", name, e);
            catalog_failure("Failed to match recommendation", &e)
        }
    }
}

/// Test names available in the catalog, flat and grouped by category
///
/// GET /api/v1/catalog/tests
async fn available_tests(state: web::Data<AppState>) -> impl Responder {
    match state.mapping.available_tests().await {
        Ok(tests) => HttpResponse::Ok().json(tests),
        Err(e) => {
            tracing::error!("Failed to list available tests: {}", e);
            catalog_failure("Failed to list available tests", &e)
        }
    }
}

/// Drop the cached catalog snapshot
///
/// POST /api/v1/catalog/refresh
async fn refresh_catalog(state: web::Data<AppState>) -> impl Responder {
    state.mapping.cache().invalidate().await;
    tracing::info!("Catalog snapshot invalidated on request");
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Matcher;
    use crate::models::CatalogProduct;
    use crate::services::{CatalogCache, CatalogClient};
    use actix_web::{test, App};
    use std::sync::Arc;

    fn state(max_batch_size: usize) -> AppState {
        let client = CatalogClient::new(
            "http://127.0.0.1:9".to_string(),
            "key".to_string(),
            "products".to_string(),
            1,
        )
        .unwrap();

        AppState {
            mapping: MappingService::new(Arc::new(client), CatalogCache::new(60), Matcher::default()),
            max_batch_size,
        }
    }

    #[actix_web::test]
    async fn test_batch_limit_is_enforced() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(state(1))).configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/recommendations/map")
            .set_json(serde_json::json!({
                "recommendations": [{ "name": "HbA1c" }, { "name": "Cortisol" }]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_configured_batch_limit_above_one_thousand() {
        let state = state(2000);
        state
            .mapping
            .cache()
            .set(vec![CatalogProduct::new(1, "Lipid Panel", "")])
            .await;

        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).configure(configure),
        )
        .await;

        let recommendations: Vec<_> = (0..1500).map(|_| serde_json::json!({ "name": "Lipid Panel" })).collect();
        let req = test::TestRequest::post()
            .uri("/recommendations/map")
            .set_json(serde_json::json!({ "recommendations": recommendations }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["totalRecommendations"], 1500);
        assert_eq!(body["mappedCount"], 1500);
    }

    #[actix_web::test]
    async fn test_refresh_drops_snapshot() {
        let state = state(10);
        state
            .mapping
            .cache()
            .set(vec![CatalogProduct::new(1, "Lipid Panel", "")])
            .await;

        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/catalog/refresh").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 204);
        assert!(state.mapping.cache().get().await.is_none());
    }
}
