// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Biomarker, CatalogProduct, MatchResult, MatchStrategy, Recommendation, RecommendationStatus};
pub use requests::{MapRecommendationsRequest, MatchOneRequest};
pub use responses::{AvailableTestsResponse, ErrorResponse, HealthResponse, MapRecommendationsResponse};
