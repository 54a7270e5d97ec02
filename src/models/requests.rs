use serde::{Deserialize, Serialize};
use crate::models::domain::Recommendation;

/// Request to map a batch of screening recommendations
///
/// The batch size limit comes from `matching.max_batch_size`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapRecommendationsRequest {
    pub recommendations: Vec<Recommendation>,
}

/// Request to match a single recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOneRequest {
    pub recommendation: Recommendation,
}
