use rayon::prelude::*;

use crate::core::strategies::{score_prepared, PreparedProduct, PreparedRecommendation, StrategyScore};
use crate::core::synonyms::SynonymDictionary;
use crate::models::{CatalogProduct, MatchResult, Recommendation};

/// Minimum product score reported as a match
pub const ACCEPTANCE_THRESHOLD: f64 = 0.3;

pub const NO_SUITABLE_MATCH: &str = "No suitable match found";

/// Batches at least this large are matched on the rayon pool by default
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 16;

/// Matches screening recommendations to catalog products
///
/// The matcher holds only read-only configuration; every call is a pure
/// function of its inputs.
///
/// # Selection
/// 1. Each product gets the best score over all strategies
/// 2. The highest scoring product wins, the first one seen on ties
/// 3. Winners below [`ACCEPTANCE_THRESHOLD`] are reported as "no match"
#[derive(Debug, Clone)]
pub struct Matcher {
    synonyms: SynonymDictionary,
    parallel_threshold: usize,
}

impl Matcher {
    pub fn new(synonyms: SynonymDictionary, parallel_threshold: usize) -> Self {
        Self {
            synonyms,
            parallel_threshold: parallel_threshold.max(1),
        }
    }

    pub fn with_default_synonyms() -> Self {
        Self::new(SynonymDictionary::builtin(), DEFAULT_PARALLEL_THRESHOLD)
    }

    pub fn synonyms(&self) -> &SynonymDictionary {
        &self.synonyms
    }

    /// Find the catalog product that best represents one recommendation
    pub fn match_one(&self, recommendation: &Recommendation, catalog: &[CatalogProduct]) -> MatchResult {
        let prepared = PreparedRecommendation::new(recommendation);

        let best = catalog
            .iter()
            .map(|product| {
                let score = score_prepared(&prepared, &PreparedProduct::new(product), &self.synonyms);
                (product, score)
            })
            .fold(None::<(&CatalogProduct, StrategyScore)>, |best, (product, score)| {
                let beats_best = score.is_hit()
                    && best.as_ref().map_or(true, |(_, current)| score.score > current.score);
                if beats_best {
                    Some((product, score))
                } else {
                    best
                }
            });

        match best {
            Some((product, score)) if score.score >= ACCEPTANCE_THRESHOLD => {
                tracing::trace!(
                    "Matched '{}' to product '{}' ({:.2}, {})",
                    recommendation.name,
                    product.name,
                    score.score,
                    score.reason
                );

                MatchResult {
                    recommendation: recommendation.clone(),
                    matched_product: Some(product.clone()),
                    score: score.score.clamp(0.0, 1.0),
                    reason: score.reason,
                    strategy: score.strategy,
                }
            }
            best => {
                tracing::trace!(
                    "No match for '{}' (best score {:.2})",
                    recommendation.name,
                    best.map(|(_, s)| s.score).unwrap_or(0.0)
                );

                MatchResult {
                    recommendation: recommendation.clone(),
                    matched_product: None,
                    score: 0.0,
                    reason: NO_SUITABLE_MATCH.to_string(),
                    strategy: None,
                }
            }
        }
    }

    /// Match every recommendation, keeping input order in the output
    pub fn map_recommendations_to_products(
        &self,
        recommendations: &[Recommendation],
        catalog: &[CatalogProduct],
    ) -> Vec<MatchResult> {
        let results: Vec<MatchResult> = if recommendations.len() >= self.parallel_threshold {
            // indexed parallel iterators collect in input order
            recommendations
                .par_iter()
                .map(|recommendation| self.match_one(recommendation, catalog))
                .collect()
        } else {
            recommendations
                .iter()
                .map(|recommendation| self.match_one(recommendation, catalog))
                .collect()
        };

        tracing::debug!(
            "Mapped {} recommendations against {} products ({} matched)",
            results.len(),
            catalog.len(),
            results.iter().filter(|r| r.is_matched()).count()
        );

        results
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_synonyms()
    }
}
