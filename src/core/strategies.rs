use crate::core::normalize::{contains_either, normalize, significant_words};
use crate::core::synonyms::SynonymDictionary;
use crate::models::{CatalogProduct, MatchStrategy, Recommendation};

/// Calibration constants, one per strategy tier
pub const EXACT_NAME_SCORE: f64 = 1.0;
pub const NAME_CONTAINMENT_SCORE: f64 = 0.9;
pub const BIOMARKER_SCORE: f64 = 0.8;
pub const KEYWORD_SCORE: f64 = 0.7;
pub const PARTIAL_KEYWORD_MAX_SCORE: f64 = 0.6;
pub const TAG_SCORE: f64 = 0.5;

pub const NO_SIGNIFICANT_MATCH: &str = "No significant match found";

/// Score and justification produced by one strategy for one product
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyScore {
    pub score: f64,
    pub reason: String,
    pub strategy: Option<MatchStrategy>,
}

impl StrategyScore {
    fn hit(strategy: MatchStrategy, score: f64, reason: impl Into<String>) -> Self {
        Self {
            score,
            reason: reason.into(),
            strategy: Some(strategy),
        }
    }

    pub fn none() -> Self {
        Self {
            score: 0.0,
            reason: NO_SIGNIFICANT_MATCH.to_string(),
            strategy: None,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.strategy.is_some() && self.score > 0.0
    }
}

/// Recommendation fields normalized once and reused against every product
#[derive(Debug, Clone)]
pub struct PreparedRecommendation {
    pub name: String,
}

impl PreparedRecommendation {
    pub fn new(recommendation: &Recommendation) -> Self {
        Self {
            name: normalize(&recommendation.name),
        }
    }

    pub fn words(&self) -> Vec<&str> {
        significant_words(&self.name)
    }
}

/// Normalized view of a product's searchable text
#[derive(Debug, Clone)]
pub struct PreparedProduct<'a> {
    pub product: &'a CatalogProduct,
    pub name: String,
    pub description: String,
}

impl<'a> PreparedProduct<'a> {
    pub fn new(product: &'a CatalogProduct) -> Self {
        Self {
            product,
            name: normalize(&product.name),
            description: normalize(&product.description),
        }
    }

    /// Whether the text appears in the product name or description
    fn mentions(&self, needle: &str) -> bool {
        self.name.contains(needle) || self.description.contains(needle)
    }
}

/// Strategy 1: normalized names are identical
pub fn exact_name(rec: &PreparedRecommendation, product: &PreparedProduct<'_>) -> Option<StrategyScore> {
    (!rec.name.is_empty() && rec.name == product.name).then(|| {
        StrategyScore::hit(MatchStrategy::ExactName, EXACT_NAME_SCORE, "Exact name match")
    })
}

/// Strategy 2: one name contains the other
pub fn name_containment(rec: &PreparedRecommendation, product: &PreparedProduct<'_>) -> Option<StrategyScore> {
    contains_either(&product.name, &rec.name).then(|| {
        StrategyScore::hit(
            MatchStrategy::NameContainment,
            NAME_CONTAINMENT_SCORE,
            "Name contains recommendation",
        )
    })
}

/// Strategy 3: a biomarker name or code overlaps the recommendation name
pub fn biomarker_overlap(rec: &PreparedRecommendation, product: &PreparedProduct<'_>) -> Option<StrategyScore> {
    let biomarkers = product.product.biomarkers.as_deref()?;

    biomarkers.iter().find_map(|biomarker| {
        let name = normalize(&biomarker.name);
        let code = normalize(&biomarker.code);

        if contains_either(&name, &rec.name) || contains_either(&code, &rec.name) {
            let label = if biomarker.name.trim().is_empty() {
                biomarker.code.trim()
            } else {
                biomarker.name.trim()
            };
            Some(StrategyScore::hit(
                MatchStrategy::Biomarker,
                BIOMARKER_SCORE,
                format!("Biomarker match: {}", label),
            ))
        } else {
            None
        }
    })
}

/// Strategy 4: synonym dictionary hit, falling back to partial word overlap
pub fn keyword_overlap(
    rec: &PreparedRecommendation,
    product: &PreparedProduct<'_>,
    synonyms: &SynonymDictionary,
) -> Option<StrategyScore> {
    let variant = synonyms
        .lookup(&rec.name)
        .flat_map(|entry| entry.variants.iter())
        .find(|variant| product.mentions(variant));

    if let Some(variant) = variant {
        return Some(StrategyScore::hit(
            MatchStrategy::Keyword,
            KEYWORD_SCORE,
            format!("Keyword match: {}", variant),
        ));
    }

    partial_word_overlap(rec, product)
}

/// Fallback inside strategy 4: share of significant words found in the product
pub fn partial_word_overlap(rec: &PreparedRecommendation, product: &PreparedProduct<'_>) -> Option<StrategyScore> {
    let words = rec.words();
    let matched = words.iter().filter(|word| product.mentions(word)).count();

    if matched == 0 {
        return None;
    }

    let total = words.len();
    let score = (matched as f64 / total as f64 * PARTIAL_KEYWORD_MAX_SCORE).min(PARTIAL_KEYWORD_MAX_SCORE);

    Some(StrategyScore::hit(
        MatchStrategy::PartialKeyword,
        score,
        format!("Partial keyword match ({}/{} words)", matched, total),
    ))
}

/// Strategy 5: a product tag overlaps the recommendation name
pub fn tag_overlap(rec: &PreparedRecommendation, product: &PreparedProduct<'_>) -> Option<StrategyScore> {
    let tags = product.product.tags.as_deref()?;

    tags.iter()
        .find(|tag| contains_either(&normalize(tag), &rec.name))
        .map(|tag| StrategyScore::hit(MatchStrategy::Tag, TAG_SCORE, format!("Tag match: {}", tag.trim())))
}

/// Best score over every strategy for one recommendation/product pair
///
/// All strategies run; the highest value wins and on equal values the
/// earlier strategy is kept. A product matching both by biomarker and by
/// exact name therefore scores 1.0, not 0.8.
pub fn score_prepared(
    rec: &PreparedRecommendation,
    product: &PreparedProduct<'_>,
    synonyms: &SynonymDictionary,
) -> StrategyScore {
    let candidates = [
        exact_name(rec, product),
        name_containment(rec, product),
        biomarker_overlap(rec, product),
        keyword_overlap(rec, product, synonyms),
        tag_overlap(rec, product),
    ];

    candidates
        .into_iter()
        .flatten()
        .fold(StrategyScore::none(), |best, candidate| {
            if candidate.score > best.score {
                candidate
            } else {
                best
            }
        })
}

/// Score one recommendation against one product
pub fn score_product(
    recommendation: &Recommendation,
    product: &CatalogProduct,
    synonyms: &SynonymDictionary,
) -> StrategyScore {
    score_prepared(
        &PreparedRecommendation::new(recommendation),
        &PreparedProduct::new(product),
        synonyms,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Biomarker;

    fn score(rec_name: &str, product: &CatalogProduct) -> StrategyScore {
        score_product(&Recommendation::named(rec_name), product, &SynonymDictionary::builtin())
    }

    #[test]
    fn test_exact_name_ignores_case_and_padding() {
        let product = CatalogProduct::new(1, "Lipid Panel", "Cholesterol breakdown");
        let result = score("  lipid PANEL ", &product);

        assert_eq!(result.score, EXACT_NAME_SCORE);
        assert_eq!(result.reason, "Exact name match");
        assert_eq!(result.strategy, Some(MatchStrategy::ExactName));
    }

    #[test]
    fn test_name_containment_both_directions() {
        let product = CatalogProduct::new(1, "Advanced Vitamin D Test", "");
        assert_eq!(score("Vitamin D", &product).score, NAME_CONTAINMENT_SCORE);

        let product = CatalogProduct::new(2, "Ferritin", "");
        let result = score("Ferritin level check", &product);
        assert_eq!(result.score, NAME_CONTAINMENT_SCORE);
        assert_eq!(result.reason, "Name contains recommendation");
    }

    #[test]
    fn test_biomarker_by_name_and_code() {
        let product = CatalogProduct::new(1, "Stress Profile", "Morning saliva sample")
            .with_biomarkers(vec![Biomarker::new("Cortisol", "CORT")]);
        let result = score("Cortisol", &product);
        assert_eq!(result.score, BIOMARKER_SCORE);
        assert_eq!(result.reason, "Biomarker match: Cortisol");

        let product = CatalogProduct::new(2, "Metabolic Profile", "Fasting sample")
            .with_biomarkers(vec![Biomarker::new("Glycated haemoglobin", "HBA1C")]);
        let result = score("HbA1c screening", &product);
        assert_eq!(result.strategy, Some(MatchStrategy::Biomarker));
        assert_eq!(result.reason, "Biomarker match: Glycated haemoglobin");
    }

    #[test]
    fn test_blank_biomarker_never_matches() {
        let product = CatalogProduct::new(1, "Wellness Bundle", "General check")
            .with_biomarkers(vec![Biomarker::new("", "")]);
        assert_eq!(score("Cortisol", &product).score, 0.0);
    }

    #[test]
    fn test_keyword_uses_synonyms() {
        let product = CatalogProduct::new(1, "Hemoglobin A1c Test", "Measures glycated hemoglobin");
        let result = score("HbA1c", &product);

        assert_eq!(result.score, KEYWORD_SCORE);
        assert_eq!(result.reason, "Keyword match: hemoglobin a1c");
        assert_eq!(result.strategy, Some(MatchStrategy::Keyword));
    }

    #[test]
    fn test_partial_keyword_ratio() {
        let product = CatalogProduct::new(1, "Gut Microbiome Analysis", "Stool based sequencing");
        let result = score("Microbiome diversity assessment", &product);

        assert!((result.score - 0.2).abs() < 1e-9);
        assert_eq!(result.reason, "Partial keyword match (1/3 words)");
        assert_eq!(result.strategy, Some(MatchStrategy::PartialKeyword));
    }

    #[test]
    fn test_tag_overlap() {
        let product = CatalogProduct::new(1, "Complete Female Panel", "Comprehensive check")
            .with_tags(["Fertility", "women"]);
        let result = score("fertility", &product);

        assert_eq!(result.score, TAG_SCORE);
        assert_eq!(result.reason, "Tag match: Fertility");
    }

    #[test]
    fn test_max_across_strategies_not_first_hit() {
        // Biomarker would fire first in a short-circuit scan; exact name must still win.
        let product = CatalogProduct::new(1, "Cortisol", "Stress hormone test")
            .with_biomarkers(vec![Biomarker::new("Cortisol", "CORT")])
            .with_tags(["cortisol"]);
        let result = score("cortisol", &product);

        assert_eq!(result.score, EXACT_NAME_SCORE);
        assert_eq!(result.strategy, Some(MatchStrategy::ExactName));
    }

    #[test]
    fn test_no_match() {
        let product = CatalogProduct::new(1, "Lipid Panel", "Cholesterol");
        let result = score("Zinc", &product);

        assert_eq!(result, StrategyScore::none());
        assert_eq!(result.reason, NO_SIGNIFICANT_MATCH);
    }

    #[test]
    fn test_empty_name_scores_zero() {
        let product = CatalogProduct::new(1, "", "")
            .with_tags([""])
            .with_biomarkers(vec![Biomarker::default()]);
        assert_eq!(score("", &product).score, 0.0);
        assert_eq!(score("   ", &CatalogProduct::new(2, "Lipid Panel", "")).score, 0.0);
    }
}
