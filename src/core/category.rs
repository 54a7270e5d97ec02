use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::CatalogProduct;

/// Coarse grouping of catalog products, used to present available tests
///
/// Variant order is the order categories are checked and listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    #[serde(rename = "Cardiovascular Health")]
    Cardiovascular,
    #[serde(rename = "Metabolic Health")]
    Metabolic,
    #[serde(rename = "Hormonal Health")]
    Hormonal,
    #[serde(rename = "Nutritional Status")]
    Nutritional,
    #[serde(rename = "Inflammation & Immune")]
    Inflammation,
    #[serde(rename = "Organ Function")]
    OrganFunction,
    #[serde(rename = "Gut Health")]
    Gut,
    #[serde(rename = "Genetic Testing")]
    Genetic,
    #[serde(rename = "Longevity Biomarkers")]
    Longevity,
    #[serde(rename = "General Health")]
    General,
}

const CATEGORY_KEYWORDS: &[(ProductCategory, &[&str])] = &[
    (ProductCategory::Cardiovascular, &["heart", "cardiovascular", "cholesterol", "lipid"]),
    (ProductCategory::Metabolic, &["diabetes", "glucose", "insulin", "hba1c"]),
    (ProductCategory::Hormonal, &["hormone", "testosterone", "estrogen", "thyroid", "cortisol"]),
    (ProductCategory::Nutritional, &["vitamin", "mineral", "iron", "b12", "folate"]),
    (ProductCategory::Inflammation, &["inflammation", "crp", "inflammatory"]),
    (ProductCategory::OrganFunction, &["liver", "kidney", "creatinine", "alt", "ast"]),
    (ProductCategory::Gut, &["gut", "microbiome", "stool"]),
    (ProductCategory::Genetic, &["genetic", "dna"]),
    (ProductCategory::Longevity, &["longevity", "biological age", "aging"]),
];

impl ProductCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cardiovascular => "Cardiovascular Health",
            Self::Metabolic => "Metabolic Health",
            Self::Hormonal => "Hormonal Health",
            Self::Nutritional => "Nutritional Status",
            Self::Inflammation => "Inflammation & Immune",
            Self::OrganFunction => "Organ Function",
            Self::Gut => "Gut Health",
            Self::Genetic => "Genetic Testing",
            Self::Longevity => "Longevity Biomarkers",
            Self::General => "General Health",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Assign a product to the first category whose keywords appear in its text
///
/// Keywords are plain substrings, so short ones like "alt" also hit words
/// such as "health"; earlier categories take precedence.
pub fn classify_product(product: &CatalogProduct) -> ProductCategory {
    let tags = product.tags.as_deref().unwrap_or_default().join(" ");
    let text = format!("{} {} {}", product.name, product.description, tags).to_lowercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(ProductCategory::General)
}

/// Product names in catalog order
pub fn all_test_names(catalog: &[CatalogProduct]) -> Vec<String> {
    catalog.iter().map(|product| product.name.clone()).collect()
}

/// Product names grouped by category; names keep catalog order
pub fn test_names_by_category(catalog: &[CatalogProduct]) -> BTreeMap<ProductCategory, Vec<String>> {
    let mut grouped: BTreeMap<ProductCategory, Vec<String>> = BTreeMap::new();

    for product in catalog {
        grouped
            .entry(classify_product(product))
            .or_default()
            .push(product.name.clone());
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_name_description_and_tags() {
        let lipid = CatalogProduct::new(1, "Lipid Panel", "LDL and HDL");
        assert_eq!(classify_product(&lipid), ProductCategory::Cardiovascular);

        let sugar = CatalogProduct::new(2, "Blood Sugar", "Fasting glucose");
        assert_eq!(classify_product(&sugar), ProductCategory::Metabolic);

        let tagged = CatalogProduct::new(3, "Home Kit", "Finger prick").with_tags(["microbiome"]);
        assert_eq!(classify_product(&tagged), ProductCategory::Gut);

        let plain = CatalogProduct::new(4, "Sleep Study", "Overnight monitoring");
        assert_eq!(classify_product(&plain), ProductCategory::General);
    }

    #[test]
    fn test_earlier_category_wins() {
        let product = CatalogProduct::new(1, "Thyroid and Heart", "");
        assert_eq!(classify_product(&product), ProductCategory::Cardiovascular);
    }

    #[test]
    fn test_grouping_keeps_catalog_order() {
        let catalog = vec![
            CatalogProduct::new(1, "Vitamin D", ""),
            CatalogProduct::new(2, "Lipid Panel", ""),
            CatalogProduct::new(3, "Iron Studies", ""),
        ];

        let grouped = test_names_by_category(&catalog);
        let categories: Vec<_> = grouped.keys().copied().collect();
        assert_eq!(categories, vec![ProductCategory::Cardiovascular, ProductCategory::Nutritional]);
        assert_eq!(grouped[&ProductCategory::Nutritional], vec!["Vitamin D", "Iron Studies"]);
        assert_eq!(all_test_names(&catalog), vec!["Vitamin D", "Lipid Panel", "Iron Studies"]);
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&ProductCategory::Inflammation).unwrap();
        assert_eq!(json, "\"Inflammation & Immune\"");
        assert_eq!(ProductCategory::OrganFunction.to_string(), "Organ Function");
    }
}
