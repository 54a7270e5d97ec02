// Core matching engine exports
pub mod category;
pub mod matcher;
pub mod normalize;
pub mod strategies;
pub mod synonyms;

pub use category::{all_test_names, classify_product, test_names_by_category, ProductCategory};
pub use matcher::{Matcher, ACCEPTANCE_THRESHOLD, NO_SUITABLE_MATCH};
pub use normalize::normalize;
pub use strategies::{score_product, StrategyScore};
pub use synonyms::{SynonymDictionary, SYNONYM_TABLE_VERSION};
