//! Screening Match - maps screening recommendations to purchasable tests
//!
//! The core ([`core`]) decides which catalog product, if any, represents the
//! same clinical test as a free-text recommendation. It is a pure function of
//! its inputs; catalog fetching, caching and the HTTP surface live in
//! [`services`] and [`routes`].

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{Matcher, SynonymDictionary, ACCEPTANCE_THRESHOLD};
pub use models::{Biomarker, CatalogProduct, MatchResult, MatchStrategy, Recommendation, RecommendationStatus};
