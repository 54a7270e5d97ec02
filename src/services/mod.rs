// Service exports
pub mod cache;
pub mod catalog;
pub mod mapping;

pub use cache::{CacheStats, CatalogCache, CatalogSnapshot};
pub use catalog::{CatalogClient, CatalogError};
pub use mapping::{MappingError, MappingOutcome, MappingService};
