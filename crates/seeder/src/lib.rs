//! Offline import of dog pictures: fetch a catalog from the image source,
//! optionally through a JSON manifest, then reconcile and write it.

pub mod catalog;
pub mod error;
pub mod fetch;
pub mod plan;

// --- Public API ---
pub use catalog::{Catalog, CatalogBreed};
pub use error::SeedError;
pub use fetch::{FetchProgress, fetch_catalog};
pub use plan::{PlannedBreed, SeedPlan, SeedSummary, apply, reconcile};
