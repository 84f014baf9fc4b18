//! # RateTheDogs Core Types
//!
//! The foundational vocabulary shared by every other crate: validated rating
//! values, anonymous rater identifiers and the aggregate activity a rater's
//! statistics are derived from. This crate performs no I/O.

pub mod enums;
pub mod error;
pub mod slug;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::LeaderboardOrder;
pub use error::CoreError;
pub use slug::slugify;
pub use structs::{AnonId, FavoriteBreed, RaterActivity, RatingValue};
