//! # RateTheDogs Database Crate
//!
//! This crate is the application's only gateway to PostgreSQL. It owns the
//! schema (embedded migrations) and every SQL statement the API and the
//! import commands run.
//!
//! ## Public API
//!
//! - `connect` / `connect_lazy`: build the connection pool.
//! - `run_migrations`: bring the schema up to date.
//! - `DbRepository`: holds the pool and exposes all data access methods
//!   (e.g. `save_rating`, `rater_activity`, `breed_leaderboard`).
//! - `DbError`: the errors returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_lazy, run_migrations};
pub use error::DbError;
pub use repository::{
    BreedDetail, BreedStanding, BreedSummary, DbRepository, DogCard, DogDetail, DogStats, NewDog,
    Page, RatingHistoryEntry, RatingOutcome, RatingRecord,
};
