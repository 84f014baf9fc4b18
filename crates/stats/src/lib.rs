//! # RateTheDogs Stats Engine
//!
//! Turns a rater's aggregate activity into the things the "me" page shows:
//! average and spread, milestones, achievements and a rater personality.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** This crate has no knowledge of the database or HTTP. It
//!   depends only on `core-types`.
//! - **Stateless Calculation:** `StatsEngine` takes a `RaterActivity` and
//!   produces a `RaterReport`, which makes every rule easy to test.
//!
//! ## Public API
//!
//! - `StatsEngine`: the calculator.
//! - `RaterReport`: everything computed for one rater.
//! - `Personality`, `Milestone`, `AchievementStatus`: the report's parts.

// Declare the modules that constitute this crate.
pub mod achievements;
pub mod engine;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use achievements::ACHIEVEMENTS;
pub use engine::StatsEngine;
pub use report::{
    AchievementStatus, DistributionBucket, Milestone, MilestoneProgress, Personality,
    PersonalityProfile, RaterReport, MILESTONES,
};
