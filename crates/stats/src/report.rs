use core_types::{FavoriteBreed, RatingValue};
use rust_decimal::Decimal;
use serde::Serialize;

/// A rater's statistics, as returned by `GET /api/me/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaterReport {
    pub total_ratings: u64,
    pub total_skips: u64,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub average_rating: Option<Decimal>, // None until the first rating
    #[serde(with = "rust_decimal::serde::float_option")]
    pub rating_std_dev: Option<Decimal>,
    pub distribution: Vec<DistributionBucket>,
    pub distinct_breeds: u64,
    pub active_days: u64,
    pub favorite_breed: Option<FavoriteBreed>,
    pub personality: PersonalityProfile,
    pub milestones: MilestoneProgress,
    pub achievements: Vec<AchievementStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionBucket {
    pub value: RatingValue,
    pub count: u64,
}

/// Rating-count milestones, in ascending order.
pub const MILESTONES: [Milestone; 8] = [
    Milestone { threshold: 1, title: "First Sniff" },
    Milestone { threshold: 10, title: "Puppy Rater" },
    Milestone { threshold: 25, title: "Good Boy Scout" },
    Milestone { threshold: 50, title: "Treat Dispenser" },
    Milestone { threshold: 100, title: "Top Dog" },
    Milestone { threshold: 250, title: "Pack Leader" },
    Milestone { threshold: 500, title: "Best in Show" },
    Milestone { threshold: 1000, title: "Hall of Fur" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub threshold: u64,
    pub title: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneProgress {
    pub reached: Vec<Milestone>,
    pub next: Option<NextMilestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextMilestone {
    pub milestone: Milestone,
    pub remaining: u64,
    /// Progress from the previous milestone (or zero) to this one, 0..=100.
    pub percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    Newcomer,
    EternalOptimist,
    SteadyHand,
    WildCard,
    Enthusiast,
    FairJudge,
    ToughCritic,
    HarshCritic,
}

impl Personality {
    pub fn title(&self) -> &'static str {
        match self {
            Personality::Newcomer => "Newcomer",
            Personality::EternalOptimist => "Eternal Optimist",
            Personality::SteadyHand => "Steady Hand",
            Personality::WildCard => "Wild Card",
            Personality::Enthusiast => "Enthusiast",
            Personality::FairJudge => "Fair Judge",
            Personality::ToughCritic => "Tough Critic",
            Personality::HarshCritic => "Harsh Critic",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Personality::Newcomer => "Rate a few more dogs to discover your rater personality.",
            Personality::EternalOptimist => "Every dog is the best dog. You may be right.",
            Personality::SteadyHand => "Your ratings barely move. Consistency is a virtue.",
            Personality::WildCard => "From half a bone to five, you use the whole scale.",
            Personality::Enthusiast => "You're generous, but you save top marks for the special ones.",
            Personality::FairJudge => "Balanced and measured. Dogs trust your verdicts.",
            Personality::ToughCritic => "Impressing you takes real effort.",
            Personality::HarshCritic => "Few dogs meet your standards.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersonalityProfile {
    pub kind: Personality,
    pub title: &'static str,
    pub description: &'static str,
}

impl From<Personality> for PersonalityProfile {
    fn from(kind: Personality) -> Self {
        Self {
            kind,
            title: kind.title(),
            description: kind.description(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementStatus {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
    /// Capped at `target`.
    pub progress: u64,
    pub target: u64,
}
