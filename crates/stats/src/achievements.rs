use crate::report::AchievementStatus;
use core_types::{RaterActivity, RatingValue};

/// A badge a rater can unlock.
///
/// `measure` is the rater's current count towards `target`; `gate` is an
/// extra condition that must also hold for the badge to unlock.
pub struct AchievementRule {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub target: u64,
    measure: fn(&RaterActivity) -> u64,
    gate: fn(&RaterActivity) -> bool,
}

impl AchievementRule {
    pub fn evaluate(&self, activity: &RaterActivity) -> AchievementStatus {
        let measured = (self.measure)(activity);
        AchievementStatus {
            id: self.id,
            title: self.title,
            description: self.description,
            unlocked: measured >= self.target && (self.gate)(activity),
            progress: measured.min(self.target),
            target: self.target,
        }
    }
}

fn always(_: &RaterActivity) -> bool {
    true
}

fn total_ratings(activity: &RaterActivity) -> u64 {
    activity.total_ratings()
}

fn used_values(activity: &RaterActivity) -> u64 {
    activity.distribution.iter().filter(|count| **count > 0).count() as u64
}

/// Skips make up less than a tenth of everything the rater decided on.
fn rarely_skips(activity: &RaterActivity) -> bool {
    let decisions = activity.total_ratings() + activity.total_skips;
    activity.total_skips * 10 < decisions
}

pub static ACHIEVEMENTS: [AchievementRule; 11] = [
    AchievementRule {
        id: "first_paw",
        title: "First Paw",
        description: "Rate your first dog.",
        target: 1,
        measure: total_ratings,
        gate: always,
    },
    AchievementRule {
        id: "perfect_score",
        title: "Perfect Score",
        description: "Give a dog the full five bones.",
        target: 1,
        measure: |a| a.count_of(RatingValue::MAX),
        gate: always,
    },
    AchievementRule {
        id: "tough_love",
        title: "Tough Love",
        description: "Give a dog half a bone.",
        target: 1,
        measure: |a| a.count_of(RatingValue::MIN),
        gate: always,
    },
    AchievementRule {
        id: "full_spectrum",
        title: "Full Spectrum",
        description: "Use every rating from 0.5 to 5.0 at least once.",
        target: 10,
        measure: used_values,
        gate: always,
    },
    AchievementRule {
        id: "breed_explorer",
        title: "Breed Explorer",
        description: "Rate dogs from 10 different breeds.",
        target: 10,
        measure: |a| a.distinct_breeds,
        gate: always,
    },
    AchievementRule {
        id: "breed_connoisseur",
        title: "Breed Connoisseur",
        description: "Rate dogs from 25 different breeds.",
        target: 25,
        measure: |a| a.distinct_breeds,
        gate: always,
    },
    AchievementRule {
        id: "picky_pup",
        title: "Picky Pup",
        description: "Skip 10 dogs.",
        target: 10,
        measure: |a| a.total_skips,
        gate: always,
    },
    AchievementRule {
        id: "decisive",
        title: "Decisive",
        description: "Rate 50 dogs while skipping fewer than one in ten.",
        target: 50,
        measure: total_ratings,
        gate: rarely_skips,
    },
    AchievementRule {
        id: "century_club",
        title: "Century Club",
        description: "Rate 100 dogs.",
        target: 100,
        measure: total_ratings,
        gate: always,
    },
    AchievementRule {
        id: "regular",
        title: "Regular",
        description: "Rate dogs on 7 different days.",
        target: 7,
        measure: |a| a.active_days,
        gate: always,
    },
    AchievementRule {
        id: "contrarian",
        title: "Contrarian",
        description: "Disagree with the crowd by 1.5 bones or more on 10 dogs.",
        target: 10,
        measure: |a| a.contrarian_ratings,
        gate: always,
    },
];

/// Evaluates every achievement, in catalog order.
pub fn evaluate_all(activity: &RaterActivity) -> Vec<AchievementStatus> {
    ACHIEVEMENTS.iter().map(|rule| rule.evaluate(activity)).collect()
}
