use crate::achievements::evaluate_all;
use crate::report::{
    DistributionBucket, MILESTONES, MilestoneProgress, NextMilestone, Personality,
    PersonalityProfile, RaterReport,
};
use core_types::{RaterActivity, RatingValue};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

// Below this many ratings a personality would be noise.
const PERSONALITY_MIN_RATINGS: u64 = 5;
// Spread-based personalities need a larger sample.
const SPREAD_MIN_RATINGS: u64 = 20;

/// A stateless calculator for deriving a rater's statistics from their activity.
#[derive(Debug, Default)]
pub struct StatsEngine {}

impl StatsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point: everything the "me" page needs for one rater.
    pub fn evaluate(&self, activity: &RaterActivity) -> RaterReport {
        let total_ratings = activity.total_ratings();
        let average = self.average(activity);
        let std_dev = self.std_dev(activity);
        let personality = self.personality(total_ratings, average, std_dev);

        tracing::debug!(
            total_ratings,
            personality = ?personality,
            "Evaluated rater statistics."
        );

        RaterReport {
            total_ratings,
            total_skips: activity.total_skips,
            average_rating: average.map(|avg| avg.round_dp(2)),
            rating_std_dev: std_dev.map(|sd| sd.round_dp(2)),
            distribution: RatingValue::ALL
                .iter()
                .map(|value| DistributionBucket {
                    value: *value,
                    count: activity.count_of(*value),
                })
                .collect(),
            distinct_breeds: activity.distinct_breeds,
            active_days: activity.active_days,
            favorite_breed: activity.favorite_breed.clone(),
            personality: PersonalityProfile::from(personality),
            milestones: self.milestones(total_ratings),
            achievements: evaluate_all(activity),
        }
    }

    /// Mean rating in points, unrounded.
    pub fn average(&self, activity: &RaterActivity) -> Option<Decimal> {
        let total = activity.total_ratings();
        if total == 0 {
            return None;
        }
        let sum_points = Decimal::from(activity.sum_halves()) / Decimal::TWO;
        Some(sum_points / Decimal::from(total))
    }

    /// Population standard deviation of the ratings, in points.
    pub fn std_dev(&self, activity: &RaterActivity) -> Option<Decimal> {
        let total = activity.total_ratings();
        if total == 0 {
            return None;
        }
        let total = Decimal::from(total);
        let mean_halves = Decimal::from(activity.sum_halves()) / total;

        let variance_halves: Decimal = RatingValue::ALL
            .iter()
            .map(|value| {
                let diff = Decimal::from(value.halves()) - mean_halves;
                diff * diff * Decimal::from(activity.count_of(*value))
            })
            .sum::<Decimal>()
            / total;

        // Half-points squared, so the root is halved to get points.
        variance_halves.sqrt().map(|sd| sd / Decimal::TWO)
    }

    /// Decides the rater personality; the first matching rule wins.
    pub fn personality(
        &self,
        total_ratings: u64,
        average: Option<Decimal>,
        std_dev: Option<Decimal>,
    ) -> Personality {
        let (Some(average), Some(std_dev)) = (average, std_dev) else {
            return Personality::Newcomer;
        };
        if total_ratings < PERSONALITY_MIN_RATINGS {
            return Personality::Newcomer;
        }
        if average >= Decimal::new(45, 1) {
            return Personality::EternalOptimist;
        }
        if total_ratings >= SPREAD_MIN_RATINGS {
            if std_dev < Decimal::new(5, 1) {
                return Personality::SteadyHand;
            }
            if std_dev >= Decimal::new(15, 1) {
                return Personality::WildCard;
            }
        }
        if average >= Decimal::new(375, 2) {
            Personality::Enthusiast
        } else if average >= Decimal::new(275, 2) {
            Personality::FairJudge
        } else if average >= Decimal::TWO {
            Personality::ToughCritic
        } else {
            Personality::HarshCritic
        }
    }

    /// Splits the milestone ladder into reached and next.
    pub fn milestones(&self, total_ratings: u64) -> MilestoneProgress {
        let reached: Vec<_> = MILESTONES
            .iter()
            .copied()
            .filter(|m| m.threshold <= total_ratings)
            .collect();

        let next = MILESTONES
            .iter()
            .find(|m| m.threshold > total_ratings)
            .map(|milestone| {
                let floor = reached.last().map(|m| m.threshold).unwrap_or(0);
                let span = milestone.threshold - floor;
                let done = total_ratings - floor;
                NextMilestone {
                    milestone: *milestone,
                    remaining: milestone.threshold - total_ratings,
                    percent: ((done * 100) / span).min(100) as u8,
                }
            });

        MilestoneProgress { reached, next }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn activity_with(ratings: &[(f64, u64)]) -> RaterActivity {
        let mut activity = RaterActivity::default();
        for (value, count) in ratings {
            let halves = (value * 2.0) as u8;
            activity.record(RatingValue::from_halves(halves).unwrap(), *count);
        }
        activity
    }

    #[test]
    fn test_empty_activity() {
        let report = StatsEngine::new().evaluate(&RaterActivity::default());
        assert_eq!(report.total_ratings, 0);
        assert_eq!(report.average_rating, None);
        assert_eq!(report.rating_std_dev, None);
        assert_eq!(report.personality.kind, Personality::Newcomer);
        assert!(report.milestones.reached.is_empty());
        assert_eq!(report.milestones.next.as_ref().unwrap().milestone.threshold, 1);
        assert_eq!(report.distribution.len(), 10);
    }

    #[test]
    fn test_average_and_std_dev() {
        let engine = StatsEngine::new();
        let activity = activity_with(&[(2.0, 1), (4.0, 1)]);
        assert_eq!(engine.average(&activity), Some(dec!(3)));
        assert_eq!(engine.std_dev(&activity).unwrap().round_dp(4), dec!(1));
    }

    #[test]
    fn test_std_dev_is_zero_for_identical_ratings() {
        let activity = activity_with(&[(3.5, 8)]);
        assert_eq!(StatsEngine::new().std_dev(&activity), Some(Decimal::ZERO));
    }

    #[test]
    fn test_newcomer_below_five_ratings() {
        let report = StatsEngine::new().evaluate(&activity_with(&[(5.0, 4)]));
        assert_eq!(report.personality.kind, Personality::Newcomer);
    }

    #[test]
    fn test_eternal_optimist_beats_spread_rules() {
        let report = StatsEngine::new().evaluate(&activity_with(&[(5.0, 30)]));
        assert_eq!(report.personality.kind, Personality::EternalOptimist);
    }

    #[test]
    fn test_steady_hand_needs_twenty_ratings() {
        let engine = StatsEngine::new();
        let few = engine.evaluate(&activity_with(&[(3.0, 10)]));
        assert_eq!(few.personality.kind, Personality::FairJudge);

        let many = engine.evaluate(&activity_with(&[(3.0, 25)]));
        assert_eq!(many.personality.kind, Personality::SteadyHand);
    }

    #[test]
    fn test_wild_card() {
        let report = StatsEngine::new().evaluate(&activity_with(&[(0.5, 10), (5.0, 10)]));
        assert_eq!(report.personality.kind, Personality::WildCard);
    }

    #[test]
    fn test_average_bands() {
        let engine = StatsEngine::new();
        let kind = |avg: Decimal| engine.personality(10, Some(avg), Some(dec!(1)));
        assert_eq!(kind(dec!(4.0)), Personality::Enthusiast);
        assert_eq!(kind(dec!(3.75)), Personality::Enthusiast);
        assert_eq!(kind(dec!(3.0)), Personality::FairJudge);
        assert_eq!(kind(dec!(2.0)), Personality::ToughCritic);
        assert_eq!(kind(dec!(1.5)), Personality::HarshCritic);
    }

    #[test]
    fn test_milestone_progress() {
        let progress = StatsEngine::new().milestones(30);
        let reached: Vec<u64> = progress.reached.iter().map(|m| m.threshold).collect();
        assert_eq!(reached, vec![1, 10, 25]);

        let next = progress.next.unwrap();
        assert_eq!(next.milestone.threshold, 50);
        assert_eq!(next.remaining, 20);
        assert_eq!(next.percent, 20);
    }

    #[test]
    fn test_all_milestones_reached() {
        let progress = StatsEngine::new().milestones(5000);
        assert_eq!(progress.reached.len(), MILESTONES.len());
        assert!(progress.next.is_none());
    }

    #[test]
    fn test_report_serializes_numbers() {
        let report = StatsEngine::new().evaluate(&activity_with(&[(3.5, 1), (4.0, 1)]));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["average_rating"], serde_json::json!(3.75));
        assert_eq!(json["personality"]["kind"], "newcomer");
        assert_eq!(json["distribution"][6]["value"], serde_json::json!(3.5));
    }
}
