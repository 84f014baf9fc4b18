use crate::error::CoreError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use uuid::Uuid;

/// A rating a rater gave to a dog.
///
/// Ratings run from 0.5 to 5.0 in steps of 0.5. Internally the value is kept
/// as a count of half-points (1..=10), so it can never hold anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RatingValue(u8);

impl RatingValue {
    pub const MIN: RatingValue = RatingValue(1);
    pub const MAX: RatingValue = RatingValue(10);

    /// Every legal rating, lowest first.
    pub const ALL: [RatingValue; 10] = [
        RatingValue(1),
        RatingValue(2),
        RatingValue(3),
        RatingValue(4),
        RatingValue(5),
        RatingValue(6),
        RatingValue(7),
        RatingValue(8),
        RatingValue(9),
        RatingValue(10),
    ];

    /// Builds a rating from a count of half-points.
    pub fn from_halves(halves: u8) -> Result<Self, CoreError> {
        if (1..=10).contains(&halves) {
            Ok(Self(halves))
        } else {
            Err(CoreError::InvalidInput(
                "rating".to_string(),
                format!("{} half-points is outside 1..=10", halves),
            ))
        }
    }

    pub fn halves(&self) -> u8 {
        self.0
    }

    /// Position of this value in a ten-slot distribution.
    pub fn bucket_index(&self) -> usize {
        (self.0 - 1) as usize
    }

    /// The value with one decimal place, as stored in `NUMERIC(2,1)` columns.
    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(self.0 as i64 * 5, 1)
    }
}

impl TryFrom<Decimal> for RatingValue {
    type Error = CoreError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        let doubled = value.checked_mul(Decimal::TWO).ok_or_else(|| {
            CoreError::InvalidInput(
                "rating".to_string(),
                format!("{} is outside 0.5..=5.0", value),
            )
        })?;
        if !doubled.fract().is_zero() {
            return Err(CoreError::InvalidInput(
                "rating".to_string(),
                format!("{} is not a multiple of 0.5", value),
            ));
        }
        match doubled.to_u8() {
            Some(halves) if (1..=10).contains(&halves) => Ok(Self(halves)),
            _ => Err(CoreError::InvalidInput(
                "rating".to_string(),
                format!("{} is outside 0.5..=5.0", value),
            )),
        }
    }
}

impl From<RatingValue> for Decimal {
    fn from(value: RatingValue) -> Self {
        value.as_decimal()
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

impl Serialize for RatingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0 as f64 / 2.0)
    }
}

impl<'de> Deserialize<'de> for RatingValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <Decimal as Deserialize>::deserialize(deserializer)?;
        RatingValue::try_from(raw).map_err(de::Error::custom)
    }
}

/// The pseudo-identity of a browser, carried in a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnonId(Uuid);

impl AnonId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a cookie value. Anything that isn't a UUID is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for AnonId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for AnonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The breed a rater scores highest, among breeds they rated often enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteBreed {
    pub slug: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub average: Decimal,
    pub ratings: u64,
}

/// Everything a rater has done, reduced to the aggregates their statistics are
/// computed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaterActivity {
    /// Number of ratings given at each legal value, indexed by `RatingValue::bucket_index`.
    pub distribution: [u64; 10],
    pub total_skips: u64,
    pub distinct_breeds: u64,
    pub active_days: u64,
    /// Ratings at least 1.5 points away from what other raters gave the same dog.
    pub contrarian_ratings: u64,
    pub favorite_breed: Option<FavoriteBreed>,
}

impl RaterActivity {
    pub fn total_ratings(&self) -> u64 {
        self.distribution.iter().sum()
    }

    /// Sum of all ratings, in half-points.
    pub fn sum_halves(&self) -> u64 {
        self.distribution
            .iter()
            .enumerate()
            .map(|(idx, count)| (idx as u64 + 1) * count)
            .sum()
    }

    pub fn count_of(&self, value: RatingValue) -> u64 {
        self.distribution[value.bucket_index()]
    }

    /// Records `count` ratings of `value`.
    pub fn record(&mut self, value: RatingValue, count: u64) {
        self.distribution[value.bucket_index()] += count;
    }
}
