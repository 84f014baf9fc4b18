use serde::{Deserialize, Serialize};

/// Which end of a ranking to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardOrder {
    #[default]
    Top,
    Bottom,
}

impl LeaderboardOrder {
    /// The SQL sort direction for the average-rating column.
    pub fn sql_direction(&self) -> &'static str {
        match self {
            LeaderboardOrder::Top => "DESC",
            LeaderboardOrder::Bottom => "ASC",
        }
    }
}
