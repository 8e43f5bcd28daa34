use serde::{Deserialize, Serialize};

/// Running total for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingEntry {
    pub player_id: String,
    pub name: String,
    pub total: i64,
    pub rounds_played: usize,
}

/// Leaderboard for a single game, highest total first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standings {
    pub game_id: String,
    pub target_score: i64,
    pub target_reached: bool,
    pub entries: Vec<StandingEntry>,
}
