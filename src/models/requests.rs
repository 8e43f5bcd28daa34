use serde::{Deserialize, Serialize};

use super::{Game, Score};

pub const DEFAULT_TARGET_SCORE: i64 = 500;

/// A player to add when creating a game: either a registered account
/// (`user_id`) or a guest (`custom_name`), never both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
}

impl PlayerInput {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            custom_name: None,
        }
    }

    pub fn guest(name: impl Into<String>) -> Self {
        Self {
            user_id: None,
            custom_name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCreate {
    pub name: String,
    pub players: Vec<PlayerInput>,
    /// Falls back to the configured default (500 unless overridden)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_score: Option<i64>,
}

impl GameCreate {
    pub fn target_score_or(&self, default: i64) -> i64 {
        self.target_score.unwrap_or(default)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_complete: Option<bool>,
}

impl GameUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.is_complete.is_none()
    }

    pub fn apply(&self, game: &mut Game) {
        if let Some(name) = &self.name {
            game.name = name.trim().to_string();
        }
        if let Some(is_complete) = self.is_complete {
            game.is_complete = is_complete;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundCreate {
    pub scores: Vec<Score>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundUpdate {
    pub scores: Vec<Score>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamesResponse {
    pub games: Vec<Game>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_game;
    use serde_json::json;

    #[test]
    fn test_game_create_defaults_target_score() {
        let body = json!({
            "name": "Rummy",
            "players": [{ "userId": "u1" }, { "customName": "Grandma" }]
        });

        let create: GameCreate = serde_json::from_value(body).unwrap();
        assert_eq!(create.target_score, None);
        assert_eq!(create.target_score_or(DEFAULT_TARGET_SCORE), 500);
        assert_eq!(create.players[0], PlayerInput::user("u1"));
        assert_eq!(create.players[1], PlayerInput::guest("Grandma"));
    }

    #[test]
    fn test_game_update_applies_only_given_fields() {
        let mut game = sample_game();
        let update: GameUpdate = serde_json::from_value(json!({ "isComplete": true })).unwrap();

        update.apply(&mut game);
        assert!(game.is_complete);
        assert_eq!(game.name, "Friday cards");
    }

    #[test]
    fn test_game_update_trims_name() {
        let mut game = sample_game();
        let update = GameUpdate {
            name: Some("  Saturday  ".to_string()),
            is_complete: None,
        };

        update.apply(&mut game);
        assert_eq!(game.name, "Saturday");
        assert!(!update.is_empty());
        assert!(GameUpdate::default().is_empty());
    }

    #[test]
    fn test_round_create_reads_camel_case_scores() {
        let body = json!({ "scores": [{ "playerId": "p1", "score": -3 }] });
        let create: RoundCreate = serde_json::from_value(body).unwrap();
        assert_eq!(create.scores[0].score, -3);
    }
}
