use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A participant in a game.
///
/// Registered players carry the `user_id` of their account; guests don't.
/// The field is left out of the JSON entirely for guests so the
/// present/absent distinction survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Player {
    /// Guest player scoped to a single game
    pub fn guest(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            user_id: None,
        }
    }

    /// Player backed by a registered account
    pub fn registered(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            user_id: Some(user_id.into()),
        }
    }

    pub fn is_registered(&self) -> bool {
        self.user_id.is_some()
    }
}

/// One player's score in a round. `player_id` refers to `Player::id`
/// within the same game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub player_id: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: String,
    pub scores: Vec<Score>,
}

impl Round {
    pub fn new(scores: Vec<Score>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            scores,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub name: String,
    pub date: String,
    pub players: Vec<Player>,
    pub rounds: Vec<Round>,
    pub target_score: i64,
    pub is_complete: bool,
    /// Owner of the game
    pub user_id: String,
    pub tenant_id: String,
}

impl Game {
    /// Account ids of the registered players, in player order (guests excluded)
    pub fn user_ids(&self) -> Vec<String> {
        self.players
            .iter()
            .filter_map(|p| p.user_id.clone())
            .collect()
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn round(&self, round_id: &str) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == round_id)
    }

    /// Owner or registered participant
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.user_id == user_id
            || self
                .players
                .iter()
                .any(|p| p.user_id.as_deref() == Some(user_id))
    }
}

/// Game date as written by the service
pub fn format_game_date(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Database rows

#[derive(Debug, Clone, FromRow)]
pub struct GameRecord {
    pub id: String,
    pub tenant_id: String,
    pub user_id: String,
    pub name: String,
    pub date: String,
    pub players: sqlx::types::Json<Vec<Player>>,
    pub user_ids: Vec<String>,
    pub target_score: i64,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameRecord {
    /// Assemble the API model; rounds are stored in their own table
    pub fn into_game(self, rounds: Vec<Round>) -> Game {
        Game {
            id: self.id,
            name: self.name,
            date: self.date,
            players: self.players.0,
            rounds,
            target_score: self.target_score,
            is_complete: self.is_complete,
            user_id: self.user_id,
            tenant_id: self.tenant_id,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RoundRecord {
    pub id: String,
    pub game_id: String,
    pub seq: i64,
    pub scores: sqlx::types::Json<Vec<Score>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RoundRecord> for Round {
    fn from(record: RoundRecord) -> Self {
        Round {
            id: record.id,
            scores: record.scores.0,
        }
    }
}
