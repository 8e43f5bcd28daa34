use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Game, GameUpdate, Round, Score, UserProfile};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("game '{id}' is complete")]
    GameComplete { id: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn game_not_found(id: &str) -> Self {
        StoreError::NotFound {
            entity: "game",
            id: id.to_string(),
        }
    }

    pub fn round_not_found(id: &str) -> Self {
        StoreError::NotFound {
            entity: "round",
            id: id.to_string(),
        }
    }

    pub fn game_complete(id: &str) -> Self {
        StoreError::GameComplete { id: id.to_string() }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence for users, games and rounds.
///
/// Every lookup is scoped by tenant: a game stored under one tenant is
/// invisible (`None` / `NotFound`) to calls made with any other tenant.
/// Rounds come back in insertion order. Round writes fail with
/// `GameComplete` when the game is complete at the moment of the write.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn upsert_user(&self, profile: &UserProfile) -> StoreResult<UserProfile>;

    async fn get_user(&self, tenant_id: &str, user_id: &str) -> StoreResult<Option<UserProfile>>;

    async fn list_users(&self, tenant_id: &str) -> StoreResult<Vec<UserProfile>>;

    async fn create_game(&self, game: &Game) -> StoreResult<Game>;

    async fn get_game(&self, tenant_id: &str, game_id: &str) -> StoreResult<Option<Game>>;

    /// Games the user owns or plays in as a registered player, newest first
    async fn list_games_for_user(&self, tenant_id: &str, user_id: &str)
        -> StoreResult<Vec<Game>>;

    async fn update_game(
        &self,
        tenant_id: &str,
        game_id: &str,
        update: &GameUpdate,
    ) -> StoreResult<Game>;

    /// Removes the game and all of its rounds
    async fn delete_game(&self, tenant_id: &str, game_id: &str) -> StoreResult<()>;

    async fn add_round(&self, tenant_id: &str, game_id: &str, round: &Round) -> StoreResult<Round>;

    async fn update_round(
        &self,
        tenant_id: &str,
        game_id: &str,
        round_id: &str,
        scores: &[Score],
    ) -> StoreResult<Round>;

    async fn delete_round(&self, tenant_id: &str, game_id: &str, round_id: &str)
        -> StoreResult<()>;
}
