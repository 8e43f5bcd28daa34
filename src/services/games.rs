use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    config::GameConfig,
    db::{GameStore, StoreError},
    game::{self, Scorer, ValidationError},
    models::{
        format_game_date, Game, GameCreate, GameState, GameUpdate, GamesResponse, Player,
        PlayerInput, Round, RoundCreate, RoundUpdate, Standings, UserProfile,
    },
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            StoreError::GameComplete { id } => ServiceError::game_complete(&id),
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    fn game_not_found(id: &str) -> Self {
        ServiceError::NotFound {
            entity: "game",
            id: id.to_string(),
        }
    }

    fn round_not_found(id: &str) -> Self {
        ServiceError::NotFound {
            entity: "round",
            id: id.to_string(),
        }
    }

    fn game_complete(id: &str) -> Self {
        ServiceError::Conflict(format!(
            "game '{}' is complete; reopen it before changing rounds",
            id
        ))
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Game workflows on behalf of an authenticated caller.
///
/// Everything is confined to the caller's tenant, and a game is only
/// reachable by its owner and its registered players. Games outside that
/// set are reported as not found rather than forbidden.
#[derive(Clone)]
pub struct GameService {
    store: Arc<dyn GameStore>,
    config: GameConfig,
}

impl GameService {
    pub fn new(store: Arc<dyn GameStore>, config: GameConfig) -> Self {
        Self { store, config }
    }

    /// Record (or refresh) the caller in the tenant's user directory
    pub async fn register_user(&self, user: &AuthenticatedUser) -> ServiceResult<UserProfile> {
        let display_name = user.username.trim();
        if display_name.is_empty() {
            return Err(ValidationError::EmptyDisplayName.into());
        }

        let profile = UserProfile::new(&user.user_id, &user.tenant_id, display_name);
        let saved = self.store.upsert_user(&profile).await?;
        tracing::info!(
            "Registered user {} ({}) in tenant {}",
            saved.display_name,
            saved.user_id,
            saved.tenant_id
        );
        Ok(saved)
    }

    pub async fn list_users(&self, user: &AuthenticatedUser) -> ServiceResult<Vec<UserProfile>> {
        Ok(self.store.list_users(&user.tenant_id).await?)
    }

    pub async fn list_games(&self, user: &AuthenticatedUser) -> ServiceResult<GamesResponse> {
        let games = self
            .store
            .list_games_for_user(&user.tenant_id, &user.user_id)
            .await?;
        Ok(GamesResponse { games })
    }

    pub async fn create_game(
        &self,
        user: &AuthenticatedUser,
        create: GameCreate,
    ) -> ServiceResult<Game> {
        game::validate_game_create(&create, self.config.max_players)?;

        let mut players = Vec::with_capacity(create.players.len());
        for (index, input) in create.players.iter().enumerate() {
            players.push(self.resolve_player(&user.tenant_id, index, input).await?);
        }

        let game = Game {
            id: Uuid::new_v4().to_string(),
            name: create.name.trim().to_string(),
            date: format_game_date(Utc::now()),
            players,
            rounds: Vec::new(),
            target_score: create.target_score_or(self.config.default_target_score),
            is_complete: false,
            user_id: user.user_id.clone(),
            tenant_id: user.tenant_id.clone(),
        };
        game::validate_game(&game)?;

        let game = self.store.create_game(&game).await?;
        tracing::info!(
            "User {} created game {} with {} players (target {})",
            user.user_id,
            game.id,
            game.players.len(),
            game.target_score
        );
        Ok(game)
    }

    async fn resolve_player(
        &self,
        tenant_id: &str,
        index: usize,
        input: &PlayerInput,
    ) -> ServiceResult<Player> {
        match (&input.user_id, &input.custom_name) {
            (Some(user_id), _) => {
                let profile = self
                    .store
                    .get_user(tenant_id, user_id)
                    .await?
                    .ok_or_else(|| ValidationError::UnknownUser(user_id.clone()))?;
                Ok(Player::registered(profile.user_id, profile.display_name))
            }
            (None, Some(name)) => Ok(Player::guest(name.trim())),
            // validate_game_create rejects this shape before we get here
            (None, None) => Err(ValidationError::AmbiguousPlayerInput { index }.into()),
        }
    }

    pub async fn get_game(&self, user: &AuthenticatedUser, game_id: &str) -> ServiceResult<Game> {
        let game = self
            .store
            .get_game(&user.tenant_id, game_id)
            .await?
            .ok_or_else(|| ServiceError::game_not_found(game_id))?;

        if !game.is_visible_to(&user.user_id) {
            tracing::debug!("User {} has no access to game {}", user.user_id, game_id);
            return Err(ServiceError::game_not_found(game_id));
        }
        Ok(game)
    }

    pub async fn update_game(
        &self,
        user: &AuthenticatedUser,
        game_id: &str,
        update: GameUpdate,
    ) -> ServiceResult<Game> {
        game::validate_game_update(&update)?;
        self.get_game(user, game_id).await?;

        let game = self
            .store
            .update_game(&user.tenant_id, game_id, &update)
            .await?;
        tracing::info!(
            "User {} updated game {} (complete: {})",
            user.user_id,
            game.id,
            game.is_complete
        );
        Ok(game)
    }

    /// Only the owner may delete a game
    pub async fn delete_game(&self, user: &AuthenticatedUser, game_id: &str) -> ServiceResult<()> {
        let game = self.get_game(user, game_id).await?;
        if game.user_id != user.user_id {
            return Err(ServiceError::Forbidden(
                "only the game's owner can delete it".to_string(),
            ));
        }

        self.store.delete_game(&user.tenant_id, game_id).await?;
        tracing::info!("User {} deleted game {}", user.user_id, game_id);
        Ok(())
    }

    pub async fn standings(
        &self,
        user: &AuthenticatedUser,
        game_id: &str,
    ) -> ServiceResult<Standings> {
        let game = self.get_game(user, game_id).await?;
        Ok(Scorer::standings(&game))
    }

    /// Load a game whose rounds may still change
    async fn open_game(&self, user: &AuthenticatedUser, game_id: &str) -> ServiceResult<Game> {
        let game = self.get_game(user, game_id).await?;
        if game.is_complete {
            return Err(ServiceError::game_complete(game_id));
        }
        Ok(game)
    }

    pub async fn add_round(
        &self,
        user: &AuthenticatedUser,
        game_id: &str,
        create: RoundCreate,
    ) -> ServiceResult<Round> {
        let game = self.open_game(user, game_id).await?;
        game::validate_scores(&game, &create.scores)?;

        let round = self
            .store
            .add_round(&user.tenant_id, game_id, &Round::new(create.scores))
            .await?;
        tracing::debug!(
            "Added round {} to game {} ({} scores)",
            round.id,
            game_id,
            round.scores.len()
        );
        Ok(round)
    }

    pub async fn update_round(
        &self,
        user: &AuthenticatedUser,
        game_id: &str,
        round_id: &str,
        update: RoundUpdate,
    ) -> ServiceResult<Round> {
        let game = self.open_game(user, game_id).await?;
        if game.round(round_id).is_none() {
            return Err(ServiceError::round_not_found(round_id));
        }
        game::validate_scores(&game, &update.scores)?;

        let round = self
            .store
            .update_round(&user.tenant_id, game_id, round_id, &update.scores)
            .await?;
        tracing::debug!("Updated round {} of game {}", round_id, game_id);
        Ok(round)
    }

    pub async fn delete_round(
        &self,
        user: &AuthenticatedUser,
        game_id: &str,
        round_id: &str,
    ) -> ServiceResult<()> {
        let game = self.open_game(user, game_id).await?;
        if game.round(round_id).is_none() {
            return Err(ServiceError::round_not_found(round_id));
        }

        self.store
            .delete_round(&user.tenant_id, game_id, round_id)
            .await?;
        tracing::debug!("Deleted round {} of game {}", round_id, game_id);
        Ok(())
    }

    /// The caller's games, with `current` selected when it is one of them
    pub async fn state(
        &self,
        user: &AuthenticatedUser,
        current: Option<&str>,
    ) -> ServiceResult<GameState> {
        let GamesResponse { games } = self.list_games(user).await?;
        let mut state = GameState::new(games);

        if let Some(game_id) = current {
            if !state.select(game_id) {
                tracing::debug!(
                    "Requested current game {} is not available to user {}",
                    game_id,
                    user.user_id
                );
            }
        }
        Ok(state)
    }
}
