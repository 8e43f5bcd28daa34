use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    auth::AuthenticatedUser,
    error::{ApiError, ApiJson, ApiQuery},
    models::{
        Game, GameCreate, GameState, GameUpdate, GamesResponse, Round, RoundCreate, RoundUpdate,
        Standings,
    },
    AppState,
};

pub async fn list_games(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<Json<GamesResponse>, ApiError> {
    tracing::debug!("Listing games for {} in {}", user.user_id, user.tenant_id);
    Ok(Json(state.games.list_games(&user).await?))
}

pub async fn create_game(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ApiJson(payload): ApiJson<GameCreate>,
) -> Result<(StatusCode, Json<Game>), ApiError> {
    let game = state.games.create_game(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

pub async fn get_game(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(game_id): Path<String>,
) -> Result<Json<Game>, ApiError> {
    Ok(Json(state.games.get_game(&user, &game_id).await?))
}

pub async fn update_game(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(game_id): Path<String>,
    ApiJson(payload): ApiJson<GameUpdate>,
) -> Result<Json<Game>, ApiError> {
    Ok(Json(state.games.update_game(&user, &game_id, payload).await?))
}

pub async fn delete_game(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(game_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.games.delete_game(&user, &game_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_standings(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(game_id): Path<String>,
) -> Result<Json<Standings>, ApiError> {
    Ok(Json(state.games.standings(&user, &game_id).await?))
}

pub async fn add_round(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(game_id): Path<String>,
    ApiJson(payload): ApiJson<RoundCreate>,
) -> Result<(StatusCode, Json<Round>), ApiError> {
    let round = state.games.add_round(&user, &game_id, payload).await?;
    Ok((StatusCode::CREATED, Json(round)))
}

pub async fn update_round(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path((game_id, round_id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<RoundUpdate>,
) -> Result<Json<Round>, ApiError> {
    Ok(Json(
        state
            .games
            .update_round(&user, &game_id, &round_id, payload)
            .await?,
    ))
}

pub async fn delete_round(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path((game_id, round_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.games.delete_round(&user, &game_id, &round_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct StateQuery {
    /// Game to open as the current one
    pub current: Option<String>,
}

pub async fn get_state(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ApiQuery(query): ApiQuery<StateQuery>,
) -> Result<Json<GameState>, ApiError> {
    Ok(Json(
        state
            .games
            .state(&user, query.current.as_deref())
            .await?,
    ))
}
