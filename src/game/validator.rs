use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Game, GameCreate, GameState, GameUpdate, Score};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("game id must not be empty")]
    EmptyGameId,
    #[error("game name must not be empty")]
    EmptyGameName,
    #[error("a game needs at least one player")]
    NoPlayers,
    #[error("too many players: {count} (max {max})")]
    TooManyPlayers { count: usize, max: usize },
    #[error("player at position {index} has an empty id")]
    EmptyPlayerId { index: usize },
    #[error("player '{player_id}' has an empty name")]
    EmptyPlayerName { player_id: String },
    #[error("player id '{0}' is used more than once")]
    DuplicatePlayerId(String),
    #[error("player at position {index} must give exactly one of userId or customName")]
    AmbiguousPlayerInput { index: usize },
    #[error("user '{0}' is listed more than once")]
    DuplicateUser(String),
    #[error("unknown user '{0}'")]
    UnknownUser(String),
    #[error("target score must be positive, got {0}")]
    InvalidTargetScore(i64),
    #[error("round at position {index} has an empty id")]
    EmptyRoundId { index: usize },
    #[error("round id '{0}' is used more than once")]
    DuplicateRoundId(String),
    #[error("score references unknown player '{0}'")]
    UnknownPlayer(String),
    #[error("player '{0}' has more than one score in the round")]
    DuplicateScore(String),
    #[error("update contains no changes")]
    EmptyUpdate,
    #[error("current game is not one of the loaded games")]
    StaleCurrentGame,
    #[error("display name must not be empty")]
    EmptyDisplayName,
}

impl ValidationError {
    /// Stable machine-readable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyGameId => "EMPTY_GAME_ID",
            ValidationError::EmptyGameName => "EMPTY_GAME_NAME",
            ValidationError::NoPlayers => "NO_PLAYERS",
            ValidationError::TooManyPlayers { .. } => "TOO_MANY_PLAYERS",
            ValidationError::EmptyPlayerId { .. } => "EMPTY_PLAYER_ID",
            ValidationError::EmptyPlayerName { .. } => "EMPTY_PLAYER_NAME",
            ValidationError::DuplicatePlayerId(_) => "DUPLICATE_PLAYER_ID",
            ValidationError::AmbiguousPlayerInput { .. } => "AMBIGUOUS_PLAYER_INPUT",
            ValidationError::DuplicateUser(_) => "DUPLICATE_USER",
            ValidationError::UnknownUser(_) => "UNKNOWN_USER",
            ValidationError::InvalidTargetScore(_) => "INVALID_TARGET_SCORE",
            ValidationError::EmptyRoundId { .. } => "EMPTY_ROUND_ID",
            ValidationError::DuplicateRoundId(_) => "DUPLICATE_ROUND_ID",
            ValidationError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            ValidationError::DuplicateScore(_) => "DUPLICATE_SCORE",
            ValidationError::EmptyUpdate => "EMPTY_UPDATE",
            ValidationError::StaleCurrentGame => "STALE_CURRENT_GAME",
            ValidationError::EmptyDisplayName => "EMPTY_DISPLAY_NAME",
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Structural checks on a whole game, including every round's scores
pub fn validate_game(game: &Game) -> Result<(), ValidationError> {
    if is_blank(&game.id) {
        return Err(ValidationError::EmptyGameId);
    }
    if is_blank(&game.name) {
        return Err(ValidationError::EmptyGameName);
    }

    let mut player_ids = HashSet::new();
    for (index, player) in game.players.iter().enumerate() {
        if is_blank(&player.id) {
            return Err(ValidationError::EmptyPlayerId { index });
        }
        if is_blank(&player.name) {
            return Err(ValidationError::EmptyPlayerName {
                player_id: player.id.clone(),
            });
        }
        if !player_ids.insert(player.id.as_str()) {
            return Err(ValidationError::DuplicatePlayerId(player.id.clone()));
        }
    }

    let mut round_ids = HashSet::new();
    for (index, round) in game.rounds.iter().enumerate() {
        if is_blank(&round.id) {
            return Err(ValidationError::EmptyRoundId { index });
        }
        if !round_ids.insert(round.id.as_str()) {
            return Err(ValidationError::DuplicateRoundId(round.id.clone()));
        }
        validate_scores(game, &round.scores)?;
    }

    Ok(())
}

/// Every score must name a player of `game`, at most once per round
pub fn validate_scores(game: &Game, scores: &[Score]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for score in scores {
        if game.player(&score.player_id).is_none() {
            return Err(ValidationError::UnknownPlayer(score.player_id.clone()));
        }
        if !seen.insert(score.player_id.as_str()) {
            return Err(ValidationError::DuplicateScore(score.player_id.clone()));
        }
    }
    Ok(())
}

pub fn validate_game_create(
    create: &GameCreate,
    max_players: usize,
) -> Result<(), ValidationError> {
    if is_blank(&create.name) {
        return Err(ValidationError::EmptyGameName);
    }
    if create.players.is_empty() {
        return Err(ValidationError::NoPlayers);
    }
    if create.players.len() > max_players {
        return Err(ValidationError::TooManyPlayers {
            count: create.players.len(),
            max: max_players,
        });
    }
    if let Some(target) = create.target_score.filter(|t| *t <= 0) {
        return Err(ValidationError::InvalidTargetScore(target));
    }

    let mut users = HashSet::new();
    for (index, input) in create.players.iter().enumerate() {
        match (input.user_id.as_deref(), input.custom_name.as_deref()) {
            (Some(user_id), None) if !is_blank(user_id) => {
                if !users.insert(user_id) {
                    return Err(ValidationError::DuplicateUser(user_id.to_string()));
                }
            }
            (None, Some(name)) if !is_blank(name) => {}
            _ => return Err(ValidationError::AmbiguousPlayerInput { index }),
        }
    }

    Ok(())
}

pub fn validate_game_update(update: &GameUpdate) -> Result<(), ValidationError> {
    if update.is_empty() {
        return Err(ValidationError::EmptyUpdate);
    }
    if update.name.as_deref().is_some_and(is_blank) {
        return Err(ValidationError::EmptyGameName);
    }
    Ok(())
}

pub fn validate_state(state: &GameState) -> Result<(), ValidationError> {
    for game in &state.games {
        validate_game(game)?;
    }
    if let Some(current) = &state.current_game {
        validate_game(current)?;
    }
    if !state.is_consistent() {
        return Err(ValidationError::StaleCurrentGame);
    }
    Ok(())
}
