use serde::{Deserialize, Serialize};

use super::Game;

/// Snapshot of every game a client knows about plus the one it has open.
///
/// `current_game` is always serialized, as `null` when nothing is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub games: Vec<Game>,
    pub current_game: Option<Game>,
}

impl GameState {
    pub fn new(games: Vec<Game>) -> Self {
        Self {
            games,
            current_game: None,
        }
    }

    /// Make the game with `game_id` current. Returns false and leaves the
    /// selection untouched when no such game is loaded.
    pub fn select(&mut self, game_id: &str) -> bool {
        match self.games.iter().find(|g| g.id == game_id) {
            Some(game) => {
                self.current_game = Some(game.clone());
                true
            }
            None => false,
        }
    }

    pub fn clear_current(&mut self) {
        self.current_game = None;
    }

    /// Replace the game with the same id, or append it
    pub fn upsert(&mut self, game: Game) {
        if self
            .current_game
            .as_ref()
            .is_some_and(|current| current.id == game.id)
        {
            self.current_game = Some(game.clone());
        }

        match self.games.iter_mut().find(|g| g.id == game.id) {
            Some(slot) => *slot = game,
            None => self.games.push(game),
        }
    }

    /// Drop a game; clears the selection if it was the current one
    pub fn remove(&mut self, game_id: &str) -> Option<Game> {
        let index = self.games.iter().position(|g| g.id == game_id)?;
        if self
            .current_game
            .as_ref()
            .is_some_and(|current| current.id == game_id)
        {
            self.current_game = None;
        }
        Some(self.games.remove(index))
    }

    /// True when nothing is selected or the selection matches a loaded game
    pub fn is_consistent(&self) -> bool {
        match &self.current_game {
            None => true,
            Some(current) => self.games.iter().any(|g| g == current),
        }
    }
}
