pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod game;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use config::Config;
use db::GameStore;
use services::GameService;

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub games: GameService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn GameStore>) -> Self {
        let games = GameService::new(store, config.game.clone());
        Self { config, games }
    }
}
