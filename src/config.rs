use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

use crate::models::DEFAULT_TARGET_SCORE;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `None` runs the service on the in-memory store
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub default_target_score: i64,
    pub max_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            default_target_score: DEFAULT_TARGET_SCORE,
            max_players: 12,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
        };

        let server = ServerConfig {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        };

        let security = SecurityConfig {
            jwt_secret: env::var("JWT_SECRET")
                .context("JWT_SECRET must be set")?,
        };

        let defaults = GameConfig::default();
        let game = GameConfig {
            default_target_score: env::var("DEFAULT_TARGET_SCORE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|score: &i64| *score > 0)
                .unwrap_or(defaults.default_target_score),
            max_players: env::var("MAX_PLAYERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_players),
        };

        Ok(Config {
            database,
            server,
            security,
            game,
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database.url.as_deref()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_defaults() {
        let game = GameConfig::default();
        assert_eq!(game.default_target_score, 500);
        assert_eq!(game.max_players, 12);
    }

    #[test]
    fn test_server_addr() {
        let config = crate::test_support::test_config();
        assert_eq!(config.server_addr(), "127.0.0.1:0");
        assert!(config.database_url().is_none());
    }
}
