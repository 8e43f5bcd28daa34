use crate::{
    auth::AuthenticatedUser,
    config::{Config, DatabaseConfig, GameConfig, SecurityConfig, ServerConfig},
    models::{Game, Player, Round, Score},
};

/// Two players (guest Alice, registered Bob) and one round, target 50
pub fn sample_game() -> Game {
    Game {
        id: "g1".to_string(),
        name: "Friday cards".to_string(),
        date: "2026-10-18T12:00:00.000Z".to_string(),
        players: vec![
            Player {
                id: "p1".to_string(),
                name: "Alice".to_string(),
                user_id: None,
            },
            Player {
                id: "p2".to_string(),
                name: "Bob".to_string(),
                user_id: Some("u9".to_string()),
            },
        ],
        rounds: vec![Round {
            id: "r1".to_string(),
            scores: vec![
                Score {
                    player_id: "p1".to_string(),
                    score: 10,
                },
                Score {
                    player_id: "p2".to_string(),
                    score: 7,
                },
            ],
        }],
        target_score: 50,
        is_complete: false,
        user_id: "u1".to_string(),
        tenant_id: "t1".to_string(),
    }
}

pub fn test_user(user_id: &str, tenant_id: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: user_id.to_string(),
        username: format!("user-{}", user_id),
        tenant_id: tenant_id.to_string(),
    }
}

pub fn test_config() -> Config {
    Config {
        database: DatabaseConfig {
            url: None,
            max_connections: 1,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            frontend_url: "http://localhost:5173".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: "test-secret".to_string(),
        },
        game: GameConfig::default(),
    }
}
