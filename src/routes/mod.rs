pub mod games;
pub mod health;
pub mod users;

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users/me", put(users::register_me))
        .route("/state", get(games::get_state))
        .route("/games", get(games::list_games).post(games::create_game))
        .route(
            "/games/{game_id}",
            get(games::get_game)
                .patch(games::update_game)
                .delete(games::delete_game),
        )
        .route("/games/{game_id}/standings", get(games::get_standings))
        .route("/games/{game_id}/rounds", axum::routing::post(games::add_round))
        .route(
            "/games/{game_id}/rounds/{round_id}",
            put(games::update_round).delete(games::delete_round),
        )
}

/// Full application: routes, CORS and request tracing bound to `state`
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = match state.config.server.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(
                "FRONTEND_URL {} is not a valid origin, allowing any origin",
                state.config.server.frontend_url
            );
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    Router::new()
        .merge(create_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
