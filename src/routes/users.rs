use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{auth::AuthenticatedUser, error::ApiError, models::UserProfile, AppState};

/// Register the caller in their tenant's user directory, using the name
/// carried by the token
pub async fn register_me(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.games.register_user(&user).await?))
}

/// Registered users of the caller's tenant, for picking players
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    Ok(Json(state.games.list_users(&user).await?))
}
