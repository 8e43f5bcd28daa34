use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::ApiError, AppState};

/// How long issued tokens stay valid
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,       // User ID
    pub username: String,  // Display name
    pub tenant_id: String, // Tenant the user acts in
    pub exp: usize,        // Expiration time
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub tenant_id: String,
}

/// Extractor for authenticated users from JWT tokens
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let app_state = Arc::<AppState>::from_ref(state);

        // Try to extract token from Authorization header first
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(String::from)
            // If no Authorization header, try query parameter
            .or_else(|| {
                parts
                    .uri
                    .query()
                    .and_then(|q| {
                        serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok()
                    })
                    .and_then(|params| {
                        params
                            .iter()
                            .find(|(k, _)| k == "token")
                            .map(|(_, v)| v.clone())
                    })
            });

        async move {
            let token = token.ok_or_else(|| unauthorized("missing bearer token"))?;
            verify_token(&token, &app_state.config.security.jwt_secret).map_err(|e| {
                tracing::debug!("Rejected bearer token: {}", e);
                unauthorized("invalid or expired token")
            })
        }
    }
}

fn unauthorized(message: &str) -> ApiError {
    ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
}

/// Decode and check a token; ids and tenant must be non-empty
pub fn verify_token(
    token: &str,
    jwt_secret: &str,
) -> Result<AuthenticatedUser, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )?;

    let claims = token_data.claims;
    if claims.sub.is_empty() || claims.tenant_id.is_empty() {
        return Err(jsonwebtoken::errors::ErrorKind::InvalidSubject.into());
    }

    Ok(AuthenticatedUser {
        user_id: claims.sub,
        username: claims.username,
        tenant_id: claims.tenant_id,
    })
}

/// Generate a JWT token for a user
pub fn generate_token(
    user_id: &str,
    username: &str,
    tenant_id: &str,
    jwt_secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = (chrono::Utc::now() + chrono::Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        tenant_id: tenant_id.to_string(),
        exp: expiration as usize,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_ref()),
    )
}
