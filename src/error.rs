use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::ServiceError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Error returned by HTTP handlers, rendered as `{ code, message }`
#[derive(Debug, Error)]
#[error("{status} {code}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), "INVALID_BODY", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(rejection.status(), "INVALID_QUERY", rejection.body_text())
    }
}

/// `Json` extractor whose rejections render as `ApiError`
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` extractor whose rejections render as `ApiError`
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match &err {
            ServiceError::Validation(v) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, v.code(), v.to_string())
            }
            ServiceError::NotFound { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
            }
            ServiceError::Forbidden(message) => {
                ApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", message.clone())
            }
            ServiceError::Conflict(message) => {
                ApiError::new(StatusCode::CONFLICT, "CONFLICT", message.clone())
            }
            ServiceError::Store(e) => {
                // details stay in the log
                tracing::error!("Storage failure: {}", e);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "internal server error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreError;
    use crate::game::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ServiceError::Validation(ValidationError::NoPlayers),
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_PLAYERS",
            ),
            (
                ServiceError::NotFound {
                    entity: "game",
                    id: "g1".to_string(),
                },
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                ServiceError::Forbidden("no".to_string()),
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
            ),
            (
                ServiceError::Conflict("done".to_string()),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                ServiceError::Store(StoreError::Database(sqlx::Error::PoolTimedOut)),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
            ),
        ];

        for (err, status, code) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status, status);
            assert_eq!(api.code, code);
        }
    }

    #[test]
    fn test_database_details_are_not_exposed() {
        let api = ApiError::from(ServiceError::Store(StoreError::Database(
            sqlx::Error::Protocol("password=hunter2".to_string()),
        )));
        assert!(!api.message.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_json_rejection_renders_error_body() {
        use axum::{body::Body, extract::FromRequest, http::Request};
        use http_body_util::BodyExt;

        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name": 5}"#))
            .unwrap();

        let err = ApiJson::<crate::models::GameCreate>::from_request(request, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code, "INVALID_BODY");

        let response = err.into_response();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "INVALID_BODY");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }
}
