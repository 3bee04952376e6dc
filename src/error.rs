use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repository::RepositoryError;

/// The one sentence every authentication failure answers with.
pub const UNAUTHENTICATED_MESSAGE: &str = "You need to sign in or sign up before continuing.";

/// ApiError
///
/// Every way a request can fail, mapped to a status and JSON body by `IntoResponse`.
///
/// Note the body keys differ: authentication and lookup failures use `errors`
/// while validation failures use `error`. Clients depend on both shapes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthenticated")]
    Unauthorized,

    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] RepositoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "errors": [UNAUTHENTICATED_MESSAGE] })),
            )
                .into_response(),
            ApiError::Validation(messages) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": messages })),
            )
                .into_response(),
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "errors": [message] }))).into_response()
            }
            ApiError::Internal(e) => {
                // The cause stays in the logs.
                tracing::error!("repository failure: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "errors": ["Internal server error"] })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unauthorized_uses_errors_key() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "errors": ["You need to sign in or sign up before continuing."] })
        );
    }

    #[tokio::test]
    async fn validation_uses_error_key() {
        let response =
            ApiError::Validation(vec!["Image can't be blank".to_string()]).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            json!({ "error": ["Image can't be blank"] })
        );
    }

    #[tokio::test]
    async fn internal_hides_cause() {
        let response = ApiError::Internal(RepositoryError::MissingCategory(4)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "errors": ["Internal server error"] })
        );
    }
}
