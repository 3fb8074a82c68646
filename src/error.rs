use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::repository::RepoError;

/// Application-level failure, translated to an HTTP status exactly once,
/// here at the boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{entity} with id ({key}) was not found")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} with id ({key}) was modified concurrently")]
    Conflict { entity: &'static str, key: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Error body returned for non-2xx responses.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub error_type: String,
    pub error_message: String,
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity, key } => AppError::NotFound { entity, key },
            RepoError::Conflict { entity, key } => AppError::Conflict { entity, key },
            RepoError::Database(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad Request"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "Not Found"),
            AppError::Conflict { .. } => (StatusCode::CONFLICT, "Conflict"),
            AppError::Internal(e) => {
                error!(error = %e, "unhandled error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failure")
            }
        };

        let body = ErrorDetails {
            error_type: error_type.to_string(),
            error_message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(resp: Response) -> ErrorDetails {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("error body is json")
    }

    #[tokio::test]
    async fn not_found_maps_to_404_with_error_body() {
        let err = AppError::NotFound {
            entity: "Country",
            key: "42".into(),
        };
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let details = body_of(resp).await;
        assert_eq!(details.error_type, "Not Found");
        assert!(details.error_message.contains("Country"));
        assert!(details.error_message.contains("42"));
    }

    #[tokio::test]
    async fn unexpected_maps_to_500_failure() {
        let err = AppError::Internal(anyhow::anyhow!("boom"));
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let details = body_of(resp).await;
        assert_eq!(details.error_type, "Failure");
        assert_eq!(details.error_message, "boom");
    }

    #[tokio::test]
    async fn error_body_serializes_camel_case() {
        let details = ErrorDetails {
            error_type: "Failure".into(),
            error_message: "nope".into(),
        };
        let json = serde_json::to_string(&details).unwrap();
        assert!(json.contains("errorType"));
        assert!(json.contains("errorMessage"));
    }
}
