use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Server error";

/// Any possible server errors
#[derive(Debug, Error)]
pub(crate) enum ServerError {
    #[error(transparent)]
    ValidationError(#[from] validator::ValidationErrors),

    #[error(transparent)]
    AxumJsonRejection(#[from] axum::extract::rejection::JsonRejection),

    #[error(transparent)]
    DbError(#[from] sea_orm::DbErr),

    #[error(transparent)]
    RedisError(#[from] redis::RedisError),

    #[error("Task not found")]
    TaskNotFound,

    #[error("Not authorized")]
    NotAuthorized,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::ValidationError(_) => {
                let message = format!("Input validation error: [{}]", self).replace('\n', ", ");
                (StatusCode::BAD_REQUEST, message)
            }
            ServerError::AxumJsonRejection(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::TaskNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::NotAuthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServerError::DbError(e) => {
                tracing::error!("Database error occurred: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_SERVER_ERROR_MESSAGE.to_owned(),
                )
            }
            ServerError::RedisError(e) => {
                tracing::error!("Redis error occurred: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_SERVER_ERROR_MESSAGE.to_owned(),
                )
            }
            ServerError::Other(e) => {
                tracing::error!("Internal error occurred: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_SERVER_ERROR_MESSAGE.to_owned(),
                )
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
