use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Error returned by every JSON handler, rendered as
/// `{"success": false, "message": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] eventhub_shared::Error),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        use eventhub_shared::Error;

        match self {
            AppError::Domain(Error::Validate(_) | Error::User(_)) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Domain(Error::Unauthenticated(_)) | AppError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Domain(Error::Forbidden) => StatusCode::FORBIDDEN,
            AppError::Domain(Error::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Domain(Error::Server(_) | Error::Unknown(_)) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(err = ?self, "request failed");
            "Internal server error".to_owned()
        } else {
            match &self {
                AppError::Domain(eventhub_shared::Error::NotFound(_)) => {
                    capitalize(&self.to_string())
                }
                _ => self.to_string(),
            }
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub type AppResult<T> = Result<T, AppError>;
