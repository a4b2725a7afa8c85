use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use finalizer::FinalizeError;
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Finalize(FinalizeError),
    Validation(ValidationErrors),
    Unauthorized,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Finalize(e) => write!(f, "Finalization error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

impl WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(e) => storage_status(e),
            Self::Finalize(FinalizeError::Persistence(e)) => storage_status(e),
            Self::Finalize(FinalizeError::TournamentNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Finalize(FinalizeError::NothingToFinalize) => StatusCode::CONFLICT,
            Self::Finalize(FinalizeError::Provider(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

fn storage_status(error: &StorageError) -> StatusCode {
    match error {
        StorageError::NotFound => StatusCode::NOT_FOUND,
        StorageError::ConstraintViolation(_) => StatusCode::CONFLICT,
        StorageError::PicksLocked(_) => StatusCode::CONFLICT,
        StorageError::InvalidPick(_) => StatusCode::BAD_REQUEST,
        StorageError::Database(_) | StorageError::Migration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn storage_body(error: &StorageError) -> serde_json::Value {
    match error {
        StorageError::NotFound => json!({ "error": "Resource not found" }),
        StorageError::ConstraintViolation(msg) | StorageError::InvalidPick(msg) => {
            json!({ "error": msg })
        }
        StorageError::PicksLocked(_) => json!({ "error": error.to_string() }),
        e => {
            tracing::error!("Storage error: {:?}", e);
            json!({ "error": "An internal error occurred" })
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Self::Storage(e) | Self::Finalize(FinalizeError::Persistence(e)) => storage_body(e),
            Self::Finalize(FinalizeError::Provider(e)) => {
                if e.is_not_ready() {
                    tracing::info!("Leaderboard not ready: {}", e);
                } else {
                    tracing::warn!("Leaderboard provider error: {}", e);
                }
                json!({
                    "error": "Leaderboard not available yet, try again later"
                })
            }
            Self::Finalize(e) => {
                json!({
                    "error": e.to_string()
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "Unauthorized"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<FinalizeError> for WebError {
    fn from(error: FinalizeError) -> Self {
        Self::Finalize(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

pub type ApiResult<T> = Result<T, WebError>;
