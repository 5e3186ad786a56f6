use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mealsub_shared::Error as EngineError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Subscription {0} not found")]
    SubscriptionNotFound(String),

    #[error("Restaurant {0} not found")]
    RestaurantNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal server error")]
    InternalError(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl AppError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Engine(EngineError::CutoffViolation { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "cutoff_violation")
            }
            AppError::Engine(EngineError::MinimumNotMet { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "minimum_not_met")
            }
            AppError::Engine(EngineError::NoCutoffEligibleSelections { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "no_eligible_selections")
            }
            AppError::Engine(EngineError::InvalidDateKey(_)) | AppError::ValidationError(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation")
            }
            AppError::Engine(EngineError::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, "invalid_transition")
            }
            AppError::SubscriptionNotFound(_) | AppError::RestaurantNotFound(_) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            AppError::Engine(EngineError::Unknown(_)) | AppError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, kind) = self.status_and_kind();

        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "Internal error");
            "An unexpected error occurred. Please try again later.".to_string()
        } else {
            self.to_string()
        };

        (status_code, Json(json!({ "error": kind, "message": message }))).into_response()
    }
}
