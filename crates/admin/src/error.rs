//! Unified error handling for the HTTP surface.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::CalendarError;
use crate::navigation::UnauthorizedAccess;
use crate::services::auth::AuthError;
use crate::workflow::WorkflowError;

/// Application-level error type for the dashboard API.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Signed-in identity may not open the screen.
    #[error(transparent)]
    Forbidden(#[from] UnauthorizedAccess),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Nobody is signed in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::InvalidCredential | AuthError::InvalidEmail(_))
            | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::DevModeDisabled) => StatusCode::NOT_FOUND,
            Self::Auth(AuthError::Store(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Workflow(WorkflowError::ValidationFailed { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Workflow(
                WorkflowError::AnalysisInProgress
                | WorkflowError::InvalidTransition { .. }
                | WorkflowError::DocumentNotRetryable(_),
            ) => StatusCode::CONFLICT,
            Self::Workflow(WorkflowError::DocumentNotFound(_)) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Workflow(WorkflowError::AnalysisFailed { .. }) => StatusCode::BAD_GATEWAY,
            Self::Workflow(WorkflowError::Storage(_))
            | Self::Calendar(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Dashboard request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Auth(AuthError::Store(_)) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = match &self {
            Self::Workflow(WorkflowError::ValidationFailed { field }) => {
                json!({ "error": message, "field": field })
            }
            Self::Forbidden(denied) => json!({ "error": message, "screen": denied.screen }),
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Set the Sentry user context from a signed-in identity.
pub fn set_sentry_user(identity_id: i32, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(identity_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
