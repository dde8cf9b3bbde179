//! Identity extractors and screen guards.
//!
//! The identity is re-read from the session on every request through
//! [`crate::services::auth::SessionAuthority::restore_session`], so a
//! corrupt or outdated record behaves exactly like no record.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use urbanplan_core::Identity;

use crate::error::{AppError, set_sentry_user};
use crate::navigation::{Screen, UnauthorizedAccess};
use crate::state::AppState;

/// Where anonymous page requests are sent.
pub const LOGIN_PATH: &str = "/auth/login";

/// Where page requests for a forbidden screen are sent.
pub const HOME_PATH: &str = "/dashboard";

fn is_api(parts: &Parts) -> bool {
    parts.uri.path().starts_with("/api/")
}

async fn restore(parts: &Parts, state: &AppState) -> Option<Identity> {
    let session = parts.extensions.get::<Session>()?.clone();
    state.authority(session).restore_session().await
}

/// Extractor that requires a signed-in identity.
///
/// Anonymous API requests get 401; anonymous page requests are redirected
/// to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireIdentity(identity): RequireIdentity,
/// ) -> impl IntoResponse {
///     format!("Olá, {}!", identity.name())
/// }
/// ```
pub struct RequireIdentity(pub Identity);

/// Rejection when a signed-in identity is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityRejection {
    /// Redirect to login page (for page requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "not signed in" })),
            )
                .into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireIdentity {
    type Rejection = IdentityRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = restore(parts, state).await.ok_or_else(|| {
            if is_api(parts) {
                IdentityRejection::Unauthorized
            } else {
                IdentityRejection::RedirectToLogin
            }
        })?;

        set_sentry_user(identity.id().as_i32(), Some(identity.email().as_str()));
        Ok(Self(identity))
    }
}

/// Extractor that optionally gets the signed-in identity.
///
/// Unlike `RequireIdentity`, this never rejects the request.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequestParts<AppState> for OptionalIdentity {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(restore(parts, state).await))
    }
}

/// Refusal to open a screen.
#[derive(Debug)]
pub enum ScreenRejection {
    /// API request: 403 with a JSON body.
    Forbidden(UnauthorizedAccess),
    /// Page request: back to the dashboard.
    RedirectHome,
}

impl IntoResponse for ScreenRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Forbidden(denied) => AppError::Forbidden(denied).into_response(),
            Self::RedirectHome => Redirect::to(HOME_PATH).into_response(),
        }
    }
}

/// Check that `identity` may open `screen`, shaping the refusal for the
/// kind of request being served.
///
/// # Errors
///
/// `ScreenRejection::Forbidden` for API requests,
/// `ScreenRejection::RedirectHome` for page requests.
pub fn authorize_screen(
    state: &AppState,
    screen: Screen,
    identity: &Identity,
    api: bool,
) -> Result<(), ScreenRejection> {
    state
        .navigation()
        .authorize(screen, Some(identity))
        .map_err(|denied| {
            tracing::info!(%screen, role = %identity.role(), "Screen access denied");
            if api {
                ScreenRejection::Forbidden(denied)
            } else {
                ScreenRejection::RedirectHome
            }
        })
}
