//! Authentication route handlers.
//!
//! Email/password login through the session authority, logout, and the
//! demo role switch.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::warn;

use urbanplan_core::{Identity, Role};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::LOGIN_PATH;
use crate::services::auth::{AuthError, Credential, DevCapability};
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/demo/{role}", post(demo_login))
}

/// What the login screen needs to render.
#[derive(Debug, Serialize)]
struct LoginPage {
    demo_mode: bool,
    demo_roles: Vec<Role>,
}

/// GET /auth/login
async fn login_page(State(state): State<AppState>) -> Json<LoginPage> {
    let demo_mode = state.config().demo_mode;
    Json(LoginPage {
        demo_mode,
        demo_roles: if demo_mode { Role::ALL.to_vec() } else { Vec::new() },
    })
}

/// Login form body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Identity>, AppError> {
    let credential = Credential::new(body.email, body.password);
    let identity = state.authority(session.clone()).authenticate(credential).await?;

    // New identity, new session id and a fresh workflow
    state.release_workflow(&session).await?;
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    set_sentry_user(identity.id().as_i32(), Some(identity.email().as_str()));

    Ok(Json(identity))
}

/// POST /auth/demo/{role}
///
/// 404 unless demo mode is on.
async fn demo_login(
    State(state): State<AppState>,
    session: Session,
    Path(role): Path<String>,
) -> Result<Json<Identity>, AppError> {
    let capability = DevCapability::from_config(state.config()).ok_or(AuthError::DevModeDisabled)?;
    let role: Role = role
        .parse()
        .map_err(|e: urbanplan_core::RoleParseError| AppError::BadRequest(e.to_string()))?;

    let identity = state
        .authority(session.clone())
        .assume_role(role, capability)
        .await?;
    state.release_workflow(&session).await?;
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(identity))
}

/// Sign out and drop the session's workflow binding.
///
/// POST /auth/logout
async fn logout(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    if let Err(e) = state.authority(session.clone()).sign_out().await {
        warn!(error = %e, "Sign-out could not clear the stored identity");
    }
    if let Err(e) = state.release_workflow(&session).await {
        warn!(error = %e, "Could not release the session's workflow");
    }
    clear_sentry_user();

    Redirect::to(LOGIN_PATH)
}
