//! Identity summary, screen access checks and the page shell.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Serialize;

use urbanplan_core::Identity;

use crate::error::AppError;
use crate::middleware::auth::{
    LOGIN_PATH, OptionalIdentity, RequireIdentity, authorize_screen,
};
use crate::navigation::{Screen, ScreenDescriptor};
use crate::state::AppState;
use crate::views::RoleView;

/// Build the screens router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/me", get(me))
        .route("/api/screens/{screen}", get(screen_access))
}

/// Who is signed in and what they may see.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub identity: Identity,
    pub view: RoleView,
    pub screens: Vec<ScreenDescriptor>,
}

/// GET /api/me
async fn me(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Json<MeResponse> {
    let screens = state
        .navigation()
        .visible_screens(identity.role())
        .into_iter()
        .cloned()
        .collect();

    Json(MeResponse {
        view: RoleView::for_role(identity.role()),
        screens,
        identity,
    })
}

/// GET /api/screens/{screen}
///
/// 200 with the descriptor when allowed, 403 otherwise.
async fn screen_access(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(screen): Path<String>,
) -> Result<Response, AppError> {
    let screen: Screen = screen.parse().map_err(AppError::NotFound)?;
    if let Err(rejection) = authorize_screen(&state, screen, &identity, true) {
        return Ok(rejection.into_response());
    }

    let descriptor = state
        .navigation()
        .descriptor(screen)
        .cloned()
        .ok_or_else(|| AppError::NotFound(screen.to_string()))?;
    Ok(Json(descriptor).into_response())
}

/// Page shell for one screen.
#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub screen: ScreenDescriptor,
    pub view: RoleView,
}

/// Fallback for every non-API path.
///
/// Paths owned by a screen render its shell; anonymous visitors go to the
/// login page and forbidden screens redirect to the dashboard.
pub async fn page(
    State(state): State<AppState>,
    OptionalIdentity(identity): OptionalIdentity,
    uri: Uri,
) -> Result<Response, AppError> {
    let path = uri.path();
    if path.starts_with("/api/") {
        return Err(AppError::NotFound(path.to_string()));
    }

    let screen = match path {
        "/" => Screen::Dashboard,
        _ => state
            .navigation()
            .screen_for_path(path)
            .ok_or_else(|| AppError::NotFound(path.to_string()))?,
    };

    let Some(identity) = identity else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };
    if let Err(rejection) = authorize_screen(&state, screen, &identity, false) {
        return Ok(rejection.into_response());
    }

    let descriptor = state
        .navigation()
        .descriptor(screen)
        .cloned()
        .ok_or_else(|| AppError::NotFound(path.to_string()))?;

    Ok(Json(PageResponse {
        screen: descriptor,
        view: RoleView::for_role(identity.role()),
    })
    .into_response())
}
