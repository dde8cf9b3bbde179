//! Dashboard route handler.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use crate::catalog::DashboardSummary;
use crate::middleware::auth::{RequireIdentity, authorize_screen};
use crate::navigation::Screen;
use crate::state::AppState;
use crate::views::RoleView;

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard", get(dashboard))
}

/// Role view plus the numbers behind it.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub view: RoleView,
    pub summary: DashboardSummary,
}

/// GET /api/dashboard
#[instrument(skip_all)]
async fn dashboard(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> impl IntoResponse {
    if let Err(rejection) = authorize_screen(&state, Screen::Dashboard, &identity, true) {
        return rejection.into_response();
    }

    Json(DashboardResponse {
        view: RoleView::for_role(identity.role()),
        summary: DashboardSummary::for_identity(state.catalog(), &identity, Utc::now()),
    })
    .into_response()
}
