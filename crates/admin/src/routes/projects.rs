//! Project list with search, status filter and counts.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use urbanplan_core::ProjectStatus;

use crate::catalog::{ProjectQuery, StatusCounts};
use crate::error::AppError;
use crate::middleware::auth::{RequireIdentity, authorize_screen};
use crate::models::Project;
use crate::navigation::Screen;
use crate::state::AppState;

/// Build the projects router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/projects", get(list))
}

/// Query string of the project list.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    /// A status tag, or `all`.
    pub status: Option<String>,
}

impl ListParams {
    fn into_query(self) -> Result<ProjectQuery, AppError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("" | "all") => None,
            Some(tag) => Some(tag.parse::<ProjectStatus>().map_err(AppError::BadRequest)?),
        };
        Ok(ProjectQuery {
            search: self.search,
            status,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub projects: Vec<Project>,
    pub counts: StatusCounts,
}

/// GET /api/projects?search=&status=
async fn list(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    if let Err(rejection) = authorize_screen(&state, Screen::Projects, &identity, true) {
        return Ok(rejection.into_response());
    }

    let query = params.into_query()?;
    let visible = state.catalog().projects_for(&identity);
    let projects = query.apply(&visible).into_iter().cloned().collect();

    Ok(Json(ListResponse {
        projects,
        counts: StatusCounts::of(&visible),
    })
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_param() {
        let all = ListParams {
            search: None,
            status: Some("all".to_string()),
        };
        assert_eq!(all.into_query().unwrap().status, None);

        let legacy = ListParams {
            search: None,
            status: Some("em_analise".to_string()),
        };
        assert_eq!(legacy.into_query().unwrap().status, Some(ProjectStatus::InReview));

        let bogus = ListParams {
            search: None,
            status: Some("archived".to_string()),
        };
        assert!(matches!(bogus.into_query(), Err(AppError::BadRequest(_))));
    }
}
