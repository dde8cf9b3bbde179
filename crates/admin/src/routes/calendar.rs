//! Calendar month grid and per-day task lists.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{MonthGrid, YearMonth, tasks_on};
use crate::error::AppError;
use crate::middleware::auth::{RequireIdentity, authorize_screen};
use crate::models::Task;
use crate::navigation::Screen;
use crate::state::AppState;

/// Build the calendar router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/calendar", get(month))
        .route("/api/calendar/{date}", get(day))
}

/// Month to show; missing parts default to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct MonthParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/calendar?year=&month=
async fn month(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Query(params): Query<MonthParams>,
) -> Result<Response, AppError> {
    if let Err(rejection) = authorize_screen(&state, Screen::Calendar, &identity, true) {
        return Ok(rejection.into_response());
    }

    let today = YearMonth::of(Utc::now().date_naive());
    let month = YearMonth::new(
        params.year.unwrap_or(today.year),
        params.month.unwrap_or(today.month),
    )?;
    let grid = MonthGrid::build(month, &state.catalog().tasks_for(&identity))?;

    Ok(Json(grid).into_response())
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
}

/// GET /api/calendar/{date}, with `date` as `YYYY-MM-DD`.
async fn day(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(date): Path<String>,
) -> Result<Response, AppError> {
    if let Err(rejection) = authorize_screen(&state, Screen::Calendar, &identity, true) {
        return Ok(rejection.into_response());
    }

    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|e| AppError::BadRequest(format!("invalid date '{date}': {e}")))?;
    let visible = state.catalog().tasks_for(&identity);
    let tasks = tasks_on(&visible, date).into_iter().cloned().collect();

    Ok(Json(DayResponse { date, tasks }).into_response())
}
