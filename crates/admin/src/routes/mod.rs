//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Health check
//!
//! # Auth
//! GET    /auth/login                    - Login screen data
//! POST   /auth/login                    - Email/password login
//! POST   /auth/logout                   - Logout
//! POST   /auth/demo/{role}              - Switch demo role (demo mode only)
//!
//! # Identity and screens
//! GET    /api/me                        - Identity, role view, visible screens
//! GET    /api/screens/{screen}          - Access decision for a screen
//!
//! # Catalog
//! GET    /api/dashboard                 - Role-specific summary
//! GET    /api/projects?search&status    - Project list and status counts
//! GET    /api/calendar?year&month       - Month grid with tasks per day
//! GET    /api/calendar/{date}           - Tasks due on a date
//!
//! # Analysis workflow
//! GET    /api/analysis                  - Snapshot
//! POST   /api/analysis                  - Start over
//! PUT    /api/analysis/project          - Protocol and address
//! POST   /api/analysis/documents        - Add a document (instant upload)
//! POST   /api/analysis/uploads          - Upload document bytes
//! POST   /api/analysis/documents/{id}/retry - Retry a failed upload
//! DELETE /api/analysis/documents/{id}   - Remove a document
//! POST   /api/analysis/submit           - Submit for analysis
//! POST   /api/analysis/cancel           - Abandon the running analysis
//! POST   /api/analysis/back             - Back to collecting
//! POST   /api/analysis/finish           - Conclude
//! POST   /api/analysis/restart          - Start over
//! GET    /api/analysis/settled          - Wait for the running analysis
//! GET    /api/analysis/events           - Workflow events (SSE)
//!
//! # Pages
//! GET    /{screen path}                 - Page shell, guarded per screen
//! ```

pub mod analysis;
pub mod auth;
pub mod calendar;
pub mod dashboard;
pub mod projects;
pub mod screens;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build every route except `/health`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(screens::router())
        .merge(dashboard::router())
        .merge(projects::router())
        .merge(calendar::router())
        .merge(analysis::router())
        .fallback(get(screens::page))
}
