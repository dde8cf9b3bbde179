//! HTTP middleware for the dashboard.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Security headers
//! 4. Session layer (tower-sessions, in-memory store)
//!
//! Authentication is done per handler with the extractors in [`auth`].

pub mod auth;
pub mod session;

pub use auth::{
    IdentityRejection, OptionalIdentity, RequireIdentity, ScreenRejection, authorize_screen,
};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
