//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during session/role operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password missing, or rejected by the authenticator.
    #[error("invalid credentials")]
    InvalidCredential,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] urbanplan_core::EmailError),

    /// Role switching requested while demo mode is off.
    #[error("demo mode is disabled")]
    DevModeDisabled,

    /// Reading or writing the persisted identity failed.
    #[error("identity store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from an identity store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// A persisted identity record that cannot be used.
///
/// Never leaves the authority: the record is logged, cleared and treated as
/// absent.
#[derive(Debug, Error)]
pub enum CorruptPersistedState {
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported schema version {0}")]
    UnknownVersion(u32),
}
