//! CLI command implementations.

pub mod analyze;
pub mod screens;
pub mod session;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use urbanplan_admin::config::{AdminConfig, ConfigError};
use urbanplan_admin::navigation::{NavigationRegistry, UnauthorizedAccess};
use urbanplan_admin::services::auth::{
    AuthError, DemoAuthenticator, FileIdentityStore, SessionAuthority,
};
use urbanplan_admin::workflow::WorkflowError;

/// Overrides the identity file location.
pub const IDENTITY_FILE_ENV: &str = "URBANPLAN_IDENTITY_FILE";

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Denied(#[from] UnauthorizedAccess),

    /// Nobody is signed in.
    #[error("Not signed in. Run `up-cli session login` first.")]
    NotSignedIn,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No identity file override and no home directory.
    #[error("Cannot locate the identity file: set {IDENTITY_FILE_ENV}")]
    NoHomeDir,
}

/// Authority over the identity persisted on disk.
pub type CliAuthority = SessionAuthority<FileIdentityStore, DemoAuthenticator>;

/// Location of the persisted identity.
///
/// # Errors
///
/// Returns `CliError::NoHomeDir` if neither the override nor a home
/// directory is available.
pub fn identity_file() -> Result<PathBuf, CliError> {
    if let Some(path) = std::env::var_os(IDENTITY_FILE_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(".urbanplan").join("identity.json"))
        .ok_or(CliError::NoHomeDir)
}

/// Load configuration and build the authority over the identity file.
///
/// # Errors
///
/// Returns `CliError` if the configuration does not parse or the identity
/// file cannot be located.
pub fn authority() -> Result<(AdminConfig, CliAuthority), CliError> {
    let config = AdminConfig::from_env()?;
    let path = identity_file()?;
    tracing::debug!(path = %path.display(), "Using identity file");

    let authority = SessionAuthority::new(
        FileIdentityStore::new(path),
        Arc::new(DemoAuthenticator::new(config.login_latency)),
        Arc::new(NavigationRegistry::reference()),
    );
    Ok((config, authority))
}
