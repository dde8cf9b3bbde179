//! Session commands: login, demo role switch, whoami, logout.
//!
//! # Usage
//!
//! ```bash
//! up-cli session login -e analista@florianopolis.gov -p secret
//! up-cli session demo platform_operator
//! up-cli session whoami
//! up-cli session logout
//! ```

use urbanplan_admin::services::auth::{AuthError, Credential, DevCapability};
use urbanplan_core::{Identity, Role};

use super::{CliError, authority};

fn describe(identity: &Identity) {
    tracing::info!("Signed in as {} <{}>", identity.name(), identity.email());
    tracing::info!("  Role: {} ({})", identity.role().label(), identity.role());
    if let Some(organization) = identity.organization() {
        tracing::info!("  Organization: {}", organization);
    }
}

/// Sign in with email and password.
///
/// # Errors
///
/// Returns `CliError::Auth` if the credential is rejected or the identity
/// cannot be saved.
pub async fn login(email: &str, password: String) -> Result<Identity, CliError> {
    let (_, authority) = authority()?;
    let identity = authority
        .authenticate(Credential::new(email, password))
        .await?;
    describe(&identity);
    Ok(identity)
}

/// Switch to the demo account of `role`.
///
/// # Errors
///
/// Returns `CliError::Auth(AuthError::DevModeDisabled)` unless
/// `ADMIN_DEMO_MODE` is on, or `CliError::InvalidArgument` for an unknown
/// role.
pub async fn demo(role: &str) -> Result<Identity, CliError> {
    let (config, authority) = authority()?;
    let capability = DevCapability::from_config(&config).ok_or(AuthError::DevModeDisabled)?;
    let role: Role = role
        .parse()
        .map_err(|e: urbanplan_core::RoleParseError| CliError::InvalidArgument(e.to_string()))?;

    let identity = authority.assume_role(role, capability).await?;
    describe(&identity);
    Ok(identity)
}

/// Show the signed-in identity.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` if no usable identity is stored.
pub async fn whoami() -> Result<Identity, CliError> {
    let (_, authority) = authority()?;
    let identity = authority.restore_session().await.ok_or(CliError::NotSignedIn)?;
    describe(&identity);
    Ok(identity)
}

/// Sign out. Succeeds when nobody is signed in.
///
/// # Errors
///
/// Returns `CliError::Auth` if the identity file cannot be removed.
pub async fn logout() -> Result<(), CliError> {
    let (_, authority) = authority()?;
    authority.restore_session().await;
    authority.sign_out().await?;
    tracing::info!("Signed out");
    Ok(())
}
