//! Screen access commands.
//!
//! # Usage
//!
//! ```bash
//! up-cli access new-analysis
//! up-cli screens list
//! up-cli screens validate
//! ```

use urbanplan_admin::navigation::{NavigationRegistry, Screen, UnauthorizedAccess};

use super::{CliError, authority};

/// Check whether the signed-in identity may open `screen`.
///
/// # Errors
///
/// Returns `CliError::Denied` when access is refused, `CliError::NotSignedIn`
/// without an identity, `CliError::InvalidArgument` for an unknown screen.
pub async fn access(screen: &str) -> Result<(), CliError> {
    let screen: Screen = screen.parse().map_err(CliError::InvalidArgument)?;
    let (_, authority) = authority()?;
    let identity = authority.restore_session().await.ok_or(CliError::NotSignedIn)?;

    if !authority.can_access(screen, Some(&identity)) {
        return Err(UnauthorizedAccess {
            screen,
            role: Some(identity.role()),
        }
        .into());
    }

    tracing::info!("{} may open {}", identity.role().label(), screen);
    Ok(())
}

/// List the screens the signed-in identity sees in the sidebar.
///
/// # Errors
///
/// Returns `CliError::NotSignedIn` without an identity.
pub async fn list() -> Result<(), CliError> {
    let (_, authority) = authority()?;
    let identity = authority.restore_session().await.ok_or(CliError::NotSignedIn)?;

    let registry = NavigationRegistry::reference();
    for descriptor in registry.visible_screens(identity.role()) {
        tracing::info!("{:<16} {:<16} {}", descriptor.screen, descriptor.path, descriptor.title);
    }
    Ok(())
}

/// Report screens no role can open.
///
/// # Errors
///
/// Returns `CliError::InvalidArgument` listing the unreachable screens.
pub fn validate() -> Result<(), CliError> {
    match NavigationRegistry::reference().validate() {
        Ok(()) => {
            tracing::info!("Navigation registry OK: every screen has a permitted role");
            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                tracing::error!("{error}");
            }
            Err(CliError::InvalidArgument(format!(
                "{} unreachable screen(s)",
                errors.len()
            )))
        }
    }
}
