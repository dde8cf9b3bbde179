//! Demo accounts and the stand-in authenticator.

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use urbanplan_core::{Email, EmailError, Identity, IdentityId, OrganizationId, Role};

use super::error::AuthError;
use super::{Authenticator, Credential};

/// Organization of the demo secretariat.
pub const DEMO_ORGANIZATION: &str = "emp-1";

/// The demo account for `role`.
///
/// # Errors
///
/// Returns `EmailError` if a demo address does not parse, which only a
/// broken build can cause.
pub fn demo_identity(role: Role, now: DateTime<Utc>) -> Result<Identity, EmailError> {
    let (id, email, name, organization) = match role {
        Role::PlatformOperator => (1, "master@urbanplan.gov", "Admin Master", None),
        Role::Administrator => (
            2,
            "secretario@florianopolis.gov",
            "João Silva",
            Some(DEMO_ORGANIZATION),
        ),
        Role::Analyst => (
            3,
            "analista@florianopolis.gov",
            "Maria Santos",
            Some(DEMO_ORGANIZATION),
        ),
    };

    Ok(Identity::issue(
        IdentityId::new(id),
        Email::parse(email)?,
        name,
        role,
        organization.map(OrganizationId::new),
        now,
    ))
}

/// Accepts any non-empty credential and signs in as the demo analyst.
///
/// Waits `latency` first, like a remote call would.
#[derive(Debug, Clone)]
pub struct DemoAuthenticator {
    latency: Duration,
}

impl DemoAuthenticator {
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Authenticator for DemoAuthenticator {
    #[instrument(skip(self, credential))]
    async fn authenticate(&self, credential: &Credential) -> Result<Identity, AuthError> {
        tokio::time::sleep(self.latency).await;

        if credential.password.expose_secret().trim().is_empty() {
            return Err(AuthError::InvalidCredential);
        }

        let analyst = demo_identity(Role::Analyst, Utc::now())?;
        match Email::parse(&credential.email) {
            Ok(email) => Ok(Identity::issue(
                analyst.id(),
                email,
                analyst.name(),
                analyst.role(),
                analyst.organization().cloned(),
                analyst.created_at(),
            )),
            Err(e) => {
                debug!(error = %e, "Login name is not an email, using the demo address");
                Ok(analyst)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_identities() {
        let now = Utc::now();
        let operator = demo_identity(Role::PlatformOperator, now).unwrap();
        assert_eq!(operator.email().as_str(), "master@urbanplan.gov");
        assert!(operator.organization().is_none());

        let admin = demo_identity(Role::Administrator, now).unwrap();
        assert_eq!(admin.name(), "João Silva");
        assert_eq!(admin.organization().unwrap().as_str(), "emp-1");

        let analyst = demo_identity(Role::Analyst, now).unwrap();
        assert_eq!(analyst.id(), IdentityId::new(3));
        assert_eq!(analyst.role(), Role::Analyst);
    }

    #[tokio::test(start_paused = true)]
    async fn test_authenticator_waits_and_keys_to_email() {
        let authenticator = DemoAuthenticator::new(Duration::from_secs(1));
        let started = tokio::time::Instant::now();
        let identity = authenticator
            .authenticate(&Credential::new("Fiscal@Joinville.gov", "pw"))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(identity.email().as_str(), "fiscal@joinville.gov");
        assert_eq!(identity.role(), Role::Analyst);

        let identity = authenticator
            .authenticate(&Credential::new("maria", "pw"))
            .await
            .unwrap();
        assert_eq!(identity.email().as_str(), "analista@florianopolis.gov");
    }
}
