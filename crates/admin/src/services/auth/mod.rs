//! Session/role authority.
//!
//! Owns the current [`Identity`] of one session slot, persists it through an
//! [`IdentityStore`], and answers access-control questions against the
//! [`NavigationRegistry`].
//!
//! Access checks take the identity as an explicit argument; the authority
//! never consults ambient state to decide them.

mod demo;
mod error;
mod store;

pub use demo::{DEMO_ORGANIZATION, DemoAuthenticator, demo_identity};
pub use error::{AuthError, CorruptPersistedState, StoreError};
pub use store::{FileIdentityStore, IdentityStore, MemoryIdentityStore, SessionIdentityStore};

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use urbanplan_core::{Identity, Role};

use crate::config::AdminConfig;
use crate::models::session::{PersistedIdentity, SCHEMA_VERSION};
use crate::navigation::{NavigationRegistry, Screen};

/// Email and password as typed by the user.
#[derive(Clone)]
pub struct Credential {
    pub email: String,
    pub password: SecretString,
}

impl Credential {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Proof that role switching is allowed.
///
/// Only [`DevCapability::from_config`] creates one, and only with demo mode
/// enabled.
#[derive(Debug, Clone, Copy)]
pub struct DevCapability {
    _private: (),
}

impl DevCapability {
    #[must_use]
    pub const fn from_config(config: &AdminConfig) -> Option<Self> {
        if config.demo_mode {
            Some(Self { _private: () })
        } else {
            None
        }
    }
}

/// Resolves a credential to an identity.
pub trait Authenticator: Send + Sync + 'static {
    /// Check the credential and issue the identity it belongs to.
    fn authenticate(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;
}

/// Authority over one identity slot.
pub struct SessionAuthority<S, A> {
    slot: Mutex<Option<Identity>>,
    store: S,
    authenticator: Arc<A>,
    navigation: Arc<NavigationRegistry>,
}

impl<S: IdentityStore, A: Authenticator> SessionAuthority<S, A> {
    /// Create an authority with an empty slot. Call
    /// [`Self::restore_session`] to pick up a persisted identity.
    #[must_use]
    pub fn new(store: S, authenticator: Arc<A>, navigation: Arc<NavigationRegistry>) -> Self {
        Self {
            slot: Mutex::new(None),
            store,
            authenticator,
            navigation,
        }
    }

    /// The identity currently in the slot.
    pub async fn current(&self) -> Option<Identity> {
        self.slot.lock().await.clone()
    }

    /// Sign in.
    ///
    /// Calls are serialized on the slot; the last one to finish wins.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredential` if the trimmed email or
    /// password is empty or the authenticator refuses the credential.
    /// Returns `AuthError::Store` if the identity cannot be persisted; the
    /// slot is left unchanged in that case.
    #[instrument(skip(self, credential), fields(email = %credential.email.trim()))]
    pub async fn authenticate(&self, credential: Credential) -> Result<Identity, AuthError> {
        let mut slot = self.slot.lock().await;

        if credential.email.trim().is_empty()
            || credential.password.expose_secret().trim().is_empty()
        {
            warn!("Rejected login with empty email or password");
            return Err(AuthError::InvalidCredential);
        }

        let identity = self.authenticator.authenticate(&credential).await?;
        self.persist(&identity).await?;
        *slot = Some(identity.clone());

        info!(id = %identity.id(), role = %identity.role(), "Signed in");
        Ok(identity)
    }

    /// Switch to the demo account of `role`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the identity cannot be persisted.
    #[instrument(skip(self, _capability))]
    pub async fn assume_role(
        &self,
        role: Role,
        _capability: DevCapability,
    ) -> Result<Identity, AuthError> {
        let mut slot = self.slot.lock().await;
        let identity = demo_identity(role, Utc::now())?;
        self.persist(&identity).await?;
        *slot = Some(identity.clone());

        info!(id = %identity.id(), "Switched to demo role");
        Ok(identity)
    }

    /// Sign out. Signing out twice is the same as once.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the persisted record cannot be removed.
    /// The slot is cleared regardless.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let mut slot = self.slot.lock().await;
        if let Some(identity) = slot.take() {
            info!(id = %identity.id(), "Signed out");
        }
        self.store.clear().await?;
        Ok(())
    }

    /// Whether `identity` may open `screen`.
    #[must_use]
    pub fn can_access(&self, screen: Screen, identity: Option<&Identity>) -> bool {
        self.navigation.can_access(screen, identity)
    }

    /// Load the persisted identity into the slot.
    ///
    /// A missing, unreadable or corrupt record yields `None`. Corrupt
    /// records are logged and deleted, never surfaced.
    #[instrument(skip(self))]
    pub async fn restore_session(&self) -> Option<Identity> {
        let mut slot = self.slot.lock().await;

        let record = match self.store.read().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                *slot = None;
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Could not read persisted identity");
                *slot = None;
                return None;
            }
        };

        match decode(&record) {
            Ok(identity) => {
                *slot = Some(identity.clone());
                Some(identity)
            }
            Err(e) => {
                warn!(error = %e, "Discarding corrupt persisted identity");
                if let Err(e) = self.store.clear().await {
                    warn!(error = %e, "Could not clear corrupt persisted identity");
                }
                *slot = None;
                None
            }
        }
    }

    async fn persist(&self, identity: &Identity) -> Result<(), AuthError> {
        let record = serde_json::to_string(&PersistedIdentity::current(identity.clone()))
            .map_err(|e| AuthError::Store(StoreError::Io(std::io::Error::other(e))))?;
        self.store.write(record).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct VersionHeader {
    schema_version: u32,
}

/// Decode a persisted record, checking the schema version first.
///
/// # Errors
///
/// Returns `CorruptPersistedState` for malformed JSON, a missing or unknown
/// version, or an identity that does not deserialize.
pub fn decode(record: &str) -> Result<Identity, CorruptPersistedState> {
    let header: VersionHeader = serde_json::from_str(record)?;
    if header.schema_version != SCHEMA_VERSION {
        return Err(CorruptPersistedState::UnknownVersion(header.schema_version));
    }
    let persisted: PersistedIdentity = serde_json::from_str(record)?;
    Ok(persisted.identity)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    type Authority = SessionAuthority<MemoryIdentityStore, DemoAuthenticator>;

    fn authority(store: MemoryIdentityStore) -> Authority {
        SessionAuthority::new(
            store,
            Arc::new(DemoAuthenticator::new(Duration::from_secs(1))),
            Arc::new(NavigationRegistry::reference()),
        )
    }

    fn dev() -> DevCapability {
        DevCapability::from_config(&AdminConfig {
            demo_mode: true,
            ..AdminConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_capability_requires_demo_mode() {
        assert!(DevCapability::from_config(&AdminConfig::default()).is_none());
    }

    #[test]
    fn test_credential_debug_redacts_password() {
        let output = format!("{:?}", Credential::new("a@b.gov", "hunter2"));
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("hunter2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_authenticate_rejects_blank_fields() {
        let authority = authority(MemoryIdentityStore::new());
        for (email, password) in [("", "pw"), ("   ", "pw"), ("a@b.gov", ""), ("a@b.gov", "  ")] {
            assert!(matches!(
                authority.authenticate(Credential::new(email, password)).await,
                Err(AuthError::InvalidCredential)
            ));
        }
        assert!(authority.current().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_authenticate_persists_and_restores() {
        let store = MemoryIdentityStore::new();
        let first = authority(store.clone());
        let identity = first
            .authenticate(Credential::new("analista@florianopolis.gov", "secret"))
            .await
            .unwrap();
        assert_eq!(identity.role(), Role::Analyst);
        assert_eq!(first.current().await, Some(identity.clone()));

        let record = store.read().await.unwrap().unwrap();
        assert!(record.contains("\"schema_version\":1"));

        let second = authority(store);
        assert_eq!(second.restore_session().await, Some(identity));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_then_restore_is_none() {
        let store = MemoryIdentityStore::new();
        let authority = authority(store.clone());
        authority.assume_role(Role::Administrator, dev()).await.unwrap();

        authority.sign_out().await.unwrap();
        assert!(authority.restore_session().await.is_none());

        authority.sign_out().await.unwrap();
        assert!(authority.current().await.is_none());
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_assume_role_issues_demo_account() {
        let authority = authority(MemoryIdentityStore::new());
        let identity = authority
            .assume_role(Role::PlatformOperator, dev())
            .await
            .unwrap();
        assert_eq!(identity.email().as_str(), "master@urbanplan.gov");
        assert!(authority.can_access(Screen::Municipalities, Some(&identity)));
        assert!(!authority.can_access(Screen::Projects, Some(&identity)));
        assert!(!authority.can_access(Screen::Dashboard, None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_corrupt_record_restores_to_none_and_is_cleared() {
        for record in [
            "not json",
            "{\"schema_version\":1}",
            "{\"id\":\"3\",\"email\":\"analista@florianopolis.gov\",\"role\":\"user\"}",
        ] {
            let store = MemoryIdentityStore::new();
            store.write(record.to_string()).await.unwrap();
            let authority = authority(store.clone());
            assert!(authority.restore_session().await.is_none(), "{record}");
            assert!(store.read().await.unwrap().is_none());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_version_is_corrupt() {
        let identity = demo_identity(Role::Analyst, Utc::now()).unwrap();
        let record = serde_json::json!({ "schema_version": 2, "identity": identity }).to_string();
        assert!(matches!(
            decode(&record),
            Err(CorruptPersistedState::UnknownVersion(2))
        ));

        let store = MemoryIdentityStore::new();
        store.write(record).await.unwrap();
        assert!(authority(store).restore_session().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_legacy_role_tag_is_accepted() {
        let record = serde_json::json!({
            "schema_version": 1,
            "identity": {
                "id": 2,
                "email": "secretario@florianopolis.gov",
                "name": "João Silva",
                "role": "admin",
                "organization": "emp-1",
                "created_at": "2024-03-01T12:00:00Z"
            }
        })
        .to_string();
        let identity = decode(&record).unwrap();
        assert_eq!(identity.role(), Role::Administrator);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_logins_are_serialized() {
        let authority = Arc::new(authority(MemoryIdentityStore::new()));
        let a = {
            let authority = Arc::clone(&authority);
            tokio::spawn(async move {
                authority
                    .authenticate(Credential::new("one@florianopolis.gov", "pw"))
                    .await
            })
        };
        let b = {
            let authority = Arc::clone(&authority);
            tokio::spawn(async move {
                authority
                    .authenticate(Credential::new("two@florianopolis.gov", "pw"))
                    .await
            })
        };
        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();

        let current = authority.current().await.unwrap();
        assert!(current == a || current == b);
        let restored = authority.restore_session().await.unwrap();
        assert_eq!(restored, current);
    }
}
