//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use urbanplan_core::Identity;

/// Version written into every persisted identity record.
pub const SCHEMA_VERSION: u32 = 1;

/// Persisted form of the current identity.
///
/// Records with any other `schema_version` are treated as corrupt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedIdentity {
    pub schema_version: u32,
    pub identity: Identity,
}

impl PersistedIdentity {
    /// Wrap an identity at the current schema version.
    #[must_use]
    pub const fn current(identity: Identity) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            identity,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for the persisted current identity.
    pub const CURRENT_IDENTITY: &str = "urbanplan_user";

    /// Key for the id of the browser session's analysis workflow.
    pub const WORKFLOW_ID: &str = "urbanplan_workflow";
}
