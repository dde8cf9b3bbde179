//! Services behind the dashboard.
//!
//! # Services
//!
//! - `analysis` - Compliance analysis collaborator (scripted stand-in)
//! - `auth` - Session/role authority, authenticators and identity stores
//! - `documents` - Storage for uploaded project documents

pub mod analysis;
pub mod auth;
pub mod documents;

pub use analysis::{AnalysisError, AnalysisRequest, AnalysisService, ScriptedAnalysisService};
pub use auth::{AuthError, Authenticator, Credential, DevCapability, SessionAuthority};
pub use documents::{DocumentStore, MemoryDocumentStore, StorageError, StoredDocument};
