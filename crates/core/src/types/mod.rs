//! Core types for UrbanPlan.
//!
//! This module provides type-safe wrappers for the platform's domain concepts.

pub mod analysis;
pub mod document;
pub mod email;
pub mod id;
pub mod identity;
pub mod role;
pub mod status;

pub use analysis::{AnalysisResult, ComplianceScore, Finding, FindingSeverity, ScoreError};
pub use document::{DocumentCategory, DocumentStatus, RequiredDocument};
pub use email::{Email, EmailError};
pub use id::*;
pub use identity::Identity;
pub use role::{Role, RoleParseError};
pub use status::*;
