//! Workflow error types.

use core::fmt;

use serde::Serialize;
use thiserror::Error;

use urbanplan_core::DocumentId;

use super::events::WorkflowAction;
use super::session::Stage;
use crate::services::documents::StorageError;

/// Input that failed a submission guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Protocol,
    Address,
    Documents,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Protocol => "protocol",
            Self::Address => "address",
            Self::Documents => "documents",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by workflow actions.
///
/// A rejected action never changes the session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// A submission guard failed.
    #[error("validation failed: {field} is missing or insufficient")]
    ValidationFailed { field: Field },

    /// An analysis request is outstanding.
    #[error("an analysis is already in progress")]
    AnalysisInProgress,

    /// The action is not defined for the current stage.
    #[error("cannot {action} while {from}")]
    InvalidTransition { from: Stage, action: WorkflowAction },

    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Only documents whose upload failed can be retried.
    #[error("document {0} is not in the error state")]
    DocumentNotRetryable(DocumentId),

    /// The analysis service reported a failure.
    #[error("analysis failed: {reason}")]
    AnalysisFailed { reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
