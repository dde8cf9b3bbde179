//! Transition notifications.

use core::fmt;

use serde::Serialize;

use super::session::{Stage, WorkflowSession};

/// What caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    SetProject,
    AddDocument,
    UploadDocument,
    RetryDocument,
    RemoveDocument,
    Submit,
    /// The analysis service returned a result.
    Complete,
    /// The analysis service failed.
    Fail,
    Cancel,
    GoBack,
    Finish,
    Restart,
}

impl WorkflowAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SetProject => "set_project",
            Self::AddDocument => "add_document",
            Self::UploadDocument => "upload_document",
            Self::RetryDocument => "retry_document",
            Self::RemoveDocument => "remove_document",
            Self::Submit => "submit",
            Self::Complete => "complete",
            Self::Fail => "fail",
            Self::Cancel => "cancel",
            Self::GoBack => "go_back",
            Self::Finish => "finish",
            Self::Restart => "restart",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted after every applied change, with the session as it now stands.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowEvent {
    pub action: WorkflowAction,
    pub from: Stage,
    pub to: Stage,
    pub generation: u64,
    pub session: WorkflowSession,
}
