//! Workflow session state and its pure transitions.
//!
//! Nothing here is async or shared. [`super::AnalysisWorkflow`] wraps a
//! [`WorkflowSession`] in a mutex and drives the analysis service; every
//! guard lives on this type so it can be tested without a runtime.

use core::fmt;

use serde::Serialize;

use urbanplan_core::{AnalysisResult, DocumentCategory, DocumentId, DocumentStatus};

use super::error::{Field, WorkflowError};
use super::events::WorkflowAction;
use super::policy::SubmissionPolicy;

/// Size reported for documents added without content.
pub const STUB_DOCUMENT_SIZE: u64 = 2_400_000;

/// Stage of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Collecting,
    Processing,
    Reviewing,
    Done,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Processing => "processing",
            Self::Reviewing => "reviewing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One document record in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedDocument {
    pub id: DocumentId,
    pub category: DocumentCategory,
    pub name: String,
    pub size_bytes: u64,
    pub status: DocumentStatus,
    /// Key assigned by the document store, once stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
    /// Why the last upload attempt failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadedDocument {
    /// A record that is considered uploaded as soon as it exists.
    #[must_use]
    pub fn instant(category: DocumentCategory) -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        Self {
            id: DocumentId::generate(),
            category,
            name: format!("{category}_{millis}.pdf"),
            size_bytes: STUB_DOCUMENT_SIZE,
            status: DocumentStatus::Uploaded,
            storage_key: None,
            error: None,
        }
    }

    /// A record waiting for the document store.
    #[must_use]
    pub fn pending(category: DocumentCategory, name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id: DocumentId::generate(),
            category,
            name: name.into(),
            size_bytes,
            status: DocumentStatus::Pending,
            storage_key: None,
            error: None,
        }
    }
}

/// How an analysis resolution was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The session moved to the given stage.
    Applied(Stage),
    /// The resolution belonged to an older generation and was dropped.
    Stale,
}

/// Working state of one project submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct WorkflowSession {
    stage: Stage,
    protocol: String,
    address: String,
    documents: Vec<UploadedDocument>,
    result: Option<AnalysisResult>,
    last_failure: Option<String>,
    generation: u64,
}

impl WorkflowSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Document records in intake order.
    #[must_use]
    pub fn documents(&self) -> &[UploadedDocument] {
        &self.documents
    }

    #[must_use]
    pub fn document(&self, id: DocumentId) -> Option<&UploadedDocument> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    #[must_use]
    pub const fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Reason of the most recent analysis failure, cleared on the next submit.
    #[must_use]
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Documents that would be sent to the analysis service.
    #[must_use]
    pub fn stored_documents(&self) -> Vec<UploadedDocument> {
        self.documents
            .iter()
            .filter(|doc| doc.status.is_stored())
            .cloned()
            .collect()
    }

    /// Fails unless metadata and documents may be edited.
    ///
    /// # Errors
    ///
    /// `AnalysisInProgress` while processing, `InvalidTransition` outside
    /// the collecting stage.
    pub fn ensure_editable(&self, action: WorkflowAction) -> Result<(), WorkflowError> {
        match self.stage {
            Stage::Collecting => Ok(()),
            Stage::Processing => Err(WorkflowError::AnalysisInProgress),
            from @ (Stage::Reviewing | Stage::Done) => {
                Err(WorkflowError::InvalidTransition { from, action })
            }
        }
    }

    /// Replace protocol and address.
    ///
    /// # Errors
    ///
    /// See [`Self::ensure_editable`].
    pub fn set_project(&mut self, protocol: &str, address: &str) -> Result<(), WorkflowError> {
        self.ensure_editable(WorkflowAction::SetProject)?;
        self.protocol = protocol.trim().to_string();
        self.address = address.trim().to_string();
        Ok(())
    }

    /// Append a record.
    ///
    /// A category holds at most `required_count()` records. Once a stored
    /// record pushes its category over that, the oldest other record of the
    /// category is evicted and returned, errored ones first. Pending records
    /// evict nothing until [`Self::settle_upload`] stores them, so a failed
    /// upload never costs a stored document.
    ///
    /// # Errors
    ///
    /// See [`Self::ensure_editable`].
    pub fn intake(
        &mut self,
        document: UploadedDocument,
        action: WorkflowAction,
    ) -> Result<Vec<UploadedDocument>, WorkflowError> {
        self.ensure_editable(action)?;

        let (id, category, stored) = (document.id, document.category, document.status.is_stored());
        self.documents.push(document);
        Ok(if stored {
            self.make_room(id, category)
        } else {
            Vec::new()
        })
    }

    fn make_room(&mut self, keep: DocumentId, category: DocumentCategory) -> Vec<UploadedDocument> {
        let capacity = category.required_count();
        let mut evicted = Vec::new();

        while self
            .documents
            .iter()
            .filter(|doc| doc.category == category)
            .count()
            > capacity
        {
            let others = |doc: &UploadedDocument| doc.category == category && doc.id != keep;
            let oldest = self
                .documents
                .iter()
                .position(|doc| others(doc) && !doc.status.is_stored())
                .or_else(|| self.documents.iter().position(others));
            let Some(oldest) = oldest else { break };
            evicted.push(self.documents.remove(oldest));
        }
        evicted
    }

    /// Remove a record.
    ///
    /// # Errors
    ///
    /// See [`Self::ensure_editable`]; `DocumentNotFound` for unknown ids.
    pub fn remove_document(&mut self, id: DocumentId) -> Result<UploadedDocument, WorkflowError> {
        self.ensure_editable(WorkflowAction::RemoveDocument)?;
        let index = self
            .documents
            .iter()
            .position(|doc| doc.id == id)
            .ok_or(WorkflowError::DocumentNotFound(id))?;
        Ok(self.documents.remove(index))
    }

    /// Put an errored record back to pending before a retry.
    ///
    /// # Errors
    ///
    /// See [`Self::ensure_editable`]; `DocumentNotFound` for unknown ids,
    /// `DocumentNotRetryable` unless the record is in the error state.
    pub fn begin_retry(&mut self, id: DocumentId) -> Result<(), WorkflowError> {
        self.ensure_editable(WorkflowAction::RetryDocument)?;
        let doc = self
            .documents
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or(WorkflowError::DocumentNotFound(id))?;
        if doc.status != DocumentStatus::Error {
            return Err(WorkflowError::DocumentNotRetryable(id));
        }
        doc.status = DocumentStatus::Pending;
        doc.error = None;
        Ok(())
    }

    /// Record the outcome of a store call on a pending record.
    ///
    /// Returns the records evicted to make room for it, or `None` if the
    /// record no longer exists. A failed store evicts nothing.
    pub fn settle_upload(
        &mut self,
        id: DocumentId,
        outcome: Result<(String, u64), String>,
    ) -> Option<Vec<UploadedDocument>> {
        let doc = self.documents.iter_mut().find(|doc| doc.id == id)?;
        match outcome {
            Ok((key, size)) => {
                doc.status = DocumentStatus::Uploaded;
                doc.storage_key = Some(key);
                doc.size_bytes = size;
                doc.error = None;
                let category = doc.category;
                Some(self.make_room(id, category))
            }
            Err(reason) => {
                doc.status = DocumentStatus::Error;
                doc.error = Some(reason);
                Some(Vec::new())
            }
        }
    }

    /// `Collecting -> Processing`.
    ///
    /// Returns the new generation, which the analysis resolution must carry.
    ///
    /// # Errors
    ///
    /// `AnalysisInProgress` while processing, `InvalidTransition` from
    /// reviewing or done, `ValidationFailed` when protocol, address or the
    /// submission policy is not satisfied.
    pub fn begin_submit(&mut self, policy: &SubmissionPolicy) -> Result<u64, WorkflowError> {
        self.ensure_editable(WorkflowAction::Submit)?;

        if self.protocol.trim().is_empty() {
            return Err(WorkflowError::ValidationFailed {
                field: Field::Protocol,
            });
        }
        if self.address.trim().is_empty() {
            return Err(WorkflowError::ValidationFailed {
                field: Field::Address,
            });
        }
        if !policy.is_satisfied_by(&self.documents) {
            return Err(WorkflowError::ValidationFailed {
                field: Field::Documents,
            });
        }

        self.generation += 1;
        self.stage = Stage::Processing;
        self.result = None;
        self.last_failure = None;
        Ok(self.generation)
    }

    /// Apply an analysis resolution.
    ///
    /// Anything not matching the current generation while processing is
    /// stale and leaves the session untouched.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<AnalysisResult, String>,
    ) -> Resolution {
        if generation != self.generation || self.stage != Stage::Processing {
            return Resolution::Stale;
        }

        match outcome {
            Ok(result) => {
                for doc in &mut self.documents {
                    if doc.status == DocumentStatus::Uploaded {
                        doc.status = DocumentStatus::Analyzed;
                    }
                }
                self.result = Some(result);
                self.stage = Stage::Reviewing;
            }
            Err(reason) => {
                self.last_failure = Some(reason);
                self.stage = Stage::Collecting;
            }
        }
        Resolution::Applied(self.stage)
    }

    /// `Processing -> Collecting`, abandoning the outstanding analysis.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless processing.
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        if !matches!(self.stage, Stage::Processing) {
            return Err(WorkflowError::InvalidTransition {
                from: self.stage,
                action: WorkflowAction::Cancel,
            });
        }
        self.generation += 1;
        self.stage = Stage::Collecting;
        Ok(())
    }

    /// `Reviewing -> Collecting`, discarding the result.
    ///
    /// # Errors
    ///
    /// `AnalysisInProgress` while processing, `InvalidTransition` from any
    /// other stage but reviewing.
    pub fn go_back(&mut self) -> Result<(), WorkflowError> {
        match self.stage {
            Stage::Reviewing => {
                self.result = None;
                self.stage = Stage::Collecting;
                Ok(())
            }
            Stage::Processing => Err(WorkflowError::AnalysisInProgress),
            from @ (Stage::Collecting | Stage::Done) => Err(WorkflowError::InvalidTransition {
                from,
                action: WorkflowAction::GoBack,
            }),
        }
    }

    /// `Reviewing -> Done`.
    ///
    /// # Errors
    ///
    /// `AnalysisInProgress` while processing, `InvalidTransition` from any
    /// other stage but reviewing or when no result is present.
    pub fn finish(&mut self) -> Result<(), WorkflowError> {
        match self.stage {
            Stage::Reviewing if self.result.is_some() => {
                self.stage = Stage::Done;
                Ok(())
            }
            Stage::Processing => Err(WorkflowError::AnalysisInProgress),
            from => Err(WorkflowError::InvalidTransition {
                from,
                action: WorkflowAction::Finish,
            }),
        }
    }

    /// Back to an empty collecting session. Allowed from every stage.
    ///
    /// Returns the records that were dropped.
    pub fn restart(&mut self) -> Vec<UploadedDocument> {
        let dropped = std::mem::take(&mut self.documents);
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
        dropped
    }
}
