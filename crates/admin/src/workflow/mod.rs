//! Analysis workflow state machine.
//!
//! Drives one project submission through
//! `Collecting -> Processing -> Reviewing -> Done`.
//!
//! # Architecture
//!
//! - [`WorkflowSession`] holds the state and every guard. It is plain data.
//! - [`AnalysisWorkflow`] owns a session behind a `tokio::sync::Mutex`,
//!   runs the analysis call on a spawned task and publishes a
//!   [`WorkflowEvent`] after each applied change.
//!
//! The analysis call captures the session generation when it starts. A
//! resolution is applied only if the session is still processing that same
//! generation; `cancel` and `restart` bump the generation and abort the task,
//! so anything that resolves afterwards is dropped.

mod error;
mod events;
mod policy;
mod session;

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tokio::task::AbortHandle;
use tracing::{debug, info, instrument, warn};

use urbanplan_core::{AnalysisResult, DocumentCategory, DocumentId};

pub use error::{Field, WorkflowError};
pub use events::{WorkflowAction, WorkflowEvent};
pub use policy::{PolicyParseError, SubmissionPolicy};
pub use session::{Resolution, STUB_DOCUMENT_SIZE, Stage, UploadedDocument, WorkflowSession};

use crate::services::analysis::{AnalysisError, AnalysisRequest, AnalysisService};
use crate::services::documents::DocumentStore;

/// Capacity of the event channel. Slow subscribers skip ahead.
const EVENT_CAPACITY: usize = 64;

struct State {
    session: WorkflowSession,
    outstanding: Option<AbortHandle>,
}

struct Inner<A, D> {
    state: Mutex<State>,
    analysis: Arc<A>,
    documents: Arc<D>,
    policy: SubmissionPolicy,
    events: broadcast::Sender<WorkflowEvent>,
}

/// One analysis workflow, shared by cloning.
pub struct AnalysisWorkflow<A, D> {
    inner: Arc<Inner<A, D>>,
}

impl<A, D> Clone for AnalysisWorkflow<A, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: AnalysisService, D: DocumentStore> AnalysisWorkflow<A, D> {
    /// Create a workflow in the collecting stage.
    #[must_use]
    pub fn new(analysis: Arc<A>, documents: Arc<D>, policy: SubmissionPolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    session: WorkflowSession::new(),
                    outstanding: None,
                }),
                analysis,
                documents,
                policy,
                events,
            }),
        }
    }

    /// The policy checked on submit.
    #[must_use]
    pub fn policy(&self) -> SubmissionPolicy {
        self.inner.policy
    }

    /// Copy of the current session.
    pub async fn snapshot(&self) -> WorkflowSession {
        self.inner.state.lock().await.session.clone()
    }

    /// Receive an event for every change applied from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.inner.events.subscribe()
    }

    /// Set protocol and address.
    ///
    /// # Errors
    ///
    /// `AnalysisInProgress` while processing, `InvalidTransition` after
    /// the collecting stage.
    #[instrument(skip(self))]
    pub async fn set_project(
        &self,
        protocol: &str,
        address: &str,
    ) -> Result<WorkflowSession, WorkflowError> {
        let mut state = self.inner.state.lock().await;
        let from = state.session.stage();
        state.session.set_project(protocol, address)?;
        Ok(self.publish(&state, WorkflowAction::SetProject, from))
    }

    /// Add a document whose upload completes immediately.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_project`].
    #[instrument(skip(self))]
    pub async fn add_document(
        &self,
        category: DocumentCategory,
    ) -> Result<UploadedDocument, WorkflowError> {
        let mut state = self.inner.state.lock().await;
        let from = state.session.stage();
        let doc = UploadedDocument::instant(category);
        let evicted = state
            .session
            .intake(doc.clone(), WorkflowAction::AddDocument)?;
        self.publish(&state, WorkflowAction::AddDocument, from);
        self.release(&evicted).await;
        Ok(doc)
    }

    /// Upload a document through the document store.
    ///
    /// The record is added as pending first, then settles to uploaded or
    /// error. A failed record stays in the session and can be retried.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_project`], plus `Storage` when the store rejects
    /// the bytes.
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub async fn upload_document(
        &self,
        category: DocumentCategory,
        name: &str,
        content: Vec<u8>,
    ) -> Result<UploadedDocument, WorkflowError> {
        let mut state = self.inner.state.lock().await;
        let from = state.session.stage();
        let doc = UploadedDocument::pending(category, name, content.len() as u64);
        let id = doc.id;
        state.session.intake(doc, WorkflowAction::UploadDocument)?;
        self.publish(&state, WorkflowAction::UploadDocument, from);

        self.store_locked(&mut state, id, content, WorkflowAction::UploadDocument)
            .await
    }

    /// Re-run the upload of a document in the error state.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound`, `DocumentNotRetryable`, `Storage`, or the
    /// editing errors of [`Self::set_project`].
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub async fn retry_document(
        &self,
        id: DocumentId,
        content: Vec<u8>,
    ) -> Result<UploadedDocument, WorkflowError> {
        let mut state = self.inner.state.lock().await;
        let from = state.session.stage();
        state.session.begin_retry(id)?;
        self.publish(&state, WorkflowAction::RetryDocument, from);

        self.store_locked(&mut state, id, content, WorkflowAction::RetryDocument)
            .await
    }

    /// Remove a document record.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound`, or the editing errors of [`Self::set_project`].
    #[instrument(skip(self))]
    pub async fn remove_document(&self, id: DocumentId) -> Result<UploadedDocument, WorkflowError> {
        let mut state = self.inner.state.lock().await;
        let from = state.session.stage();
        let removed = state.session.remove_document(id)?;
        self.publish(&state, WorkflowAction::RemoveDocument, from);
        self.release(std::slice::from_ref(&removed)).await;
        Ok(removed)
    }

    /// Submit for analysis: `Collecting -> Processing`.
    ///
    /// Returns the generation of the submission. The analysis runs on a
    /// spawned task; watch [`Self::subscribe`] or call
    /// [`Self::wait_until_settled`] for the outcome.
    ///
    /// # Errors
    ///
    /// `AnalysisInProgress` while processing, `InvalidTransition` from
    /// reviewing or done, `ValidationFailed` when a guard fails.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<u64, WorkflowError> {
        let mut state = self.inner.state.lock().await;
        let from = state.session.stage();
        let generation = state.session.begin_submit(&self.inner.policy)?;

        let request = AnalysisRequest {
            protocol: state.session.protocol().to_string(),
            address: state.session.address().to_string(),
            documents: state.session.stored_documents(),
        };
        info!(
            generation,
            protocol = %request.protocol,
            documents = request.documents.len(),
            "Analysis submitted"
        );

        let workflow = self.clone();
        let task = tokio::spawn(async move {
            let outcome = workflow.inner.analysis.analyze(request).await;
            workflow.resolve(generation, outcome).await;
        });
        state.outstanding = Some(task.abort_handle());

        self.publish(&state, WorkflowAction::Submit, from);
        Ok(generation)
    }

    /// Abandon the outstanding analysis: `Processing -> Collecting`.
    ///
    /// Documents and metadata are kept.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless processing.
    #[instrument(skip(self))]
    pub async fn cancel(&self) -> Result<WorkflowSession, WorkflowError> {
        let mut state = self.inner.state.lock().await;
        let from = state.session.stage();
        state.session.cancel()?;
        abort_outstanding(&mut state);
        info!(generation = state.session.generation(), "Analysis cancelled");
        Ok(self.publish(&state, WorkflowAction::Cancel, from))
    }

    /// `Reviewing -> Collecting`, discarding the result.
    ///
    /// # Errors
    ///
    /// `AnalysisInProgress` while processing, `InvalidTransition` unless
    /// reviewing.
    #[instrument(skip(self))]
    pub async fn go_back(&self) -> Result<WorkflowSession, WorkflowError> {
        let mut state = self.inner.state.lock().await;
        let from = state.session.stage();
        state.session.go_back()?;
        Ok(self.publish(&state, WorkflowAction::GoBack, from))
    }

    /// `Reviewing -> Done`.
    ///
    /// # Errors
    ///
    /// `AnalysisInProgress` while processing, `InvalidTransition` unless
    /// reviewing with a result.
    #[instrument(skip(self))]
    pub async fn finish(&self) -> Result<WorkflowSession, WorkflowError> {
        let mut state = self.inner.state.lock().await;
        let from = state.session.stage();
        state.session.finish()?;
        info!(protocol = %state.session.protocol(), "Analysis finished");
        Ok(self.publish(&state, WorkflowAction::Finish, from))
    }

    /// Reset to an empty collecting session from any stage.
    ///
    /// The outstanding analysis is aborted and stored documents are
    /// released.
    #[instrument(skip(self))]
    pub async fn restart(&self) -> WorkflowSession {
        let mut state = self.inner.state.lock().await;
        let from = state.session.stage();
        let dropped = state.session.restart();
        abort_outstanding(&mut state);
        let session = self.publish(&state, WorkflowAction::Restart, from);
        self.release(&dropped).await;
        session
    }

    /// Wait until the session leaves the processing stage.
    ///
    /// # Errors
    ///
    /// `AnalysisFailed` if the analysis of the awaited generation failed.
    pub async fn wait_until_settled(&self) -> Result<WorkflowSession, WorkflowError> {
        let mut events = {
            let state = self.inner.state.lock().await;
            if state.session.stage() != Stage::Processing {
                return settled(state.session.clone());
            }
            self.inner.events.subscribe()
        };

        loop {
            match events.recv().await {
                Ok(event) if event.to != Stage::Processing => return settled(event.session),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Event receiver lagged, re-reading session");
                    let session = self.snapshot().await;
                    if session.stage() != Stage::Processing {
                        return settled(session);
                    }
                }
                // The sender lives in `inner`, which `self` keeps alive.
                Err(broadcast::error::RecvError::Closed) => return settled(self.snapshot().await),
            }
        }
    }

    async fn resolve(&self, generation: u64, outcome: Result<AnalysisResult, AnalysisError>) {
        let mut state = self.inner.state.lock().await;
        let from = state.session.stage();
        let failed = outcome.is_err();

        match state
            .session
            .complete(generation, outcome.map_err(|e| e.reason))
        {
            Resolution::Stale => {
                debug!(
                    generation,
                    current = state.session.generation(),
                    "Discarding stale analysis resolution"
                );
            }
            Resolution::Applied(to) => {
                state.outstanding = None;
                let action = if failed {
                    warn!(
                        generation,
                        reason = state.session.last_failure().unwrap_or_default(),
                        "Analysis failed"
                    );
                    WorkflowAction::Fail
                } else {
                    info!(generation, %to, "Analysis completed");
                    WorkflowAction::Complete
                };
                self.publish(&state, action, from);
            }
        }
    }

    async fn store_locked(
        &self,
        state: &mut State,
        id: DocumentId,
        content: Vec<u8>,
        action: WorkflowAction,
    ) -> Result<UploadedDocument, WorkflowError> {
        let (category, name) = state
            .session
            .document(id)
            .map(|doc| (doc.category, doc.name.clone()))
            .ok_or(WorkflowError::DocumentNotFound(id))?;

        let outcome = self
            .inner
            .documents
            .store(id, category, &name, content)
            .await;

        let from = state.session.stage();
        let settled = match &outcome {
            Ok(stored) => Ok((stored.key.clone(), stored.size)),
            Err(e) => Err(e.to_string()),
        };
        let evicted = state.session.settle_upload(id, settled).unwrap_or_default();
        self.publish(state, action, from);
        self.release(&evicted).await;

        match outcome {
            Ok(_) => state
                .session
                .document(id)
                .cloned()
                .ok_or(WorkflowError::DocumentNotFound(id)),
            Err(e) => {
                warn!(%id, error = %e, "Document upload failed");
                Err(e.into())
            }
        }
    }

    /// Delete the stored bytes of records that left the session.
    async fn release(&self, documents: &[UploadedDocument]) {
        for doc in documents {
            debug!(id = %doc.id, category = %doc.category, "Document left the session");
            let Some(key) = doc.storage_key.as_deref() else {
                continue;
            };
            if let Err(e) = self.inner.documents.remove(key).await {
                warn!(%key, error = %e, "Could not release stored document");
            }
        }
    }

    /// Broadcast the current session. Called with the lock held, after the
    /// change, so no subscriber sees an intermediate state.
    fn publish(&self, state: &State, action: WorkflowAction, from: Stage) -> WorkflowSession {
        let session = state.session.clone();
        // No subscribers is fine.
        let _ = self.inner.events.send(WorkflowEvent {
            action,
            from,
            to: session.stage(),
            generation: session.generation(),
            session: session.clone(),
        });
        session
    }
}

fn abort_outstanding(state: &mut State) {
    if let Some(task) = state.outstanding.take() {
        task.abort();
    }
}

fn settled(session: WorkflowSession) -> Result<WorkflowSession, WorkflowError> {
    match (session.stage(), session.last_failure()) {
        (Stage::Collecting, Some(reason)) => Err(WorkflowError::AnalysisFailed {
            reason: reason.to_string(),
        }),
        _ => Ok(session),
    }
}
