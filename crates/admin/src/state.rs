//! Application state shared across handlers.

use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use moka::future::Cache;
use tower_sessions::Session;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::AdminConfig;
use crate::error::AppError;
use crate::models::session_keys;
use crate::navigation::NavigationRegistry;
use crate::services::auth::{DemoAuthenticator, SessionAuthority, SessionIdentityStore};
use crate::services::{MemoryDocumentStore, ScriptedAnalysisService};
use crate::workflow::AnalysisWorkflow;

/// Workflow wired to the collaborators this server runs with.
pub type DashboardWorkflow = AnalysisWorkflow<ScriptedAnalysisService, MemoryDocumentStore>;

/// Authority over the identity stored in one browser session.
pub type DashboardAuthority = SessionAuthority<SessionIdentityStore, DemoAuthenticator>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    navigation: Arc<NavigationRegistry>,
    authenticator: Arc<DemoAuthenticator>,
    analysis: Arc<ScriptedAnalysisService>,
    documents: Arc<MemoryDocumentStore>,
    catalog: Catalog,
    workflows: Cache<Uuid, DashboardWorkflow>,
}

impl AppState {
    /// Build the state with the reference navigation registry and a catalog
    /// seeded at the current time.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let authenticator = DemoAuthenticator::new(config.login_latency);
        let analysis = ScriptedAnalysisService::new(config.analysis_latency);
        Self::with_services(config, authenticator, analysis)
    }

    /// Build the state around explicit collaborators.
    #[must_use]
    pub fn with_services(
        config: AdminConfig,
        authenticator: DemoAuthenticator,
        analysis: ScriptedAnalysisService,
    ) -> Self {
        let workflows = Cache::builder()
            .time_to_idle(config.workflow_idle)
            .async_eviction_listener(|id, workflow: DashboardWorkflow, cause| {
                async move {
                    if cause.was_evicted() {
                        debug!(workflow = %id, ?cause, "Idle workflow evicted");
                        workflow.restart().await;
                    }
                }
                .boxed()
            })
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                navigation: Arc::new(NavigationRegistry::reference()),
                authenticator: Arc::new(authenticator),
                analysis: Arc::new(analysis),
                documents: Arc::new(MemoryDocumentStore::new()),
                catalog: Catalog::seed(Utc::now()),
                workflows,
                config,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn navigation(&self) -> &NavigationRegistry {
        &self.inner.navigation
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Authority over the identity persisted in `session`.
    #[must_use]
    pub fn authority(&self, session: Session) -> DashboardAuthority {
        SessionAuthority::new(
            SessionIdentityStore::new(session),
            Arc::clone(&self.inner.authenticator),
            Arc::clone(&self.inner.navigation),
        )
    }

    /// The workflow bound to `session`, created on first use.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the session cannot be read or written.
    pub async fn workflow_for(&self, session: &Session) -> Result<DashboardWorkflow, AppError> {
        let id = match session
            .get::<Uuid>(session_keys::WORKFLOW_ID)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
        {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4();
                session
                    .insert(session_keys::WORKFLOW_ID, id)
                    .await
                    .map_err(|e| AppError::Internal(e.to_string()))?;
                id
            }
        };

        let workflow = self
            .inner
            .workflows
            .get_with(id, async {
                debug!(workflow = %id, "Creating analysis workflow");
                AnalysisWorkflow::new(
                    Arc::clone(&self.inner.analysis),
                    Arc::clone(&self.inner.documents),
                    self.inner.config.submission_policy,
                )
            })
            .await;
        Ok(workflow)
    }

    /// Unbind the session's workflow and reset it, aborting any running
    /// analysis and releasing its documents.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the session cannot be written.
    pub async fn release_workflow(&self, session: &Session) -> Result<(), AppError> {
        let bound = session
            .remove::<Uuid>(session_keys::WORKFLOW_ID)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let Some(id) = bound else {
            return Ok(());
        };
        if let Some(workflow) = self.inner.workflows.remove(&id).await {
            workflow.restart().await;
            debug!(workflow = %id, "Workflow released");
        }
        Ok(())
    }
}
