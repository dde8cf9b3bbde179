//! Analysis workflow API.
//!
//! Every handler acts on the workflow bound to the caller's session and
//! requires access to the new-analysis screen.

use std::convert::Infallible;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
    routing::{delete, get, post, put},
};
use futures::{Stream, stream};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tower_sessions::Session;
use tracing::debug;

use urbanplan_core::{DocumentCategory, DocumentId, Identity};

use crate::error::AppError;
use crate::middleware::auth::{RequireIdentity, authorize_screen};
use crate::navigation::Screen;
use crate::state::{AppState, DashboardWorkflow};
use crate::workflow::{UploadedDocument, WorkflowEvent, WorkflowSession};

/// Build the analysis router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/analysis", get(snapshot).post(start))
        .route("/api/analysis/project", put(set_project))
        .route("/api/analysis/documents", post(add_document))
        .route("/api/analysis/documents/{id}", delete(remove_document))
        .route("/api/analysis/documents/{id}/retry", post(retry_document))
        .route("/api/analysis/uploads", post(upload_document))
        .route("/api/analysis/submit", post(submit))
        .route("/api/analysis/cancel", post(cancel))
        .route("/api/analysis/back", post(go_back))
        .route("/api/analysis/finish", post(finish))
        .route("/api/analysis/restart", post(restart))
        .route("/api/analysis/settled", get(settled))
        .route("/api/analysis/events", get(events))
}

/// Resolve the caller's workflow after the screen check.
async fn workflow(
    state: &AppState,
    session: &Session,
    identity: &Identity,
) -> Result<DashboardWorkflow, Response> {
    authorize_screen(state, Screen::NewAnalysis, identity, true)
        .map_err(IntoResponse::into_response)?;
    state
        .workflow_for(session)
        .await
        .map_err(IntoResponse::into_response)
}

/// GET /api/analysis
async fn snapshot(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
) -> Result<Json<WorkflowSession>, Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    Ok(Json(workflow.snapshot().await))
}

/// Start a new analysis, discarding whatever the session held.
///
/// POST /api/analysis
async fn start(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
) -> Result<Json<WorkflowSession>, Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    Ok(Json(workflow.restart().await))
}

#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub protocol: String,
    pub address: String,
}

/// PUT /api/analysis/project
async fn set_project(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
    Json(body): Json<ProjectRequest>,
) -> Result<Json<WorkflowSession>, Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    workflow
        .set_project(&body.protocol, &body.address)
        .await
        .map(Json)
        .map_err(|e| AppError::from(e).into_response())
}

#[derive(Debug, Deserialize)]
pub struct AddDocumentRequest {
    pub category: DocumentCategory,
}

/// Add a document whose upload completes at once.
///
/// POST /api/analysis/documents
async fn add_document(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
    Json(body): Json<AddDocumentRequest>,
) -> Result<(StatusCode, Json<UploadedDocument>), Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    workflow
        .add_document(body.category)
        .await
        .map(|doc| (StatusCode::CREATED, Json(doc)))
        .map_err(|e| AppError::from(e).into_response())
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub category: DocumentCategory,
    pub name: String,
}

/// Upload raw document bytes.
///
/// POST /api/analysis/uploads?category=&name=
async fn upload_document(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadedDocument>), Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    workflow
        .upload_document(params.category, &params.name, body.to_vec())
        .await
        .map(|doc| (StatusCode::CREATED, Json(doc)))
        .map_err(|e| AppError::from(e).into_response())
}

fn parse_document_id(raw: &str) -> Result<DocumentId, Response> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("document {raw}")).into_response())
}

/// POST /api/analysis/documents/{id}/retry
async fn retry_document(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<UploadedDocument>, Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    let id = parse_document_id(&id)?;
    workflow
        .retry_document(id, body.to_vec())
        .await
        .map(Json)
        .map_err(|e| AppError::from(e).into_response())
}

/// DELETE /api/analysis/documents/{id}
async fn remove_document(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<UploadedDocument>, Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    let id = parse_document_id(&id)?;
    workflow
        .remove_document(id)
        .await
        .map(Json)
        .map_err(|e| AppError::from(e).into_response())
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub generation: u64,
    pub session: WorkflowSession,
}

/// POST /api/analysis/submit
///
/// 202: the analysis runs in the background.
async fn submit(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
) -> Result<(StatusCode, Json<SubmitResponse>), Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    let generation = workflow
        .submit()
        .await
        .map_err(|e| AppError::from(e).into_response())?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            generation,
            session: workflow.snapshot().await,
        }),
    ))
}

/// POST /api/analysis/cancel
async fn cancel(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
) -> Result<Json<WorkflowSession>, Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    workflow
        .cancel()
        .await
        .map(Json)
        .map_err(|e| AppError::from(e).into_response())
}

/// POST /api/analysis/back
async fn go_back(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
) -> Result<Json<WorkflowSession>, Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    workflow
        .go_back()
        .await
        .map(Json)
        .map_err(|e| AppError::from(e).into_response())
}

/// POST /api/analysis/finish
async fn finish(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
) -> Result<Json<WorkflowSession>, Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    workflow
        .finish()
        .await
        .map(Json)
        .map_err(|e| AppError::from(e).into_response())
}

/// POST /api/analysis/restart
async fn restart(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
) -> Result<Json<WorkflowSession>, Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    Ok(Json(workflow.restart().await))
}

/// Block until the outstanding analysis settles.
///
/// GET /api/analysis/settled
async fn settled(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
) -> Result<Json<WorkflowSession>, Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    workflow
        .wait_until_settled()
        .await
        .map(Json)
        .map_err(|e| AppError::from(e).into_response())
}

/// Stream workflow events as server-sent events.
///
/// GET /api/analysis/events
async fn events(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    session: Session,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Response> {
    let workflow = workflow(&state, &session, &identity).await?;
    let receiver = workflow.subscribe();

    Ok(Sse::new(event_stream(receiver)).keep_alive(KeepAlive::default()))
}

fn event_stream(
    receiver: broadcast::Receiver<WorkflowEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let json = serde_json::to_string(&event).unwrap_or_else(|_| {
                        r#"{"error":"Failed to serialize event"}"#.to_string()
                    });
                    let sse = Event::default().event(event.action.as_str()).data(json);
                    return Some((Ok(sse), receiver));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
}
