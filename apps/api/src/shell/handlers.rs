//! HTTP handlers for the catalog and the session lifecycle.
//!
//! There is no active session in the list view; creating or opening one
//! enters the editor, deleting it goes back. Closing a session discards
//! unsaved edits without confirmation.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::editor::{no_session, EditorSession, SessionView};
use crate::errors::AppError;
use crate::export::{pdf_filename, render_pdf};
use crate::models::resume::ResumeEntry;
use crate::models::template::Template;
use crate::render::{render, Document, TemplateId};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Catalog
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resumes
pub async fn list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeEntry>>, AppError> {
    let resumes = state.store.list_resumes().await?;
    Ok(Json(resumes))
}

/// DELETE /api/v1/resumes/:id — deleting an absent id is still a 204.
pub async fn delete_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.store.delete_resume(id).await?;

    // Deleting the resume that is open in the editor closes the editor.
    let mut guard = state.session.write().await;
    if guard.as_ref().is_some_and(|s| s.resume_id == Some(id)) {
        *guard = None;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/templates
pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<Vec<Template>>, AppError> {
    let templates = state.store.list_templates().await?;
    Ok(Json(templates))
}

// ────────────────────────────────────────────────────────────────────────────
// Session lifecycle
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/session — start editing a blank resume. Any session already
/// open is replaced, dropping its unsaved edits.
pub async fn create_session(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    let session = EditorSession::create_new();
    let view = SessionView::from(&session);
    *state.session.write().await = Some(session);
    info!("Opened editor with a new resume");
    Ok(Json(view))
}

/// POST /api/v1/session/open/:id — start editing a saved resume.
pub async fn open_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SessionView>, AppError> {
    let entry = state
        .store
        .get_resume(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("resume {id} not found")))?;

    let session = EditorSession::from_entry(entry);
    let view = SessionView::from(&session);
    *state.session.write().await = Some(session);
    info!(resume_id = id, "Opened editor with a saved resume");
    Ok(Json(view))
}

/// GET /api/v1/session
pub async fn get_session(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    let guard = state.session.read().await;
    let session = guard.as_ref().ok_or_else(no_session)?;
    Ok(Json(SessionView::from(session)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub resume_id: i64,
}

/// POST /api/v1/session/save — persist the draft. A first save assigns an
/// id, which the session adopts; later saves update the same row. The editor
/// stays open.
pub async fn save_session(State(state): State<AppState>) -> Result<Json<SaveResponse>, AppError> {
    let mut guard = state.session.write().await;
    let session = guard.as_mut().ok_or_else(no_session)?;

    let id = state
        .store
        .save_resume(&session.draft(), session.resume_id)
        .await?;
    session.resume_id = Some(id);

    info!(resume_id = id, "Saved resume");
    Ok(Json(SaveResponse { resume_id: id }))
}

/// DELETE /api/v1/session — back to the list view, unsaved edits discarded.
pub async fn close_session(State(state): State<AppState>) -> StatusCode {
    *state.session.write().await = None;
    StatusCode::NO_CONTENT
}

// ────────────────────────────────────────────────────────────────────────────
// Preview and export
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/session/preview — the session rendered to the page model.
pub async fn preview(State(state): State<AppState>) -> Result<Json<Document>, AppError> {
    let guard = state.session.read().await;
    let session = guard.as_ref().ok_or_else(no_session)?;
    let document = render(&session.data, TemplateId::parse(&session.template_id));
    Ok(Json(document))
}

/// GET /api/v1/session/export — the session rendered to a one-page A4 PDF.
/// The download filename is the resume name with whitespace collapsed to
/// underscores.
pub async fn export(State(state): State<AppState>) -> Result<Response, AppError> {
    let (document, filename) = {
        let guard = state.session.read().await;
        let session = guard.as_ref().ok_or_else(no_session)?;
        (
            render(&session.data, TemplateId::parse(&session.template_id)),
            pdf_filename(&session.name),
        )
    };

    let bytes = render_pdf(&document)?;
    info!(filename = %filename, size = bytes.len(), "Exported PDF");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
