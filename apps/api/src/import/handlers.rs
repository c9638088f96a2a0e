//! HTTP handler for importing a resume document into the open session.

use axum::extract::{Multipart, State};
use axum::Json;
use tracing::info;

use crate::editor::{no_session, SessionView};
use crate::errors::AppError;
use crate::import::{import_from, merge_patch, ImportInput};
use crate::state::AppState;

/// POST /api/v1/session/import
///
/// Multipart form with either a `file` part (PDF) or a `text` part (pasted
/// resume text). Validation runs before any bytes leave the process. The
/// session lock is released during extraction; if the session was closed or
/// replaced in the meantime the extracted result is discarded.
pub async fn import(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SessionView>, AppError> {
    let origin_id = {
        let guard = state.session.read().await;
        guard.as_ref().ok_or_else(no_session)?.resume_id
    };

    let mut input: Option<ImportInput> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart request: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
                input = Some(ImportInput::from_file(
                    bytes.to_vec(),
                    content_type.as_deref(),
                )?);
            }
            Some("text") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read text: {e}")))?;
                input = Some(ImportInput::from_text(text)?);
            }
            _ => continue,
        }
    }

    let input = input.ok_or_else(|| {
        AppError::Validation("request must include a 'file' or 'text' part".to_string())
    })?;

    let patch = import_from(state.ai.as_ref(), input).await?;

    let mut guard = state.session.write().await;
    let session = guard.as_mut().ok_or_else(no_session)?;
    // Extraction results never merge into a session other than the one the
    // import was requested from.
    if session.resume_id != origin_id {
        return Err(AppError::NotFound(
            "editor session changed while importing".to_string(),
        ));
    }
    session.data = merge_patch(&session.data, patch);

    info!("Merged imported resume into session");
    Ok(Json(SessionView::from(&*session)))
}
