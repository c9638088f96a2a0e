//! HTTP handlers for editing the open session: field updates, AI rewrites,
//! and skill suggestions.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ai::Tone;
use crate::editor::{
    apply_rewrite, no_session, rewrite_text, target_text, RewriteTarget, SessionView,
};
use crate::errors::AppError;
use crate::models::resume::{ResumeData, Skill};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSessionRequest {
    pub name: Option<String>,
    pub template_id: Option<String>,
    pub data: Option<ResumeData>,
}

/// PUT /api/v1/session
///
/// Replaces the parts of the open session the request carries. `data`, when
/// present, replaces the whole snapshot; partial field edits are expressed by
/// sending the full updated snapshot.
pub async fn update_session(
    State(state): State<AppState>,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<Json<SessionView>, AppError> {
    let mut guard = state.session.write().await;
    let session = guard.as_mut().ok_or_else(no_session)?;

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("resume name cannot be empty".to_string()));
        }
        session.name = name;
    }
    if let Some(template_id) = req.template_id {
        session.template_id = template_id;
    }
    if let Some(data) = req.data {
        session.data = data;
    }

    Ok(Json(SessionView::from(&*session)))
}

#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    pub target: RewriteTarget,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub industry: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RewriteResponse {
    pub text: String,
}

/// POST /api/v1/session/rewrite
///
/// Rewrites the targeted field with the AI client. The lock is not held
/// across the AI call; overlapping rewrites of the same field resolve
/// later-wins, while a result landing after the session was closed or
/// swapped for another resume is discarded. AI failure is not an error: the
/// original text comes back unchanged.
pub async fn rewrite(
    State(state): State<AppState>,
    Json(req): Json<RewriteRequest>,
) -> Result<Json<RewriteResponse>, AppError> {
    let (original, origin_id) = {
        let guard = state.session.read().await;
        let session = guard.as_ref().ok_or_else(no_session)?;
        let text = target_text(&session.data, &req.target)
            .ok_or_else(|| AppError::NotFound("experience entry not found".to_string()))?;
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "there is no text to rewrite yet".to_string(),
            ));
        }
        (text.to_string(), session.resume_id)
    };

    let improved = rewrite_text(
        state.ai.as_ref(),
        &original,
        req.target.kind(),
        req.tone,
        req.industry.as_deref(),
    )
    .await;

    let mut guard = state.session.write().await;
    let session = guard.as_mut().ok_or_else(no_session)?;
    // If a different resume was opened while the AI call was in flight, the
    // result belongs to a view the user already left; drop it.
    if session.resume_id != origin_id {
        return Err(AppError::NotFound(
            "editor session changed while rewriting".to_string(),
        ));
    }
    session.data = apply_rewrite(&session.data, &req.target, &improved);

    info!(tone = req.tone.as_str(), "Applied rewrite to session");
    Ok(Json(RewriteResponse { text: improved }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestSkillsRequest {
    pub target_role: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestSkillsResponse {
    pub skills: Vec<Skill>,
}

/// POST /api/v1/session/skills/suggest
///
/// Suggests skills for a target role. Unlike rewrites this does not modify
/// the session; the caller picks which suggestions to keep.
pub async fn suggest_skills(
    State(state): State<AppState>,
    Json(req): Json<SuggestSkillsRequest>,
) -> Result<Json<SuggestSkillsResponse>, AppError> {
    if req.target_role.trim().is_empty() {
        return Err(AppError::Validation("target role is required".to_string()));
    }
    {
        let guard = state.session.read().await;
        if guard.is_none() {
            return Err(no_session());
        }
    }

    let skills = state
        .ai
        .suggest_skills(req.target_role.trim())
        .await
        .map_err(|e| AppError::Ai(format!("skill suggestion failed: {e}")))?;

    info!(count = skills.len(), "Suggested skills");
    Ok(Json(SuggestSkillsResponse { skills }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiClient, AiError, ExtractSource, RewriteKind};
    use crate::editor::EditorSession;
    use crate::models::resume::ResumePatch;
    use crate::store::Store;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    struct EchoAi(&'static str);

    #[async_trait]
    impl AiClient for EchoAi {
        async fn extract_resume(&self, _source: ExtractSource) -> Result<ResumePatch, AiError> {
            Err(AiError::EmptyContent)
        }

        async fn improve_content(
            &self,
            _text: &str,
            _kind: RewriteKind,
            _tone: Tone,
            _industry: Option<&str>,
        ) -> Result<String, AiError> {
            Ok(self.0.to_string())
        }

        async fn suggest_skills(&self, _target_role: &str) -> Result<Vec<Skill>, AiError> {
            Ok(vec![])
        }
    }

    /// Swaps the session for another one (or closes it) while the rewrite is
    /// in flight, simulating the user navigating during an AI call.
    struct SessionSwappingAi {
        session: Arc<RwLock<Option<EditorSession>>>,
        replacement: Option<EditorSession>,
    }

    #[async_trait]
    impl AiClient for SessionSwappingAi {
        async fn extract_resume(&self, _source: ExtractSource) -> Result<ResumePatch, AiError> {
            Err(AiError::EmptyContent)
        }

        async fn improve_content(
            &self,
            _text: &str,
            _kind: RewriteKind,
            _tone: Tone,
            _industry: Option<&str>,
        ) -> Result<String, AiError> {
            *self.session.write().await = self.replacement.clone();
            Ok("rewritten elsewhere".to_string())
        }

        async fn suggest_skills(&self, _target_role: &str) -> Result<Vec<Skill>, AiError> {
            Ok(vec![])
        }
    }

    async fn state_with(
        ai: Arc<dyn AiClient>,
        session: Arc<RwLock<Option<EditorSession>>>,
    ) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("store.sqlite")).await.unwrap();
        (dir, AppState { store, ai, session })
    }

    fn session_with_summary(summary: &str) -> EditorSession {
        let mut session = EditorSession::create_new();
        session.data.personal_info.summary = summary.to_string();
        session
    }

    fn summary_request() -> RewriteRequest {
        RewriteRequest {
            target: RewriteTarget::Summary,
            tone: Tone::default(),
            industry: None,
        }
    }

    #[tokio::test]
    async fn test_rewrite_applies_to_the_session_it_started_from() {
        let session = Arc::new(RwLock::new(Some(session_with_summary("rough draft"))));
        let (_dir, state) = state_with(Arc::new(EchoAi("Polished.")), session.clone()).await;

        let response = rewrite(State(state), Json(summary_request())).await.unwrap();
        assert_eq!(response.0.text, "Polished.");

        let guard = session.read().await;
        assert_eq!(
            guard.as_ref().unwrap().data.personal_info.summary,
            "Polished."
        );
    }

    #[tokio::test]
    async fn test_rewrite_is_discarded_when_another_resume_was_opened() {
        let session = Arc::new(RwLock::new(Some(session_with_summary("rough draft"))));

        let mut other = session_with_summary("someone else's summary");
        other.resume_id = Some(99);
        let ai = Arc::new(SessionSwappingAi {
            session: session.clone(),
            replacement: Some(other),
        });
        let (_dir, state) = state_with(ai, session.clone()).await;

        let result = rewrite(State(state), Json(summary_request())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        // The resume opened mid-flight keeps its own text.
        let guard = session.read().await;
        assert_eq!(
            guard.as_ref().unwrap().data.personal_info.summary,
            "someone else's summary"
        );
    }

    #[tokio::test]
    async fn test_rewrite_is_discarded_when_session_was_closed() {
        let session = Arc::new(RwLock::new(Some(session_with_summary("rough draft"))));
        let ai = Arc::new(SessionSwappingAi {
            session: session.clone(),
            replacement: None,
        });
        let (_dir, state) = state_with(ai, session.clone()).await;

        let result = rewrite(State(state), Json(summary_request())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(session.read().await.is_none());
    }

    #[tokio::test]
    async fn test_rewrite_rejects_empty_source_before_any_ai_call() {
        let session = Arc::new(RwLock::new(Some(session_with_summary("   "))));
        let (_dir, state) = state_with(Arc::new(EchoAi("never used")), session).await;

        let result = rewrite(State(state), Json(summary_request())).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
