//! Form editor — the in-memory editing session and its enrichment operations.
//!
//! Edits follow a snapshot discipline: every change produces a new
//! `ResumeData` value instead of mutating fields in place, so each change is
//! an atomic, independently replaceable snapshot. Enrichment requests are
//! fire-and-forget toward the AI client; a rewrite that fails keeps the prior
//! value. Two overlapping rewrites of the same field are not guarded — the
//! later response wins.

pub mod handlers;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ai::{AiClient, RewriteKind, Tone};
use crate::errors::AppError;
use crate::models::resume::{ResumeData, ResumeDraft, ResumeEntry};

/// A resume being edited. Born blank (create-new) or from a saved entry
/// (edit); `resume_id` stays `None` until the first successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSession {
    pub resume_id: Option<i64>,
    pub name: String,
    pub template_id: String,
    pub data: ResumeData,
}

impl EditorSession {
    /// A fresh session: blank resume, default template, no persisted id.
    pub fn create_new() -> Self {
        EditorSession {
            resume_id: None,
            name: "New Resume".to_string(),
            template_id: "modern".to_string(),
            data: ResumeData::blank(),
        }
    }

    /// A session pre-loaded from a saved entry.
    pub fn from_entry(entry: ResumeEntry) -> Self {
        EditorSession {
            resume_id: Some(entry.id),
            name: entry.name,
            template_id: entry.template_id,
            data: entry.data,
        }
    }

    /// The persistable snapshot of this session.
    pub fn draft(&self) -> ResumeDraft {
        ResumeDraft {
            name: self.name.clone(),
            template_id: self.template_id.clone(),
            data: self.data.clone(),
        }
    }
}

/// Serialized view of a session returned by every session endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub resume_id: Option<i64>,
    pub name: String,
    pub template_id: String,
    pub data: ResumeData,
}

impl From<&EditorSession> for SessionView {
    fn from(session: &EditorSession) -> Self {
        SessionView {
            resume_id: session.resume_id,
            name: session.name.clone(),
            template_id: session.template_id.clone(),
            data: session.data.clone(),
        }
    }
}

/// Which field a rewrite targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewriteTarget {
    Summary,
    Experience { id: String },
}

impl RewriteTarget {
    pub fn kind(&self) -> RewriteKind {
        match self {
            RewriteTarget::Summary => RewriteKind::Summary,
            RewriteTarget::Experience { .. } => RewriteKind::Experience,
        }
    }
}

/// The current text of the targeted field, or `None` when an experience id
/// does not exist in this snapshot.
pub fn target_text<'a>(data: &'a ResumeData, target: &RewriteTarget) -> Option<&'a str> {
    match target {
        RewriteTarget::Summary => Some(data.personal_info.summary.as_str()),
        RewriteTarget::Experience { id } => data
            .experience
            .iter()
            .find(|e| e.id == *id)
            .map(|e| e.description.as_str()),
    }
}

/// Builds a fresh snapshot with the targeted field replaced. A vanished
/// experience id leaves the snapshot unchanged (the in-flight result is
/// simply dropped).
pub fn apply_rewrite(data: &ResumeData, target: &RewriteTarget, text: &str) -> ResumeData {
    let mut next = data.clone();
    match target {
        RewriteTarget::Summary => next.personal_info.summary = text.to_string(),
        RewriteTarget::Experience { id } => {
            if let Some(exp) = next.experience.iter_mut().find(|e| e.id == *id) {
                exp.description = text.to_string();
            }
        }
    }
    next
}

/// Runs a rewrite against the AI client, falling back to the original text
/// verbatim on any failure or empty response. Never errors.
pub async fn rewrite_text(
    ai: &dyn AiClient,
    original: &str,
    kind: RewriteKind,
    tone: Tone,
    industry: Option<&str>,
) -> String {
    match ai.improve_content(original, kind, tone, industry).await {
        Ok(improved) if !improved.trim().is_empty() => improved,
        Ok(_) => {
            warn!("Rewrite returned empty text; keeping the original");
            original.to_string()
        }
        Err(e) => {
            warn!("Rewrite failed, keeping the original: {e}");
            original.to_string()
        }
    }
}

/// Shared guard for endpoints that require an open editor.
pub fn no_session() -> AppError {
    AppError::NotFound("no active editor session".to_string())
}
