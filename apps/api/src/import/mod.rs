//! Resume import — validates an uploaded document, extracts structured fields
//! through the AI client, and merges the result into existing editor state.
//!
//! Merge policy: personal-info keys merge one by one (a key present in the
//! extraction overwrites, an absent key keeps the prior value), while the
//! experience, education, and skills lists are replaced wholesale only when
//! the extraction produced a non-empty list for them.

pub mod handlers;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::info;

use crate::ai::{AiClient, ExtractSource};
use crate::errors::AppError;
use crate::models::resume::{ResumeData, ResumePatch};

/// Hard cap on uploaded PDF size. Larger files are rejected before any bytes
/// reach the AI provider.
pub const MAX_PDF_BYTES: usize = 4 * 1024 * 1024;

/// A validated import payload.
#[derive(Debug, Clone)]
pub enum ImportInput {
    Text(String),
    Pdf(Vec<u8>),
}

impl ImportInput {
    /// Validates raw pasted text: must contain something beyond whitespace.
    pub fn from_text(text: String) -> Result<Self, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "pasted text is empty".to_string(),
            ));
        }
        Ok(ImportInput::Text(text))
    }

    /// Validates an uploaded file: declared type must be `application/pdf`
    /// (or the bytes must carry the PDF magic when no type was declared),
    /// and the size cap applies.
    pub fn from_file(bytes: Vec<u8>, content_type: Option<&str>) -> Result<Self, AppError> {
        let is_pdf = match content_type {
            Some(ct) => ct == "application/pdf",
            None => bytes.starts_with(b"%PDF-"),
        };
        if !is_pdf {
            return Err(AppError::Validation(
                "only PDF files are supported".to_string(),
            ));
        }
        if bytes.len() > MAX_PDF_BYTES {
            return Err(AppError::Validation(
                "PDF is larger than the 4 MiB limit".to_string(),
            ));
        }
        if bytes.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".to_string()));
        }
        Ok(ImportInput::Pdf(bytes))
    }
}

/// Runs extraction on a validated input. Unlike rewrites, an extraction
/// failure is surfaced to the caller: there is no sensible fallback content
/// to import.
pub async fn import_from(ai: &dyn AiClient, input: ImportInput) -> Result<ResumePatch, AppError> {
    let source = match input {
        ImportInput::Text(text) => ExtractSource::Text(text),
        ImportInput::Pdf(bytes) => ExtractSource::PdfBase64(BASE64.encode(&bytes)),
    };

    let mut patch = ai
        .extract_resume(source)
        .await
        .map_err(|e| AppError::Ai(format!("resume extraction failed: {e}")))?;
    patch.ensure_ids();

    info!(
        has_personal_info = patch.personal_info.is_some(),
        experience = patch.experience.as_ref().map_or(0, Vec::len),
        education = patch.education.as_ref().map_or(0, Vec::len),
        skills = patch.skills.as_ref().map_or(0, Vec::len),
        "Extracted resume fields"
    );
    Ok(patch)
}

/// Merges an extraction patch into the current snapshot, returning a new one.
pub fn merge_patch(current: &ResumeData, patch: ResumePatch) -> ResumeData {
    let mut next = current.clone();

    if let Some(info) = patch.personal_info {
        let p = &mut next.personal_info;
        if let Some(v) = info.full_name {
            p.full_name = v;
        }
        if let Some(v) = info.email {
            p.email = v;
        }
        if let Some(v) = info.phone {
            p.phone = v;
        }
        if let Some(v) = info.linkedin {
            p.linkedin = v;
        }
        if let Some(v) = info.website {
            p.website = v;
        }
        if let Some(v) = info.summary {
            p.summary = v;
        }
        if let Some(v) = info.location {
            p.location = v;
        }
    }

    // Lists replace only when the extraction actually found entries; an
    // empty list never wipes existing work.
    if let Some(experience) = patch.experience.filter(|v| !v.is_empty()) {
        next.experience = experience;
    }
    if let Some(education) = patch.education.filter(|v| !v.is_empty()) {
        next.education = education;
    }
    if let Some(skills) = patch.skills.filter(|v| !v.is_empty()) {
        next.skills = skills;
    }

    next
}
