/// AI Client — the single point of entry for all generative-API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All AI interactions MUST go through this module, behind the `AiClient`
/// trait so editor and import logic stay testable without a network.
///
/// Model: gemini-2.5-flash (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::resume::{ResumePatch, Skill};

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all AI calls.
pub const MODEL: &str = "gemini-2.5-flash";
const MAX_RETRIES: u32 = 3;
/// Skill suggestions are capped regardless of how many the model returns.
pub const MAX_SUGGESTED_SKILLS: usize = 10;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("AI returned empty content")]
    EmptyContent,
}

/// The fixed set of rewrite tones the editor offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Professional,
    Executive,
    Creative,
    Concise,
    Technical,
    Enthusiastic,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Executive => "Executive",
            Tone::Creative => "Creative",
            Tone::Concise => "Concise",
            Tone::Technical => "Technical",
            Tone::Enthusiastic => "Enthusiastic",
        }
    }
}

/// Which kind of text a rewrite call is improving. Drives the instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteKind {
    Summary,
    Experience,
}

/// Extraction input: freeform text, or a base64-encoded PDF sent inline.
#[derive(Debug, Clone)]
pub enum ExtractSource {
    Text(String),
    PdfBase64(String),
}

/// The narrow seam between AI-dependent features and the hosted API.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Structured extraction of a partial resume from text or PDF.
    async fn extract_resume(&self, source: ExtractSource) -> Result<ResumePatch, AiError>;

    /// Rewrites user text in the requested tone. Callers decide what to do
    /// on failure (the editor falls back to the original text).
    async fn improve_content(
        &self,
        text: &str,
        kind: RewriteKind,
        tone: Tone,
        industry: Option<&str>,
    ) -> Result<String, AiError>;

    /// Up to [`MAX_SUGGESTED_SKILLS`] skills for a target role, ids minted.
    async fn suggest_skills(&self, target_role: &str) -> Result<Vec<Skill>, AiError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl RequestPart {
    fn text(text: impl Into<String>) -> Self {
        RequestPart {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn pdf(base64_data: String) -> Self {
        RequestPart {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "application/pdf".to_string(),
                data: base64_data,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
}

impl GenerateResponse {
    /// Extracts the text of the first candidate's first text part.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.iter().find_map(|p| p.text.as_deref()))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The production [`AiClient`] backed by the Gemini `generateContent` API.
/// Retries on 429 and 5xx with exponential backoff.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Raw call. `json_mode` asks the API for an `application/json` response.
    async fn call(
        &self,
        parts: Vec<RequestPart>,
        json_mode: bool,
    ) -> Result<GenerateResponse, AiError> {
        let request_body = GenerateRequest {
            contents: vec![RequestContent { parts }],
            generation_config: json_mode.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };
        let url = format!("{GEMINI_API_BASE}/{MODEL}:generateContent");

        let mut last_error: Option<AiError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "AI call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(AiError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("AI API returned {}: {}", status, body);
                last_error = Some(AiError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(AiError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let generate_response: GenerateResponse = response.json().await?;

            if let Some(usage) = &generate_response.usage_metadata {
                debug!(
                    "AI call succeeded: prompt_tokens={}, response_tokens={}",
                    usage.prompt_token_count, usage.candidates_token_count
                );
            }

            return Ok(generate_response);
        }

        Err(last_error.unwrap_or(AiError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the API in JSON mode and deserializes the text response.
    async fn call_json<T: DeserializeOwned>(
        &self,
        parts: Vec<RequestPart>,
    ) -> Result<T, AiError> {
        let response = self.call(parts, true).await?;
        let text = response.text().ok_or(AiError::EmptyContent)?;
        parse_json_response(text)
    }
}

#[async_trait]
impl AiClient for GeminiClient {
    async fn extract_resume(&self, source: ExtractSource) -> Result<ResumePatch, AiError> {
        let parts = match source {
            ExtractSource::Text(input) => {
                let prompt = prompts::EXTRACT_TEXT_PROMPT_TEMPLATE
                    .replace("{rules}", prompts::EXTRACT_RULES)
                    .replace("{schema}", prompts::EXTRACT_SCHEMA)
                    .replace("{input}", &input);
                vec![RequestPart::text(prompt)]
            }
            ExtractSource::PdfBase64(data) => {
                let prompt = prompts::EXTRACT_PDF_PROMPT_TEMPLATE
                    .replace("{rules}", prompts::EXTRACT_RULES)
                    .replace("{schema}", prompts::EXTRACT_SCHEMA);
                vec![RequestPart::pdf(data), RequestPart::text(prompt)]
            }
        };

        self.call_json::<ResumePatch>(parts).await
    }

    async fn improve_content(
        &self,
        text: &str,
        kind: RewriteKind,
        tone: Tone,
        industry: Option<&str>,
    ) -> Result<String, AiError> {
        let prompt = format!(
            "{}\n\nOriginal Text:\n{}",
            rewrite_instruction(kind, tone, industry),
            text
        );

        let response = self.call(vec![RequestPart::text(prompt)], false).await?;
        response
            .text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(AiError::EmptyContent)
    }

    async fn suggest_skills(&self, target_role: &str) -> Result<Vec<Skill>, AiError> {
        let prompt =
            prompts::SUGGEST_SKILLS_PROMPT_TEMPLATE.replace("{job_title}", target_role);

        let response = self.call(vec![RequestPart::text(prompt)], true).await?;
        let text = response.text().ok_or(AiError::EmptyContent)?;
        parse_suggested_skills(text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response shaping
// ────────────────────────────────────────────────────────────────────────────

/// Builds the rewrite instruction for the given kind, tone, and industry.
pub fn rewrite_instruction(kind: RewriteKind, tone: Tone, industry: Option<&str>) -> String {
    let industry_context = industry
        .filter(|i| !i.trim().is_empty())
        .map(|i| format!(" tailored for the {i} industry"))
        .unwrap_or_default();

    let template = match kind {
        RewriteKind::Summary => prompts::REWRITE_SUMMARY_TEMPLATE,
        RewriteKind::Experience => prompts::REWRITE_EXPERIENCE_TEMPLATE,
    };

    template
        .replace("{tone}", tone.as_str())
        .replace("{industry}", &industry_context)
}

#[derive(Debug, Deserialize)]
struct SkillSuggestions {
    #[serde(default)]
    skills: Vec<Skill>,
}

/// Parses a JSON payload out of model text, tolerating markdown fences.
fn parse_json_response<T: DeserializeOwned>(text: &str) -> Result<T, AiError> {
    serde_json::from_str(strip_json_fences(text)).map_err(AiError::Parse)
}

/// Parses the skill-suggestion response, caps the list, and mints ids.
fn parse_suggested_skills(text: &str) -> Result<Vec<Skill>, AiError> {
    let suggestions: SkillSuggestions = parse_json_response(text)?;

    let mut skills = suggestions.skills;
    skills.truncate(MAX_SUGGESTED_SKILLS);
    for skill in skills.iter_mut() {
        if skill.id.is_empty() {
            skill.id = uuid::Uuid::new_v4().to_string();
        }
    }
    Ok(skills)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::SkillLevel;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_response_text_takes_first_text_part() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "hello"}, {"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 2}
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("hello"));
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_rewrite_instruction_summary_with_industry() {
        let instruction =
            rewrite_instruction(RewriteKind::Summary, Tone::Executive, Some("fintech"));
        assert!(instruction.contains("Executive"));
        assert!(instruction.contains("tailored for the fintech industry"));
        assert!(instruction.contains("under 50 words"));
    }

    #[test]
    fn test_rewrite_instruction_experience_without_industry() {
        let instruction = rewrite_instruction(RewriteKind::Experience, Tone::Professional, None);
        assert!(instruction.contains("action verbs"));
        assert!(instruction.contains("Professional"));
        assert!(!instruction.contains("industry"));
    }

    #[test]
    fn test_rewrite_instruction_blank_industry_is_ignored() {
        let instruction = rewrite_instruction(RewriteKind::Summary, Tone::Concise, Some("  "));
        assert!(!instruction.contains("tailored"));
    }

    #[test]
    fn test_parse_suggested_skills_caps_and_mints_ids() {
        let mut entries = Vec::new();
        for i in 0..12 {
            entries.push(format!(
                r#"{{"name": "Skill {i}", "category": "Technical", "level": "Advanced"}}"#
            ));
        }
        let json = format!(r#"{{"skills": [{}]}}"#, entries.join(","));

        let skills = parse_suggested_skills(&json).unwrap();
        assert_eq!(skills.len(), MAX_SUGGESTED_SKILLS);
        assert!(skills.iter().all(|s| !s.id.is_empty()));
        assert!(skills.iter().all(|s| s.level == SkillLevel::Advanced));
    }

    #[test]
    fn test_parse_suggested_skills_tolerates_fences_and_missing_level() {
        let json = "```json\n{\"skills\": [{\"name\": \"Rust\", \"category\": \"Technical\"}]}\n```";
        let skills = parse_suggested_skills(json).unwrap();
        assert_eq!(skills.len(), 1);
        // Missing level falls back to the enum default.
        assert_eq!(skills[0].level, SkillLevel::Intermediate);
    }

    #[test]
    fn test_parse_json_response_rejects_garbage() {
        let result: Result<SkillSuggestions, _> = parse_json_response("not json at all");
        assert!(matches!(result, Err(AiError::Parse(_))));
    }

    #[test]
    fn test_extract_patch_parses_schema_shaped_output() {
        let json = r#"{
            "personalInfo": {"fullName": "Ada Lovelace", "email": "ada@example.com"},
            "experience": [],
            "skills": [{"name": "Mathematics", "level": "Expert", "category": "Technical"}]
        }"#;
        let patch: ResumePatch = parse_json_response(json).unwrap();
        assert_eq!(
            patch.personal_info.unwrap().full_name.as_deref(),
            Some("Ada Lovelace")
        );
        assert_eq!(patch.experience.as_deref(), Some(&[][..]));
        assert!(patch.education.is_none());
    }
}
