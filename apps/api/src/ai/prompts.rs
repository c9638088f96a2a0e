// All prompt constants for the AI enrichment and extraction calls.

/// Shared schema fragment for resume extraction. The model must return this
/// exact camelCase shape; unknown fields are ignored on parse.
pub const EXTRACT_SCHEMA: &str = r#"Return a JSON object with this EXACT schema (omit sections you cannot fill):
{
  "personalInfo": {
    "fullName": "", "email": "", "phone": "", "linkedin": "",
    "website": "", "summary": "", "location": ""
  },
  "experience": [
    {"company": "", "role": "", "startDate": "YYYY-MM", "endDate": "YYYY-MM",
     "current": false, "description": ""}
  ],
  "education": [
    {"school": "", "degree": "", "startDate": "YYYY-MM", "endDate": "YYYY-MM",
     "current": false}
  ],
  "skills": [
    {"name": "", "level": "Beginner|Intermediate|Advanced|Expert",
     "category": "Technical|Soft Skills|Languages|Tools|Other"}
  ]
}"#;

/// Extraction rules appended to both the text and PDF prompts.
pub const EXTRACT_RULES: &str = "\
You are an expert resume parser.\n\
If a field is missing, leave it as an empty string or omit the section.\n\
Infer the 'current' boolean from dates (e.g. 'Present').\n\
Format dates as 'YYYY-MM' if possible, otherwise keep the original string.\n\
Categorize skills into 'Technical', 'Soft Skills', 'Languages', 'Tools', or 'Other'.\n\
Respond with valid JSON only. No markdown code fences, no commentary.";

/// Text extraction prompt. Replace `{input}` before sending.
pub const EXTRACT_TEXT_PROMPT_TEMPLATE: &str = "Extract structured resume data from the following text.\n\n{rules}\n\n{schema}\n\nInput Text:\n{input}";

/// PDF extraction prompt. The PDF itself travels as an inline-data part.
pub const EXTRACT_PDF_PROMPT_TEMPLATE: &str =
    "Extract structured resume data from the provided PDF resume.\n\n{rules}\n\n{schema}";

/// Skill suggestion prompt. Replace `{job_title}` before sending.
pub const SUGGEST_SKILLS_PROMPT_TEMPLATE: &str = r#"List the top 10 most in-demand skills for a "{job_title}" role in the current job market.
Include a mix of Technical skills, Soft Skills, and popular Tools.
Respond with a valid JSON object only — no markdown code fences, no commentary.

JSON structure:
{
  "skills": [
    {"name": "Skill Name", "category": "Technical", "level": "Intermediate"}
  ]
}

Categories must be one of: 'Technical', 'Soft Skills', 'Languages', 'Tools', 'Other'.
Levels must be one of: 'Beginner', 'Intermediate', 'Advanced', 'Expert'."#;

/// Rewrite instruction for the professional summary.
/// Replace `{tone}` and `{industry}` (the latter may be empty).
pub const REWRITE_SUMMARY_TEMPLATE: &str =
    "Rewrite this resume summary to be {tone}{industry}. Make it impactful and concise (under 50 words). Return only the rewritten text.";

/// Rewrite instruction for an experience description.
pub const REWRITE_EXPERIENCE_TEMPLATE: &str =
    "Rewrite this job description to use strong action verbs, be {tone}{industry}, and improve clarity. Quantify achievements where possible. Use bullet points (\u{2022}) for separate items if multiple points exist. Return only the rewritten text.";
