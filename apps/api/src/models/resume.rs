//! Resume data model — the in-memory editing unit and its persisted envelope.
//!
//! Payload types serialize as camelCase JSON; this is the exact shape stored
//! in the `resumes.data` column and expected from the extraction API, so the
//! two never need a translation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact and headline fields. No field is required to be non-empty;
/// the renderer skips whatever is blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub website: String,
    pub summary: String,
    pub location: String,
}

/// A single work-history entry. `id` is caller-assigned and unique within
/// the list; it exists for list keying only, never for cross-list lookup.
/// Entries keep insertion order — no chronological sort is implied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default)]
    pub id: String,
    pub company: String,
    pub role: String,
    /// Year-month string, e.g. "2021-03".
    pub start_date: String,
    /// Ignored by rendering when `current` is true.
    pub end_date: String,
    #[serde(default)]
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default)]
    pub id: String,
    pub school: String,
    pub degree: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub current: bool,
}

/// The four ordered proficiency ranks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
            SkillLevel::Expert => "Expert",
        }
    }

    /// Meter fill used by the creative template's proficiency bars.
    pub fn fill(&self) -> f32 {
        match self {
            SkillLevel::Expert => 1.0,
            SkillLevel::Advanced => 0.75,
            SkillLevel::Intermediate => 0.5,
            SkillLevel::Beginner => 0.25,
        }
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub level: SkillLevel,
    /// Free-form grouping label; `None` renders under "Technical".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Default category applied at render time when a skill carries none.
pub const DEFAULT_SKILL_CATEGORY: &str = "Technical";

/// The complete in-memory resume. Round-trips through persistence as an
/// opaque JSON blob; the store never looks inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl ResumeData {
    /// The blank resume an editor session starts from.
    pub fn blank() -> Self {
        ResumeData {
            personal_info: PersonalInfo {
                full_name: "Your Name".to_string(),
                ..PersonalInfo::default()
            },
            ..ResumeData::default()
        }
    }
}

/// A persisted resume. `id` is assigned by the store on first save and is
/// immutable afterwards; `updated_at` is rewritten on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeEntry {
    pub id: i64,
    pub name: String,
    pub template_id: String,
    pub data: ResumeData,
    pub updated_at: DateTime<Utc>,
}

/// Save input: an entry minus the store-owned id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDraft {
    pub name: String,
    pub template_id: String,
    pub data: ResumeData,
}

/// Partial resume returned by the extraction API. Only keys present in the
/// response are populated; absent keys stay `None` and never overwrite
/// existing editor state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumePatch {
    pub personal_info: Option<PersonalInfoPatch>,
    pub experience: Option<Vec<Experience>>,
    pub education: Option<Vec<Education>>,
    pub skills: Option<Vec<Skill>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfoPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
}

impl ResumePatch {
    /// Backfills missing list-element ids with fresh UUIDs. Extractor output
    /// carries no ids; everything downstream assumes every element has one.
    pub fn ensure_ids(&mut self) {
        if let Some(experience) = self.experience.as_mut() {
            for exp in experience.iter_mut() {
                if exp.id.is_empty() {
                    exp.id = Uuid::new_v4().to_string();
                }
            }
        }
        if let Some(education) = self.education.as_mut() {
            for edu in education.iter_mut() {
                if edu.id.is_empty() {
                    edu.id = Uuid::new_v4().to_string();
                }
            }
        }
        if let Some(skills) = self.skills.as_mut() {
            for skill in skills.iter_mut() {
                if skill.id.is_empty() {
                    skill.id = Uuid::new_v4().to_string();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_data_round_trips_camel_case() {
        let data = ResumeData {
            personal_info: PersonalInfo {
                full_name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                ..PersonalInfo::default()
            },
            experience: vec![Experience {
                id: "e1".to_string(),
                company: "Analytical Engines Ltd".to_string(),
                role: "Programmer".to_string(),
                start_date: "1842-01".to_string(),
                end_date: "1843-09".to_string(),
                current: false,
                description: "Wrote the first published algorithm.".to_string(),
            }],
            education: vec![],
            skills: vec![Skill {
                id: "s1".to_string(),
                name: "Mathematics".to_string(),
                level: SkillLevel::Expert,
                category: None,
            }],
        };

        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"fullName\""));
        assert!(json.contains("\"startDate\""));
        assert!(json.contains("\"Expert\""));

        let back: ResumeData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_extractor_output_without_ids_parses() {
        // The extraction schema has no id fields at all.
        let json = r#"{
            "personalInfo": {"email": "ada@example.com"},
            "experience": [{
                "company": "Analytical Engines Ltd",
                "role": "Programmer",
                "startDate": "1842-01",
                "endDate": "",
                "current": true,
                "description": "Notes on the engine."
            }],
            "skills": [{"name": "Mathematics", "level": "Expert", "category": "Technical"}]
        }"#;

        let mut patch: ResumePatch = serde_json::from_str(json).unwrap();
        assert!(patch.education.is_none());
        assert_eq!(
            patch.personal_info.as_ref().unwrap().email.as_deref(),
            Some("ada@example.com")
        );
        assert!(patch.personal_info.as_ref().unwrap().full_name.is_none());

        patch.ensure_ids();
        assert!(!patch.experience.as_ref().unwrap()[0].id.is_empty());
        assert!(!patch.skills.as_ref().unwrap()[0].id.is_empty());
    }

    #[test]
    fn test_skill_level_order_and_fill() {
        assert!(SkillLevel::Beginner < SkillLevel::Intermediate);
        assert!(SkillLevel::Advanced < SkillLevel::Expert);
        assert_eq!(SkillLevel::Expert.fill(), 1.0);
        assert_eq!(SkillLevel::Beginner.fill(), 0.25);
        assert_eq!(SkillLevel::default(), SkillLevel::Intermediate);
    }

    #[test]
    fn test_blank_resume_has_placeholder_name_only() {
        let blank = ResumeData::blank();
        assert_eq!(blank.personal_info.full_name, "Your Name");
        assert!(blank.personal_info.email.is_empty());
        assert!(blank.experience.is_empty());
        assert!(blank.education.is_empty());
        assert!(blank.skills.is_empty());
    }
}
