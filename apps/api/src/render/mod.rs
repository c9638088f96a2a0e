//! Template renderer — turns a resume snapshot into a typed page model.
//!
//! `render` is pure: no IO, no clock, no randomness. The output `Document`
//! is a fixed A4 page described as ordered regions of typed blocks; the PDF
//! exporter consumes it, and the preview endpoint serializes it as-is.

use serde::Serialize;

use crate::models::resume::{ResumeData, Skill, DEFAULT_SKILL_CATEGORY};

/// The three shipped layouts. Parsing is total: an unknown id renders with
/// the creative layout rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    Modern,
    Classic,
    Creative,
}

impl TemplateId {
    pub fn parse(id: &str) -> Self {
        match id {
            "modern" => TemplateId::Modern,
            "classic" => TemplateId::Classic,
            _ => TemplateId::Creative,
        }
    }

    /// Accent color used for headings and meters.
    pub fn accent(&self) -> &'static str {
        match self {
            TemplateId::Modern => "#3b82f6",
            TemplateId::Classic => "#475569",
            TemplateId::Creative => "#8b5cf6",
        }
    }

    /// The classic layout sets in a serif face.
    pub fn serif(&self) -> bool {
        matches!(self, TemplateId::Classic)
    }

    /// Fraction of the page width given to `Left` regions.
    pub fn left_ratio(&self) -> f32 {
        match self {
            TemplateId::Modern => 1.0 / 3.0,
            TemplateId::Classic => 0.5,
            TemplateId::Creative => 2.0 / 3.0,
        }
    }
}

/// Where a region's blocks flow on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Full,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub kind: RegionKind,
    pub blocks: Vec<Block>,
}

/// The typographic vocabulary shared by all layouts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// The resume holder's name.
    Title { text: String },
    /// Creative header subtitle under the title.
    Tagline { text: String },
    /// One line of contact details.
    ContactLine { text: String },
    /// Section heading ("Experience", "Skills", ...).
    Heading { text: String },
    /// Category label inside a skills section.
    SubHeading { text: String },
    /// A dated entry: role/company or school/degree plus its date range.
    Entry {
        primary: String,
        secondary: String,
        meta: String,
    },
    Paragraph { text: String },
    /// Skill chips (modern sidebar).
    Tags { items: Vec<String> },
    /// "Category: a, b, c" (classic skills).
    LabeledLine { label: String, text: String },
    /// Named proficiency bar (creative sidebar).
    Meter {
        name: String,
        level: String,
        fill: f32,
    },
}

/// A rendered A4 page: 210 × 297 mm, column split per template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub template: TemplateId,
    pub accent: &'static str,
    pub serif: bool,
    pub left_ratio: f32,
    pub regions: Vec<Region>,
}

/// Groups skills by category in first-seen order; skills inside a category
/// keep their original order. A skill without a category lands under
/// "Technical". Flattening the groups yields every skill exactly once.
pub fn group_skills(skills: &[Skill]) -> Vec<(String, Vec<&Skill>)> {
    let mut groups: Vec<(String, Vec<&Skill>)> = Vec::new();
    for skill in skills {
        let category = skill
            .category
            .as_deref()
            .unwrap_or(DEFAULT_SKILL_CATEGORY);
        match groups.iter_mut().find(|(name, _)| name == category) {
            Some((_, members)) => members.push(skill),
            None => groups.push((category.to_string(), vec![skill])),
        }
    }
    groups
}

/// Formats `start <sep> end`, substituting `present` for the end date when
/// the position is marked current. The stored end date is ignored in that
/// case, whatever it contains.
pub fn date_range(start: &str, end: &str, current: bool, sep: &str, present: &str) -> String {
    let end = if current { present } else { end };
    format!("{start} {sep} {end}")
}

pub fn render(data: &ResumeData, template: TemplateId) -> Document {
    let regions = match template {
        TemplateId::Modern => render_modern(data),
        TemplateId::Classic => render_classic(data),
        TemplateId::Creative => render_creative(data),
    };
    Document {
        template,
        accent: template.accent(),
        serif: template.serif(),
        left_ratio: template.left_ratio(),
        regions,
    }
}

fn contact_line(blocks: &mut Vec<Block>, value: &str) {
    if !value.is_empty() {
        blocks.push(Block::ContactLine {
            text: value.to_string(),
        });
    }
}

/// Dark sidebar (contacts, skills as chips, education), main column with
/// profile and experience.
fn render_modern(data: &ResumeData) -> Vec<Region> {
    let info = &data.personal_info;

    let mut left = vec![Block::Title {
        text: info.full_name.clone(),
    }];
    contact_line(&mut left, &info.location);
    contact_line(&mut left, &info.email);
    contact_line(&mut left, &info.phone);
    contact_line(&mut left, &info.linkedin);
    contact_line(&mut left, &info.website);

    if !data.skills.is_empty() {
        left.push(Block::Heading {
            text: "Skills".to_string(),
        });
        for (category, members) in group_skills(&data.skills) {
            left.push(Block::SubHeading { text: category });
            left.push(Block::Tags {
                items: members.iter().map(|s| s.name.clone()).collect(),
            });
        }
    }

    if !data.education.is_empty() {
        left.push(Block::Heading {
            text: "Education".to_string(),
        });
        for edu in &data.education {
            left.push(Block::Entry {
                primary: edu.school.clone(),
                secondary: edu.degree.clone(),
                meta: date_range(&edu.start_date, &edu.end_date, edu.current, "-", "Present"),
            });
        }
    }

    let mut right = Vec::new();
    if !info.summary.is_empty() {
        right.push(Block::Heading {
            text: "Profile".to_string(),
        });
        right.push(Block::Paragraph {
            text: info.summary.clone(),
        });
    }
    if !data.experience.is_empty() {
        right.push(Block::Heading {
            text: "Experience".to_string(),
        });
        for exp in &data.experience {
            right.push(Block::Entry {
                primary: exp.role.clone(),
                secondary: exp.company.clone(),
                meta: date_range(&exp.start_date, &exp.end_date, exp.current, "–", "Present"),
            });
            right.push(Block::Paragraph {
                text: exp.description.clone(),
            });
        }
    }

    vec![
        Region {
            kind: RegionKind::Left,
            blocks: left,
        },
        Region {
            kind: RegionKind::Right,
            blocks: right,
        },
    ]
}

/// Centered serif header, full-width summary and work history, then
/// education and skills side by side.
fn render_classic(data: &ResumeData) -> Vec<Region> {
    let info = &data.personal_info;

    let mut full = vec![Block::Title {
        text: info.full_name.clone(),
    }];
    let contacts: Vec<&str> = [
        info.email.as_str(),
        info.phone.as_str(),
        info.location.as_str(),
        info.linkedin.as_str(),
    ]
    .into_iter()
    .filter(|v| !v.is_empty())
    .collect();
    if !contacts.is_empty() {
        full.push(Block::ContactLine {
            text: contacts.join(" • "),
        });
    }

    if !info.summary.is_empty() {
        full.push(Block::Heading {
            text: "Professional Summary".to_string(),
        });
        full.push(Block::Paragraph {
            text: info.summary.clone(),
        });
    }
    if !data.experience.is_empty() {
        full.push(Block::Heading {
            text: "Work History".to_string(),
        });
        for exp in &data.experience {
            full.push(Block::Entry {
                primary: exp.company.clone(),
                secondary: exp.role.clone(),
                meta: date_range(&exp.start_date, &exp.end_date, exp.current, "-", "Present"),
            });
            full.push(Block::Paragraph {
                text: exp.description.clone(),
            });
        }
    }

    let mut regions = vec![Region {
        kind: RegionKind::Full,
        blocks: full,
    }];

    if !data.education.is_empty() {
        let mut blocks = vec![Block::Heading {
            text: "Education".to_string(),
        }];
        for edu in &data.education {
            blocks.push(Block::Entry {
                primary: edu.school.clone(),
                secondary: edu.degree.clone(),
                meta: date_range(&edu.start_date, &edu.end_date, edu.current, "-", "Present"),
            });
        }
        regions.push(Region {
            kind: RegionKind::Left,
            blocks,
        });
    }

    if !data.skills.is_empty() {
        let mut blocks = vec![Block::Heading {
            text: "Skills".to_string(),
        }];
        for (category, members) in group_skills(&data.skills) {
            blocks.push(Block::LabeledLine {
                label: category,
                text: members
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        regions.push(Region {
            kind: RegionKind::Right,
            blocks,
        });
    }

    regions
}

/// Accent-bar header with a tagline, timeline main column, sidebar with
/// skill meters and education cards. Also the fallback for unknown template
/// ids.
fn render_creative(data: &ResumeData) -> Vec<Region> {
    let info = &data.personal_info;

    // The tagline borrows the first experience's role.
    let tagline = data
        .experience
        .first()
        .map(|exp| exp.role.clone())
        .filter(|role| !role.is_empty())
        .unwrap_or_else(|| "Professional".to_string());

    let mut full = vec![
        Block::Title {
            text: info.full_name.clone(),
        },
        Block::Tagline { text: tagline },
    ];
    contact_line(&mut full, &info.email);
    contact_line(&mut full, &info.phone);
    contact_line(&mut full, &info.location);

    let mut left = Vec::new();
    if !info.summary.is_empty() {
        left.push(Block::Heading {
            text: "About Me".to_string(),
        });
        left.push(Block::Paragraph {
            text: info.summary.clone(),
        });
    }
    if !data.experience.is_empty() {
        left.push(Block::Heading {
            text: "Experience".to_string(),
        });
        for exp in &data.experience {
            left.push(Block::Entry {
                primary: exp.role.clone(),
                secondary: exp.company.clone(),
                meta: date_range(&exp.start_date, &exp.end_date, exp.current, "—", "Now"),
            });
            left.push(Block::Paragraph {
                text: exp.description.clone(),
            });
        }
    }

    let mut right = Vec::new();
    if !data.skills.is_empty() {
        right.push(Block::Heading {
            text: "Skills".to_string(),
        });
        for (category, members) in group_skills(&data.skills) {
            right.push(Block::SubHeading { text: category });
            for skill in members {
                right.push(Block::Meter {
                    name: skill.name.clone(),
                    level: skill.level.to_string(),
                    fill: skill.level.fill(),
                });
            }
        }
    }
    if !data.education.is_empty() {
        right.push(Block::Heading {
            text: "Education".to_string(),
        });
        for edu in &data.education {
            // This card never shows "Now": the stored end date wins even for
            // an in-progress degree.
            right.push(Block::Entry {
                primary: edu.school.clone(),
                secondary: edu.degree.clone(),
                meta: format!("{} - {}", edu.start_date, edu.end_date),
            });
        }
    }

    vec![
        Region {
            kind: RegionKind::Full,
            blocks: full,
        },
        Region {
            kind: RegionKind::Left,
            blocks: left,
        },
        Region {
            kind: RegionKind::Right,
            blocks: right,
        },
    ]
}
