//! The static template catalog. Seeded into the store once on first run and
//! never created or mutated at runtime.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub thumbnail_color: String,
}

/// The three shipped layouts. `modern` is the editor default.
pub fn catalog() -> Vec<Template> {
    vec![
        Template {
            id: "modern".to_string(),
            name: "Modern Clean".to_string(),
            description: "A clean, minimalist design suitable for tech and creative roles."
                .to_string(),
            thumbnail_color: "#3b82f6".to_string(),
        },
        Template {
            id: "classic".to_string(),
            name: "Executive Classic".to_string(),
            description: "Traditional serif layout for business and management roles.".to_string(),
            thumbnail_color: "#475569".to_string(),
        },
        Template {
            id: "creative".to_string(),
            name: "Bold Creative".to_string(),
            description: "Stand out with bold headers and a unique sidebar layout.".to_string(),
            thumbnail_color: "#8b5cf6".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_three_fixed_entries() {
        let templates = catalog();
        assert_eq!(templates.len(), 3);
        let ids: Vec<&str> = templates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["modern", "classic", "creative"]);
    }

    #[test]
    fn test_catalog_colors_are_hex() {
        for t in catalog() {
            assert!(t.thumbnail_color.starts_with('#'));
            assert_eq!(t.thumbnail_color.len(), 7);
        }
    }
}
