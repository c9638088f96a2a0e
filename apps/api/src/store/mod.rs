//! Persistence adapter — a single-file SQLite store behind a narrow interface.
//!
//! The whole catalog lives in one database file owned by one pool capped at a
//! single connection; nothing else in the application touches SQL. Resume
//! payloads are stored as opaque JSON text in `resumes.data` and parsed back
//! on the way out; rows whose payload no longer parses are skipped with a
//! warning instead of poisoning the catalog.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::resume::{ResumeData, ResumeDraft, ResumeEntry};
use crate::models::template::{self, Template};

const CREATE_RESUMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS resumes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    template_id TEXT NOT NULL,
    data        TEXT NOT NULL,
    updated_at  TEXT NOT NULL
)
"#;

const CREATE_TEMPLATES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS templates (
    id              TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    description     TEXT,
    thumbnail_color TEXT
)
"#;

/// Raw `resumes` row before the JSON payload is parsed.
#[derive(Debug, FromRow)]
struct ResumeRow {
    id: i64,
    name: String,
    template_id: String,
    data: String,
    updated_at: DateTime<Utc>,
}

impl ResumeRow {
    /// Parses the payload; `None` (with a warning) when the stored JSON is
    /// corrupt, so one bad row never breaks a listing.
    fn into_entry(self) -> Option<ResumeEntry> {
        match serde_json::from_str::<ResumeData>(&self.data) {
            Ok(data) => Some(ResumeEntry {
                id: self.id,
                name: self.name,
                template_id: self.template_id,
                data,
                updated_at: self.updated_at,
            }),
            Err(e) => {
                warn!("Skipping resume row {} with unparsable payload: {e}", self.id);
                None
            }
        }
    }
}

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (or creates) the store file, creating the schema and seeding the
    /// template catalog on first run. Idempotent: reopening an existing file
    /// restores all prior state untouched.
    pub async fn open(path: &Path) -> Result<Self> {
        info!("Opening resume store at {}", path.display());

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("failed to open the resume store")?;

        let store = Store { pool };
        store.init_schema().await?;
        store.seed_templates().await?;

        info!("Resume store ready");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(CREATE_RESUMES_TABLE)
            .execute(&self.pool)
            .await
            .context("failed to create resumes table")?;
        sqlx::query(CREATE_TEMPLATES_TABLE)
            .execute(&self.pool)
            .await
            .context("failed to create templates table")?;
        Ok(())
    }

    /// Seeds the fixed three-entry template catalog. `INSERT OR IGNORE`
    /// keeps repeat startups from duplicating or overwriting rows.
    async fn seed_templates(&self) -> Result<()> {
        for t in template::catalog() {
            sqlx::query(
                "INSERT OR IGNORE INTO templates (id, name, description, thumbnail_color) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&t.id)
            .bind(&t.name)
            .bind(&t.description)
            .bind(&t.thumbnail_color)
            .execute(&self.pool)
            .await
            .context("failed to seed template catalog")?;
        }
        Ok(())
    }

    /// All saved resumes, most recently updated first. Corrupt rows are
    /// dropped with a warning, never surfaced as errors.
    pub async fn list_resumes(&self) -> Result<Vec<ResumeEntry>, sqlx::Error> {
        let rows: Vec<ResumeRow> =
            sqlx::query_as("SELECT * FROM resumes ORDER BY updated_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().filter_map(ResumeRow::into_entry).collect())
    }

    /// A single resume by id; `None` when absent or unparsable.
    pub async fn get_resume(&self, id: i64) -> Result<Option<ResumeEntry>, sqlx::Error> {
        let row: Option<ResumeRow> = sqlx::query_as("SELECT * FROM resumes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.and_then(ResumeRow::into_entry))
    }

    pub async fn list_templates(&self) -> Result<Vec<Template>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM templates").fetch_all(&self.pool).await
    }

    /// Inserts a new row (fresh id) when `existing_id` is `None`, otherwise
    /// updates that row in place and refreshes its timestamp. Returns the
    /// resulting id either way.
    pub async fn save_resume(
        &self,
        draft: &ResumeDraft,
        existing_id: Option<i64>,
    ) -> Result<i64, AppError> {
        let data = serde_json::to_string(&draft.data).map_err(|e| {
            AppError::Internal(anyhow::Error::new(e).context("serialize resume payload"))
        })?;
        let now = Utc::now();

        match existing_id {
            Some(id) => {
                sqlx::query(
                    "UPDATE resumes SET name = ?, template_id = ?, data = ?, updated_at = ? \
                     WHERE id = ?",
                )
                .bind(&draft.name)
                .bind(&draft.template_id)
                .bind(&data)
                .bind(now)
                .bind(id)
                .execute(&self.pool)
                .await?;
                Ok(id)
            }
            None => {
                let result = sqlx::query(
                    "INSERT INTO resumes (name, template_id, data, updated_at) \
                     VALUES (?, ?, ?, ?)",
                )
                .bind(&draft.name)
                .bind(&draft.template_id)
                .bind(&data)
                .bind(now)
                .execute(&self.pool)
                .await?;
                Ok(result.last_insert_rowid())
            }
        }
    }

    /// Removes the row if present; deleting an unknown id is a no-op.
    pub async fn delete_resume(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM resumes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Experience, PersonalInfo, Skill, SkillLevel};

    async fn open_temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("store.sqlite")).await.unwrap();
        (dir, store)
    }

    fn sample_data() -> ResumeData {
        ResumeData {
            personal_info: PersonalInfo {
                full_name: "Grace Hopper".to_string(),
                email: "grace@example.com".to_string(),
                summary: "Compiler pioneer.".to_string(),
                ..PersonalInfo::default()
            },
            experience: vec![Experience {
                id: "e1".to_string(),
                company: "US Navy".to_string(),
                role: "Rear Admiral".to_string(),
                start_date: "1943-12".to_string(),
                end_date: "1986-08".to_string(),
                current: false,
                description: "Led COBOL standardization.".to_string(),
            }],
            education: vec![],
            skills: vec![Skill {
                id: "s1".to_string(),
                name: "COBOL".to_string(),
                level: SkillLevel::Expert,
                category: Some("Languages".to_string()),
            }],
        }
    }

    fn draft(name: &str, template_id: &str, data: ResumeData) -> ResumeDraft {
        ResumeDraft {
            name: name.to_string(),
            template_id: template_id.to_string(),
            data,
        }
    }

    #[tokio::test]
    async fn test_open_seeds_template_catalog() {
        let (_dir, store) = open_temp_store().await;
        let templates = store.list_templates().await.unwrap();
        assert_eq!(templates.len(), 3);
        assert!(templates.iter().any(|t| t.id == "modern"));
    }

    #[tokio::test]
    async fn test_reopen_does_not_duplicate_templates_or_lose_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.sqlite");

        let store = Store::open(&path).await.unwrap();
        store
            .save_resume(&draft("Keep Me", "classic", sample_data()), None)
            .await
            .unwrap();
        drop(store);

        let reopened = Store::open(&path).await.unwrap();
        assert_eq!(reopened.list_templates().await.unwrap().len(), 3);
        let resumes = reopened.list_resumes().await.unwrap();
        assert_eq!(resumes.len(), 1);
        assert_eq!(resumes[0].name, "Keep Me");
    }

    #[tokio::test]
    async fn test_save_and_list_round_trips_resume_data() {
        let (_dir, store) = open_temp_store().await;
        let data = sample_data();

        let id = store
            .save_resume(&draft("My Resume", "modern", data.clone()), None)
            .await
            .unwrap();

        let resumes = store.list_resumes().await.unwrap();
        assert_eq!(resumes.len(), 1);
        assert_eq!(resumes[0].id, id);
        assert_eq!(resumes[0].name, "My Resume");
        assert_eq!(resumes[0].template_id, "modern");
        assert_eq!(resumes[0].data, data);
    }

    #[tokio::test]
    async fn test_save_without_id_assigns_fresh_ids() {
        let (_dir, store) = open_temp_store().await;

        let first = store
            .save_resume(&draft("One", "modern", sample_data()), None)
            .await
            .unwrap();
        let second = store
            .save_resume(&draft("Two", "classic", sample_data()), None)
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(store.list_resumes().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_save_with_id_updates_only_that_row() {
        let (_dir, store) = open_temp_store().await;

        let keep = store
            .save_resume(&draft("Untouched", "modern", sample_data()), None)
            .await
            .unwrap();
        let target = store
            .save_resume(&draft("Before", "modern", sample_data()), None)
            .await
            .unwrap();

        let mut updated = sample_data();
        updated.personal_info.location = "Arlington, VA".to_string();
        let returned = store
            .save_resume(&draft("After", "creative", updated.clone()), Some(target))
            .await
            .unwrap();
        assert_eq!(returned, target);

        let resumes = store.list_resumes().await.unwrap();
        assert_eq!(resumes.len(), 2);

        let target_row = resumes.iter().find(|r| r.id == target).unwrap();
        assert_eq!(target_row.name, "After");
        assert_eq!(target_row.template_id, "creative");
        assert_eq!(target_row.data, updated);

        let keep_row = resumes.iter().find(|r| r.id == keep).unwrap();
        assert_eq!(keep_row.name, "Untouched");
        assert_eq!(keep_row.template_id, "modern");
    }

    #[tokio::test]
    async fn test_update_refreshes_timestamp_and_list_order() {
        let (_dir, store) = open_temp_store().await;

        let older = store
            .save_resume(&draft("Older", "modern", sample_data()), None)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let _newer = store
            .save_resume(&draft("Newer", "modern", sample_data()), None)
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .save_resume(&draft("Older (edited)", "modern", sample_data()), Some(older))
            .await
            .unwrap();

        let resumes = store.list_resumes().await.unwrap();
        assert_eq!(resumes[0].name, "Older (edited)");
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_noop() {
        let (_dir, store) = open_temp_store().await;
        store
            .save_resume(&draft("Survivor", "modern", sample_data()), None)
            .await
            .unwrap();

        store.delete_resume(9999).await.unwrap();
        assert_eq!(store.list_resumes().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let (_dir, store) = open_temp_store().await;
        let id = store
            .save_resume(&draft("Doomed", "modern", sample_data()), None)
            .await
            .unwrap();

        store.delete_resume(id).await.unwrap();
        assert!(store.list_resumes().await.unwrap().is_empty());
        assert!(store.get_resume(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_skipped_not_fatal() {
        let (_dir, store) = open_temp_store().await;
        store
            .save_resume(&draft("Good", "modern", sample_data()), None)
            .await
            .unwrap();

        sqlx::query(
            "INSERT INTO resumes (name, template_id, data, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind("Corrupt")
        .bind("modern")
        .bind("{not valid json")
        .bind(Utc::now())
        .execute(&store.pool)
        .await
        .unwrap();

        let resumes = store.list_resumes().await.unwrap();
        assert_eq!(resumes.len(), 1);
        assert_eq!(resumes[0].name, "Good");
    }

    #[tokio::test]
    async fn test_first_save_scenario_catalog_has_one_entry() {
        let (_dir, store) = open_temp_store().await;
        assert!(store.list_resumes().await.unwrap().is_empty());

        let id = store
            .save_resume(&draft("My Resume", "modern", ResumeData::blank()), None)
            .await
            .unwrap();

        let resumes = store.list_resumes().await.unwrap();
        assert_eq!(resumes.len(), 1);
        assert_eq!(resumes[0].id, id);
        assert_eq!(resumes[0].name, "My Resume");
        assert_eq!(resumes[0].template_id, "modern");
        assert!(resumes[0].updated_at.timestamp() > 0);
    }
}
