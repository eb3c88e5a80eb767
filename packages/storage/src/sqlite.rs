// ABOUTME: SQLite implementation of the DocumentStore trait
// ABOUTME: Stores one row per specification version with creation-ordered listing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use specgen_core::{generate_id, GeneratedSections, NewSpecificationVersion, SpecificationVersion};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{migrate::MigrateDatabase, Row};
use tracing::{debug, info};

use crate::{
    validate_new_version, validate_update, DocumentStore, StorageConfig, StorageError,
    StorageResult,
};

const CREATE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS spec_versions (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    requirement_description TEXT NOT NULL,
    interface_spec TEXT NOT NULL DEFAULT '',
    schema_spec TEXT NOT NULL DEFAULT '',
    interaction_diagram TEXT NOT NULL DEFAULT '',
    sample_data TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_spec_versions_project
    ON spec_versions (project_id, created_at);
"#;

const SELECT_COLUMNS: &str = "id, project_id, requirement_description, interface_spec, schema_spec, interaction_diagram, sample_data, created_at";

/// SQLite implementation of DocumentStore
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Open (creating if needed) the database described by `config`
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let database_url = format!("sqlite:{}", config.path.display());

        if !sqlx::Sqlite::database_exists(&database_url).await? {
            debug!("Creating database at: {}", database_url);
            sqlx::Sqlite::create_database(&database_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.busy_timeout_seconds))
            .connect(&database_url)
            .await?;

        if config.enable_wal {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&pool)
                .await?;
        }

        sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        info!("Opened document store at {}", config.path.display());
        Ok(store)
    }

    /// Wrap an existing pool; call `initialize` before use
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the schema if it does not exist yet
    pub async fn initialize(&self) -> StorageResult<()> {
        sqlx::raw_sql(CREATE_SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn get_version(&self, version_id: &str) -> StorageResult<SpecificationVersion> {
        let query = format!("SELECT {} FROM spec_versions WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(version_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound(version_id.to_string()))?;
        row_to_version(&row)
    }
}

/// Convert a database row to a SpecificationVersion
fn row_to_version(row: &SqliteRow) -> StorageResult<SpecificationVersion> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(SpecificationVersion::from_parts(
        row.try_get("id")?,
        row.try_get("project_id")?,
        created_at,
        row.try_get("requirement_description")?,
        GeneratedSections {
            interface_spec: row.try_get("interface_spec")?,
            schema_spec: row.try_get("schema_spec")?,
            interaction_diagram: row.try_get("interaction_diagram")?,
            sample_data: row.try_get("sample_data")?,
        },
    ))
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn list_versions(&self, project_id: &str) -> StorageResult<Vec<SpecificationVersion>> {
        let query = format!(
            "SELECT {} FROM spec_versions WHERE project_id = ? ORDER BY created_at ASC, rowid ASC",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_version).collect()
    }

    async fn create_version(
        &self,
        input: NewSpecificationVersion,
    ) -> StorageResult<SpecificationVersion> {
        validate_new_version(&input)?;

        let id = generate_id();
        let now = Utc::now();
        let sections = &input.sections;

        sqlx::query(
            r#"
            INSERT INTO spec_versions (id, project_id, requirement_description, interface_spec, schema_spec, interaction_diagram, sample_data, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.project_id)
        .bind(&input.requirement_description)
        .bind(&sections.interface_spec)
        .bind(&sections.schema_spec)
        .bind(&sections.interaction_diagram)
        .bind(&sections.sample_data)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!("Created version {} for project {}", id, input.project_id);
        self.get_version(&id).await
    }

    async fn update_version(
        &self,
        version_id: &str,
        record: &SpecificationVersion,
    ) -> StorageResult<SpecificationVersion> {
        let current = self.get_version(version_id).await?;
        validate_update(&current, record)?;

        sqlx::query(
            r#"
            UPDATE spec_versions
            SET interface_spec = ?, schema_spec = ?, interaction_diagram = ?, sample_data = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.interface_spec)
        .bind(&record.schema_spec)
        .bind(&record.interaction_diagram)
        .bind(&record.sample_data)
        .bind(version_id)
        .execute(&self.pool)
        .await?;

        debug!("Updated version {}", version_id);
        self.get_version(version_id).await
    }

    async fn delete_version(&self, version_id: &str) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM spec_versions WHERE id = ?")
            .bind(version_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(version_id.to_string()));
        }

        debug!("Deleted version {}", version_id);
        Ok(())
    }
}
