// ABOUTME: In-memory DocumentStore backed by a lock-protected vector
// ABOUTME: Keeps insertion order, used for tests and ephemeral sessions

use async_trait::async_trait;
use chrono::Utc;
use specgen_core::{generate_id, NewSpecificationVersion, SpecificationVersion};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{validate_new_version, validate_update, DocumentStore, StorageError, StorageResult};

#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    versions: RwLock<Vec<SpecificationVersion>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing versions (kept in the given order)
    pub fn with_versions(versions: Vec<SpecificationVersion>) -> Self {
        Self {
            versions: RwLock::new(versions),
        }
    }

    pub async fn len(&self) -> usize {
        self.versions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.versions.read().await.is_empty()
    }

    pub async fn get_version(&self, version_id: &str) -> StorageResult<SpecificationVersion> {
        self.versions
            .read()
            .await
            .iter()
            .find(|v| v.id == version_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(version_id.to_string()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list_versions(&self, project_id: &str) -> StorageResult<Vec<SpecificationVersion>> {
        Ok(self
            .versions
            .read()
            .await
            .iter()
            .filter(|v| v.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn create_version(
        &self,
        input: NewSpecificationVersion,
    ) -> StorageResult<SpecificationVersion> {
        validate_new_version(&input)?;

        let version = SpecificationVersion::from_parts(
            generate_id(),
            input.project_id,
            Utc::now(),
            input.requirement_description,
            input.sections,
        );

        debug!(
            "Created version {} for project {}",
            version.id, version.project_id
        );
        self.versions.write().await.push(version.clone());
        Ok(version)
    }

    async fn update_version(
        &self,
        version_id: &str,
        record: &SpecificationVersion,
    ) -> StorageResult<SpecificationVersion> {
        let mut versions = self.versions.write().await;
        let stored = versions
            .iter_mut()
            .find(|v| v.id == version_id)
            .ok_or_else(|| StorageError::NotFound(version_id.to_string()))?;

        validate_update(stored, record)?;

        stored.interface_spec = record.interface_spec.clone();
        stored.schema_spec = record.schema_spec.clone();
        stored.interaction_diagram = record.interaction_diagram.clone();
        stored.sample_data = record.sample_data.clone();

        debug!("Updated version {}", version_id);
        Ok(stored.clone())
    }

    async fn delete_version(&self, version_id: &str) -> StorageResult<()> {
        let mut versions = self.versions.write().await;
        let index = versions
            .iter()
            .position(|v| v.id == version_id)
            .ok_or_else(|| StorageError::NotFound(version_id.to_string()))?;
        versions.remove(index);

        debug!("Deleted version {}", version_id);
        Ok(())
    }
}
