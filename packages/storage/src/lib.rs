// ABOUTME: Document store abstraction for specification versions
// ABOUTME: Provides the DocumentStore trait plus in-memory and SQLite backends

use async_trait::async_trait;
use specgen_core::{NewSpecificationVersion, SpecificationVersion};

pub mod config;
pub mod error;
pub mod memory;
pub mod sqlite;

pub use config::StorageConfig;
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

/// Persistence contract for specification versions.
///
/// Implementations keep versions in creation order per project, never move a
/// version between projects, and treat the requirement description and
/// creation timestamp as immutable.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List a project's versions ordered by creation (oldest first)
    async fn list_versions(&self, project_id: &str) -> StorageResult<Vec<SpecificationVersion>>;

    /// Persist a new version and return it with its assigned id and timestamp
    async fn create_version(
        &self,
        input: NewSpecificationVersion,
    ) -> StorageResult<SpecificationVersion>;

    /// Replace the section bodies of an existing version with those of `record`
    async fn update_version(
        &self,
        version_id: &str,
        record: &SpecificationVersion,
    ) -> StorageResult<SpecificationVersion>;

    async fn delete_version(&self, version_id: &str) -> StorageResult<()>;
}

/// Shared validation for create inputs
pub(crate) fn validate_new_version(input: &NewSpecificationVersion) -> StorageResult<()> {
    if input.project_id.trim().is_empty() {
        return Err(StorageError::InvalidInput(
            "Project id is required".to_string(),
        ));
    }
    specgen_core::validate_requirement(&input.requirement_description)?;
    let sections = &input.sections;
    specgen_core::validate_section_size(&sections.interface_spec, "interfaceSpec")?;
    specgen_core::validate_section_size(&sections.schema_spec, "schemaSpec")?;
    specgen_core::validate_section_size(&sections.interaction_diagram, "interactionDiagram")?;
    specgen_core::validate_section_size(&sections.sample_data, "sampleData")?;
    Ok(())
}

/// Shared validation for update records against the stored version
pub(crate) fn validate_update(
    stored: &SpecificationVersion,
    record: &SpecificationVersion,
) -> StorageResult<()> {
    if stored.id != record.id {
        return Err(StorageError::InvalidInput(format!(
            "Record {} cannot be written to version {}",
            record.id, stored.id
        )));
    }
    if stored.project_id != record.project_id {
        return Err(StorageError::InvalidInput(format!(
            "Version {} belongs to project {} and cannot be moved to {}",
            stored.id, stored.project_id, record.project_id
        )));
    }
    for kind in specgen_core::SectionKind::ALL {
        specgen_core::validate_section_size(record.section(kind), kind.field_name())?;
    }
    Ok(())
}
