// ABOUTME: Version controller owning the loaded project's version list and active selection
// ABOUTME: Handles load, generation, selection, confirmed deletion and list reconciliation

use std::sync::Arc;

use serde::Serialize;
use specgen_ai::{EngineResult, GenerationService};
use specgen_core::{validate_requirement, ProjectRef, SpecificationVersion};
use specgen_storage::DocumentStore;
use tracing::{debug, error, info, warn};

use crate::call::Resolution;
use crate::error::{SpecError, SpecResult};

/// Replace the entry with the same id as `updated`; other entries and order are kept
pub fn replace_in_list(
    list: &[SpecificationVersion],
    updated: &SpecificationVersion,
) -> Vec<SpecificationVersion> {
    list.iter()
        .map(|v| {
            if v.id == updated.id {
                updated.clone()
            } else {
                v.clone()
            }
        })
        .collect()
}

/// Entry for a version picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionOption {
    pub id: String,
    pub label: String,
    pub active: bool,
}

/// Issued by `begin_generation`; carries the epoch the request belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    pub epoch: u64,
    pub project_id: String,
    pub requirement: String,
}

/// Proof that the user was asked before deleting. Dropping it declines the delete.
#[must_use = "dropping a confirmation declines the delete"]
#[derive(Debug, PartialEq, Eq)]
pub struct DeleteConfirmation {
    version_id: String,
    epoch: u64,
}

impl DeleteConfirmation {
    pub fn version_id(&self) -> &str {
        &self.version_id
    }
}

pub struct VersionController {
    store: Arc<dyn DocumentStore>,
    generator: Arc<dyn GenerationService>,
    project: Option<ProjectRef>,
    versions: Vec<SpecificationVersion>,
    active_id: Option<String>,
    epoch: u64,
    generating: bool,
}

impl VersionController {
    pub fn new(store: Arc<dyn DocumentStore>, generator: Arc<dyn GenerationService>) -> Self {
        Self {
            store,
            generator,
            project: None,
            versions: Vec::new(),
            active_id: None,
            epoch: 0,
            generating: false,
        }
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    pub fn project(&self) -> Option<&ProjectRef> {
        self.project.as_ref()
    }

    pub fn versions(&self) -> &[SpecificationVersion] {
        &self.versions
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&SpecificationVersion> {
        let id = self.active_id.as_deref()?;
        self.versions.iter().find(|v| v.id == id)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn contains(&self, version_id: &str) -> bool {
        self.versions.iter().any(|v| v.id == version_id)
    }

    /// Load a project's versions, oldest first, and activate the newest.
    /// Starts a new epoch so results of calls issued before the load are ignored.
    pub async fn load_versions(&mut self, project: ProjectRef) -> SpecResult<()> {
        self.epoch += 1;
        self.versions.clear();
        self.active_id = None;
        self.generating = false;
        let project_id = project.id.clone();
        self.project = Some(project);

        let mut versions = self.store.list_versions(&project_id).await.map_err(|e| {
            error!("Failed to load versions for project {}: {}", project_id, e);
            SpecError::Storage(e)
        })?;

        // Stable, so equal timestamps keep the store's order
        versions.sort_by_key(|v| v.created_at);
        self.active_id = versions.last().map(|v| v.id.clone());
        self.versions = versions;

        info!(
            "Loaded {} versions for project {} (epoch {})",
            self.versions.len(),
            project_id,
            self.epoch
        );
        Ok(())
    }

    /// Validate a generation request and mark generation as in flight
    pub fn begin_generation(
        &mut self,
        project_id: &str,
        requirement: &str,
    ) -> SpecResult<GenerationTicket> {
        validate_requirement(requirement)?;

        let loaded = self.project.as_ref().ok_or(SpecError::NoProject)?;
        if loaded.id != project_id {
            return Err(SpecError::ProjectMismatch {
                requested: project_id.to_string(),
                loaded: loaded.id.clone(),
            });
        }
        if self.generating {
            return Err(SpecError::Busy);
        }

        self.generating = true;
        debug!("Generation started for project {}", project_id);
        Ok(GenerationTicket {
            epoch: self.epoch,
            project_id: project_id.to_string(),
            requirement: requirement.to_string(),
        })
    }

    /// Append a generated version and make it active
    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        result: EngineResult<SpecificationVersion>,
    ) -> SpecResult<Resolution> {
        if ticket.epoch != self.epoch {
            warn!(
                "Discarding generation result for project {} from epoch {} (current {})",
                ticket.project_id, ticket.epoch, self.epoch
            );
            return Ok(Resolution::Discarded);
        }
        self.generating = false;

        let version = result.map_err(|e| {
            error!("Generation failed for project {}: {}", ticket.project_id, e);
            SpecError::from_generation(e)
        })?;

        info!(
            "Version {} generated for project {}",
            version.id, ticket.project_id
        );
        self.active_id = Some(version.id.clone());
        self.versions.push(version);
        Ok(Resolution::Applied)
    }

    /// Generate a new version and wait for it inline
    pub async fn create_version(
        &mut self,
        project_id: &str,
        requirement: &str,
    ) -> SpecResult<Resolution> {
        let ticket = self.begin_generation(project_id, requirement)?;
        let result = self
            .generator
            .generate(&ticket.project_id, &ticket.requirement)
            .await;
        self.finish_generation(ticket, result)
    }

    /// Activate the matching version; returns false (and changes nothing) when unknown
    pub fn select_version(&mut self, version_id: &str) -> bool {
        if !self.contains(version_id) {
            debug!("Ignoring selection of unknown version {}", version_id);
            return false;
        }
        self.active_id = Some(version_id.to_string());
        true
    }

    pub fn request_delete(&self, version_id: &str) -> SpecResult<DeleteConfirmation> {
        if !self.contains(version_id) {
            return Err(SpecError::VersionNotFound(version_id.to_string()));
        }
        Ok(DeleteConfirmation {
            version_id: version_id.to_string(),
            epoch: self.epoch,
        })
    }

    /// Delete a confirmed version. The active version is kept unless it was the
    /// one deleted, in which case the newest remaining version becomes active.
    pub async fn confirm_delete(&mut self, confirmation: DeleteConfirmation) -> SpecResult<()> {
        let version_id = confirmation.version_id;
        if confirmation.epoch != self.epoch || !self.contains(&version_id) {
            return Err(SpecError::VersionNotFound(version_id));
        }

        self.store.delete_version(&version_id).await.map_err(|e| {
            error!("Failed to delete version {}: {}", version_id, e);
            SpecError::Storage(e)
        })?;

        self.versions.retain(|v| v.id != version_id);
        if self.active_id.as_deref() == Some(version_id.as_str()) {
            self.active_id = self.versions.last().map(|v| v.id.clone());
        }
        info!("Deleted version {}", version_id);
        Ok(())
    }

    /// Reconcile a persisted record into the list; false when the id is not loaded
    pub fn replace_version(&mut self, updated: &SpecificationVersion) -> bool {
        if !self.contains(&updated.id) {
            return false;
        }
        self.versions = replace_in_list(&self.versions, updated);
        true
    }

    /// Picker entries labelled `v{n} - HH:MM:SS` in creation order
    pub fn version_options(&self) -> Vec<VersionOption> {
        self.versions
            .iter()
            .enumerate()
            .map(|(idx, v)| VersionOption {
                id: v.id.clone(),
                label: format!("v{} - {}", idx + 1, v.created_at.format("%H:%M:%S")),
                active: self.active_id.as_deref() == Some(v.id.as_str()),
            })
            .collect()
    }
}
