// ABOUTME: Error types for the specification lifecycle manager
// ABOUTME: Maps collaborator failures into user-visible messages

use specgen_ai::EngineError;
use specgen_core::ValidationError;
use specgen_storage::StorageError;
use thiserror::Error;

const GENERIC_GENERATION_MESSAGE: &str = "Failed to generate the specification. Please try again.";
const GENERIC_REFINEMENT_MESSAGE: &str = "Failed to refine the section. Please try again.";

#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Refinement failed: {0}")]
    Refinement(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("No active version")]
    NoActiveVersion,

    #[error("No project loaded")]
    NoProject,

    #[error("Project {requested} is not the loaded project {loaded}")]
    ProjectMismatch { requested: String, loaded: String },

    #[error("Another operation is still in progress")]
    Busy,

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Export failed: {0}")]
    Export(#[from] serde_json::Error),
}

impl SpecError {
    pub fn from_generation(err: EngineError) -> Self {
        match err {
            EngineError::Validation(msg) => SpecError::InvalidInput(msg),
            EngineError::Upstream(msg) => SpecError::Generation(msg),
            EngineError::Storage(e) => SpecError::Storage(e),
        }
    }

    pub fn from_refinement(err: EngineError) -> Self {
        match err {
            EngineError::Validation(msg) => SpecError::InvalidInput(msg),
            EngineError::Upstream(msg) => SpecError::Refinement(msg),
            EngineError::Storage(e) => SpecError::Storage(e),
        }
    }

    /// True for failures rejected before any collaborator call was made
    pub fn is_validation(&self) -> bool {
        matches!(self, SpecError::Validation(_) | SpecError::InvalidInput(_))
    }

    /// Message suitable for showing to the user.
    /// Collaborator messages are passed through verbatim when present.
    pub fn user_message(&self) -> String {
        match self {
            SpecError::Validation(e) => e.to_string(),
            SpecError::InvalidInput(msg) => msg.clone(),
            SpecError::Generation(msg) if msg.trim().is_empty() => {
                GENERIC_GENERATION_MESSAGE.to_string()
            }
            SpecError::Generation(msg) => msg.clone(),
            SpecError::Refinement(msg) if msg.trim().is_empty() => {
                GENERIC_REFINEMENT_MESSAGE.to_string()
            }
            SpecError::Refinement(msg) => msg.clone(),
            SpecError::Storage(e) if e.is_not_found() => {
                "This specification version no longer exists. Reload the project to refresh the version list.".to_string()
            }
            SpecError::Storage(e) => e.to_string(),
            SpecError::VersionNotFound(id) => format!("Version {} no longer exists.", id),
            other => other.to_string(),
        }
    }
}

pub type SpecResult<T> = Result<T, SpecError>;
