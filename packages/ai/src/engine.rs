// ABOUTME: Generation and refinement collaborator traits plus the AI-backed engine
// ABOUTME: Generation persists new versions through a DocumentStore; refinement returns text only

use std::sync::Arc;

use async_trait::async_trait;
use specgen_core::{
    validate_instruction, validate_requirement, NewSpecificationVersion, SectionKind,
    SpecificationVersion, ValidationError,
};
use specgen_storage::{DocumentStore, StorageError};
use thiserror::Error;
use tracing::{error, info};

use crate::parsing::{parse_generated_sections, strip_code_fences};
use crate::prompts::{
    generation_prompt, refinement_prompt, GENERATION_SYSTEM_PROMPT, REFINEMENT_SYSTEM_PROMPT,
};
use crate::service::{AIService, AIServiceError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Upstream generation/refinement failure; the message is shown to users verbatim
    #[error("{0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<AIServiceError> for EngineError {
    fn from(err: AIServiceError) -> Self {
        EngineError::Upstream(err.to_string())
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Validation(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Produces a brand-new, persisted specification version from requirement prose
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(
        &self,
        project_id: &str,
        requirement: &str,
    ) -> EngineResult<SpecificationVersion>;
}

/// Rewrites the body of one section according to an instruction
#[async_trait]
pub trait RefinementService: Send + Sync {
    async fn refine(
        &self,
        section: SectionKind,
        current_text: &str,
        instruction: &str,
    ) -> EngineResult<String>;
}

/// Engine backed by the Anthropic API that persists generated versions
pub struct AiSpecEngine {
    ai: AIService,
    store: Arc<dyn DocumentStore>,
}

impl AiSpecEngine {
    pub fn new(ai: AIService, store: Arc<dyn DocumentStore>) -> Self {
        Self { ai, store }
    }
}

#[async_trait]
impl GenerationService for AiSpecEngine {
    async fn generate(
        &self,
        project_id: &str,
        requirement: &str,
    ) -> EngineResult<SpecificationVersion> {
        validate_requirement(requirement)?;

        info!("Generating specification for project {}", project_id);
        let response = self
            .ai
            .generate_text(
                generation_prompt(requirement),
                Some(GENERATION_SYSTEM_PROMPT.to_string()),
            )
            .await
            .map_err(|e| {
                error!("Specification generation failed: {}", e);
                EngineError::from(e)
            })?;

        let sections = parse_generated_sections(&response.data, requirement);
        let version = self
            .store
            .create_version(NewSpecificationVersion {
                project_id: project_id.to_string(),
                requirement_description: requirement.to_string(),
                sections,
            })
            .await?;

        info!(
            "Generated version {} for project {} ({} tokens)",
            version.id,
            project_id,
            response.usage.total_tokens()
        );
        Ok(version)
    }
}

#[async_trait]
impl RefinementService for AiSpecEngine {
    async fn refine(
        &self,
        section: SectionKind,
        current_text: &str,
        instruction: &str,
    ) -> EngineResult<String> {
        validate_instruction(instruction)?;

        info!("Refining {} section", section);
        let response = self
            .ai
            .generate_text(
                refinement_prompt(section, current_text, instruction),
                Some(REFINEMENT_SYSTEM_PROMPT.to_string()),
            )
            .await
            .map_err(|e| {
                error!("Refinement of {} section failed: {}", section, e);
                EngineError::from(e)
            })?;

        Ok(strip_code_fences(&response.data).to_string())
    }
}
