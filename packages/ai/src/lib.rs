// ABOUTME: Generation and refinement engine for specification versions
// ABOUTME: Anthropic API client, prompts, response parsing, and the collaborator traits

pub mod engine;
pub mod parsing;
pub mod prompts;
pub mod service;

// Re-export engine traits and implementation
pub use engine::{AiSpecEngine, EngineError, EngineResult, GenerationService, RefinementService};

// Re-export parsing helpers
pub use parsing::{parse_generated_sections, strip_code_fences};

// Re-export service types
pub use service::{AIResponse, AIService, AIServiceError, AIServiceResult, Usage, DEFAULT_MODEL};
