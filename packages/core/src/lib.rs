// ABOUTME: Core types, validation, and utilities for specgen
// ABOUTME: Foundational package shared by storage, AI engine, and the lifecycle manager

pub mod constants;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{
    GeneratedSections, NewSpecificationVersion, ParseSectionKindError, ProjectRef, SectionKind,
    SpecificationVersion,
};

// Re-export constants
pub use constants::{database_file, specgen_dir, EMPTY_STATE_MESSAGE, MAX_SECTION_SIZE};

// Re-export utilities
pub use utils::generate_id;

// Re-export validation
pub use validation::{
    is_blank, validate_instruction, validate_requirement, validate_section_size, ValidationError,
};
