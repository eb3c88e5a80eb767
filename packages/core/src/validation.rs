// ABOUTME: Input validation for requirement text, refinement instructions, and section bodies
// ABOUTME: All checks run before any collaborator call is made

use thiserror::Error;

use crate::constants::MAX_SECTION_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Requirement description cannot be empty")]
    EmptyRequirement,

    #[error("Refinement instruction cannot be empty")]
    EmptyInstruction,

    #[error("{field} exceeds maximum size of {max} bytes (got {actual} bytes)")]
    TooLarge {
        field: String,
        max: usize,
        actual: usize,
    },
}

/// True when the text is empty or whitespace-only
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Validate requirement prose submitted for generation
pub fn validate_requirement(requirement: &str) -> Result<(), ValidationError> {
    if is_blank(requirement) {
        return Err(ValidationError::EmptyRequirement);
    }
    validate_section_size(requirement, "Requirement description")
}

/// Validate an instruction submitted for refinement
pub fn validate_instruction(instruction: &str) -> Result<(), ValidationError> {
    if is_blank(instruction) {
        return Err(ValidationError::EmptyInstruction);
    }
    Ok(())
}

/// Validate the size of a section body
pub fn validate_section_size(content: &str, field: &str) -> Result<(), ValidationError> {
    if content.len() > MAX_SECTION_SIZE {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_SECTION_SIZE,
            actual: content.len(),
        });
    }
    Ok(())
}
