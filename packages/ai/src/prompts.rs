// ABOUTME: Prompts for specification generation and section refinement
// ABOUTME: Generation asks for one JSON object carrying all four sections

use specgen_core::SectionKind;

/// System prompt shared by generation calls
pub const GENERATION_SYSTEM_PROMPT: &str = "You are a technical architect. You turn product requirements into precise technical specifications. Respond with a single JSON object and nothing else.";

/// System prompt shared by refinement calls
pub const REFINEMENT_SYSTEM_PROMPT: &str = "You are a technical expert. You revise one section of a technical specification at a time and return only the revised content.";

/// Build the prompt that produces all four sections from requirement prose
pub fn generation_prompt(requirement: &str) -> String {
    format!(
        r#"Based on the following requirement, generate a technical specification in JSON format with exactly these keys:
- "apiSpec": an OpenAPI 3.0 description of the interface (YAML or JSON, as a string)
- "dbSchema": the persistence schema as SQL DDL
- "sequenceDiagram": the main interaction as a Mermaid sequenceDiagram
- "mockData": example data as JSON

Requirement:
{}"#,
        requirement.trim()
    )
}

/// Human-readable section type used in refinement prompts
pub fn section_type_name(section: SectionKind) -> &'static str {
    match section {
        SectionKind::Interface => "API specification (OpenAPI)",
        SectionKind::Schema => "Database schema (SQL)",
        SectionKind::Interaction => "Sequence diagram (Mermaid)",
        SectionKind::Sample => "Mock data (JSON)",
    }
}

/// Build the prompt that rewrites one section according to an instruction
pub fn refinement_prompt(section: SectionKind, current_content: &str, instruction: &str) -> String {
    format!(
        "Refine the following content based on the instruction.\n\
         Section Type: {}\n\
         Instruction: {}\n\
         Current Content:\n{}\n\n\
         Return ONLY the updated content without any markdown formatting (no ```).",
        section_type_name(section),
        instruction.trim(),
        current_content
    )
}
