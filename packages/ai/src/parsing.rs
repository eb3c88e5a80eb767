// ABOUTME: Parsing of model output into specification sections
// ABOUTME: Strips code fences and falls back to placeholders when the output is not JSON

use serde_json::Value;
use specgen_core::GeneratedSections;
use tracing::warn;

/// Placeholder schema used when the generation output could not be split
pub const FALLBACK_SCHEMA: &str = "-- See API Spec for full details --";

/// Placeholder sample data used when the generation output could not be split
pub const FALLBACK_SAMPLE_DATA: &str = "{}";

/// Strip a surrounding Markdown code fence (```lang ... ```) if present
pub fn strip_code_fences(text: &str) -> &str {
    let cleaned = text.trim();
    if !cleaned.starts_with("```") {
        return cleaned;
    }

    // Content starts after the opening fence line
    let start = cleaned.find('\n').map(|i| i + 1).unwrap_or(cleaned.len());
    let end = cleaned[start..]
        .rfind("```")
        .map(|i| i + start)
        .unwrap_or(cleaned.len());
    cleaned[start..end].trim()
}

/// Render a JSON value as section text: strings verbatim, everything else pretty-printed
fn value_to_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => serde_json::to_string_pretty(other).ok(),
    }
}

/// Split generation output into the four sections.
///
/// The output is expected to be a JSON object with `apiSpec`, `dbSchema`,
/// `sequenceDiagram` and `mockData` keys. When it is not, the full text becomes
/// the interface section and the rest receive placeholders, so every section
/// is always populated.
pub fn parse_generated_sections(output: &str, requirement: &str) -> GeneratedSections {
    let json_text = strip_code_fences(output);
    let fallback_diagram = format!("sequenceDiagram\nUser->>System: {}", requirement.trim());

    match serde_json::from_str::<Value>(json_text) {
        Ok(Value::Object(map)) => GeneratedSections {
            interface_spec: value_to_text(map.get("apiSpec")).unwrap_or_default(),
            schema_spec: value_to_text(map.get("dbSchema"))
                .unwrap_or_else(|| FALLBACK_SCHEMA.to_string()),
            interaction_diagram: value_to_text(map.get("sequenceDiagram"))
                .map(|d| strip_code_fences(&d).to_string())
                .unwrap_or(fallback_diagram),
            sample_data: value_to_text(map.get("mockData"))
                .unwrap_or_else(|| FALLBACK_SAMPLE_DATA.to_string()),
        },
        Ok(_) | Err(_) => {
            warn!(
                "Generation output is not a JSON object; storing raw output as interface section (first 200 chars): {}",
                output.chars().take(200).collect::<String>()
            );
            GeneratedSections {
                interface_spec: output.trim().to_string(),
                schema_spec: FALLBACK_SCHEMA.to_string(),
                interaction_diagram: fallback_diagram,
                sample_data: FALLBACK_SAMPLE_DATA.to_string(),
            }
        }
    }
}
