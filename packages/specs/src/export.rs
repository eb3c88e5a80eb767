// ABOUTME: Export of a specification version as structured JSON or a Markdown document
// ABOUTME: Pure functions; filenames follow spec-{project}-v{version}.{ext}

use serde::{Deserialize, Serialize};
use specgen_core::{ProjectRef, SectionKind, SpecificationVersion};
use tracing::info;

use crate::error::{SpecError, SpecResult};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// The full version record as JSON
    Structured,
    /// Requirement plus the four sections as one Markdown document
    Document,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Structured => "json",
            ExportFormat::Document => "md",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Structured => "application/json",
            ExportFormat::Document => "text/markdown",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Structured => write!(f, "structured"),
            ExportFormat::Document => write!(f, "document"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "json" => Ok(ExportFormat::Structured),
            "document" | "markdown" | "md" => Ok(ExportFormat::Document),
            other => Err(SpecError::InvalidInput(format!(
                "Unknown export format '{}'",
                other
            ))),
        }
    }
}

/// Export result with content and metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResult {
    pub format: ExportFormat,
    pub content: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: usize,
}

pub fn export_version(
    version: Option<&SpecificationVersion>,
    project: &ProjectRef,
    format: ExportFormat,
) -> SpecResult<ExportResult> {
    let version = version.ok_or(SpecError::NoActiveVersion)?;

    let content = match format {
        ExportFormat::Structured => serde_json::to_string_pretty(version)?,
        ExportFormat::Document => export_document(version, project),
    };

    let file_name = export_filename(&project.name, &version.id, format);
    let size_bytes = content.len();
    info!(
        "Exported version {} as {} ({} bytes)",
        version.id, format, size_bytes
    );

    Ok(ExportResult {
        format,
        content,
        file_name,
        mime_type: format.mime_type().to_string(),
        size_bytes,
    })
}

/// `spec-{project}-v{version}.{ext}` with whitespace turned into `-` and
/// path-reserved characters into `_`
pub fn export_filename(project_name: &str, version_id: &str, format: ExportFormat) -> String {
    format!(
        "spec-{}-v{}.{}",
        sanitize_filename_part(project_name, "project"),
        sanitize_filename_part(version_id, "unknown"),
        format.extension()
    )
}

fn sanitize_filename_part(text: &str, fallback: &str) -> String {
    let cleaned: String = text
        .trim()
        .chars()
        .map(|c| match c {
            c if c.is_whitespace() => '-',
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

fn export_document(version: &SpecificationVersion, project: &ProjectRef) -> String {
    let mut doc = String::new();
    doc.push_str(&format!("# Specification: {}\n\n", project.name));
    doc.push_str(&format!(
        "Version `{}` created {}\n\n",
        version.id,
        version.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    doc.push_str("## Requirement\n\n");
    doc.push_str(version.requirement_description.trim_end());
    doc.push_str("\n\n");

    for kind in SectionKind::ALL {
        let language = match kind {
            SectionKind::Interface => "yaml",
            SectionKind::Schema => "sql",
            SectionKind::Interaction => "mermaid",
            SectionKind::Sample => "json",
        };
        doc.push_str(&format!("## {}\n\n", kind.label()));
        doc.push_str(&fenced_block(version.section(kind), language));
        doc.push('\n');
    }

    doc
}

/// Fence `body`, using a backtick run longer than any inside it
fn fenced_block(body: &str, language: &str) -> String {
    let fence = "`".repeat((longest_backtick_run(body) + 1).max(3));
    let body = body.trim_end_matches('\n');
    if body.is_empty() {
        format!("{fence}{language}\n{fence}\n")
    } else {
        format!("{fence}{language}\n{body}\n{fence}\n")
    }
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
