// ABOUTME: Projection of the active version and section mode into what should be displayed
// ABOUTME: Also defines the diagram renderer seam and a Mermaid header check

use serde::Serialize;
use specgen_core::{SectionKind, SpecificationVersion, EMPTY_STATE_MESSAGE};
use thiserror::Error;

use crate::section::SectionMode;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("Malformed diagram source: {0}")]
    Malformed(String),

    #[error("Diagram renderer unavailable: {0}")]
    Unavailable(String),
}

/// Receives diagram source whenever the interaction section is on screen
pub trait DiagramRenderer: Send + Sync {
    fn render(&self, source: &str) -> Result<(), RenderError>;
}

/// What to display for the selected section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SectionView<'a> {
    Empty {
        message: &'static str,
    },
    Persisted {
        section: SectionKind,
        text: &'a str,
        diagram: bool,
    },
    Draft {
        section: SectionKind,
        buffer: &'a str,
    },
}

impl SectionView<'_> {
    pub fn text(&self) -> &str {
        match self {
            SectionView::Empty { message } => message,
            SectionView::Persisted { text, .. } => text,
            SectionView::Draft { buffer, .. } => buffer,
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, SectionView::Draft { .. })
    }
}

/// `mode` always belongs to `tab` of the active version
pub fn render_section<'a>(
    active: Option<&'a SpecificationVersion>,
    tab: SectionKind,
    mode: &'a SectionMode,
) -> SectionView<'a> {
    let Some(version) = active else {
        return SectionView::Empty {
            message: EMPTY_STATE_MESSAGE,
        };
    };

    match mode.draft() {
        Some(buffer) => SectionView::Draft {
            section: tab,
            buffer,
        },
        None => SectionView::Persisted {
            section: tab,
            text: version.section(tab),
            diagram: tab.is_diagram(),
        },
    }
}

const MERMAID_DIAGRAM_TYPES: &[&str] = &[
    "sequenceDiagram",
    "flowchart",
    "graph",
    "classDiagram",
    "stateDiagram",
    "stateDiagram-v2",
    "erDiagram",
    "journey",
    "gantt",
    "pie",
];

/// Checks that diagram source opens with a known Mermaid diagram type.
/// Used where no graphical renderer is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct MermaidHeaderCheck;

impl DiagramRenderer for MermaidHeaderCheck {
    fn render(&self, source: &str) -> Result<(), RenderError> {
        let header = source
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with("%%"))
            .ok_or_else(|| RenderError::Malformed("diagram source is empty".to_string()))?;

        let keyword = header.split_whitespace().next().unwrap_or_default();
        if MERMAID_DIAGRAM_TYPES.contains(&keyword) {
            Ok(())
        } else {
            Err(RenderError::Malformed(format!(
                "unknown diagram type '{}'",
                keyword
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use specgen_core::GeneratedSections;

    fn version() -> SpecificationVersion {
        SpecificationVersion::from_parts(
            "v1".to_string(),
            "p1".to_string(),
            Utc::now(),
            "req".to_string(),
            GeneratedSections {
                interface_spec: "openapi: 3.0.0".to_string(),
                schema_spec: "CREATE TABLE t();".to_string(),
                interaction_diagram: "sequenceDiagram\nA->>B: hi".to_string(),
                sample_data: "{}".to_string(),
            },
        )
    }

    #[test]
    fn test_no_version_renders_empty_state() {
        let mode = SectionMode::Viewing;
        let view = render_section(None, SectionKind::Interface, &mode);
        assert_eq!(
            view,
            SectionView::Empty {
                message: "No spec generated yet."
            }
        );
    }

    #[rstest]
    #[case(SectionKind::Interface, "openapi: 3.0.0", false)]
    #[case(SectionKind::Schema, "CREATE TABLE t();", false)]
    #[case(SectionKind::Interaction, "sequenceDiagram\nA->>B: hi", true)]
    #[case(SectionKind::Sample, "{}", false)]
    fn test_persisted_view(
        #[case] tab: SectionKind,
        #[case] text: &str,
        #[case] diagram: bool,
    ) {
        let v = version();
        let mode = SectionMode::Viewing;
        assert_eq!(
            render_section(Some(&v), tab, &mode),
            SectionView::Persisted {
                section: tab,
                text,
                diagram
            }
        );
    }

    #[test]
    fn test_editing_shows_draft() {
        let v = version();
        let mode = SectionMode::Editing {
            buffer: "draft text".to_string(),
            saving: false,
        };
        let view = render_section(Some(&v), SectionKind::Schema, &mode);
        assert!(view.is_draft());
        assert_eq!(view.text(), "draft text");
    }

    #[test]
    fn test_prompting_still_shows_persisted_text() {
        let v = version();
        let mode = SectionMode::Prompting {
            instruction: "add index".to_string(),
        };
        let view = render_section(Some(&v), SectionKind::Schema, &mode);
        assert_eq!(view.text(), "CREATE TABLE t();");
    }

    #[rstest]
    #[case("sequenceDiagram\nUser->>System: login")]
    #[case("%% comment\n\nflowchart LR\nA-->B")]
    #[case("  graph TD")]
    fn test_mermaid_check_accepts(#[case] source: &str) {
        assert!(MermaidHeaderCheck.render(source).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("   \n")]
    #[case("User->>System: login")]
    fn test_mermaid_check_rejects(#[case] source: &str) {
        assert!(matches!(
            MermaidHeaderCheck.render(source),
            Err(RenderError::Malformed(_))
        ));
    }
}
