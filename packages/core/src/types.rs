// ABOUTME: Specification version and section type definitions
// ABOUTME: Shared data model for the document store, generation engine, and lifecycle manager

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four named parts of a specification version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Interface,
    Schema,
    Interaction,
    Sample,
}

impl SectionKind {
    /// All sections in display and export order
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Interface,
        SectionKind::Schema,
        SectionKind::Interaction,
        SectionKind::Sample,
    ];

    /// Human-readable label used for tabs and exported blocks
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Interface => "Interface Specification",
            SectionKind::Schema => "Persistence Schema",
            SectionKind::Interaction => "Interaction Diagram",
            SectionKind::Sample => "Sample Data",
        }
    }

    /// Serialized field name of the section on a version record
    pub fn field_name(&self) -> &'static str {
        match self {
            SectionKind::Interface => "interfaceSpec",
            SectionKind::Schema => "schemaSpec",
            SectionKind::Interaction => "interactionDiagram",
            SectionKind::Sample => "sampleData",
        }
    }

    pub fn is_diagram(&self) -> bool {
        matches!(self, SectionKind::Interaction)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Interface => write!(f, "interface"),
            SectionKind::Schema => write!(f, "schema"),
            SectionKind::Interaction => write!(f, "interaction"),
            SectionKind::Sample => write!(f, "sample"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown section: {0}. Must be one of: interface, schema, interaction, sample")]
pub struct ParseSectionKindError(pub String);

impl FromStr for SectionKind {
    type Err = ParseSectionKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Legacy tab names (api, db, sequence, mock) are accepted as aliases
        match s.trim().to_lowercase().as_str() {
            "interface" | "api" => Ok(SectionKind::Interface),
            "schema" | "db" => Ok(SectionKind::Schema),
            "interaction" | "sequence" | "diagram" => Ok(SectionKind::Interaction),
            "sample" | "mock" => Ok(SectionKind::Sample),
            _ => Err(ParseSectionKindError(s.to_string())),
        }
    }
}

/// Reference to a project owned by the project-management collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
}

impl ProjectRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The four section bodies produced by generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSections {
    pub interface_spec: String,
    pub schema_spec: String,
    pub interaction_diagram: String,
    pub sample_data: String,
}

/// Input for creating a version in a document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSpecificationVersion {
    pub project_id: String,
    pub requirement_description: String,
    pub sections: GeneratedSections,
}

/// A generated specification version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecificationVersion {
    pub id: String,
    pub project_id: String,
    pub created_at: DateTime<Utc>,
    pub requirement_description: String,
    pub interface_spec: String,
    pub schema_spec: String,
    pub interaction_diagram: String,
    pub sample_data: String,
}

impl SpecificationVersion {
    /// Assemble a version record from stored parts
    pub fn from_parts(
        id: String,
        project_id: String,
        created_at: DateTime<Utc>,
        requirement_description: String,
        sections: GeneratedSections,
    ) -> Self {
        Self {
            id,
            project_id,
            created_at,
            requirement_description,
            interface_spec: sections.interface_spec,
            schema_spec: sections.schema_spec,
            interaction_diagram: sections.interaction_diagram,
            sample_data: sections.sample_data,
        }
    }

    pub fn section(&self, kind: SectionKind) -> &str {
        match kind {
            SectionKind::Interface => &self.interface_spec,
            SectionKind::Schema => &self.schema_spec,
            SectionKind::Interaction => &self.interaction_diagram,
            SectionKind::Sample => &self.sample_data,
        }
    }

    fn section_mut(&mut self, kind: SectionKind) -> &mut String {
        match kind {
            SectionKind::Interface => &mut self.interface_spec,
            SectionKind::Schema => &mut self.schema_spec,
            SectionKind::Interaction => &mut self.interaction_diagram,
            SectionKind::Sample => &mut self.sample_data,
        }
    }

    /// Full copy of this record with one section body replaced
    pub fn with_section(&self, kind: SectionKind, text: impl Into<String>) -> Self {
        let mut record = self.clone();
        *record.section_mut(kind) = text.into();
        record
    }

    pub fn sections(&self) -> GeneratedSections {
        GeneratedSections {
            interface_spec: self.interface_spec.clone(),
            schema_spec: self.schema_spec.clone(),
            interaction_diagram: self.interaction_diagram.clone(),
            sample_data: self.sample_data.clone(),
        }
    }
}
