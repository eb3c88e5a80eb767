// ABOUTME: Tickets and request types for in-flight collaborator calls
// ABOUTME: A ticket records what a call targeted so late results can be recognized as stale

use serde::Serialize;
use specgen_core::{SectionKind, SpecificationVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Commit,
    Refine,
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallKind::Commit => write!(f, "commit"),
            CallKind::Refine => write!(f, "refine"),
        }
    }
}

/// Identifies the target of an in-flight section mutation at the time it was issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallTicket {
    pub id: u64,
    pub epoch: u64,
    pub version_id: String,
    pub section: SectionKind,
    pub kind: CallKind,
}

/// A store update waiting to be issued: the full record with one section replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    pub ticket: CallTicket,
    pub record: SpecificationVersion,
}

impl PendingUpdate {
    pub fn version_id(&self) -> &str {
        &self.ticket.version_id
    }
}

/// A refinement waiting to be sent; `current_text` is the persisted body, never a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementRequest {
    pub ticket: CallTicket,
    pub section: SectionKind,
    pub current_text: String,
    pub instruction: String,
}

/// Outcome of applying a collaborator result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Applied,
    /// The selection moved on before the result arrived
    Discarded,
}

impl Resolution {
    pub fn is_applied(&self) -> bool {
        matches!(self, Resolution::Applied)
    }
}
