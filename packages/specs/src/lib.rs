// ABOUTME: Specification document lifecycle manager
// ABOUTME: Version control, edit and refinement workflows, section rendering and export

pub mod call;
pub mod error;
pub mod export;
pub mod render;
pub mod section;
pub mod session;
pub mod versions;

pub use call::{CallKind, CallTicket, PendingUpdate, RefinementRequest, Resolution};
pub use error::{SpecError, SpecResult};
pub use export::{export_filename, export_version, ExportFormat, ExportResult};
pub use render::{render_section, DiagramRenderer, MermaidHeaderCheck, RenderError, SectionView};
pub use section::SectionMode;
pub use session::SpecSession;
pub use versions::{
    replace_in_list, DeleteConfirmation, GenerationTicket, VersionController, VersionOption,
};

/// Common imports for hosts driving a session
pub mod prelude {
    pub use crate::{
        ExportFormat, Resolution, SectionMode, SectionView, SpecError, SpecResult, SpecSession,
    };
    pub use specgen_core::{ProjectRef, SectionKind, SpecificationVersion};
}
