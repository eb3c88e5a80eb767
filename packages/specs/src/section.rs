// ABOUTME: Per-section edit and refinement state machine
// ABOUTME: One tagged state makes editing and refining mutually exclusive

use specgen_core::validate_instruction;

use crate::error::{SpecError, SpecResult};

/// Workflow state of the selected section of the active version.
///
/// The staging buffer exists only inside `Editing`; persisted text lives in the
/// version list and changes only through a commit or a completed refinement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SectionMode {
    #[default]
    Viewing,
    /// Local draft; `saving` is set while the commit is in flight
    Editing { buffer: String, saving: bool },
    /// Refinement instruction box open, nothing sent yet
    Prompting { instruction: String },
    /// Refinement (and its follow-up persist) in flight
    Submitting { instruction: String },
}

impl SectionMode {
    pub fn name(&self) -> &'static str {
        match self {
            SectionMode::Viewing => "viewing",
            SectionMode::Editing { saving: false, .. } => "editing",
            SectionMode::Editing { saving: true, .. } => "saving",
            SectionMode::Prompting { .. } => "prompting",
            SectionMode::Submitting { .. } => "submitting",
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, SectionMode::Editing { .. })
    }

    pub fn is_refining(&self) -> bool {
        matches!(
            self,
            SectionMode::Prompting { .. } | SectionMode::Submitting { .. }
        )
    }

    /// True while a collaborator call started from this section is outstanding
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SectionMode::Editing { saving: true, .. } | SectionMode::Submitting { .. }
        )
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            SectionMode::Editing { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    pub fn instruction(&self) -> Option<&str> {
        match self {
            SectionMode::Prompting { instruction } | SectionMode::Submitting { instruction } => {
                Some(instruction)
            }
            _ => None,
        }
    }

    fn ensure_idle(&self) -> SpecResult<()> {
        if self.is_busy() {
            return Err(SpecError::Busy);
        }
        Ok(())
    }

    /// Enter editing with the buffer seeded from the persisted body
    pub fn begin_edit(&mut self, persisted: &str) -> SpecResult<()> {
        match self {
            SectionMode::Viewing => {
                *self = SectionMode::Editing {
                    buffer: persisted.to_string(),
                    saving: false,
                };
                Ok(())
            }
            SectionMode::Editing { saving: false, .. } => Ok(()),
            SectionMode::Editing { saving: true, .. } => Err(SpecError::Busy),
            SectionMode::Prompting { .. } | SectionMode::Submitting { .. } => {
                Err(SpecError::InvalidTransition {
                    action: "start editing",
                    state: "refining",
                })
            }
        }
    }

    pub fn set_draft(&mut self, text: impl Into<String>) -> SpecResult<()> {
        match self {
            SectionMode::Editing {
                buffer,
                saving: false,
            } => {
                *buffer = text.into();
                Ok(())
            }
            SectionMode::Editing { saving: true, .. } => Err(SpecError::Busy),
            other => Err(SpecError::InvalidTransition {
                action: "change the draft",
                state: other.name(),
            }),
        }
    }

    /// Discard the draft; no-op when not editing
    pub fn cancel_edit(&mut self) -> SpecResult<()> {
        match self {
            SectionMode::Editing { saving: true, .. } => Err(SpecError::Busy),
            SectionMode::Editing { .. } => {
                *self = SectionMode::Viewing;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Mark the draft as being saved and hand back its contents
    pub fn begin_save(&mut self) -> SpecResult<String> {
        match self {
            SectionMode::Editing { buffer, saving } if !*saving => {
                *saving = true;
                Ok(buffer.clone())
            }
            SectionMode::Editing { .. } => Err(SpecError::Busy),
            other => Err(SpecError::InvalidTransition {
                action: "commit",
                state: other.name(),
            }),
        }
    }

    /// Keep the draft intact so the user can retry or cancel
    pub fn save_failed(&mut self) {
        if let SectionMode::Editing { saving, .. } = self {
            *saving = false;
        }
    }

    pub fn save_succeeded(&mut self) {
        *self = SectionMode::Viewing;
    }

    /// Open the instruction box, closing any open edit
    pub fn open_prompt(&mut self) -> SpecResult<()> {
        self.ensure_idle()?;
        *self = SectionMode::Prompting {
            instruction: String::new(),
        };
        Ok(())
    }

    pub fn set_instruction(&mut self, text: impl Into<String>) -> SpecResult<()> {
        match self {
            SectionMode::Prompting { instruction } => {
                *instruction = text.into();
                Ok(())
            }
            SectionMode::Submitting { .. } => Err(SpecError::Busy),
            other => Err(SpecError::InvalidTransition {
                action: "change the instruction",
                state: other.name(),
            }),
        }
    }

    /// Close the instruction box; no-op when it is not open
    pub fn close_prompt(&mut self) -> SpecResult<()> {
        match self {
            SectionMode::Prompting { .. } => {
                *self = SectionMode::Viewing;
                Ok(())
            }
            SectionMode::Submitting { .. } => Err(SpecError::Busy),
            _ => Ok(()),
        }
    }

    /// Move to submitting; the instruction is validated before anything else
    pub fn begin_submit(&mut self, instruction: &str) -> SpecResult<()> {
        validate_instruction(instruction)?;
        self.ensure_idle()?;
        *self = SectionMode::Submitting {
            instruction: instruction.to_string(),
        };
        Ok(())
    }

    /// Leave submitting (success or failure); the instruction is dropped
    pub fn finish_submit(&mut self) {
        if matches!(self, SectionMode::Submitting { .. }) {
            *self = SectionMode::Viewing;
        }
    }

    /// Implicit cancel on tab, version, or project change
    pub fn reset(&mut self) {
        *self = SectionMode::Viewing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn editing(buffer: &str) -> SectionMode {
        SectionMode::Editing {
            buffer: buffer.to_string(),
            saving: false,
        }
    }

    #[test]
    fn test_edit_cycle() {
        let mut mode = SectionMode::default();
        mode.begin_edit("persisted").unwrap();
        assert_eq!(mode.draft(), Some("persisted"));

        mode.set_draft("changed").unwrap();
        assert_eq!(mode.begin_save().unwrap(), "changed");
        assert!(mode.is_busy());
        assert!(matches!(mode.set_draft("more"), Err(SpecError::Busy)));
        assert!(matches!(mode.cancel_edit(), Err(SpecError::Busy)));

        mode.save_failed();
        assert_eq!(mode, editing("changed"));

        mode.begin_save().unwrap();
        mode.save_succeeded();
        assert_eq!(mode, SectionMode::Viewing);
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut mode = editing("draft");
        mode.cancel_edit().unwrap();
        assert_eq!(mode, SectionMode::Viewing);

        // Cancelling when not editing is harmless
        mode.cancel_edit().unwrap();
        assert_eq!(mode, SectionMode::Viewing);
    }

    #[test]
    fn test_begin_edit_rejected_while_refining() {
        let mut mode = SectionMode::Prompting {
            instruction: "x".to_string(),
        };
        assert!(matches!(
            mode.begin_edit("text"),
            Err(SpecError::InvalidTransition { .. })
        ));

        let mut mode = SectionMode::Submitting {
            instruction: "x".to_string(),
        };
        assert!(matches!(
            mode.begin_edit("text"),
            Err(SpecError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_begin_edit_keeps_existing_draft() {
        let mut mode = editing("unsaved");
        mode.begin_edit("persisted").unwrap();
        assert_eq!(mode.draft(), Some("unsaved"));
    }

    #[test]
    fn test_open_prompt_closes_edit_and_clears_instruction() {
        let mut mode = editing("draft");
        mode.open_prompt().unwrap();
        assert_eq!(
            mode,
            SectionMode::Prompting {
                instruction: String::new()
            }
        );

        mode.set_instruction("add pagination").unwrap();
        mode.open_prompt().unwrap();
        assert_eq!(mode.instruction(), Some(""));
    }

    #[test]
    fn test_open_prompt_rejected_while_busy() {
        let mut mode = SectionMode::Editing {
            buffer: "b".to_string(),
            saving: true,
        };
        assert!(matches!(mode.open_prompt(), Err(SpecError::Busy)));

        let mut mode = SectionMode::Submitting {
            instruction: "x".to_string(),
        };
        assert!(matches!(mode.open_prompt(), Err(SpecError::Busy)));
    }

    #[test]
    fn test_close_prompt() {
        let mut mode = SectionMode::Prompting {
            instruction: "draft instruction".to_string(),
        };
        mode.close_prompt().unwrap();
        assert_eq!(mode, SectionMode::Viewing);
    }

    #[test]
    fn test_submit_validates_instruction_first() {
        let mut mode = SectionMode::Prompting {
            instruction: String::new(),
        };
        assert!(matches!(
            mode.begin_submit("   "),
            Err(SpecError::Validation(_))
        ));
        assert_eq!(
            mode,
            SectionMode::Prompting {
                instruction: String::new()
            }
        );
    }

    #[test]
    fn test_submit_cycle() {
        let mut mode = SectionMode::Prompting {
            instruction: "add pagination".to_string(),
        };
        mode.begin_submit("add pagination").unwrap();
        assert_eq!(mode.name(), "submitting");
        assert!(matches!(
            mode.begin_submit("again"),
            Err(SpecError::Busy)
        ));

        mode.finish_submit();
        assert_eq!(mode, SectionMode::Viewing);
        assert_eq!(mode.instruction(), None);
    }

    #[test]
    fn test_finish_submit_ignores_other_states() {
        let mut mode = editing("draft");
        mode.finish_submit();
        assert_eq!(mode, editing("draft"));
    }
}
