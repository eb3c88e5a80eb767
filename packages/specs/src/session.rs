// ABOUTME: Editing session tying the version controller, section workflows and renderer together
// ABOUTME: Tags every section mutation with a ticket and ignores results for a stale selection

use std::collections::HashMap;
use std::sync::Arc;

use specgen_ai::{EngineResult, GenerationService, RefinementService};
use specgen_core::{
    validate_instruction, validate_section_size, ProjectRef, SectionKind, SpecificationVersion,
};
use specgen_storage::{DocumentStore, StorageResult};
use tracing::{debug, error, info, warn};

use crate::call::{CallKind, CallTicket, PendingUpdate, RefinementRequest, Resolution};
use crate::error::{SpecError, SpecResult};
use crate::export::{export_version, ExportFormat, ExportResult};
use crate::render::{render_section, DiagramRenderer, SectionView};
use crate::section::SectionMode;
use crate::versions::{DeleteConfirmation, GenerationTicket, VersionController, VersionOption};

/// One user's view of a project's specification versions.
///
/// The section mode belongs to the selected tab of the active version; any
/// change of project, version or tab resets it.
pub struct SpecSession {
    controller: VersionController,
    refiner: Arc<dyn RefinementService>,
    renderer: Option<Arc<dyn DiagramRenderer>>,
    tab: SectionKind,
    mode: SectionMode,
    next_ticket: u64,
    /// version id -> ticket id of its outstanding mutation
    in_flight: HashMap<String, u64>,
    /// Ticket whose result the current mode is waiting for
    attached: Option<u64>,
}

impl SpecSession {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn GenerationService>,
        refiner: Arc<dyn RefinementService>,
    ) -> Self {
        Self {
            controller: VersionController::new(store, generator),
            refiner,
            renderer: None,
            tab: SectionKind::Interface,
            mode: SectionMode::Viewing,
            next_ticket: 0,
            in_flight: HashMap::new(),
            attached: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn DiagramRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn controller(&self) -> &VersionController {
        &self.controller
    }

    pub fn project(&self) -> Option<&ProjectRef> {
        self.controller.project()
    }

    pub fn versions(&self) -> &[SpecificationVersion] {
        self.controller.versions()
    }

    pub fn active(&self) -> Option<&SpecificationVersion> {
        self.controller.active()
    }

    pub fn tab(&self) -> SectionKind {
        self.tab
    }

    pub fn mode(&self) -> &SectionMode {
        &self.mode
    }

    pub fn version_options(&self) -> Vec<VersionOption> {
        self.controller.version_options()
    }

    pub fn view(&self) -> SectionView<'_> {
        render_section(self.controller.active(), self.tab, &self.mode)
    }

    pub fn export(&self, format: ExportFormat) -> SpecResult<ExportResult> {
        let project = self.controller.project().ok_or(SpecError::NoProject)?;
        export_version(self.controller.active(), project, format)
    }

    // Selection

    pub async fn load_versions(&mut self, project: ProjectRef) -> SpecResult<()> {
        self.in_flight.clear();
        self.detach();
        let result = self.controller.load_versions(project).await;
        self.refresh_diagram();
        result
    }

    pub fn select_version(&mut self, version_id: &str) -> bool {
        if self.controller.active_id() == Some(version_id) {
            return self.controller.contains(version_id);
        }
        if !self.controller.select_version(version_id) {
            return false;
        }
        self.detach();
        self.refresh_diagram();
        true
    }

    pub fn select_tab(&mut self, tab: SectionKind) {
        if self.tab == tab {
            return;
        }
        debug!("Switching tab {} -> {}", self.tab, tab);
        self.tab = tab;
        self.detach();
        self.refresh_diagram();
    }

    // Generation

    pub fn begin_generation(
        &mut self,
        project_id: &str,
        requirement: &str,
    ) -> SpecResult<GenerationTicket> {
        self.controller.begin_generation(project_id, requirement)
    }

    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        result: EngineResult<SpecificationVersion>,
    ) -> SpecResult<Resolution> {
        let resolution = self.controller.finish_generation(ticket, result)?;
        if resolution.is_applied() {
            self.detach();
            self.refresh_diagram();
        }
        Ok(resolution)
    }

    pub async fn create_version(
        &mut self,
        project_id: &str,
        requirement: &str,
    ) -> SpecResult<Resolution> {
        let previous = self.controller.active_id().map(str::to_string);
        let resolution = self.controller.create_version(project_id, requirement).await?;
        if self.controller.active_id() != previous.as_deref() {
            self.detach();
            self.refresh_diagram();
        }
        Ok(resolution)
    }

    // Deletion

    pub fn request_delete(&self, version_id: &str) -> SpecResult<DeleteConfirmation> {
        self.controller.request_delete(version_id)
    }

    pub async fn confirm_delete(&mut self, confirmation: DeleteConfirmation) -> SpecResult<()> {
        if self.in_flight.contains_key(confirmation.version_id()) {
            return Err(SpecError::Busy);
        }
        let previous = self.controller.active_id().map(str::to_string);
        self.controller.confirm_delete(confirmation).await?;
        if self.controller.active_id() != previous.as_deref() {
            self.detach();
            self.refresh_diagram();
        }
        Ok(())
    }

    // Edit workflow

    pub fn begin_edit(&mut self) -> SpecResult<()> {
        let active = self.controller.active().ok_or(SpecError::NoActiveVersion)?;
        if self.in_flight.contains_key(&active.id) {
            return Err(SpecError::Busy);
        }
        self.mode.begin_edit(active.section(self.tab))
    }

    pub fn update_draft(&mut self, text: impl Into<String>) -> SpecResult<()> {
        self.mode.set_draft(text)
    }

    pub fn cancel_edit(&mut self) -> SpecResult<()> {
        let was_editing = self.mode.is_editing();
        self.mode.cancel_edit()?;
        if was_editing {
            self.refresh_diagram();
        }
        Ok(())
    }

    /// Build the store update for the current draft and mark it in flight
    pub fn begin_commit(&mut self) -> SpecResult<PendingUpdate> {
        let active = self.controller.active().ok_or(SpecError::NoActiveVersion)?;
        let draft = self.mode.draft().ok_or(SpecError::InvalidTransition {
            action: "commit",
            state: self.mode.name(),
        })?;
        validate_section_size(draft, self.tab.field_name())?;
        if self.in_flight.contains_key(&active.id) {
            return Err(SpecError::Busy);
        }

        let buffer = self.mode.begin_save()?;
        let record = active.with_section(self.tab, buffer);
        let ticket = self.issue_ticket(record.id.clone(), CallKind::Commit);
        debug!("Committing {} section of version {}", self.tab, record.id);
        Ok(PendingUpdate { ticket, record })
    }

    pub fn finish_commit(
        &mut self,
        update: PendingUpdate,
        result: StorageResult<SpecificationVersion>,
    ) -> SpecResult<Resolution> {
        self.apply_update(update, result)
    }

    pub async fn commit_edit(&mut self) -> SpecResult<Resolution> {
        let update = self.begin_commit()?;
        let result = self
            .controller
            .store()
            .update_version(update.version_id(), &update.record)
            .await;
        self.finish_commit(update, result)
    }

    // Refinement workflow

    pub fn open_prompt(&mut self) -> SpecResult<()> {
        let active = self.controller.active().ok_or(SpecError::NoActiveVersion)?;
        if self.in_flight.contains_key(&active.id) {
            return Err(SpecError::Busy);
        }
        let was_editing = self.mode.is_editing();
        self.mode.open_prompt()?;
        if was_editing {
            self.refresh_diagram();
        }
        Ok(())
    }

    pub fn set_instruction(&mut self, text: impl Into<String>) -> SpecResult<()> {
        self.mode.set_instruction(text)
    }

    pub fn close_prompt(&mut self) -> SpecResult<()> {
        self.mode.close_prompt()
    }

    /// Validate the instruction, enter submitting and describe the refinement to send
    pub fn begin_refinement(&mut self, instruction: &str) -> SpecResult<RefinementRequest> {
        validate_instruction(instruction)?;
        let active = self.controller.active().ok_or(SpecError::NoActiveVersion)?;
        if self.in_flight.contains_key(&active.id) {
            return Err(SpecError::Busy);
        }

        let version_id = active.id.clone();
        let current_text = active.section(self.tab).to_string();
        let was_editing = self.mode.is_editing();
        self.mode.begin_submit(instruction)?;
        if was_editing {
            self.refresh_diagram();
        }

        let ticket = self.issue_ticket(version_id, CallKind::Refine);
        info!(
            "Refining {} section of version {}",
            ticket.section, ticket.version_id
        );
        Ok(RefinementRequest {
            section: ticket.section,
            ticket,
            current_text,
            instruction: instruction.to_string(),
        })
    }

    /// Turn refined text into the follow-up store update. Returns `None` when
    /// the selection changed while the refinement was running.
    pub fn resolve_refinement(
        &mut self,
        request: RefinementRequest,
        result: EngineResult<String>,
    ) -> SpecResult<Option<PendingUpdate>> {
        let ticket = request.ticket;
        if !self.is_current(&ticket) {
            self.release(&ticket);
            warn!(
                "Discarding refinement of {} for version {}: selection changed",
                ticket.section, ticket.version_id
            );
            return Ok(None);
        }

        let text = match result {
            Ok(text) => text,
            Err(e) => {
                error!(
                    "Refinement of {} for version {} failed: {}",
                    ticket.section, ticket.version_id, e
                );
                self.release(&ticket);
                self.mode.finish_submit();
                self.attached = None;
                return Err(SpecError::from_refinement(e));
            }
        };

        let Some(active) = self.controller.active() else {
            self.release(&ticket);
            self.detach();
            return Err(SpecError::NoActiveVersion);
        };
        let record = active.with_section(ticket.section, text);
        Ok(Some(PendingUpdate { ticket, record }))
    }

    pub fn finish_refinement(
        &mut self,
        update: PendingUpdate,
        result: StorageResult<SpecificationVersion>,
    ) -> SpecResult<Resolution> {
        self.apply_update(update, result)
    }

    /// Refine the selected section and persist the result before leaving submitting
    pub async fn submit_refinement(&mut self, instruction: &str) -> SpecResult<Resolution> {
        let request = self.begin_refinement(instruction)?;
        let result = self
            .refiner
            .refine(request.section, &request.current_text, &request.instruction)
            .await;

        let Some(update) = self.resolve_refinement(request, result)? else {
            return Ok(Resolution::Discarded);
        };

        let result = self
            .controller
            .store()
            .update_version(update.version_id(), &update.record)
            .await;
        self.finish_refinement(update, result)
    }

    // Internals

    fn issue_ticket(&mut self, version_id: String, kind: CallKind) -> CallTicket {
        self.next_ticket += 1;
        let ticket = CallTicket {
            id: self.next_ticket,
            epoch: self.controller.epoch(),
            version_id,
            section: self.tab,
            kind,
        };
        self.in_flight.insert(ticket.version_id.clone(), ticket.id);
        self.attached = Some(ticket.id);
        ticket
    }

    fn is_current(&self, ticket: &CallTicket) -> bool {
        self.attached == Some(ticket.id)
            && ticket.epoch == self.controller.epoch()
            && self.controller.active_id() == Some(ticket.version_id.as_str())
            && self.tab == ticket.section
    }

    fn release(&mut self, ticket: &CallTicket) {
        if self.in_flight.get(&ticket.version_id) == Some(&ticket.id) {
            self.in_flight.remove(&ticket.version_id);
        }
    }

    /// Reset the section mode and stop waiting on any outstanding ticket
    fn detach(&mut self) {
        self.mode.reset();
        self.attached = None;
    }

    fn apply_update(
        &mut self,
        update: PendingUpdate,
        result: StorageResult<SpecificationVersion>,
    ) -> SpecResult<Resolution> {
        let PendingUpdate { ticket, .. } = update;
        self.release(&ticket);
        let current = self.is_current(&ticket);

        match result {
            Ok(updated) => {
                // Persisted records are reconciled even when stale, so the list
                // never falls behind the store within an epoch.
                let same_epoch = ticket.epoch == self.controller.epoch();
                let replaced = same_epoch && self.controller.replace_version(&updated);

                if current {
                    match ticket.kind {
                        CallKind::Commit => self.mode.save_succeeded(),
                        CallKind::Refine => self.mode.finish_submit(),
                    }
                    self.attached = None;
                }
                if replaced && self.controller.active_id() == Some(updated.id.as_str()) {
                    self.refresh_diagram();
                }

                if current {
                    info!(
                        "Persisted {} of {} section for version {}",
                        ticket.kind, ticket.section, ticket.version_id
                    );
                    Ok(Resolution::Applied)
                } else {
                    warn!(
                        "Discarding {} result for version {}: selection changed",
                        ticket.kind, ticket.version_id
                    );
                    Ok(Resolution::Discarded)
                }
            }
            Err(e) if current => {
                error!(
                    "Failed to persist {} for version {}: {}",
                    ticket.kind, ticket.version_id, e
                );
                match ticket.kind {
                    CallKind::Commit => self.mode.save_failed(),
                    CallKind::Refine => self.mode.finish_submit(),
                }
                self.attached = None;
                Err(SpecError::Storage(e))
            }
            Err(e) => {
                warn!(
                    "Discarding failed {} for version {}: {}",
                    ticket.kind, ticket.version_id, e
                );
                Ok(Resolution::Discarded)
            }
        }
    }

    /// Hand the diagram to the renderer when it is on screen
    fn refresh_diagram(&self) {
        if self.tab != SectionKind::Interaction || self.mode.is_editing() {
            return;
        }
        let (Some(renderer), Some(active)) = (&self.renderer, self.controller.active()) else {
            return;
        };
        if let Err(e) = renderer.render(&active.interaction_diagram) {
            warn!("Diagram for version {} not rendered: {}", active.id, e);
        }
    }
}
