//! The builder session: single-threaded, event-driven façade over the
//! core engine.
//!
//! Every UI intent funnels through here. Each mutation re-runs validation,
//! re-checks completed wizard steps, and schedules an autosave — so the
//! step gating and the "completed" badges can never go stale under rapid
//! editing. Stale block references from delayed UI callbacks (a second
//! click landing after a delete) are logged and ignored rather than
//! crashing the session.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use canvass_core::{
    BlockCatalog, BlockId, BlockType, CoreError, SessionType, StepAdvance, StudyDraft,
    StudySettings, StudySetup, StudyTemplate, SubmitOutcome, ValidationEngine,
    ValidationResult, WizardStep, WizardStepController,
};

use crate::autosave::{Autosaver, AutosaveConfig};
use crate::error::SessionError;
use crate::source::{CatalogSource, DraftStore, StudyReceipt, StudySink};

// ---------------------------------------------------------------------------
// Drag events
// ---------------------------------------------------------------------------

/// A drag-end event from the block list UI: the dragged block and the
/// block it was dropped over.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEvent {
    pub active_id: BlockId,
    pub over_id: BlockId,
}

// ---------------------------------------------------------------------------
// Submit result
// ---------------------------------------------------------------------------

/// Outcome of a submit attempt, including the external handoff.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitResult {
    /// The study was created; the draft's lifecycle is over.
    Completed(StudyReceipt),
    /// Validation errors keep the draft on the review step.
    Blocked(ValidationResult),
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One researcher editing one draft. Drafts are independent; nothing here
/// is shared across sessions.
#[derive(Debug)]
pub struct BuilderSession {
    catalog: Arc<BlockCatalog>,
    engine: ValidationEngine,
    draft: StudyDraft,
    wizard: WizardStepController,
    autosave: Option<Autosaver>,
    validation: ValidationResult,
}

impl BuilderSession {
    /// Start a from-scratch draft.
    pub fn new(catalog: Arc<BlockCatalog>, setup: StudySetup) -> Self {
        let engine = ValidationEngine::new(Arc::clone(&catalog));
        let draft = StudyDraft::new(setup);
        let wizard = WizardStepController::new(draft.setup.session_type);
        let validation = engine.validate(&draft);
        Self {
            catalog,
            engine,
            draft,
            wizard,
            autosave: None,
            validation,
        }
    }

    /// Start a draft seeded from a template. The resulting draft behaves
    /// identically to a from-scratch one.
    pub fn from_template(
        catalog: Arc<BlockCatalog>,
        setup: StudySetup,
        template: &StudyTemplate,
        bindings: &HashMap<String, String>,
    ) -> Result<Self, CoreError> {
        let engine = ValidationEngine::new(Arc::clone(&catalog));
        let draft = StudyDraft::from_template(setup, template, bindings)?;
        let wizard = WizardStepController::new(draft.setup.session_type);
        let validation = engine.validate(&draft);
        Ok(Self {
            catalog,
            engine,
            draft,
            wizard,
            autosave: None,
            validation,
        })
    }

    /// Fetch the catalog from its source (awaited once at builder entry)
    /// and start a from-scratch draft against it.
    pub async fn load(
        source: &dyn CatalogSource,
        setup: StudySetup,
    ) -> Result<Self, SessionError> {
        let catalog = source.fetch_catalog().await?;
        Ok(Self::new(Arc::new(catalog), setup))
    }

    /// Fetch the catalog and template list, then seed a draft from the
    /// named template.
    pub async fn load_from_template(
        source: &dyn CatalogSource,
        setup: StudySetup,
        template_id: &str,
        bindings: &HashMap<String, String>,
    ) -> Result<Self, SessionError> {
        let catalog = source.fetch_catalog().await?;
        let templates = source.fetch_templates().await?;
        let template = templates
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| SessionError::Source(format!("Unknown template '{template_id}'")))?;
        Ok(Self::from_template(Arc::new(catalog), setup, template, bindings)?)
    }

    /// Attach a debounced autosaver flushing to the given store.
    pub fn with_autosave(mut self, store: Arc<dyn DraftStore>, config: AutosaveConfig) -> Self {
        self.autosave = Some(Autosaver::spawn(store, config));
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn draft(&self) -> &StudyDraft {
        &self.draft
    }

    /// The latest validation result; recomputed on every mutation.
    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    pub fn current_step(&self) -> WizardStep {
        self.wizard.current_step()
    }

    pub fn wizard(&self) -> &WizardStepController {
        &self.wizard
    }

    /// Block definitions offered for the draft's study type.
    pub fn available_blocks(&self) -> Vec<&canvass_core::BlockDefinition> {
        self.catalog.list_for_study_type(self.draft.setup.study_type)
    }

    // -----------------------------------------------------------------------
    // Block mutations
    // -----------------------------------------------------------------------

    /// Append a new block of the given type, seeded from its catalog
    /// definition.
    pub fn add_block(&mut self, block_type: BlockType) -> Result<BlockId, CoreError> {
        self.insert_block(block_type, None)
    }

    /// Insert a new block at a position (`None` appends).
    pub fn insert_block(
        &mut self,
        block_type: BlockType,
        at: Option<usize>,
    ) -> Result<BlockId, CoreError> {
        let block = self.catalog.lookup(block_type)?.create_block();
        let id = block.id;
        self.draft.blocks.insert(block, at);
        tracing::debug!(block = block_type.as_str(), "added block");
        self.after_mutation();
        Ok(id)
    }

    /// Remove a block. A stale id (deleted under a delayed callback) is
    /// ignored; returns whether anything was removed.
    pub fn remove_block(&mut self, id: BlockId) -> bool {
        match self.draft.blocks.remove(id) {
            Ok(_) => {
                self.after_mutation();
                true
            }
            Err(_) => {
                tracing::debug!(%id, "ignoring remove for unknown block");
                false
            }
        }
    }

    /// Duplicate a block; the copy lands right after the source. A stale
    /// id is ignored.
    pub fn duplicate_block(&mut self, id: BlockId) -> Option<BlockId> {
        match self.draft.blocks.duplicate(id) {
            Ok(copy_id) => {
                self.after_mutation();
                Some(copy_id)
            }
            Err(_) => {
                tracing::debug!(%id, "ignoring duplicate for unknown block");
                None
            }
        }
    }

    /// Move a block to an index (drag-end). A stale id is ignored.
    pub fn move_block(&mut self, id: BlockId, to_index: usize) -> bool {
        match self.draft.blocks.move_block(id, to_index) {
            Ok(()) => {
                self.after_mutation();
                true
            }
            Err(_) => {
                tracing::debug!(%id, "ignoring move for unknown block");
                false
            }
        }
    }

    /// Map a drag interaction to a move: the dragged block takes the
    /// position of the block it was dropped over.
    pub fn apply_drag(&mut self, event: DragEvent) -> bool {
        let Some(target) = self.draft.blocks.index_of(event.over_id) else {
            tracing::debug!(over = %event.over_id, "ignoring drag over unknown block");
            return false;
        };
        self.move_block(event.active_id, target)
    }

    // -----------------------------------------------------------------------
    // Block field edits
    // -----------------------------------------------------------------------

    pub fn rename_block(&mut self, id: BlockId, name: impl Into<String>) -> bool {
        self.edit_block(id, |block| block.name = name.into())
    }

    pub fn set_block_description(&mut self, id: BlockId, description: impl Into<String>) -> bool {
        self.edit_block(id, |block| block.description = description.into())
    }

    pub fn set_block_duration(&mut self, id: BlockId, minutes: u32) -> bool {
        self.edit_block(id, |block| block.estimated_duration_mins = minutes)
    }

    pub fn set_block_required(&mut self, id: BlockId, is_required: bool) -> bool {
        self.edit_block(id, |block| block.is_required = is_required)
    }

    /// Edit one settings key. The key must be declared customizable for
    /// the block's type; unknown keys already stored are left untouched
    /// but cannot be edited through this path.
    pub fn edit_setting(
        &mut self,
        id: BlockId,
        key: &str,
        value: serde_json::Value,
    ) -> Result<bool, CoreError> {
        let Some(block) = self.draft.blocks.get(id) else {
            tracing::debug!(%id, "ignoring setting edit for unknown block");
            return Ok(false);
        };
        self.catalog.ensure_customizable(block.block_type, key)?;
        self.draft
            .blocks
            .get_mut(id)
            .expect("block still present")
            .settings
            .insert(key.to_string(), value);
        self.after_mutation();
        Ok(true)
    }

    fn edit_block(&mut self, id: BlockId, apply: impl FnOnce(&mut canvass_core::Block)) -> bool {
        match self.draft.blocks.get_mut(id) {
            Some(block) => {
                apply(block);
                self.after_mutation();
                true
            }
            None => {
                tracing::debug!(%id, "ignoring field edit for unknown block");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Setup / settings
    // -----------------------------------------------------------------------

    /// Replace the setup. A session-type change re-syncs the wizard's
    /// active step set.
    pub fn update_setup(&mut self, setup: StudySetup) {
        let session_changed = setup.session_type != self.draft.setup.session_type;
        self.draft.setup = setup;
        if session_changed {
            self.wizard.sync_steps(self.draft.setup.session_type);
        }
        self.after_mutation();
    }

    pub fn set_session_type(&mut self, session_type: SessionType) {
        let mut setup = self.draft.setup.clone();
        setup.session_type = session_type;
        self.update_setup(setup);
    }

    pub fn update_settings(&mut self, settings: StudySettings) {
        self.draft.settings = settings;
        self.after_mutation();
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    pub fn next_step(&mut self) -> StepAdvance {
        self.wizard.next(&self.draft, &self.engine)
    }

    pub fn previous_step(&mut self) -> Option<WizardStep> {
        self.wizard.previous()
    }

    pub fn go_to_step(&mut self, step: WizardStep) -> Result<WizardStep, CoreError> {
        self.wizard.go_to(step)
    }

    // -----------------------------------------------------------------------
    // Submit / close
    // -----------------------------------------------------------------------

    /// Submit from the review step: validate, hand the payload to the
    /// study-creation API, and stop autosaving once it succeeds.
    pub async fn submit(&mut self, sink: &dyn StudySink) -> Result<SubmitResult, SessionError> {
        match self.wizard.submit(&self.draft, &self.engine)? {
            SubmitOutcome::Blocked(result) => Ok(SubmitResult::Blocked(result)),
            SubmitOutcome::Submitted(payload) => {
                let receipt = sink.create_study(&payload).await?;
                tracing::info!(study_id = %receipt.study_id, "study created");
                if let Some(autosave) = self.autosave.take() {
                    autosave.cancel();
                }
                Ok(SubmitResult::Completed(receipt))
            }
        }
    }

    /// Tear the session down (navigating away): any pending or in-flight
    /// autosave is cancelled and the draft is discarded with it.
    pub fn close(&mut self) {
        if let Some(autosave) = self.autosave.take() {
            autosave.cancel();
        }
        tracing::debug!("builder session closed");
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn after_mutation(&mut self) {
        self.validation = self.engine.validate(&self.draft);
        self.wizard.refresh_completion(&self.draft, &self.engine);
        if let Some(autosave) = &self.autosave {
            autosave.schedule(&self.draft);
        }
    }
}
