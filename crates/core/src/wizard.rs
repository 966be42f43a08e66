//! Wizard step state machine.
//!
//! Sequences setup → blocks → (session) → participants → settings →
//! review. The session step exists only for moderated studies; the active
//! step set is recomputed whenever the session type changes. Forward
//! transitions are gated on the current step's validation; gating
//! failures are returned as data, never raised.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::draft::{StudyDraft, StudySubmission};
use crate::error::CoreError;
use crate::types::SessionType;
use crate::validation::{ValidationEngine, ValidationResult};

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// The wizard's steps, in canonical order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Setup,
    Blocks,
    Session,
    Participants,
    Settings,
    Review,
}

impl WizardStep {
    /// Human-readable label for the progress rail.
    pub fn label(self) -> &'static str {
        match self {
            Self::Setup => "Setup",
            Self::Blocks => "Blocks",
            Self::Session => "Session",
            Self::Participants => "Participants",
            Self::Settings => "Settings",
            Self::Review => "Review",
        }
    }
}

/// The steps active for a given session type, in order. Unmoderated
/// studies have no session-configuration step.
pub fn active_steps(session_type: SessionType) -> Vec<WizardStep> {
    match session_type {
        SessionType::Moderated => vec![
            WizardStep::Setup,
            WizardStep::Blocks,
            WizardStep::Session,
            WizardStep::Participants,
            WizardStep::Settings,
            WizardStep::Review,
        ],
        SessionType::Unmoderated => vec![
            WizardStep::Setup,
            WizardStep::Blocks,
            WizardStep::Participants,
            WizardStep::Settings,
            WizardStep::Review,
        ],
    }
}

// ---------------------------------------------------------------------------
// Transition outcomes
// ---------------------------------------------------------------------------

/// Result of a forward transition attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAdvance {
    /// Moved to the given step.
    Advanced(WizardStep),
    /// The current step's validation reported errors; the wizard stays put.
    Blocked(ValidationResult),
    /// Already on the review step; [`WizardStepController::submit`] is the
    /// only way forward.
    AtReview,
}

/// Result of a submit attempt from the review step.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The draft validated; hand this payload to the persistence
    /// collaborator. The state machine is finished.
    Submitted(StudySubmission),
    /// Full validation reported errors; the wizard stays on review.
    Blocked(ValidationResult),
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Tracks the current step and the set of completed steps.
///
/// Review is terminal: there is no step after it. A successful
/// [`submit`](Self::submit) yields the payload for the persistence
/// collaborator; the caller drops the controller once the handoff
/// succeeds.
#[derive(Debug, Clone)]
pub struct WizardStepController {
    steps: Vec<WizardStep>,
    current: WizardStep,
    completed: BTreeSet<WizardStep>,
}

impl WizardStepController {
    /// Start a wizard at the setup step.
    pub fn new(session_type: SessionType) -> Self {
        Self {
            steps: active_steps(session_type),
            current: WizardStep::Setup,
            completed: BTreeSet::new(),
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.current
    }

    /// The active step set, in order.
    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        self.completed.contains(&step)
    }

    pub fn completed_steps(&self) -> impl Iterator<Item = WizardStep> + '_ {
        self.completed.iter().copied()
    }

    fn position(&self, step: WizardStep) -> Option<usize> {
        self.steps.iter().position(|s| *s == step)
    }

    /// Attempt to advance past the current step.
    ///
    /// Permitted only when validating the current step's slice of the
    /// draft yields no errors; on success the current step joins the
    /// completed set.
    pub fn next(&mut self, draft: &StudyDraft, engine: &ValidationEngine) -> StepAdvance {
        if self.current == WizardStep::Review {
            return StepAdvance::AtReview;
        }
        let result = engine.validate_step(draft, self.current);
        if !result.is_valid {
            return StepAdvance::Blocked(result);
        }
        let index = self
            .position(self.current)
            .expect("current step is always in the active set");
        self.completed.insert(self.current);
        self.current = self.steps[index + 1];
        StepAdvance::Advanced(self.current)
    }

    /// Step backward. Always permitted; returns the new step, or `None`
    /// when already on the first step.
    pub fn previous(&mut self) -> Option<WizardStep> {
        let index = self.position(self.current)?;
        if index == 0 {
            return None;
        }
        self.current = self.steps[index - 1];
        Some(self.current)
    }

    /// Direct navigation via the progress rail. Permitted only to the
    /// current step or an already-completed one.
    pub fn go_to(&mut self, step: WizardStep) -> Result<WizardStep, CoreError> {
        if self.position(step).is_none() {
            return Err(CoreError::Validation(format!(
                "Step '{}' is not part of this study's wizard",
                step.label()
            )));
        }
        if step != self.current && !self.completed.contains(&step) {
            return Err(CoreError::Validation(format!(
                "Step '{}' has not been completed yet",
                step.label()
            )));
        }
        self.current = step;
        Ok(self.current)
    }

    /// Re-check every completed step against the current draft and drop
    /// the ones that no longer validate. Called after every draft
    /// mutation so a stale "completed" badge can never survive an edit.
    pub fn refresh_completion(&mut self, draft: &StudyDraft, engine: &ValidationEngine) {
        let stale: Vec<WizardStep> = self
            .completed
            .iter()
            .copied()
            .filter(|step| !engine.validate_step(draft, *step).is_valid)
            .collect();
        for step in stale {
            self.completed.remove(&step);
        }
    }

    /// Recompute the active step set after a session-type change.
    ///
    /// If the current step drops out of the set (leaving moderated while
    /// on the session step), the wizard falls back to the nearest earlier
    /// step that still exists. Completion of removed steps is discarded.
    pub fn sync_steps(&mut self, session_type: SessionType) {
        let steps = active_steps(session_type);
        if !steps.contains(&self.current) {
            // Session sits right after Blocks in the moderated set.
            self.current = WizardStep::Blocks;
        }
        self.completed.retain(|step| steps.contains(step));
        self.steps = steps;
    }

    /// Submit from the review step.
    ///
    /// Fails with [`CoreError::Validation`] when called off the review
    /// step; returns `Blocked` when full validation reports errors.
    /// On success the payload goes to the external persistence
    /// collaborator and the wizard is done — submission is the only
    /// transition with no step after it.
    pub fn submit(
        &self,
        draft: &StudyDraft,
        engine: &ValidationEngine,
    ) -> Result<SubmitOutcome, CoreError> {
        if self.current != WizardStep::Review {
            return Err(CoreError::Validation(
                "Submission is only available from the review step".to_string(),
            ));
        }
        let result = engine.validate(draft);
        if !result.is_valid {
            return Ok(SubmitOutcome::Blocked(result));
        }
        Ok(SubmitOutcome::Submitted(draft.submission_payload()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, BlockType};
    use crate::catalog::default_catalog;
    use crate::draft::StudySetup;
    use crate::types::StudyType;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::sync::Arc;

    fn engine() -> ValidationEngine {
        ValidationEngine::new(Arc::new(default_catalog()))
    }

    fn valid_block() -> Block {
        let mut block = Block::new(BlockType::OpenQuestion, "Question");
        block.estimated_duration_mins = 2;
        block.settings.insert("question".into(), json!("Why?"));
        block
    }

    fn valid_draft() -> StudyDraft {
        let mut draft = StudyDraft::new(StudySetup::new("Study", StudyType::Survey));
        draft.blocks.insert(valid_block(), None);
        draft
    }

    /// Drive a fresh wizard to the given step, asserting each advance.
    fn advance_to(
        wizard: &mut WizardStepController,
        draft: &StudyDraft,
        engine: &ValidationEngine,
        target: WizardStep,
    ) {
        while wizard.current_step() != target {
            match wizard.next(draft, engine) {
                StepAdvance::Advanced(_) => {}
                other => panic!("failed to reach {target:?}: {other:?}"),
            }
        }
    }

    // -- active step sets ----------------------------------------------------

    #[test]
    fn unmoderated_wizard_has_no_session_step() {
        let wizard = WizardStepController::new(SessionType::Unmoderated);
        assert!(!wizard.steps().contains(&WizardStep::Session));
        assert_eq!(wizard.steps().len(), 5);
    }

    #[test]
    fn moderated_wizard_includes_session_after_blocks() {
        let wizard = WizardStepController::new(SessionType::Moderated);
        let steps = wizard.steps();
        let blocks_pos = steps.iter().position(|s| *s == WizardStep::Blocks).unwrap();
        assert_eq!(steps[blocks_pos + 1], WizardStep::Session);
    }

    // -- gating --------------------------------------------------------------

    #[test]
    fn next_is_blocked_on_empty_blocks_step() {
        let draft = StudyDraft::new(StudySetup::new("Study", StudyType::Survey));
        let engine = engine();
        let mut wizard = WizardStepController::new(SessionType::Unmoderated);

        assert_matches!(wizard.next(&draft, &engine), StepAdvance::Advanced(WizardStep::Blocks));
        let advance = wizard.next(&draft, &engine);
        assert_matches!(
            advance,
            StepAdvance::Blocked(result) if result.has_code(crate::validation::codes::NO_BLOCKS)
        );
        assert_eq!(wizard.current_step(), WizardStep::Blocks);
        assert!(!wizard.is_completed(WizardStep::Blocks));
    }

    #[test]
    fn adding_a_valid_block_unblocks_the_blocks_step() {
        let mut draft = StudyDraft::new(StudySetup::new("Study", StudyType::Survey));
        let engine = engine();
        let mut wizard = WizardStepController::new(SessionType::Unmoderated);
        wizard.next(&draft, &engine);
        assert_matches!(wizard.next(&draft, &engine), StepAdvance::Blocked(_));

        draft.blocks.insert(valid_block(), None);
        assert_matches!(
            wizard.next(&draft, &engine),
            StepAdvance::Advanced(WizardStep::Participants)
        );
        assert!(wizard.is_completed(WizardStep::Blocks));
    }

    #[test]
    fn next_from_review_is_terminal() {
        let draft = valid_draft();
        let engine = engine();
        let mut wizard = WizardStepController::new(SessionType::Unmoderated);
        advance_to(&mut wizard, &draft, &engine, WizardStep::Review);
        assert_matches!(wizard.next(&draft, &engine), StepAdvance::AtReview);
    }

    // -- previous / go_to ----------------------------------------------------

    #[test]
    fn previous_is_always_permitted() {
        let draft = valid_draft();
        let engine = engine();
        let mut wizard = WizardStepController::new(SessionType::Unmoderated);
        advance_to(&mut wizard, &draft, &engine, WizardStep::Participants);

        assert_eq!(wizard.previous(), Some(WizardStep::Blocks));
        assert_eq!(wizard.previous(), Some(WizardStep::Setup));
        assert_eq!(wizard.previous(), None);
    }

    #[test]
    fn go_to_completed_step_is_permitted() {
        let draft = valid_draft();
        let engine = engine();
        let mut wizard = WizardStepController::new(SessionType::Unmoderated);
        advance_to(&mut wizard, &draft, &engine, WizardStep::Settings);

        assert_eq!(wizard.go_to(WizardStep::Setup).unwrap(), WizardStep::Setup);
    }

    #[test]
    fn go_to_future_step_is_refused() {
        let mut wizard = WizardStepController::new(SessionType::Unmoderated);
        assert!(wizard.go_to(WizardStep::Review).is_err());
        assert_eq!(wizard.current_step(), WizardStep::Setup);
    }

    #[test]
    fn go_to_inactive_step_is_refused() {
        let mut wizard = WizardStepController::new(SessionType::Unmoderated);
        assert!(wizard.go_to(WizardStep::Session).is_err());
    }

    // -- stale completion ----------------------------------------------------

    #[test]
    fn invalidating_edit_clears_completed_badge() {
        let mut draft = valid_draft();
        let engine = engine();
        let mut wizard = WizardStepController::new(SessionType::Unmoderated);
        advance_to(&mut wizard, &draft, &engine, WizardStep::Participants);
        assert!(wizard.is_completed(WizardStep::Blocks));

        // Blank out the only block's name, then resync completion.
        let id = draft.blocks.as_slice()[0].id;
        draft.blocks.get_mut(id).unwrap().name = String::new();
        wizard.refresh_completion(&draft, &engine);

        assert!(!wizard.is_completed(WizardStep::Blocks));
        assert!(wizard.is_completed(WizardStep::Setup));
    }

    // -- session-type changes ------------------------------------------------

    #[test]
    fn switching_to_moderated_inserts_session_step() {
        let mut wizard = WizardStepController::new(SessionType::Unmoderated);
        wizard.sync_steps(SessionType::Moderated);
        assert!(wizard.steps().contains(&WizardStep::Session));
    }

    #[test]
    fn leaving_moderated_while_on_session_falls_back_to_blocks() {
        let mut draft = valid_draft();
        draft.setup.session_type = SessionType::Moderated;
        draft.setup.session_duration_mins = Some(30);
        let engine = engine();
        let mut wizard = WizardStepController::new(SessionType::Moderated);
        advance_to(&mut wizard, &draft, &engine, WizardStep::Session);

        wizard.sync_steps(SessionType::Unmoderated);
        assert_eq!(wizard.current_step(), WizardStep::Blocks);
        assert!(!wizard.steps().contains(&WizardStep::Session));
        assert!(!wizard.is_completed(WizardStep::Session));
    }

    // -- submit --------------------------------------------------------------

    #[test]
    fn submit_off_review_is_an_error() {
        let draft = valid_draft();
        let engine = engine();
        let wizard = WizardStepController::new(SessionType::Unmoderated);
        assert!(wizard.submit(&draft, &engine).is_err());
    }

    #[test]
    fn submit_from_review_produces_payload() {
        let draft = valid_draft();
        let engine = engine();
        let mut wizard = WizardStepController::new(SessionType::Unmoderated);
        advance_to(&mut wizard, &draft, &engine, WizardStep::Review);

        let outcome = wizard.submit(&draft, &engine).unwrap();
        assert_matches!(outcome, SubmitOutcome::Submitted(payload) if payload.blocks.len() == 1);
    }

    #[test]
    fn submit_with_invalid_draft_is_blocked() {
        let mut draft = valid_draft();
        let engine = engine();
        let mut wizard = WizardStepController::new(SessionType::Unmoderated);
        advance_to(&mut wizard, &draft, &engine, WizardStep::Review);

        // Invalidate after reaching review.
        let id = draft.blocks.as_slice()[0].id;
        draft.blocks.get_mut(id).unwrap().name = String::new();

        let outcome = wizard.submit(&draft, &engine).unwrap();
        assert_matches!(outcome, SubmitOutcome::Blocked(result) if !result.is_valid);
    }
}
