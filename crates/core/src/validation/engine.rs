//! The validation engine — pure logic over a draft and an injected catalog.
//!
//! Two rule layers: study-level structural rules parameterized by study
//! type, and per-block field rules dispatched on the block type. The
//! engine is re-run after every relevant mutation; nothing here caches.

use std::sync::Arc;

use validator::Validate;

use crate::block::{Block, BlockType, MAX_BLOCK_DURATION_MINS, MIN_BLOCK_DURATION_MINS};
use crate::catalog::BlockCatalog;
use crate::draft::StudyDraft;
use crate::validation::rules::{codes, ValidationIssue, ValidationResult};
use crate::wizard::WizardStep;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Total estimated duration above which a warning is surfaced (studies
/// longer than this see a marked drop in completion rates).
pub const SOFT_TOTAL_DURATION_WARNING_MINS: u32 = 60;

/// Bounds for a five-second-test display duration, in seconds.
pub const MIN_DISPLAY_DURATION_SECS: u64 = 1;
pub const MAX_DISPLAY_DURATION_SECS: u64 = 30;

/// Bounds for a moderated session length, in minutes.
pub const MIN_SESSION_DURATION_MINS: u32 = 5;
pub const MAX_SESSION_DURATION_MINS: u32 = 240;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Validates drafts against the injected catalog's declared rules.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    catalog: Arc<BlockCatalog>,
}

impl ValidationEngine {
    pub fn new(catalog: Arc<BlockCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    /// Validate the whole draft: every rule layer, merged.
    pub fn validate(&self, draft: &StudyDraft) -> ValidationResult {
        let mut result = self.validate_setup(draft);
        result.merge(self.validate_structure(draft));
        result.merge(self.validate_blocks(draft));
        result.merge(self.validate_session(draft));
        result.merge(self.validate_participants(draft));
        result.merge(self.validate_settings(draft));
        result
    }

    /// Validate only the subset of the draft relevant to one wizard step.
    /// This is what gates forward transitions.
    pub fn validate_step(&self, draft: &StudyDraft, step: WizardStep) -> ValidationResult {
        match step {
            WizardStep::Setup => self.validate_setup(draft),
            WizardStep::Blocks => {
                let mut result = self.validate_structure(draft);
                result.merge(self.validate_blocks(draft));
                result
            }
            WizardStep::Session => self.validate_session(draft),
            WizardStep::Participants => self.validate_participants(draft),
            WizardStep::Settings => self.validate_settings(draft),
            WizardStep::Review => self.validate(draft),
        }
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    fn validate_setup(&self, draft: &StudyDraft) -> ValidationResult {
        let mut errors = Vec::new();
        if let Err(field_errors) = draft.setup.validate() {
            for (field, failures) in field_errors.field_errors() {
                for failure in failures {
                    let message = failure
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for '{field}'"));
                    errors.push(ValidationIssue::draft(codes::INVALID_SETUP_FIELD, message));
                }
            }
        }
        ValidationResult::new(errors, Vec::new())
    }

    // -----------------------------------------------------------------------
    // Study-level structure
    // -----------------------------------------------------------------------

    fn validate_structure(&self, draft: &StudyDraft) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let study_type = draft.setup.study_type;

        if draft.blocks.is_empty() {
            errors.push(ValidationIssue::draft(
                codes::NO_BLOCKS,
                "Add at least one block to continue",
            ));
        }

        let max_blocks = self.catalog.max_blocks_for(study_type);
        if draft.blocks.len() > max_blocks {
            errors.push(ValidationIssue::draft(
                codes::TOO_MANY_BLOCKS,
                format!(
                    "A {} allows at most {max_blocks} blocks, this draft has {}",
                    study_type.label(),
                    draft.blocks.len()
                ),
            ));
        }

        let total = draft.blocks.total_estimated_duration_mins();
        if total > SOFT_TOTAL_DURATION_WARNING_MINS {
            warnings.push(ValidationIssue::draft(
                codes::STUDY_TOO_LONG,
                format!(
                    "Estimated completion time is {total} minutes; studies over \
                     {SOFT_TOTAL_DURATION_WARNING_MINS} minutes see fewer completions"
                ),
            ));
        }

        if let Some(rules) = self.catalog.rules_for(study_type) {
            if let Some(opener) = rules.opens_with {
                let opens_ok = draft
                    .blocks
                    .as_slice()
                    .first()
                    .is_some_and(|b| b.block_type == opener);
                if !opens_ok {
                    errors.push(ValidationIssue::draft(
                        codes::MUST_OPEN_WITH,
                        format!("A {} must begin with a {} block", study_type.label(), opener.label()),
                    ));
                }
            }
            if let Some(closer) = rules.closes_with {
                let closes_ok = draft
                    .blocks
                    .as_slice()
                    .last()
                    .is_some_and(|b| b.block_type == closer);
                if !closes_ok {
                    errors.push(ValidationIssue::draft(
                        codes::MUST_CLOSE_WITH,
                        format!("A {} must end with a {} block", study_type.label(), closer.label()),
                    ));
                }
            }
        }

        ValidationResult::new(errors, warnings)
    }

    // -----------------------------------------------------------------------
    // Per-block fields
    // -----------------------------------------------------------------------

    fn validate_blocks(&self, draft: &StudyDraft) -> ValidationResult {
        let mut errors = Vec::new();
        let study_type = draft.setup.study_type;

        for block in &draft.blocks {
            if block.name.trim().is_empty() {
                errors.push(ValidationIssue::block(
                    block.id,
                    codes::EMPTY_BLOCK_NAME,
                    "Block name must not be empty",
                ));
            }

            if block.block_type.requires_description() && block.description.trim().is_empty() {
                errors.push(ValidationIssue::block(
                    block.id,
                    codes::MISSING_DESCRIPTION,
                    format!("{} blocks need description text", block.block_type.label()),
                ));
            }

            if block.estimated_duration_mins < MIN_BLOCK_DURATION_MINS
                || block.estimated_duration_mins > MAX_BLOCK_DURATION_MINS
            {
                errors.push(ValidationIssue::block(
                    block.id,
                    codes::DURATION_OUT_OF_RANGE,
                    format!(
                        "Estimated duration must be between {MIN_BLOCK_DURATION_MINS} and \
                         {MAX_BLOCK_DURATION_MINS} minutes"
                    ),
                ));
            }

            if !self.catalog.is_applicable(block.block_type, study_type) {
                errors.push(ValidationIssue::block(
                    block.id,
                    codes::BLOCK_NOT_APPLICABLE,
                    format!(
                        "{} blocks cannot be used in a {}",
                        block.block_type.label(),
                        study_type.label()
                    ),
                ));
            }

            validate_block_settings(block, &mut errors);
        }

        ValidationResult::new(errors, Vec::new())
    }

    // -----------------------------------------------------------------------
    // Session / participants / settings
    // -----------------------------------------------------------------------

    fn validate_session(&self, draft: &StudyDraft) -> ValidationResult {
        use crate::types::SessionType;

        let mut errors = Vec::new();
        if draft.setup.session_type == SessionType::Moderated {
            match draft.setup.session_duration_mins {
                None => errors.push(ValidationIssue::draft(
                    codes::MISSING_SESSION_DURATION,
                    "Moderated studies need a planned session length",
                )),
                Some(mins)
                    if !(MIN_SESSION_DURATION_MINS..=MAX_SESSION_DURATION_MINS)
                        .contains(&mins) =>
                {
                    errors.push(ValidationIssue::draft(
                        codes::SESSION_DURATION_OUT_OF_RANGE,
                        format!(
                            "Session length must be between {MIN_SESSION_DURATION_MINS} and \
                             {MAX_SESSION_DURATION_MINS} minutes"
                        ),
                    ));
                }
                Some(_) => {}
            }
        }
        ValidationResult::new(errors, Vec::new())
    }

    fn validate_participants(&self, draft: &StudyDraft) -> ValidationResult {
        let mut errors = Vec::new();
        if draft.setup.target_participants == 0 {
            errors.push(ValidationIssue::draft(
                codes::INVALID_TARGET_PARTICIPANTS,
                "Recruit at least one participant",
            ));
        }
        ValidationResult::new(errors, Vec::new())
    }

    fn validate_settings(&self, draft: &StudyDraft) -> ValidationResult {
        let mut warnings = Vec::new();
        let wants_screen = draft.blocks.iter().any(|b| {
            matches!(
                b.block_type,
                BlockType::PrototypeTest | BlockType::LiveWebsiteTest | BlockType::FiveSecondTest
            )
        });
        if wants_screen && !draft.settings.record_screen {
            warnings.push(ValidationIssue::draft(
                codes::RECORDING_DISABLED,
                "This study has task blocks but screen recording is off",
            ));
        }
        ValidationResult::new(Vec::new(), warnings)
    }
}

// ---------------------------------------------------------------------------
// Type-specific settings rules
// ---------------------------------------------------------------------------

fn str_setting<'a>(block: &'a Block, key: &str) -> Option<&'a str> {
    block.setting(key).and_then(|v| v.as_str())
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

fn array_len(block: &Block, key: &str) -> usize {
    block
        .setting(key)
        .and_then(|v| v.as_array())
        .map_or(0, |a| a.len())
}

fn require_text(block: &Block, key: &str, code: &'static str, what: &str, errors: &mut Vec<ValidationIssue>) {
    if is_blank(str_setting(block, key)) {
        errors.push(ValidationIssue::block(
            block.id,
            code,
            format!("{} blocks need {what}", block.block_type.label()),
        ));
    }
}

/// Dispatch on the block type tag. The match is exhaustive: a new block
/// type does not compile until its settings rules are decided here.
fn validate_block_settings(block: &Block, errors: &mut Vec<ValidationIssue>) {
    match block.block_type {
        BlockType::OpenQuestion | BlockType::SimpleInput | BlockType::YesNo => {
            require_text(block, "question", codes::MISSING_QUESTION, "question text", errors);
        }
        BlockType::MultipleChoice => {
            require_text(block, "question", codes::MISSING_QUESTION, "question text", errors);
            if array_len(block, "options") < 2 {
                errors.push(ValidationIssue::block(
                    block.id,
                    codes::TOO_FEW_OPTIONS,
                    "Multiple choice blocks need at least 2 options",
                ));
            }
        }
        BlockType::OpinionScale => {
            require_text(block, "question", codes::MISSING_QUESTION, "question text", errors);
            let min = block.setting("scale_min").and_then(|v| v.as_i64());
            let max = block.setting("scale_max").and_then(|v| v.as_i64());
            match (min, max) {
                (Some(lo), Some(hi)) if lo < hi => {}
                _ => errors.push(ValidationIssue::block(
                    block.id,
                    codes::INVALID_SCALE_BOUNDS,
                    "Scale minimum must be below the maximum",
                )),
            }
        }
        BlockType::FiveSecondTest => {
            if is_blank(str_setting(block, "image_url")) {
                errors.push(ValidationIssue::block(
                    block.id,
                    codes::MISSING_IMAGE,
                    "Five second test blocks need an image",
                ));
            }
            let secs = block
                .setting("display_duration_secs")
                .and_then(|v| v.as_u64());
            match secs {
                Some(s) if (MIN_DISPLAY_DURATION_SECS..=MAX_DISPLAY_DURATION_SECS).contains(&s) => {}
                _ => errors.push(ValidationIssue::block(
                    block.id,
                    codes::DISPLAY_DURATION_OUT_OF_RANGE,
                    format!(
                        "Display duration must be between {MIN_DISPLAY_DURATION_SECS} and \
                         {MAX_DISPLAY_DURATION_SECS} seconds"
                    ),
                )),
            }
        }
        BlockType::CardSort => {
            if array_len(block, "cards") == 0 {
                errors.push(ValidationIssue::block(
                    block.id,
                    codes::NO_CARDS,
                    "Card sort blocks need at least one card",
                ));
            }
            let closed_sort = str_setting(block, "sort_kind") == Some("closed");
            if closed_sort && array_len(block, "categories") < 2 {
                errors.push(ValidationIssue::block(
                    block.id,
                    codes::TOO_FEW_CATEGORIES,
                    "Closed card sorts need at least 2 categories",
                ));
            }
        }
        BlockType::TreeTest => {
            if array_len(block, "tree") == 0 {
                errors.push(ValidationIssue::block(
                    block.id,
                    codes::EMPTY_TREE,
                    "Tree test blocks need a navigation tree",
                ));
            }
            require_text(block, "task", codes::MISSING_TASK, "a task prompt", errors);
        }
        BlockType::Screener => {
            require_text(block, "question", codes::MISSING_QUESTION, "question text", errors);
            if array_len(block, "options") < 2 {
                errors.push(ValidationIssue::block(
                    block.id,
                    codes::TOO_FEW_OPTIONS,
                    "Screener blocks need at least 2 options",
                ));
            }
            if array_len(block, "qualifying_options") == 0 {
                errors.push(ValidationIssue::block(
                    block.id,
                    codes::NO_QUALIFYING_OPTIONS,
                    "Mark at least one screener option as qualifying",
                ));
            }
        }
        BlockType::PrototypeTest => {
            require_text(block, "prototype_url", codes::MISSING_URL, "a prototype link", errors);
            require_text(block, "task", codes::MISSING_TASK, "a task prompt", errors);
        }
        BlockType::LiveWebsiteTest => {
            require_text(block, "website_url", codes::MISSING_URL, "a website address", errors);
            require_text(block, "task", codes::MISSING_TASK, "a task prompt", errors);
        }
        BlockType::ImageUpload | BlockType::FileUpload => {
            require_text(block, "prompt", codes::MISSING_PROMPT, "an upload prompt", errors);
            let max_files = block.setting("max_files").and_then(|v| v.as_u64());
            if !matches!(max_files, Some(n) if n >= 1) {
                errors.push(ValidationIssue::block(
                    block.id,
                    codes::INVALID_MAX_FILES,
                    "Allow at least one uploaded file",
                ));
            }
        }
        // Narrative screens have no settings rules beyond the shared
        // name/description checks.
        BlockType::Welcome | BlockType::ContextScreen | BlockType::ThankYou => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::draft::{StudySetup, StudySettings};
    use crate::types::{SessionType, StudyType};
    use serde_json::json;

    fn engine() -> ValidationEngine {
        ValidationEngine::new(Arc::new(default_catalog()))
    }

    fn draft_with_blocks(study_type: StudyType, blocks: Vec<Block>) -> StudyDraft {
        let mut draft = StudyDraft::new(StudySetup::new("Test study", study_type));
        for block in blocks {
            draft.blocks.insert(block, None);
        }
        draft
    }

    /// A survey open-question block that passes every field rule.
    fn valid_question_block() -> Block {
        let mut block = Block::new(BlockType::OpenQuestion, "First impressions");
        block.estimated_duration_mins = 2;
        block
            .settings
            .insert("question".into(), json!("What stood out to you?"));
        block
    }

    // -- structure -----------------------------------------------------------

    #[test]
    fn empty_draft_fails_with_no_blocks() {
        let draft = draft_with_blocks(StudyType::Survey, vec![]);
        let result = engine().validate_step(&draft, WizardStep::Blocks);
        assert!(!result.is_valid);
        assert!(result.has_code(codes::NO_BLOCKS));
    }

    #[test]
    fn single_valid_block_passes_the_blocks_step() {
        let draft = draft_with_blocks(StudyType::Survey, vec![valid_question_block()]);
        let result = engine().validate_step(&draft, WizardStep::Blocks);
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn block_count_ceiling_is_enforced_per_study_type() {
        let blocks: Vec<_> = (0..16).map(|_| valid_question_block()).collect();
        // Card sorting caps at 15; the same count is fine for a survey.
        let mut card_draft = draft_with_blocks(StudyType::CardSorting, blocks.clone());
        // Open questions are applicable to card sorting, so only the
        // ceiling triggers.
        let result = engine().validate(&card_draft);
        assert!(result.has_code(codes::TOO_MANY_BLOCKS));

        card_draft.setup.study_type = StudyType::Survey;
        let result = engine().validate(&card_draft);
        assert!(!result.has_code(codes::TOO_MANY_BLOCKS));
    }

    #[test]
    fn long_study_is_a_warning_not_an_error() {
        let mut blocks = Vec::new();
        for _ in 0..40 {
            blocks.push(valid_question_block());
        }
        let draft = draft_with_blocks(StudyType::Survey, blocks);
        let result = engine().validate_step(&draft, WizardStep::Blocks);
        assert!(result.is_valid);
        assert!(result.has_code(codes::STUDY_TOO_LONG));
        assert!(result.warnings.iter().any(|w| w.code == codes::STUDY_TOO_LONG));
    }

    #[test]
    fn declared_opening_rule_is_enforced() {
        use crate::catalog::{BlockCatalog, StudyTypeRules};
        let base = default_catalog();
        let mut rules: Vec<StudyTypeRules> = crate::types::ALL_STUDY_TYPES
            .iter()
            .filter_map(|st| base.rules_for(*st).cloned())
            .collect();
        for rule in &mut rules {
            if rule.study_type == StudyType::Survey {
                rule.opens_with = Some(BlockType::Welcome);
            }
        }
        let catalog = BlockCatalog::new(
            crate::block::ALL_BLOCK_TYPES
                .iter()
                .map(|bt| base.lookup(*bt).unwrap().clone())
                .collect(),
            rules,
        );
        let engine = ValidationEngine::new(Arc::new(catalog));

        let draft = draft_with_blocks(StudyType::Survey, vec![valid_question_block()]);
        let result = engine.validate(&draft);
        assert!(result.has_code(codes::MUST_OPEN_WITH));
    }

    #[test]
    fn inapplicable_block_type_is_an_error() {
        // Card sorts are not valid inside surveys.
        let mut card = Block::new(BlockType::CardSort, "Sort the features");
        card.settings.insert("cards".into(), json!(["a", "b"]));
        card.settings.insert("sort_kind".into(), json!("open"));
        let draft = draft_with_blocks(StudyType::Survey, vec![card]);
        let result = engine().validate(&draft);
        assert!(result.has_code(codes::BLOCK_NOT_APPLICABLE));
    }

    // -- per-block fields ----------------------------------------------------

    #[test]
    fn empty_block_name_is_an_error() {
        let mut block = valid_question_block();
        block.name = "   ".to_string();
        let draft = draft_with_blocks(StudyType::Survey, vec![block]);
        let result = engine().validate(&draft);
        assert!(result.has_code(codes::EMPTY_BLOCK_NAME));
    }

    #[test]
    fn narrative_blocks_require_description() {
        let block = Block::new(BlockType::Welcome, "Welcome");
        let id = block.id;
        let draft = draft_with_blocks(StudyType::Survey, vec![block]);
        let result = engine().validate(&draft);
        assert!(result
            .issues_for_block(id)
            .iter()
            .any(|i| i.code == codes::MISSING_DESCRIPTION));
    }

    #[test]
    fn duration_bounds_are_enforced() {
        let mut block = valid_question_block();
        block.estimated_duration_mins = 0;
        let draft = draft_with_blocks(StudyType::Survey, vec![block]);
        assert!(engine().validate(&draft).has_code(codes::DURATION_OUT_OF_RANGE));

        let mut block = valid_question_block();
        block.estimated_duration_mins = 181;
        let draft = draft_with_blocks(StudyType::Survey, vec![block]);
        assert!(engine().validate(&draft).has_code(codes::DURATION_OUT_OF_RANGE));
    }

    #[test]
    fn open_question_requires_question_text() {
        let mut block = valid_question_block();
        block.settings.insert("question".into(), json!("  "));
        let draft = draft_with_blocks(StudyType::Survey, vec![block]);
        assert!(engine().validate(&draft).has_code(codes::MISSING_QUESTION));
    }

    #[test]
    fn multiple_choice_needs_two_options() {
        let mut block = Block::new(BlockType::MultipleChoice, "Pick one");
        block.settings.insert("question".into(), json!("Which?"));
        block.settings.insert("options".into(), json!(["only one"]));
        let draft = draft_with_blocks(StudyType::Survey, vec![block]);
        assert!(engine().validate(&draft).has_code(codes::TOO_FEW_OPTIONS));
    }

    #[test]
    fn five_second_display_duration_bounds() {
        let mut block = Block::new(BlockType::FiveSecondTest, "Look closely");
        block.settings.insert("image_url".into(), json!("https://example.test/shot.png"));
        block.settings.insert("display_duration_secs".into(), json!(45));
        let draft = draft_with_blocks(StudyType::UsabilityTest, vec![block]);
        assert!(engine()
            .validate(&draft)
            .has_code(codes::DISPLAY_DURATION_OUT_OF_RANGE));
    }

    #[test]
    fn opinion_scale_bounds_must_be_ordered() {
        let mut block = Block::new(BlockType::OpinionScale, "Rate it");
        block.settings.insert("question".into(), json!("How was it?"));
        block.settings.insert("scale_min".into(), json!(5));
        block.settings.insert("scale_max".into(), json!(1));
        let draft = draft_with_blocks(StudyType::Survey, vec![block]);
        assert!(engine().validate(&draft).has_code(codes::INVALID_SCALE_BOUNDS));
    }

    #[test]
    fn unknown_settings_keys_are_tolerated() {
        let mut block = valid_question_block();
        block
            .settings
            .insert("future_feature_flag".into(), json!({"nested": true}));
        let draft = draft_with_blocks(StudyType::Survey, vec![block]);
        let result = engine().validate(&draft);
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
    }

    // -- monotonicity --------------------------------------------------------

    #[test]
    fn adding_invalid_block_flips_validity_and_removal_restores_it() {
        let mut draft = draft_with_blocks(StudyType::Survey, vec![valid_question_block()]);
        let engine = engine();
        assert!(engine.validate(&draft).is_valid);

        let mut bad = Block::new(BlockType::OpenQuestion, "");
        bad.settings.insert("question".into(), json!("ok?"));
        bad.estimated_duration_mins = 2;
        let bad_id = bad.id;
        draft.blocks.insert(bad, None);
        assert!(!engine.validate(&draft).is_valid);

        draft.blocks.remove(bad_id).unwrap();
        assert!(engine.validate(&draft).is_valid);
    }

    // -- session / participants / settings -----------------------------------

    #[test]
    fn moderated_studies_need_a_session_length() {
        let mut draft = draft_with_blocks(StudyType::UserInterview, vec![valid_question_block()]);
        draft.setup.session_type = SessionType::Moderated;
        let result = engine().validate_step(&draft, WizardStep::Session);
        assert!(result.has_code(codes::MISSING_SESSION_DURATION));

        draft.setup.session_duration_mins = Some(30);
        let result = engine().validate_step(&draft, WizardStep::Session);
        assert!(result.is_valid);
    }

    #[test]
    fn unmoderated_studies_skip_session_rules() {
        let draft = draft_with_blocks(StudyType::Survey, vec![valid_question_block()]);
        let result = engine().validate_step(&draft, WizardStep::Session);
        assert!(result.is_valid);
    }

    #[test]
    fn session_length_bounds_are_enforced() {
        let mut draft = draft_with_blocks(StudyType::UserInterview, vec![valid_question_block()]);
        draft.setup.session_type = SessionType::Moderated;
        draft.setup.session_duration_mins = Some(500);
        let result = engine().validate_step(&draft, WizardStep::Session);
        assert!(result.has_code(codes::SESSION_DURATION_OUT_OF_RANGE));
    }

    #[test]
    fn task_blocks_without_screen_recording_warn() {
        let mut block = Block::new(BlockType::PrototypeTest, "Try checkout");
        block
            .settings
            .insert("prototype_url".into(), json!("https://proto.example.test"));
        block.settings.insert("task".into(), json!("Buy the blue shirt"));
        let mut draft = draft_with_blocks(StudyType::UsabilityTest, vec![block]);
        draft.settings = StudySettings::default();

        let result = engine().validate_step(&draft, WizardStep::Settings);
        assert!(result.is_valid);
        assert!(result.has_code(codes::RECORDING_DISABLED));

        draft.settings.record_screen = true;
        let result = engine().validate_step(&draft, WizardStep::Settings);
        assert!(!result.has_code(codes::RECORDING_DISABLED));
    }

    #[test]
    fn setup_step_flags_empty_title() {
        let mut draft = draft_with_blocks(StudyType::Survey, vec![]);
        draft.setup.title = String::new();
        let result = engine().validate_step(&draft, WizardStep::Setup);
        assert!(!result.is_valid);
        assert!(result.has_code(codes::INVALID_SETUP_FIELD));
    }
}
